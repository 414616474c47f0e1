use std::marker::PhantomData;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use crate::auth::claims::{Account, Claims, Identity, RegisteredClaims};
use crate::config::security::{SecretError, SecurityConfig};

/// Token issuance failures.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("signing secret unavailable: {0}")]
    Secret(#[from] SecretError),
    #[error("issuer must not be empty")]
    EmptyIssuer,
    #[error("validity must be at least one second")]
    InvalidValidity,
    #[error("system clock is before the unix epoch")]
    Clock,
    #[error("failed to encode JWT: {0}")]
    Jwt(#[source] jsonwebtoken::errors::Error),
}

/// Token decoding failures. Kept distinct for server-side logs only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("invalid token signature")]
    SignatureInvalid,
    #[error("token expired")]
    Expired,
    #[error("token issued in the future")]
    IssuedInFuture,
    #[error("system clock is before the unix epoch")]
    Clock,
    #[error("verification secret unavailable: {0}")]
    Secret(#[from] SecretError),
}

/// Yes/no verification failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("token verification failed: {0}")]
pub struct VerifyError(#[from] DecodeError);

impl VerifyError {
    pub fn reason(&self) -> &DecodeError {
        &self.0
    }
}

impl From<jsonwebtoken::errors::Error> for DecodeError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => DecodeError::SignatureInvalid,
            ErrorKind::ExpiredSignature => DecodeError::Expired,
            _ => DecodeError::Malformed(e.to_string()),
        }
    }
}

/// HS256/384/512 codec for [`Claims<I>`].
///
/// The secret is resolved from [`SecurityConfig`] on every call, never
/// stored alongside the claims.
#[derive(Debug, Clone)]
pub struct TokenCodec<I = Account> {
    security: SecurityConfig,
    _identity: PhantomData<fn() -> I>,
}

impl<I: Identity> TokenCodec<I> {
    pub fn new(security: SecurityConfig) -> Self {
        Self {
            security,
            _identity: PhantomData,
        }
    }

    pub fn security(&self) -> &SecurityConfig {
        &self.security
    }

    /// Mint a token valid for `validity` starting now.
    pub fn encode(
        &self,
        issuer: &str,
        validity: Duration,
        subject: &str,
        identity: &I,
    ) -> Result<String, SigningError> {
        self.encode_at(issuer, validity, subject, identity, SystemTime::now())
    }

    pub fn encode_at(
        &self,
        issuer: &str,
        validity: Duration,
        subject: &str,
        identity: &I,
        now: SystemTime,
    ) -> Result<String, SigningError> {
        if issuer.is_empty() {
            return Err(SigningError::EmptyIssuer);
        }
        let secret = self.security.secret()?;

        let iat = unix_secs(now).ok_or(SigningError::Clock)?;
        let ttl = i64::try_from(validity.as_secs()).map_err(|_| SigningError::InvalidValidity)?;
        let exp = iat.checked_add(ttl).ok_or(SigningError::InvalidValidity)?;

        let claims = Claims::new(issuer, subject, identity.clone(), iat, exp)
            .ok_or(SigningError::InvalidValidity)?;

        encode(
            &Header::new(self.security.algorithm()),
            &claims,
            &EncodingKey::from_secret(&secret),
        )
        .map_err(SigningError::Jwt)
    }

    /// Verify the token and return its claims, with `identity.id` set to the
    /// subject.
    pub fn decode(&self, token: &str) -> Result<Claims<I>, DecodeError> {
        self.decode_at(token, SystemTime::now())
    }

    pub fn decode_at(&self, token: &str, now: SystemTime) -> Result<Claims<I>, DecodeError> {
        let mut claims: Claims<I> = self.decode_raw(token)?;
        self.check_window(claims.issued_at(), claims.expires_at(), now)?;

        if let Some(previous) = claims.normalize_identity() {
            warn!(
                subject = %claims.subject(),
                identity_id = %previous,
                "token identity id differs from subject; using subject"
            );
        }
        Ok(claims)
    }

    /// Signature and expiry check without materializing the identity.
    pub fn verify(&self, token: &str) -> Result<(), VerifyError> {
        self.verify_at(token, SystemTime::now())
    }

    pub fn verify_at(&self, token: &str, now: SystemTime) -> Result<(), VerifyError> {
        let registered: RegisteredClaims = self.decode_raw(token)?;
        self.check_window(registered.iat, registered.exp, now)?;
        Ok(())
    }

    fn decode_raw<T>(&self, token: &str) -> Result<T, DecodeError>
    where
        T: DeserializeOwned + Clone,
    {
        let secret = self.security.secret()?;

        // Temporal rules are applied by `check_window` so the expiry
        // boundary and skew stay under our control.
        let mut validation = Validation::new(self.security.algorithm());
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        let data = decode::<T>(token, &DecodingKey::from_secret(&secret), &validation)?;
        Ok(data.claims)
    }

    fn check_window(&self, iat: i64, exp: i64, now: SystemTime) -> Result<(), DecodeError> {
        let now = unix_secs(now).ok_or(DecodeError::Clock)?;
        let skew = i64::try_from(self.security.clock_skew.as_secs()).unwrap_or(i64::MAX);

        if now >= exp.saturating_add(skew) {
            return Err(DecodeError::Expired);
        }
        if self.security.validate_iat && iat > now.saturating_add(skew) {
            return Err(DecodeError::IssuedInFuture);
        }
        Ok(())
    }
}

fn unix_secs(at: SystemTime) -> Option<i64> {
    at.duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_secs()).ok())
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use jsonwebtoken::Algorithm;

    use super::*;

    const SECRET: &[u8] = b"test_secret_key_for_testing_purposes_only";

    fn codec() -> TokenCodec<Account> {
        TokenCodec::new(SecurityConfig::new(SECRET))
    }

    fn account(uuid: &str) -> Account {
        Account {
            uuid: uuid.to_string(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            username: "tester".to_string(),
            ..Account::default()
        }
    }

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_encode_and_decode_roundtrip() {
        let now = SystemTime::now();
        let token = codec()
            .encode_at("auth-service", Duration::from_secs(900), "user-42", &account("user-42"), now)
            .unwrap();
        let claims = codec().decode_at(&token, now).unwrap();

        let iat = now.duration_since(UNIX_EPOCH).unwrap().as_secs() as i64;
        assert_eq!(claims.subject(), "user-42");
        assert_eq!(claims.issuer(), "auth-service");
        assert_eq!(claims.issued_at(), iat);
        assert_eq!(claims.expires_at(), iat + 900);
        assert_eq!(claims.identity(), &account("user-42"));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let token = codec()
            .encode_at("auth", Duration::from_secs(60), "user-1", &account("user-1"), at(1_000_000))
            .unwrap();

        assert!(codec().decode_at(&token, at(1_000_059)).is_ok());
        assert_eq!(
            codec().decode_at(&token, at(1_000_060)).unwrap_err(),
            DecodeError::Expired
        );
        assert_eq!(
            codec().verify_at(&token, at(1_000_060)).unwrap_err().reason(),
            &DecodeError::Expired
        );
    }

    #[test]
    fn test_clock_skew_extends_expiry() {
        let security = SecurityConfig::new(SECRET).with_clock_skew(Duration::from_secs(30));
        let codec = TokenCodec::<Account>::new(security);
        let token = codec
            .encode_at("auth", Duration::from_secs(60), "user-1", &account("user-1"), at(1_000_000))
            .unwrap();

        assert!(codec.decode_at(&token, at(1_000_089)).is_ok());
        assert_eq!(
            codec.decode_at(&token, at(1_000_090)).unwrap_err(),
            DecodeError::Expired
        );
    }

    #[test]
    fn test_future_issued_token_rejected() {
        let token = codec()
            .encode_at("auth", Duration::from_secs(60), "user-1", &account("user-1"), at(2_000_000))
            .unwrap();

        assert_eq!(
            codec().decode_at(&token, at(1_999_999)).unwrap_err(),
            DecodeError::IssuedInFuture
        );
    }

    #[test]
    fn test_bad_signature() {
        let token = codec()
            .encode("auth", Duration::from_secs(60), "user-1", &account("user-1"))
            .unwrap();

        let other = TokenCodec::<Account>::new(SecurityConfig::new("secret-B"));
        assert_eq!(other.decode(&token).unwrap_err(), DecodeError::SignatureInvalid);
    }

    #[test]
    fn test_clock_before_epoch_is_a_clock_error() {
        let token = codec()
            .encode_at("auth", Duration::from_secs(60), "user-1", &account("user-1"), at(1_000_000))
            .unwrap();
        let before_epoch = UNIX_EPOCH - Duration::from_secs(1);

        assert_eq!(
            codec().decode_at(&token, before_epoch).unwrap_err(),
            DecodeError::Clock
        );
        assert_eq!(
            codec().verify_at(&token, before_epoch).unwrap_err().reason(),
            &DecodeError::Clock
        );
        assert!(matches!(
            codec().encode_at("auth", Duration::from_secs(60), "u", &account("u"), before_epoch),
            Err(SigningError::Clock)
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        for token in ["", "not-a-token", "a.b", "a.b.c"] {
            assert!(
                matches!(codec().decode(token), Err(DecodeError::Malformed(_))),
                "expected malformed for {token:?}"
            );
        }
    }

    #[test]
    fn test_algorithm_is_pinned() {
        let hs512 = TokenCodec::<Account>::new(
            SecurityConfig::new(SECRET)
                .with_algorithm(Algorithm::HS512)
                .unwrap(),
        );
        let token = hs512
            .encode("auth", Duration::from_secs(60), "user-1", &account("user-1"))
            .unwrap();

        assert_eq!(hs512.security().algorithm(), Algorithm::HS512);
        assert!(hs512.decode(&token).is_ok());
        assert!(matches!(codec().decode(&token), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_drifted_identity_id_is_replaced_by_subject() {
        let token = codec()
            .encode("auth", Duration::from_secs(60), "user-42", &account("someone-else"))
            .unwrap();

        let claims = codec().decode(&token).unwrap();
        assert_eq!(claims.subject(), "user-42");
        assert_eq!(claims.into_identity().uuid, "user-42");
    }

    #[test]
    fn test_missing_secret_fails_both_ways() {
        let empty = TokenCodec::<Account>::new(SecurityConfig::new(Vec::new()));

        assert!(matches!(
            empty.encode("auth", Duration::from_secs(60), "u", &account("u")),
            Err(SigningError::Secret(SecretError::Empty))
        ));

        let token = codec()
            .encode("auth", Duration::from_secs(60), "u", &account("u"))
            .unwrap();
        assert_eq!(
            empty.decode(&token).unwrap_err(),
            DecodeError::Secret(SecretError::Empty)
        );
    }

    #[test]
    fn test_encode_rejects_bad_inputs() {
        assert!(matches!(
            codec().encode("", Duration::from_secs(60), "u", &account("u")),
            Err(SigningError::EmptyIssuer)
        ));
        assert!(matches!(
            codec().encode("auth", Duration::ZERO, "u", &account("u")),
            Err(SigningError::InvalidValidity)
        ));
        assert!(matches!(
            codec().encode("auth", Duration::from_millis(999), "u", &account("u")),
            Err(SigningError::InvalidValidity)
        ));
    }
}
