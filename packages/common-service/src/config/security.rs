use std::borrow::Cow;
use std::env;
use std::fmt;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use thiserror::Error;

/// Environment variable holding the shared HMAC signing secret.
pub const JWT_SECRET_VAR: &str = "JWT_SECRET";

/// Environment variable holding the optional clock skew tolerance, in seconds.
pub const JWT_CLOCK_SKEW_VAR: &str = "JWT_CLOCK_SKEW_SECS";

/// Startup configuration failures. These should abort service boot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be set")]
    MissingVar { var: String },
    #[error("{var} must not be empty")]
    EmptySecret { var: String },
    #[error("{var} has invalid value '{value}'")]
    InvalidValue { var: String, value: String },
    #[error("unsupported signing algorithm {0:?}; only HS256, HS384 and HS512 are accepted")]
    UnsupportedAlgorithm(Algorithm),
}

/// The signing secret could not be obtained at call time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecretError {
    #[error("{var} is not set")]
    Missing { var: String },
    #[error("signing secret is empty")]
    Empty,
}

/// Where the shared secret comes from.
#[derive(Clone)]
pub enum SecretSource {
    /// Loaded once at startup.
    Static(Vec<u8>),
    /// Re-read from the named environment variable on every call (rotation).
    Env(String),
}

impl fmt::Debug for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretSource::Static(_) => f.write_str("Static(<redacted>)"),
            SecretSource::Env(var) => f.debug_tuple("Env").field(var).finish(),
        }
    }
}

/// Configuration for JWT security settings
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    secret: SecretSource,
    /// JWT algorithm to use (HMAC family only, defaults to HS256)
    algorithm: Algorithm,
    /// Tolerance applied to `exp` and `iat` checks
    pub clock_skew: Duration,
    /// Reject tokens whose `iat` lies in the future beyond `clock_skew`
    pub validate_iat: bool,
}

impl SecurityConfig {
    /// Create a new SecurityConfig with the given JWT secret
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self::with_source(SecretSource::Static(jwt_secret.into()))
    }

    /// Secret re-read from `var` on every encode/decode. A missing or empty
    /// value at call time fails the call.
    pub fn rotating(var: impl Into<String>) -> Self {
        Self::with_source(SecretSource::Env(var.into()))
    }

    /// Load `JWT_SECRET` (and optional `JWT_CLOCK_SKEW_SECS`) once.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = env::var(JWT_SECRET_VAR).map_err(|_| ConfigError::MissingVar {
            var: JWT_SECRET_VAR.to_string(),
        })?;
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret {
                var: JWT_SECRET_VAR.to_string(),
            });
        }

        let mut config = Self::new(secret.into_bytes());
        if let Ok(raw) = env::var(JWT_CLOCK_SKEW_VAR) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    var: JWT_CLOCK_SKEW_VAR.to_string(),
                    value: raw.clone(),
                })?;
            config.clock_skew = Duration::from_secs(secs);
        }
        Ok(config)
    }

    fn with_source(secret: SecretSource) -> Self {
        Self {
            secret,
            algorithm: Algorithm::HS256,
            clock_skew: Duration::ZERO,
            validate_iat: true,
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Result<Self, ConfigError> {
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                self.algorithm = algorithm;
                Ok(self)
            }
            other => Err(ConfigError::UnsupportedAlgorithm(other)),
        }
    }

    pub fn with_clock_skew(mut self, clock_skew: Duration) -> Self {
        self.clock_skew = clock_skew;
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn source(&self) -> &SecretSource {
        &self.secret
    }

    /// Resolve the secret for a single encode/decode call.
    pub(crate) fn secret(&self) -> Result<Cow<'_, [u8]>, SecretError> {
        let secret: Cow<'_, [u8]> = match &self.secret {
            SecretSource::Static(bytes) => Cow::Borrowed(bytes.as_slice()),
            SecretSource::Env(var) => Cow::Owned(
                env::var(var)
                    .map_err(|_| SecretError::Missing { var: var.clone() })?
                    .into_bytes(),
            ),
        };

        if secret.is_empty() {
            return Err(SecretError::Empty);
        }
        Ok(secret)
    }
}
