//! Identity claims carried inside issued access tokens.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// An application-defined identity bundle embedded in a token.
///
/// Its fields are serialized next to the registered claims, so they must not
/// use the names `sub`, `iss`, `iat` or `exp`.
pub trait Identity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Primary identifier of the principal.
    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);
}

/// Default identity record shared by services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
    /// References to linked accounts (e.g. provider-side ids)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associated_accounts: Vec<String>,
}

impl Identity for Account {
    fn id(&self) -> &str {
        &self.uuid
    }

    fn set_id(&mut self, id: String) {
        self.uuid = id;
    }
}

/// Claims included in issued access tokens.
///
/// Immutable once built: fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims<I = Account> {
    sub: String,
    iss: String,
    /// Issued-at (seconds since epoch)
    iat: i64,
    /// Expiry (seconds since epoch)
    exp: i64,
    #[serde(flatten)]
    identity: I,
}

impl<I: Identity> Claims<I> {
    /// Returns `None` unless `expires_at > issued_at`.
    pub fn new(
        issuer: impl Into<String>,
        subject: impl Into<String>,
        identity: I,
        issued_at: i64,
        expires_at: i64,
    ) -> Option<Self> {
        if expires_at <= issued_at {
            return None;
        }
        Some(Self {
            sub: subject.into(),
            iss: issuer.into(),
            iat: issued_at,
            exp: expires_at,
            identity,
        })
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn issuer(&self) -> &str {
        &self.iss
    }

    pub fn issued_at(&self) -> i64 {
        self.iat
    }

    pub fn expires_at(&self) -> i64 {
        self.exp
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    pub fn into_identity(self) -> I {
        self.identity
    }

    /// Force `identity.id` to equal the subject. Returns the previous id
    /// when it differed.
    pub(crate) fn normalize_identity(&mut self) -> Option<String> {
        if self.identity.id() == self.sub {
            return None;
        }
        let previous = self.identity.id().to_string();
        self.identity.set_id(self.sub.clone());
        Some(previous)
    }
}

/// Registered fields only; used by the yes/no verification path.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RegisteredClaims {
    pub iat: i64,
    pub exp: i64,
}
