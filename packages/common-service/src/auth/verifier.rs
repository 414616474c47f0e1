//! Credential verification capability consumed by [`crate::middleware::JwtAuth`].

use crate::auth::claims::{Claims, Identity};
use crate::auth::jwt::{DecodeError, TokenCodec};

/// Turns a raw credential into claims.
///
/// The middleware depends on this trait rather than on [`TokenCodec`], so
/// alternate credential schemes (or test fakes) can be plugged in.
pub trait TokenVerifier: Send + Sync + 'static {
    type Claims: Clone + 'static;
    type Error: std::error::Error;

    fn decode(&self, credential: &str) -> Result<Self::Claims, Self::Error>;
}

impl<I: Identity> TokenVerifier for TokenCodec<I> {
    type Claims = Claims<I>;
    type Error = DecodeError;

    fn decode(&self, credential: &str) -> Result<Self::Claims, Self::Error> {
        TokenCodec::decode(self, credential)
    }
}
