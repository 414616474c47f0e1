#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

//! Shared service infrastructure: JWT issuance and verification, the
//! enforcement middleware that guards HTTP scopes with it, uniform error
//! responses, and thin helpers for datastore connections and file transfer.

pub mod auth;
pub mod config;
pub mod connection;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod file;
pub mod middleware;
pub mod telemetry;

// Re-exports for public API
pub use auth::claims::{Account, Claims, Identity};
pub use auth::jwt::{DecodeError, SigningError, TokenCodec, VerifyError};
pub use auth::verifier::TokenVerifier;
pub use config::security::{ConfigError, SecretError, SecretSource, SecurityConfig};
pub use error::ServiceError;
pub use errors::error_code::ErrorCode;
pub use errors::responder::{construct_error_response, stringify_body, ErrorResponse};
pub use extractors::caller::{AuthClaims, Caller};
pub use middleware::jwt_auth::{AuthError, JwtAuth};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    common_service_test_support::logging::init();
}
