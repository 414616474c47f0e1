pub mod claims;
pub mod jwt;
pub mod verifier;

pub use claims::{Account, Claims, Identity};
pub use jwt::{DecodeError, SigningError, TokenCodec, VerifyError};
pub use verifier::TokenVerifier;
