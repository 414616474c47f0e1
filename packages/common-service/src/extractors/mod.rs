pub mod caller;

pub use caller::{AuthClaims, Caller};
