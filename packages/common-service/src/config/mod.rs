pub mod security;

pub use security::{ConfigError, SecretError, SecretSource, SecurityConfig};
