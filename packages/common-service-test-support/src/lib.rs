//! Test support for common-service
//!
//! Logging bootstrap, error-body assertions and unique test data shared by
//! unit and integration tests.

pub mod error_response;
pub mod logging;
pub mod unique_helpers;
