//! Error handling shared by services.

pub mod error_code;
pub mod responder;

pub use error_code::ErrorCode;
pub use responder::{
    construct_error_response, rand_id, stringify_body, ErrorReport, ErrorResponse, ERROR_ID_LEN,
};
