use std::borrow::Cow;

use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::auth::jwt::{DecodeError, SigningError, VerifyError};
use crate::errors::error_code::ErrorCode;
use crate::errors::responder::ErrorReport;

/// Handler-level error rendered through the `{code, id}` responder.
///
/// The detail is logged with the generated id and never sent to the client.
#[derive(Error, Debug)]
#[error("{detail}")]
pub struct ServiceError {
    status: StatusCode,
    code: Cow<'static, str>,
    detail: String,
    component: Cow<'static, str>,
    origin: Cow<'static, str>,
    input: String,
}

impl ServiceError {
    pub fn new(
        status: StatusCode,
        code: impl Into<Cow<'static, str>>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status,
            code: code.into(),
            detail: detail.into(),
            component: Cow::Borrowed("service"),
            origin: Cow::Borrowed("handler"),
            input: String::new(),
        }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized.as_str(),
            detail,
        )
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::BadRequest.as_str(), detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ErrorCode::NotFound.as_str(), detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal.as_str(),
            detail,
        )
    }

    /// Component name used for log attribution.
    pub fn with_component(mut self, component: impl Into<Cow<'static, str>>) -> Self {
        self.component = component.into();
        self
    }

    /// Where the failure was detected.
    pub fn with_source(mut self, origin: impl Into<Cow<'static, str>>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Request body to include in the log line.
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl From<SigningError> for ServiceError {
    fn from(e: SigningError) -> Self {
        ServiceError::internal(format!("token issuance failed: {e}"))
    }
}

impl From<DecodeError> for ServiceError {
    fn from(e: DecodeError) -> Self {
        ServiceError::unauthorized(format!("invalid token: {e}"))
    }
}

impl From<VerifyError> for ServiceError {
    fn from(e: VerifyError) -> Self {
        ServiceError::unauthorized(e.to_string())
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        ErrorReport {
            component: &self.component,
            source: &self.origin,
            status: self.status,
            code: &self.code,
            cause: &self.detail,
            input: &self.input,
        }
        .respond(None)
    }
}
