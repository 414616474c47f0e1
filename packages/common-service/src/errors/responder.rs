//! Uniform `{code, id}` failure responses.
//!
//! Every failure gets a fresh random id that appears both in the response
//! body and in a single log line, so a client report can be matched to the
//! server-side cause without exposing that cause to the client.

use std::fmt;

use actix_web::http::header::{self, HeaderName, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Length of the generated error id.
pub const ERROR_ID_LEN: usize = 10;

pub(crate) const ERROR_ID_HEADER: &str = "x-error-id";

/// Client-visible error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub id: String,
}

/// Random alphanumeric id for log correlation. Not suitable for security
/// decisions.
pub fn rand_id(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// JSON rendering of a request body for the `input` log field. Falls back to
/// `{}` when the value cannot be serialized.
pub fn stringify_body<T: Serialize + ?Sized>(body: &T) -> String {
    serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string())
}

/// Everything needed to log and render one failure.
pub struct ErrorReport<'a> {
    pub component: &'a str,
    /// Where the failure was detected (handler or middleware name)
    pub source: &'a str,
    pub status: StatusCode,
    pub code: &'a str,
    /// Server-side reason; logged, never sent to the client
    pub cause: &'a dyn fmt::Display,
    /// Raw request body for debugging, empty when not relevant
    pub input: &'a str,
}

impl ErrorReport<'_> {
    /// Log once and build the response. Each call produces a new id.
    pub fn respond(&self, req: Option<&HttpRequest>) -> HttpResponse {
        let id = rand_id(ERROR_ID_LEN);
        let method = req.map(|r| r.method().to_string()).unwrap_or_default();
        let path = req.map(|r| r.path().to_string()).unwrap_or_default();
        let status_code = self.status.as_u16();

        if self.status.is_server_error() {
            error!(component = %self.component, source = %self.source, code = %self.code, error = %self.cause, id = %id, input = %self.input, http.method = %method, url.path = %path, http.status_code = status_code, "endpoint_error");
        } else {
            warn!(component = %self.component, source = %self.source, code = %self.code, error = %self.cause, id = %id, input = %self.input, http.method = %method, url.path = %path, http.status_code = status_code, "endpoint_error");
        }

        let id_header = HeaderValue::from_str(&id)
            .unwrap_or_else(|_| HeaderValue::from_static("invalid-id"));

        HttpResponse::build(self.status)
            .insert_header((header::CONTENT_TYPE, HeaderValue::from_static("application/json")))
            .insert_header((HeaderName::from_static(ERROR_ID_HEADER), id_header))
            .json(ErrorResponse {
                code: self.code.to_string(),
                id,
            })
    }
}

/// Log a failure and build its `{code, id}` response.
pub fn construct_error_response(
    req: &HttpRequest,
    component: &str,
    status: StatusCode,
    cause: &dyn fmt::Display,
    code: &str,
    input_body: &str,
    source: &str,
) -> HttpResponse {
    ErrorReport {
        component,
        source,
        status,
        code,
        cause,
        input: input_body,
    }
    .respond(Some(req))
}
