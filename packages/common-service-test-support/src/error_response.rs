//! Assertions for the `{code, id}` error contract.
//!
//! Kept independent of common-service types so the contract is checked as a
//! client would see it.

use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::http::StatusCode;
use serde::Deserialize;

/// Length of the id the responder generates.
pub const EXPECTED_ID_LEN: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ErrorBodyLike {
    code: String,
    id: String,
}

/// Assert the response is a well-formed error body and return its `id`.
///
/// Checks:
/// - status matches
/// - `Content-Type: application/json`
/// - body is exactly `{code, id}` with the expected code
/// - `id` is 10 ASCII alphanumerics and equals the `x-error-id` header
pub async fn assert_error_response<B>(
    resp: ServiceResponse<B>,
    expected_status: StatusCode,
    expected_code: &str,
) -> String
where
    B: actix_web::body::MessageBody + 'static,
{
    let resp: ServiceResponse<BoxBody> = resp.map_into_boxed_body();
    assert_eq!(resp.status(), expected_status);

    let headers = resp.headers().clone();
    let content_type = headers
        .get(CONTENT_TYPE)
        .expect("Content-Type header should be present")
        .to_str()
        .expect("Content-Type should be valid UTF-8");
    assert_eq!(content_type, "application/json");

    let body = actix_web::test::read_body(resp).await;
    let parsed: ErrorBodyLike =
        serde_json::from_slice(&body).expect("body should be a {code, id} JSON object");

    assert_eq!(parsed.code, expected_code);
    assert_eq!(parsed.id.len(), EXPECTED_ID_LEN, "id: {}", parsed.id);
    assert!(
        parsed.id.chars().all(|c| c.is_ascii_alphanumeric()),
        "id should be alphanumeric: {}",
        parsed.id
    );

    let header_id = headers
        .get("x-error-id")
        .expect("x-error-id header should be present")
        .to_str()
        .expect("x-error-id should be valid UTF-8");
    assert_eq!(parsed.id, header_id, "body id should match x-error-id header");

    parsed.id
}
