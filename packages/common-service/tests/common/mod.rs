#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use actix_web::{HttpResponse, Responder};
use common_service::{Account, Caller, Claims, SecurityConfig, TokenCodec};
use serde_json::json;

pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes_only";
pub const ISSUER: &str = "common-service-tests";

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    common_service_test_support::logging::init();
}

pub fn codec() -> Arc<TokenCodec<Account>> {
    Arc::new(TokenCodec::new(SecurityConfig::new(TEST_SECRET)))
}

pub fn account(uuid: &str) -> Account {
    Account {
        uuid: uuid.to_string(),
        name: "Test User".to_string(),
        email: format!("{uuid}@example.test"),
        username: uuid.replace('-', "_"),
        associated_accounts: vec![format!("google:{uuid}")],
        ..Account::default()
    }
}

pub fn mint(codec: &TokenCodec<Account>, subject: &str, validity: Duration) -> String {
    codec
        .encode(ISSUER, validity, subject, &account(subject))
        .expect("minting a test token should succeed")
}

/// Echoes the caller as JSON; `{"anonymous": true}` when no claims.
pub async fn whoami(caller: Caller<Claims<Account>>) -> impl Responder {
    match caller {
        Caller::Authenticated(claims) => HttpResponse::Ok().json(json!({
            "subject": claims.subject(),
            "issuer": claims.issuer(),
            "identity": claims.identity(),
        })),
        Caller::Anonymous => HttpResponse::Ok().json(json!({ "anonymous": true })),
    }
}
