//! JWT enforcement middleware
//!
//! Reads `Authorization: <scheme> <token>`, decodes the token through a
//! [`TokenVerifier`] and stores the claims in request extensions, where the
//! [`crate::extractors::Caller`] extractor finds them. Rejections are plain
//! 401 responses built by the error responder; the downstream service is not
//! called.
//!
//! ```ignore
//! let codec = Arc::new(TokenCodec::<Account>::new(SecurityConfig::from_env()?));
//!
//! App::new().service(
//!     web::scope("/api")
//!         .wrap(JwtAuth::mandatory("accounts", codec.clone()))
//!         .configure(routes::configure),
//! )
//! ```

use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::{header, StatusCode};
use actix_web::{Error as ActixError, HttpMessage};
use futures_util::future::LocalBoxFuture;
use thiserror::Error;
use tracing::debug;

use crate::auth::verifier::TokenVerifier;
use crate::errors::error_code::ErrorCode;
use crate::errors::responder::construct_error_response;

const SOURCE: &str = "JwtAuth";

/// Why a request was rejected. Only logged; every variant renders the same
/// client-visible code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing credential in Authorization header")]
    MissingCredential,
    #[error("malformed Authorization header")]
    MalformedHeader,
    #[error("invalid token: {0}")]
    InvalidToken(String),
}

impl AuthError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::Unauthorized
    }
}

/// Claims slot in request extensions. The wrapper keeps the key distinct
/// from any other value of the same type.
#[derive(Debug, Clone)]
pub(crate) struct VerifiedClaims<C>(pub(crate) C);

pub struct JwtAuth<V> {
    component: Rc<str>,
    mandatory: bool,
    verifier: Arc<V>,
}

impl<V: TokenVerifier> JwtAuth<V> {
    pub fn new(component: &str, mandatory: bool, verifier: Arc<V>) -> Self {
        Self {
            component: Rc::from(component),
            mandatory,
            verifier,
        }
    }

    /// Requests without a credential are rejected.
    pub fn mandatory(component: &str, verifier: Arc<V>) -> Self {
        Self::new(component, true, verifier)
    }

    /// Requests without a credential pass through anonymously.
    pub fn optional(component: &str, verifier: Arc<V>) -> Self {
        Self::new(component, false, verifier)
    }
}

impl<V> Clone for JwtAuth<V> {
    fn clone(&self) -> Self {
        Self {
            component: self.component.clone(),
            mandatory: self.mandatory,
            verifier: self.verifier.clone(),
        }
    }
}

impl<S, B, V> Transform<S, ServiceRequest> for JwtAuth<V>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
    V: TokenVerifier,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = ActixError;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S, V>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service,
            component: self.component.clone(),
            mandatory: self.mandatory,
            verifier: self.verifier.clone(),
        }))
    }
}

pub struct JwtAuthMiddleware<S, V> {
    service: S,
    component: Rc<str>,
    mandatory: bool,
    verifier: Arc<V>,
}

impl<S, V: TokenVerifier> JwtAuthMiddleware<S, V> {
    /// `Ok(None)` means an anonymous request allowed by policy.
    fn authenticate(&self, req: &ServiceRequest) -> Result<Option<V::Claims>, AuthError> {
        let raw = match req.headers().get(header::AUTHORIZATION) {
            Some(value) => value.to_str().map_err(|_| AuthError::MalformedHeader)?,
            None => "",
        };

        if raw.is_empty() {
            return if self.mandatory {
                Err(AuthError::MissingCredential)
            } else {
                Ok(None)
            };
        }

        let token = extract_credential(raw)?;

        self.verifier
            .decode(token)
            .map(Some)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

impl<S, B, V> Service<ServiceRequest> for JwtAuthMiddleware<S, V>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
    V: TokenVerifier,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.authenticate(&req) {
            Ok(Some(claims)) => {
                // Store claims in request extensions BEFORE calling the service
                req.extensions_mut().insert(VerifiedClaims(claims));
            }
            Ok(None) => {
                debug!(component = %self.component, "no credential; continuing anonymously");
            }
            Err(rejection) => {
                let response = construct_error_response(
                    req.request(),
                    &self.component,
                    StatusCode::UNAUTHORIZED,
                    &rejection,
                    rejection.code().as_str(),
                    "",
                    SOURCE,
                );
                let res = req.into_response(response).map_into_right_body();
                return Box::pin(ready(Ok(res)));
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
    }
}

/// Second token of `"<scheme> <credential>"`, split on the first space.
fn extract_credential(header_value: &str) -> Result<&str, AuthError> {
    match header_value.split_once(' ') {
        Some((_, token)) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}
