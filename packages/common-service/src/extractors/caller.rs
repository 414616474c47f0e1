use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};

use crate::error::ServiceError;
use crate::middleware::jwt_auth::VerifiedClaims;

/// Identity of the caller as established by [`crate::middleware::JwtAuth`].
///
/// Extraction never fails: `Anonymous` is the expected state for optional
/// routes reached without a credential.
#[derive(Debug, Clone, PartialEq)]
pub enum Caller<C> {
    Authenticated(C),
    Anonymous,
}

impl<C: Clone + 'static> Caller<C> {
    /// Look up the claims attached to `req`.
    pub fn from_request_ref(req: &HttpRequest) -> Self {
        match req.extensions().get::<VerifiedClaims<C>>() {
            Some(VerifiedClaims(claims)) => Caller::Authenticated(claims.clone()),
            None => Caller::Anonymous,
        }
    }
}

impl<C> Caller<C> {
    pub fn claims(&self) -> Option<&C> {
        match self {
            Caller::Authenticated(claims) => Some(claims),
            Caller::Anonymous => None,
        }
    }

    pub fn into_claims(self) -> Option<C> {
        match self {
            Caller::Authenticated(claims) => Some(claims),
            Caller::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Caller::Authenticated(_))
    }
}

impl<C: Clone + 'static> FromRequest for Caller<C> {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Caller::from_request_ref(req)))
    }
}

/// Claims that must be present; responds 401 otherwise.
#[derive(Debug, Clone)]
pub struct AuthClaims<C>(pub C);

impl<C: Clone + 'static> FromRequest for AuthClaims<C> {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = Caller::<C>::from_request_ref(req)
            .into_claims()
            .map(AuthClaims)
            .ok_or_else(|| {
                ServiceError::unauthorized("no verified claims attached to request")
                    .with_source("AuthClaims")
            });
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Fake(&'static str);

    #[test]
    fn absent_claims_are_anonymous() {
        let req = TestRequest::default().to_http_request();
        let caller = Caller::<Fake>::from_request_ref(&req);
        assert_eq!(caller, Caller::Anonymous);
        assert!(caller.claims().is_none());
    }

    #[test]
    fn attached_claims_are_returned() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(VerifiedClaims(Fake("user-42")));

        let caller = Caller::<Fake>::from_request_ref(&req);
        assert!(caller.is_authenticated());
        assert_eq!(caller.into_claims(), Some(Fake("user-42")));
    }

    #[test]
    fn bare_values_of_the_same_type_are_ignored() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(Fake("not-from-middleware"));

        assert_eq!(Caller::<Fake>::from_request_ref(&req), Caller::Anonymous);
    }

    #[actix_web::test]
    async fn auth_claims_requires_presence() {
        let (req, mut payload) = TestRequest::default().to_http_parts();
        let err = AuthClaims::<Fake>::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.status(), actix_web::http::StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "MX401");
    }
}
