//! Bearer-token middleware for protecting API endpoints.
//!
//! Token issuing belongs to the external auth service; this middleware
//! only verifies HS256 bearer tokens with the shared secret and injects
//! the caller's identity into the request. Handlers take the identity via
//! the `AuthContext` extractor.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use mo_shared::types::ErrorResponse;
use serde::{Deserialize, Serialize};
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};
use uuid::Uuid;

/// JWT claims shared with the token issuer
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the caller's user id
    pub sub: String,
    /// Expiration timestamp (seconds since epoch)
    pub exp: usize,
}

/// Caller identity injected into authenticated requests
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User ID extracted from the token's subject claim
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates an authentication context from verified claims
    pub fn from_claims(claims: &Claims) -> Result<Self, String> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|e| format!("subject is not a valid user id: {}", e))?;
        Ok(Self { user_id })
    }
}

/// Bearer-token middleware factory
pub struct JwtAuth {
    jwt_secret: String,
}

impl JwtAuth {
    /// Creates a middleware verifying tokens with the given secret
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            jwt_secret: self.jwt_secret.clone(),
        }))
    }
}

/// Bearer-token middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    jwt_secret: String,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let jwt_secret = self.jwt_secret.clone();

        Box::pin(async move {
            let token = match extract_bearer_token(&req) {
                Some(token) => token,
                None => {
                    return Ok(unauthorized(req, "Missing or invalid Authorization header"));
                }
            };

            let auth_context = match verify_token(&token, &jwt_secret) {
                Ok(context) => context,
                Err(e) => {
                    return Ok(unauthorized(
                        req,
                        format!("Token verification failed: {}", e),
                    ));
                }
            };

            req.extensions_mut().insert(auth_context);
            service
                .call(req)
                .await
                .map(|res| res.map_into_left_body())
        })
    }
}

/// Short-circuit with the standard 401 error body
fn unauthorized<B>(req: ServiceRequest, message: impl Into<String>) -> ServiceResponse<EitherBody<B>> {
    let response = HttpResponse::Unauthorized().json(ErrorResponse::new("UNAUTHORIZED", message));
    req.into_response(response).map_into_right_body()
}

/// Extracts a Bearer token from the Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.to_string())
}

/// Verify an HS256 token and build the caller identity
fn verify_token(token: &str, secret: &str) -> Result<AuthContext, String> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("token decode error: {}", e))?;

    AuthContext::from_claims(&token_data.claims)
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ErrorUnauthorized("Authentication required"));

        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    #[test]
    fn test_extract_bearer_token() {
        use actix_web::test;

        let req = test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer test_token_123"))
            .to_srv_request();
        assert_eq!(extract_bearer_token(&req), Some("test_token_123".to_string()));

        let req_no_bearer = test::TestRequest::default()
            .insert_header((AUTHORIZATION, "test_token_123"))
            .to_srv_request();
        assert_eq!(extract_bearer_token(&req_no_bearer), None);

        let req_no_header = test::TestRequest::default().to_srv_request();
        assert_eq!(extract_bearer_token(&req_no_header), None);
    }

    #[test]
    fn test_verify_token_round_trip() {
        let secret = "unit-test-secret";
        let user_id = Uuid::new_v4();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (chrono::Utc::now().timestamp() + 600) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let context = verify_token(&token, secret).unwrap();
        assert_eq!(context.user_id, user_id);

        assert!(verify_token(&token, "wrong-secret").is_err());
    }

    #[test]
    fn test_verify_token_rejects_non_uuid_subject() {
        let secret = "unit-test-secret";
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            exp: (chrono::Utc::now().timestamp() + 600) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, secret).is_err());
    }
}
