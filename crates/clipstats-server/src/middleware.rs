use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// JWT bearer-token claims issued by the platform's auth service.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub role: Option<String>,
}

impl Claims {
    #[must_use]
    pub fn is_staff(&self) -> bool {
        matches!(self.role.as_deref(), Some("STAFF" | "ADMIN"))
    }
}

#[derive(Clone)]
pub struct AuthState {
    decoding_key: Arc<DecodingKey>,
    validation: Validation,
}

impl AuthState {
    #[must_use]
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            decoding_key: Arc::new(DecodingKey::from_secret(jwt_secret.as_bytes())),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Decode and validate a bearer token.
    ///
    /// # Errors
    ///
    /// Returns the `jsonwebtoken` error for expired, malformed, or
    /// wrongly-signed tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }
}

/// Axum middleware that requires a valid `Authorization: Bearer` token and
/// stores the decoded [`Claims`] as a request extension.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    match auth.verify(token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "rejected bearer token");
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        exp: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        role: Option<String>,
    }

    const SECRET: &str = "0123456789abcdef";

    fn token(exp_offset_secs: i64, role: Option<&str>) -> String {
        let claims = TestClaims {
            sub: "u1".to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset_secs,
            role: role.map(str::to_string),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_round_trips() {
        let auth = AuthState::new(SECRET);
        let claims = auth.verify(&token(3600, Some("STAFF"))).unwrap();
        assert_eq!(claims.sub, "u1");
        assert!(claims.is_staff());
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = AuthState::new(SECRET);
        assert!(auth.verify(&token(-3600, None)).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let auth = AuthState::new("another-secret-value");
        assert!(auth.verify(&token(3600, None)).is_err());
    }

    #[test]
    fn plain_user_is_not_staff() {
        let auth = AuthState::new(SECRET);
        let claims = auth.verify(&token(3600, None)).unwrap();
        assert!(!claims.is_staff());
    }
}
