//! Bearer-token authentication for the dashboard surface.
//!
//! `JwtConfig` is attached to the router as an `Extension`; `jwt_auth` runs
//! in front of protected routes, verifies the `Authorization: Bearer` header
//! and injects an [`AuthenticatedUser`] for handlers to extract.

use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
    Extension,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Signed claim set. `sub` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity injected into request extensions after verification.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Clone)]
pub struct JwtConfig {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_minutes: i64,
}

impl JwtConfig {
    pub fn from_secret(secret: &[u8], ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_minutes,
        }
    }

    /// Token lifetime in seconds, reported to clients as `expires_in`.
    pub fn expires_in_secs(&self) -> i64 {
        self.ttl_minutes * 60
    }

    /// Issue a token for the given identity.
    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.ttl_minutes)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode token: {e}")))
    }

    /// Verify a token and return its claims. Any decode failure, including
    /// expiry, is an authentication failure.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized)
    }
}

/// Require a valid bearer token; inject the authenticated identity.
pub async fn jwt_auth(
    Extension(config): Extension<JwtConfig>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let claims = config.verify(token)?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: claims.sub,
        username: claims.username,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig::from_secret(b"unit-test-secret", 60)
    }

    #[test]
    fn test_issue_then_verify_round_trip() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let token = config.issue(user_id, "alex").unwrap();
        let claims = config.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "alex");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = test_config().issue(Uuid::new_v4(), "alex").unwrap();
        let other = JwtConfig::from_secret(b"another-secret", 60);

        assert!(matches!(other.verify(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Issue a token that expired well outside the default leeway.
        let config = JwtConfig::from_secret(b"unit-test-secret", -10);
        let token = config.issue(Uuid::new_v4(), "alex").unwrap();

        assert!(matches!(config.verify(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            test_config().verify("not-a-token"),
            Err(AppError::Unauthorized)
        ));
    }
}
