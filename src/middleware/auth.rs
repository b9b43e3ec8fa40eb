use axum::{
    extract::{Extension, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

use crate::error::FeedError;
use crate::models::auth::Claims;
use crate::AppState;

/// Signs an admin token valid for `days`
pub fn create_admin_token(subject: &str, secret: &str, days: i64) -> Result<String, FeedError> {
    let now = Utc::now();
    let claims = Claims {
        sub: subject.to_string(),
        is_admin: true,
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(days)).timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

pub fn verify_jwt_token(token: &str, secret: &str) -> Result<Claims, FeedError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Guards the admin API: requires `Authorization: Bearer <jwt>` with `is_admin`
pub async fn admin_auth_middleware(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, FeedError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| FeedError::Unauthorized("Missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| FeedError::Unauthorized("Invalid Authorization header format".to_string()))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        FeedError::Unauthorized(
            "Invalid Authorization header format. Expected 'Bearer <token>'".to_string(),
        )
    })?;

    let claims = verify_jwt_token(token, &state.config.jwt_secret).map_err(|e| {
        tracing::warn!("JWT verification failed: {}", e);
        FeedError::Unauthorized("Invalid or expired token".to_string())
    })?;

    if !claims.is_admin {
        return Err(FeedError::Unauthorized("Admin access required".to_string()));
    }

    // Add the claims to the request extensions so handlers can access them
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
