//! Guest session tokens and the two request guards: a JWT check for guests
//! and an API key check for admin routes.

use crate::{api::error::ApiError, state::AppState};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const ADMIN_API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub exp: usize,
}

/// Name of the authenticated guest, inserted into request extensions by
/// [`require_guest_token`].
#[derive(Debug, Clone)]
pub struct GuestName(pub String);

pub fn generate_token(username: &str, secret: &str, expiry: Duration) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = chrono::Utc::now().timestamp() as usize + expiry.as_secs() as usize;

    let claims = Claims {
        username: username.to_owned(),
        exp,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
}

/// Reject requests without a valid guest token, or whose guest is no longer
/// on the list. The `Bearer ` prefix is optional.
pub async fn require_guest_token(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|h| h.strip_prefix("Bearer ").unwrap_or(h).trim())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("missing token".to_string()))?;

    let claims = verify_token(token, &state.config.jwt_secret).map_err(|e| {
        debug!("Token validation failed: {}", e);
        ApiError::Unauthorized("invalid token".to_string())
    })?;

    if state.guests.validate_guest_access(&claims.username).await?.is_none() {
        warn!("Token presented for guest no longer on the list: {}", claims.username);
        return Err(ApiError::Forbidden("You are not on the guest list".to_string()));
    }

    debug!("Authenticated guest: {}", claims.username);
    request.extensions_mut().insert(GuestName(claims.username));

    Ok(next.run(request).await)
}

pub async fn require_admin_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = request
        .headers()
        .get(ADMIN_API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    if key != Some(state.config.admin_api_key.as_str()) {
        warn!("Rejected admin request with missing or wrong API key");
        return Err(ApiError::Unauthorized("invalid API key".to_string()));
    }

    Ok(next.run(request).await)
}
