//! Session token authentication extractors.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "x-token";

fn token_from_parts(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extractor for authenticated callers.
///
/// Rejects the request with 401 unless the `X-Token` header resolves to a
/// user.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub i64);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or_else(ApiError::unauthorized)?;

        match state.sessions.resolve(token).await? {
            Some(user_id) => Ok(AuthUser(user_id)),
            None => {
                tracing::debug!("Session token did not resolve");
                Err(ApiError::unauthorized())
            }
        }
    }
}

/// Optional authentication extractor.
///
/// A missing or unknown token yields an anonymous caller instead of a
/// rejection.
#[derive(Debug, Clone, Copy)]
pub struct OptionalAuthUser(pub Option<i64>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for OptionalAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = token_from_parts(parts) else {
            return Ok(OptionalAuthUser(None));
        };

        Ok(OptionalAuthUser(state.sessions.resolve(token).await?))
    }
}
