//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use domains::{DomainError, Session};

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, from an `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Session);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| DomainError::Unauthorized("missing bearer token".to_string()))?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| DomainError::Unauthorized("malformed authorization header".to_string()))?;

        Ok(CurrentUser(state.tokens.verify(token)?))
    }
}
