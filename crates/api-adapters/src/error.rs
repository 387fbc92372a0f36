//! # ApiError
//!
//! HTTP projection of [`DomainError`]. Every failure leaves the API as
//! `{"error": "<CODE>", "message": "<text>"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use serde::Serialize;

#[derive(Debug)]
pub struct ApiError(pub DomainError);

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::NotFound(..) => StatusCode::NOT_FOUND,
            DomainError::InvalidTransition { .. } => StatusCode::CONFLICT,
            DomainError::Store(_) | DomainError::Upload(_) | DomainError::Notify(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self(DomainError::Validation(message.into()))
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            // Store details stay in the logs.
            DomainError::Store(_) => {
                tracing::error!(error = %self.0, "request failed in the store");
                "the marketplace is temporarily unavailable, please try again".to_string()
            }
            other => {
                if status.is_server_error() {
                    tracing::error!(error = %other, "request failed");
                }
                other.to_string()
            }
        };
        let body = ErrorBody { error: self.0.code(), message };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::ItemStatus;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        let cases = [
            (DomainError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (DomainError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (DomainError::not_found("Item", "1"), StatusCode::NOT_FOUND),
            (
                DomainError::InvalidTransition { from: ItemStatus::Sold, to: ItemStatus::Active },
                StatusCode::CONFLICT,
            ),
            (DomainError::Store("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (DomainError::Upload("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[tokio::test]
    async fn body_carries_code_and_message() {
        let response = ApiError(DomainError::not_found("Item", "42")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "NOT_FOUND");
        assert_eq!(body["message"], "Item not found with ID 42");
    }

    #[tokio::test]
    async fn store_details_are_not_leaked() {
        let response = ApiError(DomainError::Store("password authentication failed".into())).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "STORE_ERROR");
        assert!(!body["message"].as_str().unwrap().contains("password"));
    }
}
