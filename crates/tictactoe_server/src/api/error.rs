//! Mapping from gateway errors to HTTP responses.

use super::dto::ErrorEnvelope;
use crate::error::{GameError, GatewayError, StoreErrorKind};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::Display;
use tracing::{error, warn};

/// Error returned by HTTP handlers.
#[derive(Debug, Display)]
pub enum ApiError {
    /// A gateway operation failed.
    #[display("{}", _0)]
    Gateway(GatewayError),
    /// The request could not be understood.
    #[display("{}", _0)]
    BadRequest(String),
    /// The path names no resource.
    #[display("{}", _0)]
    NotFound(String),
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError::Gateway(err)
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        ApiError::Gateway(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Gateway(GatewayError::Game(err)) => match err {
                GameError::GameNotFound(_) => StatusCode::NOT_FOUND,
                GameError::AiNoMoveAvailable => StatusCode::INTERNAL_SERVER_ERROR,
                GameError::InvalidPosition { .. }
                | GameError::CellOccupied { .. }
                | GameError::WrongTurn { .. }
                | GameError::NotInProgress
                | GameError::NotJoinable
                | GameError::NotAPlayer(_) => StatusCode::BAD_REQUEST,
            },
            ApiError::Gateway(GatewayError::Store(err)) => match err.kind {
                StoreErrorKind::Timeout => StatusCode::SERVICE_UNAVAILABLE,
                StoreErrorKind::Backend | StoreErrorKind::Corrupt => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Message shown to the client. Store details stay in the logs.
    fn client_message(&self) -> String {
        match self {
            ApiError::Gateway(GatewayError::Store(err)) if err.kind == StoreErrorKind::Timeout => {
                "Server busy, please retry".to_string()
            }
            ApiError::Gateway(GatewayError::Store(_)) => "Server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, error = %self, "Request failed");
        } else {
            warn!(status = %status, error = %self, "Request rejected");
        }

        let body = ErrorEnvelope::new(self.client_message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::session::GameId;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (GameError::GameNotFound(GameId::new()).into(), StatusCode::NOT_FOUND),
            (GameError::NotJoinable.into(), StatusCode::BAD_REQUEST),
            (
                GameError::CellOccupied { row: 0, col: 0 }.into(),
                StatusCode::BAD_REQUEST,
            ),
            (GameError::AiNoMoveAvailable.into(), StatusCode::INTERNAL_SERVER_ERROR),
            (
                GatewayError::from(StoreError::timeout("slow")).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                GatewayError::from(StoreError::corrupt("bad")).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::BadRequest("nope".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("gone".into()), StatusCode::NOT_FOUND),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{err}");
        }
    }

    #[test]
    fn test_store_details_are_hidden() {
        let err: ApiError = GatewayError::from(StoreError::backend("disk on fire")).into();
        assert_eq!(err.client_message(), "Server error");
    }
}
