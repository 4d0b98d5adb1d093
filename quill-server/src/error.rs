use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use quill_core::CoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("{0}")]
    Unauthenticated(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Core(err) => match err {
                CoreError::EmailTaken
                | CoreError::WeakPassword(_)
                | CoreError::InvalidCredentials
                | CoreError::Validation { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
                CoreError::InvalidToken => (StatusCode::UNAUTHORIZED, err.to_string()),
                CoreError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
                CoreError::Database(_) | CoreError::Hash(_) => {
                    tracing::error!("Internal error: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".into(),
                    )
                }
            },
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
