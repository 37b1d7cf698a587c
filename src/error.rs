use poem::http::StatusCode;
use poem::{Error as PoemError, Response};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("Please Login First")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON error body shared by every endpoint.
    pub fn into_response(self) -> Response {
        error_response(self.status_code(), &self.to_string())
    }
}

pub fn error_response(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "message": message,
        "statusCode": status.as_u16(),
    });
    Response::builder()
        .status(status)
        .content_type("application/json")
        .body(body.to_string())
}

impl From<AppError> for PoemError {
    fn from(err: AppError) -> Self {
        if let AppError::Internal(ref source) = err {
            tracing::error!("Request failed: {:#}", source);
        }
        PoemError::from_response(err.into_response())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => AppError::BadRequest(msg),
            StoreError::Backend(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}
