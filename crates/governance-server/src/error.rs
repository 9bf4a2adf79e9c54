//! API error type and its HTTP mapping

use crate::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use stackwave_contract::{DecimalError, ErrorBody, ValidationError};
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Arithmetic(#[from] DecimalError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Storage(_) | ApiError::Arithmetic(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Validation(e) => ErrorBody {
                message: e.message.clone(),
                field: e.field.clone(),
            },
            ApiError::Unauthorized => ErrorBody::new("Unauthorized"),
            ApiError::Storage(_) | ApiError::Arithmetic(_) => {
                ErrorBody::new("Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(self.body())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
