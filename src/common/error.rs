use crate::common::response::ApiError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Range not satisfiable for object of {total} bytes")]
    InvalidRange { total: u64 },

    #[error("Object {0} is empty")]
    EmptyObject(String),

    #[error("Encoder failed: {0}")]
    EncodeFailure(String),

    #[error("Storage operation failed: {0}")]
    StoreFailure(String),

    #[error("Unknown quality: {0}")]
    UnknownQuality(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRange { .. } | AppError::EmptyObject(_) => {
                StatusCode::RANGE_NOT_SATISFIABLE
            }
            AppError::UnknownQuality(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::EncodeFailure(_) | AppError::StoreFailure(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let mut response = ApiError(self.to_string(), status).into_response();

        // 416 must tell the client how large the object actually is.
        if let AppError::InvalidRange { total } = &self {
            if let Ok(value) = format!("bytes */{}", total).parse() {
                response.headers_mut().insert(header::CONTENT_RANGE, value);
            }
        }

        response
    }
}
