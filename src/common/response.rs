//! `{status, message, data}` envelope shared by every JSON endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Error,
}

#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub status: Outcome,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, message: &str) -> Self {
        Self {
            status: Outcome::Success,
            message: message.to_string(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Outcome::Error,
            message: message.into(),
            data: None,
        }
    }
}

/// Successful envelope plus the status code it is sent with.
pub struct ApiSuccess<T> {
    status: StatusCode,
    body: ApiResponse<T>,
}

impl<T: Serialize> ApiSuccess<T> {
    pub fn ok(data: T, message: &str) -> Self {
        Self::with_status(StatusCode::OK, data, message)
    }

    pub fn created(data: T, message: &str) -> Self {
        Self::with_status(StatusCode::CREATED, data, message)
    }

    /// Work was queued, not finished.
    pub fn accepted(data: T, message: &str) -> Self {
        Self::with_status(StatusCode::ACCEPTED, data, message)
    }

    fn with_status(status: StatusCode, data: T, message: &str) -> Self {
        Self {
            status,
            body: ApiResponse::success(data, message),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub struct ApiError(pub String, pub StatusCode);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError(message, status) = self;
        (status, Json(ApiResponse::error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_carries_data() {
        let body = serde_json::to_value(ApiResponse::success(42, "ok")).unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "ok");
        assert_eq!(body["data"], 42);
    }

    #[test]
    fn error_envelope_has_no_data() {
        let body = serde_json::to_value(ApiResponse::error("boom")).unwrap();
        assert_eq!(body["status"], "error");
        assert!(body["data"].is_null());
    }

    #[test]
    fn success_constructors_pick_status_codes() {
        assert_eq!(ApiSuccess::ok(1, "x").into_response().status(), StatusCode::OK);
        assert_eq!(ApiSuccess::created(1, "x").into_response().status(), StatusCode::CREATED);
        assert_eq!(ApiSuccess::accepted(1, "x").into_response().status(), StatusCode::ACCEPTED);
    }
}
