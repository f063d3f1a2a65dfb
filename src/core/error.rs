//! 核心错误处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use super::response::Envelope;
use crate::users::store::{join_fields, StoreError};

pub const INVALID_USER_ID: &str = "Invalid userId. Please provide a valid UUID.";
pub const USER_NOT_FOUND: &str = "User not found with the provided userId.";
pub const ROUTE_NOT_FOUND: &str = "The requested resource was not found.";
pub const INTERNAL_FAILURE: &str = "An unexpected error occurred. Please try again later.";

/// HTTP 边界上的错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    /// 细节只写入日志，不返回给调用方
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn invalid_user_id() -> Self {
        ApiError::BadRequest(INVALID_USER_ID.to_string())
    }

    pub fn route_not_found() -> Self {
        ApiError::NotFound(ROUTE_NOT_FOUND.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::NotFound(USER_NOT_FOUND.to_string()),
            StoreError::InvalidFields(fields) => ApiError::BadRequest(format!(
                "Missing or invalid required fields: {}.",
                join_fields(&fields)
            )),
            err @ StoreError::IdExhausted { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg,
            ApiError::Internal(detail) => {
                error!(%detail, "请求处理失败");
                INTERNAL_FAILURE.to_string()
            }
        };

        Envelope::error(status, message).into_response()
    }
}
