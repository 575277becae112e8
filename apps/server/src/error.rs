use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use propdesk_core::errors::{Error as CoreError, StoreError};
use serde::Serialize;
use thiserror::Error;

#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("Not Found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::NotFound(_) | CoreError::Store(StoreError::NotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        CoreError::Store(StoreError::PermissionDenied(_)) => StatusCode::FORBIDDEN,
        CoreError::Store(_) | CoreError::Search(_) => StatusCode::BAD_GATEWAY,
        CoreError::InvalidTransition(_) => StatusCode::CONFLICT,
        CoreError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::Core(e) => (core_status(e), e.user_message()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            ApiError::Internal(reason) => (StatusCode::INTERNAL_SERVER_ERROR, reason.clone()),
            ApiError::Anyhow(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };
        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", status, self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use propdesk_core::errors::ValidationError;

    #[test]
    fn test_core_error_statuses() {
        let validation = CoreError::from(ValidationError::UnchangedPrice("95".to_string()));
        assert_eq!(core_status(&validation), StatusCode::BAD_REQUEST);
        assert_eq!(
            core_status(&CoreError::Store(StoreError::NotFound("P-1".into()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            core_status(&CoreError::Store(StoreError::Network("timeout".into()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            core_status(&CoreError::InvalidTransition("confirmed twice".into())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_network_failure_uses_friendly_message() {
        let response =
            ApiError::from(CoreError::Store(StoreError::Network("reset".into()))).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
