use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::backend::BackendError;
use crate::orders::OrderError;
use crate::pricing::PricingError;
use crate::uploads::UploadError;

/// Errors surfaced by the HTTP layer. The body is always
/// `{"error": "<message>"}` with the platform's message passed through.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Platform rejections of the caller's request keep their 4xx status;
/// anything else from upstream is a bad gateway.
fn backend_status(error: &BackendError) -> StatusCode {
    match error {
        BackendError::Api { status, .. } if (400..500).contains(status) => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
        }
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(AuthError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Auth(AuthError::NotSignedIn) => StatusCode::UNAUTHORIZED,
            AppError::Auth(AuthError::ProfileNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Auth(AuthError::NoUserReturned) => StatusCode::BAD_GATEWAY,
            AppError::Auth(AuthError::Backend(e)) => backend_status(e),
            AppError::Pricing(PricingError::Backend(e)) => backend_status(e),
            AppError::Pricing(PricingError::InvalidRule { .. }) => StatusCode::BAD_GATEWAY,
            AppError::Pricing(_) => StatusCode::BAD_REQUEST,
            AppError::Order(OrderError::Backend(e)) => backend_status(e),
            AppError::Order(OrderError::Pricing(PricingError::Backend(e))) => backend_status(e),
            AppError::Order(_) => StatusCode::BAD_REQUEST,
            AppError::Upload(UploadError::NoFiles) => StatusCode::BAD_REQUEST,
            AppError::Upload(UploadError::Partial { source, .. }) => backend_status(source),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Upload(error @ UploadError::Partial { .. }) => {
                json!({ "error": error.to_string(), "uploaded": error.uploaded() })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
