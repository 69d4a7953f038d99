use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::extract::JsonBody;
use super::session::Viewer;
use crate::app_system::{AppError, PortalSystem};
use crate::auth::{SignInForm, SignUpForm};
use crate::clients::JobDetails;
use crate::domain::{QuoteRequest, SelectedFile};

/// Body of `POST /api/orders`: the job configuration plus its free-text details.
#[derive(Debug, Deserialize)]
pub struct OrderSubmission {
    #[serde(flatten)]
    pub request: QuoteRequest,
    #[serde(flatten)]
    pub details: JobDetails,
}

pub async fn sign_up_handler(
    State(system): State<PortalSystem>,
    JsonBody(form): JsonBody<SignUpForm>,
) -> Result<impl IntoResponse, AppError> {
    let result = system.auth.sign_up(&form).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn sign_in_handler(
    State(system): State<PortalSystem>,
    JsonBody(form): JsonBody<SignInForm>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(system.auth.sign_in(&form).await?))
}

pub async fn sign_out_handler(
    State(system): State<PortalSystem>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse, AppError> {
    system.auth.sign_out(&viewer.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(system): State<PortalSystem>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(system.auth.customer_profile(&viewer.token, &viewer.user).await?))
}

pub async fn branding_handler(
    State(system): State<PortalSystem>,
    Extension(viewer): Extension<Viewer>,
) -> impl IntoResponse {
    Json(system.branding.load(&viewer.token, &viewer.user).await)
}

pub async fn quote_handler(
    State(system): State<PortalSystem>,
    Extension(viewer): Extension<Viewer>,
    JsonBody(request): JsonBody<QuoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(system.pricing.quote(Some(&viewer.token), &request).await?))
}

/// Prices are recomputed here; the client only sends the configuration.
pub async fn submit_order_handler(
    State(system): State<PortalSystem>,
    Extension(viewer): Extension<Viewer>,
    JsonBody(submission): JsonBody<OrderSubmission>,
) -> Result<impl IntoResponse, AppError> {
    let quote = system.pricing.quote(Some(&viewer.token), &submission.request).await?;
    let order = system
        .orders
        .submit(&viewer.token, &viewer.user, &submission.request, &quote, submission.details)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn order_history_handler(
    State(system): State<PortalSystem>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(system.orders.history(&viewer.token, &viewer.user).await?))
}

pub async fn dashboard_handler(
    State(system): State<PortalSystem>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(system.orders.dashboard(&viewer.token, &viewer.user).await?))
}

/// Multipart upload; every part with a file name is one selected file.
pub async fn upload_files_handler(
    State(system): State<PortalSystem>,
    Extension(viewer): Extension<Viewer>,
    Path(job_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        files.push(SelectedFile::new(name, content_type, bytes.to_vec()));
    }

    info!(user_id = %viewer.user.id, job_id = %job_id, count = files.len(), "Received files");
    let records = system
        .uploads
        .upload_files(&viewer.token, &viewer.user, job_id, &files)
        .await?;
    Ok((StatusCode::CREATED, Json(records)))
}
