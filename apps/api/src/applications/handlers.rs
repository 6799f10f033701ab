//! Axum route handlers for the Applications API.

use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::applications::intake::submit_application;
use crate::applications::review::review_application;
use crate::applications::transitions::ReviewOutcome;
use crate::applications::validation::{
    FileUpload, RawSubmission, ValidationError, FIELD_PROFILE_IMAGE, FIELD_RESUME,
};
use crate::applications::views::{enrich, ApplicationView};
use crate::errors::AppError;
use crate::models::application::Application;
use crate::state::AppState;

/// POST /api/v1/applications/:job_id
///
/// Multipart body: `appliedBy`, `userLocation`, `skills`, `yearOfExperience`,
/// `rating`, required `resume` file, optional `userProfileImage` file.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let raw = read_submission(job_id, multipart).await?;
    let app = submit_application(
        state.applications.as_ref(),
        state.uploader.as_ref(),
        state.config.upload_timeout,
        raw,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(app)))
}

/// GET /api/v1/applications/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Application>, AppError> {
    let id = parse_application_id(&id)?;
    Ok(Json(state.applications.get_by_id(id).await?))
}

/// PATCH /api/v1/applications/:id/accept
pub async fn handle_accept(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Application>, AppError> {
    review(&state, &id, ReviewOutcome::Accepted).await
}

/// PATCH or DELETE /api/v1/applications/:id/reject
pub async fn handle_reject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Application>, AppError> {
    review(&state, &id, ReviewOutcome::Rejected).await
}

/// GET /api/v1/jobs/:job_id/applications
///
/// Reviewer listing for one job, newest first, with applicant contact details.
pub async fn handle_list_for_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Vec<ApplicationView>>, AppError> {
    let apps = state.applications.list_for_job(&job_id).await?;
    Ok(Json(enrich(state.applicants.as_ref(), apps).await?))
}

/// GET /api/v1/applicants/:applicant_id/applications
pub async fn handle_list_for_applicant(
    State(state): State<AppState>,
    Path(applicant_id): Path<String>,
) -> Result<Json<Vec<Application>>, AppError> {
    Ok(Json(
        state.applications.list_for_applicant(&applicant_id).await?,
    ))
}

async fn review(
    state: &AppState,
    id: &str,
    outcome: ReviewOutcome,
) -> Result<Json<Application>, AppError> {
    let id = parse_application_id(id)?;
    let app = review_application(
        state.applications.as_ref(),
        &state.notifier,
        state.outbox.as_ref(),
        id,
        outcome,
    )
    .await?;
    Ok(Json(app))
}

// Ids are opaque to clients; anything that is not one of ours simply does not exist.
fn parse_application_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("application {raw} not found")))
}

async fn read_submission(
    job_id: String,
    mut multipart: Multipart,
) -> Result<RawSubmission, AppError> {
    let mut raw = RawSubmission {
        job_id,
        ..Default::default()
    };

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            FIELD_RESUME => raw.resume = Some(read_file(field).await?),
            FIELD_PROFILE_IMAGE => raw.profile_image = Some(read_file(field).await?),
            _ => {
                let value = field.text().await.map_err(malformed)?;
                raw.fields.insert(name, value);
            }
        }
    }

    Ok(raw)
}

async fn read_file(field: Field<'_>) -> Result<FileUpload, AppError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(malformed)?;
    Ok(FileUpload {
        file_name,
        content_type,
        bytes,
    })
}

fn malformed(err: axum::extract::multipart::MultipartError) -> AppError {
    // The body limit surfaces mid-stream as a multipart read error.
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge(err.body_text());
    }
    AppError::Validation(ValidationError::Malformed(err.body_text()))
}
