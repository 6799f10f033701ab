//! Application intake — orchestrates a new submission.
//!
//! Flow: validate → early duplicate check → upload resume (fatal on failure)
//!       → upload profile image (degrades to "no image") → create.
//!
//! Validation and duplicate errors are returned before any upload happens.
//! Uploads happen before the record exists, so an abandoned or failed resume
//! upload can never leave a partial application behind.

use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::applications::repository::{ApplicationRepository, RepositoryError};
use crate::applications::uploader::{ContentUploader, UploadError, UploadFolder, UploadResult};
use crate::applications::validation::{validate, FileUpload, RawSubmission, ValidatedSubmission};
use crate::errors::AppError;
use crate::models::application::{Application, ApplicationStatus};

pub async fn submit_application(
    repo: &dyn ApplicationRepository,
    uploader: &dyn ContentUploader,
    upload_timeout: Duration,
    raw: RawSubmission,
) -> Result<Application, AppError> {
    let submission = validate(raw)?;

    if repo
        .exists(&submission.applicant_id, &submission.job_id)
        .await?
    {
        info!(
            "Applicant {} already applied to job {}",
            submission.applicant_id, submission.job_id
        );
        return Err(RepositoryError::Duplicate {
            applicant_id: submission.applicant_id,
            job_id: submission.job_id,
        }
        .into());
    }

    let resume = upload_with_timeout(
        uploader,
        &submission.resume,
        UploadFolder::Resumes,
        upload_timeout,
    )
    .await?;

    let profile_image_url = match &submission.profile_image {
        Some(image) => {
            match upload_with_timeout(uploader, image, UploadFolder::ProfileImages, upload_timeout)
                .await
            {
                Ok(uploaded) => Some(uploaded.url),
                Err(e) => {
                    warn!(
                        "Profile image upload failed for applicant {} on job {}; continuing without image: {e}",
                        submission.applicant_id, submission.job_id
                    );
                    None
                }
            }
        }
        None => None,
    };

    let app = new_pending_application(submission, resume.url, profile_image_url);
    Ok(repo.create(app).await?)
}

async fn upload_with_timeout(
    uploader: &dyn ContentUploader,
    file: &FileUpload,
    folder: UploadFolder,
    limit: Duration,
) -> Result<UploadResult, UploadError> {
    tokio::time::timeout(limit, uploader.upload(file, folder))
        .await
        .map_err(|_| UploadError::Timeout {
            folder: folder.as_str(),
            secs: limit.as_secs(),
        })?
}

fn new_pending_application(
    submission: ValidatedSubmission,
    resume_url: String,
    profile_image_url: Option<String>,
) -> Application {
    let now = Utc::now();
    Application {
        id: Uuid::new_v4(),
        applicant_id: submission.applicant_id,
        job_id: submission.job_id,
        location: submission.location,
        skills: submission.skills,
        years_of_experience: submission.years_of_experience,
        rating: submission.rating,
        resume_url,
        profile_image_url,
        status: ApplicationStatus::Pending,
        created_at: now,
        updated_at: now,
    }
}
