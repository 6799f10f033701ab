//! Application repository — persistence and the one-application-per-job rule.
//!
//! The `(applicant_id, job_id)` pair backs a unique constraint in Postgres.
//! `exists` is only an early, friendlier rejection; `create` relies on the
//! constraint so concurrent duplicate submissions cannot both succeed.
//!
//! `save` is a conditional write on `status = 'pending'`, so of two reviewers
//! racing on the same application only the first decision lands.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::application::{Application, ApplicationRow, ApplicationStatus, UnknownStatus};
use crate::models::user::ApplicantContact;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("applicant {applicant_id} has already applied to job {job_id}")]
    Duplicate { applicant_id: String, job_id: String },

    #[error("application {0} not found")]
    NotFound(Uuid),

    #[error("application {id} was already {current}")]
    AlreadyDecided { id: Uuid, current: ApplicationStatus },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored application is invalid: {0}")]
    Corrupt(#[from] UnknownStatus),
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Inserts a new application, failing with `Duplicate` if the applicant
    /// already applied to this job.
    async fn create(&self, app: Application) -> Result<Application, RepositoryError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Application, RepositoryError>;

    /// Persists the mutable fields of an application that is still pending
    /// in storage. Fails with `AlreadyDecided` when another writer got there
    /// first. The `(applicant_id, job_id)` key and `created_at` are never
    /// written.
    async fn save(&self, app: &Application) -> Result<Application, RepositoryError>;

    async fn exists(&self, applicant_id: &str, job_id: &str) -> Result<bool, RepositoryError>;

    /// Newest first.
    async fn list_for_job(&self, job_id: &str) -> Result<Vec<Application>, RepositoryError>;

    /// Newest first.
    async fn list_for_applicant(
        &self,
        applicant_id: &str,
    ) -> Result<Vec<Application>, RepositoryError>;
}

/// Read-side lookup of candidate contact details, used for notifications
/// and enriched views.
#[async_trait]
pub trait ApplicantDirectory: Send + Sync {
    async fn find(&self, applicant_id: &str) -> Result<Option<ApplicantContact>, RepositoryError>;
}

pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn create(&self, app: Application) -> Result<Application, RepositoryError> {
        let result = sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO applications
                (id, applicant_id, job_id, location, skills, years_of_experience,
                 rating, resume_url, profile_image_url, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(app.id)
        .bind(&app.applicant_id)
        .bind(&app.job_id)
        .bind(&app.location)
        .bind(&app.skills)
        .bind(app.years_of_experience)
        .bind(app.rating)
        .bind(&app.resume_url)
        .bind(&app.profile_image_url)
        .bind(app.status.as_str())
        .bind(app.created_at)
        .bind(app.updated_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => {
                info!(
                    "Created application {} for applicant {} on job {}",
                    app.id, app.applicant_id, app.job_id
                );
                Ok(Application::try_from(row)?)
            }
            Err(e) if is_unique_violation(&e) => {
                warn!(
                    "Duplicate application rejected by constraint: applicant {} job {}",
                    app.applicant_id, app.job_id
                );
                Err(RepositoryError::Duplicate {
                    applicant_id: app.applicant_id,
                    job_id: app.job_id,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Application, RepositoryError> {
        let row = sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound(id))?;
        Ok(Application::try_from(row)?)
    }

    async fn save(&self, app: &Application) -> Result<Application, RepositoryError> {
        let updated = sqlx::query_as::<_, ApplicationRow>(
            r#"
            UPDATE applications
            SET status = $2, profile_image_url = $3, updated_at = $4
            WHERE id = $1 AND status = $5
            RETURNING *
            "#,
        )
        .bind(app.id)
        .bind(app.status.as_str())
        .bind(&app.profile_image_url)
        .bind(app.updated_at)
        .bind(ApplicationStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(row) => Ok(Application::try_from(row)?),
            // Either the row is gone or a concurrent review already decided it.
            None => {
                let current = self.get_by_id(app.id).await?;
                warn!(
                    "Application {} was already {} when saving {}",
                    app.id, current.status, app.status
                );
                Err(RepositoryError::AlreadyDecided {
                    id: app.id,
                    current: current.status,
                })
            }
        }
    }

    async fn exists(&self, applicant_id: &str, job_id: &str) -> Result<bool, RepositoryError> {
        Ok(sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM applications WHERE applicant_id = $1 AND job_id = $2)",
        )
        .bind(applicant_id)
        .bind(job_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_for_job(&self, job_id: &str) -> Result<Vec<Application>, RepositoryError> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE job_id = $1 ORDER BY created_at DESC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        collect_rows(rows)
    }

    async fn list_for_applicant(
        &self,
        applicant_id: &str,
    ) -> Result<Vec<Application>, RepositoryError> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE applicant_id = $1 ORDER BY created_at DESC",
        )
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await?;
        collect_rows(rows)
    }
}

pub struct PgApplicantDirectory {
    pool: PgPool,
}

impl PgApplicantDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicantDirectory for PgApplicantDirectory {
    async fn find(&self, applicant_id: &str) -> Result<Option<ApplicantContact>, RepositoryError> {
        Ok(sqlx::query_as::<_, ApplicantContact>(
            "SELECT id, name, email FROM applicants WHERE id = $1",
        )
        .bind(applicant_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}

fn collect_rows(rows: Vec<ApplicationRow>) -> Result<Vec<Application>, RepositoryError> {
    rows.into_iter()
        .map(|row| Application::try_from(row).map_err(RepositoryError::from))
        .collect()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}
