//! In-memory fakes for the service's collaborators, shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::applications::repository::{ApplicantDirectory, ApplicationRepository, RepositoryError};
use crate::applications::uploader::{ContentUploader, UploadError, UploadFolder, UploadResult};
use crate::applications::validation::{FileUpload, RawSubmission};
use crate::config::Config;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::user::ApplicantContact;
use crate::notifications::outbox::{FailedNotification, NotificationOutbox, OutboxError};
use crate::notifications::{MailTransport, NotificationDispatcher, NotificationError, OutgoingEmail};
use crate::routes::build_router;
use crate::state::AppState;

pub const BOUNDARY: &str = "hiring-api-test-boundary";

pub fn pending_application(applicant_id: &str, job_id: &str) -> Application {
    let now = Utc::now();
    Application {
        id: Uuid::new_v4(),
        applicant_id: applicant_id.to_string(),
        job_id: job_id.to_string(),
        location: "Pune".to_string(),
        skills: vec!["Go".to_string(), "SQL".to_string()],
        years_of_experience: 3.0,
        rating: 4.0,
        resume_url: "https://cdn.test/resumes/cv.pdf".to_string(),
        profile_image_url: None,
        status: ApplicationStatus::Pending,
        created_at: now,
        updated_at: now,
    }
}

pub fn resume_file() -> FileUpload {
    FileUpload {
        file_name: "cv.pdf".to_string(),
        content_type: Some("application/pdf".to_string()),
        bytes: Bytes::from_static(b"%PDF-1.4 resume"),
    }
}

pub fn image_file() -> FileUpload {
    FileUpload {
        file_name: "me.png".to_string(),
        content_type: Some("image/png".to_string()),
        bytes: Bytes::from_static(b"\x89PNG image"),
    }
}

pub fn raw_submission(applicant_id: &str, job_id: &str) -> RawSubmission {
    let fields = [
        ("appliedBy", applicant_id),
        ("userLocation", "Pune"),
        ("skills", "Go, SQL"),
        ("yearOfExperience", "3"),
        ("rating", "4"),
    ];
    RawSubmission {
        job_id: job_id.to_string(),
        fields: fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        resume: Some(resume_file()),
        profile_image: None,
    }
}

/// Builds a multipart/form-data body delimited by `BOUNDARY`.
pub fn multipart_body(fields: &[(&str, &str)], with_resume: bool) -> Vec<u8> {
    let resume: Option<&[u8]> = with_resume.then_some(&b"%PDF-1.4 resume"[..]);
    multipart_body_with_resume(fields, resume)
}

pub fn multipart_body_with_resume(fields: &[(&str, &str)], resume: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(resume) = resume {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"cv.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(resume);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

#[derive(Default)]
pub struct MemoryRepository {
    apps: Mutex<Vec<Application>>,
}

impl MemoryRepository {
    pub fn len(&self) -> usize {
        self.apps.lock().unwrap().len()
    }
}

#[async_trait]
impl ApplicationRepository for MemoryRepository {
    async fn create(&self, app: Application) -> Result<Application, RepositoryError> {
        let mut apps = self.apps.lock().unwrap();
        if apps
            .iter()
            .any(|a| a.applicant_id == app.applicant_id && a.job_id == app.job_id)
        {
            return Err(RepositoryError::Duplicate {
                applicant_id: app.applicant_id,
                job_id: app.job_id,
            });
        }
        apps.push(app.clone());
        Ok(app)
    }

    // Reads yield once after taking their snapshot, like a database
    // round-trip, so joined futures interleave between read and write.
    async fn get_by_id(&self, id: Uuid) -> Result<Application, RepositoryError> {
        let found = self
            .apps
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id));
        tokio::task::yield_now().await;
        found
    }

    async fn save(&self, app: &Application) -> Result<Application, RepositoryError> {
        let mut apps = self.apps.lock().unwrap();
        let stored = apps
            .iter_mut()
            .find(|a| a.id == app.id)
            .ok_or(RepositoryError::NotFound(app.id))?;
        if stored.status != ApplicationStatus::Pending {
            return Err(RepositoryError::AlreadyDecided {
                id: app.id,
                current: stored.status,
            });
        }
        stored.status = app.status;
        stored.profile_image_url = app.profile_image_url.clone();
        stored.updated_at = app.updated_at;
        Ok(stored.clone())
    }

    async fn exists(&self, applicant_id: &str, job_id: &str) -> Result<bool, RepositoryError> {
        let found = self
            .apps
            .lock()
            .unwrap()
            .iter()
            .any(|a| a.applicant_id == applicant_id && a.job_id == job_id);
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn list_for_job(&self, job_id: &str) -> Result<Vec<Application>, RepositoryError> {
        Ok(self.newest_first(|a| a.job_id == job_id))
    }

    async fn list_for_applicant(
        &self,
        applicant_id: &str,
    ) -> Result<Vec<Application>, RepositoryError> {
        Ok(self.newest_first(|a| a.applicant_id == applicant_id))
    }
}

impl MemoryRepository {
    fn newest_first(&self, keep: impl Fn(&Application) -> bool) -> Vec<Application> {
        let mut found: Vec<_> = self
            .apps
            .lock()
            .unwrap()
            .iter()
            .filter(|a| keep(a))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }
}

#[derive(Default)]
pub struct StaticDirectory {
    contacts: Vec<ApplicantContact>,
}

impl StaticDirectory {
    pub fn with_applicant(id: &str, name: &str, email: &str) -> Self {
        Self {
            contacts: vec![ApplicantContact {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
            }],
        }
    }
}

#[async_trait]
impl ApplicantDirectory for StaticDirectory {
    async fn find(&self, applicant_id: &str) -> Result<Option<ApplicantContact>, RepositoryError> {
        Ok(self.contacts.iter().find(|c| c.id == applicant_id).cloned())
    }
}

#[derive(Default)]
pub struct FakeUploader {
    failing: Option<UploadFolder>,
    stalled: Option<UploadFolder>,
    calls: AtomicUsize,
}

impl FakeUploader {
    pub fn failing_on(folder: UploadFolder) -> Self {
        Self {
            failing: Some(folder),
            ..Default::default()
        }
    }

    /// Never answers for uploads into `folder`.
    pub fn stalled_on(folder: UploadFolder) -> Self {
        Self {
            stalled: Some(folder),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentUploader for FakeUploader {
    async fn upload(
        &self,
        file: &FileUpload,
        folder: UploadFolder,
    ) -> Result<UploadResult, UploadError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.stalled == Some(folder) {
            std::future::pending::<()>().await;
        }
        if self.failing == Some(folder) {
            return Err(UploadError::Provider {
                folder: folder.as_str(),
                message: "simulated provider outage".to_string(),
            });
        }
        Ok(UploadResult {
            url: format!("https://cdn.test/{}/{n}-{}", folder.as_str(), file.file_name),
        })
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    failing: bool,
    stalled: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn stalled() -> Self {
        Self {
            stalled: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotificationError> {
        if self.stalled {
            std::future::pending::<()>().await;
        }
        if self.failing {
            return Err(NotificationError::Transport(
                "mail API returned 503 Service Unavailable".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryOutbox {
    records: Mutex<Vec<FailedNotification>>,
}

impl MemoryOutbox {
    pub fn records(&self) -> Vec<FailedNotification> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationOutbox for MemoryOutbox {
    async fn record(&self, failed: &FailedNotification) -> Result<(), OutboxError> {
        self.records.lock().unwrap().push(failed.clone());
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/test".to_string(),
        redis_url: "redis://localhost".to_string(),
        s3_bucket: "test".to_string(),
        s3_endpoint: "http://localhost:9000".to_string(),
        s3_public_base_url: "https://cdn.test".to_string(),
        aws_region: "us-east-1".to_string(),
        aws_access_key_id: "test".to_string(),
        aws_secret_access_key: "test".to_string(),
        mail_api_url: "http://localhost/mail".to_string(),
        mail_api_key: "test".to_string(),
        mail_from: "jobs@test".to_string(),
        company_name: "Acme".to_string(),
        upload_timeout: Duration::from_secs(5),
        mail_timeout: Duration::from_secs(5),
        max_upload_bytes: 1024 * 1024,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

/// Full app state over in-memory fakes, with handles kept for assertions.
pub struct TestHarness {
    pub repo: Arc<MemoryRepository>,
    pub uploader: Arc<FakeUploader>,
    pub mailer: Arc<RecordingMailer>,
    pub outbox: Arc<MemoryOutbox>,
    directory: Arc<StaticDirectory>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::build(FakeUploader::default(), RecordingMailer::default())
    }

    pub fn with_uploader_failing_on(folder: UploadFolder) -> Self {
        Self::build(FakeUploader::failing_on(folder), RecordingMailer::default())
    }

    pub fn with_failing_mailer() -> Self {
        Self::build(FakeUploader::default(), RecordingMailer::failing())
    }

    fn build(uploader: FakeUploader, mailer: RecordingMailer) -> Self {
        Self {
            repo: Arc::new(MemoryRepository::default()),
            uploader: Arc::new(uploader),
            mailer: Arc::new(mailer),
            outbox: Arc::new(MemoryOutbox::default()),
            directory: Arc::new(StaticDirectory::with_applicant(
                "u1",
                "Asha",
                "asha@example.com",
            )),
        }
    }

    pub fn router(&self) -> Router {
        let config = test_config();
        let notifier = NotificationDispatcher::new(
            self.mailer.clone(),
            self.directory.clone(),
            config.company_name.clone(),
            config.mail_timeout,
        );
        build_router(AppState {
            applications: self.repo.clone(),
            applicants: self.directory.clone(),
            uploader: self.uploader.clone(),
            notifier: Arc::new(notifier),
            outbox: self.outbox.clone(),
            config,
        })
    }
}
