use std::sync::Arc;

use crate::applications::repository::{ApplicantDirectory, ApplicationRepository};
use crate::applications::uploader::ContentUploader;
use crate::config::Config;
use crate::notifications::outbox::NotificationOutbox;
use crate::notifications::NotificationDispatcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub applications: Arc<dyn ApplicationRepository>,
    pub applicants: Arc<dyn ApplicantDirectory>,
    pub uploader: Arc<dyn ContentUploader>,
    pub notifier: Arc<NotificationDispatcher>,
    /// Where undeliverable review emails are parked for manual follow-up.
    pub outbox: Arc<dyn NotificationOutbox>,
    pub config: Config,
}
