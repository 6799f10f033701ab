//! Reviewer decisions.
//!
//! Flow: get → transition → save → notify.
//!
//! The saved status is the source of truth. A notification failure is logged,
//! queued in the outbox, and reported to the caller, but the transition stays.

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::applications::repository::ApplicationRepository;
use crate::applications::transitions::{transition, ReviewOutcome};
use crate::errors::AppError;
use crate::models::application::Application;
use crate::notifications::outbox::{FailedNotification, NotificationOutbox};
use crate::notifications::NotificationDispatcher;

pub async fn review_application(
    repo: &dyn ApplicationRepository,
    notifier: &NotificationDispatcher,
    outbox: &dyn NotificationOutbox,
    id: Uuid,
    outcome: ReviewOutcome,
) -> Result<Application, AppError> {
    let mut app = repo.get_by_id(id).await?;
    transition(&mut app, outcome, Utc::now())?;
    let saved = repo.save(&app).await?;
    info!("Application {id} is now {}", saved.status);

    match notifier.notify(&saved, outcome).await {
        Ok(sent) => info!(
            "Sent {} notification for application {id} to {}",
            sent.outcome.as_str(),
            sent.recipient
        ),
        Err(e) => {
            error!(
                "Failed to send {} notification for application {id}: {e}",
                outcome.as_str()
            );
            let failed = FailedNotification {
                application_id: saved.id,
                applicant_id: saved.applicant_id.clone(),
                outcome,
                error: e.to_string(),
                failed_at: Utc::now(),
            };
            if let Err(outbox_err) = outbox.record(&failed).await {
                warn!("Could not queue failed notification for application {id}: {outbox_err}");
            }
            return Err(AppError::Notification(format!(
                "Application {id} was marked {} but the notification email could not be sent",
                saved.status
            )));
        }
    }

    Ok(saved)
}
