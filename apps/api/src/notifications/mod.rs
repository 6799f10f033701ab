//! Notification dispatch for review outcomes.
//!
//! Flow: look up the applicant's contact → render the outcome template →
//! hand the message to the mail transport. Callers invoke this only after
//! the new status is durably saved.

pub mod mailer;
pub mod outbox;
pub mod templates;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::applications::repository::ApplicantDirectory;
use crate::applications::transitions::ReviewOutcome;
use crate::models::application::Application;
use templates::{render, TemplateVars};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub to_name: String,
    pub subject: String,
    pub body: String,
}

/// Confirmation that the transport accepted a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub recipient: String,
    pub outcome: ReviewOutcome,
}

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("no contact details for applicant {0}")]
    UnknownRecipient(String),

    #[error("applicant lookup failed: {0}")]
    Directory(String),

    #[error("mail transport failed: {0}")]
    Transport(String),

    #[error("mail transport timed out after {0}s")]
    Timeout(u64),
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotificationError>;
}

pub struct NotificationDispatcher {
    transport: Arc<dyn MailTransport>,
    directory: Arc<dyn ApplicantDirectory>,
    company_name: String,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        directory: Arc<dyn ApplicantDirectory>,
        company_name: String,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            directory,
            company_name,
            timeout,
        }
    }

    pub async fn notify(
        &self,
        app: &Application,
        outcome: ReviewOutcome,
    ) -> Result<Sent, NotificationError> {
        let contact = self
            .directory
            .find(&app.applicant_id)
            .await
            .map_err(|e| NotificationError::Directory(e.to_string()))?
            .ok_or_else(|| NotificationError::UnknownRecipient(app.applicant_id.clone()))?;

        let rendered = render(
            outcome,
            &TemplateVars {
                name: &contact.name,
                email: &contact.email,
                job_id: &app.job_id,
                company: &self.company_name,
            },
        );

        let email = OutgoingEmail {
            to: contact.email,
            to_name: contact.name,
            subject: rendered.subject,
            body: rendered.body,
        };

        tokio::time::timeout(self.timeout, self.transport.send(&email))
            .await
            .map_err(|_| NotificationError::Timeout(self.timeout.as_secs()))??;

        Ok(Sent {
            recipient: email.to,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{pending_application, RecordingMailer, StaticDirectory};

    fn dispatcher(mailer: Arc<RecordingMailer>) -> NotificationDispatcher {
        NotificationDispatcher::new(
            mailer,
            Arc::new(StaticDirectory::with_applicant("u1", "Asha", "asha@example.com")),
            "Acme".to_string(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_notify_sends_rendered_email_to_applicant() {
        let mailer = Arc::new(RecordingMailer::default());
        let sent = dispatcher(mailer.clone())
            .notify(&pending_application("u1", "j1"), ReviewOutcome::Accepted)
            .await
            .unwrap();

        assert_eq!(sent.recipient, "asha@example.com");
        let outbox = mailer.sent();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].to_name, "Asha");
        assert!(outbox[0].subject.contains("accepted"));
    }

    #[tokio::test]
    async fn test_notify_unknown_applicant_sends_nothing() {
        let mailer = Arc::new(RecordingMailer::default());
        let err = dispatcher(mailer.clone())
            .notify(&pending_application("ghost", "j1"), ReviewOutcome::Rejected)
            .await
            .unwrap_err();

        assert!(matches!(err, NotificationError::UnknownRecipient(id) if id == "ghost"));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_notify_surfaces_transport_failure() {
        let mailer = Arc::new(RecordingMailer::failing());
        let err = dispatcher(mailer)
            .notify(&pending_application("u1", "j1"), ReviewOutcome::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationError::Transport(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_notify_times_out_slow_transport() {
        let mailer = Arc::new(RecordingMailer::stalled());
        let err = dispatcher(mailer)
            .notify(&pending_application("u1", "j1"), ReviewOutcome::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationError::Timeout(5)));
    }
}
