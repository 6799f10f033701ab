//! Review state machine: `pending → accepted` or `pending → rejected`.
//! Both outcomes are terminal. The engine only mutates; persisting and
//! notifying are the caller's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::application::{Application, ApplicationStatus};

/// A reviewer's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOutcome {
    Accepted,
    Rejected,
}

impl ReviewOutcome {
    pub fn target_status(&self) -> ApplicationStatus {
        match self {
            ReviewOutcome::Accepted => ApplicationStatus::Accepted,
            ReviewOutcome::Rejected => ApplicationStatus::Rejected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.target_status().as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("application {id} is already {current} and cannot become {requested}")]
pub struct IllegalTransition {
    pub id: Uuid,
    pub current: ApplicationStatus,
    pub requested: ApplicationStatus,
}

/// Moves `app` to the outcome's terminal status, stamping `updated_at`.
/// A terminal application is left untouched, including for a repeat of the
/// same decision.
pub fn transition(
    app: &mut Application,
    outcome: ReviewOutcome,
    at: DateTime<Utc>,
) -> Result<(), IllegalTransition> {
    let requested = outcome.target_status();
    if app.status.is_terminal() {
        return Err(IllegalTransition {
            id: app.id,
            current: app.status,
            requested,
        });
    }
    app.status = requested;
    app.updated_at = at;
    Ok(())
}
