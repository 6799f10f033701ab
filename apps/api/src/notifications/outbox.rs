//! Record of notifications that could not be delivered, kept for manual
//! follow-up. The review itself is never rolled back on delivery failure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::applications::transitions::ReviewOutcome;

pub const FAILED_NOTIFICATIONS_KEY: &str = "notifications:failed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedNotification {
    pub application_id: Uuid,
    pub applicant_id: String,
    pub outcome: ReviewOutcome,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum OutboxError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[async_trait]
pub trait NotificationOutbox: Send + Sync {
    async fn record(&self, failed: &FailedNotification) -> Result<(), OutboxError>;
}

/// Appends failures as JSON to a Redis list.
pub struct RedisOutbox {
    client: redis::Client,
}

impl RedisOutbox {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationOutbox for RedisOutbox {
    async fn record(&self, failed: &FailedNotification) -> Result<(), OutboxError> {
        let payload = serde_json::to_string(failed)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.rpush(FAILED_NOTIFICATIONS_KEY, payload).await?;
        info!(
            "Queued failed {} notification for application {}",
            failed.outcome.as_str(),
            failed.application_id
        );
        Ok(())
    }
}
