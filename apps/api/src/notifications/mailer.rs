//! HTTP mail transport. Posts one JSON message per send to the configured
//! mail API. Never retries; failures surface as `NotificationError::Transport`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::{MailTransport, NotificationError, OutgoingEmail};

#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    from: &'a str,
    to: Vec<MailRecipient<'a>>,
    subject: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct MailRecipient<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Clone)]
pub struct HttpMailTransport {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailTransport {
    pub fn new(client: Client, api_url: String, api_key: String, from: String) -> Self {
        Self {
            client,
            api_url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotificationError> {
        let body = MailRequest {
            from: &self.from,
            to: vec![MailRecipient {
                email: &email.to,
                name: &email.to_name,
            }],
            subject: &email.subject,
            text: &email.body,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(NotificationError::Transport(format!(
                "mail API returned {status}: {detail}"
            )));
        }

        debug!("Mail API accepted message to {}", email.to);
        Ok(())
    }
}
