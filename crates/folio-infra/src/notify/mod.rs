//! Owner notification delivery.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use folio_core::notification::ContactNotification;
use folio_core::ports::{Notifier, NotifyError};

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Used when no mail relay is configured. Drops every message.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, notification: &ContactNotification) -> Result<(), NotifyError> {
        tracing::debug!(subject = %notification.subject, "Mail relay not configured, notification dropped");
        Ok(())
    }
}

/// HTTP mail relay settings.
#[derive(Debug, Clone)]
pub struct MailRelayConfig {
    pub url: String,
    /// Sent as a bearer token when present.
    pub token: Option<String>,
    pub from: String,
    pub to: String,
}

#[derive(Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    #[serde(flatten)]
    notification: &'a ContactNotification,
}

/// Posts notifications as JSON to an HTTP mail relay.
pub struct MailRelayNotifier {
    config: MailRelayConfig,
    client: reqwest::Client,
}

impl MailRelayNotifier {
    pub fn new(config: MailRelayConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Notifier for MailRelayNotifier {
    async fn send(&self, notification: &ContactNotification) -> Result<(), NotifyError> {
        let message = RelayMessage {
            from: &self.config.from,
            to: &self.config.to,
            notification,
        };

        let mut request = self.client.post(&self.config.url).json(&message);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}
