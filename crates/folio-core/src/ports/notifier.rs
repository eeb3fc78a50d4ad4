//! Outbound notification port.

use async_trait::async_trait;

use crate::notification::ContactNotification;

/// Delivers a rendered notification to the site owner.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &ContactNotification) -> Result<(), NotifyError>;
}

/// Notification delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Mail relay unreachable: {0}")]
    Transport(String),

    #[error("Mail relay rejected the message with status {0}")]
    Rejected(u16),
}
