use async_trait::async_trait;

use crate::core::error::NotifyError;
use crate::core::message::{Destination, OutboundMessage};

/// Delivers messages to a chat channel. Retrying is the implementation's
/// business; callers log failures and move on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, destination: &Destination, message: &OutboundMessage) -> Result<(), NotifyError>;
}

/// Send and log on failure. Used for fire-and-forget notifications from
/// background tasks.
pub async fn send_logged(notifier: &dyn Notifier, destination: &Destination, message: OutboundMessage) {
    if let Err(e) = notifier.send(destination, &message).await {
        tracing::warn!(
            channel = %destination.channel_id,
            "failed to deliver notification: {e}"
        );
    }
}
