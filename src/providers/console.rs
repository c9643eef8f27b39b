use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::core::error::NotifyError;
use crate::core::message::{Destination, OutboundMessage};
use crate::core::notifier::Notifier;

/// Prints notifications to stdout, for local runs without a Discord bot.
#[derive(Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, destination: &Destination, message: &OutboundMessage) -> Result<(), NotifyError> {
        let line = format!("\n[#{}] {}\n", destination.channel_id, message.plain_text());
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(line.as_bytes())
            .await
            .map_err(|e| NotifyError::Http(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| NotifyError::Http(e.to_string()))
    }
}
