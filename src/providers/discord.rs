use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;

use crate::core::error::NotifyError;
use crate::core::message::{Destination, OutboundMessage};
use crate::core::notifier::Notifier;
use crate::core::ratelimit::{capped_wait, retry_after_ms, MAX_ATTEMPTS};

/// Discord caps message content at 2000 characters.
const MAX_CONTENT_CHARS: usize = 2000;

/// Posts messages through the Discord REST API as a bot user.
pub struct DiscordNotifier {
    client: Client,
    api_base: String,
    token: String,
}

impl DiscordNotifier {
    pub fn new(api_base: &str, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn body(message: &OutboundMessage) -> serde_json::Value {
        match message {
            OutboundMessage::Text { content } => json!({ "content": truncate(content) }),
            OutboundMessage::Embed { embed } => json!({ "embeds": [embed] }),
        }
    }
}

fn truncate(content: &str) -> String {
    if content.chars().count() <= MAX_CONTENT_CHARS {
        return content.to_string();
    }
    let mut out: String = content.chars().take(MAX_CONTENT_CHARS - 1).collect();
    out.push('…');
    out
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, destination: &Destination, message: &OutboundMessage) -> Result<(), NotifyError> {
        let channel = destination.channel_id.trim();
        if channel.is_empty() || !channel.chars().all(|c| c.is_ascii_digit()) {
            return Err(NotifyError::InvalidDestination(destination.channel_id.clone()));
        }

        let url = format!("{}/channels/{channel}/messages", self.api_base);
        let body = Self::body(message);
        let mut last_err = NotifyError::Http("no attempts made".into());

        for attempt in 1..=MAX_ATTEMPTS {
            let resp = match self
                .client
                .post(&url)
                .header("Authorization", format!("Bot {}", self.token))
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(attempt, "discord request failed: {e}");
                    last_err = NotifyError::Http(e.to_string());
                    continue;
                }
            };

            let status = resp.status();
            if status.is_success() {
                tracing::debug!(channel, "message delivered");
                return Ok(());
            }

            let headers = resp.headers().clone();
            let text = resp.text().await.unwrap_or_default();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait_ms = retry_after_ms(&headers, &text);
                last_err = NotifyError::RateLimited {
                    retry_after_ms: wait_ms,
                };
                if attempt < MAX_ATTEMPTS {
                    let wait = capped_wait(wait_ms);
                    tracing::warn!(attempt, wait_ms = wait.as_millis() as u64, "discord rate limited, retrying");
                    tokio::time::sleep(wait).await;
                }
                continue;
            }

            return Err(NotifyError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        Err(last_err)
    }
}
