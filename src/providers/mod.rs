mod canvas;
mod console;
mod discord;


pub use canvas::CanvasClient;
pub use console::ConsoleNotifier;
pub use discord::DiscordNotifier;

use crate::core::config::AppConfig;
use crate::core::lms::LmsClient;
use crate::core::notifier::Notifier;
use std::sync::Arc;

/// Canvas client when both URL and key are configured.
pub fn create_lms(config: &AppConfig) -> Option<Arc<dyn LmsClient>> {
    match (&config.canvas.api_url, &config.canvas.api_key) {
        (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => {
            tracing::info!(url = %url, "using Canvas LMS");
            Some(Arc::new(CanvasClient::new(url, key.clone())))
        }
        _ => {
            tracing::info!("Canvas not configured; LMS commands disabled");
            None
        }
    }
}

/// Discord notifier when a bot token is configured, otherwise stdout.
pub fn create_notifier(config: &AppConfig) -> Arc<dyn Notifier> {
    match &config.discord.token {
        Some(token) if !token.is_empty() => {
            tracing::info!(api_base = %config.discord.api_base, "using Discord notifier");
            Arc::new(DiscordNotifier::new(&config.discord.api_base, token.clone()))
        }
        _ => {
            tracing::info!("Discord not configured; notifications go to stdout");
            Arc::new(ConsoleNotifier)
        }
    }
}
