use async_trait::async_trait;
use std::sync::Arc;

use crate::core::message::{Destination, OutboundMessage};
use crate::core::notifier::{send_logged, Notifier};
use crate::timer::service::{Firing, TimerHandler};

/// Posts a break reminder to the session's channel on every firing.
pub struct BreakReminder {
    notifier: Arc<dyn Notifier>,
    destination: Destination,
}

impl BreakReminder {
    pub fn new(notifier: Arc<dyn Notifier>, destination: Destination) -> Self {
        Self {
            notifier,
            destination,
        }
    }
}

pub fn reminder_text(firing: &Firing) -> String {
    format!(
        "**Time to take a break!** You've been studying for {} minutes",
        firing.elapsed.as_secs() / 60
    )
}

#[async_trait]
impl TimerHandler for BreakReminder {
    async fn fire(&self, firing: Firing) {
        send_logged(
            self.notifier.as_ref(),
            &self.destination,
            OutboundMessage::text(reminder_text(&firing)),
        )
        .await;
    }
}
