mod reminder;
mod service;

#[cfg(test)]
mod tests;

pub use reminder::{reminder_text, BreakReminder};
pub use service::{Firing, TimerHandler, TimerService};
