//! Session lifecycle: the per-owner state machine, break reminders and the
//! Pomodoro cycle runner.

mod manager;
mod pomodoro;


pub use manager::{SessionManager, SessionStarted, SessionSummary};
