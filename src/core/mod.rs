pub mod command;
pub mod config;
pub mod error;
pub mod lms;
pub mod message;
pub mod notifier;
pub mod ratelimit;
pub mod session;
pub mod todo;

#[cfg(test)]
mod tests;
