//! Routes parsed commands to the session manager, the LMS client and the
//! to-do store, and turns every outcome into a reply.

mod dispatcher;
mod format;


pub use dispatcher::Dispatcher;
pub use format::{format_due, help_text, DUE_DATE_FORMAT};
