use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("LMS error: {0}")]
    Lms(#[from] LmsError),

    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Everything a command can fail with. Rendered as a reply at the dispatch
/// boundary, never propagated further.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Guard(#[from] GuardViolation),

    #[error("You do not have permission to {action}.")]
    PermissionDenied { action: String },

    #[error("Command not found: {0}")]
    UnknownCommand(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// A command that is not valid in the current session state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardViolation {
    #[error("Session is already active!")]
    AlreadyActive,

    #[error("No regular session is active to end!")]
    NoRegularSession,

    #[error("No Pomodoro session is active to stop!")]
    NoPomodoroSession,
}

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("{0}")]
    Lms(#[from] LmsError),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Notify(#[from] NotifyError),
}

#[derive(Error, Debug, Clone)]
pub enum LmsError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Course not found: {0}")]
    CourseNotFound(u64),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("LMS is not configured")]
    NotConfigured,
}

#[derive(Error, Debug, Clone)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Invalid destination: {0}")]
    InvalidDestination(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file error: {0}")]
    File(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl CommandError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Text shown to the user. Upstream detail goes to the log, not the reply.
    pub fn user_message(&self) -> String {
        match self {
            CommandError::Upstream(UpstreamError::Lms(LmsError::NotConfigured)) => {
                "Canvas is not configured for this bot.".into()
            }
            CommandError::Upstream(UpstreamError::Lms(LmsError::CourseNotFound(id))) => {
                format!("No course found with ID {id}.")
            }
            CommandError::Upstream(_) => {
                "Something went wrong while handling that command. Please try again later."
                    .into()
            }
            CommandError::UnknownCommand(_) => "Command not found.".into(),
            other => other.to_string(),
        }
    }
}
