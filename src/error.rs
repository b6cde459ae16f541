use thiserror::Error;

/// Result type used by storage, commands and the TUI.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised outside the expansion core.
///
/// The expander itself is total and never returns one of these.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed data file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid date '{input}': {reason}. Use YYYY-MM-DD or YYYY-MM-DDTHH:MM.")]
    InvalidDate { input: String, reason: String },

    #[error("invalid weekday index {0} (expected 0=Sunday..6=Saturday)")]
    InvalidWeekday(u8),

    #[error("invalid recurrence: {0}")]
    InvalidRecurrence(String),

    #[error("invalid id '{0}'")]
    InvalidId(String),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("aborted")]
    Aborted,
}

impl Error {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound { kind, id: id.into() }
    }
}
