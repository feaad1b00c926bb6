//! Error types for the PandemicNet assistant
//!
//! Every condition the assistant can surface to the user is a variant here.
//! None of them are fatal: the REPL reports them as notices and keeps going.

use thiserror::Error;

/// Main error type for the assistant library
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Blank or whitespace-only chat input
    #[error("Message is empty")]
    EmptyInput,

    /// A reply is already being computed
    #[error("The assistant is still answering the previous message")]
    ReplyPending,

    /// `await_reply` called with nothing outstanding
    #[error("No reply is pending")]
    NoPendingReply,

    /// Analysis requested with no symptoms recorded
    #[error("Please add at least one symptom before analyzing")]
    EmptyLedger,

    /// Positional ledger access out of range
    #[error("Invalid symptom index {index} (ledger has {len} entries)")]
    InvalidIndex { index: usize, len: usize },

    /// Stable record id not present in the ledger
    #[error("Unknown symptom record: {0}")]
    UnknownRecord(String),

    /// Severity text that is not mild, moderate or severe
    #[error("Invalid severity '{0}' (expected mild, moderate or severe)")]
    InvalidSeverity(String),

    /// Login rejected
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Signup rejected
    #[error("Invalid signup details")]
    InvalidSignup,

    /// `/profile` field name or value not recognized
    #[error("Invalid profile update: {0}")]
    InvalidProfileField(String),

    /// Profile operation without a signed-in user
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Key-value store failures
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The background responder task died before producing a reply
    #[error("Responder failed: {0}")]
    ResponderFailed(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

impl From<tokio::task::JoinError> for AssistantError {
    fn from(err: tokio::task::JoinError) -> Self {
        AssistantError::ResponderFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AssistantError::InvalidIndex { index: 7, len: 2 };
        assert!(err.to_string().contains('7'));
        assert!(err.to_string().contains('2'));
    }

    #[test]
    fn test_empty_ledger_notice() {
        let err = AssistantError::EmptyLedger;
        assert!(err.to_string().contains("at least one symptom"));
    }

    #[test]
    fn test_invalid_severity_names_input() {
        let err = AssistantError::InvalidSeverity("extreme".to_string());
        assert!(err.to_string().contains("extreme"));
    }
}
