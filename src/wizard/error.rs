//! Error types for the wizard core.
//!
//! Validation errors are user-correctable and always retried in place;
//! everything else is a rejected operation handed back to the caller.

use thiserror::Error;

use super::session::SessionId;

/// Reasons a raw response fails a step's validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no input was given")]
    EmptyInput,

    #[error("not a valid reference: {0}")]
    MalformedReference(String),

    #[error("input is longer than {max} characters")]
    ExceedsLength { max: usize },

    #[error("'{0}' was selected more than once")]
    DuplicateSelection(String),

    #[error("out of range: {0}")]
    OutOfRange(String),
}

impl ValidationError {
    /// Static code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::MalformedReference(_) => "malformed_reference",
            Self::ExceedsLength { .. } => "exceeds_length",
            Self::DuplicateSelection(_) => "duplicate_selection",
            Self::OutOfRange(_) => "out_of_range",
        }
    }
}

/// Failure reported by a persistence gateway.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("could not encode answers: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("record rejected: {0}")]
    InvalidRecord(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Session lifecycle errors returned by the controller and the service.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("a setup wizard is already running for {scope_key}")]
    DuplicateSession { scope_key: String, existing: SessionId },

    #[error("no active wizard session {0}")]
    SessionNotFound(SessionId),

    #[error("wizard session {0} has expired")]
    SessionExpired(SessionId),

    #[error("only the user who started the wizard can do this")]
    NotOwner,

    #[error("invalid wizard definition: {0}")]
    InvalidDefinition(String),

    #[error("answer was meant for step {expected}, but step {current} is waiting")]
    StaleStep { expected: usize, current: usize },

    #[error("step has no option {index}")]
    UnknownOption { index: usize },

    #[error("configuration not saved, retry: {0}")]
    Storage(#[from] StorageError),
}

impl WizardError {
    /// Static code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateSession { .. } => "duplicate_session",
            Self::SessionNotFound(_) => "session_not_found",
            Self::SessionExpired(_) => "session_expired",
            Self::NotOwner => "not_owner",
            Self::InvalidDefinition(_) => "invalid_definition",
            Self::StaleStep { .. } => "stale_step",
            Self::UnknownOption { .. } => "unknown_option",
            Self::Storage(_) => "storage",
        }
    }
}

/// Convenience alias for controller results.
pub type WizardResult<T> = Result<T, WizardError>;
