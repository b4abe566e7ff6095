//! Error types for the notice-and-consent engine.

use crate::llm::LlmError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias for consent operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for consent workflow operations
#[derive(Debug, Error)]
pub enum Error {
    /// Operation invoked before its required prior state
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Collaborator credential missing, invalid or expired
    #[error("Credential error: {0}")]
    Credential(String),

    /// Rate limited or upstream failure; retry manually
    #[error("Transient error: {0}")]
    Transient(String),

    /// Empty or degenerate collaborator response
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown persona, purpose or language identifier
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session lookup failed
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// User-visible error class surfaced by the notice workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorClass {
    Precondition,
    Credential,
    Transient,
    Validation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClass::Precondition => write!(f, "PRECONDITION"),
            ErrorClass::Credential => write!(f, "CREDENTIAL"),
            ErrorClass::Transient => write!(f, "TRANSIENT"),
            ErrorClass::Validation => write!(f, "VALIDATION"),
        }
    }
}

impl Error {
    /// Map the error onto the workflow taxonomy, if it belongs to it
    pub fn class(&self) -> Option<ErrorClass> {
        match self {
            Error::Precondition(_) => Some(ErrorClass::Precondition),
            Error::Credential(_) => Some(ErrorClass::Credential),
            Error::Transient(_) => Some(ErrorClass::Transient),
            Error::Validation(_) => Some(ErrorClass::Validation),
            _ => None,
        }
    }

    /// Rebuild an error from a stored class and message
    pub fn from_class(class: ErrorClass, message: impl Into<String>) -> Self {
        let message = message.into();
        match class {
            ErrorClass::Precondition => Error::Precondition(message),
            ErrorClass::Credential => Error::Credential(message),
            ErrorClass::Transient => Error::Transient(message),
            ErrorClass::Validation => Error::Validation(message),
        }
    }

    /// Whether a manual retry of the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transient(_) | Error::Validation(_))
    }
}

impl From<LlmError> for Error {
    fn from(err: LlmError) -> Self {
        Error::from_class(err.class(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_mapping() {
        assert_eq!(
            Error::Precondition("x".into()).class(),
            Some(ErrorClass::Precondition)
        );
        assert_eq!(
            Error::Credential("x".into()).class(),
            Some(ErrorClass::Credential)
        );
        assert_eq!(Error::Config("x".into()).class(), None);
    }

    #[test]
    fn test_from_class_round_trips_message() {
        let err = Error::from_class(ErrorClass::Transient, "rate limited");
        assert!(matches!(err, Error::Transient(ref m) if m == "rate limited"));
        assert!(err.is_retryable());
        assert!(!Error::Credential("bad key".into()).is_retryable());
    }
}
