//! Error types for event registration and dispatch.

use thiserror::Error;

use crate::listener::ListenerId;

/// Errors that can occur during event operations.
///
/// None of these are raised as panics. Every rejected call leaves the
/// registry untouched and hands the reason back to the caller, who is free
/// to ignore it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// Event name was empty or blank.
    #[error("invalid event name: {0:?}")]
    InvalidName(String),

    /// The configured emit gate found no listeners for the name.
    #[error("no listeners registered for event: {0}")]
    NoListeners(String),

    /// A listener failed and the manager is configured to abort.
    #[error("listener {id} failed on {name}: {message}")]
    Listener {
        /// Event name being emitted.
        name: String,
        /// Registration that failed.
        id: ListenerId,
        /// Failure reported by the callback.
        message: String,
    },

    /// Lock poisoned (thread panicked while holding lock).
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl EventError {
    /// Returns true for failures caused by the arguments rather than the
    /// registry state.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, EventError::InvalidName(_))
    }
}

/// Result type alias for event operations.
pub type Result<T> = std::result::Result<T, EventError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = EventError::NoListeners("macy.resize".to_string());
        assert_eq!(err.to_string(), "no listeners registered for event: macy.resize");

        let err = EventError::InvalidName(String::new());
        assert_eq!(err.to_string(), "invalid event name: \"\"");
    }

    #[test]
    fn test_is_invalid_input() {
        assert!(EventError::InvalidName(" ".into()).is_invalid_input());
        assert!(!EventError::NoListeners("x".into()).is_invalid_input());
    }
}
