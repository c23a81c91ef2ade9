//! Error types for the timing engine.
//!
//! Nothing in this crate is fatal: every failure is a value the caller can
//! inspect and translate into a user-facing message. Transition methods on
//! [`TimerEngine`](crate::TimerEngine) return [`TimingError::InvalidTransition`]
//! when the state machine does not permit the requested operation, and the
//! async [`TimerHandle`](crate::TimerHandle) returns
//! [`TimingError::DriverClosed`] once its background task has shut down.
//!
//! Lap lookups by id (`update_lap_participant`, `mark_lap_saved`) never
//! error at all; a missing id is a benign no-op reported as `false`.

use thiserror::Error;

use crate::types::Phase;

/// Result type alias for timing operations.
pub type Result<T, E = TimingError> = std::result::Result<T, E>;

/// Main error type for timing operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimingError {
    #[error("cannot {action} while the timer is {phase}")]
    InvalidTransition {
        /// Operation that was attempted, e.g. `"record a lap"`.
        action: &'static str,
        /// Phase the engine was in when the operation was rejected.
        phase: Phase,
    },

    #[error("timer driver has shut down")]
    DriverClosed,
}

impl TimingError {
    /// Helper constructor for rejected state-machine transitions.
    pub fn invalid_transition(action: &'static str, phase: Phase) -> Self {
        TimingError::InvalidTransition { action, phase }
    }

    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// Invalid transitions are recoverable once the timer reaches a
    /// permitting phase; a closed driver is permanent for that handle.
    pub fn is_retryable(&self) -> bool {
        match self {
            TimingError::InvalidTransition { .. } => true,
            TimingError::DriverClosed => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_contain_context() {
        let err = TimingError::invalid_transition("record a lap", Phase::Stopped);
        let msg = err.to_string();
        assert!(msg.contains("record a lap"));
        assert!(msg.contains("stopped"));
    }

    #[test]
    fn error_traits_validation() {
        // Compile-time check: TimingError must be Send + Sync + 'static
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<TimingError>();

        let error = TimingError::DriverClosed;
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn retryability_classification() {
        assert!(TimingError::invalid_transition("start", Phase::Running).is_retryable());
        assert!(!TimingError::DriverClosed.is_retryable());
    }
}
