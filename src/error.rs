//! Error types for Synheart Pulse

use crate::types::FailureReason;
use thiserror::Error;

/// Errors that can occur while acquiring or analyzing a scan
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Insufficient data: collected {collected} samples, need at least {required}")]
    InsufficientData { collected: usize, required: usize },

    #[error("No heartbeat peaks detected in the conditioned signal")]
    NoPeaksDetected,

    #[error("Insufficient RR intervals: {valid} valid, need at least 2")]
    InsufficientIntervals { valid: usize },

    #[error("Analysis produced a non-finite value: {0}")]
    NonFiniteResult(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Timestamp went backwards: {current} ms after {previous} ms")]
    NonMonotonicTimestamp { previous: f64, current: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Failed to parse scan input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ScanError {
    /// The failure reason recorded on a session when this error ends a scan.
    ///
    /// Returns `None` for usage errors that leave the session state untouched.
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            ScanError::InsufficientData { .. } => Some(FailureReason::InsufficientData),
            ScanError::NoPeaksDetected => Some(FailureReason::NoPeaksDetected),
            ScanError::InsufficientIntervals { .. } => Some(FailureReason::InsufficientIntervals),
            ScanError::NonFiniteResult(_) => Some(FailureReason::NonFiniteResult),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_errors_map_to_failure_reasons() {
        let err = ScanError::InsufficientData {
            collected: 99,
            required: 100,
        };
        assert_eq!(err.failure_reason(), Some(FailureReason::InsufficientData));
        assert_eq!(
            ScanError::NoPeaksDetected.failure_reason(),
            Some(FailureReason::NoPeaksDetected)
        );
        assert_eq!(
            ScanError::InsufficientIntervals { valid: 1 }.failure_reason(),
            Some(FailureReason::InsufficientIntervals)
        );
    }

    #[test]
    fn test_usage_errors_have_no_failure_reason() {
        let err = ScanError::InvalidState {
            operation: "push a frame",
            state: "idle",
        };
        assert!(err.failure_reason().is_none());
        assert_eq!(err.to_string(), "Cannot push a frame while session is idle");
        assert!(ScanError::InvalidFrame("empty".to_string())
            .failure_reason()
            .is_none());
    }
}
