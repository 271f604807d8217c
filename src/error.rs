//! Error types for synchronisation and BER measurement

use thiserror::Error;

/// Result type for sync and BER operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised while aligning a receive buffer or counting bit errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Precondition violated by the caller (empty input, receive shorter than reference, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No offset found within the iteration budget of every disambiguation attempt
    #[error("Synchronisation failed: maximum iterations exceeded after {attempts} attempt(s)")]
    SyncExhausted { attempts: usize },

    /// Error ratio above the sanity threshold, most likely a wrong sync
    #[error("BER {ber:.3} is over {threshold:.1}, this is probably a wrong sync")]
    ThresholdExceeded { ber: f64, threshold: f64 },
}

impl SyncError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        SyncError::InvalidArgument(msg.into())
    }

    /// True for failures a polarity/rotation/order retry may resolve.
    pub fn is_sync_failure(&self) -> bool {
        matches!(self, SyncError::SyncExhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_exhaustion_is_retryable() {
        assert!(SyncError::SyncExhausted { attempts: 1 }.is_sync_failure());
        assert!(!SyncError::invalid("empty").is_sync_failure());
        assert!(
            !SyncError::ThresholdExceeded {
                ber: 0.5,
                threshold: 0.2
            }
            .is_sync_failure()
        );
    }

    #[test]
    fn test_threshold_message() {
        let err = SyncError::ThresholdExceeded {
            ber: 0.48,
            threshold: 0.2,
        };
        assert_eq!(
            err.to_string(),
            "BER 0.480 is over 0.2, this is probably a wrong sync"
        );
    }
}
