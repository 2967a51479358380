//! Scheduler error types

use phigate_domain::PhiGateError;
use thiserror::Error;

/// Scheduler-specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Shutdown did not finish within the join timeout
    #[error("Timer task join timed out after {seconds}s")]
    JoinTimeout { seconds: u64 },

    /// Timer task panicked or was aborted unexpectedly
    #[error("Timer task join failed: {0}")]
    TaskJoinFailed(String),
}

/// Result alias for scheduler operations
pub type SchedulerResult<T> = std::result::Result<T, SchedulerError>;

impl From<SchedulerError> for PhiGateError {
    fn from(err: SchedulerError) -> Self {
        Self::Internal(err.to_string())
    }
}
