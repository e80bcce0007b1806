//! Crate-level error taxonomy for scheduled-task futures.
//!
//! One variant per programmatic condition named in the error-handling design:
//! parse failures at construction, the three distinct ways a wait on `get`
//! can end without a result, and the last tick's own failure re-raised with
//! its original cause preserved.

use thiserror::Error;

/// All errors a [`crate::pattern`] parse or a handle operation can produce.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChronoError {
    /// Raised by the pattern parser at construction only. Carries both the
    /// offending substring and the full original pattern so callers can
    /// point at exactly what failed to parse.
    #[error("invalid pattern '{pattern}': {detail} (offending: '{offending}')")]
    InvalidPattern {
        pattern: String,
        offending: String,
        detail: String,
    },

    /// Raised by `get`/`get_timeout`/`last` when the handle is cancelled and
    /// has no completed tick to report.
    #[error("scheduled future was cancelled")]
    Cancelled,

    /// Raised only by the timed `get` variant when it elapses without a
    /// tick completing. The gate is not retired by a timeout.
    #[error("timed out waiting for the next tick")]
    Timeout,

    /// Raised when the caller's wait is interrupted and the handle is
    /// neither cancelled nor done.
    #[error("wait on the next tick was interrupted")]
    Interrupted,

    /// The last tick's own failure, stored in `lastErr` and re-raised
    /// (preserving the original cause) by `get`/`last`. Does not stop the
    /// schedule; subsequent ticks continue.
    #[error("task execution failed: {0}")]
    TaskError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ChronoError {
    /// Construct an [`ChronoError::InvalidPattern`] for `offending` found
    /// while parsing `pattern`.
    pub fn invalid_pattern(
        pattern: impl Into<String>,
        offending: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        ChronoError::InvalidPattern {
            pattern: pattern.into(),
            offending: offending.into(),
            detail: detail.into(),
        }
    }

    /// Wrap an arbitrary task failure so its cause chain survives re-raising.
    pub fn task_error(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        ChronoError::TaskError(Box::new(err))
    }
}

/// Convenience alias for results returned by kernel and foundation APIs.
pub type ChronoResult<T> = Result<T, ChronoError>;
