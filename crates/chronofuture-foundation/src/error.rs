//! The handle-facing half of the error taxonomy (spec §7). Construction
//! errors (`InvalidPattern`) are `chronofuture_kernel::ChronoError`, which is
//! not generic over the task's error type; everything a *running* handle
//! can raise through `get`/`get_timeout`/`last` is generic over the task's
//! own error type `E`, so [`FutureError`] lives here rather than in the
//! kernel crate.

use thiserror::Error;

/// Every way `get`/`get_timeout`/`last` can end without the next tick's
/// successful result.
#[derive(Debug, Error)]
pub enum FutureError<E: std::fmt::Debug + std::fmt::Display> {
    /// The handle is cancelled and has no completed tick to report.
    #[error("scheduled future was cancelled")]
    Cancelled,

    /// A timed `get` elapsed without a tick completing. The gate observed
    /// at entry is not retired by a timeout.
    #[error("timed out waiting for the next tick")]
    Timeout,

    /// The wait was interrupted and the handle is neither cancelled nor done.
    #[error("wait on the next tick was interrupted")]
    Interrupted,

    /// The last tick's own failure, re-raised with its original value
    /// intact (the Rust rendition of "preserving cause" for a typed `E`).
    #[error("task execution failed: {0}")]
    TaskError(E),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_error_display_includes_inner_message() {
        let e: FutureError<String> = FutureError::TaskError("boom".to_string());
        assert!(e.to_string().contains("boom"));
    }

    #[test]
    fn cancelled_and_timeout_display() {
        let e: FutureError<String> = FutureError::Cancelled;
        assert_eq!(e.to_string(), "scheduled future was cancelled");
        let e: FutureError<String> = FutureError::Timeout;
        assert_eq!(e.to_string(), "timed out waiting for the next tick");
    }
}
