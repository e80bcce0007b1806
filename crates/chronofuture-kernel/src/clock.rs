//! Clock abstraction (injectable for testing).

/// Provides the current wall-clock time as Unix-epoch milliseconds.
///
/// Injecting this rather than calling `SystemTime::now()` directly makes
/// every timing-sensitive path in the handle (stats, gate replacement,
/// `next_execution_times`) deterministic under test.
pub trait Clock: Send + Sync {
    /// Returns the current time as milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// The default [`Clock`] implementation backed by the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis()
            .try_into()
            .unwrap_or(i64::MAX)
    }
}
