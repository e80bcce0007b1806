//! The per-tick result gate: a single-use synchronization primitive that
//! releases all current waiters exactly once, when the tick it belongs to
//! completes (spec §3 `resGate`, §9 "shared gate vs. promise-per-tick").
//!
//! Modeled as a `tokio::sync::Notify` guarded by a `fired` flag rather than
//! a oneshot channel, since a oneshot has exactly one receiver while a gate
//! must release an unbounded number of concurrent `get()` callers that all
//! took a reference to the same tick.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct Gate {
    notify: Notify,
    fired: AtomicBool,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            notify: Notify::new(),
            fired: AtomicBool::new(false),
        }
    }

    /// Wait until [`Gate::fire`] has been called, returning immediately if
    /// it already has.
    pub async fn wait(&self) {
        if self.fired.load(Ordering::Acquire) {
            return;
        }
        // Register interest before the second check so a `fire()` racing
        // in between is not missed (tokio's documented Notify recipe).
        let notified = self.notify.notified();
        if self.fired.load(Ordering::Acquire) {
            return;
        }
        notified.await;
    }

    /// Release every current and future waiter. Safe to call more than
    /// once; only the first call has any effect.
    pub fn fire(&self) {
        self.fired.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn wait_returns_immediately_if_already_fired() {
        let gate = Gate::new();
        gate.fire();
        tokio::time::timeout(Duration::from_millis(50), gate.wait())
            .await
            .expect("should not block");
    }

    #[tokio::test]
    async fn wait_releases_all_waiters_on_fire() {
        let gate = Arc::new(Gate::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let g = gate.clone();
            handles.push(tokio::spawn(async move {
                g.wait().await;
            }));
        }
        // Give the spawned tasks a chance to register as waiters.
        tokio::time::sleep(Duration::from_millis(20)).await;
        gate.fire();
        for h in handles {
            tokio::time::timeout(Duration::from_millis(200), h)
                .await
                .expect("waiter should be released")
                .unwrap();
        }
    }

    #[tokio::test]
    async fn fire_is_idempotent() {
        let gate = Gate::new();
        gate.fire();
        gate.fire();
        assert!(gate.is_fired());
    }
}
