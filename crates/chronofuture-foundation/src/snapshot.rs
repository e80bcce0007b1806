//! Immutable per-tick view of a handle (C7).
//!
//! Carries `(handle, res, err)`: a live back-reference to the handle for
//! delegating accessors (`count()`, `stats()`, … may advance after the
//! snapshot was produced) plus a frozen `(res, err)` pair so `last()`
//! always reports *this* tick's outcome even if a later tick completes
//! during listener dispatch (spec §4.6, §4.7, §9 "Snapshot back-reference").

use crate::handle::{Inner, TickError, TickResult};
use crate::task::Outcome;
use chronofuture_kernel::Stats;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone)]
pub struct Snapshot<R, E> {
    pub(crate) handle: Arc<Inner<R, E>>,
    pub(crate) outcome: Outcome<R, E>,
}

impl<R, E> Snapshot<R, E>
where
    R: TickResult,
    E: TickError,
{
    /// The frozen result of the tick this snapshot was produced for.
    pub fn last(&self) -> Outcome<R, E> {
        self.outcome.clone()
    }

    /// Live read-through: the handle's current completed-tick count, which
    /// may be larger than it was when this snapshot was produced.
    pub async fn count(&self) -> u64 {
        self.handle.call_count().await
    }

    pub async fn is_done(&self) -> bool {
        self.handle.is_done().await
    }

    pub async fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled().await
    }

    pub async fn stats(&self) -> Stats {
        self.handle.stats_snapshot().await
    }
}

/// The wire format for a serialized terminal snapshot (spec §6 "Persisted
/// state layout"): `cancelled`, `lastRes`, `lastErr`, `stats`, `syncNotify`,
/// `concurNotify`, in that order. The pattern, id, delay, maxCalls, and
/// callCnt are deliberately not carried — the remote view is a frozen
/// snapshot of the last outcome only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireSnapshot<R, E> {
    pub cancelled: bool,
    pub outcome: Outcome<R, E>,
    pub stats: Stats,
    pub sync_notify: bool,
    pub concur_notify: bool,
}

/// Reconstructed from a [`WireSnapshot`]: a terminal, read-only view with
/// no cron registration, no task reference, and no listeners. Implements
/// the same read accessors as a live handle, all backed by frozen data
/// (spec §6, §3 invariant 8: `done = true`, an already-open gate).
#[derive(Debug, Clone)]
pub struct TerminalView<R, E> {
    cancelled: bool,
    outcome: Outcome<R, E>,
    stats: Stats,
    sync_notify: bool,
    concur_notify: bool,
}

impl<R, E> TerminalView<R, E>
where
    R: Clone,
    E: Clone,
{
    pub fn from_wire(wire: WireSnapshot<R, E>) -> Self {
        Self {
            cancelled: wire.cancelled,
            outcome: wire.outcome,
            stats: wire.stats,
            sync_notify: wire.sync_notify,
            concur_notify: wire.concur_notify,
        }
    }

    pub fn is_done(&self) -> bool {
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn last(&self) -> Outcome<R, E> {
        self.outcome.clone()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn sync_notify(&self) -> bool {
        self.sync_notify
    }

    pub fn concur_notify(&self) -> bool {
        self.concur_notify
    }

    /// A terminal view's gate is already open: `get()` on a deserialized
    /// view never blocks. Exposed as an async fn for call-site symmetry
    /// with the live handle's `get()`.
    pub async fn get(&self) -> Outcome<R, E> {
        self.outcome.clone()
    }
}
