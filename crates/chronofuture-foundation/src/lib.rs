//! The stateful scheduled-task future handle, built against the
//! `chronofuture-kernel` contract.
//!
//! # Architecture
//!
//! - [`handle::ScheduledFuture`] is the execution state machine (C3–C5,
//!   C8): the Enter/Execute/Exit tick runner, the `get`/`cancel`/
//!   `next_execution_times` facade, and the delayed-start coordinator.
//! - [`listener`] is the completion-listener fan-out (C6): sync/async and
//!   serial/concurrent delivery, plus one-shot catch-up delivery.
//! - [`snapshot`] is the immutable per-tick view (C7) delivered to
//!   listeners, and the wire format for a serialized terminal handle.
//! - [`task`] defines the user-supplied computation trait and the tagged
//!   `Outcome` sum type used throughout in place of nullable result/error
//!   pairs.
//! - [`gate`] is the per-tick single-use release primitive every `get()`
//!   call waits on.
//! - [`builtin`] ships a default implementation of each external
//!   collaborator trait from `chronofuture-kernel` (cron engine, timer
//!   service, worker pool, scheduler registry) so a handle can be
//!   constructed without wiring in anything else first.
//!
//! This crate depends on `chronofuture-kernel` for the trait contracts and
//! never the reverse.

pub mod builtin;
pub mod config;
pub mod error;
pub mod gate;
pub mod handle;
pub mod listener;
pub mod snapshot;
pub mod task;

#[cfg(test)]
pub mod test_support;

pub use config::SchedulerConfig;
pub use error::FutureError;
pub use handle::{Collaborators, ScheduledFuture, TickError, TickResult};
pub use listener::Listener;
pub use snapshot::{Snapshot, TerminalView, WireSnapshot};
pub use task::{Outcome, Task};
