//! External collaborator interfaces (spec §6): the cron engine, the
//! delayed-start timer service, the listener-dispatch worker pool, and the
//! scheduler registry. `spec.md` treats these as out-of-scope named
//! interfaces owned by the surrounding system; this crate still needs to
//! name them as trait contracts so the handle can be generic over which
//! concrete engine drives it. `chronofuture-foundation::builtin` ships one
//! default implementation of each.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Opaque registration identifier returned by a [`CronEngine`]. Never
/// re-assigned once a handle has been given one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RegistrationId(pub u64);

/// Identity a handle presents to the [`SchedulerRegistry`], assigned at
/// construction and independent of the [`RegistrationId`] the cron engine
/// hands out later (a delayed-start handle is registry-known long before it
/// has a `RegistrationId` — spec §2 data flow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct HandleId(pub uuid::Uuid);

impl HandleId {
    pub fn new() -> Self {
        HandleId(uuid::Uuid::new_v4())
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

/// Receives the cron engine's tick callback. Implemented by the handle's
/// tick runner (C4); the engine holds only this trait object, never the
/// handle's concrete type.
#[async_trait]
pub trait TickSink: Send + Sync {
    /// Invoked once per matching cron instant. Must not block the engine's
    /// dispatch thread for longer than the Enter/Execute/Exit phases allow
    /// (see spec §4.2, §5 lock-discipline).
    async fn on_tick(&self);
}

/// The bare (non-extended) cron engine: parsing, scheduling, and
/// prediction over a standard five-field expression.
#[async_trait]
pub trait CronEngine: Send + Sync {
    /// Syntactic validation used by the pattern parser (C1).
    fn validate(&self, cron: &str) -> bool;

    /// Register `sink` to be invoked on every matching instant of `cron`.
    async fn schedule(
        &self,
        cron: &str,
        sink: Arc<dyn TickSink>,
    ) -> Result<RegistrationId, crate::error::ChronoError>;

    /// Drop a registration. Idempotent from the engine's point of view;
    /// callers are responsible for calling it at most once (C4.4 `deschedule`
    /// one-shot guarantee).
    async fn deschedule(&self, id: RegistrationId);

    /// Predict the next `count` matching instants of `cron` at or after
    /// `start_ms` (Unix-epoch milliseconds).
    fn next_occurrences(&self, cron: &str, start_ms: i64, count: usize) -> Vec<i64>;
}

/// Receives a delayed-start timeout fire.
#[async_trait]
pub trait TimeoutSink: Send + Sync {
    async fn on_timeout(&self);
}

/// The delayed-start timer service (C8): a one-shot timeout keyed by an
/// absolute fire time.
#[async_trait]
pub trait TimerService: Send + Sync {
    /// Fire `sink` once, `delay_ms` milliseconds from now. The service owns
    /// its own cancellation; the handle does not track a timer identifier
    /// (spec §4.3).
    async fn after(&self, delay_ms: u64, sink: Arc<dyn TimeoutSink>);
}

/// Fire-and-forget execution of a listener-dispatch job, used by the
/// concurrent and queued notification paths (C6).
pub trait WorkerPool: Send + Sync {
    fn spawn(&self, job: BoxFuture<'static, ()>);
}

/// Bookkeeping hooks called exactly once each over a handle's lifetime.
pub trait SchedulerRegistry: Send + Sync {
    fn on_scheduled(&self, id: HandleId);
    fn on_descheduled(&self, id: HandleId);
}
