//! Kernel contract for scheduled-task futures — traits, types, and errors.
//!
//! # Architecture
//!
//! This crate defines the complete kernel-level contract for a cron-driven
//! scheduled-task future: the extended-pattern parser, the statistics
//! record, the error taxonomy, and the external collaborator interfaces
//! (cron engine, timer service, worker pool, scheduler registry).
//!
//! - **Trait definitions and pure data** live here.
//! - **The stateful handle and default collaborator implementations** live
//!   in `chronofuture-foundation`.
//! - This crate must never depend on `chronofuture-foundation`.
//!
//! Everything in this crate is synchronous or `#[async_trait]`-only; there
//! is no hard dependency on a running Tokio runtime.

pub mod clock;
pub mod engine;
pub mod error;
pub mod pattern;
pub mod stats;

pub use clock::{Clock, SystemClock};
pub use engine::{
    CronEngine, HandleId, RegistrationId, SchedulerRegistry, TickSink, TimeoutSink, TimerService,
    WorkerPool,
};
pub use error::{ChronoError, ChronoResult};
pub use pattern::{parse_pattern, ParsedPattern};
pub use stats::Stats;
