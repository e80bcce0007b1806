//! Default implementations of the kernel's external collaborator traits
//! (spec §6). Not the only valid implementations — any embedder can supply
//! its own `CronEngine`/`TimerService`/`WorkerPool`/`SchedulerRegistry` to
//! [`crate::handle::Collaborators`] instead, e.g. to share a pool-wide
//! cron dispatcher across many handles.

mod local_cron;
mod local_pool;
mod local_registry;
mod local_timer;

pub use local_cron::LocalCronEngine;
pub use local_pool::LocalWorkerPool;
pub use local_registry::LocalSchedulerRegistry;
pub use local_timer::LocalTimerService;
