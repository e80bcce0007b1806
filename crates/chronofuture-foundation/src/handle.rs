//! The scheduled-task future handle (C3–C5, C8): the execution state
//! machine, the tick runner's Enter/Execute/Exit phases, and the
//! future-like facade (`get`, `cancel`, `is_done`, …).

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;
use tokio::sync::Mutex;

use chronofuture_kernel::{
    parse_pattern, ChronoError, Clock, CronEngine, HandleId, RegistrationId, SchedulerRegistry,
    Stats, TickSink, TimeoutSink, TimerService, WorkerPool,
};

use crate::error::FutureError;
use crate::gate::Gate;
use crate::listener::{self, Listener};
use crate::snapshot::{Snapshot, WireSnapshot};
use crate::task::{Outcome, Task};

/// The external collaborators a handle is wired against. Bundled together
/// so construction reads as one call instead of five positional arguments.
#[derive(Clone)]
pub struct Collaborators {
    pub cron_engine: Arc<dyn CronEngine>,
    pub timer: Arc<dyn TimerService>,
    pub pool: Arc<dyn WorkerPool>,
    pub registry: Arc<dyn SchedulerRegistry>,
    pub clock: Arc<dyn Clock>,
}

/// Trait bounds shared by every generic handle operation: a tick's result
/// and error must be cheap to clone (for concurrent `get()`/listener
/// dispatch) and `'static` (to cross the `Arc<dyn Task<_>>`/trait-object
/// boundary with the cron engine).
pub trait TickResult: Clone + Send + Sync + 'static {}
impl<T: Clone + Send + Sync + 'static> TickResult for T {}

/// A tick's error additionally needs `Debug + Display` so [`FutureError`]
/// can render it.
pub trait TickError: TickResult + std::fmt::Debug + std::fmt::Display {}
impl<T: TickResult + std::fmt::Debug + std::fmt::Display> TickError for T {}

struct MutState<R, E> {
    cancelled: bool,
    done: bool,
    call_count: u64,
    outcome: Outcome<R, E>,
    /// `None` once `done` (invariant 2: `done ⇒ resGate = null`).
    gate: Option<Arc<Gate>>,
    last_listener_exec_cnt: u64,
    listeners: Vec<Arc<dyn Listener<R, E>>>,
    stats: Stats,
}

pub(crate) struct Inner<R, E> {
    pattern: String,
    cron: String,
    delay_secs: u64,
    max_calls: u64,
    create_time_ms: i64,
    handle_id: HandleId,
    /// Written at most once; read without the mutex (spec §5).
    id: OnceLock<RegistrationId>,
    descheduled: AtomicBool,
    sync_notify: bool,
    concur_notify: bool,
    task: Arc<dyn Task<R, E>>,
    cron_engine: Arc<dyn CronEngine>,
    timer: Arc<dyn TimerService>,
    pool: Arc<dyn WorkerPool>,
    registry: Arc<dyn SchedulerRegistry>,
    clock: Arc<dyn Clock>,
    state: Mutex<MutState<R, E>>,
    self_weak: Weak<Inner<R, E>>,
}

fn outcome_to_result<R: Clone, E: Clone>(outcome: &Outcome<R, E>) -> Result<R, FutureError<E>>
where
    E: std::fmt::Debug + std::fmt::Display,
{
    match outcome {
        Outcome::Ok(r) => Ok(r.clone()),
        Outcome::Err(e) => Err(FutureError::TaskError(e.clone())),
        // Only reachable when `cancel()` retired the gate before any tick
        // ever ran (scenario: cancel before first firing).
        Outcome::Pending => Err(FutureError::Cancelled),
    }
}

impl<R, E> Inner<R, E>
where
    R: TickResult,
    E: TickError,
{
    /// Enter/Execute/Exit tick runner (C4). Invoked once per matching cron
    /// instant via [`TickSink::on_tick`].
    async fn run_tick(&self) {
        let gate_at_entry = {
            let mut st = self.state.lock().await;
            if st.done || st.cancelled {
                return;
            }
            if st.stats.running {
                tracing::warn!(
                    pattern = %self.pattern,
                    "tick skipped: a previous tick for this schedule is still running"
                );
                return;
            }
            if self.max_calls > 0 && st.call_count >= self.max_calls {
                return;
            }
            st.call_count += 1;
            let now = self.clock.now_millis();
            st.stats.on_start(now);
            st.gate
                .clone()
                .expect("gate present while handle is not done")
        };

        let result = self.task.call().await;
        if let Err(ref e) = result {
            tracing::error!(pattern = %self.pattern, error = %e, "tick task failed");
        }

        let (listeners_to_notify, outcome_for_listeners, retired_gate, terminal) = {
            let mut st = self.state.lock().await;
            let now = self.clock.now_millis();
            st.outcome = Outcome::from(result);
            st.stats.on_end(now);

            let mut should_notify = false;
            if st.stats.execution_count > st.last_listener_exec_cnt && !st.listeners.is_empty() {
                should_notify = true;
                st.last_listener_exec_cnt = st.stats.execution_count;
            }

            let terminal = (self.max_calls > 0 && st.call_count >= self.max_calls) || st.cancelled;
            let retired = if terminal {
                st.done = true;
                st.gate.take()
            } else {
                st.gate = Some(Arc::new(Gate::new()));
                None
            };

            let listeners = if should_notify {
                st.listeners.clone()
            } else {
                Vec::new()
            };

            (listeners, st.outcome.clone(), retired, terminal)
        };

        gate_at_entry.fire();
        if let Some(retired) = retired_gate {
            retired.fire();
        }

        if !listeners_to_notify.is_empty() {
            if let Some(weak_self) = self.self_weak.upgrade() {
                let snapshot = Snapshot {
                    handle: weak_self,
                    outcome: outcome_for_listeners,
                };
                listener::notify_listeners(
                    listeners_to_notify,
                    snapshot,
                    &*self.pool,
                    self.concur_notify,
                );
            }
        }

        if terminal {
            self.deschedule().await;
        }
    }

    /// One-shot deschedule: drop the cron registration and notify the
    /// scheduler registry, at most once (spec §4.4, invariant 7).
    async fn deschedule(&self) {
        if self
            .descheduled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            if let Some(id) = self.id.get().copied() {
                self.cron_engine.deschedule(id).await;
            }
            self.registry.on_descheduled(self.handle_id);
        }
    }

    /// Register this handle's tick callback with the cron engine. Failure
    /// here means the validator in C1 passed but the engine still rejected
    /// the expression — an internal invariant violation per spec §7.
    async fn register_with_engine(inner: &Arc<Self>) -> Result<(), ChronoError> {
        let sink: Arc<dyn TickSink> = inner.clone();
        match inner.cron_engine.schedule(&inner.cron, sink).await {
            Ok(id) => {
                let _ = inner.id.set(id);
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    cron = %inner.cron,
                    error = %e,
                    "cron engine rejected a pattern the validator accepted"
                );
                debug_assert!(
                    false,
                    "cron engine registration should be impossible by construction: {e}"
                );
                Err(e)
            }
        }
    }

    pub(crate) async fn is_done(&self) -> bool {
        self.state.lock().await.done
    }

    pub(crate) async fn is_cancelled(&self) -> bool {
        self.state.lock().await.cancelled
    }

    pub(crate) async fn call_count(&self) -> u64 {
        self.state.lock().await.call_count
    }

    pub(crate) async fn stats_snapshot(&self) -> Stats {
        self.state.lock().await.stats.clone()
    }

    async fn last(&self) -> Outcome<R, E> {
        self.state.lock().await.outcome.clone()
    }

    async fn get(&self) -> Result<R, FutureError<E>> {
        let (gate, exec_count_at_entry) = {
            let st = self.state.lock().await;
            if st.cancelled {
                return Err(FutureError::Cancelled);
            }
            if st.done {
                return outcome_to_result(&st.outcome);
            }
            (
                st.gate
                    .clone()
                    .expect("gate present while handle is not done"),
                st.stats.execution_count,
            )
        };
        gate.wait().await;
        let st = self.state.lock().await;
        // The gate we waited on is released either by the tick it was
        // taken for completing (`execution_count` advances past the
        // snapshot above), or by `cancel()` retiring it early with no
        // further tick ever running. Only the former may report
        // `st.outcome` — otherwise this waiter would return a previously
        // observed tick instead of its own.
        if st.stats.execution_count == exec_count_at_entry {
            return Err(FutureError::Cancelled);
        }
        outcome_to_result(&st.outcome)
    }

    async fn get_timeout(&self, timeout: Duration) -> Result<R, FutureError<E>> {
        let (gate, exec_count_at_entry) = {
            let st = self.state.lock().await;
            if st.cancelled {
                return Err(FutureError::Cancelled);
            }
            if st.done {
                return outcome_to_result(&st.outcome);
            }
            (
                st.gate
                    .clone()
                    .expect("gate present while handle is not done"),
                st.stats.execution_count,
            )
        };
        match tokio::time::timeout(timeout, gate.wait()).await {
            Ok(()) => {
                let st = self.state.lock().await;
                if st.stats.execution_count == exec_count_at_entry {
                    return Err(FutureError::Cancelled);
                }
                outcome_to_result(&st.outcome)
            }
            Err(_elapsed) => Err(FutureError::Timeout),
        }
    }

    async fn cancel(&self) -> bool {
        let mut retired_gate = None;
        {
            let mut st = self.state.lock().await;
            if st.done {
                return false;
            }
            if st.cancelled {
                return true;
            }
            st.cancelled = true;
            if !st.stats.running {
                st.done = true;
                retired_gate = st.gate.take();
            }
        }
        if let Some(gate) = retired_gate {
            gate.fire();
        }
        self.deschedule().await;
        true
    }

    async fn next_execution_times(&self, count: usize, start_ms: i64) -> Vec<i64> {
        if count == 0 || start_ms <= 0 {
            debug_assert!(
                false,
                "next_execution_times requires count > 0 and start_ms > 0"
            );
            return Vec::new();
        }
        {
            let st = self.state.lock().await;
            if st.done || st.cancelled {
                return Vec::new();
            }
        }
        // Cap by total maxCalls without subtracting callCnt — a retained
        // source quirk, not a bug (DESIGN.md, spec §9 open question).
        let effective_count = if self.max_calls > 0 {
            count.min(self.max_calls as usize)
        } else {
            count
        };
        let clamped_start = start_ms.max(self.create_time_ms + (self.delay_secs as i64) * 1000);
        self.cron_engine
            .next_occurrences(&self.cron, clamped_start, effective_count)
    }

    async fn listen(&self, listener: Arc<dyn Listener<R, E>>) {
        let (catch_up_snapshot, weak_self) = {
            let mut st = self.state.lock().await;
            st.listeners.push(listener.clone());
            let exec_count = st.stats.execution_count;
            if exec_count > 0 && exec_count != st.last_listener_exec_cnt {
                st.last_listener_exec_cnt = exec_count;
                (Some(st.outcome.clone()), self.self_weak.upgrade())
            } else {
                (None, None)
            }
        };
        if let (Some(outcome), Some(handle)) = (catch_up_snapshot, weak_self) {
            let snapshot = Snapshot { handle, outcome };
            listener::deliver_catch_up(listener, snapshot, &*self.pool, self.sync_notify);
        }
    }

    async fn stop_listening(&self, listeners: &[Arc<dyn Listener<R, E>>]) {
        let mut st = self.state.lock().await;
        st.listeners
            .retain(|existing| !listeners.iter().any(|target| Arc::ptr_eq(existing, target)));
    }

    async fn wire_snapshot(&self) -> Option<WireSnapshot<R, E>> {
        let st = self.state.lock().await;
        if !st.done {
            return None;
        }
        Some(WireSnapshot {
            cancelled: st.cancelled,
            outcome: st.outcome.clone(),
            stats: st.stats.clone(),
            sync_notify: self.sync_notify,
            concur_notify: self.concur_notify,
        })
    }
}

#[async_trait]
impl<R, E> TickSink for Inner<R, E>
where
    R: TickResult,
    E: TickError,
{
    async fn on_tick(&self) {
        self.run_tick().await;
    }
}

#[async_trait]
impl<R, E> TimeoutSink for Inner<R, E>
where
    R: TickResult,
    E: TickError,
{
    async fn on_timeout(&self) {
        let Some(inner) = self.self_weak.upgrade() else {
            return;
        };
        let cancelled = inner.state.lock().await.cancelled;
        if cancelled {
            // Registration is skipped; the no-op is safe because `id` is
            // still null (spec §4.3).
            return;
        }
        let _ = Self::register_with_engine(&inner).await;
    }
}

/// A handle binding a user-supplied computation to a recurring schedule,
/// driven through a shared cron engine, that presents a future-like
/// contract: callers may await each next result, observe per-invocation
/// statistics, register completion listeners, cancel the schedule, and
/// serialize a terminal snapshot.
pub struct ScheduledFuture<R, E>(Arc<Inner<R, E>>);

impl<R, E> Clone for ScheduledFuture<R, E> {
    fn clone(&self) -> Self {
        ScheduledFuture(self.0.clone())
    }
}

impl<R, E> ScheduledFuture<R, E>
where
    R: TickResult,
    E: TickError,
{
    /// Parse `pattern`, initialize stats and execution state, register with
    /// the scheduler registry, and either register with the cron engine
    /// immediately or defer registration to the delayed-start coordinator
    /// (spec §2 data flow).
    pub async fn schedule(
        pattern: &str,
        task: impl Task<R, E> + 'static,
        collaborators: Collaborators,
        sync_notify: bool,
        concur_notify: bool,
    ) -> Result<Self, ChronoError> {
        let engine = collaborators.cron_engine.clone();
        let parsed = parse_pattern(pattern, |c| engine.validate(c))?;
        let create_time_ms = collaborators.clock.now_millis();
        let handle_id = HandleId::new();

        let inner = Arc::new_cyclic(|weak| Inner {
            pattern: pattern.to_string(),
            cron: parsed.cron,
            delay_secs: parsed.delay_secs,
            max_calls: parsed.max_calls,
            create_time_ms,
            handle_id,
            id: OnceLock::new(),
            descheduled: AtomicBool::new(false),
            sync_notify,
            concur_notify,
            task: Arc::new(task),
            cron_engine: collaborators.cron_engine,
            timer: collaborators.timer,
            pool: collaborators.pool,
            registry: collaborators.registry,
            clock: collaborators.clock,
            state: Mutex::new(MutState {
                cancelled: false,
                done: false,
                call_count: 0,
                outcome: Outcome::Pending,
                gate: Some(Arc::new(Gate::new())),
                last_listener_exec_cnt: 0,
                listeners: Vec::new(),
                stats: Stats::new(create_time_ms),
            }),
            self_weak: weak.clone(),
        });

        inner.registry.on_scheduled(handle_id);

        if parsed.delay_secs > 0 {
            let sink: Arc<dyn TimeoutSink> = inner.clone();
            inner.timer.after(parsed.delay_secs * 1000, sink).await;
        } else {
            Inner::register_with_engine(&inner).await?;
        }

        Ok(ScheduledFuture(inner))
    }

    pub fn pattern(&self) -> &str {
        &self.0.pattern
    }

    pub fn cron(&self) -> &str {
        &self.0.cron
    }

    pub fn max_calls(&self) -> u64 {
        self.0.max_calls
    }

    pub fn delay_secs(&self) -> u64 {
        self.0.delay_secs
    }

    pub fn registration_id(&self) -> Option<RegistrationId> {
        self.0.id.get().copied()
    }

    pub async fn is_done(&self) -> bool {
        self.0.is_done().await
    }

    pub async fn is_cancelled(&self) -> bool {
        self.0.is_cancelled().await
    }

    pub async fn call_count(&self) -> u64 {
        self.0.call_count().await
    }

    pub async fn stats(&self) -> Stats {
        self.0.stats_snapshot().await
    }

    /// Current best-known outcome without waiting for a new tick. `Pending`
    /// before the first completion (spec §9 tagged-variant guidance,
    /// adopted here in place of raising `Cancelled`/`Interrupted` — see
    /// DESIGN.md).
    pub async fn last(&self) -> Outcome<R, E> {
        self.0.last().await
    }

    /// Await the result of the *next* tick completed after this call; if
    /// the handle is already `done`, returns the terminal last value
    /// immediately (spec §4.4).
    pub async fn get(&self) -> Result<R, FutureError<E>> {
        self.0.get().await
    }

    /// As [`ScheduledFuture::get`], but raises [`FutureError::Timeout`] if
    /// `timeout` elapses first. The gate is not retired by a timeout.
    pub async fn get_timeout(&self, timeout: Duration) -> Result<R, FutureError<E>> {
        self.0.get_timeout(timeout).await
    }

    /// Cancel the schedule. Returns `false` if already `done`, `true`
    /// otherwise (including a redundant call after cancellation already
    /// took effect).
    pub async fn cancel(&self) -> bool {
        self.0.cancel().await
    }

    /// Predict up to `count` future matching instants at or after `start_ms`.
    /// Empty once `done`/`cancelled`. Clamps `start_ms` to at least
    /// `createTime + delay`.
    pub async fn next_execution_times(&self, count: usize, start_ms: i64) -> Vec<i64> {
        self.0.next_execution_times(count, start_ms).await
    }

    /// Register a completion listener. If a tick has already completed and
    /// this listener has not yet observed it, delivers one catch-up
    /// snapshot before returning (spec §4.6).
    pub async fn listen(&self, listener: Arc<dyn Listener<R, E>>) {
        self.0.listen(listener).await
    }

    /// Remove previously registered listeners by identity. No delivery.
    pub async fn stop_listening(&self, listeners: &[Arc<dyn Listener<R, E>>]) {
        self.0.stop_listening(listeners).await
    }

    /// A serializable terminal snapshot, or `None` if the handle is not yet
    /// `done` (only terminal state is serializable — spec §1 Non-goals, §6).
    pub async fn to_wire_snapshot(&self) -> Option<WireSnapshot<R, E>> {
        self.0.wire_snapshot().await
    }
}
