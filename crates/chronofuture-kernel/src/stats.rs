//! Per-handle execution statistics (C2).
//!
//! Mutated only inside the handle's mutex by [`Stats::on_start`]/[`Stats::on_end`],
//! never by user code. Idle time is measured between `on_end` of tick *k* and
//! `on_start` of tick *k+1* (and between construction and the first `on_start`).

use serde::{Deserialize, Serialize};

/// A point-in-time snapshot of one handle's execution history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub create_time_ms: i64,
    pub last_start_time_ms: Option<i64>,
    pub last_end_time_ms: Option<i64>,
    pub execution_count: u64,
    pub total_execution_time_ms: i64,
    pub total_idle_time_ms: i64,
    pub last_execution_time_ms: i64,
    pub last_idle_time_ms: i64,
    pub running: bool,
}

impl Stats {
    /// Create a fresh record stamped with the handle's construction time.
    pub fn new(create_time_ms: i64) -> Self {
        Self {
            create_time_ms,
            last_start_time_ms: None,
            last_end_time_ms: None,
            execution_count: 0,
            total_execution_time_ms: 0,
            total_idle_time_ms: 0,
            last_execution_time_ms: 0,
            last_idle_time_ms: 0,
            running: false,
        }
    }

    /// Record the start of a tick at `now_ms`. Idle time accrues from the
    /// previous `on_end` (or from construction, for the first tick).
    pub fn on_start(&mut self, now_ms: i64) {
        let idle_since = self.last_end_time_ms.unwrap_or(self.create_time_ms);
        self.last_idle_time_ms = (now_ms - idle_since).max(0);
        self.total_idle_time_ms += self.last_idle_time_ms;
        self.last_start_time_ms = Some(now_ms);
        self.running = true;
    }

    /// Record the end of a tick at `now_ms`, bumping `execution_count`.
    pub fn on_end(&mut self, now_ms: i64) {
        let started_at = self.last_start_time_ms.unwrap_or(now_ms);
        self.last_execution_time_ms = (now_ms - started_at).max(0);
        self.total_execution_time_ms += self.last_execution_time_ms;
        self.last_end_time_ms = Some(now_ms);
        self.execution_count += 1;
        self.running = false;
    }

    /// The true running average of execution time across completed ticks.
    ///
    /// Decided in favor of a real average over the source's
    /// `lastExecutionTime`-as-average quirk (see DESIGN.md, §9 open question).
    pub fn average_execution_time_ms(&self) -> i64 {
        if self.execution_count == 0 {
            0
        } else {
            self.total_execution_time_ms / self.execution_count as i64
        }
    }

    /// The true running average of idle time between completed ticks.
    pub fn average_idle_time_ms(&self) -> i64 {
        if self.execution_count == 0 {
            0
        } else {
            self.total_idle_time_ms / self.execution_count as i64
        }
    }
}
