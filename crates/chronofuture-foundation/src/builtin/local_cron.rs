//! Default [`CronEngine`]: one background task per registration, parked on
//! `tokio::time::sleep` until the cron expression's next occurrence, torn
//! down by a oneshot cancellation signal (grounded on `CronScheduler`'s
//! `spawn_schedule_task`/`ScheduleTiming::Cron`).

use async_trait::async_trait;
use chrono::Utc;
use cron::Schedule;
use dashmap::DashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

use chronofuture_kernel::{ChronoError, CronEngine, RegistrationId, TickSink};

pub struct LocalCronEngine {
    next_id: AtomicU64,
    cancellers: DashMap<u64, oneshot::Sender<()>>,
}

impl LocalCronEngine {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            cancellers: DashMap::new(),
        }
    }
}

impl Default for LocalCronEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CronEngine for LocalCronEngine {
    fn validate(&self, cron: &str) -> bool {
        Schedule::from_str(cron).is_ok()
    }

    async fn schedule(
        &self,
        cron: &str,
        sink: Arc<dyn TickSink>,
    ) -> Result<RegistrationId, ChronoError> {
        let schedule = Schedule::from_str(cron)
            .map_err(|e| ChronoError::invalid_pattern(cron, cron, e.to_string()))?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (cancel_tx, mut cancel_rx) = oneshot::channel();
        self.cancellers.insert(id, cancel_tx);

        tokio::spawn(async move {
            loop {
                let now = Utc::now();
                let Some(next) = schedule.upcoming(Utc).next() else {
                    tracing::error!("cron schedule has no further occurrences; stopping");
                    return;
                };
                let duration = next.signed_duration_since(now);
                let sleep_for = if duration > chrono::Duration::zero() {
                    duration.to_std().unwrap_or(std::time::Duration::ZERO)
                } else {
                    std::time::Duration::ZERO
                };

                tokio::select! {
                    _ = &mut cancel_rx => {
                        return;
                    }
                    _ = tokio::time::sleep(sleep_for) => {
                        sink.on_tick().await;
                    }
                }
            }
        });

        Ok(RegistrationId(id))
    }

    async fn deschedule(&self, id: RegistrationId) {
        if let Some((_, tx)) = self.cancellers.remove(&id.0) {
            let _ = tx.send(());
        }
    }

    fn next_occurrences(&self, cron: &str, start_ms: i64, count: usize) -> Vec<i64> {
        let Ok(schedule) = Schedule::from_str(cron) else {
            return Vec::new();
        };
        let Some(start) = chrono::DateTime::<Utc>::from_timestamp_millis(start_ms) else {
            return Vec::new();
        };
        schedule
            .after(&start)
            .take(count)
            .map(|t| t.timestamp_millis())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronofuture_kernel::TickSink;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct CountingSink(Arc<AtomicUsize>);

    #[async_trait]
    impl TickSink for CountingSink {
        async fn on_tick(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn validate_accepts_seven_field_quartz_expression() {
        let engine = LocalCronEngine::new();
        assert!(engine.validate("0 * * * * * *"));
        assert!(!engine.validate("not a cron expression"));
    }

    #[tokio::test]
    async fn deschedule_stops_future_ticks() {
        let engine = LocalCronEngine::new();
        let count = Arc::new(AtomicUsize::new(0));
        let sink: Arc<dyn TickSink> = Arc::new(CountingSink(count.clone()));
        let id = engine.schedule("* * * * * * *", sink).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        engine.deschedule(id).await;
        let seen_before = count.load(Ordering::SeqCst);
        assert!(seen_before >= 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen_before);
    }

    #[test]
    fn next_occurrences_are_strictly_increasing() {
        let engine = LocalCronEngine::new();
        let start = Utc::now().timestamp_millis();
        let times = engine.next_occurrences("0 * * * * * *", start, 3);
        assert_eq!(times.len(), 3);
        assert!(times[0] < times[1] && times[1] < times[2]);
    }
}
