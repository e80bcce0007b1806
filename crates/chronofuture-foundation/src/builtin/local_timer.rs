//! Default [`TimerService`]: a one-shot `tokio::time::sleep` per call. The
//! delayed-start coordinator (C8) never needs to cancel an outstanding
//! timer — cancellation before fire is instead observed by the sink itself
//! (`Inner::on_timeout` checks `cancelled` before registering).

use async_trait::async_trait;
use std::sync::Arc;

use chronofuture_kernel::{TimeoutSink, TimerService};

pub struct LocalTimerService;

impl LocalTimerService {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalTimerService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TimerService for LocalTimerService {
    async fn after(&self, delay_ms: u64, sink: Arc<dyn TimeoutSink>) {
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            sink.on_timeout().await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    struct FlagSink(Arc<AtomicBool>);

    #[async_trait]
    impl TimeoutSink for FlagSink {
        async fn on_timeout(&self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn fires_after_the_requested_delay() {
        let timer = LocalTimerService::new();
        let fired = Arc::new(AtomicBool::new(false));
        let sink: Arc<dyn TimeoutSink> = Arc::new(FlagSink(fired.clone()));
        timer.after(50, sink).await;
        assert!(!fired.load(Ordering::SeqCst));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(fired.load(Ordering::SeqCst));
    }
}
