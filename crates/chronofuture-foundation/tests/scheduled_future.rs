//! End-to-end scenarios against the built-in `Local*` collaborators: parse
//! → schedule → tick → get/cancel/listener, exercising the handle the way
//! an embedder actually would rather than unit-testing one module in
//! isolation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chronofuture_foundation::builtin::{
    LocalCronEngine, LocalSchedulerRegistry, LocalTimerService, LocalWorkerPool,
};
use chronofuture_foundation::{Collaborators, FutureError, Outcome, ScheduledFuture};
use chronofuture_kernel::SystemClock;

fn collaborators() -> Collaborators {
    Collaborators {
        cron_engine: Arc::new(LocalCronEngine::new()),
        timer: Arc::new(LocalTimerService::new()),
        pool: Arc::new(LocalWorkerPool::new()),
        registry: Arc::new(LocalSchedulerRegistry::new()),
        clock: Arc::new(SystemClock),
    }
}

#[tokio::test]
async fn every_second_schedule_caps_next_execution_times_by_max_calls() {
    let task = || async { Ok::<_, String>(()) };
    let future = ScheduledFuture::schedule(
        "{0,3} * * * * * *",
        task,
        collaborators(),
        false,
        false,
    )
    .await
    .unwrap();

    let start = chrono::Utc::now().timestamp_millis();
    let times = future.next_execution_times(10, start).await;
    // Capped by maxCalls=3, not the requested count of 10 (spec §8 scenario 1).
    assert_eq!(times.len(), 3);
    assert!(times.windows(2).all(|w| w[0] < w[1]));

    future.cancel().await;
}

#[tokio::test]
async fn three_ticks_then_done_and_terminal_get_repeats() {
    let counter = Arc::new(AtomicUsize::new(0));
    let counter2 = counter.clone();
    let task = move || {
        let counter = counter2.clone();
        async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(n)
        }
    };

    let future = ScheduledFuture::schedule(
        "{0,3} * * * * * *",
        task,
        collaborators(),
        false,
        false,
    )
    .await
    .unwrap();

    for expected in 0..3 {
        let got = tokio::time::timeout(Duration::from_secs(3), future.get())
            .await
            .expect("tick should complete within 3s")
            .unwrap();
        assert_eq!(got, expected);
    }

    assert!(future.is_done().await);
    assert_eq!(future.call_count().await, 3);
    assert!(!future.is_cancelled().await);

    // Terminal state: subsequent get() repeats the last completed tick.
    let again = future.get().await.unwrap();
    assert_eq!(again, 2);
    assert!(future
        .next_execution_times(5, chrono::Utc::now().timestamp_millis())
        .await
        .is_empty());
}

#[tokio::test]
async fn cancel_before_first_tick_on_long_delay_is_immediate() {
    let task = || async { Ok::<_, String>(1) };
    let future = ScheduledFuture::schedule(
        "{60,*} * * * * * *",
        task,
        collaborators(),
        false,
        false,
    )
    .await
    .unwrap();

    assert!(future.cancel().await);
    assert!(future.is_cancelled().await);
    assert!(future.is_done().await);
    assert!(matches!(future.get().await, Err(FutureError::Cancelled)));
    assert!(future
        .next_execution_times(5, chrono::Utc::now().timestamp_millis())
        .await
        .is_empty());
    // Deschedule is one-shot; a second cancel is still a reported success.
    assert!(future.cancel().await);
}

#[tokio::test]
async fn cancel_after_completed_tick_leaves_the_result_observable() {
    let task = || async { Ok::<_, String>("done".to_string()) };
    let future = ScheduledFuture::schedule(
        "* * * * * * *",
        task,
        collaborators(),
        false,
        false,
    )
    .await
    .unwrap();

    let first = tokio::time::timeout(Duration::from_secs(3), future.get())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first, "done");

    future.cancel().await;
    assert!(future.is_cancelled().await);
    assert!(future.is_done().await);

    // A `get()` after cancellation with no further ticks reports `Cancelled`,
    // not the last tick's stale result (spec §8 boundary behavior).
    assert!(matches!(future.get().await, Err(FutureError::Cancelled)));
}

#[tokio::test]
async fn concurrent_get_calls_observe_the_same_tick() {
    let counter = Arc::new(AtomicUsize::new(0));
    let counter2 = counter.clone();
    let task = move || {
        let counter = counter2.clone();
        async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(n)
        }
    };

    let future = ScheduledFuture::schedule(
        "* * * * * * *",
        task,
        collaborators(),
        false,
        false,
    )
    .await
    .unwrap();

    let f1 = future.clone();
    let f2 = future.clone();
    let f3 = future.clone();
    let (a, b, c) = tokio::join!(
        tokio::time::timeout(Duration::from_secs(3), f1.get()),
        tokio::time::timeout(Duration::from_secs(3), f2.get()),
        tokio::time::timeout(Duration::from_secs(3), f3.get()),
    );

    let a = a.unwrap().unwrap();
    let b = b.unwrap().unwrap();
    let c = c.unwrap().unwrap();
    assert_eq!(a, b);
    assert_eq!(b, c);

    future.cancel().await;
}

#[tokio::test]
async fn get_parked_on_next_tick_returns_cancelled_when_cancel_retires_the_gate() {
    let counter = Arc::new(AtomicUsize::new(0));
    let counter2 = counter.clone();
    let task = move || {
        let counter = counter2.clone();
        async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(n)
        }
    };

    let future = ScheduledFuture::schedule(
        "* * * * * * *",
        task,
        collaborators(),
        false,
        false,
    )
    .await
    .unwrap();

    let first = tokio::time::timeout(Duration::from_secs(3), future.get())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first, 0);

    // Park a `get()` on the gate for the *next* tick, then cancel well
    // before that tick can fire. The waiter must observe `Cancelled`, not
    // the first tick's stale `Ok(0)` — a `get()` never returns a
    // previously observed tick.
    let waiter = tokio::spawn({
        let future = future.clone();
        async move { future.get().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(future.cancel().await);

    let result = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("waiter should resolve once cancel retires its gate")
        .unwrap();
    assert!(matches!(result, Err(FutureError::Cancelled)));
}

#[tokio::test]
async fn get_timeout_elapses_without_retiring_the_gate() {
    let task = || async { Ok::<_, String>(1) };
    // Delay long enough that the timed get below will elapse first.
    let future = ScheduledFuture::schedule(
        "{5,1} * * * * * *",
        task,
        collaborators(),
        false,
        false,
    )
    .await
    .unwrap();

    let err = future
        .get_timeout(Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, FutureError::Timeout));
    assert!(!future.is_done().await);

    future.cancel().await;
}

#[tokio::test]
async fn last_is_pending_before_first_tick_and_ok_after() {
    let task = || async { Ok::<_, String>(7) };
    let future = ScheduledFuture::schedule(
        "{2,1} * * * * * *",
        task,
        collaborators(),
        false,
        false,
    )
    .await
    .unwrap();

    assert!(matches!(future.last().await, Outcome::Pending));
    let got = tokio::time::timeout(Duration::from_secs(5), future.get())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(got, 7);
    assert!(matches!(future.last().await, Outcome::Ok(7)));
}

#[tokio::test]
async fn task_error_does_not_stop_the_schedule() {
    let counter = Arc::new(AtomicUsize::new(0));
    let counter2 = counter.clone();
    let task = move || {
        let counter = counter2.clone();
        async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err("first tick fails".to_string())
            } else {
                Ok(n)
            }
        }
    };

    let future = ScheduledFuture::schedule(
        "{0,2} * * * * * *",
        task,
        collaborators(),
        false,
        false,
    )
    .await
    .unwrap();

    let first = tokio::time::timeout(Duration::from_secs(3), future.get()).await.unwrap();
    assert!(matches!(first, Err(FutureError::TaskError(ref e)) if e == "first tick fails"));
    assert!(!future.is_done().await);

    let second = tokio::time::timeout(Duration::from_secs(3), future.get())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second, 1);
    assert!(future.is_done().await);
}

#[tokio::test]
async fn wire_snapshot_round_trips_a_terminal_handle_through_json() {
    let task = || async { Ok::<_, String>(99) };
    let future = ScheduledFuture::schedule(
        "{0,1} * * * * * *",
        task,
        collaborators(),
        true,
        true,
    )
    .await
    .unwrap();

    future.get().await.unwrap();
    let wire = future.to_wire_snapshot().await.expect("handle is done");
    let json = serde_json::to_string(&wire).unwrap();
    let back: chronofuture_foundation::WireSnapshot<i32, String> =
        serde_json::from_str(&json).unwrap();

    let view = chronofuture_foundation::TerminalView::from_wire(back);
    assert!(view.is_done());
    assert!(!view.is_cancelled());
    assert!(view.sync_notify());
    assert!(view.concur_notify());
    assert!(matches!(view.last(), Outcome::Ok(99)));
    assert!(matches!(view.get().await, Outcome::Ok(99)));
}
