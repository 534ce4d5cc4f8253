mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{wait_until, WAIT};
use futures_util::StreamExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use uiflow::scheduler::{ticks, Timer, UiScheduler, UiThread};
use uiflow::scope::{Scope, TaskState};
use uiflow::UiError;

#[tokio::test]
async fn jobs_from_one_thread_keep_submission_order() {
    let ui = UiThread::start("sched-order").unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));

    for index in 0..100 {
        let seen = Arc::clone(&seen);
        ui.run(move || seen.lock().push(index)).unwrap();
    }

    assert!(wait_until(WAIT, || seen.lock().len() == 100).await);
    assert_eq!(*seen.lock(), (0..100).collect::<Vec<_>>());
    ui.shutdown();
}

#[tokio::test]
async fn scope_tasks_on_ui_handle_run_on_ui_thread() {
    let ui = UiThread::start("sched-scope").unwrap();
    let scope = Scope::new("ui-scope", ui.handle().clone());
    let ui_ref = ui.clone();
    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);

    // Bind the interval to the UI runtime's clock.
    let stream = {
        let _guard = ui.handle().enter();
        ticks(Duration::from_millis(5)).take(3)
    };

    let task = scope.listen_stream("ticks", stream, move |tick| {
        sink.lock().push((tick, ui_ref.is_ui_thread()));
        Ok(())
    });

    assert_eq!(task.join().await, TaskState::Completed);
    assert_eq!(*observed.lock(), vec![(0, true), (1, true), (2, true)]);
    scope.close().await;
    ui.shutdown();
}

#[tokio::test]
async fn timer_composes_over_any_scheduler() {
    let ui = UiThread::start("sched-timer").unwrap();
    let timer = Timer::new(Handle::current());
    let scheduler: Arc<dyn UiScheduler> = Arc::new(ui.clone());
    let runs = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&runs);
    let stop = CancellationToken::new();

    let repeating = timer.run_repeating(
        Arc::clone(&scheduler),
        Duration::from_millis(10),
        stop.clone(),
        Arc::new(move || *counter.lock() += 1),
    );
    assert!(wait_until(WAIT, || *runs.lock() >= 3).await);

    ui.shutdown();
    let result = repeating.await.unwrap();
    assert!(matches!(result, Err(UiError::SchedulerClosed)));
    assert!(!stop.is_cancelled());
}

#[test]
fn shutdown_from_ui_thread_does_not_deadlock() {
    let ui = UiThread::start("sched-self").unwrap();
    let inner = ui.clone();

    ui.run(move || inner.shutdown()).unwrap();
    ui.join();

    assert!(ui.is_closed());
    assert!(matches!(ui.run(|| {}), Err(UiError::SchedulerClosed)));
}
