//! Delayed and periodic submission composed over a [`UiScheduler`].

use std::sync::Arc;
use std::time::Duration;

use futures_core::Stream;
use futures_util::stream;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{Job, UiScheduler};
use crate::error::UiError;

/// Waits on the tokio clock of its own runtime and hands work to a
/// scheduler when due.
#[derive(Clone)]
pub struct Timer {
    handle: Handle,
}

impl Timer {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Submit `job` to `scheduler` after `delay`.
    ///
    /// The returned handle resolves to the submission result, so a
    /// scheduler closed in the meantime shows up as
    /// [`UiError::SchedulerClosed`].
    pub fn run_after(
        &self,
        scheduler: Arc<dyn UiScheduler>,
        delay: Duration,
        job: Job,
    ) -> JoinHandle<Result<(), UiError>> {
        self.handle.spawn(async move {
            time::sleep(delay).await;
            scheduler.run_on_ui_thread(job).inspect_err(|err| {
                tracing::warn!(error = %err, "Delayed UI job dropped");
            })
        })
    }

    /// Submit a fresh run of `job` every `period` until `cancel` fires or
    /// the scheduler closes. The first run happens after one period.
    pub fn run_repeating(
        &self,
        scheduler: Arc<dyn UiScheduler>,
        period: Duration,
        cancel: CancellationToken,
        job: Arc<dyn Fn() + Send + Sync>,
    ) -> JoinHandle<Result<(), UiError>> {
        self.handle.spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Ok::<(), UiError>(()),
                    _ = interval.tick() => {
                        let job = Arc::clone(&job);
                        if let Err(err) = scheduler.run_on_ui_thread(Box::new(move || job())) {
                            tracing::debug!(error = %err, "Repeating UI job stopped");
                            return Err(err);
                        }
                    }
                }
            }
        })
    }
}

/// Shortest period [`ticks`] will wait between values.
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

/// Counter stream yielding 0, 1, 2, … once per `period`, starting
/// immediately.
///
/// Polled from a scope running on the UI thread, each value is observed
/// on that thread without blocking it between ticks. A zero period is
/// raised to [`MIN_TICK_PERIOD`].
pub fn ticks(period: Duration) -> impl Stream<Item = u64> + Send {
    let mut interval = time::interval(period.max(MIN_TICK_PERIOD));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    stream::unfold((interval, 0u64), |(mut interval, count)| async move {
        interval.tick().await;
        Some((count, (interval, count + 1)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::UiThread;
    use futures_util::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc as std_mpsc;

    #[tokio::test]
    async fn run_after_submits_to_ui_thread() {
        let ui = UiThread::start("timer-ui").unwrap();
        let timer = Timer::new(Handle::current());
        let (tx, rx) = std_mpsc::channel();
        let ui_ref = ui.clone();

        let submitted = timer
            .run_after(
                Arc::new(ui.clone()),
                Duration::from_millis(20),
                Box::new(move || tx.send(ui_ref.is_ui_thread()).unwrap()),
            )
            .await
            .unwrap();

        assert!(submitted.is_ok());
        assert!(rx.recv_timeout(Duration::from_secs(2)).unwrap());
        ui.shutdown();
    }

    #[tokio::test]
    async fn run_after_reports_closed_scheduler() {
        let ui = UiThread::start("timer-closed").unwrap();
        let timer = Timer::new(Handle::current());
        let pending = timer.run_after(Arc::new(ui.clone()), Duration::from_millis(20), Box::new(|| {}));
        ui.shutdown();

        let result = pending.await.unwrap();
        assert!(matches!(result, Err(UiError::SchedulerClosed)));
    }

    #[tokio::test]
    async fn run_repeating_stops_on_cancel() {
        let ui = UiThread::start("timer-repeat").unwrap();
        let timer = Timer::new(Handle::current());
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let cancel = CancellationToken::new();

        let task = timer.run_repeating(
            Arc::new(ui.clone()),
            Duration::from_millis(10),
            cancel.clone(),
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        time::sleep(Duration::from_millis(80)).await;
        cancel.cancel();

        assert!(task.await.unwrap().is_ok());
        ui.shutdown();
        assert!(runs.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn ticks_count_up() {
        let values: Vec<u64> = ticks(Duration::from_millis(5)).take(3).collect().await;
        assert_eq!(values, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn zero_period_ticks_do_not_panic() {
        let values: Vec<u64> = ticks(Duration::ZERO).take(2).collect().await;
        assert_eq!(values, vec![0, 1]);
    }
}
