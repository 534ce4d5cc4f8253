//! Dedicated UI dispatch thread.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use parking_lot::Mutex;
use tokio::runtime::{Builder, Handle};
use tokio::sync::mpsc;

use super::{Job, UiScheduler};
use crate::error::UiError;

struct UiThreadInner {
    name: String,
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    handle: Handle,
    thread_id: ThreadId,
    join: Mutex<Option<JoinHandle<()>>>,
}

/// A named OS thread driving a single-threaded tokio runtime.
///
/// Submitted jobs run on this thread in FIFO order. Futures spawned on
/// [`UiThread::handle`] are driven by the same thread, so scope tasks
/// built on it never race widget mutation.
#[derive(Clone)]
pub struct UiThread {
    inner: Arc<UiThreadInner>,
}

impl UiThread {
    /// Start the dispatch thread.
    ///
    /// # Errors
    /// Returns [`UiError::ThreadSpawn`] if the runtime or the OS thread
    /// cannot be created.
    pub fn start(name: &str) -> Result<Self, UiError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(UiError::ThreadSpawn)?;
        let handle = runtime.handle().clone();
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        let thread_name = name.to_string();
        let join = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                let job_thread = thread_name.clone();
                scopeguard::defer! {
                    tracing::debug!(thread = %thread_name, "UI thread stopped");
                }
                runtime.block_on(async move {
                    while let Some(job) = receiver.recv().await {
                        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                            tracing::error!(thread = %job_thread, "UI job panicked");
                        }
                        // Let scope tasks woken by the job run before the next one.
                        tokio::task::yield_now().await;
                    }
                });
            })
            .map_err(UiError::ThreadSpawn)?;

        tracing::debug!(thread = %name, "UI thread started");
        Ok(Self {
            inner: Arc::new(UiThreadInner {
                name: name.to_string(),
                sender: Mutex::new(Some(sender)),
                handle,
                thread_id: join.thread().id(),
                join: Mutex::new(Some(join)),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Runtime handle whose tasks execute on the UI thread.
    pub fn handle(&self) -> &Handle {
        &self.inner.handle
    }

    pub fn is_closed(&self) -> bool {
        self.inner.sender.lock().is_none()
    }

    /// Stop accepting work and let the thread finish its queue.
    ///
    /// Blocks until the thread exits unless called from the UI thread
    /// itself. Idempotent.
    pub fn shutdown(&self) {
        let sender = self.inner.sender.lock().take();
        if sender.is_none() {
            return;
        }
        drop(sender);
        tracing::info!(thread = %self.inner.name, "UI thread shutting down");
        if !self.is_ui_thread() {
            self.join();
        }
    }

    /// Block until the UI thread exits. Returns immediately on the UI thread.
    pub fn join(&self) {
        if self.is_ui_thread() {
            return;
        }
        let join = self.inner.join.lock().take();
        if let Some(join) = join {
            if join.join().is_err() {
                tracing::error!(thread = %self.inner.name, "UI thread panicked");
            }
        }
    }
}

impl UiScheduler for UiThread {
    fn run_on_ui_thread(&self, job: Job) -> Result<(), UiError> {
        let sender = self.inner.sender.lock();
        match sender.as_ref() {
            Some(sender) => sender.send(job).map_err(|_| UiError::SchedulerClosed),
            None => Err(UiError::SchedulerClosed),
        }
    }

    fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.inner.thread_id
    }
}
