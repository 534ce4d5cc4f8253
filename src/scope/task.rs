//! Tasks owned by a [`Scope`](super::Scope).

use std::any::Any;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskState {
    Active = 0,
    Completed = 1,
    Cancelled = 2,
    Failed = 3,
}

impl TaskState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => TaskState::Active,
            1 => TaskState::Completed,
            2 => TaskState::Cancelled,
            _ => TaskState::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskState::Active)
    }
}

/// A pipeline that ended with an error, as recorded on its scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub scope: String,
    pub task: String,
    pub error: String,
}

/// Outcome of running a task body: `None` when cancelled first.
pub(crate) type TaskOutcome = Option<Result<anyhow::Result<()>, Box<dyn Any + Send>>>;

/// Bookkeeping moved into the spawned future; records how the task ended.
pub(crate) struct TaskRun {
    pub(crate) scope: String,
    pub(crate) task: Arc<str>,
    pub(crate) state: Arc<AtomicU8>,
    pub(crate) failures: Arc<Mutex<Vec<TaskFailure>>>,
}

impl TaskRun {
    pub(crate) fn finish(self, outcome: TaskOutcome) {
        let state = match outcome {
            None => {
                tracing::debug!(scope = %self.scope, task = %self.task, "Task cancelled");
                TaskState::Cancelled
            }
            Some(Ok(Ok(()))) => {
                tracing::debug!(scope = %self.scope, task = %self.task, "Task completed");
                TaskState::Completed
            }
            Some(Ok(Err(err))) => {
                let error = format!("{:#}", err);
                tracing::error!(scope = %self.scope, task = %self.task, error = %error, "Task failed");
                self.record(error);
                TaskState::Failed
            }
            Some(Err(panic)) => {
                let error = panic_message(panic.as_ref());
                tracing::error!(scope = %self.scope, task = %self.task, error = %error, "Task panicked");
                self.record(error);
                TaskState::Failed
            }
        };
        self.state.store(state as u8, Ordering::SeqCst);
    }

    fn record(&self, error: String) {
        self.failures.lock().push(TaskFailure {
            scope: self.scope.clone(),
            task: self.task.to_string(),
            error,
        });
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}

/// Handle to a task spawned in a scope.
///
/// Dropping the handle does not cancel the task; the scope owns it.
pub struct TaskHandle {
    pub(crate) name: Arc<str>,
    pub(crate) state: Arc<AtomicU8>,
    pub(crate) cancel: CancellationToken,
    pub(crate) join: JoinHandle<()>,
}

impl TaskHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Cancel only this task; the scope and its siblings keep running.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the task to end and return its terminal state.
    pub async fn join(self) -> TaskState {
        let state = Arc::clone(&self.state);
        if let Err(err) = self.join.await {
            // The runtime dropped the task before it reported back.
            tracing::debug!(task = %self.name, error = %err, "Task aborted by runtime");
            state.store(TaskState::Cancelled as u8, Ordering::SeqCst);
        }
        TaskState::from_u8(state.load(Ordering::SeqCst))
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}
