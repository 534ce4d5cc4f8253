//! Lifecycle scopes for event pipelines.
//!
//! A [`Scope`] owns every task spawned into it. Cancelling a scope cancels
//! its tasks and its child scopes; a task that fails is logged and recorded
//! while its siblings keep running.
//!
//! ```text
//!   main scope ──┬── listen("go")      (task)
//!                ├── listen("url")     (task)
//!                └── child "dialog" ───── listen("ok")  (task)
//! ```

mod task;
mod window;

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Weak};

use futures_core::Stream;
use futures_util::{FutureExt, StreamExt};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Instrument;
use uuid::Uuid;

use crate::event::EventSequence;

pub use task::{TaskFailure, TaskHandle, TaskState};
pub use window::WindowScope;

use task::TaskRun;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    Active,
    Cancelled,
}

struct ScopeInner {
    id: Uuid,
    name: String,
    handle: Handle,
    token: CancellationToken,
    tracker: TaskTracker,
    cancel_logged: AtomicBool,
    children: Mutex<Vec<Scope>>,
    parent: Option<Weak<ScopeInner>>,
    failures: Arc<Mutex<Vec<TaskFailure>>>,
}

/// Owner of a group of tasks running on one runtime handle.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("state", &self.state())
            .field("tasks", &self.task_count())
            .finish()
    }
}

impl Scope {
    /// Root scope whose tasks run on `handle`.
    pub fn new(name: impl Into<String>, handle: Handle) -> Self {
        Self::build(name.into(), handle, CancellationToken::new(), None)
    }

    fn build(
        name: String,
        handle: Handle,
        token: CancellationToken,
        parent: Option<Weak<ScopeInner>>,
    ) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(scope = %name, %id, "Scope created");
        Self {
            inner: Arc::new(ScopeInner {
                id,
                name,
                handle,
                token,
                tracker: TaskTracker::new(),
                cancel_logged: AtomicBool::new(false),
                children: Mutex::new(Vec::new()),
                parent,
                failures: Arc::new(Mutex::new(Vec::new())),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn handle(&self) -> &Handle {
        &self.inner.handle
    }

    pub fn state(&self) -> ScopeState {
        if self.inner.token.is_cancelled() {
            ScopeState::Cancelled
        } else {
            ScopeState::Active
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Nested scope cancelled together with this one. Cancelling the child
    /// leaves the parent running.
    pub fn child(&self, name: impl Into<String>) -> Scope {
        let child = Self::build(
            name.into(),
            self.inner.handle.clone(),
            self.inner.token.child_token(),
            Some(Arc::downgrade(&self.inner)),
        );
        self.inner.children.lock().push(child.clone());
        child
    }

    /// Spawn a task owned by this scope.
    ///
    /// The task is dropped at its next suspension point once the scope or
    /// the returned handle is cancelled. In a scope that is already
    /// cancelled the body never runs.
    pub fn spawn<F>(&self, name: impl Into<String>, task: F) -> TaskHandle
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let name: String = name.into();
        let name: Arc<str> = name.into();
        let cancel = self.inner.token.child_token();
        let state = Arc::new(AtomicU8::new(TaskState::Active as u8));
        let run = TaskRun {
            scope: self.inner.name.clone(),
            task: Arc::clone(&name),
            state: Arc::clone(&state),
            failures: Arc::clone(&self.inner.failures),
        };

        let token = cancel.clone();
        let span = tracing::debug_span!("task", scope = %self.inner.name, task = %name);
        let join = self.inner.tracker.spawn_on(
            async move {
                let outcome = tokio::select! {
                    biased;
                    _ = token.cancelled() => None,
                    result = AssertUnwindSafe(task).catch_unwind() => Some(result),
                };
                run.finish(outcome);
            }
            .instrument(span),
            &self.inner.handle,
        );

        TaskHandle {
            name,
            state,
            cancel,
            join,
        }
    }

    /// Subscribe to `sequence` inside a new task and feed every event to
    /// `on_each`. An error from `on_each` ends the pipeline and detaches
    /// its listener.
    pub fn listen<E, F>(&self, name: &str, sequence: EventSequence<E>, mut on_each: F) -> TaskHandle
    where
        E: Send + 'static,
        F: FnMut(E) -> anyhow::Result<()> + Send + 'static,
    {
        self.spawn(listener_name::<E>(name), async move {
            let mut subscription = sequence.subscribe()?;
            while let Some(event) = subscription.next_event().await {
                on_each(event)?;
            }
            Ok::<(), anyhow::Error>(())
        })
    }

    /// Like [`listen`](Scope::listen) with an async consumer. The next event
    /// is not taken until the previous one is handled.
    pub fn listen_with<E, F, Fut>(
        &self,
        name: &str,
        sequence: EventSequence<E>,
        mut on_each: F,
    ) -> TaskHandle
    where
        E: Send + 'static,
        F: FnMut(E) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.spawn(listener_name::<E>(name), async move {
            let mut subscription = sequence.subscribe()?;
            while let Some(event) = subscription.next_event().await {
                on_each(event).await?;
            }
            Ok::<(), anyhow::Error>(())
        })
    }

    /// Drive any stream to completion under this scope.
    pub fn listen_stream<S, F>(&self, name: &str, stream: S, mut on_each: F) -> TaskHandle
    where
        S: Stream + Send + 'static,
        S::Item: Send,
        F: FnMut(S::Item) -> anyhow::Result<()> + Send + 'static,
    {
        self.spawn(listener_name::<S::Item>(name), async move {
            let mut stream = std::pin::pin!(stream);
            while let Some(item) = stream.next().await {
                on_each(item)?;
            }
            Ok::<(), anyhow::Error>(())
        })
    }

    /// Cancel every task and child scope. Idempotent.
    pub fn cancel(&self) {
        if self.inner.cancel_logged.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!(
            scope = %self.inner.name,
            tasks = self.inner.tracker.len(),
            "Scope cancelled"
        );
        self.inner.token.cancel();
    }

    /// Cancel, then wait until every task of this scope and its
    /// descendants has ended.
    ///
    /// Must not be awaited from a task owned by this scope.
    pub async fn close(&self) {
        self.cancel();

        let mut pending = vec![self.clone()];
        let mut closing = Vec::new();
        while let Some(scope) = pending.pop() {
            pending.extend(scope.inner.children.lock().drain(..));
            closing.push(scope);
        }
        for scope in closing.iter().rev() {
            scope.inner.tracker.close();
            scope.inner.tracker.wait().await;
        }

        if let Some(parent) = self.inner.parent.as_ref().and_then(Weak::upgrade) {
            parent
                .children
                .lock()
                .retain(|child| child.inner.id != self.inner.id);
        }
        tracing::debug!(scope = %self.inner.name, "Scope closed");
    }

    /// Failures recorded by tasks of this scope, oldest first.
    pub fn failures(&self) -> Vec<TaskFailure> {
        self.inner.failures.lock().clone()
    }

    /// Tasks of this scope that have not ended yet.
    pub fn task_count(&self) -> usize {
        self.inner.tracker.len()
    }
}

fn listener_name<E>(name: &str) -> String {
    format!("listen-{}[{}]", name, std::any::type_name::<E>())
}
