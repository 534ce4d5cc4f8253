//! Errors raised by the event bridge, scopes and the UI-thread scheduler.

use thiserror::Error;

/// Adapter- and scheduler-level failures.
///
/// These are unexpected at runtime: they terminate the affected
/// subscription or task and surface on the owning scope.
#[derive(Debug, Error)]
pub enum UiError {
    /// A listener could not be attached because its source is gone.
    #[error("Cannot attach {listener} listener to '{widget}': resource unavailable")]
    ResourceUnavailable { widget: String, listener: String },

    /// Work was submitted after the UI thread shut down.
    #[error("UI thread scheduler is closed")]
    SchedulerClosed,

    /// The UI dispatch thread or its runtime could not be started.
    #[error("Failed to start UI thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),
}

impl UiError {
    pub fn resource_unavailable(widget: impl Into<String>, listener: impl Into<String>) -> Self {
        UiError::ResourceUnavailable {
            widget: widget.into(),
            listener: listener.into(),
        }
    }

    /// Short identifier for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UiError::ResourceUnavailable { .. } => "resource_unavailable",
            UiError::SchedulerClosed => "scheduler_closed",
            UiError::ThreadSpawn(_) => "thread_spawn",
        }
    }
}
