//! Marshalling work onto the toolkit's dispatch thread.
//!
//! [`UiScheduler`] is the single-purpose "submit to the UI thread"
//! primitive. Delays and periodic work are composed on top of it by
//! [`Timer`], never built into the scheduler.

mod timer;
mod ui_thread;

pub use timer::{ticks, Timer, MIN_TICK_PERIOD};
pub use ui_thread::UiThread;

use crate::error::UiError;

/// Unit of work executed on the UI thread.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

pub trait UiScheduler: Send + Sync {
    /// Queue `job` for the UI thread.
    ///
    /// Never runs `job` synchronously, even when called from the UI
    /// thread. Jobs submitted from one thread run in submission order.
    ///
    /// # Errors
    /// Returns [`UiError::SchedulerClosed`] once the UI thread has shut down.
    fn run_on_ui_thread(&self, job: Job) -> Result<(), UiError>;

    /// Whether the caller is running on the UI thread.
    fn is_ui_thread(&self) -> bool;

    /// Convenience wrapper boxing the closure.
    fn run<F>(&self, job: F) -> Result<(), UiError>
    where
        F: FnOnce() + Send + 'static,
        Self: Sized,
    {
        self.run_on_ui_thread(Box::new(job))
    }
}
