//! Headless demo applications driven by the `uiflow` binary.

mod browser;
mod ticks;

pub use browser::run_browser;
pub use ticks::run_ticks;
