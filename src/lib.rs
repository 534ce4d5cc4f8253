//! Reactive event binding for retained-mode GUI toolkits.
//!
//! Widget listeners are bridged into cancellable [`event::EventSequence`]s,
//! subscriptions are owned by a per-window [`scope::Scope`], and widget
//! mutation is marshalled onto the toolkit's dispatch thread through
//! [`scheduler::UiScheduler`].

pub mod config;
pub mod demo;
pub mod error;
pub mod event;
pub mod logging;
pub mod presenter;
pub mod scheduler;
pub mod scope;
pub mod toolkit;

pub use error::UiError;
