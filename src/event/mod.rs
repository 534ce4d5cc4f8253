//! Event sequences bridged from push-style widget listeners.
//!
//! # Lifecycle
//!
//! ```text
//! EventSequence ──subscribe()──→ attach listener ──→ Subscription (Stream)
//!                                                        │
//!                    detach listener (exactly once) ←────┘ cancel / drop / end
//! ```
//!
//! Sequences are cold: every subscription performs its own registration.
//! Derived operators wrap the sink and never register listeners themselves.

mod action;
mod adapter;
mod sequence;
mod subject;

pub use action::{Action, ACTION};
pub use adapter::EventAdapter;
pub use sequence::{EventSequence, EventSink, ListenerGuard, Subscription};
pub use subject::EventSubject;

/// Per-subscription buffer used when no configuration is supplied.
pub const DEFAULT_EVENT_BUFFER: usize = 64;
