//! Hot, programmatic event source.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::sequence::{EventSequence, EventSink, ListenerGuard};
use super::DEFAULT_EVENT_BUFFER;
use crate::error::UiError;

struct SubjectInner<E> {
    label: String,
    capacity: usize,
    sinks: Mutex<Vec<(u64, EventSink<E>)>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

/// Multicast source driven by code rather than a widget.
///
/// Events emitted while nobody is subscribed are lost. Each subscription
/// of [`sequence`](EventSubject::sequence) registers one sink and removes it
/// again, following the same pairing rules as widget listeners.
pub struct EventSubject<E> {
    inner: Arc<SubjectInner<E>>,
}

impl<E> Clone for EventSubject<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for EventSubject<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSubject")
            .field("label", &self.inner.label)
            .field("subscribers", &self.inner.sinks.lock().len())
            .finish()
    }
}

impl<E: Clone + Send + 'static> EventSubject<E> {
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_capacity(label, DEFAULT_EVENT_BUFFER)
    }

    pub fn with_capacity(label: impl Into<String>, capacity: usize) -> Self {
        Self {
            inner: Arc::new(SubjectInner {
                label: label.into(),
                capacity,
                sinks: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn sequence(&self) -> EventSequence<E> {
        let inner = Arc::clone(&self.inner);
        EventSequence::new(self.inner.label.clone(), self.inner.capacity, move |sink| {
            let id = inner.next_id.fetch_add(1, Ordering::Relaxed);
            {
                let mut sinks = inner.sinks.lock();
                if inner.closed.load(Ordering::SeqCst) {
                    return Err(UiError::resource_unavailable(inner.label.clone(), "subject"));
                }
                sinks.push((id, sink));
            }
            let detach_inner = Arc::clone(&inner);
            Ok(ListenerGuard::new(move || {
                detach_inner.sinks.lock().retain(|(sink_id, _)| *sink_id != id);
            }))
        })
    }

    /// Deliver to every current subscriber; returns how many there were.
    pub fn emit(&self, event: E) -> usize {
        let sinks: Vec<EventSink<E>> = self
            .inner
            .sinks
            .lock()
            .iter()
            .map(|(_, sink)| sink.clone())
            .collect();
        for sink in &sinks {
            sink.emit(event.clone());
        }
        sinks.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.sinks.lock().len()
    }

    /// Complete every subscription and refuse new ones.
    pub fn close(&self) {
        let sinks = {
            let mut sinks = self.inner.sinks.lock();
            self.inner.closed.store(true, Ordering::SeqCst);
            std::mem::take(&mut *sinks)
        };
        drop(sinks);
    }
}
