//! Cold event sequences, their subscriptions and the listener guard that
//! pairs every attach with exactly one detach.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};

use super::action::{Action, ACTION};
use crate::error::UiError;

/// Push side of a subscription, handed to the native listener.
pub struct EventSink<E> {
    deliver: Arc<dyn Fn(E) + Send + Sync>,
}

impl<E> Clone for EventSink<E> {
    fn clone(&self) -> Self {
        Self {
            deliver: Arc::clone(&self.deliver),
        }
    }
}

impl<E: 'static> EventSink<E> {
    pub fn new(deliver: impl Fn(E) + Send + Sync + 'static) -> Self {
        Self {
            deliver: Arc::new(deliver),
        }
    }

    /// Forward one event. Never blocks.
    pub fn emit(&self, event: E) {
        (self.deliver)(event)
    }
}

type DetachFn = Box<dyn FnOnce() + Send>;

/// Owns the detach half of a native listener registration.
///
/// The detach closure runs at most once: on [`ListenerGuard::detach`] or on
/// drop, from whichever thread gets there first.
pub struct ListenerGuard {
    detach: Mutex<Option<DetachFn>>,
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("detached", &self.is_detached())
            .finish()
    }
}

impl ListenerGuard {
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Mutex::new(Some(Box::new(detach))),
        }
    }

    /// Run the detach closure. Returns `false` if it already ran.
    pub fn detach(&self) -> bool {
        let detach = self.detach.lock().take();
        match detach {
            Some(detach) => {
                detach();
                true
            }
            None => false,
        }
    }

    pub fn is_detached(&self) -> bool {
        self.detach.lock().is_none()
    }

    /// Combine two registrations into one guard; `self` detaches first.
    pub fn join(self, other: ListenerGuard) -> ListenerGuard {
        ListenerGuard::new(move || {
            self.detach();
            other.detach();
        })
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.detach();
    }
}

type AttachFn<E> = dyn Fn(EventSink<E>) -> Result<ListenerGuard, UiError> + Send + Sync;

/// A cold, cloneable description of an event source.
///
/// Each [`subscribe`](EventSequence::subscribe) attaches a fresh native
/// listener; nothing is registered until then.
pub struct EventSequence<E> {
    attach: Arc<AttachFn<E>>,
    capacity: usize,
    label: Arc<str>,
}

impl<E> Clone for EventSequence<E> {
    fn clone(&self) -> Self {
        Self {
            attach: Arc::clone(&self.attach),
            capacity: self.capacity,
            label: Arc::clone(&self.label),
        }
    }
}

impl<E> fmt::Debug for EventSequence<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSequence")
            .field("label", &self.label)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<E: Send + 'static> EventSequence<E> {
    /// Build a sequence from an attach operation.
    ///
    /// `attach` registers a listener forwarding into the given sink and
    /// returns the guard that removes it again.
    pub fn new<F>(label: impl Into<Arc<str>>, capacity: usize, attach: F) -> Self
    where
        F: Fn(EventSink<E>) -> Result<ListenerGuard, UiError> + Send + Sync + 'static,
    {
        Self {
            attach: Arc::new(attach),
            capacity: capacity.max(1),
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Attach a raw sink without a buffered subscription.
    pub fn attach(&self, sink: EventSink<E>) -> Result<ListenerGuard, UiError> {
        (self.attach)(sink)
    }

    /// Start a subscription.
    ///
    /// # Errors
    /// Returns [`UiError::ResourceUnavailable`] when the source can no
    /// longer accept listeners. Nothing stays attached in that case.
    pub fn subscribe(&self) -> Result<Subscription<E>, UiError> {
        let (sender, receiver) = mpsc::channel(self.capacity);
        let label = Arc::clone(&self.label);
        let sink = EventSink::new(move |event| match sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(sequence = %label, "Event buffer full, dropping event");
            }
            Err(TrySendError::Closed(_)) => {}
        });

        let guard = self.attach(sink).map_err(|err| {
            tracing::debug!(sequence = %self.label, error = %err, "Listener attach failed");
            err
        })?;
        tracing::trace!(sequence = %self.label, "Listener attached");

        Ok(Subscription {
            receiver,
            guard: Some(guard),
            label: Arc::clone(&self.label),
        })
    }

    fn derive<U, W>(self, operator: &str, wrap: W) -> EventSequence<U>
    where
        W: Fn(EventSink<U>) -> EventSink<E> + Send + Sync + 'static,
    {
        let upstream = self.attach;
        EventSequence {
            attach: Arc::new(move |sink| upstream(wrap(sink))),
            capacity: self.capacity,
            label: format!("{}.{}", self.label, operator).into(),
        }
    }

    /// Keep only events matching `predicate`.
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        self.derive("filter", move |sink: EventSink<E>| {
            let predicate = Arc::clone(&predicate);
            EventSink::new(move |event: E| {
                if predicate(&event) {
                    sink.emit(event);
                }
            })
        })
    }

    pub fn map<U, F>(self, transform: F) -> EventSequence<U>
    where
        U: Send + 'static,
        F: Fn(E) -> U + Send + Sync + 'static,
    {
        let transform = Arc::new(transform);
        self.derive("map", move |sink: EventSink<U>| {
            let transform = Arc::clone(&transform);
            EventSink::new(move |event: E| sink.emit(transform(event)))
        })
    }

    pub fn filter_map<U, F>(self, transform: F) -> EventSequence<U>
    where
        U: Send + 'static,
        F: Fn(E) -> Option<U> + Send + Sync + 'static,
    {
        let transform = Arc::new(transform);
        self.derive("filter_map", move |sink: EventSink<U>| {
            let transform = Arc::clone(&transform);
            EventSink::new(move |event: E| {
                if let Some(mapped) = transform(event) {
                    sink.emit(mapped);
                }
            })
        })
    }

    /// Forget the payload; every event becomes [`ACTION`].
    pub fn as_actions(self) -> EventSequence<Action> {
        self.map(|_| ACTION)
    }

    /// Interleave two sources into one subscription in firing order.
    ///
    /// Both upstream listeners attach on subscribe; if the second attach
    /// fails the first one is detached before the error is returned.
    pub fn merge(self, other: EventSequence<E>) -> Self {
        let first = self.attach;
        let second = other.attach;
        EventSequence {
            attach: Arc::new(move |sink: EventSink<E>| {
                let first_guard = first(sink.clone())?;
                let second_guard = second(sink)?;
                Ok(first_guard.join(second_guard))
            }),
            capacity: self.capacity.max(other.capacity),
            label: format!("merge({}, {})", self.label, other.label).into(),
        }
    }
}

/// A live subscription; an async [`Stream`] of events.
///
/// The native listener is detached when the subscription is cancelled,
/// dropped, or when its source completes.
pub struct Subscription<E> {
    receiver: mpsc::Receiver<E>,
    guard: Option<ListenerGuard>,
    label: Arc<str>,
}

impl<E> Subscription<E> {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Wait for the next event. `None` once the source has completed or
    /// the subscription was cancelled and drained.
    pub async fn next_event(&mut self) -> Option<E> {
        let event = self.receiver.recv().await;
        if event.is_none() {
            self.release();
        }
        event
    }

    /// Take a buffered event without waiting.
    pub fn try_next_event(&mut self) -> Option<E> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.release();
                None
            }
        }
    }

    /// Detach the listener. Idempotent.
    pub fn cancel(&mut self) {
        self.receiver.close();
        self.release();
    }

    pub fn is_active(&self) -> bool {
        self.guard.is_some()
    }

    fn release(&mut self) {
        if let Some(guard) = self.guard.take() {
            guard.detach();
            tracing::trace!(sequence = %self.label, "Listener detached");
        }
    }
}

impl<E> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("label", &self.label)
            .field("active", &self.is_active())
            .finish()
    }
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<E> Stream for Subscription<E> {
    type Item = E;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<E>> {
        let this = self.get_mut();
        match this.receiver.poll_recv(cx) {
            Poll::Ready(None) => {
                this.release();
                Poll::Ready(None)
            }
            other => other,
        }
    }
}
