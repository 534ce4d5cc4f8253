//! Bridges widget listener registration into [`EventSequence`]s.

use std::sync::Arc;

use super::action::Action;
use super::sequence::{EventSequence, EventSink, ListenerGuard};
use super::DEFAULT_EVENT_BUFFER;
use crate::config::EventsConfig;
use crate::error::UiError;
use crate::toolkit::{
    ActionEvent, DocumentEvent, FocusEvent, FocusEventKind, ListenerKind, MouseEvent,
    MouseEventKind, NativeEvent, Widget,
};

/// Creates widget event sequences.
///
/// Constructed explicitly and passed to whoever builds views; it carries
/// the per-subscription buffer size and nothing else.
#[derive(Debug, Clone, Copy)]
pub struct EventAdapter {
    capacity: usize,
}

impl Default for EventAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER)
    }
}

impl EventAdapter {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
        }
    }

    pub fn from_config(config: &EventsConfig) -> Self {
        Self::new(config.buffer_capacity)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Wrap an arbitrary attach operation into a sequence.
    pub fn to_sequence<E, F>(&self, label: &str, attach: F) -> EventSequence<E>
    where
        E: Send + 'static,
        F: Fn(EventSink<E>) -> Result<ListenerGuard, UiError> + Send + Sync + 'static,
    {
        EventSequence::new(label, self.capacity, attach)
    }

    /// Register one native listener per kind in `kinds`, forwarding the
    /// events `project` accepts. All registrations share one guard.
    fn listen_widget<E>(
        &self,
        widget: &Widget,
        kinds: &'static [ListenerKind],
        project: fn(&Widget, &NativeEvent) -> Option<E>,
    ) -> EventSequence<E>
    where
        E: Send + 'static,
    {
        let widget = widget.clone();
        let label = format!(
            "{}:{}",
            widget.name(),
            kinds.first().map(|kind| kind.as_str()).unwrap_or("none")
        );
        self.to_sequence(&label, move |sink| {
            let mut guard: Option<ListenerGuard> = None;
            for kind in kinds {
                let target = widget.clone();
                let kind_sink = sink.clone();
                let callback = Arc::new(move |event: &NativeEvent| {
                    if let Some(value) = project(&target, event) {
                        kind_sink.emit(value);
                    }
                });
                // An early return drops `guard`, detaching the kinds attached so far.
                let id = widget
                    .add_listener(*kind, callback)
                    .map_err(|_| UiError::resource_unavailable(widget.name(), kind.as_str()))?;
                let owner = widget.clone();
                let registration = ListenerGuard::new(move || {
                    owner.remove_listener(id);
                });
                guard = Some(match guard {
                    Some(previous) => previous.join(registration),
                    None => registration,
                });
            }
            Ok(guard.unwrap_or_else(|| ListenerGuard::new(|| {})))
        })
    }

    /// Every mouse event, including motion.
    pub fn mouse_events(&self, widget: &Widget) -> EventSequence<MouseEvent> {
        self.listen_widget(
            widget,
            &[ListenerKind::Mouse, ListenerKind::MouseMotion],
            |_, event| match event {
                NativeEvent::Mouse(mouse) => Some(*mouse),
                _ => None,
            },
        )
    }

    fn mouse_of_kind(&self, widget: &Widget, kind: MouseEventKind) -> EventSequence<MouseEvent> {
        self.mouse_events(widget)
            .filter(move |event| event.kind == kind)
    }

    pub fn mouse_moves(&self, widget: &Widget) -> EventSequence<MouseEvent> {
        self.mouse_of_kind(widget, MouseEventKind::Moved)
    }

    pub fn mouse_clicks(&self, widget: &Widget) -> EventSequence<MouseEvent> {
        self.mouse_of_kind(widget, MouseEventKind::Clicked)
    }

    pub fn mouse_drags(&self, widget: &Widget) -> EventSequence<MouseEvent> {
        self.mouse_of_kind(widget, MouseEventKind::Dragged)
    }

    pub fn mouse_presses(&self, widget: &Widget) -> EventSequence<MouseEvent> {
        self.mouse_of_kind(widget, MouseEventKind::Pressed)
    }

    pub fn mouse_releases(&self, widget: &Widget) -> EventSequence<MouseEvent> {
        self.mouse_of_kind(widget, MouseEventKind::Released)
    }

    pub fn mouse_enters(&self, widget: &Widget) -> EventSequence<MouseEvent> {
        self.mouse_of_kind(widget, MouseEventKind::Entered)
    }

    pub fn mouse_exits(&self, widget: &Widget) -> EventSequence<MouseEvent> {
        self.mouse_of_kind(widget, MouseEventKind::Exited)
    }

    pub fn focus_events(&self, widget: &Widget) -> EventSequence<FocusEvent> {
        self.listen_widget(widget, &[ListenerKind::Focus], |_, event| match event {
            NativeEvent::Focus(focus) => Some(*focus),
            _ => None,
        })
    }

    pub fn focus_gains(&self, widget: &Widget) -> EventSequence<FocusEvent> {
        self.focus_events(widget)
            .filter(|event| event.kind == FocusEventKind::Gained)
    }

    pub fn focus_losses(&self, widget: &Widget) -> EventSequence<FocusEvent> {
        self.focus_events(widget)
            .filter(|event| event.kind == FocusEventKind::Lost)
    }

    /// Button presses, or Enter in a text field.
    pub fn action_events(&self, widget: &Widget) -> EventSequence<ActionEvent> {
        self.listen_widget(widget, &[ListenerKind::Action], |_, event| match event {
            NativeEvent::Action(action) => Some(action.clone()),
            _ => None,
        })
    }

    pub fn actions(&self, widget: &Widget) -> EventSequence<Action> {
        self.action_events(widget).as_actions()
    }

    pub fn document_changes(&self, widget: &Widget) -> EventSequence<DocumentEvent> {
        self.listen_widget(widget, &[ListenerKind::Document], |_, event| match event {
            NativeEvent::Document(document) => Some(*document),
            _ => None,
        })
    }

    /// The component's full text after every document change.
    pub fn text_changes(&self, widget: &Widget) -> EventSequence<String> {
        self.listen_widget(widget, &[ListenerKind::Document], |target, event| match event {
            NativeEvent::Document(_) => Some(target.text()),
            _ => None,
        })
    }
}
