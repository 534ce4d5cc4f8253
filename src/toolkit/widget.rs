//! In-memory widget with listener registration and settable properties.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::event::{
    ActionEvent, DocumentEvent, DocumentEventKind, FocusEvent, FocusEventKind, ListenerKind,
    MouseEvent, MouseEventKind, NativeEvent,
};
use super::ToolkitError;

/// Callback invoked for every native event of the registered kind.
pub type ListenerFn = Arc<dyn Fn(&NativeEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Panel,
    Button,
    Label,
    TextField,
    TextArea,
    CheckBox,
    RadioButton,
}

impl WidgetKind {
    pub fn is_text_component(&self) -> bool {
        matches!(self, WidgetKind::TextField | WidgetKind::TextArea)
    }

    fn fires_actions(&self) -> bool {
        matches!(
            self,
            WidgetKind::Button | WidgetKind::TextField | WidgetKind::CheckBox | WidgetKind::RadioButton
        )
    }
}

struct Registration {
    id: ListenerId,
    kind: ListenerKind,
    callback: ListenerFn,
}

struct WidgetState {
    text: String,
    enabled: bool,
    visible: bool,
    selected: bool,
    children: Vec<Widget>,
}

struct WidgetInner {
    name: String,
    kind: WidgetKind,
    state: Mutex<WidgetState>,
    listeners: Mutex<Vec<Registration>>,
    next_listener: AtomicU64,
    stale_removals: AtomicU64,
    disposed: AtomicBool,
}

/// Handle to a widget; clones refer to the same component.
#[derive(Clone)]
pub struct Widget {
    inner: Arc<WidgetInner>,
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("name", &self.inner.name)
            .field("kind", &self.inner.kind)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Widget {
    pub fn new(kind: WidgetKind, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(WidgetInner {
                name: name.into(),
                kind,
                state: Mutex::new(WidgetState {
                    text: text.into(),
                    enabled: true,
                    visible: true,
                    selected: false,
                    children: Vec::new(),
                }),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
                stale_removals: AtomicU64::new(0),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    pub fn panel(name: impl Into<String>) -> Self {
        Self::new(WidgetKind::Panel, name, "")
    }

    pub fn button(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(WidgetKind::Button, name, label)
    }

    pub fn label(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(WidgetKind::Label, name, text)
    }

    pub fn text_field(name: impl Into<String>) -> Self {
        Self::new(WidgetKind::TextField, name, "")
    }

    pub fn text_area(name: impl Into<String>) -> Self {
        Self::new(WidgetKind::TextArea, name, "")
    }

    pub fn check_box(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(WidgetKind::CheckBox, name, label)
    }

    pub fn radio_button(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(WidgetKind::RadioButton, name, label)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn kind(&self) -> WidgetKind {
        self.inner.kind
    }

    pub fn text(&self) -> String {
        self.inner.state.lock().text.clone()
    }

    /// Replace the text.
    ///
    /// Text components model a document: the old content is removed and
    /// the new content inserted, each step firing a document event.
    pub fn set_text(&self, text: &str) {
        if !self.inner.kind.is_text_component() {
            self.inner.state.lock().text = text.to_string();
            return;
        }

        let removed = {
            let mut state = self.inner.state.lock();
            std::mem::take(&mut state.text).len()
        };
        if removed > 0 {
            self.fire(NativeEvent::Document(DocumentEvent {
                kind: DocumentEventKind::Remove,
                offset: 0,
                length: removed,
            }));
        }

        if !text.is_empty() {
            self.inner.state.lock().text = text.to_string();
            self.fire(NativeEvent::Document(DocumentEvent {
                kind: DocumentEventKind::Insert,
                offset: 0,
                length: text.len(),
            }));
        }
    }

    /// Append text as if typed, firing one insert event.
    pub fn type_text(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        let offset = {
            let mut state = self.inner.state.lock();
            let offset = state.text.len();
            state.text.push_str(text);
            offset
        };
        if self.inner.kind.is_text_component() {
            self.fire(NativeEvent::Document(DocumentEvent {
                kind: DocumentEventKind::Insert,
                offset,
                length: text.len(),
            }));
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.state.lock().enabled
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.inner.state.lock().enabled = enabled;
    }

    pub fn is_visible(&self) -> bool {
        self.inner.state.lock().visible
    }

    pub fn set_visible(&self, visible: bool) {
        self.inner.state.lock().visible = visible;
    }

    pub fn is_selected(&self) -> bool {
        self.inner.state.lock().selected
    }

    pub fn add(&self, child: Widget) {
        self.inner.state.lock().children.push(child);
    }

    pub fn children(&self) -> Vec<Widget> {
        self.inner.state.lock().children.clone()
    }

    /// Register a listener for one event category.
    ///
    /// # Errors
    /// Returns [`ToolkitError::Disposed`] once the widget has been disposed.
    pub fn add_listener(
        &self,
        kind: ListenerKind,
        callback: ListenerFn,
    ) -> Result<ListenerId, ToolkitError> {
        let mut listeners = self.inner.listeners.lock();
        // Checked under the listener lock so dispose cannot race a registration.
        if self.is_disposed() {
            return Err(ToolkitError::Disposed {
                widget: self.inner.name.clone(),
            });
        }
        let id = ListenerId(self.inner.next_listener.fetch_add(1, Ordering::Relaxed));
        listeners.push(Registration { id, kind, callback });
        Ok(id)
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.lock();
        let before = listeners.len();
        listeners.retain(|registration| registration.id != id);
        let removed = listeners.len() != before;
        if !removed {
            self.inner.stale_removals.fetch_add(1, Ordering::Relaxed);
        }
        removed
    }

    /// How many removals named a listener that was no longer registered.
    pub fn stale_removals(&self) -> u64 {
        self.inner.stale_removals.load(Ordering::Relaxed)
    }

    pub fn listener_count(&self, kind: ListenerKind) -> usize {
        self.inner
            .listeners
            .lock()
            .iter()
            .filter(|registration| registration.kind == kind)
            .count()
    }

    /// Deliver a native event to every listener of its category.
    ///
    /// Callbacks run outside the listener lock, so a callback may remove
    /// listeners (including itself) while being dispatched.
    pub fn fire(&self, event: NativeEvent) {
        if self.is_disposed() {
            return;
        }
        let kind = event.listener_kind();
        let targets: Vec<ListenerFn> = self
            .inner
            .listeners
            .lock()
            .iter()
            .filter(|registration| registration.kind == kind)
            .map(|registration| Arc::clone(&registration.callback))
            .collect();
        for callback in targets {
            callback(&event);
        }
    }

    /// Press the widget: fires an action event when enabled.
    pub fn click(&self) {
        if !self.inner.kind.fires_actions() || !self.is_enabled() {
            return;
        }
        let command = {
            let mut state = self.inner.state.lock();
            if matches!(self.inner.kind, WidgetKind::CheckBox | WidgetKind::RadioButton) {
                state.selected = !state.selected;
            }
            state.text.clone()
        };
        self.fire(NativeEvent::Action(ActionEvent { command }));
    }

    pub fn mouse(&self, kind: MouseEventKind, x: i32, y: i32) {
        self.fire(NativeEvent::Mouse(MouseEvent::new(kind, x, y)));
    }

    pub fn focus(&self, kind: FocusEventKind) {
        self.fire(NativeEvent::Focus(FocusEvent { kind }));
    }

    /// Release the widget. Registered listeners are dropped and further
    /// registrations fail.
    pub fn dispose(&self) {
        let removed = {
            let mut listeners = self.inner.listeners.lock();
            self.inner.disposed.store(true, Ordering::SeqCst);
            std::mem::take(&mut *listeners)
        };
        drop(removed);
        let children = std::mem::take(&mut self.inner.state.lock().children);
        for child in children {
            child.dispose();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }
}
