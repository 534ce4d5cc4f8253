//! Native event payloads delivered to widget listeners.

/// Listener categories a widget accepts registrations for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Mouse,
    MouseMotion,
    Focus,
    Action,
    Document,
}

impl ListenerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListenerKind::Mouse => "mouse",
            ListenerKind::MouseMotion => "mouse-motion",
            ListenerKind::Focus => "focus",
            ListenerKind::Action => "action",
            ListenerKind::Document => "document",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Clicked,
    Pressed,
    Released,
    Entered,
    Exited,
    Moved,
    Dragged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub x: i32,
    pub y: i32,
}

impl MouseEvent {
    pub fn new(kind: MouseEventKind, x: i32, y: i32) -> Self {
        Self { kind, x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusEventKind {
    Gained,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusEvent {
    pub kind: FocusEventKind,
}

/// Discrete trigger such as a button press or Enter in a text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEvent {
    pub command: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEventKind {
    Insert,
    Remove,
    Change,
}

/// Change to the text model behind a text component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentEvent {
    pub kind: DocumentEventKind,
    pub offset: usize,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEvent {
    Mouse(MouseEvent),
    Focus(FocusEvent),
    Action(ActionEvent),
    Document(DocumentEvent),
}

impl NativeEvent {
    /// Listener category that receives this event.
    ///
    /// Moves and drags go to motion listeners; every other mouse event goes
    /// to plain mouse listeners.
    pub fn listener_kind(&self) -> ListenerKind {
        match self {
            NativeEvent::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Moved | MouseEventKind::Dragged => ListenerKind::MouseMotion,
                _ => ListenerKind::Mouse,
            },
            NativeEvent::Focus(_) => ListenerKind::Focus,
            NativeEvent::Action(_) => ListenerKind::Action,
            NativeEvent::Document(_) => ListenerKind::Document,
        }
    }
}
