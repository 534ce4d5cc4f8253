//! Headless stand-in for the GUI toolkit.
//!
//! Implements just the widget and window contracts the event bridge
//! consumes: listener registration, settable properties, a one-shot close
//! signal and disposal. Rendering and layout are not modelled.

pub mod event;
pub mod widget;
pub mod window;

use thiserror::Error;

pub use event::{
    ActionEvent, DocumentEvent, DocumentEventKind, FocusEvent, FocusEventKind, ListenerKind,
    MouseEvent, MouseEventKind, NativeEvent,
};
pub use widget::{ListenerFn, ListenerId, Widget, WidgetKind};
pub use window::{Window, WindowKind};

#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error("Widget '{widget}' has been disposed")]
    Disposed { widget: String },
}
