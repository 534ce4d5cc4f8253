//! Top-level windows: frames and dialogs with a one-shot close signal.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::widget::Widget;

type CloseHandler = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    Frame,
    Dialog { modal: bool },
}

struct WindowInner {
    title: String,
    kind: WindowKind,
    content: Mutex<Option<Widget>>,
    closing: Mutex<Vec<CloseHandler>>,
    owned: Mutex<Vec<Window>>,
    parent: Option<Weak<WindowInner>>,
    visible: AtomicBool,
    disposed: AtomicBool,
}

/// Window handle. The toolkit never disposes a window on its own; close
/// requests only notify the registered closing handlers.
#[derive(Clone)]
pub struct Window {
    inner: Arc<WindowInner>,
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("title", &self.inner.title)
            .field("kind", &self.inner.kind)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Window {
    fn new(title: &str, kind: WindowKind, parent: Option<Weak<WindowInner>>) -> Self {
        Self {
            inner: Arc::new(WindowInner {
                title: title.to_string(),
                kind,
                content: Mutex::new(None),
                closing: Mutex::new(Vec::new()),
                owned: Mutex::new(Vec::new()),
                parent,
                visible: AtomicBool::new(false),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    pub fn frame(title: &str) -> Self {
        Self::new(title, WindowKind::Frame, None)
    }

    /// Dialog owned by `parent`; disposing the parent disposes the dialog.
    /// A dialog disposed on its own is released by its parent.
    pub fn dialog(parent: &Window, title: &str, modal: bool) -> Self {
        let dialog = Self::new(
            title,
            WindowKind::Dialog { modal },
            Some(Arc::downgrade(&parent.inner)),
        );
        parent.inner.owned.lock().push(dialog.clone());
        dialog
    }

    pub fn title(&self) -> &str {
        &self.inner.title
    }

    pub fn kind(&self) -> WindowKind {
        self.inner.kind
    }

    pub fn set_content(&self, content: Widget) {
        *self.inner.content.lock() = Some(content);
    }

    pub fn content(&self) -> Option<Widget> {
        self.inner.content.lock().clone()
    }

    pub fn set_visible(&self, visible: bool) {
        self.inner.visible.store(visible, Ordering::SeqCst);
    }

    pub fn is_visible(&self) -> bool {
        self.inner.visible.load(Ordering::SeqCst)
    }

    /// Register a handler for the next close request. Handlers fire once.
    pub fn on_closing(&self, handler: impl FnOnce() + Send + 'static) {
        self.inner.closing.lock().push(Box::new(handler));
    }

    /// Signal that the user asked to close the window.
    pub fn request_close(&self) {
        if self.is_disposed() {
            return;
        }
        let handlers = std::mem::take(&mut *self.inner.closing.lock());
        for handler in handlers {
            handler();
        }
    }

    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.set_visible(false);
        self.inner.closing.lock().clear();
        let owned = std::mem::take(&mut *self.inner.owned.lock());
        for window in owned {
            window.dispose();
        }
        if let Some(content) = self.inner.content.lock().take() {
            content.dispose();
        }
        if let Some(parent) = self.inner.parent.as_ref().and_then(Weak::upgrade) {
            parent
                .owned
                .lock()
                .retain(|window| !Arc::ptr_eq(&window.inner, &self.inner));
        }
    }

    /// Dialogs owned by this window that are not yet disposed.
    pub fn owned_count(&self) -> usize {
        self.inner.owned.lock().len()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }
}
