//! Scopes bound one-to-one to toolkit windows.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::Scope;
use crate::error::UiError;
use crate::scheduler::{UiScheduler, UiThread};
use crate::toolkit::{Widget, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseAction {
    /// Main window: closing it ends the UI thread.
    ExitApplication,
    Dispose,
}

/// A window together with the scope that owns its event pipelines.
///
/// A close request closes the scope first and disposes the window only
/// once every pipeline has ended, so no listener outlives its widget.
#[derive(Clone)]
pub struct WindowScope {
    scope: Scope,
    window: Window,
    ui: UiThread,
    closed: CancellationToken,
    owned: Arc<Mutex<Vec<WindowScope>>>,
    parent: Weak<Mutex<Vec<WindowScope>>>,
}

impl std::fmt::Debug for WindowScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowScope")
            .field("window", &self.window)
            .field("scope", &self.scope)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl WindowScope {
    /// Open the application's main window.
    ///
    /// `build` runs on the UI thread and returns the window content; it may
    /// start pipelines on the passed scope. Closing the window shuts down
    /// `ui`.
    ///
    /// # Errors
    /// Returns [`UiError::SchedulerClosed`] if the UI thread has stopped.
    pub fn main_window<F>(ui: &UiThread, title: &str, build: F) -> Result<Self, UiError>
    where
        F: FnOnce(&WindowScope) -> anyhow::Result<Widget> + Send + 'static,
    {
        let scope = Scope::new(format!("main:{}", title), ui.handle().clone());
        Self::open(
            ui.clone(),
            scope,
            Window::frame(title),
            CloseAction::ExitApplication,
            Weak::new(),
            build,
        )
    }

    /// Secondary frame whose scope is a child of this one.
    pub fn frame<F>(&self, title: &str, build: F) -> Result<Self, UiError>
    where
        F: FnOnce(&WindowScope) -> anyhow::Result<Widget> + Send + 'static,
    {
        let scope = self.scope.child(format!("frame:{}", title));
        let frame = Self::open(
            self.ui.clone(),
            scope,
            Window::frame(title),
            CloseAction::Dispose,
            Arc::downgrade(&self.owned),
            build,
        )?;
        self.adopt(&frame);
        Ok(frame)
    }

    /// Dialog owned by this window, with a child scope.
    pub fn dialog<F>(&self, title: &str, modal: bool, build: F) -> Result<Self, UiError>
    where
        F: FnOnce(&WindowScope) -> anyhow::Result<Widget> + Send + 'static,
    {
        let scope = self.scope.child(format!("dialog:{}", title));
        let dialog = Self::open(
            self.ui.clone(),
            scope,
            Window::dialog(&self.window, title, modal),
            CloseAction::Dispose,
            Arc::downgrade(&self.owned),
            build,
        )?;
        self.adopt(&dialog);
        Ok(dialog)
    }

    fn open<F>(
        ui: UiThread,
        scope: Scope,
        window: Window,
        action: CloseAction,
        parent: Weak<Mutex<Vec<WindowScope>>>,
        build: F,
    ) -> Result<Self, UiError>
    where
        F: FnOnce(&WindowScope) -> anyhow::Result<Widget> + Send + 'static,
    {
        let window_scope = WindowScope {
            scope,
            window,
            ui,
            closed: CancellationToken::new(),
            owned: Arc::new(Mutex::new(Vec::new())),
            parent,
        };

        let closing = window_scope.clone();
        window_scope
            .window
            .on_closing(move || closing.begin_close(action));

        let builder = window_scope.clone();
        window_scope.ui.run(move || match build(&builder) {
            Ok(content) => {
                builder.window.set_content(content);
                builder.window.set_visible(true);
                tracing::info!(window = %builder.window.title(), "Window opened");
            }
            Err(err) => {
                tracing::error!(
                    window = %builder.window.title(),
                    error = %format!("{:#}", err),
                    "Window content failed to build"
                );
                builder.window.request_close();
            }
        })?;

        Ok(window_scope)
    }

    /// Track a child window until it closes. A child whose build already
    /// failed and disposed it is not tracked.
    fn adopt(&self, child: &WindowScope) {
        let mut owned = self.owned.lock();
        if !child.window.is_disposed() {
            owned.push(child.clone());
        }
    }

    fn begin_close(&self, action: CloseAction) {
        let this = self.clone();
        self.ui.handle().spawn(async move {
            this.scope.close().await;
            this.finish_close();
            tracing::info!(window = %this.window.title(), "Window closed");
            if action == CloseAction::ExitApplication {
                this.ui.shutdown();
            }
        });
    }

    /// Dispose this window and every window opened from it. Only called
    /// once the scope (and so every child scope) has closed.
    fn finish_close(&self) {
        let owned = std::mem::take(&mut *self.owned.lock());
        for child in owned {
            child.finish_close();
        }
        self.window.dispose();
        // Disposed before this lock is taken, so `adopt` cannot re-add it.
        if let Some(siblings) = self.parent.upgrade() {
            siblings
                .lock()
                .retain(|sibling| !Arc::ptr_eq(&sibling.owned, &self.owned));
        }
        self.closed.cancel();
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn ui(&self) -> &UiThread {
        &self.ui
    }

    /// Ask the window to close, as if the user clicked its close button.
    pub fn request_close(&self) {
        self.window.request_close();
    }

    /// Frames and dialogs opened from this window that are still open.
    pub fn open_children(&self) -> usize {
        self.owned.lock().len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Resolves once the scope has closed and the window is disposed.
    pub async fn closed(&self) {
        self.closed.cancelled().await;
    }
}
