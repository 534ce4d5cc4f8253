//! Shared test utilities: view doubles, scripted fetchers, polling helpers.

#![allow(dead_code, unused_imports)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use uiflow::event::{Action, EventSequence, EventSubject, ACTION};
use uiflow::presenter::{BrowserView, FetchError, Fetcher};

/// Poll `condition` until it holds or `timeout` passes.
pub async fn wait_until<F: Fn() -> bool>(timeout: Duration, condition: F) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

pub const WAIT: Duration = Duration::from_secs(2);

// -- View double --------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct ViewState {
    pub go_enabled: bool,
    pub content: String,
    pub url: String,
    /// Every value written through `set_go_action_enabled`.
    pub go_history: Vec<bool>,
    /// Thread that last wrote the URL.
    pub url_writer: Option<std::thread::ThreadId>,
}

/// [`BrowserView`] backed by event subjects; tests play the user.
pub struct RecordingView {
    pub edits: EventSubject<String>,
    pub go: EventSubject<Action>,
    pub confirm: EventSubject<Action>,
    state: Mutex<ViewState>,
}

impl RecordingView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            edits: EventSubject::new("url-edits"),
            go: EventSubject::new("go"),
            confirm: EventSubject::new("url-confirm"),
            state: Mutex::new(ViewState::default()),
        })
    }

    pub fn type_url(&self, url: &str) {
        self.edits.emit(url.to_string());
    }

    pub fn press_go(&self) {
        self.go.emit(ACTION);
    }

    pub fn press_enter(&self) {
        self.confirm.emit(ACTION);
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.lock().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.edits.subscriber_count() + self.go.subscriber_count() + self.confirm.subscriber_count()
    }
}

impl BrowserView for RecordingView {
    fn url_edits(&self) -> EventSequence<String> {
        self.edits.sequence()
    }

    fn go_actions(&self) -> EventSequence<Action> {
        self.go.sequence()
    }

    fn url_actions(&self) -> EventSequence<Action> {
        self.confirm.sequence()
    }

    fn set_go_action_enabled(&self, enabled: bool) {
        let mut state = self.state.lock();
        state.go_enabled = enabled;
        state.go_history.push(enabled);
    }

    fn set_content(&self, content: &str) {
        self.state.lock().content = content.to_string();
    }

    fn set_url(&self, url: &str) {
        let mut state = self.state.lock();
        state.url = url.to_string();
        state.url_writer = Some(std::thread::current().id());
    }
}

// -- Fetchers -----------------------------------------------------------------

/// Answers `pong: {url}` once a permit is released; counts calls.
pub struct PongFetcher {
    calls: AtomicUsize,
    gate: Option<Semaphore>,
    urls: Mutex<Vec<String>>,
}

impl PongFetcher {
    /// Resolves immediately.
    pub fn instant() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            gate: None,
            urls: Mutex::new(Vec::new()),
        })
    }

    /// Each fetch waits for one [`release`](Self::release).
    pub fn gated() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            gate: Some(Semaphore::new(0)),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

#[async_trait]
impl Fetcher for PongFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().push(url.to_string());
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| FetchError::Other(e.to_string()))?;
            permit.forget();
        }
        Ok(format!("pong: {}", url))
    }
}

/// Always fails with an invalid-URL error.
pub struct FailingFetcher;

impl FailingFetcher {
    pub fn error_for(url: &str) -> FetchError {
        FetchError::InvalidUrl {
            url: url.to_string(),
            reason: "relative URL without a base".to_string(),
        }
    }
}

#[async_trait]
impl Fetcher for FailingFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        Err(Self::error_for(url))
    }
}
