//! Presenter for the browser demo: URL field, Go button, content area.

use std::sync::Arc;

use futures_util::future::{BoxFuture, OptionFuture};
use parking_lot::Mutex;

use super::fetch::{FetchError, Fetcher};
use super::view::BrowserView;
use crate::error::UiError;
use crate::event::{EventSubject, Subscription};
use crate::scheduler::UiScheduler;
use crate::scope::Scope;

#[derive(Debug, Default)]
struct PresenterState {
    url: String,
    loading: bool,
}

/// What asked for a fetch. Resolved against presenter state inside the
/// pipeline so pending URL edits are applied first.
#[derive(Debug, Clone)]
enum Trigger {
    Open(String),
    Go,
    Confirm,
}

type InFlight = BoxFuture<'static, Result<String, FetchError>>;

/// Mediates between a [`BrowserView`] and a [`Fetcher`].
///
/// At most one fetch is in flight; triggers arriving meanwhile are
/// dropped. Fetch errors are rendered into the content area.
#[derive(Clone)]
pub struct BrowserPresenter {
    view: Arc<dyn BrowserView>,
    state: Arc<Mutex<PresenterState>>,
    opens: EventSubject<Trigger>,
}

impl BrowserPresenter {
    /// Subscribe to the view and start the pipeline in `scope`.
    ///
    /// Subscriptions are made before returning, so no edit fired after
    /// `new` is missed.
    ///
    /// # Errors
    /// Returns [`UiError::ResourceUnavailable`] if a view widget is
    /// already disposed.
    pub fn new(
        view: Arc<dyn BrowserView>,
        scope: &Scope,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, UiError> {
        let state = Arc::new(Mutex::new(PresenterState::default()));
        let opens = EventSubject::new("presenter:open");

        let edits = view.url_edits().subscribe()?;
        let triggers = opens
            .sequence()
            .merge(view.go_actions().map(|_| Trigger::Go))
            .merge(view.url_actions().map(|_| Trigger::Confirm))
            .subscribe()?;

        let pipeline = Pipeline {
            view: Arc::clone(&view),
            state: Arc::clone(&state),
            fetcher,
        };
        scope.spawn("presenter", pipeline.run(edits, triggers));

        Ok(Self { view, state, opens })
    }

    pub fn loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn url(&self) -> String {
        self.state.lock().url.clone()
    }

    /// Show `url` and load it, subject to the same gating as the Go button.
    ///
    /// The presenter and view URL are updated before this returns. The view
    /// is written on the calling thread, so with a toolkit-backed view this
    /// must run on the UI thread; use [`open_on`](Self::open_on) elsewhere.
    pub fn open(&self, url: &str) {
        self.state.lock().url = url.to_string();
        self.view.set_url(url);
        if self.opens.emit(Trigger::Open(url.to_string())) == 0 {
            tracing::debug!(url = %url, "Presenter pipeline gone, open ignored");
        }
    }

    /// Queue [`open`](Self::open) on `scheduler`'s UI thread.
    ///
    /// # Errors
    /// Returns [`UiError::SchedulerClosed`] if the UI thread has stopped.
    pub fn open_on(&self, scheduler: &dyn UiScheduler, url: &str) -> Result<(), UiError> {
        let presenter = self.clone();
        let url = url.to_string();
        scheduler.run_on_ui_thread(Box::new(move || presenter.open(&url)))
    }
}

struct Pipeline {
    view: Arc<dyn BrowserView>,
    state: Arc<Mutex<PresenterState>>,
    fetcher: Arc<dyn Fetcher>,
}

impl Pipeline {
    async fn run(
        self,
        mut edits: Subscription<String>,
        mut triggers: Subscription<Trigger>,
    ) -> anyhow::Result<()> {
        let mut in_flight: Option<InFlight> = None;
        let mut edits_open = true;
        let mut triggers_open = true;

        loop {
            tokio::select! {
                biased;
                edit = edits.next_event(), if edits_open => match edit {
                    Some(url) => self.on_edit(url),
                    None => edits_open = false,
                },
                trigger = triggers.next_event(), if triggers_open => match trigger {
                    Some(trigger) => {
                        if in_flight.is_some() {
                            tracing::debug!(?trigger, "Fetch in flight, trigger dropped");
                        } else {
                            in_flight = self.start_fetch(trigger);
                        }
                    }
                    None => triggers_open = false,
                },
                Some(result) = OptionFuture::from(in_flight.as_mut()) => {
                    in_flight = None;
                    self.on_complete(result);
                },
                else => return Ok(()),
            }
        }
    }

    fn on_edit(&self, url: String) {
        let enabled = {
            let mut state = self.state.lock();
            let enabled = !state.loading && !url.trim().is_empty();
            state.url = url;
            enabled
        };
        self.view.set_go_action_enabled(enabled);
    }

    fn start_fetch(&self, trigger: Trigger) -> Option<InFlight> {
        let url = {
            let mut state = self.state.lock();
            let url = match trigger {
                Trigger::Open(url) => url,
                Trigger::Go => state.url.clone(),
                Trigger::Confirm if state.url.trim().is_empty() => return None,
                Trigger::Confirm => state.url.clone(),
            };
            state.loading = true;
            url
        };
        self.view.set_go_action_enabled(false);
        tracing::info!(url = %url, "Loading");

        let fetcher = Arc::clone(&self.fetcher);
        Some(Box::pin(async move { fetcher.fetch(&url).await }))
    }

    fn on_complete(&self, result: Result<String, FetchError>) {
        let content = match result {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(error = %err, "Fetch failed");
                err.to_string()
            }
        };
        self.state.lock().loading = false;
        self.view.set_go_action_enabled(true);
        self.view.set_content(&content);
    }
}
