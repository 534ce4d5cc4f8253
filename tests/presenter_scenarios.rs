mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{wait_until, FailingFetcher, PongFetcher, RecordingView, WAIT};
use tokio::runtime::Handle;
use uiflow::presenter::BrowserPresenter;
use uiflow::scheduler::{UiScheduler, UiThread};
use uiflow::scope::Scope;

fn presenter_with(
    view: &Arc<RecordingView>,
    fetcher: Arc<dyn uiflow::presenter::Fetcher>,
) -> (Scope, BrowserPresenter) {
    let scope = Scope::new("presenter-test", Handle::current());
    let presenter = BrowserPresenter::new(view.clone(), &scope, fetcher).unwrap();
    (scope, presenter)
}

#[tokio::test]
async fn url_edit_enables_go_without_loading() {
    let view = RecordingView::new();
    let fetcher = PongFetcher::instant();
    let (scope, presenter) = presenter_with(&view, fetcher.clone());

    view.type_url("foo");

    assert!(wait_until(WAIT, || view.snapshot().go_enabled).await);
    assert!(!presenter.loading());
    assert_eq!(presenter.url(), "foo");
    assert_eq!(view.snapshot().content, "");
    assert_eq!(fetcher.calls(), 0);
    scope.close().await;
}

#[tokio::test]
async fn blank_edit_disables_go() {
    let view = RecordingView::new();
    let (scope, _presenter) = presenter_with(&view, PongFetcher::instant());

    view.type_url("foo");
    view.type_url("   ");

    assert!(wait_until(WAIT, || view.snapshot().go_history.len() == 2).await);
    assert_eq!(view.snapshot().go_history, vec![true, false]);
    scope.close().await;
}

#[tokio::test]
async fn go_loads_the_current_url() {
    let view = RecordingView::new();
    let fetcher = PongFetcher::instant();
    let (scope, presenter) = presenter_with(&view, fetcher.clone());

    view.type_url("https://example.com");
    view.press_go();

    assert!(wait_until(WAIT, || view.snapshot().content == "pong: https://example.com").await);
    assert!(!presenter.loading());
    assert!(view.snapshot().go_enabled);
    assert_eq!(fetcher.urls(), vec!["https://example.com"]);
    scope.close().await;
}

#[tokio::test]
async fn fetch_error_is_rendered_as_content() {
    let view = RecordingView::new();
    let (scope, presenter) = presenter_with(&view, Arc::new(FailingFetcher));

    view.type_url("foo");
    view.press_go();

    let expected = FailingFetcher::error_for("foo").to_string();
    assert!(wait_until(WAIT, || view.snapshot().content == expected).await);
    assert!(!presenter.loading());
    assert!(view.snapshot().go_enabled);
    assert!(scope.failures().is_empty());
    scope.close().await;
}

#[tokio::test]
async fn triggers_during_fetch_are_dropped() {
    let view = RecordingView::new();
    let fetcher = PongFetcher::gated();
    let (scope, presenter) = presenter_with(&view, fetcher.clone());

    view.type_url("https://a.example");
    view.press_go();
    assert!(wait_until(WAIT, || fetcher.calls() == 1).await);
    assert!(presenter.loading());
    let during = view.snapshot();
    assert!(!during.go_enabled);

    view.press_go();
    view.press_enter();
    presenter.open("https://b.example");
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(fetcher.calls(), 1);
    assert!(presenter.loading());
    assert_eq!(view.snapshot().content, during.content);
    assert!(!view.snapshot().go_enabled);

    fetcher.release();
    assert!(wait_until(WAIT, || !presenter.loading()).await);
    assert_eq!(view.snapshot().content, "pong: https://a.example");
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(fetcher.calls(), 1);
    scope.close().await;
}

#[tokio::test]
async fn edits_during_fetch_keep_go_disabled() {
    let view = RecordingView::new();
    let fetcher = PongFetcher::gated();
    let (scope, presenter) = presenter_with(&view, fetcher.clone());

    view.type_url("https://a.example");
    view.press_go();
    assert!(wait_until(WAIT, || presenter.loading()).await);

    view.type_url("https://b.example");
    assert!(wait_until(WAIT, || presenter.url() == "https://b.example").await);
    assert!(!view.snapshot().go_enabled);

    fetcher.release();
    assert!(wait_until(WAIT, || view.snapshot().go_enabled).await);
    scope.close().await;
}

#[tokio::test]
async fn open_sets_url_before_fetching() {
    let view = RecordingView::new();
    let fetcher = PongFetcher::instant();
    let (scope, presenter) = presenter_with(&view, fetcher.clone());

    presenter.open("https://example.com");

    assert_eq!(presenter.url(), "https://example.com");
    assert_eq!(view.snapshot().url, "https://example.com");
    assert_eq!(fetcher.calls(), 0);

    assert!(wait_until(WAIT, || view.snapshot().content == "pong: https://example.com").await);
    assert_eq!(fetcher.calls(), 1);
    scope.close().await;
}

#[tokio::test]
async fn open_on_writes_the_view_from_the_ui_thread() {
    let ui = UiThread::start("presenter-open").unwrap();
    let (ui_id_tx, ui_id_rx) = std::sync::mpsc::channel();
    ui.run(move || {
        let _ = ui_id_tx.send(std::thread::current().id());
    })
    .unwrap();
    let ui_id = ui_id_rx.recv_timeout(WAIT).unwrap();

    let view = RecordingView::new();
    let fetcher = PongFetcher::instant();
    let scope = Scope::new("presenter-ui", ui.handle().clone());
    let presenter = BrowserPresenter::new(view.clone(), &scope, fetcher.clone()).unwrap();

    presenter.open_on(&ui, "https://example.com").unwrap();

    assert!(wait_until(WAIT, || view.snapshot().content == "pong: https://example.com").await);
    assert_eq!(view.snapshot().url, "https://example.com");
    assert_eq!(view.snapshot().url_writer, Some(ui_id));
    assert_ne!(ui_id, std::thread::current().id());
    assert_eq!(fetcher.calls(), 1);

    scope.close().await;
    ui.shutdown();
    assert!(matches!(
        presenter.open_on(&ui, "https://late.example"),
        Err(uiflow::UiError::SchedulerClosed)
    ));
}

#[tokio::test]
async fn enter_with_blank_url_does_nothing() {
    let view = RecordingView::new();
    let fetcher = PongFetcher::instant();
    let (scope, presenter) = presenter_with(&view, fetcher.clone());

    view.press_enter();
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(fetcher.calls(), 0);
    assert!(!presenter.loading());

    view.type_url("https://example.com");
    view.press_enter();
    assert!(wait_until(WAIT, || fetcher.calls() == 1).await);
    scope.close().await;
}

#[tokio::test]
async fn closing_scope_detaches_view_listeners() {
    let view = RecordingView::new();
    let (scope, _presenter) = presenter_with(&view, PongFetcher::instant());
    assert_eq!(view.subscriber_count(), 3);

    scope.close().await;

    assert_eq!(view.subscriber_count(), 0);
}
