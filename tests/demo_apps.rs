mod common;

use std::time::Duration;

use common::{wait_until, FailingFetcher, PongFetcher, WAIT};
use uiflow::demo::{run_browser, run_ticks};
use uiflow::event::EventAdapter;
use uiflow::scheduler::UiThread;

#[tokio::test]
async fn browser_demo_shows_fetched_content() {
    let ui = UiThread::start("demo-browser").unwrap();
    let fetcher = PongFetcher::instant();

    let content = run_browser(
        &ui,
        EventAdapter::default(),
        fetcher.clone(),
        Some("https://example.com".to_string()),
    )
    .await
    .unwrap();

    assert_eq!(content, "pong: https://example.com");
    assert_eq!(fetcher.calls(), 1);
    assert!(wait_until(WAIT, || ui.is_closed()).await);
    ui.join();
}

#[tokio::test]
async fn browser_demo_shows_fetch_errors() {
    let ui = UiThread::start("demo-browser-err").unwrap();

    let content = run_browser(
        &ui,
        EventAdapter::default(),
        std::sync::Arc::new(FailingFetcher),
        Some("foo".to_string()),
    )
    .await
    .unwrap();

    assert_eq!(content, FailingFetcher::error_for("foo").to_string());
    ui.join();
}

#[tokio::test]
async fn browser_demo_without_url_shows_nothing() {
    let ui = UiThread::start("demo-browser-empty").unwrap();
    let fetcher = PongFetcher::instant();

    let content = run_browser(&ui, EventAdapter::default(), fetcher.clone(), None)
        .await
        .unwrap();

    assert_eq!(content, "");
    assert_eq!(fetcher.calls(), 0);
    ui.join();
}

#[tokio::test]
async fn ticks_demo_counts_up() {
    let ui = UiThread::start("demo-ticks").unwrap();

    let shown = run_ticks(&ui, 3, Duration::from_millis(5)).await.unwrap();

    assert_eq!(shown, vec!["0", "1", "2"]);
    assert!(wait_until(WAIT, || ui.is_closed()).await);
    ui.join();
}

#[tokio::test]
async fn ticks_demo_rejects_zero_period() {
    let ui = UiThread::start("demo-ticks-zero").unwrap();

    let err = run_ticks(&ui, 3, Duration::ZERO).await.unwrap_err();

    assert!(err.to_string().contains("non-zero"));
    assert!(!ui.is_closed());
    ui.shutdown();
}
