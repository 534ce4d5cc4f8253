use std::sync::Arc;

use anyhow::Context;
use tokio::sync::oneshot;

use crate::event::EventAdapter;
use crate::presenter::{BrowserPresenter, Fetcher, ToolkitBrowserView};
use crate::scheduler::UiThread;
use crate::scope::WindowScope;

/// Open the browser window, load `url` if given and return the content
/// it ends up showing. The window is closed afterwards, which stops `ui`.
pub async fn run_browser(
    ui: &UiThread,
    adapter: EventAdapter,
    fetcher: Arc<dyn Fetcher>,
    url: Option<String>,
) -> anyhow::Result<String> {
    let (content_tx, content_rx) = oneshot::channel::<String>();

    let window = WindowScope::main_window(ui, "My Browser", move |window| {
        let view = Arc::new(ToolkitBrowserView::new(adapter));
        let presenter = BrowserPresenter::new(view.clone(), window.scope(), fetcher)?;

        let Some(url) = url else {
            let _ = content_tx.send(String::new());
            return Ok(view.component());
        };

        // Subscribed before the fetch starts so a fast result is not missed.
        let shown = adapter
            .text_changes(view.content_area())
            .filter(|text| !text.is_empty())
            .subscribe()?;
        let mut content_tx = Some(content_tx);
        window.scope().listen_stream("content", shown, move |text| {
            if let Some(tx) = content_tx.take() {
                let _ = tx.send(text);
            }
            Ok(())
        });

        presenter.open(&url);
        Ok(view.component())
    })?;

    let content = content_rx
        .await
        .context("Browser window closed before showing content")?;

    window.request_close();
    window.closed().await;
    Ok(content)
}
