use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::scheduler::{ticks, UiThread};
use crate::scope::WindowScope;
use crate::toolkit::Widget;

/// Count up in a label once per `period`, `count` times, then close the
/// window. Returns the label text after each tick.
///
/// # Errors
/// Fails without opening a window if `period` is zero.
pub async fn run_ticks(ui: &UiThread, count: usize, period: Duration) -> anyhow::Result<Vec<String>> {
    anyhow::ensure!(!period.is_zero(), "tick period must be non-zero");
    let (shown_tx, mut shown_rx) = mpsc::unbounded_channel();

    let window = WindowScope::main_window(ui, "Time Ticks", move |window| {
        let label = Widget::label("ticks", "");
        let display = label.clone();
        window
            .scope()
            .listen_stream("ticks", ticks(period).take(count), move |tick| {
                display.set_text(&tick.to_string());
                let _ = shown_tx.send(display.text());
                Ok(())
            });
        Ok(label)
    })?;

    let mut shown = Vec::with_capacity(count);
    while let Some(text) = shown_rx.recv().await {
        shown.push(text);
    }

    window.request_close();
    window.closed().await;
    Ok(shown)
}
