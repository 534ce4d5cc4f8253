use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::runtime::Handle;

use uiflow::config::Config;
use uiflow::demo::{run_browser, run_ticks};
use uiflow::event::EventAdapter;
use uiflow::logging::init_tracing;
use uiflow::presenter::HttpFetcher;
use uiflow::scheduler::UiThread;

/// Extra time the browser demo waits past the fetch timeout.
const BROWSE_GRACE: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "uiflow", version, about = "Reactive event binding demos on a headless toolkit")]
struct Cli {
    /// Config file (default: ~/.config/uiflow/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a URL through the browser presenter and print what it shows
    Browse {
        url: Option<String>,
    },
    /// Count up in a label once per period
    Ticks {
        #[arg(long, default_value_t = 5)]
        count: usize,
        #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
        period_ms: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    init_tracing(&config.logging.level);

    let ui = UiThread::start(&config.scheduler.thread_name)?;
    let adapter = EventAdapter::from_config(&config.events);

    let outcome = match cli.command {
        Command::Browse { url } => browse(&ui, adapter, &config, url).await,
        Command::Ticks { count, period_ms } => {
            run_ticks(&ui, count, Duration::from_millis(period_ms))
                .await
                .map(|shown| {
                    for text in shown {
                        println!("{}", text);
                    }
                })
        }
    };

    ui.shutdown();
    outcome
}

async fn browse(
    ui: &UiThread,
    adapter: EventAdapter,
    config: &Config,
    url: Option<String>,
) -> anyhow::Result<()> {
    let fetcher = Arc::new(HttpFetcher::new(&config.fetch, Handle::current())?);
    let deadline = Duration::from_secs(config.fetch.timeout_seconds) + BROWSE_GRACE;

    let content = tokio::time::timeout(deadline, run_browser(ui, adapter, fetcher, url))
        .await
        .context("Timed out waiting for the browser to show content")??;

    println!("{}", content);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_defaults() {
        let cli = Cli::try_parse_from(["uiflow", "ticks"]).unwrap();
        match cli.command {
            Command::Ticks { count, period_ms } => {
                assert_eq!(count, 5);
                assert_eq!(period_ms, 1000);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn zero_tick_period_is_rejected() {
        let err = Cli::try_parse_from(["uiflow", "ticks", "--period-ms", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
