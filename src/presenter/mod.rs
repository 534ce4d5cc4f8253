//! Model-view-presenter wiring for the browser demo.
//!
//! The presenter only sees the [`BrowserView`] contract and a
//! [`Fetcher`]; [`ToolkitBrowserView`] and [`HttpFetcher`] are the
//! application's implementations.

mod browser;
mod fetch;
mod toolkit_view;
mod view;

pub use browser::BrowserPresenter;
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use toolkit_view::ToolkitBrowserView;
pub use view::BrowserView;
