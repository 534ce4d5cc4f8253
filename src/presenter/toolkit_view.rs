use crate::event::{Action, EventAdapter, EventSequence};
use crate::toolkit::Widget;

use super::view::BrowserView;

/// [`BrowserView`] over toolkit widgets: a URL field, a Go button that
/// starts disabled, and a content area, laid out in one panel.
pub struct ToolkitBrowserView {
    adapter: EventAdapter,
    url_field: Widget,
    go_button: Widget,
    content_area: Widget,
    root: Widget,
}

impl ToolkitBrowserView {
    pub fn new(adapter: EventAdapter) -> Self {
        let url_field = Widget::text_field("url");
        let go_button = Widget::button("go", "Go!");
        go_button.set_enabled(false);
        let content_area = Widget::text_area("content");

        let root = Widget::panel("browser");
        root.add(Widget::label("url-label", "URL"));
        root.add(url_field.clone());
        root.add(go_button.clone());
        root.add(content_area.clone());

        Self {
            adapter,
            url_field,
            go_button,
            content_area,
            root,
        }
    }

    /// The panel to install as window content.
    pub fn component(&self) -> Widget {
        self.root.clone()
    }

    pub fn url_field(&self) -> &Widget {
        &self.url_field
    }

    pub fn go_button(&self) -> &Widget {
        &self.go_button
    }

    pub fn content_area(&self) -> &Widget {
        &self.content_area
    }
}

impl BrowserView for ToolkitBrowserView {
    fn url_edits(&self) -> EventSequence<String> {
        self.adapter.text_changes(&self.url_field)
    }

    fn go_actions(&self) -> EventSequence<Action> {
        self.adapter.actions(&self.go_button)
    }

    fn url_actions(&self) -> EventSequence<Action> {
        self.adapter.actions(&self.url_field)
    }

    fn set_go_action_enabled(&self, enabled: bool) {
        self.go_button.set_enabled(enabled);
    }

    fn set_content(&self, content: &str) {
        self.content_area.set_text(content);
    }

    fn set_url(&self, url: &str) {
        self.url_field.set_text(url);
    }
}
