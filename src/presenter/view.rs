use crate::event::{Action, EventSequence};

/// Everything the browser presenter needs from a view.
///
/// User input arrives as event sequences; view state is write-only. A
/// toolkit-backed view and a test double are interchangeable behind it.
/// Setters are called from the presenter's task, which runs on the UI
/// thread in an application.
pub trait BrowserView: Send + Sync {
    /// Full URL field text after every edit.
    fn url_edits(&self) -> EventSequence<String>;

    fn go_actions(&self) -> EventSequence<Action>;

    /// Enter pressed in the URL field.
    fn url_actions(&self) -> EventSequence<Action>;

    fn set_go_action_enabled(&self, enabled: bool);

    fn set_content(&self, content: &str);

    fn set_url(&self, url: &str);
}
