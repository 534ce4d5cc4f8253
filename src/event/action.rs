/// A discrete trigger with no payload.
///
/// Used to unify heterogeneous triggers (a button press, Enter in a text
/// field) into one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    _private: (),
}

/// The action value.
pub const ACTION: Action = Action { _private: () };

impl Default for Action {
    fn default() -> Self {
        ACTION
    }
}
