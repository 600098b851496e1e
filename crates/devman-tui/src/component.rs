//! Component trait: the building block for every UI element.

use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use crate::action::Action;
use crate::state::AppState;
use crate::theme::Theme;

/// A view over [`AppState`].
///
/// Components hold no state of their own: keys are translated into
/// actions and the reducer in [`AppState::update`] applies them.
pub trait Component {
    /// Map a key to an action, or `None` to ignore it.
    fn handle_key_event(&self, _key: KeyEvent, _state: &AppState) -> Option<Action> {
        None
    }

    /// Render into the provided frame area.
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme);

    /// Identifier used in trace output.
    fn id(&self) -> &'static str;
}
