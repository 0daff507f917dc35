//! Pure state transitions: (MenuState, KeyEvent) -> Transition.
//!
//! Fully testable without a terminal.

use super::state::{KeyEvent, MenuState, Transition};

/// Apply one key event to the menu.
pub fn update(mut state: MenuState<'_>, event: KeyEvent) -> Transition<'_> {
    match event {
        KeyEvent::Up => {
            if state.move_up() {
                Transition::Redraw(state)
            } else {
                Transition::Unchanged(state)
            }
        }
        KeyEvent::Down => {
            if state.move_down() {
                Transition::Redraw(state)
            } else {
                Transition::Unchanged(state)
            }
        }
        KeyEvent::Confirm => Transition::Choose(state.selected()),
        KeyEvent::Interrupt => Transition::Interrupt,
        KeyEvent::Other => Transition::Unchanged(state),
    }
}

/// Fold a whole event sequence, stopping at the first terminal transition.
///
/// Returns `None` if the events run out before Confirm or Interrupt.
pub fn replay<'a>(
    mut state: MenuState<'a>,
    events: impl IntoIterator<Item = KeyEvent>,
) -> Option<Transition<'a>> {
    for event in events {
        match update(state, event) {
            Transition::Redraw(next) | Transition::Unchanged(next) => state = next,
            terminal => return Some(terminal),
        }
    }
    None
}

// ============================================================================
// TESTS
// ============================================================================
