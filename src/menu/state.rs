//! Menu state algebra: pure types, zero effects.
//!
//! A `MenuState` lives for exactly one menu invocation. Nested menus build
//! their own state; nothing is shared between invocations.
//!
//! Invariant: `selected < options.len()`, and `options` is never empty.
//! The only constructor enforces both, so every `MenuState` in existence
//! is valid.

use super::error::MenuError;

// ============================================================================
// KEY EVENTS
// ============================================================================

/// Decoded navigation signal, produced from the raw byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Arrow up (`ESC [ A`).
    Up,
    /// Arrow down (`ESC [ B`).
    Down,
    /// Enter / newline.
    Confirm,
    /// Ctrl-C. Raw mode turns it into a byte instead of a signal.
    Interrupt,
    /// Anything else. Ignored.
    Other,
}

// ============================================================================
// MENU STATE
// ============================================================================

/// Selection state of a single menu invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuState<'a> {
    selected: usize,
    options: &'a [&'a str],
}

impl<'a> MenuState<'a> {
    /// Validate the inputs and build the initial state.
    ///
    /// # Errors
    /// `InvalidArgument` when `options` is empty or `initial_index` is
    /// outside `0..options.len()`.
    pub fn new(initial_index: usize, options: &'a [&'a str]) -> Result<Self, MenuError> {
        if options.is_empty() {
            return Err(MenuError::InvalidArgument(
                "menu options must not be empty".to_string(),
            ));
        }
        if initial_index >= options.len() {
            return Err(MenuError::InvalidArgument(format!(
                "initial index {} out of range for {} options",
                initial_index,
                options.len()
            )));
        }
        Ok(MenuState {
            selected: initial_index,
            options,
        })
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn options(&self) -> &'a [&'a str] {
        self.options
    }

    // Never empty, so there is no `is_empty`
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Label of the currently selected option.
    pub fn selected_label(&self) -> &'a str {
        self.options[self.selected]
    }

    /// Move up one row. Returns false at the top (no wraparound).
    pub fn move_up(&mut self) -> bool {
        if self.selected >= 1 {
            self.selected -= 1;
            true
        } else {
            false
        }
    }

    /// Move down one row. Returns false at the bottom (no wraparound).
    pub fn move_down(&mut self) -> bool {
        if self.selected < self.options.len() - 1 {
            self.selected += 1;
            true
        } else {
            false
        }
    }
}

// ============================================================================
// TRANSITIONS
// ============================================================================

/// Result of feeding one key event to the menu.
///
/// The effects boundary inspects it to decide whether to redraw, return
/// to the caller, or hand control to session teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<'a> {
    /// Selection changed; redraw with this state.
    Redraw(MenuState<'a>),
    /// Nothing visible changed.
    Unchanged(MenuState<'a>),
    /// The user confirmed this index.
    Choose(usize),
    /// The user asked to abort the whole session.
    Interrupt,
}

// ============================================================================
// TESTS
// ============================================================================
