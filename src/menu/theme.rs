//! Menu color semantics and style constants.
//!
//! Centralized so the renderer never hardcodes colors.
//!
//! Color semantics:
//! - Cyan + bold: the selected option (interactive focus)
//! - Bold: the prompt line
//! - Dark gray: key hints

use crossterm::style::{Attribute, Color, ContentStyle};

/// Prefix of the selected row.
pub const SELECTED_MARKER: &str = "> ";

/// Prefix of every other row, same width as the marker.
pub const UNSELECTED_MARKER: &str = "  ";

/// Footer line listing the keys the menu reacts to.
pub const KEY_HINT: &str = "↑/↓ move   Enter select   Ctrl-C quit";

fn style(fg: Option<Color>, bold: bool) -> ContentStyle {
    let mut style = ContentStyle::new();
    style.foreground_color = fg;
    if bold {
        style.attributes.set(Attribute::Bold);
    }
    style
}

/// Selected / highlighted option.
pub fn selected() -> ContentStyle {
    style(Some(Color::Cyan), true)
}

/// Prompt above the options.
pub fn prompt() -> ContentStyle {
    style(None, true)
}

/// Footer / key hint.
pub fn hint() -> ContentStyle {
    style(Some(Color::DarkGrey), false)
}
