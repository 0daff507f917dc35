//! Pure rendering: MenuState -> bytes.
//!
//! Every frame is a full clear followed by the whole list. The frame is
//! composed in memory and written with one `write_all` + `flush`, so the
//! terminal never shows a half-drawn menu. Lines end in `\r\n` because the
//! menu is drawn while the terminal is in raw mode.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Print, PrintStyledContent};
use crossterm::terminal::{Clear, ClearType};

use super::state::MenuState;
use super::theme;

const NEWLINE: &str = "\r\n";

/// Build one complete frame for `state`.
pub fn compose(state: &MenuState<'_>, prompt: Option<&str>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    queue!(buf, MoveTo(0, 0), Clear(ClearType::All))?;

    if let Some(prompt) = prompt {
        queue!(
            buf,
            PrintStyledContent(theme::prompt().apply(prompt)),
            Print(NEWLINE),
            Print(NEWLINE)
        )?;
    }

    for (index, label) in state.options().iter().enumerate() {
        if index == state.selected() {
            let line = format!("{}{}", theme::SELECTED_MARKER, label);
            queue!(buf, PrintStyledContent(theme::selected().apply(line)))?;
        } else {
            queue!(buf, Print(theme::UNSELECTED_MARKER), Print(label))?;
        }
        queue!(buf, Print(NEWLINE))?;
    }

    queue!(
        buf,
        Print(NEWLINE),
        PrintStyledContent(theme::hint().apply(theme::KEY_HINT)),
        Print(NEWLINE)
    )?;

    Ok(buf)
}

/// Clear and redraw the whole menu in a single write.
pub fn draw<W: Write>(out: &mut W, state: &MenuState<'_>, prompt: Option<&str>) -> io::Result<()> {
    let frame = compose(state, prompt)?;
    out.write_all(&frame)?;
    out.flush()
}

/// Wipe the menu so whatever runs next starts on a clean screen.
pub fn clear<W: Write>(out: &mut W) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    out.flush()
}

// ============================================================================
// TESTS
// ============================================================================
