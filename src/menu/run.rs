//! Menu effects boundary: raw mode, the read/decode loop, redraws.
//!
//! The loop is strictly sequential. One byte is read, decoded, applied,
//! and (if the selection moved) the full menu is redrawn before the next
//! read. The only bounded waits are inside escape sequences.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::decode::{Decoded, KeyDecoder, is_sequence_byte};
use super::error::MenuError;
use super::input::{ByteSource, RawMode, StdinBytes};
use super::state::{MenuState, Transition};
use super::update::update;
use super::view::draw;

/// How long to wait for the byte after `ESC` or `ESC [`.
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(100);

/// Upper bound on draining trailing sequence bytes after `ESC [ x`.
pub const FLUSH_WINDOW: Duration = Duration::from_millis(15);

/// Bounded waits used by the decoder loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub escape: Duration,
    pub flush: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            escape: ESCAPE_TIMEOUT,
            flush: FLUSH_WINDOW,
        }
    }
}

// ============================================================================
// PUBLIC ENTRY POINTS
// ============================================================================

/// Show `options`, let the user pick one, return its index.
///
/// Returns only on Enter (with an index in `0..options.len()`), on Ctrl-C
/// (`Interrupted`), or when input ends.
///
/// # Errors
/// `InvalidArgument` for an empty `options` or out-of-range
/// `initial_index`; the terminal is left untouched in that case.
pub fn run_menu(initial_index: usize, options: &[&str]) -> Result<usize, MenuError> {
    run_prompted_menu(None, initial_index, options)
}

/// [`run_menu`] with a prompt line drawn above the options.
pub fn run_prompted_menu(
    prompt: Option<&str>,
    initial_index: usize,
    options: &[&str],
) -> Result<usize, MenuError> {
    // Validate before touching the terminal
    let state = MenuState::new(initial_index, options)?;

    let _raw = RawMode::enable()?;
    let mut input = StdinBytes::new();
    let mut output = io::stdout().lock();
    drive(state, prompt, &mut input, &mut output, Timing::default())
}

// ============================================================================
// EVENT LOOP
// ============================================================================

/// Run the decode/update/draw loop against any input and output.
pub fn drive<R: ByteSource, W: Write>(
    mut state: MenuState<'_>,
    prompt: Option<&str>,
    input: &mut R,
    output: &mut W,
    timing: Timing,
) -> Result<usize, MenuError> {
    let mut decoder = KeyDecoder::new();
    // A control byte that ended a drain; decoded before anything else is read
    let mut held: Option<u8> = None;
    draw(output, &state, prompt)?;

    loop {
        let byte = if let Some(byte) = held.take() {
            byte
        } else if decoder.is_pending() {
            match input.read_byte_timeout(timing.escape)? {
                Some(byte) => byte,
                None => {
                    if decoder.expire() {
                        trace!("incomplete escape sequence dropped");
                    }
                    continue;
                }
            }
        } else {
            match input.read_byte()? {
                Some(byte) => byte,
                None => return Err(MenuError::InputClosed),
            }
        };

        let event = match decoder.feed(byte) {
            Decoded::Pending => continue,
            Decoded::Key(event) => event,
            Decoded::Sequence(event) => {
                held = drain(input, timing.flush)?;
                event
            }
        };

        match update(state, event) {
            Transition::Redraw(next) => {
                state = next;
                draw(output, &state, prompt)?;
            }
            Transition::Unchanged(next) => state = next,
            Transition::Choose(index) => {
                debug!(index, label = state.selected_label(), "menu choice confirmed");
                return Ok(index);
            }
            Transition::Interrupt => {
                debug!("menu interrupted");
                return Err(MenuError::Interrupted);
            }
        }
    }
}

/// Discard trailing sequence bytes for at most `window` in total.
///
/// Stops early on a quiet input or on a byte that cannot belong to the
/// sequence; that byte is returned so the caller still decodes it.
fn drain<R: ByteSource>(input: &mut R, window: Duration) -> io::Result<Option<u8>> {
    let deadline = Instant::now() + window;
    let mut dropped = 0usize;
    let mut held = None;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match input.read_byte_timeout(remaining)? {
            Some(byte) if is_sequence_byte(byte) => dropped += 1,
            Some(byte) => {
                held = Some(byte);
                break;
            }
            None => break,
        }
    }
    if dropped > 0 {
        trace!(dropped, "drained trailing sequence bytes");
    }
    Ok(held)
}

// ============================================================================
// TESTS
// ============================================================================
