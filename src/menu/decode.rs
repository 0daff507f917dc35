//! Byte-at-a-time key decoder.
//!
//! Three states: `Idle`, `EscapeSeen`, `BracketSeen`. Only `ESC [ A` and
//! `ESC [ B` are recognized as sequences; every other completed or broken
//! sequence collapses to a no-op. Timeouts are not measured here: the
//! caller reads with a bounded wait while `is_pending()` and calls
//! `expire()` when that wait runs out.

use super::state::KeyEvent;

pub const ESC: u8 = 0x1b;
pub const CTRL_C: u8 = 0x03;

/// Decoder position inside a (possible) escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeState {
    #[default]
    Idle,
    EscapeSeen,
    BracketSeen,
}

/// Outcome of feeding one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// Inside an escape sequence; read the next byte with a timeout.
    Pending,
    /// A single-byte key.
    Key(KeyEvent),
    /// The final byte of `ESC [ x`. Trailing bytes of longer sequences
    /// (e.g. `ESC [ 1 ; 5 A`) may still be buffered and should be drained.
    Sequence(KeyEvent),
}

/// Pure transition: (state, byte) -> (next state, output).
///
/// Ctrl-C interrupts from any state, abandoning a partial sequence.
pub fn step(state: DecodeState, byte: u8) -> (DecodeState, Decoded) {
    if byte == CTRL_C {
        return (DecodeState::Idle, Decoded::Key(KeyEvent::Interrupt));
    }
    match state {
        DecodeState::Idle => match byte {
            ESC => (DecodeState::EscapeSeen, Decoded::Pending),
            b'\r' | b'\n' => (DecodeState::Idle, Decoded::Key(KeyEvent::Confirm)),
            _ => (DecodeState::Idle, Decoded::Key(KeyEvent::Other)),
        },
        DecodeState::EscapeSeen => match byte {
            b'[' => (DecodeState::BracketSeen, Decoded::Pending),
            // Lone escape followed by something else: drop both.
            _ => (DecodeState::Idle, Decoded::Key(KeyEvent::Other)),
        },
        DecodeState::BracketSeen => {
            let event = match byte {
                b'A' => KeyEvent::Up,
                b'B' => KeyEvent::Down,
                _ => KeyEvent::Other,
            };
            (DecodeState::Idle, Decoded::Sequence(event))
        }
    }
}

/// True for bytes that can continue a CSI sequence (parameters,
/// intermediates and final bytes). Control bytes such as Enter, Ctrl-C or
/// a fresh `ESC` never can.
pub fn is_sequence_byte(byte: u8) -> bool {
    (0x20..=0x7e).contains(&byte)
}

/// Stateful wrapper around [`step`].
#[derive(Debug, Default)]
pub struct KeyDecoder {
    state: DecodeState,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// True while a sequence is in progress and the next read must be bounded.
    pub fn is_pending(&self) -> bool {
        self.state != DecodeState::Idle
    }

    pub fn feed(&mut self, byte: u8) -> Decoded {
        let (next, decoded) = step(self.state, byte);
        self.state = next;
        decoded
    }

    /// The bounded wait ran out. Drops any partial sequence.
    ///
    /// Returns true if a partial sequence was discarded.
    pub fn expire(&mut self) -> bool {
        let was_pending = self.is_pending();
        self.state = DecodeState::Idle;
        was_pending
    }
}

// ============================================================================
// TESTS
// ============================================================================
