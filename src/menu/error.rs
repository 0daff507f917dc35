//! Errors surfaced by the menu engine.

use std::io;

use thiserror::Error;

/// Why a menu invocation ended without a chosen index.
///
/// Incomplete escape sequences are not errors: the decoder drops them
/// silently and the loop keeps reading.
#[derive(Debug, Error)]
pub enum MenuError {
    /// Structurally invalid menu (no options, initial index out of range).
    /// Raised before the terminal is touched.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Ctrl-C was pressed while the menu owned the keyboard.
    #[error("interrupted by user")]
    Interrupted,

    /// Standard input reached end-of-file while waiting for a key.
    #[error("input closed before a choice was made")]
    InputClosed,

    /// Terminal read or write failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}
