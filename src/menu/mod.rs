//! Single-choice terminal menu.
//!
//! Organized along FP/Unix boundaries:
//! - `state`: pure data types (MenuState, KeyEvent, Transition)
//! - `decode`: pure byte -> key decoding state machine
//! - `update`: pure transitions
//! - `view`: pure rendering to bytes
//! - `input`, `run`: effects (raw mode, reads, writes)

pub mod decode;
pub mod error;
pub mod input;
pub mod run;
pub mod state;
pub mod theme;
pub mod update;
pub mod view;

pub use error::MenuError;
pub use run::{run_menu, run_prompted_menu};
pub use state::{KeyEvent, MenuState};
