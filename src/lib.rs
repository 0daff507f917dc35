//! menu-installer: interactive terminal installer for a Cargo-built tool.

pub mod dispatch;
pub mod hash;
pub mod logging;
pub mod menu;
pub mod receipt;
pub mod session;
pub mod types;
pub mod workflow;
