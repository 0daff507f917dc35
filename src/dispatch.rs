//! Action dispatcher: menu choices -> workflow -> farewell message.
//!
//! The dispatcher never ends the session itself. It returns the farewell
//! text and the caller hands it to `session::end_session`, so there is one
//! exit path and no menu is drawn after it.

use std::io;

use humansize::{BINARY, format_size};
use tracing::{debug, info, warn};

use crate::menu::{MenuError, run_prompted_menu, view};
use crate::types::{BuildProfile, InstallConfig, InstallReceipt};
use crate::workflow::{self, WorkflowError};

pub const MAIN_PROMPT: &str = "What would you like to do?";
pub const MAIN_OPTIONS: [&str; 3] = ["Install", "Uninstall", "Exit"];

pub const INSTALL_PROMPT: &str = "How would you like to install?";
pub const INSTALL_OPTIONS: [&str; 3] = [
    "Download a prebuilt binary",
    "Compile from source",
    "Compile from source (debug build)",
];

const DOWNLOAD_UNAVAILABLE: &str =
    "Prebuilt binaries are not published yet. Choose \"Compile from source\" instead.";

/// What the user asked for, after all menus have been answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Download,
    Build(BuildProfile),
    Uninstall,
    Exit,
}

// ============================================================================
// CHOOSING
// ============================================================================

/// Something that can ask the user to pick one of `options`.
pub trait Chooser {
    fn choose(&mut self, prompt: &str, options: &[&str]) -> Result<usize, MenuError>;
}

/// Interactive chooser backed by the terminal menu. Always starts on the
/// first option.
#[derive(Debug, Default)]
pub struct TerminalChooser;

impl Chooser for TerminalChooser {
    fn choose(&mut self, prompt: &str, options: &[&str]) -> Result<usize, MenuError> {
        run_prompted_menu(Some(prompt), 0, options)
    }
}

/// Run the top-level menu and, for Install, the nested install menu.
pub fn resolve<C: Chooser>(chooser: &mut C) -> Result<Action, MenuError> {
    match chooser.choose(MAIN_PROMPT, &MAIN_OPTIONS)? {
        0 => {
            let method = chooser.choose(INSTALL_PROMPT, &INSTALL_OPTIONS)?;
            install_action(method)
        }
        1 => Ok(Action::Uninstall),
        2 => Ok(Action::Exit),
        other => Err(unmapped(other)),
    }
}

fn install_action(index: usize) -> Result<Action, MenuError> {
    match index {
        0 => Ok(Action::Download),
        1 => Ok(Action::Build(BuildProfile::Release)),
        2 => Ok(Action::Build(BuildProfile::Debug)),
        other => Err(unmapped(other)),
    }
}

fn unmapped(index: usize) -> MenuError {
    MenuError::InvalidArgument(format!("no action for menu index {}", index))
}

// ============================================================================
// EXECUTING
// ============================================================================

/// Run the workflow for `action`. Returns the farewell text; `None` means
/// the default farewell.
pub fn execute(action: Action, config: &InstallConfig) -> Option<String> {
    info!(?action, "dispatching");
    match action {
        Action::Exit => None,
        Action::Download => Some(DOWNLOAD_UNAVAILABLE.to_string()),
        Action::Build(profile) => Some(match workflow::install(config, profile) {
            Ok(receipt) => installed_message(&receipt),
            Err(e) => failure_message("Installation", &e),
        }),
        Action::Uninstall => Some(match workflow::uninstall(config) {
            Ok(receipt) => format!("Removed {}.", receipt.installed_path.display()),
            Err(WorkflowError::NotInstalled { binary }) => format!(
                "Nothing to uninstall: {} was not installed by this installer.",
                binary
            ),
            Err(e) => failure_message("Uninstall", &e),
        }),
    }
}

/// Resolve the user's choice and run it. Returns the farewell text.
pub fn run<C: Chooser>(chooser: &mut C, config: &InstallConfig) -> Option<String> {
    let action = match resolve(chooser) {
        Ok(action) => action,
        Err(MenuError::Interrupted) => {
            info!("interrupted from menu");
            return None;
        }
        Err(e) => {
            warn!(error = %e, "menu failed");
            return Some(format!("Nothing was changed: {}", e));
        }
    };

    if let Err(e) = view::clear(&mut io::stdout()) {
        debug!(error = %e, "could not clear menu");
    }
    execute(action, config)
}

fn installed_message(receipt: &InstallReceipt) -> String {
    format!(
        "Installed {} ({} build, {}) to {}.",
        receipt.binary,
        receipt.profile,
        format_size(receipt.size_bytes, BINARY),
        receipt.installed_path.display()
    )
}

fn failure_message(what: &str, error: &WorkflowError) -> String {
    match error.stderr_tail() {
        Some(tail) => format!("{} failed: {}\n\n{}", what, error, tail),
        None => format!("{} failed: {}", what, error),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::path::PathBuf;

    use crate::types::{ContentHash, SourceLocation};
    use tempfile::TempDir;

    /// Answers menus from a fixed list and records what was asked.
    struct Scripted {
        answers: VecDeque<Result<usize, MenuError>>,
        asked: Vec<String>,
    }

    impl Scripted {
        fn new(answers: Vec<Result<usize, MenuError>>) -> Self {
            Scripted {
                answers: answers.into(),
                asked: Vec::new(),
            }
        }
    }

    impl Chooser for Scripted {
        fn choose(&mut self, prompt: &str, options: &[&str]) -> Result<usize, MenuError> {
            assert!(!options.is_empty());
            self.asked.push(prompt.to_string());
            self.answers.pop_front().expect("unexpected extra menu")
        }
    }

    fn config(root: &std::path::Path) -> InstallConfig {
        InstallConfig {
            source: SourceLocation::Local(root.join("src")),
            binary: "widget".to_string(),
            install_dir: root.join("bin"),
            receipt_dir: root.join("data"),
        }
    }

    #[test]
    fn exit_choice_resolves_without_nested_menu() {
        let mut chooser = Scripted::new(vec![Ok(2)]);
        assert_eq!(resolve(&mut chooser).unwrap(), Action::Exit);
        assert_eq!(chooser.asked, vec![MAIN_PROMPT]);
    }

    #[test]
    fn uninstall_choice() {
        let mut chooser = Scripted::new(vec![Ok(1)]);
        assert_eq!(resolve(&mut chooser).unwrap(), Action::Uninstall);
    }

    #[test]
    fn install_opens_nested_menu() {
        let mut chooser = Scripted::new(vec![Ok(0), Ok(1)]);
        assert_eq!(
            resolve(&mut chooser).unwrap(),
            Action::Build(BuildProfile::Release)
        );
        assert_eq!(chooser.asked, vec![MAIN_PROMPT, INSTALL_PROMPT]);
    }

    #[test]
    fn install_methods_map_in_order() {
        for (index, expected) in [
            (0, Action::Download),
            (1, Action::Build(BuildProfile::Release)),
            (2, Action::Build(BuildProfile::Debug)),
        ] {
            let mut chooser = Scripted::new(vec![Ok(0), Ok(index)]);
            assert_eq!(resolve(&mut chooser).unwrap(), expected);
        }
    }

    #[test]
    fn unknown_index_is_invalid() {
        let mut chooser = Scripted::new(vec![Ok(7)]);
        assert!(matches!(
            resolve(&mut chooser),
            Err(MenuError::InvalidArgument(_))
        ));
    }

    #[test]
    fn interrupt_in_nested_menu_propagates() {
        let mut chooser = Scripted::new(vec![Ok(0), Err(MenuError::Interrupted)]);
        assert!(matches!(resolve(&mut chooser), Err(MenuError::Interrupted)));
    }

    #[test]
    fn exit_uses_default_farewell() {
        let dir = TempDir::new().unwrap();
        assert_eq!(execute(Action::Exit, &config(dir.path())), None);
    }

    #[test]
    fn download_explains_placeholder() {
        let dir = TempDir::new().unwrap();
        let message = execute(Action::Download, &config(dir.path())).unwrap();
        assert!(message.contains("Compile from source"));
    }

    #[test]
    fn uninstall_with_nothing_installed() {
        let dir = TempDir::new().unwrap();
        let message = execute(Action::Uninstall, &config(dir.path())).unwrap();
        assert!(message.starts_with("Nothing to uninstall: widget"));
    }

    #[test]
    fn failed_build_reports_failure() {
        let dir = TempDir::new().unwrap();
        let message = execute(Action::Build(BuildProfile::Debug), &config(dir.path())).unwrap();
        assert!(message.starts_with("Installation failed:"));
    }

    #[test]
    fn installed_message_mentions_size_and_path() {
        let receipt = InstallReceipt {
            binary: "widget".to_string(),
            installed_path: PathBuf::from("/opt/bin/widget"),
            hash: ContentHash([0; 32]),
            size_bytes: 2048,
            profile: BuildProfile::Release,
            source: ".".to_string(),
            installed_at: 0,
        };
        assert_eq!(
            installed_message(&receipt),
            "Installed widget (release build, 2 KiB) to /opt/bin/widget."
        );
    }

    #[test]
    fn failure_message_appends_stderr_tail() {
        let error = WorkflowError::CommandFailed {
            program: "cargo build".to_string(),
            status: "exit status: 101".to_string(),
            stderr_tail: "error[E0425]: cannot find value".to_string(),
        };
        let message = failure_message("Installation", &error);
        assert!(message.starts_with("Installation failed: `cargo build` failed with exit status: 101"));
        assert!(message.ends_with("error[E0425]: cannot find value"));
    }
}
