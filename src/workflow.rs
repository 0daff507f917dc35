//! Install and uninstall workflows.
//!
//! Structure:
//! - Pure functions: step planning, artifact paths, stderr tails
//! - Effect functions: running git/cargo, placing the binary, receipts
//!
//! Child process output is captured and logged, never printed, so it
//! cannot scribble over the spinner.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::hash::{self, hash_file};
use crate::receipt::{ReceiptError, load_manifest, now_unix, save_manifest};
use crate::types::{BuildProfile, InstallConfig, InstallReceipt, SourceLocation};

/// How many stderr lines of a failed command are kept for the user.
const STDERR_TAIL_LINES: usize = 8;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("could not start `{program}`: {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` failed with {status}")]
    CommandFailed {
        program: String,
        status: String,
        stderr_tail: String,
    },

    #[error("build finished but {} was not produced", .path.display())]
    MissingArtifact { path: PathBuf },

    #[error("{binary} was not installed by this installer")]
    NotInstalled { binary: String },

    #[error("{} changed since it was installed; leaving it in place", .path.display())]
    Modified { path: PathBuf },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("could not update install receipts: {0}")]
    Manifest(#[from] ReceiptError),
}

impl WorkflowError {
    /// Last lines of stderr for failed commands, if any.
    pub fn stderr_tail(&self) -> Option<&str> {
        match self {
            WorkflowError::CommandFailed { stderr_tail, .. } if !stderr_tail.is_empty() => {
                Some(stderr_tail)
            }
            _ => None,
        }
    }
}

// ============================================================================
// PURE FUNCTIONS (Planning)
// ============================================================================

/// One externally visible install step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Clone { url: String, dest: PathBuf },
    Build { dir: PathBuf, profile: BuildProfile },
    Copy { from: PathBuf, to: PathBuf },
}

impl Step {
    /// Short human description for the spinner and the log.
    pub fn describe(&self) -> String {
        match self {
            Step::Clone { url, .. } => format!("Cloning {}", url),
            Step::Build { profile, .. } => format!("Compiling ({} build)", profile),
            Step::Copy { to, .. } => format!("Installing to {}", to.display()),
        }
    }
}

/// Where cargo leaves the binary for `profile`.
pub fn artifact_path(checkout: &Path, profile: BuildProfile, binary: &str) -> PathBuf {
    checkout
        .join("target")
        .join(profile.target_subdir())
        .join(binary)
}

/// Steps to build `checkout` (cloning it first if `clone_from` is set)
/// and copy the result to the configured install path.
pub fn install_plan(
    checkout: &Path,
    clone_from: Option<&str>,
    profile: BuildProfile,
    config: &InstallConfig,
) -> Vec<Step> {
    let mut steps = Vec::with_capacity(3);
    if let Some(url) = clone_from {
        steps.push(Step::Clone {
            url: url.to_string(),
            dest: checkout.to_path_buf(),
        });
    }
    steps.push(Step::Build {
        dir: checkout.to_path_buf(),
        profile,
    });
    steps.push(Step::Copy {
        from: artifact_path(checkout, profile, &config.binary),
        to: config.install_path(),
    });
    steps
}

/// Last `n` non-blank lines of `text`, joined with newlines.
pub fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

// ============================================================================
// EFFECT FUNCTIONS (Workflows)
// ============================================================================

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Build from source and install the binary, recording a receipt.
pub fn install(config: &InstallConfig, profile: BuildProfile) -> Result<InstallReceipt, WorkflowError> {
    // The scratch dir must outlive the build; dropped (and deleted) on return
    let (checkout, clone_from, _scratch) = match &config.source {
        SourceLocation::Local(dir) => (dir.clone(), None, None),
        SourceLocation::Git(url) => {
            let scratch = tempfile::Builder::new().prefix("menu-installer-").tempdir()?;
            let checkout = scratch.path().join(&config.binary);
            (checkout, Some(url.as_str()), Some(scratch))
        }
    };

    let plan = install_plan(&checkout, clone_from, profile, config);
    let pb = spinner("Preparing...");
    for step in &plan {
        let description = step.describe();
        info!(step = %description, "install step");
        pb.set_message(description);
        if let Err(e) = run_step(step) {
            pb.finish_and_clear();
            warn!(error = %e, "install step failed");
            return Err(e);
        }
    }
    pb.finish_and_clear();

    let installed_path = config.install_path();
    let receipt = InstallReceipt {
        binary: config.binary.clone(),
        hash: hash_file(&installed_path)?,
        size_bytes: fs::metadata(&installed_path)?.len(),
        installed_path,
        profile,
        source: config.source.to_string(),
        installed_at: now_unix(),
    };

    let mut manifest = load_manifest(&config.receipt_dir)?;
    manifest.record(receipt.clone());
    save_manifest(&manifest, &config.receipt_dir)?;

    info!(path = %receipt.installed_path.display(), size = receipt.size_bytes, "installed");
    Ok(receipt)
}

/// Remove the binary recorded in the receipt, if it is unchanged.
pub fn uninstall(config: &InstallConfig) -> Result<InstallReceipt, WorkflowError> {
    let mut manifest = load_manifest(&config.receipt_dir)?;
    let receipt = manifest
        .find(&config.binary)
        .cloned()
        .ok_or_else(|| WorkflowError::NotInstalled {
            binary: config.binary.clone(),
        })?;

    match hash::matches(&receipt.installed_path, &receipt.hash) {
        Ok(true) => {
            fs::remove_file(&receipt.installed_path)?;
            info!(path = %receipt.installed_path.display(), "removed");
        }
        Ok(false) => {
            return Err(WorkflowError::Modified {
                path: receipt.installed_path,
            });
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %receipt.installed_path.display(), "already gone; dropping receipt");
        }
        Err(e) => return Err(e.into()),
    }

    manifest.remove(&config.binary);
    save_manifest(&manifest, &config.receipt_dir)?;
    Ok(receipt)
}

fn run_step(step: &Step) -> Result<(), WorkflowError> {
    match step {
        Step::Clone { url, dest } => run_command(
            Command::new("git")
                .args(["clone", "--depth", "1", "--quiet"])
                .arg(url)
                .arg(dest),
        ),
        Step::Build { dir, profile } => run_command(
            Command::new("cargo")
                .arg("build")
                .args(profile.cargo_args())
                // artifact_path expects the default target dir
                .env_remove("CARGO_TARGET_DIR")
                .env_remove("CARGO_BUILD_TARGET_DIR")
                .current_dir(dir),
        ),
        Step::Copy { from, to } => place_binary(from, to),
    }
}

/// Run a command to completion, capturing its output.
pub fn run_command(cmd: &mut Command) -> Result<(), WorkflowError> {
    let name = cmd.get_program().to_string_lossy().into_owned();
    let program = std::iter::once(name.clone())
        .chain(cmd.get_args().map(|a| a.to_string_lossy().into_owned()))
        .collect::<Vec<_>>()
        .join(" ");
    debug!(command = %program, "spawning");

    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|source| WorkflowError::CommandSpawn {
            program: name,
            source,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stdout.lines().chain(stderr.lines()) {
        debug!(target: "child", "{}", line);
    }

    if output.status.success() {
        Ok(())
    } else {
        Err(WorkflowError::CommandFailed {
            program,
            status: output.status.to_string(),
            stderr_tail: tail_lines(&stderr, STDERR_TAIL_LINES),
        })
    }
}

/// Copy `from` to `to` as an executable, replacing any existing file
/// atomically (a running binary is never truncated in place).
pub fn place_binary(from: &Path, to: &Path) -> Result<(), WorkflowError> {
    if !from.is_file() {
        return Err(WorkflowError::MissingArtifact {
            path: from.to_path_buf(),
        });
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }

    let name = to
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = to.with_file_name(format!(".{}.partial", name));

    fs::copy(from, &staging)?;
    let placed = fs::set_permissions(&staging, fs::Permissions::from_mode(0o755))
        .and_then(|()| fs::rename(&staging, to));
    if let Err(e) = placed {
        if let Err(cleanup) = fs::remove_file(&staging) {
            debug!(path = %staging.display(), error = %cleanup, "staging file left behind");
        }
        return Err(e.into());
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
