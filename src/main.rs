//! menu-installer CLI
//!
//! Launch with no arguments to get the interactive menu. Flags only
//! override where sources come from and where the binary goes.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use menu_installer::dispatch::{self, TerminalChooser};
use menu_installer::logging;
use menu_installer::session;
use menu_installer::types::{
    InstallConfig, SourceLocation, binary_name_from_dir, binary_name_from_repo, default_data_dir,
    default_install_dir,
};

#[derive(Parser)]
#[command(name = "installer")]
#[command(about = "Interactively install or uninstall a Cargo-built tool")]
#[command(version)]
struct Cli {
    /// Local source tree to build (default: current directory)
    #[arg(long, conflicts_with = "repo")]
    source: Option<PathBuf>,

    /// Git repository to clone and build instead of a local tree
    #[arg(long)]
    repo: Option<String>,

    /// Name of the binary to install (default: derived from the source)
    #[arg(long)]
    binary: Option<String>,

    /// Destination directory (default: ~/.local/bin)
    #[arg(long)]
    install_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&logging::default_log_path(), cli.verbose) {
        eprintln!("Note: logging disabled: {}", e);
    }

    let config = match resolve_config(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(?config, "starting installer");

    if let Err(e) = session::begin_session() {
        session::teardown("");
        eprintln!("Error: could not prepare the terminal: {}", e);
        return ExitCode::FAILURE;
    }

    let farewell = dispatch::run(&mut TerminalChooser, &config);
    session::end_session(farewell.as_deref())
}

// ============================================================================
// CONFIG RESOLUTION
// ============================================================================

/// Turn CLI flags into a complete config, filling in defaults.
fn resolve_config(cli: Cli) -> Result<InstallConfig, String> {
    let source = match cli.repo {
        Some(url) => SourceLocation::Git(url),
        None => match cli.source {
            Some(dir) => SourceLocation::Local(dir),
            None => SourceLocation::Local(std::env::current_dir().map_err(|e| e.to_string())?),
        },
    };

    let binary = match cli.binary {
        Some(name) => name,
        None => derive_binary_name(&source)
            .ok_or("could not derive a binary name from the source; pass --binary")?,
    };

    let install_dir = cli
        .install_dir
        .or_else(default_install_dir)
        .ok_or("could not determine an install directory; pass --install-dir")?;

    Ok(InstallConfig {
        source,
        binary,
        install_dir,
        receipt_dir: default_data_dir(),
    })
}

fn derive_binary_name(source: &SourceLocation) -> Option<String> {
    match source {
        SourceLocation::Git(url) => binary_name_from_repo(url),
        SourceLocation::Local(dir) => {
            binary_name_from_dir(&dir.canonicalize().unwrap_or_else(|_| dir.clone()))
        }
    }
}
