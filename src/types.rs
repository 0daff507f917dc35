//! Domain types for menu-installer.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Directory name used under the user's data dir for receipts and logs.
pub const APP_NAME: &str = "menu-installer";

// ============================================================================
// PRIMITIVES
// ============================================================================

/// BLAKE3 digest of an installed binary. Serialized as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn from_hex(hex: &str) -> Result<Self, String> {
        if hex.len() != 64 {
            return Err(format!("expected 64 hex chars, got {}", hex.len()));
        }
        let mut bytes = [0u8; 32];
        for (slot, pair) in bytes.iter_mut().zip(hex.as_bytes().chunks(2)) {
            let pair = std::str::from_utf8(pair).map_err(|e| e.to_string())?;
            *slot = u8::from_str_radix(pair, 16).map_err(|e| e.to_string())?;
        }
        Ok(ContentHash(bytes))
    }
}

impl Serialize for ContentHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        ContentHash::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// ENUMS
// ============================================================================

/// Cargo build profile used to produce the installed binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildProfile {
    Release,
    Debug,
}

impl BuildProfile {
    /// Extra `cargo build` arguments for this profile.
    pub fn cargo_args(self) -> &'static [&'static str] {
        match self {
            BuildProfile::Release => &["--release"],
            BuildProfile::Debug => &[],
        }
    }

    /// Subdirectory of `target/` holding the artifact.
    pub fn target_subdir(self) -> &'static str {
        match self {
            BuildProfile::Release => "release",
            BuildProfile::Debug => "debug",
        }
    }
}

impl fmt::Display for BuildProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.target_subdir())
    }
}

/// Where the sources come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// An existing checkout on disk.
    Local(PathBuf),
    /// A git URL, cloned into a scratch directory for the build.
    Git(String),
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Local(path) => write!(f, "{}", path.display()),
            SourceLocation::Git(url) => f.write_str(url),
        }
    }
}

// ============================================================================
// STRUCTS
// ============================================================================

/// Record of one installed binary, used by uninstall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReceipt {
    /// Binary name (also the lookup key).
    pub binary: String,
    /// Where the binary was placed.
    pub installed_path: PathBuf,
    /// Content hash at install time. Uninstall refuses to delete on mismatch.
    pub hash: ContentHash,
    pub size_bytes: u64,
    pub profile: BuildProfile,
    /// Source the binary was built from (path or URL).
    pub source: String,
    /// Seconds since the Unix epoch.
    pub installed_at: u64,
}

/// The receipt file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub installed: Vec<InstallReceipt>,
}

impl Manifest {
    pub fn find(&self, binary: &str) -> Option<&InstallReceipt> {
        self.installed.iter().find(|r| r.binary == binary)
    }

    /// Insert or replace the receipt for `receipt.binary`.
    pub fn record(&mut self, receipt: InstallReceipt) {
        self.installed.retain(|r| r.binary != receipt.binary);
        self.installed.push(receipt);
    }

    pub fn remove(&mut self, binary: &str) -> Option<InstallReceipt> {
        let index = self.installed.iter().position(|r| r.binary == binary)?;
        Some(self.installed.remove(index))
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Everything the workflows need to know, resolved from CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallConfig {
    pub source: SourceLocation,
    /// Name of the binary cargo produces and that gets installed.
    pub binary: String,
    /// Destination directory for the binary.
    pub install_dir: PathBuf,
    /// Directory holding `receipt.json`.
    pub receipt_dir: PathBuf,
}

impl InstallConfig {
    /// Full path of the installed binary.
    pub fn install_path(&self) -> PathBuf {
        self.install_dir.join(&self.binary)
    }
}

/// Per-user directory for receipts and logs.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default binary destination: the platform executable dir, else `~/.local/bin`.
pub fn default_install_dir() -> Option<PathBuf> {
    dirs::executable_dir().or_else(|| dirs::home_dir().map(|home| home.join(".local").join("bin")))
}

/// Binary name implied by a repository URL: last path segment minus `.git`.
pub fn binary_name_from_repo(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Binary name implied by a source directory: its final component.
pub fn binary_name_from_dir(dir: &Path) -> Option<String> {
    dir.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(binary: &str, size: u64) -> InstallReceipt {
        InstallReceipt {
            binary: binary.to_string(),
            installed_path: PathBuf::from("/usr/local/bin").join(binary),
            hash: ContentHash([7; 32]),
            size_bytes: size,
            profile: BuildProfile::Release,
            source: "/src".to_string(),
            installed_at: 1_700_000_000,
        }
    }

    #[test]
    fn content_hash_hex_roundtrip() {
        let hash = ContentHash([0xab; 32]);
        assert_eq!(hash.to_hex().len(), 64);
        assert_eq!(ContentHash::from_hex(&hash.to_hex()).unwrap(), hash);
    }

    #[test]
    fn content_hash_rejects_bad_hex() {
        assert!(ContentHash::from_hex("abc").is_err());
        assert!(ContentHash::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn receipt_serializes_hash_as_hex_and_profile_lowercase() {
        let json = serde_json::to_string(&receipt("tool", 1)).unwrap();
        assert!(json.contains(&"07".repeat(32)));
        assert!(json.contains("\"release\""));
    }

    #[test]
    fn profile_paths_and_args() {
        assert_eq!(BuildProfile::Release.cargo_args(), &["--release"]);
        assert!(BuildProfile::Debug.cargo_args().is_empty());
        assert_eq!(BuildProfile::Debug.target_subdir(), "debug");
    }

    #[test]
    fn manifest_record_replaces_same_binary() {
        let mut manifest = Manifest::default();
        manifest.record(receipt("tool", 1));
        manifest.record(receipt("other", 2));
        manifest.record(receipt("tool", 3));

        assert_eq!(manifest.installed.len(), 2);
        assert_eq!(manifest.find("tool").unwrap().size_bytes, 3);
    }

    #[test]
    fn manifest_remove_returns_receipt() {
        let mut manifest = Manifest::default();
        manifest.record(receipt("tool", 1));
        assert!(manifest.remove("tool").is_some());
        assert!(manifest.remove("tool").is_none());
        assert!(manifest.find("tool").is_none());
    }

    #[test]
    fn binary_name_from_https_repo() {
        assert_eq!(
            binary_name_from_repo("https://example.com/org/widget.git").as_deref(),
            Some("widget")
        );
        assert_eq!(
            binary_name_from_repo("https://example.com/org/widget/").as_deref(),
            Some("widget")
        );
    }

    #[test]
    fn binary_name_from_scp_style_repo() {
        assert_eq!(
            binary_name_from_repo("git@example.com:widget.git").as_deref(),
            Some("widget")
        );
    }

    #[test]
    fn binary_name_from_empty_repo_is_none() {
        assert_eq!(binary_name_from_repo(""), None);
        assert_eq!(binary_name_from_repo("https://example.com/.git"), None);
    }

    #[test]
    fn binary_name_from_dir_uses_last_component() {
        assert_eq!(
            binary_name_from_dir(Path::new("/home/me/code/widget")).as_deref(),
            Some("widget")
        );
        assert_eq!(binary_name_from_dir(Path::new("/")), None);
    }

    #[test]
    fn install_path_joins_dir_and_binary() {
        let config = InstallConfig {
            source: SourceLocation::Local(PathBuf::from("/src/widget")),
            binary: "widget".to_string(),
            install_dir: PathBuf::from("/opt/bin"),
            receipt_dir: PathBuf::from("/data"),
        };
        assert_eq!(config.install_path(), PathBuf::from("/opt/bin/widget"));
    }
}
