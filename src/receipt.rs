//! Install receipts: what was installed, where, and with which hash.
//!
//! Stored as pretty JSON at `<receipt dir>/receipt.json`. A missing file
//! reads as an empty manifest.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::types::Manifest;

/// Current manifest format version.
const MANIFEST_VERSION: u32 = 1;

const MANIFEST_FILENAME: &str = "receipt.json";

#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("invalid receipt file {}: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub fn manifest_path(receipt_dir: &Path) -> PathBuf {
    receipt_dir.join(MANIFEST_FILENAME)
}

/// Seconds since the Unix epoch.
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Load the manifest, or an empty one if none has been written yet.
pub fn load_manifest(receipt_dir: &Path) -> Result<Manifest, ReceiptError> {
    let path = manifest_path(receipt_dir);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(Manifest {
                version: MANIFEST_VERSION,
                installed: Vec::new(),
            });
        }
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&contents).map_err(|source| ReceiptError::Format { path, source })
}

/// Write the manifest. An empty manifest removes the file instead.
pub fn save_manifest(manifest: &Manifest, receipt_dir: &Path) -> Result<(), ReceiptError> {
    let path = manifest_path(receipt_dir);

    if manifest.installed.is_empty() {
        return match fs::remove_file(&path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        };
    }

    fs::create_dir_all(receipt_dir)?;
    let versioned = Manifest {
        version: MANIFEST_VERSION,
        installed: manifest.installed.clone(),
    };
    let contents = serde_json::to_string_pretty(&versioned).map_err(|source| {
        ReceiptError::Format {
            path: path.clone(),
            source,
        }
    })?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BuildProfile, ContentHash, InstallReceipt};
    use tempfile::TempDir;

    fn receipt(binary: &str) -> InstallReceipt {
        InstallReceipt {
            binary: binary.to_string(),
            installed_path: PathBuf::from("/opt/bin").join(binary),
            hash: ContentHash([1; 32]),
            size_bytes: 4096,
            profile: BuildProfile::Debug,
            source: "https://example.com/org/tool.git".to_string(),
            installed_at: 42,
        }
    }

    #[test]
    fn missing_manifest_loads_empty() {
        let dir = TempDir::new().unwrap();
        let manifest = load_manifest(dir.path()).unwrap();
        assert!(manifest.installed.is_empty());
        assert_eq!(manifest.version, MANIFEST_VERSION);
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut manifest = Manifest::default();
        manifest.record(receipt("tool"));

        save_manifest(&manifest, &nested).unwrap();
        let loaded = load_manifest(&nested).unwrap();

        assert_eq!(loaded.version, MANIFEST_VERSION);
        assert_eq!(loaded.installed, manifest.installed);
    }

    #[test]
    fn saving_empty_manifest_removes_file() {
        let dir = TempDir::new().unwrap();
        let mut manifest = Manifest::default();
        manifest.record(receipt("tool"));
        save_manifest(&manifest, dir.path()).unwrap();
        assert!(manifest_path(dir.path()).exists());

        manifest.remove("tool");
        save_manifest(&manifest, dir.path()).unwrap();
        assert!(!manifest_path(dir.path()).exists());
    }

    #[test]
    fn saving_empty_manifest_without_file_is_fine() {
        let dir = TempDir::new().unwrap();
        save_manifest(&Manifest::default(), dir.path()).unwrap();
    }

    #[test]
    fn corrupt_manifest_is_a_format_error() {
        let dir = TempDir::new().unwrap();
        fs::write(manifest_path(dir.path()), "{ not json").unwrap();
        let err = load_manifest(dir.path()).unwrap_err();
        match &err {
            ReceiptError::Format { path, .. } => assert_eq!(path, &manifest_path(dir.path())),
            other => panic!("expected Format, got {:?}", other),
        }
        assert!(err.to_string().starts_with("invalid receipt file"));
    }

    #[test]
    fn unreadable_manifest_is_io_error() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be
        fs::create_dir(manifest_path(dir.path())).unwrap();
        assert!(matches!(load_manifest(dir.path()), Err(ReceiptError::Io(_))));
    }
}
