//! BLAKE3 hashing of installed binaries.
//!
//! Install records the hash; uninstall checks it so a binary replaced by
//! something else since install is never deleted.

use std::fs::File;
use std::io;
use std::path::Path;

use crate::types::ContentHash;

/// Hash a file's contents.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn hash_file(path: &Path) -> io::Result<ContentHash> {
    let mut hasher = blake3::Hasher::new();
    hasher.update_reader(File::open(path)?)?;
    Ok(ContentHash(*hasher.finalize().as_bytes()))
}

/// True if the file at `path` still has the recorded hash.
pub fn matches(path: &Path, expected: &ContentHash) -> io::Result<bool> {
    Ok(hash_file(path)? == *expected)
}
