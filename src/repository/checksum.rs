//! MD5 checksum of the combined manifest.

use std::path::Path;

use md5::{Digest, Md5};

use crate::error::{RepoError, Result};

/// Lowercase hex MD5 of `bytes`.
#[must_use]
pub fn md5_hex(bytes: &[u8]) -> String {
    format!("{:x}", Md5::digest(bytes))
}

/// Hash the bytes currently stored at `manifest` and write the digest to `checksum`.
///
/// The digest is always taken from the file as saved, never from an
/// in-memory copy.
pub fn write_checksum(manifest: &Path, checksum: &Path) -> Result<String> {
    let bytes = std::fs::read(manifest).map_err(|err| RepoError::ChecksumFailed {
        path: manifest.to_path_buf(),
        reason: format!("read: {err}"),
    })?;
    let digest = md5_hex(&bytes);
    std::fs::write(checksum, digest.as_bytes()).map_err(|err| RepoError::ChecksumFailed {
        path: checksum.to_path_buf(),
        reason: format!("write: {err}"),
    })?;
    Ok(digest)
}

/// Re-hash `manifest` and compare against the stored digest.
pub fn verify_checksum(manifest: &Path, checksum: &Path) -> Result<bool> {
    let stored = std::fs::read_to_string(checksum)?;
    let actual = md5_hex(&std::fs::read(manifest)?);
    Ok(stored.trim() == actual)
}
