//! Add-on discovery, manifests and versions.

pub mod manifest;
pub mod version;

use std::path::{Path, PathBuf};

pub use manifest::{AddonManifest, MANIFEST_FILENAME, VersionSource};
pub use version::{AddonVersion, ArchiveName, archive_file_name};

use crate::config::Config;
use crate::error::{RepoError, Result};

/// An add-on folder under the add-ons root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addon {
    /// Folder name; the add-on's identity in archive names and entry paths.
    pub name: String,
    pub path: PathBuf,
}

impl Addon {
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.path.join(MANIFEST_FILENAME)
    }

    pub fn load_manifest(&self) -> Result<AddonManifest> {
        AddonManifest::load(&self.path)
    }
}

/// Result of scanning the add-ons root.
#[derive(Debug, Clone, Default)]
pub struct AddonScan {
    /// Eligible add-ons in folder-name order.
    pub addons: Vec<Addon>,
    /// Selected folders skipped because they hold no `addon.xml`.
    pub missing_manifest: Vec<PathBuf>,
}

/// Scan the add-ons root for eligible add-ons.
///
/// A folder is eligible when it is a real directory, not reserved, selected by
/// the allow-list, and contains an `addon.xml`. Selected folders without a
/// manifest are returned separately so the caller decides how to report them.
pub fn scan_addons(config: &Config) -> Result<AddonScan> {
    let root = config.paths.addons_root();
    if !root.is_dir() {
        return Err(RepoError::NotFound(format!(
            "add-ons root {}",
            root.display()
        )));
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(&root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(ToString::to_string) else {
            tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 folder name");
            continue;
        };
        names.push(name);
    }
    names.sort();

    let mut scan = AddonScan::default();
    for name in names {
        if config.paths.is_reserved_folder(&name) || !config.addons.is_selected(&name) {
            continue;
        }
        let path = root.join(&name);
        if has_manifest(&path) {
            scan.addons.push(Addon { name, path });
        } else {
            scan.missing_manifest.push(path);
        }
    }
    Ok(scan)
}

/// Eligible add-ons in folder-name order, noting skipped folders at debug level.
pub fn discover_addons(config: &Config) -> Result<Vec<Addon>> {
    let scan = scan_addons(config)?;
    for path in &scan.missing_manifest {
        tracing::debug!(path = %path.display(), "skipping folder without {MANIFEST_FILENAME}");
    }
    Ok(scan.addons)
}

fn has_manifest(path: &Path) -> bool {
    path.join(MANIFEST_FILENAME).is_file()
}
