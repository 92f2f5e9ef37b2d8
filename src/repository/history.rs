//! Lookup of manifests stored in previously built archives.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::addon::{AddonManifest, AddonVersion, ArchiveName, MANIFEST_FILENAME, VersionSource};
use crate::error::{RepoError, Result};

/// A manifest recovered from an archive built by an earlier run.
#[derive(Debug, Clone, Serialize)]
pub struct HistoricalManifest {
    pub archive: PathBuf,
    pub version: AddonVersion,
    #[serde(skip)]
    pub text: String,
}

/// Path of the manifest inside an add-on archive.
///
/// The archive builder roots every entry at the add-on folder name, so this
/// is where that folder's `addon.xml` ends up.
#[must_use]
pub fn manifest_entry_name(addon: &str) -> String {
    format!("{addon}/{MANIFEST_FILENAME}")
}

/// Up to `count` archived manifests of `addon`, newest version first.
///
/// A missing zip folder or fewer archives than requested is not an error.
/// An archive that cannot be read, lacks `<addon>/addon.xml`, or whose
/// manifest version disagrees with its file name is a `MalformedArchive`.
pub fn previous_manifests(
    zip_dir: &Path,
    addon: &str,
    count: usize,
    source: VersionSource,
) -> Result<Vec<HistoricalManifest>> {
    if count == 0 || !zip_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(zip_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry
            .file_name()
            .to_str()
            .and_then(|name| ArchiveName::parse(addon, name))
        {
            candidates.push(name);
        }
    }
    candidates.sort_by(|a, b| b.cmp(a));

    let mut manifests = Vec::new();
    for candidate in candidates.into_iter().take(count) {
        let path = zip_dir.join(&candidate.file_name);
        manifests.push(read_archived_manifest(&path, addon, &candidate, source)?);
    }

    tracing::info!(
        addon,
        found = manifests.len(),
        requested = count,
        "Added {} previous versions of {addon} to the combined manifest",
        manifests.len()
    );
    Ok(manifests)
}

fn read_archived_manifest(
    path: &Path,
    addon: &str,
    name: &ArchiveName,
    source: VersionSource,
) -> Result<HistoricalManifest> {
    let malformed = |reason: String| RepoError::MalformedArchive {
        archive: path.to_path_buf(),
        reason,
    };

    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(|err| malformed(err.to_string()))?;
    let entry_name = manifest_entry_name(addon);
    let mut entry = match archive.by_name(&entry_name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Err(malformed(format!("missing {entry_name}"))),
        Err(err) => return Err(malformed(err.to_string())),
    };

    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .map_err(|err| malformed(format!("{entry_name} is not UTF-8 text: {err}")))?;

    let manifest =
        AddonManifest::parse(&text).map_err(|err| malformed(format!("{entry_name}: {err}")))?;
    let version = manifest
        .version(source)
        .map_err(|err| malformed(format!("{entry_name}: {err}")))?;

    if let Some(expected) = &name.version {
        if expected != &version {
            return Err(malformed(format!(
                "file name says version {expected} but {entry_name} says {version}"
            )));
        }
    }

    Ok(HistoricalManifest {
        archive: path.to_path_buf(),
        version,
        text,
    })
}
