//! Versioned zip bundles of add-on source trees.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::{DirEntry, WalkDir};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::addon::{Addon, AddonVersion, archive_file_name, discover_addons};
use crate::config::Config;
use crate::error::{FailurePolicy, RepoError, Result};
use crate::utils::fs::{ensure_dir, is_hidden, remove_if_exists};

use super::aggregate::AddonFailure;
use super::index::write_index;

/// Compiled Python byproducts left out of archives.
pub const COMPILED_EXTENSIONS: &[&str] = &["pyc", "pyo", "pyd"];

#[must_use]
pub fn is_compiled(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| COMPILED_EXTENSIONS.contains(&ext))
}

/// Which directories and files of one add-on go into its archive.
#[derive(Debug, Clone, Copy)]
pub struct EntryFilter<'a> {
    pub excluded_files: &'a [String],
    pub excluded_dirs: &'a [String],
    pub skip_compiled: bool,
}

impl EntryFilter<'_> {
    #[must_use]
    pub fn keep_dir(&self, name: &str) -> bool {
        !is_hidden(name) && !self.excluded_dirs.iter().any(|dir| dir == name)
    }

    #[must_use]
    pub fn keep_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            tracing::warn!(path = %path.display(), "skipping non UTF-8 file name");
            return false;
        };
        if is_hidden(name) || self.excluded_files.iter().any(|file| file == name) {
            return false;
        }
        !(self.skip_compiled && is_compiled(path))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BuiltArchive {
    pub addon: String,
    pub version: AddonVersion,
    pub path: PathBuf,
    /// Entry names written, `/`-separated and rooted at the add-on folder.
    pub entries: Vec<String>,
    pub purged: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveReport {
    pub zip_root: PathBuf,
    pub archives: Vec<BuiltArchive>,
    pub failures: Vec<AddonFailure>,
    pub indexes: Vec<PathBuf>,
}

/// Writes `<zip_root>/<addon>/<addon>-<version>.zip` for each eligible add-on.
pub struct ArchiveBuilder<'a> {
    config: &'a Config,
}

impl<'a> ArchiveBuilder<'a> {
    #[must_use]
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Build archives for every eligible add-on, then the top-level index pages.
    pub fn build_all(&self) -> Result<ArchiveReport> {
        let zip_root = self.config.paths.zip_root();
        ensure_dir(&zip_root)?;

        let mut archives = Vec::new();
        let mut failures = Vec::new();
        let mut indexes = Vec::new();

        for addon in discover_addons(self.config)? {
            match self.build(&addon) {
                Ok((built, index)) => {
                    indexes.extend(index);
                    archives.push(built);
                }
                Err(err) => match self.config.failures.addon_archive {
                    FailurePolicy::Abort => return Err(err),
                    FailurePolicy::Isolate => {
                        tracing::error!(
                            addon = %addon.name,
                            error = %err,
                            detail = ?err,
                            "{} Fail!",
                            addon.path.display()
                        );
                        failures.push(AddonFailure::new(&addon.name, &err));
                    }
                },
            }
        }

        if self.config.archive.html_indexes {
            indexes.push(write_index(&self.config.paths.working_dir)?);
            indexes.push(write_index(&zip_root)?);
        }

        tracing::info!(
            built = archives.len(),
            failed = failures.len(),
            "### Finished zipping ###"
        );

        Ok(ArchiveReport {
            zip_root,
            archives,
            failures,
            indexes,
        })
    }

    /// Build the archive of a single add-on, plus its folder index when enabled.
    pub fn build(&self, addon: &Addon) -> Result<(BuiltArchive, Option<PathBuf>)> {
        let manifest = addon.load_manifest()?;
        let version = manifest.version(self.config.manifest.version_source)?;

        let zip_dir = self.config.paths.addon_zip_dir(&addon.name);
        ensure_dir(&zip_dir)?;

        let purged = if self.config.archive.delete_compiled {
            purge_compiled(&addon.path)?
        } else {
            Vec::new()
        };

        let filter = EntryFilter {
            excluded_files: self.config.addons.excluded_files_for(&addon.name),
            excluded_dirs: self.config.addons.excluded_dirs_for(&addon.name),
            skip_compiled: !self.config.archive.delete_compiled,
        };
        let path = zip_dir.join(archive_file_name(&addon.name, &version));
        let entries = write_archive(&addon.name, &addon.path, &path, &filter).map_err(|err| {
            match err {
                RepoError::Io(_) | RepoError::Zip(_) | RepoError::Walk(_) => {
                    RepoError::ArchiveFailed {
                        addon: addon.name.clone(),
                        reason: err.to_string(),
                    }
                }
                other => other,
            }
        })?;

        let index = if self.config.archive.html_indexes {
            Some(write_index(&zip_dir)?)
        } else {
            None
        };

        tracing::info!(
            addon = %addon.name,
            entries = entries.len(),
            archive = %path.display(),
            "{} Success!",
            addon.path.display()
        );

        Ok((
            BuiltArchive {
                addon: addon.name.clone(),
                version,
                path,
                entries,
                purged,
            },
            index,
        ))
    }
}

/// Zip `source` into `dest`, rooting every entry at `<addon>/`.
///
/// The archive is written beside `dest` under a hidden partial name and moved
/// into place once complete, replacing any existing file. On failure nothing
/// is left at either path.
pub fn write_archive(
    addon: &str,
    source: &Path,
    dest: &Path,
    filter: &EntryFilter<'_>,
) -> Result<Vec<String>> {
    let partial = partial_path(dest);
    match write_entries(addon, source, &partial, filter) {
        Ok(entries) => {
            std::fs::rename(&partial, dest)?;
            Ok(entries)
        }
        Err(err) => {
            if let Err(cleanup) = remove_if_exists(&partial) {
                tracing::warn!(path = %partial.display(), error = %cleanup, "could not remove partial archive");
            }
            Err(err)
        }
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{name}.partial"))
}

fn write_entries(
    addon: &str,
    source: &Path,
    dest: &Path,
    filter: &EntryFilter<'_>,
) -> Result<Vec<String>> {
    let file = File::create(dest)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let walker = WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| keep_entry(entry, filter));

    let mut entries = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_dir() || !entry.path().is_file() {
            continue;
        }
        if !filter.keep_file(entry.path()) {
            continue;
        }

        let name = entry_name(addon, source, entry.path());
        zip.start_file(name.as_str(), options)?;
        let mut input = File::open(entry.path())?;
        io::copy(&mut input, &mut zip)?;
        entries.push(name);
    }

    zip.finish()?.flush()?;
    Ok(entries)
}

fn keep_entry(entry: &DirEntry, filter: &EntryFilter<'_>) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| filter.keep_dir(name))
}

fn entry_name(addon: &str, source: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(source).unwrap_or(path);
    let mut name = addon.to_string();
    for component in relative.components() {
        name.push('/');
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    name
}

/// Delete compiled byproducts from an add-on's source tree.
pub fn purge_compiled(source: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for entry in WalkDir::new(source) {
        let entry = entry?;
        if entry.file_type().is_file() && is_compiled(entry.path()) {
            std::fs::remove_file(entry.path())?;
            tracing::info!(path = %entry.path().display(), "Removing compiled file");
            removed.push(entry.into_path());
        }
    }
    Ok(removed)
}
