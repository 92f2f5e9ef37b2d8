//! Combined manifest (`addons.xml`) and its checksum.

use std::path::PathBuf;

use serde::Serialize;

use crate::addon::{Addon, AddonVersion, archive_file_name, scan_addons};
use crate::config::Config;
use crate::error::{ErrorCode, ErrorKind, FailurePolicy, RepoError, Result};
use crate::utils::fs::remove_if_exists;

use super::checksum::write_checksum;
use super::history::previous_manifests;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const ROOT_OPEN: &str = "<addons>";
const ROOT_CLOSE: &str = "</addons>";
const INDENT: &str = "  ";

/// Reindent one manifest for embedding in the combined document.
///
/// Declaration lines are dropped, every other line is right-trimmed and
/// prefixed with two spaces, and the block ends with one blank line.
#[must_use]
pub fn format_manifest_lines(text: &str) -> String {
    let mut block = String::with_capacity(text.len() + 64);
    // `lines` handles `\n` and `\r\n`; old Mac files end lines with a bare `\r`.
    for line in text.lines().flat_map(|line| line.split('\r')) {
        if line.contains("<?xml") {
            continue;
        }
        block.push_str(INDENT);
        block.push_str(line.trim_end());
        block.push('\n');
    }
    let mut block = block.trim_end().to_string();
    block.push_str("\n\n");
    block
}

/// The combined manifest document under construction.
#[derive(Debug, Clone)]
pub struct CombinedManifest {
    body: String,
    blocks: usize,
}

impl Default for CombinedManifest {
    fn default() -> Self {
        Self::new()
    }
}

impl CombinedManifest {
    #[must_use]
    pub fn new() -> Self {
        Self {
            body: format!("{XML_DECLARATION}\n{ROOT_OPEN}\n"),
            blocks: 0,
        }
    }

    /// Append one normalized manifest block.
    pub fn push_manifest(&mut self, text: &str) {
        self.body.push_str(&format_manifest_lines(text));
        self.blocks += 1;
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.blocks
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.blocks == 0
    }

    /// Close the root element and return the final document.
    #[must_use]
    pub fn finish(self) -> String {
        let mut document = self.body.trim().to_string();
        document.push('\n');
        document.push_str(ROOT_CLOSE);
        document.push('\n');
        document
    }
}

/// Outcome for one add-on that made it into the combined manifest.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedAddon {
    pub name: String,
    pub version: Option<AddonVersion>,
    /// Versions folded in from earlier archives, newest first.
    pub previous_versions: Vec<AddonVersion>,
    /// A stale archive for the current version was deleted before lookup.
    pub removed_current_archive: bool,
}

/// An add-on left out of a run under the isolate policy.
#[derive(Debug, Clone, Serialize)]
pub struct AddonFailure {
    pub addon: String,
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub message: String,
}

impl AddonFailure {
    #[must_use]
    pub fn new(addon: &str, err: &RepoError) -> Self {
        Self {
            addon: addon.to_string(),
            kind: err.kind(),
            code: err.code(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub manifest_path: PathBuf,
    pub checksum_path: PathBuf,
    pub checksum: Option<String>,
    pub checksum_error: Option<String>,
    /// Manifest blocks written, current and historical.
    pub blocks: usize,
    pub addons: Vec<AggregatedAddon>,
    pub failures: Vec<AddonFailure>,
}

/// Builds `addons.xml` and `addons.xml.md5` in the working directory.
pub struct ManifestAggregator<'a> {
    config: &'a Config,
}

impl<'a> ManifestAggregator<'a> {
    #[must_use]
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Aggregate every eligible add-on and write the manifest and checksum.
    ///
    /// Per-add-on failures follow the configured policy for their kind. A
    /// checksum failure is logged and recorded but never fails the run.
    pub fn aggregate(&self) -> Result<AggregateReport> {
        let scan = scan_addons(self.config)?;
        for path in &scan.missing_manifest {
            tracing::warn!("{} Fail! no addon.xml", path.display());
        }
        let addons = scan.addons;
        let mut combined = CombinedManifest::new();
        let mut aggregated = Vec::new();
        let mut failures = Vec::new();

        for addon in &addons {
            match self.collect(addon) {
                Ok((entry, texts)) => {
                    for text in &texts {
                        combined.push_manifest(text);
                    }
                    tracing::info!(addon = %addon.name, "{} Success!", addon.manifest_path().display());
                    aggregated.push(entry);
                }
                Err(err) => {
                    match self.config.failures.during_aggregation(err.kind()) {
                        FailurePolicy::Abort => return Err(err),
                        FailurePolicy::Isolate => {
                            tracing::error!(
                                addon = %addon.name,
                                error = %err,
                                "{} Fail!",
                                addon.manifest_path().display()
                            );
                            failures.push(AddonFailure::new(&addon.name, &err));
                        }
                    }
                }
            }
        }

        let blocks = combined.len();
        let manifest_path = self.config.paths.combined_manifest();
        let checksum_path = self.config.paths.checksum();
        std::fs::write(&manifest_path, combined.finish().as_bytes())?;

        let (checksum, checksum_error) = match write_checksum(&manifest_path, &checksum_path) {
            Ok(digest) => (Some(digest), None),
            Err(err) => {
                tracing::error!(error = %err, "An error occurred creating {}", checksum_path.display());
                (None, Some(err.to_string()))
            }
        };

        tracing::info!(
            addons = aggregated.len(),
            failed = failures.len(),
            blocks,
            "### Finished updating addons xml and md5 files ###"
        );

        Ok(AggregateReport {
            manifest_path,
            checksum_path,
            checksum,
            checksum_error,
            blocks,
            addons: aggregated,
            failures,
        })
    }

    /// All manifest texts for one add-on, current first.
    ///
    /// Nothing is returned unless every lookup for the add-on succeeds, so a
    /// failed add-on never contributes a partial set of blocks.
    fn collect(&self, addon: &Addon) -> Result<(AggregatedAddon, Vec<String>)> {
        let manifest = addon.load_manifest()?;
        let source = self.config.manifest.version_source;
        let retained = self.config.manifest.retained_versions;

        let mut entry = AggregatedAddon {
            name: addon.name.clone(),
            version: None,
            previous_versions: Vec::new(),
            removed_current_archive: false,
        };

        if retained == 0 {
            entry.version = manifest.version(source).ok();
            return Ok((entry, vec![manifest.text]));
        }

        let version = manifest.version(source)?;
        let zip_dir = self.config.paths.addon_zip_dir(&addon.name);
        let current_archive = zip_dir.join(archive_file_name(&addon.name, &version));
        if remove_if_exists(&current_archive)? {
            tracing::info!(
                addon = %addon.name,
                archive = %current_archive.display(),
                "Removed existing archive of the current version"
            );
            entry.removed_current_archive = true;
        }

        let history = previous_manifests(&zip_dir, &addon.name, retained, source)?;

        let mut texts = Vec::with_capacity(history.len() + 1);
        texts.push(manifest.text);
        for previous in history {
            entry.previous_versions.push(previous.version);
            texts.push(previous.text);
        }
        entry.version = Some(version);
        Ok((entry, texts))
    }
}
