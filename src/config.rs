use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::addon::VersionSource;
use crate::error::{ErrorKind, FailurePolicy, RepoError, Result};

/// Project config file looked up in the working directory.
pub const PROJECT_CONFIG_FILENAME: &str = "addonrepo.toml";

/// Combined manifest written to the working directory.
pub const COMBINED_MANIFEST_FILENAME: &str = "addons.xml";

/// Checksum of the combined manifest.
pub const CHECKSUM_FILENAME: &str = "addons.xml.md5";

/// Folders under the add-ons root that are never treated as add-ons, in
/// addition to the configured zip folder.
pub const RESERVED_FOLDERS: &[&str] = &["temp", "packages"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub addons: AddonsConfig,
    #[serde(default)]
    pub manifest: ManifestConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub failures: FailuresConfig,
}

impl Config {
    /// Load config for a run rooted at `working_dir`.
    ///
    /// An explicit path (argument or `ADDONREPO_CONFIG`) replaces the
    /// global and project files. Environment overrides apply last.
    pub fn load(explicit_path: Option<&Path>, working_dir: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.paths.working_dir = working_dir.to_path_buf();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("ADDONREPO_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                RepoError::Config(format!("config file not found: {}", path.display()))
            })?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(working_dir)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Parse a config document on top of the defaults, without env overrides.
    pub fn from_toml_str(input: &str, working_dir: &Path) -> Result<Self> {
        let patch: ConfigPatch = toml::from_str(input)
            .map_err(|err| RepoError::Config(format!("parse config: {err}")))?;
        let mut config = Self::default();
        config.paths.working_dir = working_dir.to_path_buf();
        config.merge_patch(patch);
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|err| RepoError::Config(format!("serialize config: {err}")))
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("addonrepo/config.toml"))
    }

    fn load_project(working_dir: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&working_dir.join(PROJECT_CONFIG_FILENAME))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| RepoError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| RepoError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.paths {
            self.paths.merge(patch);
        }
        if let Some(patch) = patch.addons {
            self.addons.merge(patch);
        }
        if let Some(patch) = patch.manifest {
            self.manifest.merge(patch);
        }
        if let Some(patch) = patch.archive {
            self.archive.merge(patch);
        }
        if let Some(patch) = patch.failures {
            self.failures.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_string("ADDONREPO_ADDONS_ROOT") {
            self.paths.addons_root = Some(PathBuf::from(value));
        }
        if let Some(value) = env_string("ADDONREPO_ZIP_FOLDER") {
            self.paths.zip_folder = value;
        }
        if let Some(values) = env_list("ADDONREPO_ONLY") {
            self.addons.only = values;
        }
        if let Some(value) = env_usize("ADDONREPO_RETAINED_VERSIONS")? {
            self.manifest.retained_versions = value;
        }
        if let Some(value) = env_string("ADDONREPO_VERSION_SOURCE") {
            self.manifest.version_source = value.parse()?;
        }
        if let Some(value) = env_bool("ADDONREPO_HTML_INDEXES") {
            self.archive.html_indexes = value;
        }
        if let Some(value) = env_bool("ADDONREPO_DELETE_COMPILED") {
            self.archive.delete_compiled = value;
        }

        Ok(())
    }

    /// Check values that would otherwise fail deep inside a run.
    pub fn validate(&self) -> Result<()> {
        let zip_folder = self.paths.zip_folder.trim();
        if zip_folder.is_empty() {
            return Err(RepoError::Config("paths.zip_folder cannot be empty".to_string()));
        }
        if zip_folder.contains(['/', '\\']) || zip_folder == ".." || zip_folder == "." {
            return Err(RepoError::Config(format!(
                "paths.zip_folder must be a plain folder name, got {zip_folder}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory receiving addons.xml, addons.xml.md5, the zip folder and index.html.
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,
    /// Directory holding one sub-folder per add-on. Relative paths resolve
    /// against `working_dir`; unset means `<working_dir>/packages`.
    #[serde(default)]
    pub addons_root: Option<PathBuf>,
    /// Name of the archive output folder inside `working_dir`.
    #[serde(default = "default_zip_folder")]
    pub zip_folder: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            addons_root: None,
            zip_folder: default_zip_folder(),
        }
    }
}

impl PathsConfig {
    fn merge(&mut self, patch: PathsPatch) {
        if let Some(value) = patch.addons_root {
            self.addons_root = Some(value);
        }
        if let Some(value) = patch.zip_folder {
            self.zip_folder = value;
        }
    }

    #[must_use]
    pub fn addons_root(&self) -> PathBuf {
        match &self.addons_root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => self.working_dir.join(root),
            None => self.working_dir.join("packages"),
        }
    }

    #[must_use]
    pub fn zip_root(&self) -> PathBuf {
        self.working_dir.join(&self.zip_folder)
    }

    #[must_use]
    pub fn addon_zip_dir(&self, addon: &str) -> PathBuf {
        self.zip_root().join(addon)
    }

    #[must_use]
    pub fn combined_manifest(&self) -> PathBuf {
        self.working_dir.join(COMBINED_MANIFEST_FILENAME)
    }

    #[must_use]
    pub fn checksum(&self) -> PathBuf {
        self.working_dir.join(CHECKSUM_FILENAME)
    }

    /// Whether a folder name under the add-ons root is reserved.
    #[must_use]
    pub fn is_reserved_folder(&self, name: &str) -> bool {
        name == self.zip_folder || RESERVED_FOLDERS.contains(&name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddonsConfig {
    /// Allow-list of add-on folder names; empty means every add-on.
    #[serde(default)]
    pub only: Vec<String>,
    /// File names left out of an add-on's archive, keyed by add-on folder.
    #[serde(default)]
    pub excluded_files: BTreeMap<String, Vec<String>>,
    /// Directory names pruned from an add-on's archive, keyed by add-on folder.
    #[serde(default)]
    pub excluded_dirs: BTreeMap<String, Vec<String>>,
}

impl AddonsConfig {
    fn merge(&mut self, patch: AddonsPatch) {
        if let Some(values) = patch.only {
            self.only = values;
        }
        if let Some(map) = patch.excluded_files {
            self.excluded_files.extend(map);
        }
        if let Some(map) = patch.excluded_dirs {
            self.excluded_dirs.extend(map);
        }
    }

    #[must_use]
    pub fn is_selected(&self, addon: &str) -> bool {
        self.only.is_empty() || self.only.iter().any(|name| name == addon)
    }

    #[must_use]
    pub fn excluded_files_for(&self, addon: &str) -> &[String] {
        self.excluded_files
            .get(addon)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn excluded_dirs_for(&self, addon: &str) -> &[String] {
        self.excluded_dirs
            .get(addon)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Previous versions folded into addons.xml next to the current one.
    #[serde(default = "default_retained_versions")]
    pub retained_versions: usize,
    #[serde(default)]
    pub version_source: VersionSource,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            retained_versions: default_retained_versions(),
            version_source: VersionSource::RootElement,
        }
    }
}

impl ManifestConfig {
    fn merge(&mut self, patch: ManifestPatch) {
        if let Some(value) = patch.retained_versions {
            self.retained_versions = value;
        }
        if let Some(value) = patch.version_source {
            self.version_source = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Write index.html listings for the zip folders and working directory.
    #[serde(default = "default_true")]
    pub html_indexes: bool,
    /// Delete compiled Python files from the add-on sources before zipping.
    #[serde(default)]
    pub delete_compiled: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            html_indexes: true,
            delete_compiled: false,
        }
    }
}

impl ArchiveConfig {
    fn merge(&mut self, patch: ArchivePatch) {
        if let Some(value) = patch.html_indexes {
            self.html_indexes = value;
        }
        if let Some(value) = patch.delete_compiled {
            self.delete_compiled = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailuresConfig {
    #[serde(default)]
    pub addon_manifest: FailurePolicy,
    #[serde(default = "abort_policy")]
    pub malformed_archive: FailurePolicy,
    #[serde(default)]
    pub addon_archive: FailurePolicy,
}

impl Default for FailuresConfig {
    fn default() -> Self {
        Self {
            addon_manifest: FailurePolicy::Isolate,
            malformed_archive: FailurePolicy::Abort,
            addon_archive: FailurePolicy::Isolate,
        }
    }
}

impl FailuresConfig {
    /// Policy for an add-on failing while the combined manifest is built.
    #[must_use]
    pub const fn during_aggregation(&self, kind: ErrorKind) -> FailurePolicy {
        match kind {
            ErrorKind::MalformedArchive => self.malformed_archive,
            _ => self.addon_manifest,
        }
    }

    fn merge(&mut self, patch: FailuresPatch) {
        if let Some(value) = patch.addon_manifest {
            self.addon_manifest = value;
        }
        if let Some(value) = patch.malformed_archive {
            self.malformed_archive = value;
        }
        if let Some(value) = patch.addon_archive {
            self.addon_archive = value;
        }
    }
}

fn default_working_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_zip_folder() -> String {
    "zip".to_string()
}

const fn default_retained_versions() -> usize {
    2
}

const fn default_true() -> bool {
    true
}

const fn abort_policy() -> FailurePolicy {
    FailurePolicy::Abort
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    pub paths: Option<PathsPatch>,
    pub addons: Option<AddonsPatch>,
    pub manifest: Option<ManifestPatch>,
    pub archive: Option<ArchivePatch>,
    pub failures: Option<FailuresPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PathsPatch {
    pub addons_root: Option<PathBuf>,
    pub zip_folder: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AddonsPatch {
    pub only: Option<Vec<String>>,
    pub excluded_files: Option<BTreeMap<String, Vec<String>>>,
    pub excluded_dirs: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ManifestPatch {
    pub retained_versions: Option<usize>,
    pub version_source: Option<VersionSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ArchivePatch {
    pub html_indexes: Option<bool>,
    pub delete_compiled: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct FailuresPatch {
    pub addon_manifest: Option<FailurePolicy>,
    pub malformed_archive: Option<FailurePolicy>,
    pub addon_archive: Option<FailurePolicy>,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|value| {
        matches!(
            value.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_usize(key: &str) -> Result<Option<usize>> {
    match std::env::var(key) {
        Ok(value) => value.parse::<usize>().map(Some).map_err(|err| {
            RepoError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        Err(_) => Ok(None),
    }
}

fn env_list(key: &str) -> Option<Vec<String>> {
    std::env::var(key).ok().map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}
