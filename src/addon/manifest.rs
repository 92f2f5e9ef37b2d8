//! Per-add-on `addon.xml` manifests.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::addon::version::AddonVersion;
use crate::error::{RepoError, Result};

/// File name of the manifest inside every add-on folder and archive.
pub const MANIFEST_FILENAME: &str = "addon.xml";

/// `version="..."` attribute pattern used by the legacy extraction.
static VERSION_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"version="(.*?[0-9])""#).unwrap());

/// Where the add-on version is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionSource {
    /// The `version` attribute of the document's root element.
    #[default]
    RootElement,
    /// The second `version="..."` match in the raw text. The first match is
    /// normally the XML declaration; a manifest without one yields whatever
    /// nested element carries the next version attribute.
    LegacySecondMatch,
}

impl std::str::FromStr for VersionSource {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "root-element" | "root_element" | "root" => Ok(Self::RootElement),
            "legacy-second-match" | "legacy_second_match" | "legacy" => {
                Ok(Self::LegacySecondMatch)
            }
            _ => Err(RepoError::Config(format!(
                "invalid version source {s} (expected root-element|legacy-second-match)"
            ))),
        }
    }
}

/// A loaded add-on manifest: the raw text plus its root element identity.
#[derive(Debug, Clone)]
pub struct AddonManifest {
    pub text: String,
    pub root_tag: String,
    pub id: Option<String>,
    pub name: Option<String>,
    pub root_version: Option<String>,
}

impl AddonManifest {
    /// Read and parse `<addon_dir>/addon.xml`.
    pub fn load(addon_dir: &Path) -> Result<Self> {
        let path = addon_dir.join(MANIFEST_FILENAME);
        if !path.is_file() {
            return Err(RepoError::ManifestMissing(path));
        }
        let text = std::fs::read_to_string(&path)?;
        Self::parse(&text).map_err(|err| match err {
            RepoError::ManifestInvalid { reason, .. } => RepoError::ManifestInvalid { path, reason },
            other => RepoError::ManifestInvalid {
                path,
                reason: other.to_string(),
            },
        })
    }

    /// Parse manifest text, reading identity attributes from the root element.
    ///
    /// The whole document is read so mismatched tags are rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        let mut manifest = None;
        loop {
            match reader.read_event()? {
                Event::Start(root) | Event::Empty(root) if manifest.is_none() => {
                    manifest = Some(Self::from_root(text, &root)?);
                }
                Event::Eof => break,
                _ => {}
            }
        }
        manifest.ok_or_else(|| RepoError::ManifestInvalid {
            path: PathBuf::from(MANIFEST_FILENAME),
            reason: "no root element".to_string(),
        })
    }

    fn from_root(text: &str, root: &BytesStart<'_>) -> Result<Self> {
        let root_tag = String::from_utf8_lossy(root.name().as_ref()).into_owned();
        Ok(Self {
            text: text.to_string(),
            root_tag,
            id: attribute(root, "id")?,
            name: attribute(root, "name")?,
            root_version: attribute(root, "version")?,
        })
    }

    /// The add-on version according to `source`.
    ///
    /// When both strategies produce a value and they disagree, a warning names
    /// both so a manifest that trips the legacy extraction is visible.
    pub fn version(&self, source: VersionSource) -> Result<AddonVersion> {
        let legacy = legacy_second_match(&self.text);
        if let (Some(root), Some(legacy)) = (self.root_version.as_deref(), legacy) {
            if root != legacy {
                tracing::warn!(
                    addon = self.id.as_deref().unwrap_or("?"),
                    root_version = root,
                    legacy_version = legacy,
                    "root element version and legacy second-match version disagree"
                );
            }
        }

        let raw = match source {
            VersionSource::RootElement => self.root_version.as_deref().ok_or_else(|| {
                RepoError::InvalidVersion(format!(
                    "<{}> root element has no version attribute",
                    self.root_tag
                ))
            })?,
            VersionSource::LegacySecondMatch => legacy.ok_or_else(|| {
                RepoError::InvalidVersion(
                    "manifest has fewer than two version attributes".to_string(),
                )
            })?,
        };
        AddonVersion::parse(raw)
    }
}

/// Second capture of `version="..."` in the raw manifest text.
#[must_use]
pub fn legacy_second_match(text: &str) -> Option<&str> {
    VERSION_ATTR
        .captures_iter(text)
        .nth(1)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    let Some(attr) = element
        .try_get_attribute(name)
        .map_err(quick_xml::Error::from)?
    else {
        return Ok(None);
    };
    Ok(Some(attr.unescape_value()?.into_owned()))
}
