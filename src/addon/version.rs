//! Add-on version strings and archive file names.
//!
//! Versions compare numerically per dot-separated component, so `1.10.0`
//! ranks above `1.9.0`. Anything after the numeric prefix (`+matrix.1`,
//! `~beta2`) is kept as a tail and only breaks ties.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{RepoError, Result};

/// Extension of every generated archive.
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// A parsed add-on version with a total order.
#[derive(Debug, Clone)]
pub struct AddonVersion {
    raw: String,
    components: Vec<u64>,
    tail: String,
}

impl AddonVersion {
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(RepoError::InvalidVersion("empty version".to_string()));
        }

        let mut components = Vec::new();
        let mut rest = raw;
        loop {
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            if digits == 0 {
                break;
            }
            let value = rest[..digits].parse::<u64>().map_err(|err| {
                RepoError::InvalidVersion(format!("{raw}: {err}"))
            })?;
            components.push(value);
            rest = &rest[digits..];

            // Only a dot followed by another number continues the numeric prefix.
            match rest.strip_prefix('.') {
                Some(next) if next.starts_with(|c: char| c.is_ascii_digit()) => rest = next,
                _ => break,
            }
        }

        if components.is_empty() {
            return Err(RepoError::InvalidVersion(format!(
                "{raw}: must start with a number"
            )));
        }

        Ok(Self {
            raw: raw.to_string(),
            components,
            tail: rest.to_string(),
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

impl Ord for AddonVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components
            .cmp(&other.components)
            .then_with(|| self.tail.cmp(&other.tail))
    }
}

impl PartialEq for AddonVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AddonVersion {}

impl PartialOrd for AddonVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for AddonVersion {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for AddonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for AddonVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Archive file name for one add-on version: `<addon>-<version>.zip`.
///
/// The history lookup parses names produced here, so the two must agree.
#[must_use]
pub fn archive_file_name(addon: &str, version: &AddonVersion) -> String {
    format!("{addon}-{version}{ARCHIVE_EXTENSION}")
}

/// A file found in an add-on's zip folder, ordered by the version in its name.
///
/// Names without a parseable version sort below every versioned archive and
/// among themselves by file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    pub file_name: String,
    pub version: Option<AddonVersion>,
}

impl ArchiveName {
    /// Parse an archive file name, or `None` when it is not a `.zip`.
    #[must_use]
    pub fn parse(addon: &str, file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(ARCHIVE_EXTENSION)?;
        let version_part = stem
            .strip_prefix(addon)
            .and_then(|rest| rest.strip_prefix('-'))
            .or_else(|| stem.rsplit_once('-').map(|(_, version)| version));
        let version = version_part.and_then(|v| AddonVersion::parse(v).ok());
        Some(Self {
            file_name: file_name.to_string(),
            version,
        })
    }
}

impl Ord for ArchiveName {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.version, &other.version) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| self.file_name.cmp(&other.file_name))
    }
}

impl PartialOrd for ArchiveName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
