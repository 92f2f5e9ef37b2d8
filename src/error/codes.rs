//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Add-on manifest errors
//! - 2xx: Archive errors
//! - 3xx: Config errors
//! - 6xx: Storage errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for `--json` output.
///
/// Each variant maps to a numeric code (e.g., `ManifestMissing` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Add-on manifest errors (1xx)
    // ========================================
    /// E101: The add-on folder has no addon.xml
    ManifestMissing,
    /// E102: addon.xml exists but cannot be parsed
    ManifestInvalid,
    /// E103: A version string could not be parsed
    VersionInvalid,

    // ========================================
    // Archive errors (2xx)
    // ========================================
    /// E201: A previously built archive is missing its manifest or is inconsistent
    ArchiveMalformed,
    /// E202: Writing an archive failed
    ArchiveWriteFailed,
    /// E203: The zip container itself is unreadable
    ArchiveUnreadable,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E302: Config file has invalid syntax or values
    ConfigInvalid,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E601: The combined manifest checksum could not be produced
    ChecksumFailed,
    /// E605: JSON or XML serialization failed
    SerializationError,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E905: Path or resource not found
    NotFound,
    /// E906: Generic I/O failure
    IoError,
}

impl ErrorCode {
    /// Get the numeric code.
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::ManifestMissing => 101,
            Self::ManifestInvalid => 102,
            Self::VersionInvalid => 103,

            Self::ArchiveMalformed => 201,
            Self::ArchiveWriteFailed => 202,
            Self::ArchiveUnreadable => 203,

            Self::ConfigInvalid => 302,

            Self::ChecksumFailed => 601,
            Self::SerializationError => 605,

            Self::NotFound => 905,
            Self::IoError => 906,
        }
    }

    /// Get the error code as a formatted string (e.g., "E101").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::ManifestMissing => "Add an addon.xml to the add-on folder or exclude it with `addons.only`",
            Self::ManifestInvalid => "Check addon.xml for XML syntax errors and a root element carrying a version attribute",
            Self::VersionInvalid => "Versions must start with dot-separated numbers, e.g. 1.2.3",
            Self::ArchiveMalformed => "Delete or rebuild the archive; it must contain <addon>/addon.xml matching its file name",
            Self::ArchiveWriteFailed => "Check disk space and write permissions on the zip folder",
            Self::ArchiveUnreadable => "The zip file is corrupted. Delete it and run `addonrepo zip` again",
            Self::ConfigInvalid => "Run `addonrepo config` to see current values. Check TOML syntax in config file",
            Self::ChecksumFailed => "addons.xml was written but addons.xml.md5 was not. Check write permissions and rerun",
            Self::SerializationError => "The data format may be corrupted. Check input data for validity",
            Self::NotFound => "The requested path was not found. Check --working-dir and --addons-root",
            Self::IoError => "File operation failed. Check path exists and permissions are correct",
        }
    }

    /// Get the category name for this error code.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "manifest",
            2 => "archive",
            3 => "config",
            6 => "storage",
            _ => "internal",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
