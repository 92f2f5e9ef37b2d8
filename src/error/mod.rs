//! Error handling for addonrepo.
//!
//! This module provides:
//! - [`RepoError`]: The main error enum for all repository operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`ErrorKind`] and [`FailurePolicy`]: how a run reacts to each class of failure
//! - [`StructuredError`]: Serializable error for `--json` output

mod codes;

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use codes::ErrorCode;

/// Main error type for addonrepo operations.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Manifest not found: {}", .0.display())]
    ManifestMissing(PathBuf),

    #[error("Invalid manifest {}: {reason}", .path.display())]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Malformed archive {}: {reason}", .archive.display())]
    MalformedArchive { archive: PathBuf, reason: String },

    #[error("Archive failed for {addon}: {reason}")]
    ArchiveFailed { addon: String, reason: String },

    #[error("Checksum failed for {}: {reason}", .path.display())]
    ChecksumFailed { path: PathBuf, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Failure classes a run distinguishes when deciding whether to continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing, unreadable or unparsable add-on manifest.
    AddonManifest,
    /// The checksum file could not be written.
    Checksum,
    /// Building one add-on's archive failed.
    AddonArchive,
    /// A historical archive lacks its manifest or disagrees with its name.
    MalformedArchive,
    /// Anything else (config, working directory, combined manifest write).
    Other,
}

/// What a run does when an error of a given kind happens for one add-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log, record the failure in the report, continue with the next add-on.
    #[default]
    Isolate,
    /// Stop the whole run and return the error.
    Abort,
}

impl RepoError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) | Self::Walk(_) => ErrorCode::IoError,
            Self::Zip(_) => ErrorCode::ArchiveUnreadable,
            Self::Xml(_) => ErrorCode::ManifestInvalid,
            Self::Json(_) => ErrorCode::SerializationError,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::ManifestMissing(_) => ErrorCode::ManifestMissing,
            Self::ManifestInvalid { .. } => ErrorCode::ManifestInvalid,
            Self::InvalidVersion(_) => ErrorCode::VersionInvalid,
            Self::MalformedArchive { .. } => ErrorCode::ArchiveMalformed,
            Self::ArchiveFailed { .. } => ErrorCode::ArchiveWriteFailed,
            Self::ChecksumFailed { .. } => ErrorCode::ChecksumFailed,
            Self::NotFound(_) => ErrorCode::NotFound,
        }
    }

    /// Classify this error for failure-policy decisions.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ManifestMissing(_)
            | Self::ManifestInvalid { .. }
            | Self::Xml(_)
            | Self::InvalidVersion(_) => ErrorKind::AddonManifest,
            Self::MalformedArchive { .. } => ErrorKind::MalformedArchive,
            Self::ArchiveFailed { .. } | Self::Zip(_) => ErrorKind::AddonArchive,
            Self::ChecksumFailed { .. } => ErrorKind::Checksum,
            _ => ErrorKind::Other,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_repo_error(self)
    }
}

/// A structured error with machine-readable code and suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "ARCHIVE_MALFORMED")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 201)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Error category (e.g., "manifest", "archive")
    pub category: String,
}

impl StructuredError {
    /// Create a structured error from a `RepoError`.
    #[must_use]
    pub fn from_repo_error(err: &RepoError) -> Self {
        let code = err.code();
        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion: code.suggestion().to_string(),
            category: code.category().to_string(),
        }
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<&RepoError> for StructuredError {
    fn from(err: &RepoError) -> Self {
        Self::from_repo_error(err)
    }
}

/// Result type alias using `RepoError`.
pub type Result<T> = std::result::Result<T, RepoError>;
