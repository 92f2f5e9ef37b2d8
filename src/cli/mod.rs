//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::addon::VersionSource;
use crate::config::Config;

pub mod commands;
pub mod output;

/// Build addons.xml, addons.xml.md5 and versioned zips for an add-on repository
#[derive(Parser, Debug)]
#[command(name = "addonrepo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Emit a JSON report on stdout and JSON log lines on stderr
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path; replaces the global and project config files
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory receiving addons.xml, the zip folder and index.html
    #[arg(long, short = 'C', global = true, default_value = ".")]
    pub working_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build addons.xml and its checksum, then the zips and index pages
    Generate(commands::generate::GenerateArgs),

    /// Build addons.xml and addons.xml.md5 only
    Manifest(commands::manifest::ManifestArgs),

    /// Build the zips and index pages only
    Zip(commands::zip::ZipArgs),

    /// Show the effective configuration
    Config(commands::config::ConfigArgs),
}

/// Per-run overrides shared by the build commands.
#[derive(Args, Debug, Clone, Default)]
pub struct RunOverrides {
    /// Folder holding one sub-folder per add-on
    #[arg(long)]
    pub addons_root: Option<PathBuf>,

    /// Only process these add-on folders (comma separated or repeated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Previous versions to fold into addons.xml
    #[arg(long)]
    pub retained_versions: Option<usize>,

    /// Archive output folder name inside the working directory
    #[arg(long)]
    pub zip_folder: Option<String>,

    /// Skip writing index.html pages
    #[arg(long)]
    pub no_index: bool,

    /// Delete .pyc/.pyo/.pyd files from add-on sources before zipping
    #[arg(long)]
    pub delete_compiled: bool,

    /// Read versions from the second version="..." match instead of the root element
    #[arg(long)]
    pub legacy_version_match: bool,
}

impl RunOverrides {
    /// Apply flags on top of the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(root) = &self.addons_root {
            config.paths.addons_root = Some(root.clone());
        }
        if !self.only.is_empty() {
            config.addons.only.clone_from(&self.only);
        }
        if let Some(count) = self.retained_versions {
            config.manifest.retained_versions = count;
        }
        if let Some(folder) = &self.zip_folder {
            config.paths.zip_folder.clone_from(folder);
        }
        if self.no_index {
            config.archive.html_indexes = false;
        }
        if self.delete_compiled {
            config.archive.delete_compiled = true;
        }
        if self.legacy_version_match {
            config.manifest.version_source = VersionSource::LegacySecondMatch;
        }
    }
}
