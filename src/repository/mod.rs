//! Repository generation: combined manifest, checksum, archives and indexes.

pub mod aggregate;
pub mod archive;
pub mod checksum;
pub mod history;
pub mod index;
pub mod pipeline;

pub use aggregate::{AddonFailure, AggregateReport, CombinedManifest, ManifestAggregator};
pub use archive::{ArchiveBuilder, ArchiveReport, BuiltArchive};
pub use checksum::{md5_hex, verify_checksum, write_checksum};
pub use history::{HistoricalManifest, previous_manifests};
pub use index::{list_dir_items, render_index, write_index};
pub use pipeline::{Pipeline, PipelineReport};
