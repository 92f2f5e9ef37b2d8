//! Manifest aggregation followed by archive building.

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;

use super::aggregate::{AggregateReport, ManifestAggregator};
use super::archive::{ArchiveBuilder, ArchiveReport};

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub manifest: AggregateReport,
    pub archives: ArchiveReport,
}

/// Runs both stages in order.
///
/// Historical lookup reads the archives of earlier runs and may delete the
/// archive of the current version, so the build stage only starts once
/// aggregation has finished. An aborted aggregation skips the build.
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub fn run(&self) -> Result<PipelineReport> {
        self.config.validate()?;
        let manifest = ManifestAggregator::new(&self.config).aggregate()?;
        let archives = ArchiveBuilder::new(&self.config).build_all()?;
        Ok(PipelineReport { manifest, archives })
    }
}
