//! Per-invocation state shared by every command.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::Config;
use crate::error::Result;

pub struct AppContext {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub json: bool,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Self::load(cli.config.as_deref(), &cli.working_dir, cli.json)
    }

    pub fn load(config_path: Option<&Path>, working_dir: &Path, json: bool) -> Result<Self> {
        let config = Config::load(config_path, working_dir)?;
        Ok(Self {
            config,
            config_path: config_path.map(Path::to_path_buf),
            json,
        })
    }
}
