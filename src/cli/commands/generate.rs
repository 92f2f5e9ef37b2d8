//! addonrepo generate - Build the whole repository
//!
//! Runs manifest aggregation to completion and then builds the archives, so
//! the history lookup never sees this run's archives.

use clap::Args;

use crate::app::AppContext;
use crate::cli::RunOverrides;
use crate::cli::output::{self, HumanLayout};
use crate::error::Result;
use crate::repository::Pipeline;

use super::{manifest, zip};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub run: RunOverrides,
}

pub fn run(ctx: &AppContext, args: &GenerateArgs) -> Result<()> {
    let mut config = ctx.config.clone();
    args.run.apply(&mut config);

    let report = Pipeline::new(config).run()?;

    if ctx.json {
        let completed = report.manifest.addons.len() + report.archives.archives.len();
        let failed = report.manifest.failures.len() + report.archives.failures.len();
        return output::emit_json(&output::json_outcome(&report, completed, failed));
    }

    let mut layout = HumanLayout::new();
    manifest::describe(&mut layout, &report.manifest);
    layout.blank();
    zip::describe(&mut layout, &report.archives);
    output::emit_human(layout);
    Ok(())
}
