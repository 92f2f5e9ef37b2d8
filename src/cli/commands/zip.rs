//! addonrepo zip - Build versioned zips and index pages

use clap::Args;

use crate::app::AppContext;
use crate::cli::RunOverrides;
use crate::cli::output::{self, HumanLayout};
use crate::error::Result;
use crate::repository::{ArchiveBuilder, ArchiveReport};

#[derive(Args, Debug)]
pub struct ZipArgs {
    #[command(flatten)]
    pub run: RunOverrides,
}

pub fn run(ctx: &AppContext, args: &ZipArgs) -> Result<()> {
    let mut config = ctx.config.clone();
    args.run.apply(&mut config);
    config.validate()?;

    let report = ArchiveBuilder::new(&config).build_all()?;

    if ctx.json {
        let completed = report.archives.len();
        let failed = report.failures.len();
        return output::emit_json(&output::json_outcome(&report, completed, failed));
    }

    let mut layout = HumanLayout::new();
    describe(&mut layout, &report);
    output::emit_human(layout);
    Ok(())
}

pub fn describe(layout: &mut HumanLayout, report: &ArchiveReport) {
    layout
        .section("Archives")
        .kv("Folder", &report.zip_root.display().to_string())
        .kv("Built", &report.archives.len().to_string());
    for archive in &report.archives {
        layout.bullet(&format!(
            "{} {} ({} files)",
            archive.addon,
            archive.version,
            archive.entries.len()
        ));
    }
    for failure in &report.failures {
        layout.failure(&failure.addon, &failure.message);
    }
    if !report.indexes.is_empty() {
        layout.kv("Index pages", &report.indexes.len().to_string());
    }
}
