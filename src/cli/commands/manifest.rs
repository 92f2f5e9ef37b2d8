//! addonrepo manifest - Build addons.xml and addons.xml.md5

use clap::Args;

use crate::app::AppContext;
use crate::cli::RunOverrides;
use crate::cli::output::{self, HumanLayout};
use crate::error::Result;
use crate::repository::{AggregateReport, ManifestAggregator};

#[derive(Args, Debug)]
pub struct ManifestArgs {
    #[command(flatten)]
    pub run: RunOverrides,
}

pub fn run(ctx: &AppContext, args: &ManifestArgs) -> Result<()> {
    let mut config = ctx.config.clone();
    args.run.apply(&mut config);
    config.validate()?;

    let report = ManifestAggregator::new(&config).aggregate()?;

    if ctx.json {
        let completed = report.addons.len();
        let failed = report.failures.len();
        return output::emit_json(&output::json_outcome(&report, completed, failed));
    }

    let mut layout = HumanLayout::new();
    describe(&mut layout, &report);
    output::emit_human(layout);
    Ok(())
}

/// Human summary of an aggregation run.
pub fn describe(layout: &mut HumanLayout, report: &AggregateReport) {
    layout
        .section("Combined manifest")
        .kv("File", &report.manifest_path.display().to_string())
        .kv("Blocks", &report.blocks.to_string());
    match (&report.checksum, &report.checksum_error) {
        (Some(digest), _) => layout.kv("MD5", digest),
        (None, Some(err)) => layout.kv("MD5", &format!("not written: {err}")),
        (None, None) => layout.kv("MD5", "-"),
    };

    for addon in &report.addons {
        let version = addon
            .version
            .as_ref()
            .map_or_else(|| "?".to_string(), ToString::to_string);
        let mut line = format!("{} {version}", addon.name);
        if !addon.previous_versions.is_empty() {
            let previous: Vec<_> = addon
                .previous_versions
                .iter()
                .map(ToString::to_string)
                .collect();
            line.push_str(&format!(" (+ {})", previous.join(", ")));
        }
        layout.bullet(&line);
    }
    for failure in &report.failures {
        layout.failure(&failure.addon, &failure.message);
    }
}
