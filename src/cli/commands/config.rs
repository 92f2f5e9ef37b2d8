//! addonrepo config - Show the effective configuration

use clap::Args;

use crate::app::AppContext;
use crate::cli::RunOverrides;
use crate::cli::output;
use crate::config::PROJECT_CONFIG_FILENAME;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print where config is read from instead of its values
    #[arg(long)]
    pub sources: bool,

    #[command(flatten)]
    pub run: RunOverrides,
}

pub fn run(ctx: &AppContext, args: &ConfigArgs) -> Result<()> {
    let mut config = ctx.config.clone();
    args.run.apply(&mut config);

    if args.sources {
        let sources = config_sources(ctx);
        if ctx.json {
            return output::emit_json(&output::json_ok(&sources));
        }
        for source in sources {
            println!("{source}");
        }
        return Ok(());
    }

    if ctx.json {
        return output::emit_json(&output::json_ok(&config));
    }
    println!("{}", config.to_toml_string()?);
    Ok(())
}

fn config_sources(ctx: &AppContext) -> Vec<String> {
    if let Some(path) = &ctx.config_path {
        return vec![path.display().to_string()];
    }
    if let Ok(path) = std::env::var("ADDONREPO_CONFIG") {
        return vec![path];
    }

    let mut sources = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        sources.push(dir.join("addonrepo/config.toml").display().to_string());
    }
    sources.push(
        ctx.config
            .paths
            .working_dir
            .join(PROJECT_CONFIG_FILENAME)
            .display()
            .to_string(),
    );
    sources
}
