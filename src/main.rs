//! addonrepo - build a static add-on repository
//!
//! Aggregates add-on manifests into addons.xml and packs each add-on into a
//! versioned zip.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use addonrepo::Result;
use addonrepo::app::AppContext;
use addonrepo::cli::{Cli, output};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let response = output::json_error(&e);
                println!("{}", serde_json::to_string(&response).unwrap_or_default());
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = AppContext::from_cli(cli)?;
    addonrepo::cli::commands::run(&ctx, &cli.command)
}

/// Default filter for a `-v` count; `RUST_LOG` takes precedence.
fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn,addonrepo=info",
        1 => "info,addonrepo=debug",
        2 => "debug,addonrepo=trace",
        _ => "trace",
    }
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(cli.verbose)));

    // Per-add-on Success!/Fail! lines read best without the module target.
    let json = cli
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let human = (!cli.json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json)
        .with(human)
        .init();
}
