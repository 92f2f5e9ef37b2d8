//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub mod config;
pub mod generate;
pub mod manifest;
pub mod zip;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Generate(args) => generate::run(ctx, args),
        Commands::Manifest(args) => manifest::run(ctx, args),
        Commands::Zip(args) => zip::run(ctx, args),
        Commands::Config(args) => config::run(ctx, args),
    }
}
