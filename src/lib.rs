pub mod addon;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod repository;
pub mod utils;

pub use error::{RepoError, Result};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
