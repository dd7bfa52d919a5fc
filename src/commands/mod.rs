// src/commands/mod.rs
//! Command handlers for the rpmdeps CLI

mod explain;
mod manifest;
mod rules;

pub use explain::cmd_explain;
pub use manifest::cmd_manifest;
pub use rules::cmd_rules;

use crate::cli::RunArgs;
use anyhow::{Context, Result};
use rpmdeps::RunConfig;
use tracing::debug;

/// Load the configuration file, if any, and apply the command-line flags
pub(crate) fn resolve_config(args: &RunArgs) -> Result<RunConfig> {
    let base = match &args.config {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            RunConfig::load(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => RunConfig::default(),
    };

    let config = args.apply(base);
    config.validate()?;
    Ok(config)
}
