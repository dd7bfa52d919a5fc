// src/commands/explain.rs

//! Per-file view of a matching run
//!
//! Nothing is written; the output is meant for working out why a file is
//! ambiguous or missing.

use super::resolve_config;
use crate::cli::RunArgs;
use anyhow::{Context, Result};
use rpmdeps::manifest;
use rpmdeps::{DependencyLister, MatchStatus, Matcher};

/// Print the match result of every packaged file
pub fn cmd_explain(args: &RunArgs) -> Result<u8> {
    let config = resolve_config(args)?;
    let lister = DependencyLister::new(config);

    let source = manifest::open(lister.config().extractor, &args.archive)
        .with_context(|| format!("Failed to read manifest of {}", args.archive.display()))?;
    let index = lister.index_for(source.as_ref());
    let results = Matcher::new(&index, lister.match_options()).match_all(source.files());

    println!(
        "{} packaged files, {} indexed candidates",
        source.files().len(),
        index.len()
    );
    for skipped in index.skipped_roots() {
        println!("skipped root {}: {}", skipped.path.display(), skipped.reason);
    }

    for result in &results {
        let basis = result
            .basis
            .map(|b| b.to_string())
            .unwrap_or_else(|| "-".to_string());
        print!(
            "{:<9} {:<12} {}",
            result.status.to_string(),
            basis,
            result.file.archive_path
        );
        match (&result.status, &result.resolved_path) {
            (MatchStatus::Matched, Some(path)) => println!(" -> {}", path.display()),
            _ => println!(),
        }

        if result.status == MatchStatus::Ambiguous {
            for candidate in &result.considered {
                println!("    root {}: {}", candidate.root, candidate.path.display());
            }
        }
    }

    Ok(0)
}
