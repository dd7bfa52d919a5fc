// src/commands/rules.rs

//! The main run: write the dependency rule for a package

use super::resolve_config;
use crate::cli::RunArgs;
use anyhow::{Context, Result};
use rpmdeps::{DependencyLister, Verdict};
use std::io::Write;

/// Exit status of a strict run that found ambiguous or missing files
pub const EXIT_STRICT_FAILURE: u8 = 3;

/// List dependencies and write the rule; returns the process exit status
pub fn cmd_rules(args: &RunArgs) -> Result<u8> {
    let config = resolve_config(args)?;
    let lister = DependencyLister::new(config);

    let outcome = lister
        .run(&args.archive)
        .with_context(|| format!("Failed to list dependencies of {}", args.archive.display()))?;

    if let Verdict::Fatal(reasons) = &outcome.verdict {
        eprintln!("Strict mode: not writing a rule for {}", args.archive.display());
        for reason in reasons {
            eprintln!("  {}", reason);
        }
        for file in &outcome.report.ambiguous_files {
            eprintln!("  ambiguous: {}", file.archive_path);
        }
        for file in outcome.report.unmatched_files.iter().filter(|f| f.kind.is_payload()) {
            eprintln!("  unmatched: {} ({})", file.archive_path, file.kind);
        }
        return Ok(EXIT_STRICT_FAILURE);
    }

    if let Some(text) = &outcome.rule_text {
        if outcome.wants_stdout(lister.config(), &args.archive) {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .context("Failed to write rule to stdout")?;
        }
    }

    Ok(0)
}
