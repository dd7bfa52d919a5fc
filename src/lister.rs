// src/lister.rs

//! One dependency listing run: manifest in, make rule out
//!
//! The lister ties the pieces together. It builds the digest index over the
//! search roots, matches every packaged file, aggregates the results and
//! decides the verdict. It then writes the unmatched dump and, unless the
//! verdict is fatal, the rule.

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::index::{DigestIndex, IndexRequest, SearchRoot};
use crate::manifest::{self, ManifestSource};
use crate::matcher::{MatchOptions, Matcher, MatchStatus};
use crate::report::{DependencyRule, ReportBuilder, RunReport, Verdict};
use crate::rule::RuleEmitter;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Result of a listing run
#[derive(Debug, Clone)]
pub struct Outcome {
    pub rule: DependencyRule,
    pub report: RunReport,
    pub verdict: Verdict,
    /// Rendered rule; `None` when the verdict is fatal
    pub rule_text: Option<String>,
    /// File the rule was written to
    ///
    /// `None` when the verdict is fatal or the configured output is stdout;
    /// printing is left to the caller in the latter case.
    pub output: Option<PathBuf>,
}

impl Outcome {
    /// Whether the caller should print `rule_text` to stdout
    pub fn wants_stdout(&self, config: &RunConfig, archive: &Path) -> bool {
        !self.verdict.is_fatal() && config.output_for(archive).is_none()
    }
}

/// Runs dependency listing for package archives
#[derive(Debug, Clone, Default)]
pub struct DependencyLister {
    config: RunConfig,
}

impl DependencyLister {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            match_executable_by_name_only: self.config.match_executable_by_name_only,
        }
    }

    /// Read the manifest of `archive` and list its dependencies
    pub fn run(&self, archive: &Path) -> Result<Outcome> {
        let source = manifest::open(self.config.extractor, archive)?;
        self.run_with_manifest(source.as_ref())
    }

    /// Build the digest index the manifest of `source` needs
    pub fn index_for(&self, source: &dyn ManifestSource) -> DigestIndex {
        let archive = source.archive_path();
        let roots = SearchRoot::ordered(self.config.search_dirs_for(archive));
        DigestIndex::build(&roots, &IndexRequest::for_manifest(source.files()))
    }

    /// List dependencies for an already extracted manifest
    pub fn run_with_manifest(&self, source: &dyn ManifestSource) -> Result<Outcome> {
        let archive = source.archive_path();
        if self.config.output_for(archive).as_deref() == Some(archive) {
            return Err(Error::Config(format!(
                "rule output would overwrite the package {}",
                archive.display()
            )));
        }

        info!(
            "Listing dependencies of {} ({} packaged files)",
            archive.display(),
            source.files().len()
        );

        let index = self.index_for(source);
        let results = Matcher::new(&index, self.match_options()).match_all(source.files());

        for result in &results {
            match result.status {
                MatchStatus::Ambiguous => warn!(
                    "Ambiguous match for {}: {} equally ranked candidates",
                    result.file.archive_path,
                    result.considered.len()
                ),
                MatchStatus::Unmatched => {
                    debug!("No source found for {} ({})", result.file.archive_path, result.file.kind)
                }
                MatchStatus::Matched => {}
            }
        }

        let (rule, report) = ReportBuilder::new(self.config.target_for(archive))
            .exclude(archive)
            .explicit(self.config.explicit_dependencies.iter().cloned())
            .skipped_roots(index.skipped_roots())
            .aggregate(&results);

        info!(
            "{} matched, {} ambiguous, {} unmatched",
            report.matched_count, report.ambiguous_count, report.unmatched_count
        );

        let verdict = report.verdict(self.config.strict);

        if let Some(dump) = &self.config.dump_unmatched_to {
            write_unmatched_dump(dump, &report)?;
        }

        let emitter = RuleEmitter::new(self.config.layout, self.config.empty_recipes);
        let (rule_text, output) = match (&verdict, self.config.output_for(archive)) {
            (Verdict::Fatal(reasons), _) => {
                for reason in reasons {
                    warn!("{}", reason);
                }
                (None, None)
            }
            (Verdict::Success, Some(path)) => {
                let text = emitter.emit(&rule);
                write_atomic(&path, &text)?;
                info!("Wrote {} prerequisites to {}", rule.prerequisites.len(), path.display());
                (Some(text), Some(path))
            }
            (Verdict::Success, None) => (Some(emitter.emit(&rule)), None),
        };

        Ok(Outcome {
            rule,
            report,
            verdict,
            rule_text,
            output,
        })
    }
}

/// Write or clear the list of unmatched archive paths
///
/// A run without unmatched files removes a list left by an earlier run.
fn write_unmatched_dump(path: &Path, report: &RunReport) -> Result<()> {
    if report.unmatched_files.is_empty() {
        return match std::fs::remove_file(path) {
            Ok(()) => {
                debug!("Removed stale unmatched list {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(path, e)),
        };
    }

    write_atomic(path, &report.unmatched_listing())?;
    info!(
        "Listed {} unmatched files in {}",
        report.unmatched_files.len(),
        path.display()
    );
    Ok(())
}

/// Replace `path` with `contents` through a temporary file in the same directory
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    temp.write_all(contents.as_bytes())
        .map_err(|e| Error::io(path, e))?;
    temp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}
