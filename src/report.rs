// src/report.rs

//! Aggregation of match results into a dependency rule and a run report

use crate::index::SkippedRoot;
use crate::manifest::PackagedFile;
use crate::matcher::{MatchResult, MatchStatus};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A make target and the files it depends on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyRule {
    pub target: String,
    /// Sorted and deduplicated
    pub prerequisites: BTreeSet<String>,
}

/// Why a strict run failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FatalReason {
    Ambiguous(usize),
    Unmatched(usize),
}

impl fmt::Display for FatalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ambiguous(n) => write!(f, "{} packaged files match several files equally well", n),
            Self::Unmatched(n) => write!(f, "{} packaged files were not found in the search directories", n),
        }
    }
}

/// Whether a run may publish its rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Fatal(Vec<FatalReason>),
}

impl Verdict {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// Summary of one run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub matched_count: usize,
    pub ambiguous_count: usize,
    pub unmatched_count: usize,
    /// Unmatched files in manifest order
    pub unmatched_files: Vec<PackagedFile>,
    /// Ambiguous files in manifest order
    pub ambiguous_files: Vec<PackagedFile>,
    pub skipped_roots: Vec<SkippedRoot>,
}

impl RunReport {
    /// Number of packaged files that were matched against the filesystem
    pub fn total(&self) -> usize {
        self.matched_count + self.ambiguous_count + self.unmatched_count
    }

    /// Decide the run outcome
    ///
    /// Outside strict mode every run succeeds, possibly with an incomplete
    /// rule. In strict mode any ambiguous file is fatal, as is any unmatched
    /// regular or executable file; unmatched symlinks are tolerated.
    pub fn verdict(&self, strict: bool) -> Verdict {
        if !strict {
            return Verdict::Success;
        }

        let mut reasons = Vec::new();
        if self.ambiguous_count > 0 {
            reasons.push(FatalReason::Ambiguous(self.ambiguous_count));
        }
        let unmatched_payload = self
            .unmatched_files
            .iter()
            .filter(|f| f.kind.is_payload())
            .count();
        if unmatched_payload > 0 {
            reasons.push(FatalReason::Unmatched(unmatched_payload));
        }

        if reasons.is_empty() {
            Verdict::Success
        } else {
            Verdict::Fatal(reasons)
        }
    }

    /// Unmatched archive paths, one per line
    pub fn unmatched_listing(&self) -> String {
        self.unmatched_files
            .iter()
            .map(|f| format!("{}\n", f.archive_path))
            .collect()
    }
}

/// Builds the dependency rule and report from match results
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    target: String,
    exclude: Vec<PathBuf>,
    explicit: Vec<String>,
    skipped_roots: Vec<SkippedRoot>,
}

impl ReportBuilder {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            exclude: Vec::new(),
            explicit: Vec::new(),
            skipped_roots: Vec::new(),
        }
    }

    /// Never list `path` as a prerequisite (the package's own output)
    pub fn exclude(mut self, path: impl Into<PathBuf>) -> Self {
        self.exclude.push(path.into());
        self
    }

    /// Prerequisites added regardless of matching
    pub fn explicit<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.explicit.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Search roots the index had to skip, carried into the report
    pub fn skipped_roots(mut self, roots: &[SkippedRoot]) -> Self {
        self.skipped_roots = roots.to_vec();
        self
    }

    /// Single pass over the results
    pub fn aggregate(&self, results: &[MatchResult<'_>]) -> (DependencyRule, RunReport) {
        let excluded: Vec<PathBuf> = self.exclude.iter().map(|p| normalize(p)).collect();
        let mut rule = DependencyRule {
            target: self.target.clone(),
            prerequisites: BTreeSet::new(),
        };
        let mut report = RunReport {
            skipped_roots: self.skipped_roots.clone(),
            ..RunReport::default()
        };

        for result in results {
            match result.status {
                MatchStatus::Matched => {
                    report.matched_count += 1;
                    if let Some(path) = result.matched_path() {
                        if excluded.contains(&normalize(path)) {
                            debug!("Dropping self-dependency on {}", path.display());
                            continue;
                        }
                        rule.prerequisites.insert(path.to_string_lossy().into_owned());
                    }
                }
                MatchStatus::Ambiguous => {
                    report.ambiguous_count += 1;
                    report.ambiguous_files.push(result.file.clone());
                }
                MatchStatus::Unmatched => {
                    report.unmatched_count += 1;
                    report.unmatched_files.push(result.file.clone());
                }
            }
        }

        for path in &self.explicit {
            if !path.is_empty() && !excluded.contains(&normalize(Path::new(path))) {
                rule.prerequisites.insert(path.clone());
            }
        }

        (rule, report)
    }
}

/// Absolute, symlink-resolved form of a path when it exists
fn normalize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
