// src/lib.rs

//! rpmdeps
//!
//! Lists the source files a built RPM was assembled from and writes them as
//! a GNU make dependency rule, so a package is rebuilt when any of its inputs
//! change.
//!
//! # Architecture
//!
//! - Manifest: the package's file list, read by a [`manifest::ManifestSource`]
//! - Index: one walk over the search roots, bucketed by digest and basename
//! - Matcher: name and digest lookups with root-priority tie-breaking
//! - Report: aggregation into a [`DependencyRule`] and a strict-mode [`Verdict`]
//! - Rule: make text with escaping and optional empty recipes

pub mod config;
mod error;
pub mod hash;
pub mod index;
pub mod lister;
pub mod manifest;
pub mod matcher;
pub mod report;
pub mod rule;

pub use config::RunConfig;
pub use error::{Error, Result};
pub use hash::{Hash, HashAlgorithm, Hasher};
pub use index::{DigestIndex, FilesystemCandidate, IndexRequest, SearchRoot, SkippedRoot};
pub use lister::{DependencyLister, Outcome};
pub use manifest::{ExtractorKind, FileKind, ManifestSource, PackagedFile};
pub use matcher::{MatchBasis, MatchOptions, MatchPolicy, MatchResult, MatchStatus, Matcher};
pub use report::{DependencyRule, FatalReason, ReportBuilder, RunReport, Verdict};
pub use rule::{escape_make_path, RuleEmitter, RuleLayout};
