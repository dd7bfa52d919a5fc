// src/matcher.rs

//! Matching packaged files to files on disk
//!
//! Regular files are matched on content digest *and* basename: packaging may
//! post-process payload files, so a name alone is weak evidence, while a
//! digest alone is shared by unrelated files with the same content (empty
//! files, generated boilerplate). When no candidate satisfies both, a single
//! digest-only candidate is accepted as a relocated copy.
//!
//! Executables can opt into name-only matching, because debug-info
//! extraction and stripping rewrite them between the build tree and the
//! package while keeping their names.

use crate::index::{DigestIndex, FilesystemCandidate};
use crate::manifest::{FileKind, PackagedFile};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Per-run matching switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Match executable packaged files by basename only
    pub match_executable_by_name_only: bool,
}

/// Policy applied to one packaged file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    DualCriteria,
    NameOnly,
}

/// Which lookup produced the considered candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchBasis {
    /// Same digest and same basename
    NameAndDigest,
    /// Same digest, different basename
    DigestOnly,
    /// Same basename, digest not checked
    NameOnly,
}

impl fmt::Display for MatchBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameAndDigest => write!(f, "name+digest"),
            Self::DigestOnly => write!(f, "digest-only"),
            Self::NameOnly => write!(f, "name-only"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Matched,
    /// Several equally ranked candidates; none is chosen
    Ambiguous,
    Unmatched,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched => write!(f, "matched"),
            Self::Ambiguous => write!(f, "ambiguous"),
            Self::Unmatched => write!(f, "unmatched"),
        }
    }
}

/// Outcome of matching one packaged file
///
/// `Matched` always carries `resolved_path`, and that path is one of
/// `considered`. `Ambiguous` carries at least two considered candidates;
/// its `resolved_path` is the first in tie-break order and is reported for
/// diagnostics only. `Unmatched` considers nothing.
#[derive(Debug, Clone)]
pub struct MatchResult<'a> {
    pub file: &'a PackagedFile,
    pub status: MatchStatus,
    pub policy: MatchPolicy,
    pub basis: Option<MatchBasis>,
    pub resolved_path: Option<PathBuf>,
    /// Candidates in tie-break order
    pub considered: Vec<&'a FilesystemCandidate>,
}

impl<'a> MatchResult<'a> {
    fn unmatched(file: &'a PackagedFile, policy: MatchPolicy) -> Self {
        Self {
            file,
            status: MatchStatus::Unmatched,
            policy,
            basis: None,
            resolved_path: None,
            considered: Vec::new(),
        }
    }

    /// Resolve a non-empty candidate set with the tie-break rule
    ///
    /// Candidates are ranked by root priority, then path. The best one wins
    /// outright only if no other candidate shares its root.
    fn resolve(
        file: &'a PackagedFile,
        policy: MatchPolicy,
        basis: MatchBasis,
        mut candidates: Vec<&'a FilesystemCandidate>,
    ) -> Self {
        candidates.sort_by(|a, b| a.root.cmp(&b.root).then_with(|| a.path.cmp(&b.path)));

        let status = match candidates.as_slice() {
            [] => return Self::unmatched(file, policy),
            [_] => MatchStatus::Matched,
            [best, runner_up, ..] if best.root < runner_up.root => MatchStatus::Matched,
            _ => MatchStatus::Ambiguous,
        };

        Self {
            file,
            status,
            policy,
            basis: Some(basis),
            resolved_path: Some(candidates[0].path.clone()),
            considered: candidates,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.status == MatchStatus::Matched
    }

    /// Path chosen for this file, only when it is a definite match
    pub fn matched_path(&self) -> Option<&Path> {
        match self.status {
            MatchStatus::Matched => self.resolved_path.as_deref(),
            _ => None,
        }
    }
}

/// Matches packaged files against a fully built index
pub struct Matcher<'a> {
    index: &'a DigestIndex,
    options: MatchOptions,
}

impl<'a> Matcher<'a> {
    pub fn new(index: &'a DigestIndex, options: MatchOptions) -> Self {
        Self { index, options }
    }

    /// Policy for a packaged file under this run's options
    pub fn policy_for(&self, file: &PackagedFile) -> MatchPolicy {
        if file.kind == FileKind::Executable && self.options.match_executable_by_name_only {
            MatchPolicy::NameOnly
        } else {
            MatchPolicy::DualCriteria
        }
    }

    /// Match one packaged file; directories produce no result
    pub fn match_file(&self, file: &'a PackagedFile) -> Option<MatchResult<'a>> {
        if file.kind == FileKind::Directory {
            return None;
        }

        let result = match self.policy_for(file) {
            MatchPolicy::DualCriteria => self.match_dual(file),
            MatchPolicy::NameOnly => self.match_name_only(file),
        };

        debug!(
            "{} -> {} ({} candidates)",
            file.archive_path,
            result.status,
            result.considered.len()
        );
        Some(result)
    }

    fn match_dual(&self, file: &'a PackagedFile) -> MatchResult<'a> {
        let policy = MatchPolicy::DualCriteria;
        let Some(digest) = &file.digest else {
            return MatchResult::unmatched(file, policy);
        };

        let by_digest = self.index.by_digest(digest);
        if by_digest.is_empty() {
            return MatchResult::unmatched(file, policy);
        }

        let named: HashSet<&Path> = self
            .index
            .by_name(file.file_name())
            .into_iter()
            .map(|c| c.path.as_path())
            .collect();
        let both: Vec<&FilesystemCandidate> = by_digest
            .iter()
            .copied()
            .filter(|c| named.contains(c.path.as_path()))
            .collect();

        if both.is_empty() {
            MatchResult::resolve(file, policy, MatchBasis::DigestOnly, by_digest)
        } else {
            MatchResult::resolve(file, policy, MatchBasis::NameAndDigest, both)
        }
    }

    fn match_name_only(&self, file: &'a PackagedFile) -> MatchResult<'a> {
        let by_name = self.index.by_name(file.file_name());
        MatchResult::resolve(file, MatchPolicy::NameOnly, MatchBasis::NameOnly, by_name)
    }

    /// Match a whole manifest in parallel, keeping manifest order
    pub fn match_all(&self, files: &'a [PackagedFile]) -> Vec<MatchResult<'a>> {
        files
            .par_iter()
            .filter_map(|file| self.match_file(file))
            .collect()
    }
}
