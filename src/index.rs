// src/index.rs

//! Digest index over the search directories
//!
//! The search roots are walked once, up front. Every regular file (and every
//! symlink resolving to one) becomes a [`FilesystemCandidate`], reachable by
//! basename and by content digest. Matching then costs one hash lookup per
//! packaged file instead of a tree scan.
//!
//! Bucket order is discovery order: roots in declaration order, entries in
//! file-name order within each directory. Digests are computed in parallel
//! but inserted sequentially, so the index is identical from run to run.

use crate::hash::{self, Hash, HashAlgorithm};
use crate::manifest::PackagedFile;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A directory tree searched for source files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRoot {
    pub path: PathBuf,
    /// Declaration index; lower wins ties
    pub priority: usize,
}

impl SearchRoot {
    /// Assign priorities from declaration order
    pub fn ordered<I, P>(paths: I) -> Vec<SearchRoot>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths
            .into_iter()
            .enumerate()
            .map(|(priority, path)| SearchRoot {
                path: path.into(),
                priority,
            })
            .collect()
    }
}

/// A search root that could not be indexed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRoot {
    pub path: PathBuf,
    pub reason: String,
}

/// A file found under a search root
#[derive(Debug, Clone)]
pub struct FilesystemCandidate {
    pub path: PathBuf,
    /// Priority of the root it was found under
    pub root: usize,
    pub size: u64,
    pub mtime: Option<SystemTime>,
    /// One digest per requested algorithm; empty when not digested
    pub digests: Vec<Hash>,
}

impl FilesystemCandidate {
    /// Basename of the candidate
    pub fn file_name(&self) -> Option<&OsStr> {
        self.path.file_name()
    }

    /// Digest computed with `algorithm`, if any
    pub fn digest(&self, algorithm: HashAlgorithm) -> Option<&Hash> {
        self.digests.iter().find(|d| d.algorithm == algorithm)
    }
}

/// What the index needs to compute
///
/// Digests are only worth computing for files that could equal some packaged
/// file: identical content means identical size, so candidates whose size
/// appears nowhere in the manifest are indexed by name only.
#[derive(Debug, Clone, Default)]
pub struct IndexRequest {
    algorithms: BTreeSet<HashAlgorithm>,
    sizes: Option<HashSet<u64>>,
}

impl IndexRequest {
    /// Request covering every digest-bearing record of a manifest
    pub fn for_manifest(files: &[PackagedFile]) -> Self {
        let mut algorithms = BTreeSet::new();
        let mut sizes = HashSet::new();
        for file in files {
            if let Some(digest) = &file.digest {
                algorithms.insert(digest.algorithm);
                sizes.insert(file.size);
            }
        }
        Self {
            algorithms,
            sizes: Some(sizes),
        }
    }

    /// Digest every candidate with the given algorithms, whatever its size
    pub fn all<I: IntoIterator<Item = HashAlgorithm>>(algorithms: I) -> Self {
        Self {
            algorithms: algorithms.into_iter().collect(),
            sizes: None,
        }
    }

    /// Algorithms to compute, in a stable order
    pub fn algorithms(&self) -> Vec<HashAlgorithm> {
        self.algorithms.iter().copied().collect()
    }

    fn wants_digest(&self, size: u64) -> bool {
        !self.algorithms.is_empty() && self.sizes.as_ref().is_none_or(|s| s.contains(&size))
    }
}

/// Read-only lookup tables over all discovered candidates
#[derive(Debug, Default)]
pub struct DigestIndex {
    candidates: Vec<FilesystemCandidate>,
    by_digest: HashMap<Hash, Vec<usize>>,
    by_name: HashMap<OsString, Vec<usize>>,
    skipped_roots: Vec<SkippedRoot>,
}

impl DigestIndex {
    /// Walk `roots` in order and index everything found
    ///
    /// Missing or unreadable roots are logged and skipped; unreadable files
    /// are indexed by name only.
    pub fn build(roots: &[SearchRoot], request: &IndexRequest) -> Self {
        let mut skipped_roots = Vec::new();
        let mut discovered = Vec::new();
        let mut seen = HashSet::new();

        for root in roots {
            if let Err(reason) = check_root(&root.path) {
                warn!("Skipping search directory '{}': {}", root.path.display(), reason);
                skipped_roots.push(SkippedRoot {
                    path: root.path.clone(),
                    reason,
                });
                continue;
            }

            let before = discovered.len();
            if let Err(reason) = walk_root(root, &mut seen, &mut discovered) {
                warn!("Skipping search directory '{}': {}", root.path.display(), reason);
                skipped_roots.push(SkippedRoot {
                    path: root.path.clone(),
                    reason,
                });
                continue;
            }
            debug!(
                "Found {} files under '{}'",
                discovered.len() - before,
                root.path.display()
            );
        }

        let algorithms = request.algorithms();
        let digests: Vec<Vec<Hash>> = discovered
            .par_iter()
            .map(|candidate: &FilesystemCandidate| {
                if !request.wants_digest(candidate.size) {
                    return Vec::new();
                }
                match hash::hash_file(&candidate.path, &algorithms) {
                    Ok(digests) => digests,
                    Err(e) => {
                        warn!("Cannot digest '{}': {}", candidate.path.display(), e);
                        Vec::new()
                    }
                }
            })
            .collect();

        let mut index = Self {
            skipped_roots,
            ..Self::default()
        };
        for (mut candidate, digests) in discovered.into_iter().zip(digests) {
            candidate.digests = digests;
            index.insert(candidate);
        }

        info!(
            "Indexed {} files ({} digested) across {} search directories",
            index.candidates.len(),
            index.candidates.iter().filter(|c| !c.digests.is_empty()).count(),
            roots.len() - index.skipped_roots.len()
        );
        index
    }

    fn insert(&mut self, candidate: FilesystemCandidate) {
        let slot = self.candidates.len();
        for digest in &candidate.digests {
            self.by_digest.entry(digest.clone()).or_default().push(slot);
        }
        if let Some(name) = candidate.file_name() {
            self.by_name.entry(name.to_os_string()).or_default().push(slot);
        }
        self.candidates.push(candidate);
    }

    /// Candidates whose content has digest `digest`, in discovery order
    pub fn by_digest(&self, digest: &Hash) -> Vec<&FilesystemCandidate> {
        self.lookup(self.by_digest.get(digest))
    }

    /// Candidates whose basename is `name`, in discovery order
    pub fn by_name(&self, name: &str) -> Vec<&FilesystemCandidate> {
        self.lookup(self.by_name.get(OsStr::new(name)))
    }

    fn lookup(&self, slots: Option<&Vec<usize>>) -> Vec<&FilesystemCandidate> {
        slots
            .map(|slots| slots.iter().map(|&i| &self.candidates[i]).collect())
            .unwrap_or_default()
    }

    /// All candidates in discovery order
    pub fn candidates(&self) -> &[FilesystemCandidate] {
        &self.candidates
    }

    /// Roots that were declared but could not be indexed
    pub fn skipped_roots(&self) -> &[SkippedRoot] {
        &self.skipped_roots
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

fn check_root(path: &Path) -> Result<(), String> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err("not a directory".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Collect the candidates of one root, skipping paths already seen
fn walk_root(
    root: &SearchRoot,
    seen: &mut HashSet<PathBuf>,
    out: &mut Vec<FilesystemCandidate>,
) -> Result<(), String> {
    let walker = WalkDir::new(&root.path)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // The root itself could not be listed
            Err(e) if e.depth() == 0 => return Err(e.to_string()),
            Err(e) => {
                warn!("Skipping unreadable entry under '{}': {}", root.path.display(), e);
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }

        // Follows symlinks; broken links and links to directories drop out
        let meta = match fs::metadata(entry.path()) {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => {
                debug!("Ignoring non-regular entry '{}'", entry.path().display());
                continue;
            }
            Err(e) => {
                debug!("Ignoring unresolvable entry '{}': {}", entry.path().display(), e);
                continue;
            }
        };

        let path = entry.into_path();
        if !seen.insert(path.clone()) {
            continue;
        }

        out.push(FilesystemCandidate {
            path,
            root: root.priority,
            size: meta.len(),
            mtime: meta.modified().ok(),
            digests: Vec::new(),
        });
    }

    Ok(())
}
