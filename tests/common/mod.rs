// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use rpmdeps::manifest::ManifestListing;
use rpmdeps::{hash, HashAlgorithm, PackagedFile, RunConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const REGULAR: u32 = 0o100644;
pub const EXECUTABLE: u32 = 0o100755;
pub const SYMLINK: u32 = 0o120777;
pub const DIRECTORY: u32 = 0o040755;

/// A scratch tree holding source directories and a package manifest.
///
/// Keep the workspace alive for as long as its paths are used.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, rel: &str, content: &[u8]) -> PathBuf {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Save a manifest listing for `files` under `pkg/` (outside every search root).
    pub fn write_manifest(&self, name: &str, files: &[PackagedFile]) -> PathBuf {
        self.write(&format!("pkg/{}", name), ManifestListing::render(files).as_bytes())
    }

    /// Configuration reading listings, searching `roots` in order, rule to `out/<name>.d`.
    pub fn config(&self, roots: &[&str]) -> RunConfig {
        fs::create_dir_all(self.join("out")).unwrap();
        RunConfig {
            search_dirs: roots.iter().map(|r| self.join(r)).collect(),
            output: Some(self.join("out/pkg.d")),
            extractor: rpmdeps::ExtractorKind::Listing,
            strip_dirname: true,
            ..RunConfig::default()
        }
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.join(rel)).unwrap()
    }
}

/// A packaged file whose SHA-256 digest is that of `content`.
pub fn packaged(archive_path: &str, content: &[u8], mode: u32) -> PackagedFile {
    PackagedFile::new(
        archive_path,
        content.len() as u64,
        mode,
        Some(hash::hash_bytes(HashAlgorithm::Sha256, content)),
    )
}

/// Same as [`packaged`] with an MD5 digest, as older rpmbuild wrote them.
pub fn packaged_md5(archive_path: &str, content: &[u8], mode: u32) -> PackagedFile {
    PackagedFile::new(
        archive_path,
        content.len() as u64,
        mode,
        Some(hash::hash_bytes(HashAlgorithm::Md5, content)),
    )
}

/// A directory entry; directories never carry a digest.
pub fn directory(archive_path: &str) -> PackagedFile {
    PackagedFile::new(archive_path, 4096, DIRECTORY, None)
}

/// A symlink entry without a digest.
pub fn symlink(archive_path: &str) -> PackagedFile {
    PackagedFile::new(archive_path, 12, SYMLINK, None)
}
