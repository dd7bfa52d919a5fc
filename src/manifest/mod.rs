// src/manifest/mod.rs

//! Package manifests: the list of files a built package installs
//!
//! Decoding the archive itself is delegated to a [`ManifestSource`]
//! implementation. The rest of the crate only sees the ordered list of
//! [`PackagedFile`] records it produces.

pub mod listing;
pub mod query;
pub mod rpm;

pub use self::listing::ManifestListing;
pub use self::query::RpmQueryManifest;
pub use self::rpm::RpmManifest;

use crate::error::{Error, Result};
use crate::hash::Hash;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const S_IFMT: u32 = 0o170000;
const S_IFDIR: u32 = 0o040000;
const S_IFLNK: u32 = 0o120000;
const EXEC_BITS: u32 = 0o111;

/// RPM file flag marking `%ghost` entries (not present in the payload)
pub const RPMFILE_GHOST: u32 = 1 << 6;

/// Kind of a packaged file, derived from its mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Regular,
    Executable,
    Symlink,
    Directory,
}

impl FileKind {
    /// Classify a raw Unix mode as reported by RPM
    pub fn from_mode(mode: u32) -> Self {
        match mode & S_IFMT {
            S_IFDIR => Self::Directory,
            S_IFLNK => Self::Symlink,
            _ if mode & EXEC_BITS != 0 => Self::Executable,
            _ => Self::Regular,
        }
    }

    /// Whether a missing match for this kind makes a strict run fail
    pub fn is_payload(&self) -> bool {
        matches!(self, Self::Regular | Self::Executable)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => write!(f, "regular"),
            Self::Executable => write!(f, "executable"),
            Self::Symlink => write!(f, "symlink"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

/// One entry of a package's file list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedFile {
    /// Absolute install path inside the package (e.g. `/usr/bin/foo`)
    pub archive_path: String,
    pub size: u64,
    /// Raw Unix mode
    pub mode: u32,
    pub digest: Option<Hash>,
    pub kind: FileKind,
}

impl PackagedFile {
    /// Create a record, deriving its kind from `mode`
    ///
    /// Directories never carry a digest, whatever the caller passes.
    pub fn new(archive_path: impl Into<String>, size: u64, mode: u32, digest: Option<Hash>) -> Self {
        let kind = FileKind::from_mode(mode);
        let digest = if kind == FileKind::Directory { None } else { digest };
        Self {
            archive_path: archive_path.into(),
            size,
            mode,
            digest,
            kind,
        }
    }

    /// Basename of the packaged path
    pub fn file_name(&self) -> &str {
        self.archive_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.archive_path)
    }
}

/// Parse an RPM digest string
///
/// Empty and all-zero digests mean "no digest" (directories, symlinks,
/// ghost files). Digests of an unexpected length are logged and dropped so a
/// single odd entry does not abort the whole run.
pub fn parse_rpm_digest(path: &str, raw: &str) -> Option<Hash> {
    let raw = raw.trim();
    if raw.is_empty() || raw.chars().all(|c| c == '0') {
        return None;
    }
    match Hash::detect(raw) {
        Ok(hash) => Some(hash),
        Err(e) => {
            warn!("Ignoring digest of '{}': {}", path, e);
            None
        }
    }
}

/// Common interface for everything that can list a package's files
pub trait ManifestSource {
    /// Read the manifest of the package at `path`
    fn open(path: &Path) -> Result<Self>
    where
        Self: Sized;

    /// Path of the package archive the manifest was read from
    fn archive_path(&self) -> &Path;

    /// Packaged files in manifest order
    fn files(&self) -> &[PackagedFile];
}

/// How to obtain a package manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorKind {
    /// Detect from extension and magic bytes
    #[default]
    Auto,
    /// Decode the RPM header in-process
    Rpm,
    /// Run `rpm -qp` on the package
    Query,
    /// Read a saved manifest listing
    Listing,
}

/// RPM lead magic
const RPM_MAGIC: [u8; 4] = [0xED, 0xAB, 0xEE, 0xDB];

/// Pick an extractor for `path` from its extension, then its magic bytes
fn detect_extractor(path: &Path) -> Result<ExtractorKind> {
    if path.extension().is_some_and(|ext| ext == "rpm") {
        return Ok(ExtractorKind::Rpm);
    }

    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut magic = [0u8; 4];
    let is_rpm = file.read_exact(&mut magic).is_ok() && magic == RPM_MAGIC;

    Ok(if is_rpm {
        ExtractorKind::Rpm
    } else {
        ExtractorKind::Listing
    })
}

/// Open the manifest of `path` with the requested extractor
pub fn open(kind: ExtractorKind, path: &Path) -> Result<Box<dyn ManifestSource>> {
    let kind = match kind {
        ExtractorKind::Auto => detect_extractor(path)?,
        other => other,
    };
    debug!("Reading manifest of {} with {:?} extractor", path.display(), kind);

    let source: Box<dyn ManifestSource> = match kind {
        ExtractorKind::Rpm => Box::new(RpmManifest::open(path)?),
        ExtractorKind::Query => Box::new(RpmQueryManifest::open(path)?),
        ExtractorKind::Listing | ExtractorKind::Auto => Box::new(ManifestListing::open(path)?),
    };
    Ok(source)
}

/// Manifest data shared by the extractor implementations
#[derive(Debug, Clone)]
pub(crate) struct Manifest {
    pub archive_path: PathBuf,
    pub files: Vec<PackagedFile>,
}
