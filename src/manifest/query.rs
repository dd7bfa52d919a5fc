// src/manifest/query.rs

//! Manifest extraction through the `rpm` command-line tool
//!
//! Useful when the package uses a header feature the in-process decoder does
//! not understand: whatever the local `rpm` can read, this can read.

use super::listing::parse_lines;
use super::{Manifest, ManifestSource, PackagedFile};
use crate::error::{Error, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Query format producing one listing line per packaged file
///
/// Despite the tag name, `FILEDIGESTS` holds whatever algorithm the package
/// was built with.
pub const QUERY_FORMAT: &str =
    "[%{FILENAMES},%{FILESIZES},%{FILEDIGESTS},%{FILEMODES},%{FILEFLAGS}\\n]";

/// Manifest obtained from `rpm -qp`
#[derive(Debug, Clone)]
pub struct RpmQueryManifest {
    manifest: Manifest,
}

impl ManifestSource for RpmQueryManifest {
    fn open(path: &Path) -> Result<Self> {
        debug!("Querying RPM package: {}", path.display());

        let output = Command::new("rpm")
            .arg("-qp")
            .arg("--queryformat")
            .arg(QUERY_FORMAT)
            .arg(path)
            .output()
            .map_err(|e| Error::Manifest(format!("Failed to run rpm: {}. Is rpm installed?", e)))?;

        if !output.status.success() {
            return Err(Error::Manifest(format!(
                "rpm -qp {} failed: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let files = parse_lines(&String::from_utf8_lossy(&output.stdout))?;
        debug!("rpm reported {} packaged files", files.len());

        Ok(Self {
            manifest: Manifest {
                archive_path: path.to_path_buf(),
                files,
            },
        })
    }

    fn archive_path(&self) -> &Path {
        &self.manifest.archive_path
    }

    fn files(&self) -> &[PackagedFile] {
        &self.manifest.files
    }
}
