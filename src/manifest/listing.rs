// src/manifest/listing.rs

//! Text manifest listings
//!
//! One packaged file per line, in the same shape `rpm -qp --qf` produces:
//!
//! ```text
//! <path>,<size>,<digest>,<mode>,<flags>
//! ```
//!
//! `mode` and `flags` are decimal, `digest` may be empty. Fields are split
//! from the right, so paths containing commas survive. Blank lines and lines
//! starting with `#` are ignored.

use super::{parse_rpm_digest, Manifest, ManifestSource, PackagedFile, RPMFILE_GHOST};
use crate::error::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Manifest read from a saved listing file
#[derive(Debug, Clone)]
pub struct ManifestListing {
    manifest: Manifest,
}

impl ManifestListing {
    /// Parse listing text. `archive_path` names the package it describes.
    pub fn parse(archive_path: &Path, text: &str) -> Result<Self> {
        let files = parse_lines(text)?;
        Ok(Self {
            manifest: Manifest {
                archive_path: archive_path.to_path_buf(),
                files,
            },
        })
    }

    /// Render packaged files back into listing text
    pub fn render(files: &[PackagedFile]) -> String {
        let mut out = String::new();
        for file in files {
            let digest = file.digest.as_ref().map(|d| d.as_str()).unwrap_or("");
            out.push_str(&format!(
                "{},{},{},{},0\n",
                file.archive_path, file.size, digest, file.mode
            ));
        }
        out
    }
}

/// Parse listing lines, dropping `%ghost` entries
pub(crate) fn parse_lines(text: &str) -> Result<Vec<PackagedFile>> {
    let mut files = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim_end();
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let (record, flags) = parse_line(line).map_err(|reason| Error::ManifestLine {
            line: line_no,
            reason,
        })?;

        if flags & RPMFILE_GHOST != 0 {
            debug!("Skipping %ghost entry {}", record.archive_path);
            continue;
        }
        files.push(record);
    }

    Ok(files)
}

fn parse_line(line: &str) -> std::result::Result<(PackagedFile, u32), String> {
    let fields: Vec<&str> = line.rsplitn(5, ',').collect();

    // rsplitn yields fields right to left
    let &[flags, mode, digest, size, path] = fields.as_slice() else {
        return Err(format!("expected 5 comma-separated fields, got {}", fields.len()));
    };

    if path.is_empty() {
        return Err("empty path".to_string());
    }
    let size: u64 = size
        .trim()
        .parse()
        .map_err(|_| format!("invalid size '{}'", size))?;
    let mode: u32 = mode
        .trim()
        .parse()
        .map_err(|_| format!("invalid mode '{}'", mode))?;
    let flags: u32 = flags
        .trim()
        .parse()
        .map_err(|_| format!("invalid flags '{}'", flags))?;

    let digest = parse_rpm_digest(path, digest);
    Ok((PackagedFile::new(path, size, mode, digest), flags))
}

impl ManifestSource for ManifestListing {
    fn open(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(path, &text)
    }

    fn archive_path(&self) -> &Path {
        &self.manifest.archive_path
    }

    fn files(&self) -> &[PackagedFile] {
        &self.manifest.files
    }
}
