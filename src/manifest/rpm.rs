// src/manifest/rpm.rs

//! RPM manifest extraction using the `rpm` crate
//!
//! Only the header is needed: file names, sizes, modes and digests all live
//! in header tags, so the payload is never decompressed.

use super::{parse_rpm_digest, Manifest, ManifestSource, PackagedFile};
use crate::error::{Error, Result};
use rpm::{FileFlags, Package};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Manifest decoded from an RPM header
#[derive(Debug, Clone)]
pub struct RpmManifest {
    manifest: Manifest,
}

impl RpmManifest {
    /// Convert the header's file entries, skipping `%ghost` files
    fn extract_files(pkg: &Package) -> Result<Vec<PackagedFile>> {
        let entries = pkg
            .metadata
            .get_file_entries()
            .map_err(|e| Error::Manifest(format!("Failed to read file entries: {}", e)))?;

        let mut files = Vec::with_capacity(entries.len());
        for entry in entries {
            let path = entry.path.to_string_lossy().to_string();

            if entry.flags.contains(FileFlags::GHOST) {
                debug!("Skipping %ghost entry {}", path);
                continue;
            }

            let digest = entry
                .digest
                .as_ref()
                .and_then(|d| parse_rpm_digest(&path, &format!("{}", d)));

            files.push(PackagedFile::new(
                path,
                entry.size as u64,
                u32::from(entry.mode.raw_mode()),
                digest,
            ));
        }

        Ok(files)
    }
}

impl ManifestSource for RpmManifest {
    fn open(path: &Path) -> Result<Self> {
        debug!("Parsing RPM package: {}", path.display());

        let file = File::open(path)
            .map_err(|e| Error::Manifest(format!("Failed to open RPM file '{}': {}", path.display(), e)))?;
        let mut buf_reader = BufReader::new(file);

        let pkg = Package::parse(&mut buf_reader)
            .map_err(|e| Error::Manifest(format!("Failed to parse RPM '{}': {}", path.display(), e)))?;

        let name = pkg
            .metadata
            .get_name()
            .map_err(|e| Error::Manifest(format!("Failed to get package name: {}", e)))?
            .to_string();

        let files = Self::extract_files(&pkg)?;
        debug!("Parsed RPM {}: {} packaged files", name, files.len());

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
