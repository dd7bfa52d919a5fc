// src/commands/manifest.rs

use anyhow::{Context, Result};
use rpmdeps::manifest::{self, ManifestListing};
use rpmdeps::ExtractorKind;
use std::path::Path;

/// Print the manifest of `archive` in listing format
pub fn cmd_manifest(archive: &Path, extractor: ExtractorKind) -> Result<u8> {
    let source = manifest::open(extractor, archive)
        .with_context(|| format!("Failed to read manifest of {}", archive.display()))?;

    print!("{}", ManifestListing::render(source.files()));
    Ok(0)
}
