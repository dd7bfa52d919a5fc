// src/config.rs

//! Run configuration
//!
//! A run can be described in a TOML file:
//!
//! ```toml
//! search_dirs = ["build/out", "src"]
//! strict = true
//! dump_unmatched_to = "build/missed.txt"
//! layout = "continued"
//! ```
//!
//! Command-line flags are applied on top of the file.

use crate::error::{Error, Result};
use crate::manifest::ExtractorKind;
use crate::rule::RuleLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything a dependency listing run needs besides the archive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Search roots in priority order; empty means the archive's directory
    pub search_dirs: Vec<PathBuf>,

    /// Rule output path; `-` is stdout, unset is `<archive>.d`
    pub output: Option<PathBuf>,

    /// Fail on ambiguous or unmatched payload files
    pub strict: bool,

    /// Match executables by file name alone (stripped binaries)
    pub match_executable_by_name_only: bool,

    /// Where to list unmatched archive paths
    pub dump_unmatched_to: Option<PathBuf>,

    /// Prerequisites always added to the rule
    pub explicit_dependencies: Vec<String>,

    /// Use the archive's file name as the rule target
    pub strip_dirname: bool,

    /// Emit an empty rule for every prerequisite
    pub empty_recipes: bool,

    pub layout: RuleLayout,

    pub extractor: ExtractorKind,
}

impl RunConfig {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RunConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check for settings that cannot work together
    pub fn validate(&self) -> Result<()> {
        if self.search_dirs.iter().any(|d| d.as_os_str().is_empty()) {
            return Err(Error::Config("search_dirs contains an empty path".to_string()));
        }

        if let (Some(output), Some(dump)) = (&self.output, &self.dump_unmatched_to) {
            if output == dump {
                return Err(Error::Config(format!(
                    "output and dump_unmatched_to both point to {}",
                    output.display()
                )));
            }
        }

        Ok(())
    }

    /// Rule output path for `archive`, `None` meaning stdout
    ///
    /// The default replaces the extension with `.d`. An archive already
    /// ending in `.d` gets a second `.d` appended instead.
    pub fn output_for(&self, archive: &Path) -> Option<PathBuf> {
        match &self.output {
            Some(path) if path.as_os_str() == "-" => None,
            Some(path) => Some(path.clone()),
            None if archive.extension().is_some_and(|ext| ext == "d") => {
                let mut name = archive.as_os_str().to_owned();
                name.push(".d");
                Some(PathBuf::from(name))
            }
            None => Some(archive.with_extension("d")),
        }
    }

    /// Search roots for `archive`, in priority order
    pub fn search_dirs_for(&self, archive: &Path) -> Vec<PathBuf> {
        if !self.search_dirs.is_empty() {
            return self.search_dirs.clone();
        }
        match archive.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => vec![parent.to_path_buf()],
            _ => vec![PathBuf::from(".")],
        }
    }

    /// Rule target naming `archive`
    pub fn target_for(&self, archive: &Path) -> String {
        let named = if self.strip_dirname {
            archive.file_name().map(Path::new).unwrap_or(archive)
        } else {
            archive
        };
        named.to_string_lossy().into_owned()
    }
}
