// src/cli.rs
//! CLI definitions for rpmdeps
//!
//! - `rules` - List a package's source files as a make rule
//! - `manifest` - Print the extracted manifest
//! - `explain` - Show how each packaged file was matched

use clap::{Args, Parser, Subcommand};
use rpmdeps::{ExtractorKind, RuleLayout, RunConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rpmdeps")]
#[command(author, version)]
#[command(about = "Generate make dependency rules from the files packaged into an RPM", long_about = None)]
pub struct Cli {
    /// Log debug details (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the make rule listing the package's source files
    Rules(RunArgs),

    /// Print the package manifest in listing format
    Manifest {
        /// Package archive or saved listing
        archive: PathBuf,

        /// How to read the manifest
        #[arg(long, value_enum, default_value_t = ExtractorKind::Auto)]
        extractor: ExtractorKind,
    },

    /// Show the match result of every packaged file
    Explain(RunArgs),
}

/// Options shared by the commands that match against the filesystem
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Package archive (or saved listing with --extractor listing)
    pub archive: PathBuf,

    /// Run configuration file; flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory to search for source files, highest priority first
    /// (default: the archive's directory)
    #[arg(short = 'd', long = "search-dir")]
    pub search_dirs: Vec<PathBuf>,

    /// Rule output file, `-` for stdout (default: <archive>.d)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fail when a packaged file is ambiguous or not found
    #[arg(short, long)]
    pub strict: bool,

    /// Match executables by file name only (e.g. stripped binaries)
    #[arg(long)]
    pub match_executable_by_name_only: bool,

    /// Write the unmatched packaged paths to this file
    #[arg(long = "dump-unmatched", value_name = "PATH")]
    pub dump_unmatched_to: Option<PathBuf>,

    /// Prerequisite to add regardless of matching (repeatable)
    #[arg(short = 'e', long = "explicit-dependency", value_name = "PATH")]
    pub explicit_dependencies: Vec<String>,

    /// Use the archive's file name as the rule target
    #[arg(long)]
    pub strip_dirname: bool,

    /// Emit an empty rule for every prerequisite
    #[arg(long)]
    pub empty_recipes: bool,

    /// Rule layout
    #[arg(long, value_enum)]
    pub layout: Option<RuleLayout>,

    /// How to read the manifest
    #[arg(long, value_enum)]
    pub extractor: Option<ExtractorKind>,
}

impl RunArgs {
    /// Apply the flags on top of a configuration
    ///
    /// Switches can only be turned on from the command line. Search
    /// directories given here replace the configured ones.
    pub fn apply(&self, mut config: RunConfig) -> RunConfig {
        if !self.search_dirs.is_empty() {
            config.search_dirs = self.search_dirs.clone();
        }
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        if let Some(dump) = &self.dump_unmatched_to {
            config.dump_unmatched_to = Some(dump.clone());
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if let Some(extractor) = self.extractor {
            config.extractor = extractor;
        }
        config
            .explicit_dependencies
            .extend(self.explicit_dependencies.iter().cloned());
        config.strict |= self.strict;
        config.match_executable_by_name_only |= self.match_executable_by_name_only;
        config.strip_dirname |= self.strip_dirname;
        config.empty_recipes |= self.empty_recipes;
        config
    }
}
