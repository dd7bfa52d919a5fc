// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Arguments shared by `rules` and `explain`
fn run_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("archive").required(true).help("Package archive (or saved listing)"))
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Run configuration file; flags override it"),
        )
        .arg(
            Arg::new("search_dir")
                .short('d')
                .long("search-dir")
                .value_name("DIR")
                .action(ArgAction::Append)
                .help("Directory to search for source files, highest priority first"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PATH")
                .help("Rule output file, - for stdout (default: <archive>.d)"),
        )
        .arg(
            Arg::new("strict")
                .short('s')
                .long("strict")
                .action(ArgAction::SetTrue)
                .help("Fail when a packaged file is ambiguous or not found"),
        )
        .arg(
            Arg::new("match_executable_by_name_only")
                .long("match-executable-by-name-only")
                .action(ArgAction::SetTrue)
                .help("Match executables by file name only"),
        )
        .arg(
            Arg::new("dump_unmatched")
                .long("dump-unmatched")
                .value_name("PATH")
                .help("Write the unmatched packaged paths to this file"),
        )
        .arg(
            Arg::new("explicit_dependency")
                .short('e')
                .long("explicit-dependency")
                .value_name("PATH")
                .action(ArgAction::Append)
                .help("Prerequisite to add regardless of matching"),
        )
        .arg(
            Arg::new("strip_dirname")
                .long("strip-dirname")
                .action(ArgAction::SetTrue)
                .help("Use the archive's file name as the rule target"),
        )
        .arg(
            Arg::new("empty_recipes")
                .long("empty-recipes")
                .action(ArgAction::SetTrue)
                .help("Emit an empty rule for every prerequisite"),
        )
        .arg(
            Arg::new("layout")
                .long("layout")
                .value_parser(["single-line", "continued"])
                .help("Rule layout"),
        )
        .arg(extractor_arg())
}

fn extractor_arg() -> Arg {
    Arg::new("extractor")
        .long("extractor")
        .value_parser(["auto", "rpm", "query", "listing"])
        .help("How to read the manifest")
}

fn build_cli() -> Command {
    Command::new("rpmdeps")
        .version(env!("CARGO_PKG_VERSION"))
        .author("rpmdeps Contributors")
        .about("Generate make dependency rules from the files packaged into an RPM")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Log debug details (RUST_LOG takes precedence)"),
        )
        .subcommand_required(true)
        .subcommand(run_args(
            Command::new("rules").about("Write the make rule listing the package's source files"),
        ))
        .subcommand(
            Command::new("manifest")
                .about("Print the package manifest in listing format")
                .arg(Arg::new("archive").required(true).help("Package archive or saved listing"))
                .arg(extractor_arg()),
        )
        .subcommand(run_args(
            Command::new("explain").about("Show the match result of every packaged file"),
        ))
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("rpmdeps.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
