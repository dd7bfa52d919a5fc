// tests/strict.rs

//! Strict mode: fatal verdicts, the unmatched dump and exit codes.

mod common;

use common::{packaged, symlink, Workspace, EXECUTABLE, REGULAR};
use rpmdeps::{DependencyLister, FatalReason, RunConfig, Verdict};
use std::ffi::OsStr;
use std::fs;
use std::process::{Command, Output};

fn run_rpmdeps<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_rpmdeps"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_strict_unmatched_with_dump() {
    let ws = Workspace::new();
    ws.write("src/present", b"present");
    fs::create_dir_all(ws.join("out")).unwrap();
    fs::write(ws.join("out/pkg.d"), "pkg.manifest: stale\n").unwrap();
    let manifest = ws.write_manifest(
        "pkg.manifest",
        &[
            packaged("/usr/share/present", b"present", REGULAR),
            packaged("/usr/bin/absent", b"absent", EXECUTABLE),
            symlink("/usr/lib/libabsent.so"),
        ],
    );

    let config = RunConfig {
        strict: true,
        dump_unmatched_to: Some(ws.join("missed.txt")),
        ..ws.config(&["src"])
    };
    let outcome = DependencyLister::new(config).run(&manifest).unwrap();

    assert_eq!(outcome.verdict, Verdict::Fatal(vec![FatalReason::Unmatched(1)]));
    assert_eq!(ws.read("missed.txt"), "/usr/bin/absent\n/usr/lib/libabsent.so\n");
    assert_eq!(ws.read("out/pkg.d"), "pkg.manifest: stale\n");
}

#[test]
fn test_strict_ambiguous() {
    let ws = Workspace::new();
    ws.write("src/x/lib.txt", b"same");
    ws.write("src/y/lib.txt", b"same");
    let manifest = ws.write_manifest("pkg.manifest", &[packaged("/lib.txt", b"same", REGULAR)]);

    let lenient = DependencyLister::new(ws.config(&["src"])).run(&manifest).unwrap();
    assert_eq!(lenient.verdict, Verdict::Success);
    assert_eq!(lenient.report.ambiguous_count, 1);
    assert!(lenient.rule.prerequisites.is_empty());

    let config = RunConfig {
        strict: true,
        ..ws.config(&["src"])
    };
    let strict = DependencyLister::new(config).run(&manifest).unwrap();
    assert_eq!(strict.verdict, Verdict::Fatal(vec![FatalReason::Ambiguous(1)]));
}

#[test]
fn test_strict_tolerates_unmatched_symlink() {
    let ws = Workspace::new();
    ws.write("src/real", b"real");
    let manifest = ws.write_manifest(
        "pkg.manifest",
        &[packaged("/real", b"real", REGULAR), symlink("/alias")],
    );

    let config = RunConfig {
        strict: true,
        ..ws.config(&["src"])
    };
    let outcome = DependencyLister::new(config).run(&manifest).unwrap();
    assert_eq!(outcome.verdict, Verdict::Success);
    assert_eq!(outcome.report.unmatched_count, 1);
    assert!(ws.join("out/pkg.d").exists());
}

#[test]
fn test_cli_exit_codes() {
    let ws = Workspace::new();
    ws.write("src/present", b"present");
    let manifest = ws.write_manifest(
        "pkg.manifest",
        &[
            packaged("/usr/share/present", b"present", REGULAR),
            packaged("/usr/bin/absent", b"absent", EXECUTABLE),
        ],
    );
    let src = ws.join("src");
    let output = ws.join("pkg.d");

    let lenient = run_rpmdeps([
        OsStr::new("rules"),
        manifest.as_os_str(),
        OsStr::new("--extractor"),
        OsStr::new("listing"),
        OsStr::new("-d"),
        src.as_os_str(),
        OsStr::new("-o"),
        OsStr::new("-"),
        OsStr::new("--strip-dirname"),
    ]);
    assert_eq!(lenient.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&lenient.stdout),
        format!("pkg.manifest: {}\n", src.join("present").display())
    );

    let strict = run_rpmdeps([
        OsStr::new("rules"),
        manifest.as_os_str(),
        OsStr::new("--extractor"),
        OsStr::new("listing"),
        OsStr::new("-d"),
        src.as_os_str(),
        OsStr::new("-o"),
        output.as_os_str(),
        OsStr::new("--strict"),
    ]);
    assert_eq!(strict.status.code(), Some(3));
    assert!(!output.exists());

    let broken = run_rpmdeps([OsStr::new("rules"), ws.join("nope.rpm").as_os_str()]);
    assert_eq!(broken.status.code(), Some(1));
}

#[test]
fn test_cli_manifest_roundtrip() {
    let ws = Workspace::new();
    let manifest = ws.write_manifest(
        "pkg.manifest",
        &[packaged("/usr/share/doc/README", b"readme", REGULAR)],
    );

    let out = run_rpmdeps([OsStr::new("manifest"), manifest.as_os_str()]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&out.stdout), ws.read("pkg/pkg.manifest"));
}

#[test]
fn test_cli_reports_skipped_root_once() {
    let ws = Workspace::new();
    ws.write("src/present", b"present");
    let manifest = ws.write_manifest(
        "pkg.manifest",
        &[packaged("/usr/share/present", b"present", REGULAR)],
    );
    let src = ws.join("src");
    let missing = ws.join("missing-root");

    let out = run_rpmdeps([
        OsStr::new("rules"),
        manifest.as_os_str(),
        OsStr::new("--extractor"),
        OsStr::new("listing"),
        OsStr::new("-d"),
        missing.as_os_str(),
        OsStr::new("-d"),
        src.as_os_str(),
        OsStr::new("-o"),
        OsStr::new("-"),
    ]);
    assert_eq!(out.status.code(), Some(0));

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(stderr.matches("missing-root").count(), 1, "stderr was: {}", stderr);
}
