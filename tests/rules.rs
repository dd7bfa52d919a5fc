// tests/rules.rs

//! End-to-end listing runs: manifest, search roots, rule file.

mod common;

use common::{directory, packaged, packaged_md5, symlink, Workspace, EXECUTABLE, REGULAR};
use rpmdeps::{DependencyLister, MatchStatus, Matcher, RuleLayout, RunConfig, Verdict};
use std::fs;
use std::time::{Duration, SystemTime};

#[test]
fn test_single_match() {
    let ws = Workspace::new();
    let source = ws.write("build/hello", b"hello binary");
    let manifest = ws.write_manifest(
        "pkg.manifest",
        &[
            directory("/usr/bin"),
            packaged("/usr/bin/hello", b"hello binary", EXECUTABLE),
        ],
    );

    let outcome = DependencyLister::new(ws.config(&["build"])).run(&manifest).unwrap();

    assert_eq!(outcome.verdict, Verdict::Success);
    assert_eq!(outcome.report.matched_count, 1);
    assert_eq!(outcome.report.total(), 1);
    assert_eq!(ws.read("out/pkg.d"), format!("pkg.manifest: {}\n", source.display()));
}

#[test]
fn test_executable_name_only() {
    let ws = Workspace::new();
    let source = ws.write("build/tool", b"unstripped tool with symbols");
    let manifest = ws.write_manifest(
        "pkg.manifest",
        &[packaged("/usr/bin/tool", b"stripped tool", EXECUTABLE)],
    );

    let off = DependencyLister::new(ws.config(&["build"])).run(&manifest).unwrap();
    assert_eq!(off.report.unmatched_count, 1);
    assert!(off.rule.prerequisites.is_empty());

    let config = RunConfig {
        match_executable_by_name_only: true,
        ..ws.config(&["build"])
    };
    let on = DependencyLister::new(config).run(&manifest).unwrap();
    assert_eq!(on.report.matched_count, 1);
    assert!(on.rule.prerequisites.contains(&source.to_string_lossy().into_owned()));
}

#[test]
fn test_duplicate_across_roots() {
    let ws = Workspace::new();
    let first = ws.write("a/data.txt", b"shared data");
    ws.write("b/data.txt", b"shared data");
    let manifest = ws.write_manifest(
        "pkg.manifest",
        &[packaged("/usr/share/data.txt", b"shared data", REGULAR)],
    );

    let outcome = DependencyLister::new(ws.config(&["a", "b"])).run(&manifest).unwrap();
    assert_eq!(outcome.report.ambiguous_count, 0);
    assert_eq!(
        outcome.rule.prerequisites.iter().collect::<Vec<_>>(),
        vec![&first.to_string_lossy().into_owned()]
    );

    // Reversing the root order reverses the winner
    let outcome = DependencyLister::new(ws.config(&["b", "a"])).run(&manifest).unwrap();
    assert!(outcome.rule.prerequisites.iter().all(|p| p.contains("/b/")));
}

#[test]
fn test_touched_file_still_matches() {
    let ws = Workspace::new();
    let source = ws.write("src/config.ini", b"[main]\nkey = value\n");
    let manifest = ws.write_manifest(
        "pkg.manifest",
        &[packaged("/etc/app/config.ini", b"[main]\nkey = value\n", REGULAR)],
    );

    fs::File::options()
        .write(true)
        .open(&source)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(3600))
        .unwrap();

    let outcome = DependencyLister::new(ws.config(&["src"])).run(&manifest).unwrap();
    assert_eq!(outcome.report.matched_count, 1);
}

#[test]
fn test_repeated_runs_are_identical() {
    let ws = Workspace::new();
    let mut files = Vec::new();
    for i in 0..40 {
        let content = format!("file number {}", i);
        ws.write(&format!("src/dir{}/f{}.txt", i % 7, i), content.as_bytes());
        files.push(packaged(&format!("/usr/share/f{}.txt", i), content.as_bytes(), REGULAR));
    }
    let manifest = ws.write_manifest("pkg.manifest", &files);

    let lister = DependencyLister::new(ws.config(&["src"]));
    lister.run(&manifest).unwrap();
    let first = fs::read(ws.join("out/pkg.d")).unwrap();
    lister.run(&manifest).unwrap();
    let second = fs::read(ws.join("out/pkg.d")).unwrap();

    assert_eq!(first, second);
    assert_eq!(lister.run(&manifest).unwrap().rule.prerequisites.len(), 40);
}

#[test]
fn test_counts_exclude_directories() {
    let ws = Workspace::new();
    ws.write("src/a", b"a");
    let manifest = ws.write_manifest(
        "pkg.manifest",
        &[
            directory("/opt/app"),
            directory("/opt/app/lib"),
            packaged("/opt/app/a", b"a", REGULAR),
            packaged("/opt/app/b", b"b", REGULAR),
            symlink("/opt/app/lib/liba.so"),
        ],
    );

    let outcome = DependencyLister::new(ws.config(&["src"])).run(&manifest).unwrap();
    let report = &outcome.report;
    assert_eq!(report.matched_count, 1);
    assert_eq!(report.unmatched_count, 2);
    assert_eq!(report.total(), 3);
}

#[test]
fn test_md5_manifest() {
    let ws = Workspace::new();
    let source = ws.write("src/legacy.conf", b"legacy");
    let manifest = ws.write_manifest(
        "pkg.manifest",
        &[packaged_md5("/etc/legacy.conf", b"legacy", REGULAR)],
    );

    let outcome = DependencyLister::new(ws.config(&["src"])).run(&manifest).unwrap();
    assert!(outcome.rule.prerequisites.contains(&source.to_string_lossy().into_owned()));
}

#[test]
fn test_missing_root_is_skipped() {
    let ws = Workspace::new();
    ws.write("src/a", b"a");
    let manifest = ws.write_manifest("pkg.manifest", &[packaged("/a", b"a", REGULAR)]);

    let outcome = DependencyLister::new(ws.config(&["gone", "src"])).run(&manifest).unwrap();
    assert_eq!(outcome.report.skipped_roots.len(), 1);
    assert_eq!(outcome.report.skipped_roots[0].path, ws.join("gone"));
    assert_eq!(outcome.report.matched_count, 1);
}

#[test]
fn test_config_file_layout() {
    let ws = Workspace::new();
    let a = ws.write("src/a.txt", b"alpha");
    let b = ws.write("src/b.txt", b"beta");
    let manifest = ws.write_manifest(
        "pkg.manifest",
        &[packaged("/a.txt", b"alpha", REGULAR), packaged("/b.txt", b"beta", REGULAR)],
    );
    let config_path = ws.write(
        "rpmdeps.toml",
        format!(
            "search_dirs = [\"{}\"]\noutput = \"{}\"\nextractor = \"listing\"\nstrip_dirname = true\nlayout = \"continued\"\nempty_recipes = true\nexplicit_dependencies = [\"pkg.spec\"]\n",
            ws.join("src").display(),
            ws.join("pkg.d").display()
        )
        .as_bytes(),
    );

    let config = RunConfig::load(&config_path).unwrap();
    assert_eq!(config.layout, RuleLayout::Continued);
    DependencyLister::new(config).run(&manifest).unwrap();

    let (a, b) = (a.display(), b.display());
    assert_eq!(
        ws.read("pkg.d"),
        format!(
            "pkg.manifest: \\\n\t{a} \\\n\t{b} \\\n\tpkg.spec\n\n{a}:\n{b}:\npkg.spec:\n"
        )
    );
}

#[test]
fn test_digest_only_relocation() {
    let ws = Workspace::new();
    let source = ws.write("src/app.conf.in", b"templated config");
    let manifest = ws.write_manifest(
        "pkg.manifest",
        &[packaged("/etc/app.conf", b"templated config", REGULAR)],
    );

    let lister = DependencyLister::new(ws.config(&["src"]));
    let listing = rpmdeps::manifest::open(rpmdeps::ExtractorKind::Listing, &manifest).unwrap();
    let index = lister.index_for(listing.as_ref());
    let results = Matcher::new(&index, lister.match_options()).match_all(listing.files());

    assert_eq!(results[0].status, MatchStatus::Matched);
    assert_eq!(results[0].basis, Some(rpmdeps::MatchBasis::DigestOnly));
    assert_eq!(results[0].resolved_path.as_deref(), Some(source.as_path()));
}
