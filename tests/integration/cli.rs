//! The `css-export` binary over a copy of the fixture graph.

use predicates::prelude::*;
use std::collections::BTreeMap;

use crate::common::{FileAssert, TestProject, fixture, relative_metadata};

const GRAPH: &str = "test/fixtures/graph.json";

fn metadata(stdout: &[u8]) -> BTreeMap<String, Vec<String>> {
    let parsed: BTreeMap<String, Vec<String>> = serde_json::from_slice(stdout).expect("metadata is JSON");
    relative_metadata(parsed)
}

#[test]
fn test_build_writes_flat_assets() {
    let project = TestProject::new().unwrap();

    project
        .command()
        .args(["build", "--graph", GRAPH, "--out-dir", "dist", "--asset-file-names", "assets/[name].[ext]"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    FileAssert::equals(project.path("dist/assets/red.css"), &fixture("red.css"));
    FileAssert::equals(project.path("dist/assets/blue.css"), &fixture("blue.css"));
    FileAssert::equals(project.path("dist/assets/reset.css"), &fixture("lib/reset.css"));
}

#[test]
fn test_build_preserving_modules_from_root() {
    let project = TestProject::new().unwrap();

    project
        .command()
        .args([
            "build",
            "--graph",
            GRAPH,
            "--out-dir",
            "dist",
            "--asset-file-names",
            "assets/[name].[ext]",
            "--preserve-modules",
            "--preserve-modules-root",
            "test",
        ])
        .assert()
        .success();

    FileAssert::equals(project.path("dist/assets/fixtures/red.css"), &fixture("red.css"));
    FileAssert::equals(project.path("dist/assets/fixtures/lib/reset.css"), &fixture("lib/reset.css"));
}

#[test]
fn test_build_prints_metadata_under_default_key() {
    let project = TestProject::new().unwrap();

    let output = project
        .command()
        .args(["build", "--graph", GRAPH, "--out-dir", "dist", "--asset-file-names", "assets/[name].[ext]", "--meta-key"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let expected: BTreeMap<String, Vec<String>> = [
        ("blue.js", vec!["assets/reset.css", "assets/blue.css"]),
        ("red.js", vec!["assets/reset.css", "assets/red.css"]),
        ("purple.js", vec!["assets/reset.css", "assets/red.css", "assets/blue.css"]),
    ]
    .into_iter()
    .map(|(id, files)| (id.to_string(), files.into_iter().map(String::from).collect()))
    .collect();
    assert_eq!(metadata(&output.stdout), expected);
}

#[test]
fn test_build_reads_config_file() {
    let project = TestProject::new().unwrap();
    project
        .write_file(
            "css-export.toml",
            r#"
meta-key = "css"

[output]
asset-file-names = "static/[name][extname]"
"#,
        )
        .unwrap();

    project
        .command()
        .args(["build", "--graph", GRAPH, "--out-dir", "dist", "--meta-out", "meta.json"])
        .assert()
        .success();

    FileAssert::equals(project.path("dist/static/red.css"), &fixture("red.css"));
    let written = std::fs::read(project.path("meta.json")).unwrap();
    assert_eq!(metadata(&written)["red.js"], ["static/reset.css", "static/red.css"]);
}

#[test]
fn test_failed_inlining_writes_nothing() {
    let project = TestProject::new().unwrap();
    project.write_file("test/fixtures/red.css", "@import './missing.css';\n.red{}\n").unwrap();

    project
        .command()
        .args([
            "build",
            "--graph",
            GRAPH,
            "--out-dir",
            "dist",
            "--asset-file-names",
            "assets/[name].[ext]",
            "--inline-cmd",
            "sh",
            "--inline-arg=-c",
            "--inline-arg=if grep -q missing; then echo 'not found' >&2; exit 1; else exit 0; fi",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Something went wrong when inlining an @import directive in 'red.css'.",
        ));

    FileAssert::not_exists(project.path("dist"));
}

#[test]
fn test_invalid_pattern_is_reported() {
    let project = TestProject::new().unwrap();

    project
        .command()
        .args(["build", "--graph", GRAPH, "--out-dir", "dist", "--include", "[unclosed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[unclosed"));
}

#[test]
fn test_missing_graph_is_reported() {
    let project = TestProject::new().unwrap();

    project
        .command()
        .args(["build", "--graph", "nope.json", "--out-dir", "dist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read graph file"));
}

#[test]
fn test_deps_lists_transitive_styles() {
    let project = TestProject::new().unwrap();

    let output = project.command().args(["deps", "--graph", GRAPH]).output().unwrap();
    assert!(output.status.success());

    let report: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<_> = report.iter().map(|entry| entry["id"].as_str().unwrap().to_string()).collect();
    assert_eq!(ids.len(), 3);
    assert!(ids[0].ends_with("test/fixtures/blue.js"));
    assert!(ids[2].ends_with("test/fixtures/purple.js"));

    let purple: Vec<_> = report[2]["styles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap().rsplit('/').next().unwrap().to_string())
        .collect();
    assert_eq!(purple, ["reset.css", "red.css", "blue.css"]);
}

#[test]
fn test_deps_exclude_removes_styles() {
    let project = TestProject::new().unwrap();

    let output = project
        .command()
        .args(["deps", "--graph", GRAPH, "--exclude", "**/lib/**"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    let styles = report[0]["styles"].as_array().unwrap();
    assert_eq!(styles.len(), 1);
    assert!(styles[0].as_str().unwrap().ends_with("blue.css"));
}
