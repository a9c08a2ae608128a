//! Single-run specs (`rwd --once`)

use crate::prelude::*;
use similar_asserts::assert_eq;

fn listing(project: &Project) -> Vec<String> {
    let mut files = Vec::new();
    let mut pending = vec![project.output()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                let rel = path.strip_prefix(project.output()).unwrap();
                files.push(rel.display().to_string());
            }
        }
    }
    files.sort();
    files
}

#[test]
fn copies_matching_files_and_reports() {
    let project = Project::with_csv_source();
    project.file("in/a.csv", "a,b\n1,2\n");
    project.file("in/nested/b.csv", "x\n");
    project.file("in/notes.txt", "skip me");

    project
        .rwd()
        .args(&["rwd.toml", "--once"])
        .passes()
        .stdout_has("listed 2")
        .stdout_has("ok 2");

    assert_eq!(listing(&project), vec!["a.csv", "nested/b.csv"]);
    assert_eq!(project.read("out/a.csv"), "a,b\n1,2\n");
    assert_eq!(project.read("out/nested/b.csv"), "x\n");
}

#[test]
fn second_run_skips_unchanged_files() {
    let project = Project::with_csv_source();
    project.file("in/a.csv", "1");

    project.rwd().args(&["--once"]).passes().stdout_has("ok 1");
    project
        .rwd()
        .args(&["--once"])
        .passes()
        .stdout_has("processed 0")
        .stdout_has("skipped 1");
}

#[test]
fn new_files_are_picked_up_by_later_runs() {
    let project = Project::with_csv_source();
    project.file("in/a.csv", "1");
    project.rwd().args(&["--once"]).passes();

    project.file("in/b.csv", "2");
    project
        .rwd()
        .args(&["--once"])
        .passes()
        .stdout_has("processed 1");

    assert_eq!(listing(&project), vec!["a.csv", "b.csv"]);
}

#[test]
fn missing_source_directory_fails_the_run() {
    let project = Project::with_csv_source();
    std::fs::remove_dir(project.source()).unwrap();

    project.rwd().args(&["--once"]).fails();
}

#[test]
fn run_writes_startup_marker_to_log() {
    let project = Project::with_csv_source();

    project.rwd().args(&["--once"]).passes();

    let log = project.read("state/rwd.log");
    assert!(log.contains("--- rwd: starting (pid: "), "log: {}", log);
    assert!(!project.path().join("state/rwd.pid").exists());
}
