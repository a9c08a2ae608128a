//! Argument and config handling specs

use crate::prelude::*;

#[test]
fn unknown_flag_is_rejected() {
    let project = Project::with_csv_source();

    project
        .rwd()
        .args(&["--verbose"])
        .fails()
        .stderr_has("unknown flag: --verbose");
}

#[test]
fn missing_config_file_fails() {
    let project = Project::empty();

    project
        .rwd()
        .args(&["--once"])
        .fails()
        .stderr_has("rwd.toml");
}

#[test]
fn invalid_watcher_option_fails_before_any_run() {
    let project = Project::empty();
    project.config(
        r#"
[watcher]
worker_name = "specs"
degree_of_parallelism = 0

[source]
directory = "in"

[output]
directory = "out"

[state]
directory = "state"
"#,
    );

    project
        .rwd()
        .args(&["--once"])
        .fails()
        .stderr_has("degree_of_parallelism");
    assert!(!project.path().join("state").exists());
}

#[test]
fn unknown_config_key_fails() {
    let project = Project::with_csv_source();
    let text = std::fs::read_to_string(project.config_path()).unwrap();
    project.config(&format!("{}\n[source_extra]\nx = 1\n", text));

    project.rwd().args(&["--once"]).fails();
}
