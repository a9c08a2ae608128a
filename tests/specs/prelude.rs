//! Shared fixtures for the behavioral specs

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch directory holding a config, a source tree and an output tree
pub struct Project {
    dir: TempDir,
}

impl Project {
    /// Project with `in/`, `out/` and `state/` and a config watching `*.csv`
    pub fn with_csv_source() -> Self {
        let project = Self::empty();
        std::fs::create_dir_all(project.source()).unwrap();
        project.config(
            r#"
[watcher]
worker_name = "specs"
degree_of_parallelism = 2

[source]
directory = "in"
extensions = ["csv"]
recursive = true

[output]
directory = "out"

[state]
directory = "state"
"#,
        );
        project
    }

    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("rwd.toml")
    }

    pub fn source(&self) -> PathBuf {
        self.path().join("in")
    }

    pub fn output(&self) -> PathBuf {
        self.path().join("out")
    }

    pub fn config(&self, text: &str) {
        std::fs::write(self.config_path(), text).unwrap();
    }

    pub fn file(&self, rel: &str, body: &str) {
        let path = self.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path().join(rel)).unwrap()
    }

    /// `rwd` running inside the project directory
    pub fn rwd(&self) -> Rwd {
        let mut cmd = Command::cargo_bin("rwd").unwrap();
        cmd.current_dir(self.path()).env("RUST_LOG", "info");
        Rwd { cmd }
    }
}

pub struct Rwd {
    cmd: Command,
}

impl Rwd {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> Output {
        let output = self.cmd.output().unwrap();
        let out = Output::from(output);
        assert!(out.success, "expected success\nstdout: {}\nstderr: {}", out.stdout, out.stderr);
        out
    }

    pub fn fails(mut self) -> Output {
        let output = self.cmd.output().unwrap();
        let out = Output::from(output);
        assert!(!out.success, "expected failure\nstdout: {}", out.stdout);
        out
    }
}

pub struct Output {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl From<std::process::Output> for Output {
    fn from(output: std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl Output {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout missing {:?}:\n{}", needle, self.stdout);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr missing {:?}:\n{}", needle, self.stderr);
        self
    }
}
