//! Shared helpers for the CLI integration tests.
//!
//! Each test gets a throwaway suite directory laid out like a Kestrel
//! checkout: `tests/tests.txt`, input files under `tests/`, docs under
//! `docs/`.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::create_dir(dir.path().join("tests")).expect("create tests dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `contents` to `rel`, creating parent directories.
    pub fn file(&self, rel: &str, contents: &str) -> &Self {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(path, contents).expect("write file");
        self
    }

    pub fn fixture(&self, contents: &str) -> &Self {
        self.file("tests/tests.txt", contents)
    }

    /// Uses `sh` as the subject, so every input file is a shell script whose
    /// stderr is the transcript.
    pub fn shell_subject(&self) -> &Self {
        self.file("kats.yaml", "subject: sh\n")
    }

    /// `kats` run from the workspace root, uncolored.
    pub fn kats(&self) -> Command {
        let mut cmd = Command::cargo_bin("kats").expect("kats binary");
        cmd.current_dir(self.dir.path()).args(["--color", "never"]);
        cmd
    }
}
