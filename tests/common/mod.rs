use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

pub const GOOD_HEADER: &str = "# Copyright (c) Microsoft Corporation. All rights reserved.\n\
                               # Licensed under the MIT license.\n";

/// A project directory whose config points the engine at a shell script that
/// appends its arguments to `engine.log` and exits with `FAKE_STATUS_<verb>`
/// (0 when unset).
pub struct Project {
    dir: TempDir,
    log: PathBuf,
}

impl Project {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let log = dir.path().join("engine.log");
        let engine = dir.path().join("fake-engine");

        let script = format!(
            "#!/bin/sh\necho \"$*\" >> '{}'\neval \"code=\\${{FAKE_STATUS_$1:-0}}\"\nexit \"$code\"\n",
            log.display()
        );
        fs::write(&engine, script).expect("write fake engine");
        make_executable(&engine);

        fs::write(
            dir.path().join(".lmrun.yaml"),
            format!("docker: '{}'\nnotebook_delay_ms: 0\n", engine.display()),
        )
        .expect("write config");

        Self { dir, log }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("lmrun");
        cmd.current_dir(self.path()).env_remove("RUST_LOG");
        cmd
    }

    /// Engine invocations so far, one argument string per call.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn write_source(&self, rel: &str, contents: &str) {
        let path = self.path().join("lmchallenge").join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create source dir");
        }
        fs::write(path, contents).expect("write source file");
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path).expect("stat").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod");
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}
