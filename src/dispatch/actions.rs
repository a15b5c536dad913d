use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use crate::copyright;
use crate::docker::{ContainerCommand, Removal, Runner};

use super::commands::{
    Session, build_commands, logs_command, notebook_command, remove_command, run_command,
    task_command,
};

/// Options of the `notebook` subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookOptions {
    pub name: String,
    pub restart: bool,
    pub port: u16,
}

/// Run commands in order, stopping at the first non-zero exit status.
fn execute_all(runner: &mut dyn Runner, commands: &[ContainerCommand]) -> Result<i32> {
    for cmd in commands {
        let code = runner.status(cmd)?;
        if code != 0 {
            return Ok(code);
        }
    }
    Ok(0)
}

pub fn build(runner: &mut dyn Runner, session: &Session, image: &str) -> Result<i32> {
    execute_all(runner, &build_commands(session.cfg, image)?)
}

pub fn run(runner: &mut dyn Runner, session: &Session, image: &str, words: &[String]) -> Result<i32> {
    runner.status(&run_command(session, image, words)?)
}

pub fn test(runner: &mut dyn Runner, session: &Session, image: &str) -> Result<i32> {
    runner.status(&task_command(session, image, &session.cfg.test_command)?)
}

pub fn flake(runner: &mut dyn Runner, session: &Session, image: &str) -> Result<i32> {
    runner.status(&task_command(session, image, &session.cfg.flake_command)?)
}

pub fn doc(runner: &mut dyn Runner, session: &Session, image: &str) -> Result<i32> {
    runner.status(&task_command(session, image, &session.cfg.doc_command)?)
}

/// Check source headers under the configured root. The violation count is the
/// exit status, so counts of 256 and above wrap under Unix exit codes.
pub fn copyright(session: &Session) -> Result<i32> {
    let root = session.work_dir.join(&session.cfg.copyright_root);
    let count = copyright::check_headers(
        &root,
        &session.cfg.copyright_suffix,
        &copyright::REQUIRED_HEADER,
    )?;
    Ok(i32::try_from(count).unwrap_or(i32::MAX))
}

/// Tests, then flake8, then the header check. Stops at the first failure.
pub fn check(runner: &mut dyn Runner, session: &Session, image: &str) -> Result<i32> {
    let code = test(runner, session, image)?;
    if code != 0 {
        return Ok(code);
    }
    let code = flake(runner, session, image)?;
    if code != 0 {
        return Ok(code);
    }
    copyright(session)
}

/// Start a detached notebook server and print its first log lines, which
/// carry the access token.
pub fn notebook(
    runner: &mut dyn Runner,
    session: &Session,
    image: &str,
    opts: &NotebookOptions,
) -> Result<i32> {
    if opts.restart {
        let removal = Removal::from_status(runner.status(&remove_command(&opts.name)?)?);
        debug!(?removal, name = %opts.name, "removed previous notebook container");
    }

    let code = runner.status(&notebook_command(session, image, &opts.name, opts.port)?)?;
    if code != 0 {
        return Ok(code);
    }
    info!(name = %opts.name, port = opts.port, "notebook container started");

    runner.wait(Duration::from_millis(session.cfg.notebook_delay_ms));
    runner.status(&logs_command(&opts.name)?)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::config::Config;

    /// Records every command and answers with scripted exit statuses
    /// (0 once the script runs out).
    #[derive(Default)]
    struct Recorder {
        calls: Vec<ContainerCommand>,
        statuses: VecDeque<i32>,
        waits: Vec<Duration>,
    }

    impl Recorder {
        fn with_statuses(statuses: &[i32]) -> Self {
            Self {
                statuses: statuses.iter().copied().collect(),
                ..Self::default()
            }
        }

        fn verbs(&self) -> Vec<&str> {
            self.calls.iter().filter_map(|c| c.verb()).collect()
        }
    }

    impl Runner for Recorder {
        fn status(&mut self, cmd: &ContainerCommand) -> Result<i32> {
            self.calls.push(cmd.clone());
            Ok(self.statuses.pop_front().unwrap_or(0))
        }

        fn wait(&mut self, delay: Duration) {
            self.waits.push(delay);
        }
    }

    fn config() -> Config {
        Config {
            notebook_delay_ms: 0,
            ..Config::default()
        }
    }

    fn session<'a>(cfg: &'a Config, work_dir: &'a Path) -> Session<'a> {
        Session {
            cfg,
            work_dir,
            tty: false,
        }
    }

    fn write_package(root: &Path, header: &str) {
        let pkg = root.join("lmchallenge");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("core.py"), header).unwrap();
    }

    const GOOD: &str = "# Copyright (c) Microsoft Corporation. All rights reserved.\n\
                        # Licensed under the MIT license.\n\nimport os\n";

    #[test]
    fn build_prod_issues_one_build() {
        let cfg = config();
        let mut rec = Recorder::default();
        let code = build(&mut rec, &session(&cfg, Path::new("/w")), "prod").unwrap();
        assert_eq!(code, 0);
        assert_eq!(rec.verbs(), ["build"]);
    }

    #[test]
    fn build_dev_builds_prod_then_dev() {
        let cfg = config();
        let mut rec = Recorder::default();
        build(&mut rec, &session(&cfg, Path::new("/w")), "dev").unwrap();
        assert_eq!(rec.verbs(), ["build", "build"]);
        assert!(rec.calls[0].args.contains(&"lmchallenge".to_string()));
        assert!(rec.calls[1].args.contains(&"lmchallenge-dev".to_string()));
    }

    #[test]
    fn build_dev_stops_when_prod_fails() {
        let cfg = config();
        let mut rec = Recorder::with_statuses(&[2]);
        let code = build(&mut rec, &session(&cfg, Path::new("/w")), "dev").unwrap();
        assert_eq!(code, 2);
        assert_eq!(rec.calls.len(), 1);
    }

    #[test]
    fn build_remote_pulls() {
        let cfg = config();
        let mut rec = Recorder::default();
        build(&mut rec, &session(&cfg, Path::new("/w")), "other/img").unwrap();
        assert_eq!(rec.calls.len(), 1);
        assert_eq!(rec.calls[0].args, ["pull", "other/img"]);
    }

    #[test]
    fn run_returns_child_status() {
        let cfg = config();
        let mut rec = Recorder::with_statuses(&[42]);
        let words = vec!["false".to_string()];
        let code = run(&mut rec, &session(&cfg, Path::new("/w")), "dev", &words).unwrap();
        assert_eq!(code, 42);
    }

    #[test]
    fn doc_runs_configured_command_without_socket() {
        let cfg = config();
        let mut rec = Recorder::with_statuses(&[9]);
        let code = doc(&mut rec, &session(&cfg, Path::new("/w")), "dev").unwrap();
        assert_eq!(code, 9);
        assert_eq!(rec.calls.len(), 1);
        assert_eq!(
            rec.calls[0].args,
            [
                "run",
                "--rm",
                "-i",
                "-v",
                "/w:/work",
                "-w",
                "/work",
                "lmchallenge-dev",
                "./scripts/build_docs.sh",
            ]
        );
        assert!(!rec.calls[0].args.iter().any(|a| a.contains("docker.sock")));
    }

    #[test]
    fn flake_runs_configured_command() {
        let cfg = config();
        let mut rec = Recorder::with_statuses(&[1]);
        let code = flake(&mut rec, &session(&cfg, Path::new("/w")), "prod").unwrap();
        assert_eq!(code, 1);
        assert_eq!(rec.calls.len(), 1);
        assert_eq!(
            rec.calls[0].args[rec.calls[0].args.len() - 2..],
            ["lmchallenge", "flake8"]
        );
    }

    #[test]
    fn check_stops_after_failing_tests() {
        // The copyright root does not exist, so reaching the scan would error.
        let cfg = config();
        let mut rec = Recorder::with_statuses(&[3]);
        let code = check(&mut rec, &session(&cfg, Path::new("/nonexistent")), "dev").unwrap();
        assert_eq!(code, 3);
        assert_eq!(rec.calls.len(), 1);
        assert!(rec.calls[0].args.contains(&cfg.test_command));
    }

    #[test]
    fn check_stops_after_failing_flake() {
        let cfg = config();
        let mut rec = Recorder::with_statuses(&[0, 1]);
        let code = check(&mut rec, &session(&cfg, Path::new("/nonexistent")), "dev").unwrap();
        assert_eq!(code, 1);
        assert_eq!(rec.calls.len(), 2);
        assert!(rec.calls[1].args.contains(&cfg.flake_command));
    }

    #[test]
    fn check_runs_scan_last() {
        let dir = tempfile::tempdir().unwrap();
        write_package(dir.path(), GOOD);
        let cfg = config();
        let mut rec = Recorder::default();
        let code = check(&mut rec, &session(&cfg, dir.path()), "dev").unwrap();
        assert_eq!(code, 0);
        assert_eq!(rec.calls.len(), 2);
    }

    #[test]
    fn check_reports_violation_count() {
        let dir = tempfile::tempdir().unwrap();
        write_package(dir.path(), "import os\n");
        let cfg = config();
        let mut rec = Recorder::default();
        let code = check(&mut rec, &session(&cfg, dir.path()), "dev").unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn copyright_without_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config();
        assert!(copyright(&session(&cfg, dir.path())).is_err());
    }

    #[test]
    fn notebook_restart_tolerates_failed_removal() {
        let cfg = config();
        let mut rec = Recorder::with_statuses(&[1, 0, 0]);
        let opts = NotebookOptions {
            name: "nb".into(),
            restart: true,
            port: 8888,
        };
        let code = notebook(&mut rec, &session(&cfg, Path::new("/w")), "dev", &opts).unwrap();
        assert_eq!(code, 0);
        assert_eq!(rec.verbs(), ["rm", "run", "logs"]);
        assert!(rec.calls[0].quiet);
        assert_eq!(rec.waits, [Duration::ZERO]);
    }

    #[test]
    fn notebook_without_restart_skips_removal() {
        let cfg = config();
        let mut rec = Recorder::default();
        let opts = NotebookOptions {
            name: "nb".into(),
            restart: false,
            port: 8888,
        };
        notebook(&mut rec, &session(&cfg, Path::new("/w")), "dev", &opts).unwrap();
        assert_eq!(rec.verbs(), ["run", "logs"]);
    }

    #[test]
    fn notebook_propagates_log_failure() {
        let cfg = config();
        let mut rec = Recorder::with_statuses(&[0, 5]);
        let opts = NotebookOptions {
            name: "nb".into(),
            restart: false,
            port: 8888,
        };
        let code = notebook(&mut rec, &session(&cfg, Path::new("/w")), "dev", &opts).unwrap();
        assert_eq!(code, 5);
    }

    #[test]
    fn notebook_does_not_fetch_logs_when_start_fails() {
        let cfg = config();
        let mut rec = Recorder::with_statuses(&[125]);
        let opts = NotebookOptions {
            name: "nb".into(),
            restart: false,
            port: 8888,
        };
        let code = notebook(&mut rec, &session(&cfg, Path::new("/w")), "dev", &opts).unwrap();
        assert_eq!(code, 125);
        assert_eq!(rec.verbs(), ["run"]);
        assert!(rec.waits.is_empty());
    }
}
