use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use super::engine::exit_code;
use super::types::ContainerCommand;

/// Executes engine invocations synchronously.
///
/// Returns the child's exit status. `Err` is reserved for failing to run the
/// engine at all; a non-zero status is an ordinary result.
pub trait Runner {
    fn status(&mut self, cmd: &ContainerCommand) -> Result<i32>;

    /// Give a detached container time to come up.
    fn wait(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Runs commands against the real engine binary, inheriting stdio.
#[derive(Debug, Clone)]
pub struct Engine {
    binary: String,
}

impl Engine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Runner for Engine {
    fn status(&mut self, cmd: &ContainerCommand) -> Result<i32> {
        debug!(command = %cmd, binary = %self.binary, "running");

        let mut command = Command::new(&self.binary);
        command.args(&cmd.args);
        if cmd.quiet {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let status = command.status().with_context(|| {
            format!(
                "failed to invoke `{}` (is it installed and on PATH?)",
                self.binary
            )
        })?;
        let code = exit_code(status);
        debug!(code, "exited");
        Ok(code)
    }
}

/// Prints each command instead of running it, and reports success.
pub struct DryRun<W> {
    binary: String,
    out: W,
}

impl<W: Write> DryRun<W> {
    pub fn new(binary: impl Into<String>, out: W) -> Self {
        Self {
            binary: binary.into(),
            out,
        }
    }
}

impl<W: Write> Runner for DryRun<W> {
    fn status(&mut self, cmd: &ContainerCommand) -> Result<i32> {
        writeln!(
            self.out,
            "{} {}",
            shell_words::quote(&self.binary),
            cmd
        )?;
        Ok(0)
    }

    fn wait(&mut self, _delay: Duration) {}
}
