//! Command-line surface and subcommand dispatch.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config;
use crate::dispatch::{self, NotebookOptions, Session};
use crate::docker::{DryRun, Engine, Runner};

#[derive(Parser, Debug)]
#[command(
    name = "lmrun",
    version,
    about = "Build, test and explore LM Challenge inside containers"
)]
pub struct Cli {
    /// Image to use: `prod`, `dev`, or any image reference
    #[arg(short, long, global = true, default_value = "dev")]
    pub image: String,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print engine commands instead of running them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Config file (defaults to `.lmrun.yaml` in the working directory, if present)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Build the image (dev rebuilds prod first), or pull it if it is not an alias
    Build,
    /// Run a command in a container with the engine socket mounted
    Run {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Run the test suite
    Test,
    /// Run flake8
    Flake,
    /// Run tests, flake8 and the copyright check, stopping at the first failure
    Check,
    /// Build the documentation
    Doc,
    /// Check that every source file starts with the copyright notice
    Copyright,
    /// Start a notebook server in a detached container
    Notebook {
        /// Container name
        #[arg(short, long)]
        name: Option<String>,
        /// Remove any existing container with the same name first
        #[arg(short, long)]
        restart: bool,
        /// Port to publish and serve on
        #[arg(short, long, default_value_t = 8888)]
        port: u16,
    },
}

impl Cli {
    /// Execute the selected subcommand in the working directory, returning the
    /// exit status the process should end with.
    pub fn execute(&self) -> Result<i32> {
        let work_dir = std::env::current_dir().context("cannot determine working directory")?;
        let cfg = match &self.config {
            Some(path) => config::load_file(path)?,
            None => config::load(&work_dir)?,
        };
        let session = Session {
            cfg: &cfg,
            work_dir: &work_dir,
            tty: std::io::stdin().is_terminal(),
        };

        if self.dry_run {
            let mut runner = DryRun::new(cfg.docker.as_str(), std::io::stdout());
            self.command.dispatch(&mut runner, &session, &self.image)
        } else {
            let mut runner = Engine::new(cfg.docker.as_str());
            self.command.dispatch(&mut runner, &session, &self.image)
        }
    }
}

impl Command {
    pub fn dispatch(&self, runner: &mut dyn Runner, session: &Session, image: &str) -> Result<i32> {
        match self {
            Command::Build => dispatch::build(runner, session, image),
            Command::Run { command } => dispatch::run(runner, session, image, command),
            Command::Test => dispatch::test(runner, session, image),
            Command::Flake => dispatch::flake(runner, session, image),
            Command::Check => dispatch::check(runner, session, image),
            Command::Doc => dispatch::doc(runner, session, image),
            Command::Copyright => dispatch::copyright(session),
            Command::Notebook {
                name,
                restart,
                port,
            } => {
                let opts = NotebookOptions {
                    name: name.clone().unwrap_or_else(|| session.cfg.notebook_name.clone()),
                    restart: *restart,
                    port: *port,
                };
                dispatch::notebook(runner, session, image, &opts)
            }
        }
    }
}
