use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::docker::{self, ContainerCommand};

use super::template::{Bindings, Template};

const BUILD: &[&str] = &["build", "--rm", "-t", "{image}", "{context}"];
const PULL: &[&str] = &["pull", "{image}"];
const RUN: &[&str] = &[
    "run",
    "--rm",
    "-i",
    "{tty}",
    "{user}",
    "-v",
    "{workdir}:{mount}",
    "-w",
    "{mount}",
    "-v",
    "{socket}:{socket}",
    "{image}",
    "{command}",
];
const TASK: &[&str] = &[
    "run",
    "--rm",
    "-i",
    "{tty}",
    "{user}",
    "-v",
    "{workdir}:{mount}",
    "-w",
    "{mount}",
    "{image}",
    "{command}",
];
const NOTEBOOK: &[&str] = &[
    "run",
    "-d",
    "--name",
    "{name}",
    "-p",
    "{port}:{port}",
    "{user}",
    "-v",
    "{workdir}:{mount}",
    "-w",
    "{mount}",
    "{image}",
    "{command}",
];
const REMOVE: &[&str] = &["rm", "-f", "{name}"];
const LOGS: &[&str] = &["logs", "{name}"];

/// What an `--image` value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRef<'a> {
    Prod,
    Dev,
    Remote(&'a str),
}

impl<'a> ImageRef<'a> {
    pub fn parse(name: &'a str) -> Self {
        match name {
            "prod" => ImageRef::Prod,
            "dev" => ImageRef::Dev,
            other => ImageRef::Remote(other),
        }
    }
}

/// Map the `prod`/`dev` aliases to their configured image names. Anything else
/// is already an image reference and comes back unchanged.
pub fn resolve_image_alias(cfg: &Config, name: &str) -> String {
    match ImageRef::parse(name) {
        ImageRef::Prod => cfg.prod_image.clone(),
        ImageRef::Dev => cfg.dev_image.clone(),
        ImageRef::Remote(image) => image.to_string(),
    }
}

/// Everything an invocation depends on besides its own arguments.
#[derive(Debug, Clone, Copy)]
pub struct Session<'a> {
    pub cfg: &'a Config,
    pub work_dir: &'a Path,
    /// Allocate a pseudo-terminal for foreground containers.
    pub tty: bool,
}

impl Session<'_> {
    fn bindings(&self, image: &str) -> Bindings {
        let tty = if self.tty { vec!["-t".into()] } else { Vec::new() };
        let user = if self.cfg.as_user {
            docker::user_args()
        } else {
            Vec::new()
        };
        Bindings::new()
            .set("image", resolve_image_alias(self.cfg, image))
            .set("workdir", self.work_dir.display().to_string())
            .set("mount", self.cfg.mount.as_str())
            .set("socket", self.cfg.socket.as_str())
            .set_many("tty", tty)
            .set_many("user", user)
    }
}

fn render(skeleton: &[&str], bindings: &Bindings) -> Result<ContainerCommand> {
    let args = Template::new(skeleton.iter().copied()).render(bindings)?;
    Ok(ContainerCommand::new(args))
}

/// Render a configured in-container command line.
fn inner_command(line: &str, bindings: &Bindings) -> Result<Vec<String>> {
    let args = Template::parse(line)?
        .render(bindings)
        .with_context(|| format!("in configured command `{line}`"))?;
    Ok(args)
}

/// Build (or pull) `image`. `dev` is built on top of `prod`, so it rebuilds
/// prod first.
pub fn build_commands(cfg: &Config, image: &str) -> Result<Vec<ContainerCommand>> {
    let build = |image: &str, context: &str| {
        render(BUILD, &Bindings::new().set("image", image).set("context", context))
    };

    match ImageRef::parse(image) {
        ImageRef::Prod => Ok(vec![build(&cfg.prod_image, &cfg.prod_context)?]),
        ImageRef::Dev => Ok(vec![
            build(&cfg.prod_image, &cfg.prod_context)?,
            build(&cfg.dev_image, &cfg.dev_context)?,
        ]),
        ImageRef::Remote(image) => Ok(vec![render(PULL, &Bindings::new().set("image", image))?]),
    }
}

/// Run arbitrary command words in a throwaway container with the engine
/// socket mounted, so the container can drive the engine itself.
///
/// The words are joined with spaces and re-split with shell-word rules, so a
/// quoted argument can be passed through as a single string.
pub fn run_command(session: &Session, image: &str, words: &[String]) -> Result<ContainerCommand> {
    let joined = words.join(" ");
    let command = shell_words::split(&joined)
        .with_context(|| format!("cannot split command `{joined}`"))?;
    render(RUN, &session.bindings(image).set_many("command", command))
}

/// Run a configured project command (tests, flake8, docs) in a throwaway
/// container.
pub fn task_command(session: &Session, image: &str, line: &str) -> Result<ContainerCommand> {
    let bindings = session.bindings(image);
    let command = inner_command(line, &bindings)?;
    render(TASK, &bindings.set_many("command", command))
}

pub fn notebook_command(
    session: &Session,
    image: &str,
    name: &str,
    port: u16,
) -> Result<ContainerCommand> {
    let bindings = session
        .bindings(image)
        .set("name", name)
        .set("port", port.to_string());
    let command = inner_command(&session.cfg.notebook_command, &bindings)?;
    render(NOTEBOOK, &bindings.set_many("command", command))
}

pub fn remove_command(name: &str) -> Result<ContainerCommand> {
    Ok(render(REMOVE, &Bindings::new().set("name", name))?.quiet())
}

pub fn logs_command(name: &str) -> Result<ContainerCommand> {
    render(LOGS, &Bindings::new().set("name", name))
}
