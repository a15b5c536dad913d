use std::fmt;

/// Describes one engine invocation. `args` is the full argument list passed to
/// the engine binary; the dispatch layer is responsible for assembling it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerCommand {
    pub args: Vec<String>,
    /// Discard the child's stdout and stderr.
    pub quiet: bool,
}

impl ContainerCommand {
    pub fn new(args: Vec<String>) -> Self {
        Self { args, quiet: false }
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// The engine subcommand (`build`, `run`, `pull`, ...), if any.
    pub fn verb(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

impl fmt::Display for ContainerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_words::join(&self.args))
    }
}

/// Outcome of a forced container removal. Removal failing is expected when
/// the container does not exist, and the engine gives no way to tell that
/// apart from other failures, so both collapse into `Absent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    Absent,
}

impl Removal {
    pub fn from_status(status: i32) -> Self {
        if status == 0 {
            Removal::Removed
        } else {
            Removal::Absent
        }
    }
}
