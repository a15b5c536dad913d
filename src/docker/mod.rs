// Container engine access: argv types, the `Runner` seam, and process spawning.

pub mod engine;
pub mod run;
pub mod types;

pub use engine::{exit_code, user_args};
pub use run::{DryRun, Engine, Runner};
pub use types::{ContainerCommand, Removal};
