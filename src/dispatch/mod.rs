//! Subcommand actions and the engine invocations behind them.

pub mod actions;
pub mod commands;
pub mod template;

pub use actions::{NotebookOptions, build, check, copyright, doc, flake, notebook, run, test};
pub use commands::{ImageRef, Session, resolve_image_alias};
pub use template::{Bindings, Template, TemplateError};
