//! lmrun: container workflows for the LM Challenge project.
//!
//! Builds the project images, runs tests, flake8 and documentation builds in
//! throwaway containers, starts notebook servers, and checks source files for
//! the required copyright header.

pub mod cli;
pub mod config;
pub mod copyright;
pub mod dispatch;
pub mod docker;
