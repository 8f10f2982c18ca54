//! qlgen Command Line Driver
//!
//! Locates the project, turns command line flags into graph options and runs
//! the generator. The binary in `main.rs` only dispatches and prints.

pub mod commands;
mod project;
mod tracing_setup;

pub use project::{Project, ProjectError};
pub use tracing_setup::init_tracing;
