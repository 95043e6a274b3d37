//! Command-line interface definitions.

mod args;
mod commands;

pub use args::{Cli, ConfigArgs};
pub use commands::{Commands, ValueArgs};
