//! Command-line interface module.

mod args;
pub mod build;
pub mod keys;

pub use args::{BuildArgs, Cli, Commands, KeysArgs};
