//! Command-line interface module.

mod args;
pub mod compile;
pub mod deps;

pub use args::{Cli, Commands, CompileArgs};
