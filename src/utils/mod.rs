//! Utility modules shared across the crate.

pub mod exec;
pub mod path;
mod plural;

pub use plural::plural_count;
