//! Path utilities.
//!
//! - [`fs`]: Generated-file IO

pub mod fs;

pub use fs::{remove_dir_if_exists, write_file};
