//! Configuration section definitions.
//!
//! Each module corresponds to a section in `stencil.toml`:
//!
//! | Module     | TOML Section          | Purpose                              |
//! |------------|-----------------------|--------------------------------------|
//! | `compiler` | `[compiler]`          | Source/output paths, package naming  |
//! | `backend`  | `[backend.<ext>]`     | External compiler per extension      |

mod backend;
mod compiler;

pub use backend::{BackendConfig, DEFAULT_BACKEND_EXTENSION};
pub use compiler::CompilerConfig;
