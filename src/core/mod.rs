//! Core types - pure abstractions shared across the codebase.

mod class;
mod error;
mod kind;

pub use class::{ClassInfo, DebugInfo, ParamInfo};
pub use error::{CompileError, Result};
pub use kind::{Dialect, LAYOUT_DIRECTORY, TAG_DIRECTORY, TemplateType};
