//! Stencil - a template precompiler with incremental, dependency-aware regeneration.
//!
//! Templates (`.jte` / `.kte`) are generated into target-language units,
//! compiled by external backends, and tracked per root so that only stale
//! dependencies are regenerated on reload.
//!
//! ```ignore
//! use std::sync::Arc;
//! use stencil::{CompilerConfig, DirectoryResolver, TemplateCompiler, TemplateLoader};
//!
//! let config = CompilerConfig::new("templates", "target/stencil/classes");
//! let compiler = TemplateCompiler::new(config, Arc::new(DirectoryResolver::new("templates")));
//!
//! let page = compiler.load("page.jte")?;
//! if compiler.has_changed("page.jte") {
//!     compiler.load_changes("page.jte")?;
//! }
//! ```

pub mod cli;
pub mod codegen;
pub mod compiler;
pub mod config;
pub mod core;
pub mod loader;
pub mod logger;
pub mod resolver;
pub mod utils;

pub use compiler::TemplateCompiler;
pub use compiler::backend::{BackendRegistry, ClassCompiler, CompileRequest};
pub use config::{CompilerConfig, StencilConfig};
pub use crate::core::{ClassInfo, CompileError, Result};
pub use loader::{ArtifactLoader, LoaderContext, Template, TemplateLoader};
pub use resolver::{CodeResolver, DirectoryResolver, MemoryResolver};
