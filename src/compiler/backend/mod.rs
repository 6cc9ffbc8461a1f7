//! Backend compilers, selected by generated-source extension.
//!
//! ```text
//! BackendRegistry            extension → factory
//!   "java" → ExternalCompiler(javac)
//!   "kt"   → ExternalCompiler(kotlinc)       (only when configured)
//! ```
//!
//! Factories run lazily, once per dispatch, so a missing optional toolchain
//! only fails batches that actually contain its extension.

mod external;

pub use external::ExternalCompiler;

use dashmap::DashMap;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{BackendConfig, CompilerConfig, DEFAULT_BACKEND_EXTENSION};
use crate::core::{ClassInfo, CompileError, Result};

/// Turns generated source files into loadable artifacts.
pub trait ClassCompiler: Send + Sync {
    /// Compile every file of `request`, failing on error diagnostics.
    fn compile(&self, request: &CompileRequest<'_>) -> Result<()>;
}

/// One backend invocation.
pub struct CompileRequest<'a> {
    /// Absolute paths of the generated sources.
    pub files: &'a [PathBuf],
    pub class_path: &'a [String],
    pub config: &'a CompilerConfig,
    pub output_directory: &'a Path,
    /// Fully qualified generated name → metadata, for diagnostics.
    pub class_metadata: &'a DashMap<String, ClassInfo>,
}

type BackendFactory = Arc<dyn Fn() -> Result<Arc<dyn ClassCompiler>> + Send + Sync>;

/// Extension-keyed backend factories.
#[derive(Clone)]
pub struct BackendRegistry {
    factories: FxHashMap<String, BackendFactory>,
}

impl Default for BackendRegistry {
    /// Registry with only the default `javac` backend.
    fn default() -> Self {
        let mut backends = BTreeMap::new();
        backends.insert(DEFAULT_BACKEND_EXTENSION.to_string(), BackendConfig::javac());
        Self::from_config(&backends)
    }
}

impl BackendRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// External-process backends from `[backend.<ext>]` sections.
    pub fn from_config(backends: &BTreeMap<String, BackendConfig>) -> Self {
        let mut registry = Self::new();
        for (extension, config) in backends {
            let extension_owned = extension.clone();
            let config = config.clone();
            registry.register(extension, move || {
                let compiler = ExternalCompiler::new(&extension_owned, config.clone())?;
                Ok(Arc::new(compiler) as Arc<dyn ClassCompiler>)
            });
        }
        registry
    }

    /// Register (or replace) the factory for `extension`.
    pub fn register<F>(&mut self, extension: &str, factory: F)
    where
        F: Fn() -> Result<Arc<dyn ClassCompiler>> + Send + Sync + 'static,
    {
        self.factories
            .insert(extension.to_string(), Arc::new(factory));
    }

    /// Register an already constructed backend.
    pub fn register_compiler(&mut self, extension: &str, compiler: Arc<dyn ClassCompiler>) {
        self.register(extension, move || Ok(Arc::clone(&compiler)));
    }

    /// Instantiate the backend for `extension`.
    pub fn create(&self, extension: &str) -> Result<Arc<dyn ClassCompiler>> {
        let factory = self
            .factories
            .get(extension)
            .ok_or_else(|| CompileError::BackendUnavailable {
                extension: extension.to_string(),
                hint: format!("add a [backend.{extension}] section to stencil.toml"),
            })?;
        factory()
    }

    pub fn contains(&self, extension: &str) -> bool {
        self.factories.contains_key(extension)
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<_> = self.factories.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }
}
