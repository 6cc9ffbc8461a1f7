//! Template compilation orchestrator.
//!
//! # Module Structure
//!
//! ```text
//! compiler/
//! ├── dependency.rs  # Shared clocks and per-root dependency sets
//! ├── generate.rs    # Names → generated units on disk
//! ├── dispatch.rs    # Units → backend invocations
//! ├── backend/       # ClassCompiler trait, registry, external process backend
//! ├── classpath.rs   # Backend classpath resolution
//! ├── native.rs      # Native-image metadata export
//! └── mod.rs         # TemplateCompiler (this file)
//! ```
//!
//! # Lifecycle of a name
//!
//! ```text
//! Unknown ──generate──► Generated ──compile──► Compiled ──load──► Loaded
//!                           ▲                                      │
//!                           └──────── load_changes (stale deps) ───┘
//! ```

pub mod backend;
pub mod classpath;
pub mod dependency;
mod dispatch;
mod generate;
pub mod native;


use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

use crate::codegen::GeneratorOptions;
use crate::config::CompilerConfig;
use crate::core::{ClassInfo, CompileError, ParamInfo, Result};
use crate::loader::{ArtifactLoader, DirectoryArtifactLoader};
use crate::debug;
use crate::resolver::CodeResolver;
use crate::utils::path::remove_dir_if_exists;
use backend::BackendRegistry;
use dependency::DependencyTracker;

/// Generates, compiles and tracks templates of one source tree.
///
/// All caches live for the compiler's lifetime. Distinct roots may be
/// loaded from several threads; the same root must not be loaded
/// concurrently.
pub struct TemplateCompiler {
    config: CompilerConfig,
    resolver: Arc<dyn CodeResolver>,
    backends: BackendRegistry,
    artifacts: Arc<dyn ArtifactLoader>,
    tracker: DependencyTracker,
    /// Template name → declared parameters.
    param_order: DashMap<String, Vec<ParamInfo>>,
    /// Fully qualified generated name → metadata.
    class_infos: DashMap<String, ClassInfo>,
    class_path: OnceLock<Vec<String>>,
    generator_options: GeneratorOptions,
}

impl TemplateCompiler {
    /// Compiler with the default `javac` backend and directory artifacts.
    pub fn new(config: CompilerConfig, resolver: Arc<dyn CodeResolver>) -> Self {
        let generator_options = config.generator_options();
        Self {
            config,
            resolver,
            backends: BackendRegistry::default(),
            artifacts: Arc::new(DirectoryArtifactLoader),
            tracker: DependencyTracker::new(),
            param_order: DashMap::new(),
            class_infos: DashMap::new(),
            class_path: OnceLock::new(),
            generator_options,
        }
    }

    pub fn with_backends(mut self, backends: BackendRegistry) -> Self {
        self.backends = backends;
        self
    }

    pub fn with_artifact_loader(mut self, artifacts: Arc<dyn ArtifactLoader>) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn resolver(&self) -> &dyn CodeResolver {
        self.resolver.as_ref()
    }

    /// Fully qualified generated name → metadata of every generated unit.
    pub fn class_metadata(&self) -> &DashMap<String, ClassInfo> {
        &self.class_infos
    }

    pub(crate) fn tracker(&self) -> &DependencyTracker {
        &self.tracker
    }

    pub(crate) fn artifacts(&self) -> &dyn ArtifactLoader {
        self.artifacts.as_ref()
    }

    /// Backend classpath, resolved once.
    pub fn class_path(&self) -> &[String] {
        self.class_path
            .get_or_init(|| classpath::resolve_class_path(&self.config))
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Generate and compile `names`, then stamp their compile clocks.
    ///
    /// Returns the generated source files, relative to the class directory.
    pub fn precompile(&self, names: &[String]) -> Result<Vec<String>> {
        let units = self.generate(names)?;
        self.compile_units(&units)?;

        for name in names {
            self.tracker.mark_compiled(name, self.resolver());
        }
        Ok(units.source_file_names())
    }

    /// Generate sources for every resolvable template without compiling.
    pub fn generate_all(&self) -> Result<Vec<String>> {
        let names = self.resolver.resolve_all_template_names();
        Ok(self.generate(&names)?.source_file_names())
    }

    /// Generate and compile every resolvable template.
    pub fn precompile_all(&self) -> Result<Vec<String>> {
        let names = self.resolver.resolve_all_template_names();
        self.precompile(&names)
    }

    /// Remove every generated file of the configured package.
    pub fn clean_all(&self) -> Result<()> {
        let dir = self.config.package_directory();
        let removed = remove_dir_if_exists(&dir).map_err(|err| CompileError::io(&dir, err))?;
        if removed {
            debug!("clean"; "removed {}", dir.display());
        }
        Ok(())
    }

    /// True iff a dependency of `name` changed since it was last loaded.
    pub fn has_changed(&self, name: &str) -> bool {
        self.tracker.has_changed(name, self.resolver())
    }

    /// Every root whose dependency set contains `name`, sorted.
    pub fn templates_using(&self, name: &str) -> Vec<String> {
        self.tracker.templates_using(name)
    }

    /// Recorded dependency set of `name`, root first.
    pub fn dependencies_of(&self, name: &str) -> Option<Vec<String>> {
        self.tracker.dependencies_of(name)
    }

    /// Dependencies of `name` modified since they were last compiled.
    pub fn dependencies_to_recompile(&self, name: &str) -> Option<Vec<String>> {
        self.tracker.dependencies_to_recompile(name, self.resolver())
    }
}
