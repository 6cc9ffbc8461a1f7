//! Loading compiled templates.
//!
//! [`TemplateLoader`] is the surface a renderer talks to. [`TemplateCompiler`]
//! implements it by compiling on demand; turning compiled output into a
//! [`Template`] handle is delegated to an [`ArtifactLoader`].

use std::path::{Path, PathBuf};

use crate::compiler::TemplateCompiler;
use crate::core::{ClassInfo, CompileError, Result};
use crate::debug;

/// Where compiled artifacts are looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderContext {
    pub class_directory: PathBuf,
    pub class_path: Vec<String>,
}

/// Handle to one compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub info: ClassInfo,
    /// Compiled artifact of the unit, e.g. `<classes>/app/JtepageGenerated.class`.
    pub artifact: PathBuf,
}

impl Template {
    pub fn name(&self) -> &str {
        &self.info.name
    }
}

/// Turns compiled output into template handles.
pub trait ArtifactLoader: Send + Sync {
    fn instantiate(&self, context: &LoaderContext, info: &ClassInfo) -> Result<Template>;
}

/// Points handles at class files under the class directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryArtifactLoader;

impl DirectoryArtifactLoader {
    pub fn artifact_path(class_directory: &Path, info: &ClassInfo) -> PathBuf {
        let mut path = class_directory.to_path_buf();
        for segment in info.package_name.split('.').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.join(format!("{}.class", info.class_name))
    }
}

impl ArtifactLoader for DirectoryArtifactLoader {
    fn instantiate(&self, context: &LoaderContext, info: &ClassInfo) -> Result<Template> {
        Ok(Template {
            info: info.clone(),
            artifact: Self::artifact_path(&context.class_directory, info),
        })
    }
}

// ============================================================================
// Loader contract
// ============================================================================

/// Compile-on-demand access to templates.
pub trait TemplateLoader {
    /// Generate and compile `name` from scratch, then load it.
    fn load(&self, name: &str) -> Result<Template>;

    /// Recompile only the stale dependencies of `name`, then load it.
    fn load_changes(&self, name: &str) -> Result<Template>;

    fn has_changed(&self, name: &str) -> bool;

    fn templates_using(&self, name: &str) -> Vec<String>;

    /// Base package of generated units.
    fn package_name(&self) -> &str;

    fn loader_context(&self) -> LoaderContext;

    /// Metadata of a compiled unit by fully qualified name.
    fn class_info(&self, context: &LoaderContext, class_name: &str) -> Option<ClassInfo>;

    fn artifact_loader(&self) -> &dyn ArtifactLoader;

    /// Hand the compiled unit of `name` to the artifact loader.
    fn instantiate(&self, name: &str) -> Result<Template> {
        let class_name = ClassInfo::new(name, self.package_name()).full_name;
        let context = self.loader_context();
        let info = self
            .class_info(&context, &class_name)
            .ok_or_else(|| CompileError::UnknownTemplate {
                name: name.to_string(),
            })?;
        self.artifact_loader().instantiate(&context, &info)
    }
}

impl TemplateLoader for TemplateCompiler {
    fn load(&self, name: &str) -> Result<Template> {
        self.precompile(&[name.to_string()])?;
        self.tracker().mark_loaded(name, self.resolver());
        self.instantiate(name)
    }

    fn load_changes(&self, name: &str) -> Result<Template> {
        let Some(stale) = self.dependencies_to_recompile(name) else {
            debug!("load"; "{} was never loaded", name);
            return self.load(name);
        };

        if !stale.is_empty() {
            debug!("load"; "{}: recompiling {}", name, stale.join(", "));
            self.precompile(&stale)?;
            self.tracker().merge_into(name, &stale);
        }

        self.tracker().mark_loaded(name, self.resolver());
        self.instantiate(name)
    }

    fn has_changed(&self, name: &str) -> bool {
        TemplateCompiler::has_changed(self, name)
    }

    fn templates_using(&self, name: &str) -> Vec<String> {
        TemplateCompiler::templates_using(self, name)
    }

    fn package_name(&self) -> &str {
        &self.config().package
    }

    fn loader_context(&self) -> LoaderContext {
        LoaderContext {
            class_directory: self.config().class_directory.clone(),
            class_path: self.class_path().to_vec(),
        }
    }

    fn class_info(&self, _context: &LoaderContext, class_name: &str) -> Option<ClassInfo> {
        self.class_metadata()
            .get(class_name)
            .map(|info| info.value().clone())
    }

    fn artifact_loader(&self) -> &dyn ArtifactLoader {
        self.artifacts()
    }
}
