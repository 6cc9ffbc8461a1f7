//! `[compiler]` section configuration.
//!
//! Controls where templates are read from, where generated output goes, and
//! how generated units are named.
//!
//! # Example
//!
//! ```toml
//! [compiler]
//! source = "templates"                          # Template root directory
//! class_directory = "target/stencil/classes"    # Generated sources and classes
//! resource_directory = "target/stencil/res"     # Binary payloads, native-image metadata
//! package = "gg.stencil.generated"              # Base package of generated units
//! project_namespace = "my-app"                  # Native-image namespace
//! class_path = ["lib/runtime.jar"]              # Defaults to $CLASSPATH
//! binary_static_content = false                 # Externalize text into .bin payloads
//! native_image = false                          # Emit native-image reflection metadata
//! primary_extension = "java"                    # Compiled last in mixed batches
//! runtime_package = "gg.stencil.runtime"        # Package of TemplateOutput
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::codegen::GeneratorOptions;
use crate::config::ConfigError;

/// Compiler settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompilerConfig {
    /// Template source root.
    pub source: PathBuf,

    /// Output directory for generated sources and compiled classes.
    pub class_directory: PathBuf,

    /// Output directory for binary payloads and native-image metadata.
    /// Binary payloads fall back to `class_directory` when unset.
    pub resource_directory: Option<PathBuf>,

    /// Base package of generated units.
    pub package: String,

    /// Namespace of native-image metadata, defaults to `package`.
    pub project_namespace: Option<String>,

    /// Backend classpath. `None` reads `$CLASSPATH`.
    pub class_path: Option<Vec<String>>,

    /// Emit text blocks as binary payload files.
    pub binary_static_content: bool,

    /// Export native-image reflection metadata after generation.
    pub native_image: bool,

    /// Target extension compiled last when a batch mixes languages.
    pub primary_extension: String,

    /// Package of the runtime types used by generated code.
    pub runtime_package: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            source: "templates".into(),
            class_directory: "target/stencil/classes".into(),
            resource_directory: None,
            package: "gg.stencil.generated".into(),
            project_namespace: None,
            class_path: None,
            binary_static_content: false,
            native_image: false,
            primary_extension: "java".into(),
            runtime_package: "gg.stencil.runtime".into(),
        }
    }
}

impl CompilerConfig {
    /// Config rooted at explicit source and class directories.
    pub fn new(source: impl Into<PathBuf>, class_directory: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            class_directory: class_directory.into(),
            ..Self::default()
        }
    }

    /// Builder-style resource directory.
    pub fn with_resource_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_directory = Some(dir.into());
        self
    }

    /// Namespace of native-image metadata.
    pub fn namespace(&self) -> &str {
        self.project_namespace.as_deref().unwrap_or(&self.package)
    }

    /// Directory that receives binary payloads.
    pub fn binary_directory(&self) -> &Path {
        self.resource_directory
            .as_deref()
            .unwrap_or(self.class_directory.as_path())
    }

    /// Directory holding every generated file of the configured package.
    pub fn package_directory(&self) -> PathBuf {
        self.package
            .split('.')
            .filter(|s| !s.is_empty())
            .fold(self.class_directory.clone(), |dir, segment| dir.join(segment))
    }

    /// Settings that shape generated code.
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            binary_static_content: self.binary_static_content,
            runtime_package: self.runtime_package.clone(),
        }
    }

    /// Resolve relative paths against `root`.
    pub fn resolve_paths(&mut self, root: &Path) {
        self.source = crate::config::util::resolve_path(&self.source, root);
        self.class_directory = crate::config::util::resolve_path(&self.class_directory, root);
        if let Some(dir) = self.resource_directory.take() {
            self.resource_directory = Some(crate::config::util::resolve_path(&dir, root));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, package) in [
            ("compiler.package", &self.package),
            ("compiler.runtime_package", &self.runtime_package),
        ] {
            if !is_package_name(package) {
                return Err(ConfigError::Validation(format!(
                    "`{field}` is not a valid package name: `{package}`"
                )));
            }
        }

        if self.primary_extension.is_empty() || self.primary_extension.contains('.') {
            return Err(ConfigError::Validation(format!(
                "`compiler.primary_extension` must be a bare extension, got `{}`",
                self.primary_extension
            )));
        }

        Ok(())
    }
}

/// Dotted identifier segments; empty means the default package.
fn is_package_name(name: &str) -> bool {
    name.is_empty()
        || name.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_compiler_config() {
        let config = test_parse_config(
            "[compiler]\nsource = \"views\"\npackage = \"app.views\"\nnative_image = true\nclass_path = [\"a.jar\"]",
        );

        assert_eq!(config.compiler.source, PathBuf::from("views"));
        assert_eq!(config.compiler.package, "app.views");
        assert!(config.compiler.native_image);
        assert_eq!(config.compiler.class_path, Some(vec!["a.jar".to_string()]));
        assert_eq!(config.compiler.namespace(), "app.views");
    }

    #[test]
    fn test_compiler_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.compiler, CompilerConfig::default());
        assert_eq!(config.compiler.primary_extension, "java");
        assert_eq!(config.compiler.class_path, None);
    }

    #[test]
    fn test_directories() {
        let config = CompilerConfig::new("/t", "/out");
        assert_eq!(config.binary_directory(), Path::new("/out"));
        assert_eq!(
            config.package_directory(),
            PathBuf::from("/out/gg/stencil/generated")
        );

        let config = config.with_resource_directory("/res");
        assert_eq!(config.binary_directory(), Path::new("/res"));
    }

    #[test]
    fn test_validate() {
        assert!(CompilerConfig::default().validate().is_ok());

        let config = CompilerConfig {
            package: "app.1views".into(),
            ..CompilerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let config = CompilerConfig {
            primary_extension: ".java".into(),
            ..CompilerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CompilerConfig {
            package: String::new(),
            ..CompilerConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
