//! Compiler configuration management for `stencil.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── compiler   # [compiler]
//! │   └── backend    # [backend.<ext>]
//! ├── error.rs       # ConfigError
//! ├── util.rs        # Config file discovery, path resolution
//! └── mod.rs         # StencilConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section             | Purpose                                        |
//! |---------------------|------------------------------------------------|
//! | `[compiler]`        | Source/output directories, package, features   |
//! | `[backend.<ext>]`   | External compiler per generated extension      |

mod error;
pub mod section;
pub(crate) mod util;

pub use error::ConfigError;
pub use section::{BackendConfig, CompilerConfig, DEFAULT_BACKEND_EXTENSION};

use util::find_config_file;

use crate::cli::{Cli, CompileArgs};
use crate::{debug, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing stencil.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StencilConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Compiler settings
    pub compiler: CompilerConfig,

    /// Backend compilers keyed by generated-source extension
    pub backend: BTreeMap<String, BackendConfig>,
}

impl StencilConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file. Without one, the
    /// defaults apply with cwd as the project root.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        crate::logger::set_verbose(cli.compile_args().verbose);

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = path;
                config
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                let mut config = Self::default();
                config.ensure_default_backend();
                config.config_path = cwd.join(&cli.config);
                config
            }
        };

        config.finalize(cli.compile_args());
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.ensure_default_backend();
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.ensure_default_backend();
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// The `java` backend exists unless the file overrides it.
    fn ensure_default_backend(&mut self) {
        self.backend
            .entry(DEFAULT_BACKEND_EXTENSION.to_string())
            .or_insert_with(BackendConfig::javac);
    }

    /// Finalize configuration after loading.
    fn finalize(&mut self, args: &CompileArgs) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        self.apply_compile_args(args);
        self.compiler.resolve_paths(&root);
        self.root = root;
    }

    /// Apply CLI overrides.
    fn apply_compile_args(&mut self, args: &CompileArgs) {
        Self::update_option(&mut self.compiler.source, args.source.as_ref());
        Self::update_option(&mut self.compiler.class_directory, args.class_dir.as_ref());
    }

    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    // ========================================================================
    // validation
    // ========================================================================

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.compiler.validate()?;

        for (extension, backend) in &self.backend {
            if extension.is_empty() || extension.starts_with('.') {
                return Err(ConfigError::Validation(format!(
                    "backend key must be a bare extension, got `{extension}`"
                )));
            }
            backend.validate(extension)?;
        }

        if !self.backend.contains_key(&self.compiler.primary_extension) {
            return Err(ConfigError::Validation(format!(
                "no `[backend.{}]` for `compiler.primary_extension`",
                self.compiler.primary_extension
            )));
        }

        Ok(())
    }
}

/// Parse config and fail on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> StencilConfig {
    let (mut parsed, ignored) = StencilConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed.ensure_default_backend();
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_collected() {
        let (_, ignored) =
            StencilConfig::parse_with_ignored("[compiler]\nsorce = \"x\"\n[extra]\na = 1").unwrap();
        assert_eq!(ignored, vec!["compiler.sorce", "extra"]);
    }

    #[test]
    fn test_finalize_resolves_against_root() {
        let mut config = StencilConfig::from_str("[compiler]\nsource = \"views\"").unwrap();
        config.config_path = PathBuf::from("/project/stencil.toml");
        config.finalize(&CompileArgs {
            class_dir: Some(PathBuf::from("/tmp/out")),
            ..CompileArgs::default()
        });

        assert_eq!(config.get_root(), Path::new("/project"));
        assert_eq!(config.compiler.source, PathBuf::from("/project/views"));
        assert_eq!(config.compiler.class_directory, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_validate_primary_backend() {
        let config =
            StencilConfig::from_str("[compiler]\nprimary_extension = \"kt\"").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let config = StencilConfig::from_str(
            "[compiler]\nprimary_extension = \"kt\"\n[backend.kt]\nprogram = \"kotlinc\"",
        )
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_enables_verbose_before_discovery() {
        use clap::Parser;

        let cli = Cli::parse_from(["stencil", "-C", "stencil-absent.toml", "generate", "-V"]);
        let config = StencilConfig::load(&cli).unwrap();

        assert!(crate::logger::is_verbose());
        assert!(config.config_path.ends_with("stencil-absent.toml"));
        assert!(config.backend.contains_key("java"));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            StencilConfig::from_str("[compiler\n"),
            Err(ConfigError::Toml(_))
        ));
    }
}
