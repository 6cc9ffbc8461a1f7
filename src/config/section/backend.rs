//! `[backend.<extension>]` section configuration.
//!
//! One table per generated-source extension. The `java` backend is always
//! present; every other backend is optional and must be declared.
//!
//! # Example
//!
//! ```toml
//! [backend.java]
//! program = "javac"
//! args = ["-encoding", "UTF-8"]
//! output_flag = "-d"
//! class_path_flag = "-classpath"
//!
//! [backend.kt]
//! program = "kotlinc"
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Extension compiled by the built-in default backend.
pub const DEFAULT_BACKEND_EXTENSION: &str = "java";

/// External compiler invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BackendConfig {
    /// Executable name or path.
    pub program: String,

    /// Extra arguments passed before the source files.
    pub args: Vec<String>,

    /// Flag preceding the output directory.
    pub output_flag: String,

    /// Flag preceding the joined classpath.
    pub class_path_flag: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            program: String::new(),
            args: Vec::new(),
            output_flag: "-d".into(),
            class_path_flag: "-classpath".into(),
        }
    }
}

impl BackendConfig {
    /// The default `javac` backend.
    pub fn javac() -> Self {
        Self {
            program: "javac".into(),
            args: vec!["-encoding".into(), "UTF-8".into()],
            ..Self::default()
        }
    }

    pub fn validate(&self, extension: &str) -> Result<(), ConfigError> {
        if self.program.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "`backend.{extension}.program` must not be empty"
            )));
        }
        Ok(())
    }
}
