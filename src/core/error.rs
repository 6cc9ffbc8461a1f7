//! Compilation error types.

use std::path::PathBuf;
use thiserror::Error;

use super::class::DebugInfo;

pub type Result<T, E = CompileError> = std::result::Result<T, E>;

/// Errors raised by resolution, generation, backend compilation and loading.
///
/// Every variant is fatal for the call that raised it. Dependency clocks are
/// only stamped after a call succeeds, so retrying re-attempts the same work.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{name} not found{}", .origin.as_ref().map(|o| format!(", referenced at {o}")).unwrap_or_default())]
    TemplateNotFound {
        name: String,
        origin: Option<DebugInfo>,
    },

    #[error("no backend available for `.{extension}` sources: {hint}")]
    BackendUnavailable { extension: String, hint: String },

    #[error("`{backend}` compilation failed\n{diagnostics}")]
    CompileFailure {
        backend: String,
        diagnostics: String,
    },

    #[error("{name}:{line}: {message}")]
    Parse {
        name: String,
        line: usize,
        message: String,
    },

    #[error("IO error at `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} has not been compiled")]
    UnknownTemplate { name: String },

    #[error("{name} and {other} both generate `{class}`")]
    ClassNameCollision {
        name: String,
        other: String,
        class: String,
    },
}

impl CompileError {
    pub fn not_found(name: impl Into<String>, origin: Option<&DebugInfo>) -> Self {
        Self::TemplateNotFound {
            name: name.into(),
            origin: origin.cloned(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            name: name.into(),
            line,
            message: message.into(),
        }
    }

    /// Check if this is a lookup failure for exactly `name`.
    pub fn is_not_found(&self, name: &str) -> bool {
        matches!(self, Self::TemplateNotFound { name: missing, .. } if missing == name)
    }
}
