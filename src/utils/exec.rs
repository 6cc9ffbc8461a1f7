//! External command execution.
//!
//! Builder-based API for running backend toolchains and collecting their
//! diagnostics.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::{Cmd, FilterRule};
//!
//! static JAVAC_FILTER: FilterRule = FilterRule::new(&["Note:"]);
//!
//! Cmd::new("javac")
//!     .args(["-d", "target/classes"])
//!     .args(&files)
//!     .filter(&JAVAC_FILTER)
//!     .run()?;
//! ```

use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    io,
    process::{Command, ExitStatus, Output},
    sync::LazyLock,
};
use thiserror::Error;

use crate::log;

/// Failure to run an external command.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to execute `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` failed with {status}")]
    Failed {
        program: String,
        status: ExitStatus,
        /// Filtered stderr followed by stdout.
        diagnostics: String,
    },
}

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if !arg.is_empty() {
                self.args.push(arg.to_owned());
            }
        }
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Execute the command and return output.
    ///
    /// On success, stderr lines passing the filter are logged under the
    /// program name. On failure, they are returned as diagnostics.
    pub fn run(self) -> Result<Output, ExecError> {
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);
        let name = self.program_name();

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|source| ExecError::Spawn {
                program: name.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ExecError::Failed {
                diagnostics: format_diagnostics(&output, filter),
                program: name,
                status: output.status,
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        filter.log(&name, stderr.trim());
        Ok(output)
    }

    /// Get the program name for messages, without its directory.
    fn program_name(&self) -> String {
        let program = std::path::Path::new(&self.program);
        program
            .file_name()
            .unwrap_or(program.as_os_str())
            .to_string_lossy()
            .to_string()
    }
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output logging.
///
/// Used to reduce noise by skipping known warnings or irrelevant messages.
pub struct FilterRule {
    /// Prefixes to skip when logging output.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Check if a line should be skipped.
    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Lines of `output` that pass the filter, without ANSI codes.
    fn keep(&self, output: &str) -> Vec<String> {
        output
            .lines()
            .map(|line| strip_ansi(line).trim_end().to_string())
            .filter(|line| !self.should_skip(line.trim()))
            .collect()
    }

    /// Log output lines that pass the filter.
    pub fn log(&self, name: &str, output: &str) {
        let lines = self.keep(output);
        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
    RE.replace_all(s, "")
}

/// Diagnostics of a failed command: filtered stderr, then stdout.
fn format_diagnostics(output: &Output, filter: &FilterRule) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let mut lines = filter.keep(&stderr);
    lines.extend(
        stdout
            .lines()
            .map(|line| strip_ansi(line).trim_end().to_string())
            .filter(|line| !line.is_empty()),
    );
    lines.join("\n")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("javac").arg("-d").args(["out", "A.java"]);

        assert_eq!(cmd.program, OsString::from("javac"));
        assert_eq!(cmd.args.len(), 3);
    }

    #[test]
    fn test_empty_args_filtered() {
        let cmd = Cmd::new("echo").arg("").args(["a", "", "b"]);
        assert_eq!(cmd.args.len(), 2);
    }

    #[test]
    fn test_filter_rule() {
        let filter = FilterRule::new(&["Note:", "warning:"]);
        assert!(filter.should_skip("Note: Some input files use unchecked operations."));
        assert!(filter.should_skip("warning: [options] bootstrap class path not set"));
        assert!(!filter.should_skip("A.java:3: error: ';' expected"));
        assert!(filter.should_skip(""));
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_ansi("Plain text"), "Plain text");
    }

    #[cfg(unix)]
    #[test]
    fn test_simple_command() {
        let output = Cmd::new("echo").arg("hello").run().unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_command_collects_diagnostics() {
        static FILTER: FilterRule = FilterRule::new(&["Note:"]);
        let err = Cmd::new("sh")
            .args(["-c", "echo 'Note: skip' >&2; echo 'A.java:1: error' >&2; exit 2"])
            .filter(&FILTER)
            .run()
            .unwrap_err();

        match err {
            ExecError::Failed { diagnostics, .. } => assert_eq!(diagnostics, "A.java:1: error"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_program() {
        let err = Cmd::new("stencil-no-such-program").run().unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }
}
