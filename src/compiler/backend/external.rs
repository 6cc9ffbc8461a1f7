//! Backend running an external compiler process.

use std::fs;
use std::path::PathBuf;

use super::{ClassCompiler, CompileRequest};
use crate::compiler::classpath::join_class_path;
use crate::config::BackendConfig;
use crate::core::{CompileError, Result};
use crate::debug;
use crate::utils::exec::{Cmd, ExecError, FilterRule};

/// Compiler chatter that is not worth relaying.
static BACKEND_FILTER: FilterRule = FilterRule::new(&[
    "Note: Some input files use unchecked or unsafe operations.",
    "Note: Recompile with -Xlint",
    "warning: [options]",
]);

/// `javac`-style compiler: `<program> <args> <output_flag> <dir> [<class_path_flag> <cp>] <files>`.
#[derive(Debug, Clone)]
pub struct ExternalCompiler {
    extension: String,
    program: PathBuf,
    config: BackendConfig,
}

impl ExternalCompiler {
    /// Locate the configured program on `PATH`.
    pub fn new(extension: &str, config: BackendConfig) -> Result<Self> {
        let program =
            which::which(&config.program).map_err(|_| CompileError::BackendUnavailable {
                extension: extension.to_string(),
                hint: format!("`{}` was not found on PATH", config.program),
            })?;

        Ok(Self {
            extension: extension.to_string(),
            program,
            config,
        })
    }

    fn command(&self, request: &CompileRequest<'_>) -> Cmd {
        let mut cmd = Cmd::new(&self.program)
            .args(&self.config.args)
            .arg(&self.config.output_flag)
            .arg(request.output_directory);

        if !request.class_path.is_empty() {
            cmd = cmd
                .arg(&self.config.class_path_flag)
                .arg(join_class_path(request.class_path));
        }

        cmd.args(request.files).filter(&BACKEND_FILTER)
    }
}

impl ClassCompiler for ExternalCompiler {
    fn compile(&self, request: &CompileRequest<'_>) -> Result<()> {
        fs::create_dir_all(request.output_directory)
            .map_err(|err| CompileError::io(request.output_directory, err))?;

        debug!("backend"; "{} compiling {} .{} files", self.config.program, request.files.len(), self.extension);

        match self.command(request).run() {
            Ok(_) => Ok(()),
            Err(ExecError::Spawn { source, .. }) => Err(CompileError::io(&self.program, source)),
            Err(ExecError::Failed { diagnostics, .. }) => Err(CompileError::CompileFailure {
                backend: self.config.program.clone(),
                diagnostics: annotate_diagnostics(&diagnostics, request),
            }),
        }
    }
}

/// Append the originating template to diagnostic lines naming a generated file.
fn annotate_diagnostics(diagnostics: &str, request: &CompileRequest<'_>) -> String {
    let sources: Vec<(String, String)> = request
        .class_metadata
        .iter()
        .map(|entry| (entry.source_file_name(), entry.name.clone()))
        .collect();

    diagnostics
        .lines()
        .map(|line| {
            let best = sources
                .iter()
                .filter(|(file, _)| names_file(line, file))
                .max_by_key(|(file, _)| file.len());
            match best {
                Some((_, template)) => format!("{line} (template: {template})"),
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check whether `line` mentions `file` as a whole path or path suffix.
fn names_file(line: &str, file: &str) -> bool {
    line.match_indices(file).any(|(at, _)| {
        line[..at]
            .chars()
            .next_back()
            .is_none_or(|c| c == '/' || c == '\\' || c.is_whitespace())
    })
}
