//! `generate`, `precompile` and `clean` commands.

use anyhow::{Context, Result};
use std::time::Instant;

use crate::compiler::TemplateCompiler;
use crate::log;
use crate::utils::plural_count;

/// Generate target sources for every template.
pub fn generate(compiler: &TemplateCompiler) -> Result<()> {
    let started = Instant::now();
    let files = compiler
        .generate_all()
        .context("Failed to generate templates")?;

    log!(
        "generate";
        "{} in {}ms",
        plural_count(files.len(), "source file"),
        started.elapsed().as_millis()
    );
    log_output_directory(compiler);
    Ok(())
}

/// Generate and compile every template.
pub fn precompile(compiler: &TemplateCompiler) -> Result<()> {
    let started = Instant::now();
    let files = compiler
        .precompile_all()
        .context("Failed to precompile templates")?;

    log!(
        "precompile";
        "{} compiled in {}ms",
        plural_count(files.len(), "unit"),
        started.elapsed().as_millis()
    );
    log_output_directory(compiler);
    Ok(())
}

/// Remove every generated file of the configured package.
pub fn clean(compiler: &TemplateCompiler) -> Result<()> {
    compiler.clean_all().context("Failed to clean output")?;
    log!("clean"; "removed {}", compiler.config().package_directory().display());
    Ok(())
}

fn log_output_directory(compiler: &TemplateCompiler) {
    crate::debug!("output"; "{}", compiler.config().class_directory.display());
}
