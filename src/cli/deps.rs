//! `deps` command: inspect the dependency sets of a template.

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;

use crate::compiler::TemplateCompiler;
use crate::log;
use crate::utils::plural_count;

/// Generate every template, then print what `name` depends on and which
/// templates use it.
pub fn print_dependencies(compiler: &TemplateCompiler, name: &str) -> Result<()> {
    compiler
        .generate_all()
        .context("Failed to generate templates")?;

    let Some(dependencies) = compiler.dependencies_of(name) else {
        bail!("`{name}` is not a template under {}", compiler.config().source.display());
    };

    log!("deps"; "{} depends on {}", name, plural_count(dependencies.len(), "template"));
    for (index, dependency) in dependencies.iter().enumerate() {
        if index == 0 {
            println!("  {}", dependency.bold());
        } else {
            println!("  {}", dependency);
        }
    }

    let users: Vec<String> = compiler
        .templates_using(name)
        .into_iter()
        .filter(|user| user != name)
        .collect();
    if !users.is_empty() {
        log!("deps"; "used by {}", plural_count(users.len(), "template"));
        for user in &users {
            println!("  {}", user.dimmed());
        }
    }

    Ok(())
}
