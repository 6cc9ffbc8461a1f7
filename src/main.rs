//! Stencil - template precompiler CLI.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use std::sync::Arc;

use stencil::cli::{self, Cli, Commands};
use stencil::{BackendRegistry, DirectoryResolver, StencilConfig, TemplateCompiler};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = StencilConfig::load(&cli)?;
    let compiler = build_compiler(&config);

    match &cli.command {
        Commands::Generate { .. } => cli::compile::generate(&compiler),
        Commands::Precompile { .. } => cli::compile::precompile(&compiler),
        Commands::Clean { .. } => cli::compile::clean(&compiler),
        Commands::Deps { name, .. } => cli::deps::print_dependencies(&compiler, name),
    }
}

/// Compiler over the configured source directory and backends.
fn build_compiler(config: &StencilConfig) -> TemplateCompiler {
    let resolver = Arc::new(DirectoryResolver::new(&config.compiler.source));
    TemplateCompiler::new(config.compiler.clone(), resolver)
        .with_backends(BackendRegistry::from_config(&config.backend))
}
