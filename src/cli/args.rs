//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Stencil template compiler CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: stencil.toml)
    #[arg(short = 'C', long, default_value = "stencil.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate target sources for every template
    #[command(visible_alias = "g")]
    Generate {
        #[command(flatten)]
        args: CompileArgs,
    },

    /// Generate and compile every template
    #[command(visible_alias = "p")]
    Precompile {
        #[command(flatten)]
        args: CompileArgs,
    },

    /// Remove all generated output of the configured package
    Clean {
        #[command(flatten)]
        args: CompileArgs,
    },

    /// Print the dependency set of a template
    #[command(visible_alias = "d")]
    Deps {
        /// Template name, e.g. `pages/index.jte`
        name: String,

        #[command(flatten)]
        args: CompileArgs,
    },
}

/// Shared arguments of every command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CompileArgs {
    /// Template source directory (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub source: Option<PathBuf>,

    /// Output directory for generated sources and classes
    #[arg(long = "class-dir", value_hint = clap::ValueHint::DirPath)]
    pub class_dir: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    /// Arguments shared by all subcommands.
    pub const fn compile_args(&self) -> &CompileArgs {
        match &self.command {
            Commands::Generate { args }
            | Commands::Precompile { args }
            | Commands::Clean { args }
            | Commands::Deps { args, .. } => args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deps() {
        let cli = Cli::parse_from(["stencil", "-C", "x.toml", "deps", "page.jte", "-V"]);
        assert_eq!(cli.config, PathBuf::from("x.toml"));
        assert!(matches!(&cli.command, Commands::Deps { name, .. } if name == "page.jte"));
        assert!(cli.compile_args().verbose);
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::parse_from([
            "stencil",
            "generate",
            "--source",
            "views",
            "--class-dir",
            "out",
        ]);
        let args = cli.compile_args();
        assert_eq!(args.source, Some(PathBuf::from("views")));
        assert_eq!(args.class_dir, Some(PathBuf::from("out")));
        assert!(!args.verbose);
    }

    #[test]
    fn test_cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
