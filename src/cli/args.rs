//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::FeedFormat;

/// Assemble a feed of dated artifacts from an object store
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, default_value = "kittenfeed.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the feed document
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },

    /// Show which store keys become feed items
    #[command(visible_alias = "k")]
    Keys {
        #[command(flatten)]
        args: KeysArgs,
    },
}

/// Build command arguments. Each one overrides its config field.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Store directory holding the artifacts
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub store: Option<PathBuf>,

    /// Output file for the feed document
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Feed format
    #[arg(short, long, value_enum)]
    pub format: Option<FeedFormat>,

    /// Minify the XML output
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Only include artifacts from the last N days (0 for all)
    #[arg(short, long)]
    pub lookback_days: Option<u32>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

/// Keys command arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct KeysArgs {
    /// Store directory holding the artifacts
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub store: Option<PathBuf>,

    /// Only list keys from the last N days (0 for all)
    #[arg(short, long)]
    pub lookback_days: Option<u32>,

    /// Also print rejected keys
    #[arg(short, long)]
    pub all: bool,
}

impl Cli {
    pub fn is_verbose(&self) -> bool {
        match &self.command {
            Commands::Build { args } => args.verbose,
            Commands::Keys { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_overrides() {
        let cli = Cli::try_parse_from([
            "kittenfeed",
            "-C",
            "custom.toml",
            "build",
            "--store",
            "art",
            "--format",
            "atom",
            "--minify",
            "--lookback-days",
            "7",
            "-V",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert!(cli.is_verbose());
        let Commands::Build { args } = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.store, Some(PathBuf::from("art")));
        assert_eq!(args.format, Some(FeedFormat::Atom));
        assert_eq!(args.minify, Some(true));
        assert_eq!(args.lookback_days, Some(7));
        assert_eq!(args.output, None);
    }

    #[test]
    fn test_parse_keys_alias() {
        let cli = Cli::try_parse_from(["kittenfeed", "k", "--all"]).unwrap();
        assert!(matches!(cli.command, Commands::Keys { args } if args.all));
    }
}
