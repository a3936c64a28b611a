//! kittenfeed - build a feed of daily artifacts.

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};

use kittenfeed::cli::{self, Cli, Commands};
use kittenfeed::config::FeedToolConfig;
use kittenfeed::core::{CancelToken, setup_shutdown_handler};
use kittenfeed::logger::Logger;

fn main() -> Result<()> {
    // Cancels every in-flight task of the current command on Ctrl+C
    let token = CancelToken::new();
    setup_shutdown_handler(token.clone())?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let logger = Logger::stdout(cli.is_verbose());
    let cwd = std::env::current_dir().context("Failed to get current working directory")?;
    let mut config = FeedToolConfig::load(&cli.config, &cwd, &logger)?;

    match &cli.command {
        Commands::Build { args } => {
            config.apply_build_args(args);
            config.validate()?;
            cli::build::build_feed(&config, &logger, &token).map(|_| ())
        }
        Commands::Keys { args } => {
            config.apply_keys_args(args);
            config.validate()?;
            cli::keys::list_keys(&config, args.all, &logger, &token).map(|_| ())
        }
    }
}
