//! Railspec CLI - Command-line interface for RAIL schema documents
//!
//! This is the main entry point for the Railspec CLI application, providing
//! commands for validating RAIL documents, converting them between XML and
//! the two JSON forms, and preparing the plugins they reference.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    // Loaded before logging so the file's logging section can apply
    let config = Config::load_with_file(cli.config.as_deref());

    let use_color = cli.use_color() && config.as_ref().map_or(true, |c| c.output.color);
    control::set_override(use_color);

    if let Err(e) = init_logging(&cli, config.as_ref().ok()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match config.and_then(|config| run(cli, config)) {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli, config), fields(command = ?cli.command))]
fn run(cli: Cli, config: Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let use_color = cli.use_color() && config.output.color;
    let format = cli.output_format(&config.output.format)?;
    let mut output = OutputWriter::new(format, use_color, cli.quiet, cli.verbosity_level());

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Validate(args) => handlers::handle_validate(args, &config, &mut output),
        Commands::Convert(args) => handlers::handle_convert(args, &config, &mut output),
        Commands::Plugins(args) => handlers::handle_plugins(args, &config, &mut output),
        Commands::Config(args) => handlers::handle_config(args, &config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: Option<&Config>) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());

    // An explicit -v wins over the config file
    if let (0, Some(config)) = (cli.verbosity_level(), config) {
        logging_config.apply_settings(&config.logging);
    }
    logging_config.merge_with_env();

    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["railspec", "-vv", "validate", "greeting.rail"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["railspec", "--quiet", "validate", "greeting.rail"]);
        assert_eq!(cli.verbosity_level(), 0);

        let cli = Cli::parse_from(["railspec", "convert", "greeting.rail", "--to", "wire"]);
        assert!(matches!(cli.command, Commands::Convert(_)));
    }
}
