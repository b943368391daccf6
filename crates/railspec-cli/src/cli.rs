//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use crate::error::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Railspec CLI - validate and convert RAIL schema documents
///
/// Reads a RAIL document as XML, persisted JSON or wire JSON, checks it,
/// and writes it back out in any of those forms.
#[derive(Parser, Debug)]
#[command(
    name = "railspec",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "RAILSPEC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for reports (defaults to `output.format` from the config file)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that a RAIL document parses and every node is well formed
    Validate(ValidateArgs),

    /// Convert a RAIL document between XML, persisted JSON and wire JSON
    Convert(ConvertArgs),

    /// List the plugin namespaces a document needs, optionally installing them
    Plugins(PluginsArgs),

    /// Inspect configuration
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the RAIL document (.rail/.xml, .json, .yaml)
    #[arg(value_name = "RAIL_FILE")]
    pub file: PathBuf,

    /// Representation of the input (detected from extension and content by default)
    #[arg(long, value_enum, default_value = "auto")]
    pub from: SourceFormat,

    /// Also bind every node against the built-in type tags
    #[arg(long)]
    pub check_types: bool,

    /// Print every node path with its type and formatters
    #[arg(long)]
    pub detailed: bool,
}

/// Arguments for the convert command
#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Path to the RAIL document (.rail/.xml, .json, .yaml)
    #[arg(value_name = "RAIL_FILE")]
    pub file: PathBuf,

    /// Representation of the input
    #[arg(long, value_enum, default_value = "auto")]
    pub from: SourceFormat,

    /// Representation to write (defaults to `convert.default_target` from config)
    #[arg(short, long, value_enum)]
    pub to: Option<TargetFormat>,

    /// Write everything on one line
    #[arg(long)]
    pub compact: bool,

    /// Output file path (stdout if not specified)
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the plugins command
#[derive(Parser, Debug)]
pub struct PluginsArgs {
    /// Path to the RAIL document
    #[arg(value_name = "RAIL_FILE")]
    pub file: PathBuf,

    /// Representation of the input
    #[arg(long, value_enum, default_value = "auto")]
    pub from: SourceFormat,

    /// Run `plugins.install_command` for every namespace not listed as preinstalled
    #[arg(long)]
    pub install: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show(ConfigShowArgs),

    /// List the locations searched for a configuration file
    Paths,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Representation of a document being read
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceFormat {
    /// Detect from extension and content
    Auto,
    /// RAIL XML
    Xml,
    /// Persisted snake_case JSON (or YAML)
    Dict,
    /// API camelCase JSON (or YAML)
    Wire,
}

/// Representation of a document being written
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TargetFormat {
    /// RAIL XML
    Xml,
    /// Persisted snake_case JSON
    Dict,
    /// API camelCase JSON
    Wire,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// The `--output` flag, falling back to the configured format
    pub fn output_format(&self, configured: &str) -> Result<OutputFormat> {
        match self.output {
            Some(format) => Ok(format),
            None => OutputFormat::from_config(configured).ok_or_else(|| {
                Error::config(format!(
                    "output.format must be human, json, yaml or json-pretty, found '{}'",
                    configured
                ))
            }),
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl SourceFormat {
    pub fn name(self) -> &'static str {
        match self {
            SourceFormat::Auto => "auto",
            SourceFormat::Xml => "xml",
            SourceFormat::Dict => "dict",
            SourceFormat::Wire => "wire",
        }
    }
}

impl OutputFormat {
    /// Parse an `output.format` config value
    pub fn from_config(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value, true).ok()
    }
}

impl TargetFormat {
    /// Parse a `convert.default_target` config value
    pub fn from_config(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value, true).ok()
    }

    pub fn name(self) -> &'static str {
        match self {
            TargetFormat::Xml => "xml",
            TargetFormat::Dict => "dict",
            TargetFormat::Wire => "wire",
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
