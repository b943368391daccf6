//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigShowArgs, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use serde::Serialize;

/// One searched configuration location
#[derive(Debug, Serialize)]
struct ConfigPath {
    path: String,
    exists: bool,
}

/// Handle the config command
pub fn handle_config(args: ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
        ConfigAction::Paths => handle_config_paths(output),
    }
}

/// Print the effective configuration
fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let rendered = match args.format {
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
    };
    output.writeln(rendered.trim_end())
}

/// List the configuration search path
fn handle_config_paths(output: &mut OutputWriter) -> Result<()> {
    let paths: Vec<ConfigPath> = Config::default_config_paths()
        .into_iter()
        .map(|path| ConfigPath {
            exists: path.exists(),
            path: path.display().to_string(),
        })
        .collect();

    if output.format() != OutputFormat::Human {
        return output.data(&paths);
    }

    let rows = paths
        .iter()
        .map(|p| {
            vec![
                p.path.clone(),
                if p.exists { "found" } else { "-" }.to_string(),
            ]
        })
        .collect();
    output.table(&["Path", "Status"], rows)
}
