//! Plugins command handler
//!
//! Installation runs the configured `plugins.install_command` once per
//! namespace through the platform shell.

use super::utils::load_spec;
use crate::cli::PluginsArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use anyhow::{bail, Context};
use railspec_core::{prepare_plugins, PluginInstaller};
use std::process::{Command, Stdio};
use tracing::{debug, instrument};

/// Placeholder replaced by the namespace in the install command
pub const NAMESPACE_PLACEHOLDER: &str = "{namespace}";

/// Runs a shell command template for each namespace
pub struct CommandInstaller<'a> {
    template: Option<&'a str>,
}

impl<'a> CommandInstaller<'a> {
    pub fn new(template: Option<&'a str>) -> Self {
        Self { template }
    }
}

impl PluginInstaller for CommandInstaller<'_> {
    fn install(&self, namespace: &str) -> anyhow::Result<()> {
        let Some(template) = self.template else {
            bail!("plugins.install_command is not configured");
        };
        // Namespaces are interpolated into a shell command
        if !is_safe_namespace(namespace) {
            bail!("refusing to install namespace with unexpected characters");
        }

        let command = template.replace(NAMESPACE_PLACEHOLDER, namespace);
        debug!(command = %command, "Running plugin install command");
        let result = shell(&command)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to run '{}'", command))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            bail!("'{}' exited with {}: {}", command, result.status, stderr.trim());
        }
        Ok(())
    }
}

fn is_safe_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | '@' | ':'))
}

fn shell(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}

/// Handle the plugins command
#[instrument(skip(config, output), fields(file = %args.file.display()))]
pub fn handle_plugins(args: PluginsArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("plugins_command", &args.file.display().to_string());
    let (spec, _) = load_spec(&args.file, args.from)?;

    if !args.install {
        return output.plugin_list(&spec.all_plugins());
    }

    let installer = CommandInstaller::new(config.plugins.install_command.as_deref());
    let report = prepare_plugins(&spec, &installer, &config.plugins.preinstalled);
    output.plugin_report(&report)?;

    match report.failures().count() {
        0 => Ok(()),
        count => {
            output.error(&format!("✗ {} of {} plugin namespace(s) failed", count, report.len()))?;
            Err(Error::PluginsFailed { count })
        }
    }
}
