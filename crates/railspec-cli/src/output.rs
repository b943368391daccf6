//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), with dedicated
//! layouts for validation reports and plugin preparation results.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::handlers::ValidationReport;
use colored::Colorize;
use railspec_core::{PluginReport, PluginStatus};
use serde::Serialize;
use std::io::{self, Write};
use tracing::{debug, trace};

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format the result of validating a document
    fn format_validation_report(&self, report: &ValidationReport) -> Result<String>;

    /// Format the outcome of plugin preparation
    fn format_plugin_report(&self, report: &PluginReport) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // For human format, use pretty JSON as fallback
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_validation_report(&self, report: &ValidationReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_validation_report_human(report)),
            _ => self.format(report),
        }
    }

    fn format_plugin_report(&self, report: &PluginReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_plugin_report_human(report)),
            _ => self.format(report),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    verbose: u8,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, verbose: u8) -> Self {
        Self::with_writer(format, use_color, quiet, verbose, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        verbose: u8,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            verbose,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message (human format, verbose only)
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || self.verbose == 0 || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.red().to_string())
        } else {
            self.writeln(&format!("ERROR: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "Outputting data");
        self.writeln(formatted.trim_end())
    }

    /// Write a validation report, with a node table when it has one
    pub fn validation_report(&mut self, report: &ValidationReport) -> Result<()> {
        if !self.is_human() {
            return self.data(report);
        }
        if self.quiet {
            return Ok(());
        }

        self.success("✓ RAIL document is valid")?;
        let formatted = self.format.format_validation_report(report)?;
        self.write(&formatted)?;

        if !report.nodes.is_empty() {
            self.section("Nodes")?;
            let rows = report
                .nodes
                .iter()
                .map(|node| {
                    vec![
                        node.path.clone(),
                        node.type_tag.clone(),
                        node.formatters.join("; "),
                        node.plugins.join(", "),
                    ]
                })
                .collect();
            self.table(&["Path", "Type", "Format", "Plugins"], rows)?;
        }
        Ok(())
    }

    /// Write the plugin namespaces a document references
    pub fn plugin_list(&mut self, namespaces: &[String]) -> Result<()> {
        if !self.is_human() {
            return self.data(&namespaces);
        }
        if self.quiet {
            return Ok(());
        }
        if namespaces.is_empty() {
            return self.writeln("No plugins referenced");
        }
        for namespace in namespaces {
            self.writeln(&format!("• {}", namespace))?;
        }
        Ok(())
    }

    /// Write a plugin preparation report
    pub fn plugin_report(&mut self, report: &PluginReport) -> Result<()> {
        if !self.is_human() {
            return self.data(report);
        }
        let formatted = self.format.format_plugin_report(report)?;
        if report.is_complete() {
            if self.quiet {
                return Ok(());
            }
            self.write(&formatted)
        } else if self.use_color {
            self.write(&formatted.red().to_string())
        } else {
            self.write(&formatted)
        }
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        // Calculate column widths
        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(header_row.trim_end().bold().to_string().as_str())?;
        } else {
            self.writeln(header_row.trim_end())?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| match widths.get(i) {
                    Some(width) => format!("{:width$}", cell, width = *width),
                    None => cell.clone(),
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }
}

/// Format a validation report for human reading
fn format_validation_report_human(report: &ValidationReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("  File:          {} ({})\n", report.file, report.format));
    output.push_str(&format!("  Version:       {}\n", report.version));
    if let Some(input) = &report.input {
        output.push_str(&format!(
            "  Input schema:  {}, {} node(s)\n",
            input.root, input.node_count
        ));
    }
    if let Some(schema) = &report.output {
        output.push_str(&format!(
            "  Output schema: {}, {} node(s)\n",
            schema.root, schema.node_count
        ));
    }
    output.push_str(&format!(
        "  Instructions:  {}\n",
        if report.has_instructions { "yes" } else { "no" }
    ));
    if let Some(language) = &report.script_language {
        output.push_str(&format!("  Script:        {}\n", language));
    }
    if !report.plugins.is_empty() {
        output.push_str(&format!("  Plugins:       {}\n", report.plugins.join(", ")));
    }
    if let Some(bound) = report.bound_nodes {
        output.push_str(&format!("  Type check:    {} node(s) bound\n", bound));
    }

    output
}

/// Format a plugin report for human reading
fn format_plugin_report_human(report: &PluginReport) -> String {
    if report.is_empty() {
        return "No plugins referenced\n".to_string();
    }

    let mut output = String::new();
    for outcome in &report.outcomes {
        let line = match &outcome.status {
            PluginStatus::Installed => format!("✓ {} installed", outcome.namespace),
            PluginStatus::AlreadyPresent => format!("✓ {} already present", outcome.namespace),
            PluginStatus::Failed(reason) => format!("✗ {} failed: {}", outcome.namespace, reason),
        };
        output.push_str(&line);
        output.push('\n');
    }
    output
}
