//! Convert command handler

use super::utils::{load_spec, render_spec};
use crate::cli::{ConvertArgs, TargetFormat};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use std::fs;
use tracing::{info, instrument};

/// Handle the convert command
#[instrument(skip(config, output), fields(file = %args.file.display()))]
pub fn handle_convert(args: ConvertArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("convert_command", &args.file.display().to_string());

    if args.save_to.as_deref() == Some(args.file.as_path()) {
        return Err(Error::invalid_args(format!(
            "--save-to would overwrite the input file {}",
            args.file.display()
        )));
    }

    let target = match args.to {
        Some(target) => target,
        None => TargetFormat::from_config(&config.convert.default_target).ok_or_else(|| {
            Error::config(format!(
                "convert.default_target must be xml, dict or wire, found '{}'",
                config.convert.default_target
            ))
        })?,
    };

    let (spec, source) = load_spec(&args.file, args.from)?;
    // Stdout carries the document unless saving
    if source.name() == target.name() && args.save_to.is_some() {
        output.warning(&format!(
            "Source and target are both {}; the document is re-serialized in normal form",
            target.name()
        ))?;
    }
    let pretty = config.output.pretty && !args.compact;
    let rendered = render_spec(&spec, target, pretty)?;

    info!(
        from = source.name(),
        to = target.name(),
        bytes = rendered.len(),
        "Converted RAIL document"
    );

    match &args.save_to {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, format!("{}\n", rendered))?;
            output.success(&format!(
                "✓ Converted {} ({}) to {} ({})",
                args.file.display(),
                source.name(),
                path.display(),
                target.name()
            ))
        }
        None => output.writeln(&rendered),
    }
}
