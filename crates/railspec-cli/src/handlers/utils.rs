//! Shared utilities for command handlers

use crate::cli::{SourceFormat, TargetFormat};
use crate::error::{Error, Result};
use railspec_core::{DictCodec, RailParser, RailSerializer, RailSpec, WireCodec};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Wire-only top-level keys
const WIRE_KEYS: [&str; 2] = ["inputSchema", "outputSchema"];

/// Read a RAIL document in any representation
///
/// Returns the spec together with the representation it was read from.
pub fn load_spec(path: &Path, from: SourceFormat) -> Result<(RailSpec, SourceFormat)> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = content.len(), "Read RAIL document");

    let format = match from {
        SourceFormat::Auto if looks_like_xml(path, &content) => SourceFormat::Xml,
        SourceFormat::Auto => {
            let value = parse_structured(path, &content)?;
            let format = detect_dialect(&value);
            debug!(format = ?format, "Detected JSON dialect");
            return Ok((decode_value(&value, format)?, format));
        }
        explicit => explicit,
    };

    let spec = match format {
        SourceFormat::Xml => RailParser::new().parse(&content)?,
        other => decode_value(&parse_structured(path, &content)?, other)?,
    };
    Ok((spec, format))
}

/// Write a spec in the requested representation
pub fn render_spec(spec: &RailSpec, target: TargetFormat, pretty: bool) -> Result<String> {
    let rendered = match target {
        TargetFormat::Xml if pretty => RailSerializer::new().serialize(spec),
        TargetFormat::Xml => RailSerializer::compact().serialize(spec),
        TargetFormat::Dict => DictCodec::new().to_json_string(spec, pretty)?,
        TargetFormat::Wire => WireCodec::new().to_json_string(spec, pretty)?,
    };
    Ok(rendered)
}

/// Wire documents are recognised by their camelCase schema keys
pub fn detect_dialect(value: &Value) -> SourceFormat {
    match value.as_object() {
        Some(map) if WIRE_KEYS.iter().any(|key| map.contains_key(*key)) => SourceFormat::Wire,
        _ => SourceFormat::Dict,
    }
}

fn looks_like_xml(path: &Path, content: &str) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("rail") | Some("xml")
    ) || content.trim_start().starts_with('<')
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Parse JSON, or YAML by extension, into a JSON value
fn parse_structured(path: &Path, content: &str) -> Result<Value> {
    if is_yaml(path) {
        serde_yaml::from_str(content).map_err(|_| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "YAML".to_string(),
        })
    } else {
        serde_json::from_str(content).map_err(|_| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "JSON".to_string(),
        })
    }
}

fn decode_value(value: &Value, format: SourceFormat) -> Result<RailSpec> {
    let spec = match format {
        SourceFormat::Wire => WireCodec::new().from_request(value)?,
        _ => DictCodec::new().from_dict(value)?,
    };
    Ok(spec)
}
