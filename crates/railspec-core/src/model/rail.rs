//! The aggregate RAIL specification
//!
//! Copyright (c) 2025 Railspec Team
//! Licensed under the Apache-2.0 license

use super::tree::SchemaTree;
use crate::error::{SchemaError, SchemaResult};
use std::collections::HashSet;

/// The only RAIL version this crate reads and writes
pub const RAIL_VERSION: &str = "0.1";

/// The only script language accepted in `<script>`
pub const SCRIPT_LANGUAGE: &str = "python";

/// A `<script>` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBlock {
    pub language: String,
    pub source: String,
}

impl ScriptBlock {
    /// Create a script block, rejecting languages other than python
    pub fn new<L: Into<String>, S: Into<String>>(language: L, source: S) -> SchemaResult<Self> {
        let language = language.into();
        check_script_language(&language)?;
        Ok(Self {
            language,
            source: source.into(),
        })
    }

    /// Create a python script block
    pub fn python<S: Into<String>>(source: S) -> Self {
        Self {
            language: SCRIPT_LANGUAGE.to_string(),
            source: source.into(),
        }
    }
}

/// A complete RAIL specification
///
/// Built once per transcoding operation and never mutated afterwards; a cached
/// spec may be read by several requests at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RailSpec {
    pub input_schema: Option<SchemaTree>,
    pub output_schema: Option<SchemaTree>,
    pub prompt: String,
    pub instructions: Option<String>,
    pub script: Option<ScriptBlock>,
    pub version: String,
}

impl RailSpec {
    /// Create a spec with only a prompt
    pub fn new<P: Into<String>>(prompt: P) -> Self {
        Self {
            input_schema: None,
            output_schema: None,
            prompt: prompt.into(),
            instructions: None,
            script: None,
            version: RAIL_VERSION.to_string(),
        }
    }

    pub fn with_output(mut self, schema: SchemaTree) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn with_input(mut self, schema: SchemaTree) -> Self {
        self.input_schema = Some(schema);
        self
    }

    pub fn with_instructions<I: Into<String>>(mut self, instructions: I) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_script(mut self, script: ScriptBlock) -> Self {
        self.script = Some(script);
        self
    }

    /// Every plugin namespace referenced by any node, deduplicated in
    /// first-seen order (input schema before output schema)
    pub fn all_plugins(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut plugins = Vec::new();
        for tree in self.schemas() {
            tree.walk(&mut |_, node| {
                for plugin in node.plugins() {
                    if seen.insert(plugin.clone()) {
                        plugins.push(plugin.clone());
                    }
                }
            });
        }
        plugins
    }

    /// Input and output schemas that are present
    pub fn schemas(&self) -> impl Iterator<Item = &SchemaTree> {
        self.input_schema.iter().chain(self.output_schema.iter())
    }
}

/// Reject any version other than `0.1`
pub fn check_version(version: Option<&str>) -> SchemaResult<()> {
    match version {
        Some(RAIL_VERSION) => Ok(()),
        other => Err(SchemaError::UnsupportedVersion {
            found: other.map(str::to_string),
        }),
    }
}

/// Reject any script language other than python
pub fn check_script_language(language: &str) -> SchemaResult<()> {
    if language == SCRIPT_LANGUAGE {
        Ok(())
    } else {
        Err(SchemaError::UnsupportedScriptLanguage {
            language: language.to_string(),
        })
    }
}
