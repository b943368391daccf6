//! Validation command handler and the built-in type check

use super::utils::load_spec;
use crate::cli::{SourceFormat, ValidateArgs};
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use indexmap::IndexMap;
use railspec_core::format::split_tokens;
use railspec_core::{
    BoundSchema, ConstructArgs, ElementType, FormatSpec, RailSpec, Registry, RuntimeBinder,
    RuntimeObject, SchemaTree, ValidatorAttributeParser,
};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Type tags the type check accepts
const BUILTIN_TYPES: [ElementType; 15] = [
    ElementType::String,
    ElementType::Integer,
    ElementType::Float,
    ElementType::Bool,
    ElementType::Date,
    ElementType::Time,
    ElementType::Email,
    ElementType::Url,
    ElementType::PythonCode,
    ElementType::Sql,
    ElementType::Percentage,
    ElementType::Choice,
    ElementType::Case,
    ElementType::List,
    ElementType::Object,
];

/// Result of validating one document
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub file: String,
    pub format: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<SchemaSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<SchemaSummary>,
    pub has_instructions: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_language: Option<String>,
    pub plugins: Vec<String>,
    /// Nodes bound by the type check, when it ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound_nodes: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaSummary {
    /// `scalar` or `object`
    pub root: &'static str,
    pub node_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeSummary {
    pub path: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub formatters: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<String>,
}

impl ValidationReport {
    pub fn new(file: &Path, format: SourceFormat, spec: &RailSpec, detailed: bool) -> Self {
        let mut nodes = Vec::new();
        if detailed {
            for (root, tree) in [("$input", &spec.input_schema), ("$output", &spec.output_schema)] {
                if let Some(tree) = tree {
                    collect_nodes(root, tree, &mut nodes);
                }
            }
        }

        Self {
            file: file.display().to_string(),
            format: format.name().to_string(),
            version: spec.version.clone(),
            input: spec.input_schema.as_ref().map(SchemaSummary::of),
            output: spec.output_schema.as_ref().map(SchemaSummary::of),
            has_instructions: spec.instructions.is_some(),
            script_language: spec.script.as_ref().map(|s| s.language.clone()),
            plugins: spec.all_plugins(),
            bound_nodes: None,
            nodes,
        }
    }
}

impl SchemaSummary {
    fn of(tree: &SchemaTree) -> Self {
        Self {
            root: if tree.is_scalar() { "scalar" } else { "object" },
            node_count: tree.node_count(),
        }
    }
}

fn collect_nodes(root: &str, tree: &SchemaTree, nodes: &mut Vec<NodeSummary>) {
    tree.walk(&mut |path, node| {
        // Tree paths start at `$`
        let path = format!("{}{}", root, path.trim_start_matches('$'));
        nodes.push(NodeSummary {
            path,
            type_tag: node.element_type().to_string(),
            formatters: node.formatters.clone(),
            plugins: node.plugins().to_vec(),
        });
    });
}

/// Engine-neutral stand-in produced by the type check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outline {
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub children: IndexMap<String, Outline>,
}

impl Outline {
    /// This node plus all descendants
    pub fn count(&self) -> usize {
        1 + self.children.values().map(Outline::count).sum::<usize>()
    }
}

impl RuntimeObject for Outline {
    fn set_date_format(&mut self, format: &str) {
        self.date_format = Some(format.to_string());
    }

    fn set_time_format(&mut self, format: &str) {
        self.time_format = Some(format.to_string());
    }
}

/// Splits the joined format string back into validator specs
pub struct TokenParser;

impl ValidatorAttributeParser for TokenParser {
    type Output = Vec<String>;

    fn parse(&self, spec: &FormatSpec<'_>) -> anyhow::Result<Vec<String>> {
        Ok(split_tokens(&spec.format, spec.path)?)
    }
}

fn outline(args: ConstructArgs<'_, Vec<String>, Outline>) -> anyhow::Result<Outline> {
    Ok(Outline {
        type_tag: args.element.element_type.to_string(),
        name: args.element.name.clone(),
        validators: args.validators,
        date_format: None,
        time_format: None,
        children: args.children,
    })
}

/// Registry mapping every built-in type tag to [`Outline`]
pub fn builtin_registry() -> Registry<Vec<String>, Outline> {
    let mut registry = Registry::new();
    for element_type in BUILTIN_TYPES {
        registry.register(element_type, outline);
    }
    registry
}

/// Bind the spec against the built-in types, returning the bound node count
pub fn check_types(spec: &RailSpec) -> Result<usize> {
    let registry = builtin_registry();
    let bound = RuntimeBinder::new(&TokenParser, &registry).bind(spec)?;

    let count: usize = [bound.input, bound.output]
        .iter()
        .flatten()
        .map(|schema| match schema {
            BoundSchema::Scalar(object) => object.count(),
            BoundSchema::Object(fields) => fields.values().map(Outline::count).sum(),
        })
        .sum();
    debug!(bound_nodes = count, "Type check passed");
    Ok(count)
}

/// Handle the validate command
#[instrument(skip(_config, output), fields(file = %args.file.display()))]
pub fn handle_validate(args: ValidateArgs, _config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("validate_command", &args.file.display().to_string());
    output.info(&format!("Validating RAIL document: {}", args.file.display()))?;

    let (spec, format) = load_spec(&args.file, args.from)?;
    let mut report = ValidationReport::new(&args.file, format, &spec, args.detailed);

    if args.check_types {
        let _timer = Timer::new("type_check");
        report.bound_nodes = Some(check_types(&spec)?);
    }

    info!(format = %report.format, plugins = report.plugins.len(), "Document is valid");
    output.validation_report(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use railspec_core::{parse_rail, SchemaErrorKind};

    const PEOPLE: &str = r#"<rail version="0.1">
<output>
  <list name="people"><object><string name="name" format="two-words"/><date name="born" date-format="%Y"/></object></list>
  <widget name="gadget" plugins="acme"/>
</output>
<prompt>p</prompt>
</rail>"#;

    #[test]
    fn test_report_lists_nodes_with_schema_roots() {
        let spec = parse_rail(PEOPLE).unwrap();
        let report = ValidationReport::new(Path::new("people.rail"), SourceFormat::Xml, &spec, true);

        assert_eq!(report.format, "xml");
        assert_eq!(report.plugins, vec!["acme".to_string()]);
        let paths: Vec<&str> = report.nodes.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "$output.people",
                "$output.people.item.name",
                "$output.people.item.born",
                "$output.gadget"
            ]
        );
        assert_eq!(report.output.as_ref().unwrap().node_count, 4);
        assert!(report.input.is_none());
    }

    #[test]
    fn test_type_check_rejects_unknown_tags() {
        let spec = parse_rail(PEOPLE).unwrap();
        let err = check_types(&spec).unwrap_err();
        assert_eq!(err.schema_kind(), Some(SchemaErrorKind::UnknownType));
        assert!(err.to_string().contains("$output.gadget"));
    }

    #[test]
    fn test_type_check_binds_list_items() {
        let spec = parse_rail(
            r#"<rail version="0.1"><output><list name="people"><object><string name="name" format="two-words; lower-case"/><date name="born" date-format="%Y"/></object></list></output><prompt>p</prompt></rail>"#,
        )
        .unwrap();
        // list, implicit object, name, born
        assert_eq!(check_types(&spec).unwrap(), 4);

        let registry = builtin_registry();
        let bound = RuntimeBinder::new(&TokenParser, &registry).bind(&spec).unwrap();
        let Some(BoundSchema::Object(fields)) = bound.output else {
            panic!("expected object root");
        };
        let item = &fields["people"].children["item"];
        assert_eq!(item.type_tag, "object");
        assert_eq!(item.children["name"].validators, vec!["two-words", "lower-case"]);
        assert_eq!(item.children["born"].date_format.as_deref(), Some("%Y"));
    }
}
