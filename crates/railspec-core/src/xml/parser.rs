//! RAIL XML to [`RailSpec`]
//!
//! Copyright (c) 2025 Railspec Team
//! Licensed under the Apache-2.0 license

use crate::error::{SchemaError, SchemaResult};
use crate::format::split_tokens;
use crate::model::{
    check_script_language, check_version, child_path, is_reserved_attribute, Children,
    DataTypeNode, ElementType, Fields, ListItem, OnFailOverride, RailSpec, SchemaElement,
    SchemaTree, ScriptBlock, ON_FAIL_ATTR, ON_FAIL_PREFIX,
};
use roxmltree::{Document, Node};
use tracing::{debug, trace};

/// Attribute on `<input>`/`<output>` that selects a scalar-rooted schema
pub const ROOT_TYPE_ATTR: &str = "type";

/// Parser for RAIL XML documents
#[derive(Debug, Default, Clone, Copy)]
pub struct RailParser;

impl RailParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a complete RAIL document
    pub fn parse(&self, xml: &str) -> SchemaResult<RailSpec> {
        let document = Document::parse(xml).map_err(|e| SchemaError::MalformedXml {
            message: e.to_string(),
        })?;
        let rail = document.root_element();
        if rail.tag_name().name() != "rail" {
            return Err(SchemaError::MalformedXml {
                message: format!(
                    "expected a <rail> root element, found <{}>",
                    rail.tag_name().name()
                ),
            });
        }

        let version = rail.attribute("version");
        check_version(version)?;

        let input_schema = find_child(rail, "input")
            .map(|input| self.parse_schema(input, "$input"))
            .transpose()?;
        let output_schema = find_child(rail, "output")
            .map(|output| self.parse_schema(output, "$output"))
            .transpose()?;

        let instructions = find_child(rail, "instructions").map(text_of);
        let prompt = find_child(rail, "prompt")
            .map(text_of)
            .ok_or(SchemaError::MissingPrompt)?;

        let script = find_child(rail, "script")
            .map(|script| {
                let language = script.attribute("language").unwrap_or_default();
                check_script_language(language)?;
                Ok::<_, SchemaError>(ScriptBlock {
                    language: language.to_string(),
                    source: text_of(script),
                })
            })
            .transpose()?;

        debug!(
            has_input = input_schema.is_some(),
            has_output = output_schema.is_some(),
            has_script = script.is_some(),
            "Parsed RAIL document"
        );

        Ok(RailSpec {
            input_schema,
            output_schema,
            prompt,
            instructions,
            script,
            version: version.unwrap_or_default().to_string(),
        })
    }

    /// Parse an `<input>` or `<output>` element
    pub fn parse_schema(&self, root: Node<'_, '_>, path: &str) -> SchemaResult<SchemaTree> {
        match root.attribute(ROOT_TYPE_ATTR) {
            Some(tag) => {
                let element_type = ElementType::from(tag);
                let attrs = root
                    .attributes()
                    .filter(|a| a.name() != ROOT_TYPE_ATTR)
                    .map(|a| (a.name(), a.value()));
                let node = self.build_node(element_type, attrs, root, path)?;
                Ok(SchemaTree::Scalar(node))
            }
            None => {
                let fields = self.parse_fields(child_elements(root), path)?;
                Ok(SchemaTree::Object(fields))
            }
        }
    }

    /// Parse one schema element and its descendants
    pub fn parse_node(&self, elem: Node<'_, '_>, path: &str) -> SchemaResult<DataTypeNode> {
        let element_type = ElementType::from(elem.tag_name().name());
        let attrs = elem.attributes().map(|a| (a.name(), a.value()));
        self.build_node(element_type, attrs, elem, path)
    }

    fn build_node<'a, I>(
        &self,
        element_type: ElementType,
        attrs: I,
        elem: Node<'_, '_>,
        path: &str,
    ) -> SchemaResult<DataTypeNode>
    where
        I: Iterator<Item = (&'a str, &'a str)>,
    {
        let mut node = DataTypeNode::new(SchemaElement::new(element_type));
        for (key, value) in attrs {
            self.apply_attribute(&mut node, key, value, path)?;
        }
        node.children = self.parse_children(&node.element.element_type, elem, path)?;
        trace!(path, element_type = %node.element_type(), "Parsed node");
        Ok(node)
    }

    fn apply_attribute(
        &self,
        node: &mut DataTypeNode,
        key: &str,
        value: &str,
        path: &str,
    ) -> SchemaResult<()> {
        let element = &mut node.element;
        match key {
            "name" => element.name = Some(value.to_string()),
            "description" => element.description = Some(value.to_string()),
            "strict" if value == "true" || value == "false" => {
                element.strict = Some(value == "true");
            }
            "date-format" => element.date_format = Some(value.to_string()),
            "time-format" => element.time_format = Some(value.to_string()),
            "model" => element.model = Some(value.to_string()),
            "format" => node.formatters = split_tokens(value, path)?,
            "plugins" => node.plugins = Some(split_tokens(value, path)?),
            ON_FAIL_ATTR => element.on_fail = Some(value.to_string()),
            tag if tag.len() > ON_FAIL_PREFIX.len() && tag.starts_with(ON_FAIL_PREFIX) => {
                element.on_fails.push(OnFailOverride::new(tag, value));
            }
            other if is_reserved_attribute(other, value) => {
                return Err(SchemaError::invalid_field(
                    path,
                    format!("no '{}' attribute on <{}>", other, element.element_type),
                ));
            }
            other => {
                element.attributes.insert(other.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    fn parse_children(
        &self,
        element_type: &ElementType,
        elem: Node<'_, '_>,
        path: &str,
    ) -> SchemaResult<Option<Children>> {
        let children: Vec<Node<'_, '_>> = child_elements(elem).collect();

        if element_type.is_list() {
            let item_path = child_path(path, crate::model::LIST_ITEM_KEY);
            let item = match children.as_slice() {
                [] => return Ok(None),
                [only] if is_bare_object(*only) => {
                    ListItem::Fields(self.parse_fields(child_elements(*only), &item_path)?)
                }
                [only] => ListItem::Node(Box::new(self.parse_node(*only, &item_path)?)),
                several => {
                    ListItem::Fields(self.parse_fields(several.iter().copied(), &item_path)?)
                }
            };
            return Ok(Some(Children::List(item)));
        }

        if children.is_empty() && *element_type != ElementType::Object {
            return Ok(None);
        }
        let fields = self.parse_fields(children.into_iter(), path)?;
        Ok(Some(Children::Object(fields)))
    }

    fn parse_fields<'a, 'input: 'a, I>(&self, elems: I, path: &str) -> SchemaResult<Fields>
    where
        I: Iterator<Item = Node<'a, 'input>>,
    {
        let mut fields = Fields::new();
        for elem in elems {
            let name = elem.attribute("name").ok_or_else(|| {
                SchemaError::invalid_field(
                    path,
                    format!("a name attribute on <{}>", elem.tag_name().name()),
                )
            })?;
            let field_path = child_path(path, name);
            if fields.contains_key(name) {
                return Err(SchemaError::invalid_field(
                    field_path,
                    format!("a unique field name, '{}' appears twice", name),
                ));
            }
            let node = self.parse_node(elem, &field_path)?;
            fields.insert(name.to_string(), node);
        }
        Ok(fields)
    }
}

/// Parse a RAIL document with the default parser
pub fn parse_rail(xml: &str) -> SchemaResult<RailSpec> {
    RailParser::new().parse(xml)
}

fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

fn child_elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// An `<object>` with no attributes is the implicit wrapper of list fields
fn is_bare_object(node: Node<'_, '_>) -> bool {
    node.tag_name().name() == ElementType::Object.as_str() && node.attributes().next().is_none()
}

/// Concatenated text content of an element
fn text_of(node: Node<'_, '_>) -> String {
    node.children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_end_to_end_example() {
        let xml = r#"<rail version="0.1"><output><string name="greeting" on-fail-length="reask"/></output><prompt>Say hi</prompt></rail>"#;
        let spec = parse_rail(xml).unwrap();

        assert_eq!(spec.prompt, "Say hi");
        assert_eq!(spec.version, "0.1");
        assert!(spec.input_schema.is_none());
        let output = spec.output_schema.as_ref().unwrap();
        let greeting = output.field("greeting").unwrap();
        assert_eq!(greeting.element_type(), &ElementType::String);
        assert_eq!(
            greeting.element.on_fails,
            vec![OnFailOverride::new("on-fail-length", "reask")]
        );
        assert_eq!(greeting.element.on_fail, None);
    }

    #[test]
    fn test_attributes_map_onto_element() {
        let xml = r#"<rail version="0.1">
            <output>
                <date name="due" description="Due date" date-format="%Y-%m-%d" strict="true"
                      on-fail="fix" format="future; weekday" plugins="acme-validators" x-owner="ops"/>
                <string name="mode" strict="maybe"/>
            </output>
            <prompt>Plan</prompt>
        </rail>"#;
        let spec = parse_rail(xml).unwrap();
        let output = spec.output_schema.unwrap();

        let due = output.field("due").unwrap();
        assert_eq!(due.element.description.as_deref(), Some("Due date"));
        assert_eq!(due.element.date_format.as_deref(), Some("%Y-%m-%d"));
        assert_eq!(due.element.strict, Some(true));
        assert_eq!(due.element.on_fail.as_deref(), Some("fix"));
        assert_eq!(due.formatters, vec!["future", "weekday"]);
        assert_eq!(due.plugins(), ["acme-validators".to_string()]);
        assert_eq!(due.element.attributes.get("x-owner").map(String::as_str), Some("ops"));

        let mode = output.field("mode").unwrap();
        assert_eq!(mode.element.strict, None);
        assert_eq!(mode.element.attributes.get("strict").map(String::as_str), Some("maybe"));
    }

    #[test]
    fn test_list_with_wrapped_fields() {
        let xml = r#"<rail version="0.1"><output>
            <list name="people">
                <object>
                    <string name="name"/>
                    <integer name="age" format="valid-range: 0 150"/>
                </object>
            </list>
        </output><prompt>p</prompt></rail>"#;
        let spec = parse_rail(xml).unwrap();
        let people = spec.output_schema.as_ref().unwrap().field("people").unwrap();

        match &people.children {
            Some(Children::List(ListItem::Fields(fields))) => {
                let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
                assert_eq!(keys, vec!["name", "age"]);
                assert_eq!(fields["age"].formatters, vec!["valid-range: 0 150"]);
            }
            other => panic!("expected list of fields, got {other:?}"),
        }
    }

    #[test]
    fn test_list_with_direct_fields_and_scalar_item() {
        let xml = r#"<rail version="0.1"><output>
            <list name="pairs"><string name="a"/><string name="b"/></list>
            <list name="tags"><string format="lower-case"/></list>
            <list name="records"><object description="row"><string name="id"/></object></list>
        </output><prompt>p</prompt></rail>"#;
        let output = parse_rail(xml).unwrap().output_schema.unwrap();

        assert!(matches!(
            output.field("pairs").unwrap().children,
            Some(Children::List(ListItem::Fields(ref f))) if f.len() == 2
        ));
        match &output.field("tags").unwrap().children {
            Some(Children::List(ListItem::Node(item))) => {
                assert_eq!(item.element_type(), &ElementType::String);
                assert_eq!(item.formatters, vec!["lower-case"]);
            }
            other => panic!("unexpected children {other:?}"),
        }
        match &output.field("records").unwrap().children {
            Some(Children::List(ListItem::Node(item))) => {
                assert_eq!(item.element.description.as_deref(), Some("row"));
            }
            other => panic!("unexpected children {other:?}"),
        }
    }

    #[test]
    fn test_scalar_root_and_text_blocks() {
        let xml = r#"<rail version="0.1">
            <output type="string" format="two-words" on-fail-two-words="fix"/>
            <instructions>You are terse.</instructions>
            <prompt>Name a &lt;color&gt; for ${thing}</prompt>
            <script language="python">def f():
    return 1 &lt; 2</script>
        </rail>"#;
        let spec = parse_rail(xml).unwrap();
        match spec.output_schema.unwrap() {
            SchemaTree::Scalar(node) => {
                assert_eq!(node.element_type(), &ElementType::String);
                assert_eq!(node.formatters, vec!["two-words"]);
                assert!(node.element.attributes.is_empty());
            }
            other => panic!("expected scalar root, got {other:?}"),
        }
        assert_eq!(spec.instructions.as_deref(), Some("You are terse."));
        assert_eq!(spec.prompt, "Name a <color> for ${thing}");
        let script = spec.script.unwrap();
        assert_eq!(script.language, "python");
        assert_eq!(script.source, "def f():\n    return 1 < 2");
    }

    #[test]
    fn test_rejections() {
        let err = parse_rail(r#"<rail version="0.2"><prompt>p</prompt></rail>"#).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::UnsupportedVersion);

        let err = parse_rail(r#"<rail><prompt>p</prompt></rail>"#).unwrap_err();
        assert_eq!(err, SchemaError::UnsupportedVersion { found: None });

        let err = parse_rail(r#"<rail version="0.1"><output/></rail>"#).unwrap_err();
        assert_eq!(err, SchemaError::MissingPrompt);

        let err = parse_rail(
            r#"<rail version="0.1"><prompt>p</prompt><script language="javascript">x</script></rail>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::UnsupportedScriptLanguage);

        let err = parse_rail(r#"<rail version="0.1"><prompt>p</prompt>"#).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::MalformedXml);

        let err = parse_rail(r#"<guard version="0.1"/>"#).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::MalformedXml);
    }

    #[test]
    fn test_structural_rejections() {
        let err = parse_rail(
            r#"<rail version="0.1"><output><string/></output><prompt>p</prompt></rail>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::InvalidField);

        let err = parse_rail(
            r#"<rail version="0.1"><output><string name="a"/><bool name="a"/></output><prompt>p</prompt></rail>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::InvalidField);

        let err = parse_rail(
            r#"<rail version="0.1"><output><string name="a" format="choice: {x"/></output><prompt>p</prompt></rail>"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::MalformedFormatString {
                token: "choice: {x".to_string(),
                path: "$output.a".to_string(),
            }
        );

        let err = parse_rail(
            r#"<rail version="0.1"><output><string name="a" type="x"/></output><prompt>p</prompt></rail>"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::invalid_field("$output.a", "no 'type' attribute on <string>")
        );
    }
}
