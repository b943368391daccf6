//! [`RailSpec`] to RAIL XML

use crate::format::join_tokens;
use crate::model::{
    Children, DataTypeNode, ElementType, Fields, ListItem, RailSpec, SchemaTree, RAIL_VERSION,
};
use super::parser::ROOT_TYPE_ATTR;
use std::fmt::Write;
use tracing::debug;

/// Writer for RAIL XML documents
#[derive(Debug, Clone)]
pub struct RailSerializer {
    indent: String,
    pretty: bool,
}

impl Default for RailSerializer {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            pretty: true,
        }
    }
}

impl RailSerializer {
    /// Create an indenting serializer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a serializer that writes everything on one line
    pub fn compact() -> Self {
        Self {
            indent: String::new(),
            pretty: false,
        }
    }

    /// Use a custom indent string
    pub fn with_indent<S: Into<String>>(mut self, indent: S) -> Self {
        self.indent = indent.into();
        self.pretty = true;
        self
    }

    /// Serialize a spec to a complete `<rail>` document
    pub fn serialize(&self, spec: &RailSpec) -> String {
        let mut out = String::new();
        let _ = write!(out, "<rail version=\"{}\">", RAIL_VERSION);
        self.newline(&mut out);

        if let Some(input) = &spec.input_schema {
            self.write_schema(&mut out, "input", input);
        }
        if let Some(output) = &spec.output_schema {
            self.write_schema(&mut out, "output", output);
        }
        if let Some(instructions) = &spec.instructions {
            self.write_text_block(&mut out, "instructions", &[], instructions);
        }
        self.write_text_block(&mut out, "prompt", &[], &spec.prompt);
        if let Some(script) = &spec.script {
            let attrs = [("language".to_string(), script.language.clone())];
            self.write_text_block(&mut out, "script", &attrs, &script.source);
        }

        out.push_str("</rail>");
        debug!(bytes = out.len(), "Serialized RAIL document");
        out
    }

    fn write_schema(&self, out: &mut String, tag: &str, tree: &SchemaTree) {
        match tree {
            SchemaTree::Scalar(node) => {
                let mut attrs = vec![(
                    ROOT_TYPE_ATTR.to_string(),
                    node.element_type().as_str().to_string(),
                )];
                attrs.extend(node_attributes(node));
                self.write_element(out, 1, tag, &attrs, node.children.as_ref());
            }
            SchemaTree::Object(fields) => {
                self.open(out, 1, tag, &[], fields.is_empty());
                if !fields.is_empty() {
                    self.write_fields(out, 2, fields);
                    self.close(out, 1, tag);
                }
            }
        }
    }

    fn write_node(&self, out: &mut String, depth: usize, node: &DataTypeNode) {
        let attrs = node_attributes(node);
        self.write_element(
            out,
            depth,
            node.element_type().as_str(),
            &attrs,
            node.children.as_ref(),
        );
    }

    fn write_element(
        &self,
        out: &mut String,
        depth: usize,
        tag: &str,
        attrs: &[(String, String)],
        children: Option<&Children>,
    ) {
        let empty = match children {
            None => true,
            Some(Children::Object(fields)) => fields.is_empty(),
            Some(Children::List(_)) => false,
        };
        self.open(out, depth, tag, attrs, empty);
        if empty {
            return;
        }
        match children {
            Some(Children::Object(fields)) => self.write_fields(out, depth + 1, fields),
            Some(Children::List(ListItem::Node(item))) => self.write_node(out, depth + 1, item),
            Some(Children::List(ListItem::Fields(fields))) => {
                let object = ElementType::Object;
                self.open(out, depth + 1, object.as_str(), &[], fields.is_empty());
                if !fields.is_empty() {
                    self.write_fields(out, depth + 2, fields);
                    self.close(out, depth + 1, object.as_str());
                }
            }
            None => {}
        }
        self.close(out, depth, tag);
    }

    fn write_fields(&self, out: &mut String, depth: usize, fields: &Fields) {
        for node in fields.values() {
            self.write_node(out, depth, node);
        }
    }

    fn write_text_block(
        &self,
        out: &mut String,
        tag: &str,
        attrs: &[(String, String)],
        text: &str,
    ) {
        self.pad(out, 1);
        out.push('<');
        out.push_str(tag);
        write_attributes(out, attrs);
        out.push('>');
        out.push_str(&escape_text(text));
        let _ = write!(out, "</{}>", tag);
        self.newline(out);
    }

    fn open(
        &self,
        out: &mut String,
        depth: usize,
        tag: &str,
        attrs: &[(String, String)],
        self_closing: bool,
    ) {
        self.pad(out, depth);
        out.push('<');
        out.push_str(tag);
        write_attributes(out, attrs);
        out.push_str(if self_closing { "/>" } else { ">" });
        self.newline(out);
    }

    fn close(&self, out: &mut String, depth: usize, tag: &str) {
        self.pad(out, depth);
        let _ = write!(out, "</{}>", tag);
        self.newline(out);
    }

    fn pad(&self, out: &mut String, depth: usize) {
        if self.pretty {
            for _ in 0..depth {
                out.push_str(&self.indent);
            }
        }
    }

    fn newline(&self, out: &mut String) {
        if self.pretty {
            out.push('\n');
        }
    }
}

/// Serialize a spec with the default indenting serializer
pub fn to_rail_xml(spec: &RailSpec) -> String {
    RailSerializer::new().serialize(spec)
}

/// Element attributes plus the node's `format` and `plugins`
fn node_attributes(node: &DataTypeNode) -> Vec<(String, String)> {
    let mut attrs = node.element.xml_attributes();
    if !node.formatters.is_empty() {
        attrs.push(("format".to_string(), join_tokens(&node.formatters)));
    }
    if let Some(plugins) = &node.plugins {
        attrs.push(("plugins".to_string(), join_tokens(plugins)));
    }
    attrs
}

fn write_attributes(out: &mut String, attrs: &[(String, String)]) {
    for (key, value) in attrs {
        let _ = write!(out, " {}=\"{}\"", key, escape_attribute(value));
    }
}

/// Escape an attribute value, including whitespace that attribute-value
/// normalisation would otherwise turn into spaces
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#10;"),
            '\t' => escaped.push_str("&#9;"),
            '\r' => escaped.push_str("&#13;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Escape element text
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\r' => escaped.push_str("&#13;"),
            other => escaped.push(other),
        }
    }
    escaped
}
