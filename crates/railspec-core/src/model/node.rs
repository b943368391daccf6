//! Schema tree nodes
//!
//! A node's children are either named fields (object-shaped nodes) or the
//! single element type of a list. A list item that is itself a group of named
//! fields is stored as [`ListItem::Fields`]; the object wrapper around those
//! fields is implied and only materialised when writing XML or binding.
//!
//! Copyright (c) 2025 Railspec Team
//! Licensed under the Apache-2.0 license

use super::element::{ElementType, SchemaElement};
use indexmap::IndexMap;

/// Key under which a list's element type is stored in JSON and bound objects
pub const LIST_ITEM_KEY: &str = "item";

/// Named fields, in document order
pub type Fields = IndexMap<String, DataTypeNode>;

/// One schema field: type metadata, formatters, children and plugins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTypeNode {
    pub element: SchemaElement,
    /// Raw `name: args` validator specs, in evaluation order
    pub formatters: Vec<String>,
    pub children: Option<Children>,
    /// Validator package namespaces that must be installed before binding
    pub plugins: Option<Vec<String>>,
}

/// Children of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Children {
    /// Named fields of an object-shaped node
    Object(Fields),
    /// Element type of a list node
    List(ListItem),
}

/// Element type of a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    /// A single typed element, such as `<list><string/></list>`
    Node(Box<DataTypeNode>),
    /// Named fields wrapped by an implicit `<object>`
    Fields(Fields),
}

impl DataTypeNode {
    /// Create a node without formatters or children
    pub fn new(element: SchemaElement) -> Self {
        Self {
            element,
            formatters: Vec::new(),
            children: None,
            plugins: None,
        }
    }

    /// Shorthand for a named leaf of the given type
    pub fn leaf<N: Into<String>>(element_type: ElementType, name: N) -> Self {
        Self::new(SchemaElement::new(element_type).named(name))
    }

    /// Append a formatter token
    pub fn with_formatter<F: Into<String>>(mut self, formatter: F) -> Self {
        self.formatters.push(formatter.into());
        self
    }

    /// Set object children
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.children = Some(Children::Object(fields));
        self
    }

    /// Set the list item
    pub fn with_item(mut self, item: ListItem) -> Self {
        self.children = Some(Children::List(item));
        self
    }

    /// Append a plugin namespace
    pub fn with_plugin<P: Into<String>>(mut self, plugin: P) -> Self {
        self.plugins.get_or_insert_with(Vec::new).push(plugin.into());
        self
    }

    pub fn element_type(&self) -> &ElementType {
        &self.element.element_type
    }

    pub fn name(&self) -> Option<&str> {
        self.element.name.as_deref()
    }

    pub fn plugins(&self) -> &[String] {
        self.plugins.as_deref().unwrap_or(&[])
    }

    /// Visit this node and every descendant, depth first, with their paths
    pub fn walk<'a, F>(&'a self, path: &str, visit: &mut F)
    where
        F: FnMut(&str, &'a DataTypeNode),
    {
        visit(path, self);
        match &self.children {
            Some(Children::Object(fields)) => walk_fields(fields, path, visit),
            Some(Children::List(ListItem::Node(item))) => {
                item.walk(&child_path(path, LIST_ITEM_KEY), visit)
            }
            Some(Children::List(ListItem::Fields(fields))) => {
                walk_fields(fields, &child_path(path, LIST_ITEM_KEY), visit)
            }
            None => {}
        }
    }
}

impl ListItem {
    /// The explicit node an implicit `<object>` wrapper stands for
    pub fn wrapper_node(fields: &Fields) -> DataTypeNode {
        DataTypeNode::new(SchemaElement::new(ElementType::Object)).with_fields(fields.clone())
    }
}

/// Visit every node in a field map
pub fn walk_fields<'a, F>(fields: &'a Fields, path: &str, visit: &mut F)
where
    F: FnMut(&str, &'a DataTypeNode),
{
    for (key, node) in fields {
        node.walk(&child_path(path, key), visit);
    }
}

/// JSONPath-style location of a child, used in error messages and logs
pub fn child_path(parent: &str, key: &str) -> String {
    format!("{}.{}", parent, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> DataTypeNode {
        let mut fields = Fields::new();
        fields.insert("name".to_string(), DataTypeNode::leaf(ElementType::String, "name"));
        fields.insert(
            "age".to_string(),
            DataTypeNode::leaf(ElementType::Integer, "age").with_plugin("acme-validators"),
        );
        DataTypeNode::new(SchemaElement::new(ElementType::List).named("people"))
            .with_item(ListItem::Fields(fields))
    }

    #[test]
    fn test_walk_visits_list_fields() {
        let node = people();
        let mut seen = Vec::new();
        node.walk("$.people", &mut |path, n| {
            seen.push((path.to_string(), n.element_type().to_string()))
        });
        assert_eq!(
            seen,
            vec![
                ("$.people".to_string(), "list".to_string()),
                ("$.people.item.name".to_string(), "string".to_string()),
                ("$.people.item.age".to_string(), "integer".to_string()),
            ]
        );
    }

    #[test]
    fn test_builders() {
        let node = DataTypeNode::leaf(ElementType::String, "color")
            .with_formatter("lower-case")
            .with_formatter("two-words");
        assert_eq!(node.name(), Some("color"));
        assert_eq!(node.formatters, vec!["lower-case", "two-words"]);
        assert!(node.plugins().is_empty());

        let wrapper = ListItem::wrapper_node(&Fields::new());
        assert_eq!(wrapper.element_type(), &ElementType::Object);
        assert_eq!(wrapper.children, Some(Children::Object(Fields::new())));
    }
}
