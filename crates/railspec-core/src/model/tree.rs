//! Root containers for input and output schemas

use super::node::{child_path, walk_fields, DataTypeNode, Fields};

/// The root of an input or output schema
///
/// A scalar-rooted schema is a single typed value (for example a bare string
/// output); an object-rooted schema is a set of named fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaTree {
    Scalar(DataTypeNode),
    Object(Fields),
}

impl SchemaTree {
    /// Visit every node of the tree with its path (`$` is the root)
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&str, &'a DataTypeNode),
    {
        match self {
            SchemaTree::Scalar(node) => node.walk("$", visit),
            SchemaTree::Object(fields) => walk_fields(fields, "$", visit),
        }
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_, _| count += 1);
        count
    }

    /// Look up a top-level field of an object-rooted schema
    pub fn field(&self, name: &str) -> Option<&DataTypeNode> {
        match self {
            SchemaTree::Object(fields) => fields.get(name),
            SchemaTree::Scalar(_) => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, SchemaTree::Scalar(_))
    }

    /// Paths of every node, in visiting order
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.walk(&mut |path, _| paths.push(path.to_string()));
        paths
    }
}

/// Path of a top-level field
pub fn field_path(name: &str) -> String {
    child_path("$", name)
}
