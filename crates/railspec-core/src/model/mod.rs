//! In-memory model of a RAIL specification
//!
//! Leaves first: [`SchemaElement`] holds per-node metadata, [`DataTypeNode`]
//! adds formatters, children and plugins, [`SchemaTree`] is the root of an
//! input or output schema, and [`RailSpec`] aggregates both schemas with the
//! prompt, instructions and script.
//!
//! Copyright (c) 2025 Railspec Team
//! Licensed under the Apache-2.0 license

pub mod element;
pub mod guard;
pub mod node;
pub mod rail;
pub mod tree;

pub use element::{
    is_reserved_attribute, ElementType, OnFailOverride, SchemaElement, ON_FAIL_ATTR,
    ON_FAIL_PREFIX,
};
pub use guard::{Guard, RailspecTemplate};
pub use node::{child_path, Children, DataTypeNode, Fields, ListItem, LIST_ITEM_KEY};
pub use rail::{check_script_language, check_version, RailSpec, ScriptBlock, RAIL_VERSION, SCRIPT_LANGUAGE};
pub use tree::SchemaTree;
