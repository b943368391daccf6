//! Binding a RAIL spec into a validation engine's runtime objects
//!
//! The engine stays outside this crate. It is reached through three seams:
//! a [`ValidatorAttributeParser`] that turns a joined format string into
//! validators, a [`TypeRegistry`] of constructors keyed by type tag, and a
//! [`PluginInstaller`] run by the caller before binding.
//!
//! Copyright (c) 2025 Railspec Team
//! Licensed under the Apache-2.0 license

pub mod plugins;

pub use plugins::{prepare_plugins, PluginInstaller, PluginOutcome, PluginReport, PluginStatus};

use crate::error::{Error, Result, SchemaError};
use crate::format::{check_token, join_tokens};
use crate::model::{
    child_path, Children, DataTypeNode, ElementType, Fields, ListItem, RailSpec, SchemaElement,
    SchemaTree, LIST_ITEM_KEY,
};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Everything the engine's attribute parser sees for one node
#[derive(Debug, Clone)]
pub struct FormatSpec<'a> {
    /// Formatters joined with `"; "`
    pub format: String,
    pub element: &'a SchemaElement,
    pub path: &'a str,
}

impl<'a> FormatSpec<'a> {
    /// Join and check the formatters of a node
    pub fn for_node(node: &'a DataTypeNode, path: &'a str) -> Result<Self> {
        for token in &node.formatters {
            check_token(token, path)?;
        }
        Ok(Self {
            format: join_tokens(&node.formatters),
            element: &node.element,
            path,
        })
    }

    /// The element's attributes as RAIL XML would carry them
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.element.xml_attributes()
    }
}

/// Resolves a joined format string into the engine's validators
pub trait ValidatorAttributeParser {
    type Output;

    fn parse(&self, spec: &FormatSpec<'_>) -> anyhow::Result<Self::Output>;
}

/// Arguments handed to a type constructor
pub struct ConstructArgs<'a, V, O> {
    pub element: &'a SchemaElement,
    pub validators: V,
    /// Already bound children; a list's element is under `"item"`
    pub children: IndexMap<String, O>,
    pub path: &'a str,
}

/// Builds one runtime object
pub trait TypeConstructor<V, O> {
    fn construct(&self, args: ConstructArgs<'_, V, O>) -> anyhow::Result<O>;
}

impl<V, O, F> TypeConstructor<V, O> for F
where
    F: Fn(ConstructArgs<'_, V, O>) -> anyhow::Result<O>,
{
    fn construct(&self, args: ConstructArgs<'_, V, O>) -> anyhow::Result<O> {
        self(args)
    }
}

/// An object produced by a type constructor
///
/// Constructors take a generic argument list, so date and time formats are
/// applied after construction.
pub trait RuntimeObject {
    fn set_date_format(&mut self, _format: &str) {}

    fn set_time_format(&mut self, _format: &str) {}
}

/// Lookup of constructors by type tag
pub trait TypeRegistry<V> {
    type Object: RuntimeObject;

    fn constructor(&self, element_type: &ElementType)
        -> Option<&dyn TypeConstructor<V, Self::Object>>;
}

type BoxedConstructor<V, O> = Box<dyn TypeConstructor<V, O> + Send + Sync>;

/// A registry built explicitly at startup and passed to the binder
pub struct Registry<V, O> {
    constructors: HashMap<ElementType, BoxedConstructor<V, O>>,
}

impl<V, O> Default for Registry<V, O> {
    fn default() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }
}

impl<V, O> Registry<V, O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor function for a type tag
    pub fn register<T, F>(&mut self, element_type: T, constructor: F) -> &mut Self
    where
        T: Into<ElementType>,
        F: Fn(ConstructArgs<'_, V, O>) -> anyhow::Result<O> + Send + Sync + 'static,
    {
        self.register_constructor(element_type, constructor)
    }

    /// Register any [`TypeConstructor`] for a type tag
    pub fn register_constructor<T, C>(&mut self, element_type: T, constructor: C) -> &mut Self
    where
        T: Into<ElementType>,
        C: TypeConstructor<V, O> + Send + Sync + 'static,
    {
        self.constructors
            .insert(element_type.into(), Box::new(constructor));
        self
    }

    pub fn contains(&self, element_type: &ElementType) -> bool {
        self.constructors.contains_key(element_type)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl<V, O: RuntimeObject> TypeRegistry<V> for Registry<V, O> {
    type Object = O;

    fn constructor(&self, element_type: &ElementType) -> Option<&dyn TypeConstructor<V, O>> {
        self.constructors
            .get(element_type)
            .map(|c| c.as_ref() as &dyn TypeConstructor<V, O>)
    }
}

/// A bound schema root
#[derive(Debug)]
pub enum BoundSchema<O> {
    Scalar(O),
    Object(IndexMap<String, O>),
}

/// Runtime objects for both schemas of a spec
#[derive(Debug)]
pub struct BoundRailSpec<O> {
    pub input: Option<BoundSchema<O>>,
    pub output: Option<BoundSchema<O>>,
}

/// Turns RAIL specs into runtime objects
pub struct RuntimeBinder<'a, P, R> {
    parser: &'a P,
    registry: &'a R,
    plugins: Option<&'a PluginReport>,
}

impl<'a, P, R> RuntimeBinder<'a, P, R>
where
    P: ValidatorAttributeParser,
    R: TypeRegistry<P::Output>,
{
    pub fn new(parser: &'a P, registry: &'a R) -> Self {
        Self {
            parser,
            registry,
            plugins: None,
        }
    }

    /// Refuse to bind nodes whose plugins this report does not list as available
    pub fn require_plugins(mut self, report: &'a PluginReport) -> Self {
        self.plugins = Some(report);
        self
    }

    /// Bind the input and output schemas of a spec
    pub fn bind(&self, spec: &RailSpec) -> Result<BoundRailSpec<R::Object>> {
        let input = spec
            .input_schema
            .as_ref()
            .map(|tree| self.bind_tree(tree, "$input"))
            .transpose()?;
        let output = spec
            .output_schema
            .as_ref()
            .map(|tree| self.bind_tree(tree, "$output"))
            .transpose()?;
        debug!(
            has_input = input.is_some(),
            has_output = output.is_some(),
            "Bound RAIL spec"
        );
        Ok(BoundRailSpec { input, output })
    }

    /// Bind one schema root
    pub fn bind_tree(&self, tree: &SchemaTree, path: &str) -> Result<BoundSchema<R::Object>> {
        match tree {
            SchemaTree::Scalar(node) => Ok(BoundSchema::Scalar(self.bind_node(node, path)?)),
            SchemaTree::Object(fields) => Ok(BoundSchema::Object(self.bind_fields(fields, path)?)),
        }
    }

    /// Bind a node and all of its descendants
    pub fn bind_node(&self, node: &DataTypeNode, path: &str) -> Result<R::Object> {
        self.check_plugins(node, path)?;

        let element_type = node.element_type();
        let constructor = self.registry.constructor(element_type).ok_or_else(|| {
            SchemaError::UnknownType {
                type_tag: element_type.to_string(),
                path: path.to_string(),
            }
        })?;

        let children = match &node.children {
            None => IndexMap::new(),
            Some(Children::Object(fields)) => self.bind_fields(fields, path)?,
            Some(Children::List(item)) => {
                let item_path = child_path(path, LIST_ITEM_KEY);
                let bound = match item {
                    ListItem::Node(item) => self.bind_node(item, &item_path)?,
                    ListItem::Fields(fields) => {
                        self.bind_node(&ListItem::wrapper_node(fields), &item_path)?
                    }
                };
                IndexMap::from([(LIST_ITEM_KEY.to_string(), bound)])
            }
        };

        let format = FormatSpec::for_node(node, path)?;
        let validators = self
            .parser
            .parse(&format)
            .map_err(|err| Error::binding(path, err))?;

        let mut object = constructor
            .construct(ConstructArgs {
                element: &node.element,
                validators,
                children,
                path,
            })
            .map_err(|err| Error::binding(path, err))?;

        match element_type {
            ElementType::Date => {
                if let Some(format) = &node.element.date_format {
                    object.set_date_format(format);
                }
            }
            ElementType::Time => {
                if let Some(format) = &node.element.time_format {
                    object.set_time_format(format);
                }
            }
            _ => {}
        }

        trace!(path, element_type = %element_type, "Bound node");
        Ok(object)
    }

    fn bind_fields(&self, fields: &Fields, path: &str) -> Result<IndexMap<String, R::Object>> {
        fields
            .iter()
            .map(|(name, node)| Ok((name.clone(), self.bind_node(node, &child_path(path, name))?)))
            .collect()
    }

    fn check_plugins(&self, node: &DataTypeNode, path: &str) -> Result<()> {
        let Some(report) = self.plugins else {
            return Ok(());
        };
        match node.plugins().iter().find(|ns| !report.is_available(ns)) {
            Some(namespace) => Err(Error::PluginUnavailable {
                namespace: namespace.clone(),
                path: path.to_string(),
            }),
            None => Ok(()),
        }
    }
}
