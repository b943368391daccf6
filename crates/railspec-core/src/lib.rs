//! Railspec Core - transcoding engine for RAIL schema documents
//!
//! A RAIL spec describes the input and output schema of an LLM call. This
//! crate converts one losslessly between its representations and binds it
//! into a validation engine's runtime objects.
//!
//! # Main Components
//!
//! - **Model**: [`RailSpec`], [`SchemaTree`], [`DataTypeNode`], [`SchemaElement`]
//! - **XML**: [`RailParser`] and [`RailSerializer`]
//! - **JSON**: [`DictCodec`] (persisted snake_case) and [`WireCodec`] (camelCase API form)
//! - **Binding**: [`RuntimeBinder`] over an injected [`TypeRegistry`] and
//!   [`ValidatorAttributeParser`], with [`prepare_plugins`] as the step before it
//!
//! # Example
//!
//! ```
//! use railspec_core::{parse_rail, to_rail_xml, DictCodec};
//!
//! let xml = r#"<rail version="0.1"><output><string name="greeting" on-fail-length="reask"/></output><prompt>Say hi</prompt></rail>"#;
//! let spec = parse_rail(xml)?;
//!
//! let stored = DictCodec::new().to_dict(&spec);
//! let restored = DictCodec::new().from_dict(&stored)?;
//! assert_eq!(restored, spec);
//! assert_eq!(railspec_core::parse_rail(&to_rail_xml(&restored))?, spec);
//! # Ok::<(), railspec_core::SchemaError>(())
//! ```

pub mod binder;
pub mod codec;
pub mod error;
pub mod format;
pub mod model;
pub mod xml;

// Re-export main types for convenience
pub use error::{Error, Result, SchemaError, SchemaErrorKind, SchemaResult};
pub use model::{
    Children, DataTypeNode, ElementType, Fields, Guard, ListItem, OnFailOverride, RailSpec,
    RailspecTemplate, SchemaElement, SchemaTree, ScriptBlock, RAIL_VERSION,
};

pub use binder::{
    prepare_plugins, BoundRailSpec, BoundSchema, ConstructArgs, FormatSpec, PluginInstaller,
    PluginReport, PluginStatus, Registry, RuntimeBinder, RuntimeObject, TypeConstructor,
    TypeRegistry, ValidatorAttributeParser,
};
pub use codec::{CamelCase, Dialect, DictCodec, JsonCodec, SnakeCase, WireCodec};
pub use xml::{parse_rail, to_rail_xml, RailParser, RailSerializer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
