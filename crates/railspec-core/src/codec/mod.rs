//! JSON codecs for RAIL specifications
//!
//! One generic [`JsonCodec`] walks the model; a [`Dialect`] decides what the
//! keys are called. [`DictCodec`] speaks the persisted snake_case form and
//! [`WireCodec`] the camelCase form used by the HTTP API. Both produce and
//! consume the same [`RailSpec`] shape.
//!
//! Copyright (c) 2025 Railspec Team
//! Licensed under the Apache-2.0 license

pub mod decode;
pub mod dialect;
pub mod dict;
pub mod encode;
pub mod wire;

pub use dialect::{CamelCase, Dialect, Key, SnakeCase, NODE_KEYS};

use crate::error::Result;
use crate::model::RailSpec;
use serde_json::Value;
use std::marker::PhantomData;

/// JSON encoder/decoder parameterised by key naming
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec<D> {
    _dialect: PhantomData<D>,
}

/// Persisted snake_case codec
pub type DictCodec = JsonCodec<SnakeCase>;

/// API-facing camelCase codec
pub type WireCodec = JsonCodec<CamelCase>;

impl<D: Dialect> JsonCodec<D> {
    pub fn new() -> Self {
        Self {
            _dialect: PhantomData,
        }
    }

    /// Dialect name, `dict` or `wire`
    pub fn dialect(&self) -> &'static str {
        D::NAME
    }

    /// Encode a spec to JSON text
    pub fn to_json_string(&self, spec: &RailSpec, pretty: bool) -> Result<String> {
        let value = self.encode(spec);
        let text = if pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(text)
    }

    /// Decode a spec from JSON text
    pub fn from_json_str(&self, text: &str) -> Result<RailSpec> {
        let value: Value = serde_json::from_str(text)?;
        Ok(self.decode(&value)?)
    }
}
