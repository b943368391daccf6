//! Persisted snake_case form

use super::DictCodec;
use crate::error::SchemaResult;
use crate::model::RailSpec;
use serde_json::Value;

impl DictCodec {
    /// Encode for storage
    pub fn to_dict(&self, spec: &RailSpec) -> Value {
        self.encode(spec)
    }

    /// Decode a stored spec
    pub fn from_dict(&self, value: &Value) -> SchemaResult<RailSpec> {
        self.decode(value)
    }
}
