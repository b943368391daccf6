//! API-facing camelCase form

use super::WireCodec;
use crate::error::SchemaResult;
use crate::model::RailSpec;
use serde_json::Value;

impl WireCodec {
    /// Encode for an HTTP response body
    pub fn to_response(&self, spec: &RailSpec) -> Value {
        self.encode(spec)
    }

    /// Decode an HTTP request body
    pub fn from_request(&self, value: &Value) -> SchemaResult<RailSpec> {
        self.decode(value)
    }
}
