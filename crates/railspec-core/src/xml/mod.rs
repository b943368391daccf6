//! RAIL XML reading and writing
//!
//! [`RailParser`] turns a `<rail version="0.1">` document into a
//! [`RailSpec`](crate::model::RailSpec); [`RailSerializer`] is its inverse.
//! Attribute order is not preserved across a round trip, attribute values are.

pub mod parser;
pub mod serializer;

pub use parser::{parse_rail, RailParser, ROOT_TYPE_ATTR};
pub use serializer::{escape_attribute, escape_text, to_rail_xml, RailSerializer};
