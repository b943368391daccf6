//! JSON to RailSpec
//!
//! Nodes and named-field maps share the same JSON shape, so a map is read as
//! a node when every key is one of the dialect's node keys. A map that passes
//! that test, fails to decode as a node, but does decode as a field map is
//! reported as [`SchemaError::AmbiguousNodeShape`] rather than guessed at.
//!
//! Anything accepted here must also survive RAIL XML: field names match
//! their keys, tokens are already split, and extension attributes never
//! shadow a reserved one.

use super::dialect::{Dialect, Key};
use super::JsonCodec;
use crate::error::{SchemaError, SchemaResult};
use crate::format::check_token;
use crate::model::{
    check_script_language, check_version, child_path, is_reserved_attribute, Children,
    DataTypeNode, ElementType, Fields, Guard, ListItem, OnFailOverride, RailSpec,
    RailspecTemplate, SchemaElement, SchemaTree, ScriptBlock, LIST_ITEM_KEY, ON_FAIL_ATTR,
    RAIL_VERSION,
};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, trace};

type Object = Map<String, Value>;

/// Result of the node-or-fields shape test
#[derive(Debug)]
enum Shape {
    Node(DataTypeNode),
    Fields(Fields),
}

impl<D: Dialect> JsonCodec<D> {
    /// Decode a spec; absent keys become `None`
    pub fn decode(&self, value: &Value) -> SchemaResult<RailSpec> {
        let map = as_object(value, "$")?;

        let version = match map.get(D::key(Key::Version)) {
            None | Some(Value::Null) => RAIL_VERSION.to_string(),
            Some(Value::String(version)) => {
                check_version(Some(version))?;
                version.clone()
            }
            Some(other) => {
                return Err(SchemaError::UnsupportedVersion {
                    found: Some(other.to_string()),
                })
            }
        };

        let input_schema = field::<D>(map, Key::InputSchema)
            .map(|v| self.decode_schema(v, "$input"))
            .transpose()?;
        let output_schema = field::<D>(map, Key::OutputSchema)
            .map(|v| self.decode_schema(v, "$output"))
            .transpose()?;
        let instructions = opt_string::<D>(map, Key::Instructions, "$")?;
        let prompt = opt_string::<D>(map, Key::Prompt, "$")?.ok_or(SchemaError::MissingPrompt)?;
        let script = field::<D>(map, Key::Script)
            .map(|v| self.decode_script(v))
            .transpose()?;

        debug!(dialect = D::NAME, "Decoded RAIL spec");
        Ok(RailSpec {
            input_schema,
            output_schema,
            prompt,
            instructions,
            script,
            version,
        })
    }

    /// Decode a `{"schema": ...}` root
    pub fn decode_schema(&self, value: &Value, path: &str) -> SchemaResult<SchemaTree> {
        let map = as_object(value, path)?;
        let inner = field::<D>(map, Key::Schema).ok_or_else(|| {
            SchemaError::invalid_field(path, format!("a '{}' key", D::key(Key::Schema)))
        })?;
        match self.decode_shape(inner, path)? {
            Shape::Node(node) => Ok(SchemaTree::Scalar(node)),
            Shape::Fields(fields) => Ok(SchemaTree::Object(fields)),
        }
    }

    /// Decode a single node
    pub fn decode_node(&self, value: &Value, path: &str) -> SchemaResult<DataTypeNode> {
        self.decode_node_map(as_object(value, path)?, path)
    }

    fn decode_shape(&self, value: &Value, path: &str) -> SchemaResult<Shape> {
        let map = as_object(value, path)?;
        if map.is_empty() {
            return Ok(Shape::Fields(Fields::new()));
        }
        if !map.keys().all(|key| D::is_node_key(key)) {
            return self.decode_fields(map, path).map(Shape::Fields);
        }
        match self.decode_node_map(map, path) {
            Ok(node) => Ok(Shape::Node(node)),
            Err(err) => {
                if self.decode_fields(map, path).is_err() {
                    return Err(err);
                }
                debug!(path, error = %err, "Map reads as fields but not as a node");
                Err(SchemaError::AmbiguousNodeShape {
                    path: path.to_string(),
                    keys: map.keys().cloned().collect(),
                })
            }
        }
    }

    fn decode_node_map(&self, map: &Object, path: &str) -> SchemaResult<DataTypeNode> {
        let element = match field::<D>(map, Key::Element) {
            Some(element) => {
                let element_path = child_path(path, D::key(Key::Element));
                self.decode_element(as_object(element, &element_path)?, &element_path)?
            }
            // Legacy documents flatten the element into the node
            None => self.decode_element(map, path)?,
        };

        let formatters = match field::<D>(map, Key::Formatters) {
            Some(value) => string_list(value, &child_path(path, D::key(Key::Formatters)))?,
            None => Vec::new(),
        };
        for token in &formatters {
            check_token(token, path)?;
        }

        let plugins = field::<D>(map, Key::Plugins)
            .map(|value| string_list(value, &child_path(path, D::key(Key::Plugins))))
            .transpose()?;
        for token in plugins.iter().flatten() {
            check_token(token, path)?;
        }

        let children = match field::<D>(map, Key::Children) {
            Some(value) => self.decode_children(&element.element_type, value, path)?,
            None => None,
        };

        trace!(path, element_type = %element.element_type, "Decoded node");
        Ok(DataTypeNode {
            element,
            formatters,
            children,
            plugins,
        })
    }

    fn decode_children(
        &self,
        element_type: &ElementType,
        value: &Value,
        path: &str,
    ) -> SchemaResult<Option<Children>> {
        let children_path = child_path(path, D::key(Key::Children));
        let map = as_object(value, &children_path)?;
        if !element_type.is_list() {
            // XML cannot tell an empty child list from none on a leaf type
            if map.is_empty() && *element_type != ElementType::Object {
                return Err(SchemaError::invalid_field(
                    children_path,
                    format!("no empty children on <{}>", element_type),
                ));
            }
            return Ok(Some(Children::Object(self.decode_fields(map, path)?)));
        }

        if map.is_empty() {
            return Ok(None);
        }
        let item = match (map.get(LIST_ITEM_KEY), map.len()) {
            (Some(item), 1) => item,
            _ => {
                return Err(SchemaError::invalid_field(
                    path,
                    format!("a single list child keyed '{}'", LIST_ITEM_KEY),
                ))
            }
        };
        let item_path = child_path(path, LIST_ITEM_KEY);
        let item = match self.decode_shape(item, &item_path)? {
            Shape::Node(node) => ListItem::Node(Box::new(node)),
            Shape::Fields(fields) => ListItem::Fields(fields),
        };
        Ok(Some(Children::List(item)))
    }

    fn decode_fields(&self, map: &Object, path: &str) -> SchemaResult<Fields> {
        map.iter()
            .map(|(name, value)| {
                let field_path = child_path(path, name);
                let node = self.decode_node(value, &field_path)?;
                if node.name() != Some(name.as_str()) {
                    return Err(SchemaError::invalid_field(
                        field_path,
                        format!("a name matching the key '{}'", name),
                    ));
                }
                Ok((name.clone(), node))
            })
            .collect()
    }

    fn decode_element(&self, map: &Object, path: &str) -> SchemaResult<SchemaElement> {
        let type_tag = opt_string::<D>(map, Key::Type, path)?.ok_or_else(|| {
            SchemaError::invalid_field(child_path(path, D::key(Key::Type)), "a type tag")
        })?;

        let mut element = SchemaElement::new(ElementType::from(type_tag.as_str()));
        element.name = opt_string::<D>(map, Key::Name, path)?;
        element.description = opt_string::<D>(map, Key::Description, path)?;
        element.strict = opt_bool::<D>(map, Key::Strict, path)?;
        element.date_format = opt_string::<D>(map, Key::DateFormat, path)?;
        element.time_format = opt_string::<D>(map, Key::TimeFormat, path)?;
        element.on_fail = opt_string::<D>(map, Key::OnFail, path)?;
        element.model = opt_string::<D>(map, Key::Model, path)?;

        if let Some(overrides) = field::<D>(map, Key::OnFails) {
            element.on_fails = self.decode_overrides(overrides, &child_path(path, D::key(Key::OnFails)))?;
        }

        // Legacy single handler: a non-default tag names the validator it applies to
        let tag = opt_string::<D>(map, Key::OnFailTag, path)?;
        if let Some(tag) = tag.filter(|tag| tag != ON_FAIL_ATTR) {
            if let Some(method) = element.on_fail.take() {
                element.on_fails.push(OnFailOverride::new(tag, method));
            }
        }

        if let Some(attributes) = field::<D>(map, Key::Attributes) {
            let attr_path = child_path(path, D::key(Key::Attributes));
            element.attributes = as_object(attributes, &attr_path)?
                .iter()
                .map(|(key, value)| match value {
                    Value::String(s) if is_reserved_attribute(key, s) => {
                        Err(SchemaError::invalid_field(
                            child_path(&attr_path, key),
                            "an attribute name without a dedicated field",
                        ))
                    }
                    Value::String(s) => Ok((key.clone(), s.clone())),
                    _ => Err(SchemaError::invalid_field(child_path(&attr_path, key), "a string")),
                })
                .collect::<SchemaResult<IndexMap<_, _>>>()?;
        }

        Ok(element)
    }

    fn decode_overrides(&self, value: &Value, path: &str) -> SchemaResult<Vec<OnFailOverride>> {
        let entries = value
            .as_array()
            .ok_or_else(|| SchemaError::invalid_field(path, "an array"))?;
        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let entry_path = format!("{}[{}]", path, index);
                let map = as_object(entry, &entry_path)?;
                let tag = required_string::<D>(map, Key::ValidatorTag, &entry_path)?;
                let method = required_string::<D>(map, Key::Method, &entry_path)?;
                Ok(OnFailOverride::new(tag, method))
            })
            .collect()
    }

    fn decode_script(&self, value: &Value) -> SchemaResult<ScriptBlock> {
        let path = child_path("$", D::key(Key::Script));
        let map = as_object(value, &path)?;
        let language = opt_string::<D>(map, Key::Language, &path)?.unwrap_or_default();
        check_script_language(&language)?;
        let source = match opt_string::<D>(map, Key::Source, &path)? {
            Some(source) => source,
            None => opt_string::<D>(map, Key::Text, &path)?.ok_or_else(|| {
                SchemaError::invalid_field(&path, format!("a '{}' key", D::key(Key::Source)))
            })?,
        };
        Ok(ScriptBlock { language, source })
    }

    /// Decode a guard envelope
    pub fn decode_guard(&self, value: &Value) -> SchemaResult<Guard> {
        let map = as_object(value, "$")?;
        let name = required_string::<D>(map, Key::Name, "$")?;
        let railspec = self.decode(required::<D>(map, Key::Railspec, "$")?)?;
        let num_reasks = match field::<D>(map, Key::NumReasks) {
            None => None,
            Some(value) => Some(
                value
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| {
                        SchemaError::invalid_field(
                            child_path("$", D::key(Key::NumReasks)),
                            "a non-negative integer",
                        )
                    })?,
            ),
        };
        Ok(Guard {
            name,
            railspec,
            num_reasks,
        })
    }

    /// Decode a template envelope; a caller-supplied owner replaces the
    /// payload's
    pub fn decode_template(
        &self,
        value: &Value,
        owner: Option<&str>,
    ) -> SchemaResult<RailspecTemplate> {
        let map = as_object(value, "$")?;
        let name = required_string::<D>(map, Key::Name, "$")?;
        let railspec = self.decode(required::<D>(map, Key::Railspec, "$")?)?;
        let owner = match owner {
            Some(owner) => Some(owner.to_string()),
            None => opt_string::<D>(map, Key::Owner, "$")?,
        };
        let is_public = opt_bool::<D>(map, Key::IsPublic, "$")?;
        Ok(RailspecTemplate {
            name,
            railspec,
            owner,
            is_public,
        })
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> SchemaResult<&'a Object> {
    value
        .as_object()
        .ok_or_else(|| SchemaError::invalid_field(path, "an object"))
}

/// Value of a key, treating `null` as absent
fn field<'a, D: Dialect>(map: &'a Object, key: Key) -> Option<&'a Value> {
    map.get(D::key(key)).filter(|value| !value.is_null())
}

fn required<'a, D: Dialect>(map: &'a Object, key: Key, path: &str) -> SchemaResult<&'a Value> {
    field::<D>(map, key).ok_or_else(|| {
        SchemaError::invalid_field(child_path(path, D::key(key)), "a value")
    })
}

fn opt_string<D: Dialect>(map: &Object, key: Key, path: &str) -> SchemaResult<Option<String>> {
    match field::<D>(map, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(SchemaError::invalid_field(
            child_path(path, D::key(key)),
            "a string",
        )),
    }
}

fn required_string<D: Dialect>(map: &Object, key: Key, path: &str) -> SchemaResult<String> {
    opt_string::<D>(map, key, path)?.ok_or_else(|| {
        SchemaError::invalid_field(child_path(path, D::key(key)), "a string")
    })
}

fn opt_bool<D: Dialect>(map: &Object, key: Key, path: &str) -> SchemaResult<Option<bool>> {
    match field::<D>(map, key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(SchemaError::invalid_field(
            child_path(path, D::key(key)),
            "a boolean",
        )),
    }
}

fn string_list(value: &Value, path: &str) -> SchemaResult<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| SchemaError::invalid_field(path, "an array of strings"))?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| SchemaError::invalid_field(format!("{}[{}]", path, index), "a string"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::codec::DictCodec;
    use crate::error::{SchemaError, SchemaErrorKind};
    use crate::xml::{parse_rail, to_rail_xml};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn output_doc(schema: Value) -> Value {
        json!({"prompt": "p", "output_schema": {"schema": schema}})
    }

    fn decode_err(schema: Value) -> SchemaError {
        DictCodec::new().from_dict(&output_doc(schema)).unwrap_err()
    }

    #[test]
    fn test_field_name_must_match_key() {
        let err = decode_err(json!({"greeting": {"element": {"type": "string", "name": "other"}}}));
        assert_eq!(
            err,
            SchemaError::invalid_field("$output.greeting", "a name matching the key 'greeting'")
        );

        let err = decode_err(json!({"greeting": {"element": {"type": "string"}}}));
        assert_eq!(
            err,
            SchemaError::invalid_field("$output.greeting", "a name matching the key 'greeting'")
        );

        let err = decode_err(json!({
            "people": {
                "element": {"type": "list", "name": "people"},
                "children": {"item": {"age": {"element": {"type": "integer", "name": "years"}}}}
            }
        }));
        assert_eq!(err.kind(), SchemaErrorKind::InvalidField);
    }

    #[test]
    fn test_tokens_must_be_pre_split() {
        for token in ["a; b", " c ", ""] {
            let err = decode_err(json!({
                "greeting": {"element": {"type": "string", "name": "greeting"}, "formatters": [token]}
            }));
            assert_eq!(
                err,
                SchemaError::MalformedFormatString {
                    token: token.to_string(),
                    path: "$output.greeting".to_string(),
                }
            );
        }

        let err = decode_err(json!({
            "url": {"element": {"type": "url", "name": "url"}, "plugins": ["acme-web; acme-net"]}
        }));
        assert_eq!(err.kind(), SchemaErrorKind::MalformedFormatString);
    }

    #[test]
    fn test_empty_children_only_on_containers() {
        let err = decode_err(json!({
            "pick": {"element": {"type": "choice", "name": "pick"}, "children": {}}
        }));
        assert_eq!(
            err,
            SchemaError::invalid_field("$output.pick.children", "no empty children on <choice>")
        );

        let spec = DictCodec::new()
            .from_dict(&output_doc(json!({
                "meta": {"element": {"type": "object", "name": "meta"}, "children": {}},
                "tags": {"element": {"type": "list", "name": "tags"}, "children": {}}
            })))
            .unwrap();
        let output = spec.output_schema.as_ref().unwrap();
        assert!(output.field("meta").unwrap().children.is_some());
        assert!(output.field("tags").unwrap().children.is_none());
    }

    #[test]
    fn test_reserved_extension_attributes() {
        let err = DictCodec::new()
            .from_dict(&output_doc(json!({
                "element": {"type": "string", "attributes": {"type": "x"}}
            })))
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::invalid_field(
                "$output.element.attributes.type",
                "an attribute name without a dedicated field",
            )
        );

        for key in ["name", "format", "plugins", "on-fail", "on-fail-length", "date-format"] {
            let err = decode_err(json!({
                "a": {"element": {"type": "string", "name": "a", "attributes": {key: "v"}}}
            }));
            assert_eq!(err.kind(), SchemaErrorKind::InvalidField, "{key}");
        }

        let err = decode_err(json!({
            "a": {"element": {"type": "string", "name": "a", "attributes": {"strict": "true"}}}
        }));
        assert_eq!(err.kind(), SchemaErrorKind::InvalidField);

        let spec = DictCodec::new()
            .from_dict(&output_doc(json!({
                "a": {"element": {"type": "string", "name": "a", "attributes": {"strict": "maybe"}}}
            })))
            .unwrap();
        assert_eq!(parse_rail(&to_rail_xml(&spec)).unwrap(), spec);
    }

    #[test]
    fn test_node_error_is_not_hidden_by_shape_test() {
        let err = DictCodec::new()
            .from_dict(&output_doc(json!({
                "element": {"type": "object"},
                "children": {"a": {"element": {"name": "a"}}}
            })))
            .unwrap_err();
        assert_eq!(err, SchemaError::invalid_field("$output.a.element.type", "a type tag"));
    }

    #[test]
    fn test_accepted_trees_survive_xml() {
        let spec = DictCodec::new()
            .from_dict(&output_doc(json!({
                "greeting": {
                    "element": {"type": "string", "name": "greeting", "attributes": {"x-note": "hi"}},
                    "formatters": ["length: 1 10", "valid-choices: {['a;b']}"],
                    "plugins": ["acme-validators"]
                },
                "people": {
                    "element": {"type": "list", "name": "people"},
                    "children": {"item": {"age": {"element": {"type": "integer", "name": "age"}}}}
                }
            })))
            .unwrap();
        assert_eq!(parse_rail(&to_rail_xml(&spec)).unwrap(), spec);
    }
}
