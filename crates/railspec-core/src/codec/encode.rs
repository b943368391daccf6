//! RailSpec to JSON

use super::dialect::{Dialect, Key};
use super::JsonCodec;
use crate::model::{
    Children, DataTypeNode, Fields, Guard, ListItem, RailSpec, RailspecTemplate, SchemaElement,
    SchemaTree, LIST_ITEM_KEY,
};
use serde_json::{Map, Value};
use tracing::debug;

impl<D: Dialect> JsonCodec<D> {
    /// Encode a spec; `None` fields are omitted
    pub fn encode(&self, spec: &RailSpec) -> Value {
        let mut map = Map::new();
        if let Some(input) = &spec.input_schema {
            put::<D>(&mut map, Key::InputSchema, self.encode_schema(input));
        }
        if let Some(output) = &spec.output_schema {
            put::<D>(&mut map, Key::OutputSchema, self.encode_schema(output));
        }
        put_opt::<D>(&mut map, Key::Instructions, spec.instructions.as_deref());
        put::<D>(&mut map, Key::Prompt, Value::String(spec.prompt.clone()));
        if let Some(script) = &spec.script {
            let mut block = Map::new();
            put::<D>(&mut block, Key::Language, Value::String(script.language.clone()));
            put::<D>(&mut block, Key::Source, Value::String(script.source.clone()));
            put::<D>(&mut map, Key::Script, Value::Object(block));
        }
        put::<D>(&mut map, Key::Version, Value::String(spec.version.clone()));

        debug!(dialect = D::NAME, keys = map.len(), "Encoded RAIL spec");
        Value::Object(map)
    }

    /// Encode a schema root as `{"schema": ...}`
    pub fn encode_schema(&self, tree: &SchemaTree) -> Value {
        let inner = match tree {
            SchemaTree::Scalar(node) => self.encode_node(node),
            SchemaTree::Object(fields) => self.encode_fields(fields),
        };
        let mut map = Map::new();
        put::<D>(&mut map, Key::Schema, inner);
        Value::Object(map)
    }

    /// Encode a single node
    pub fn encode_node(&self, node: &DataTypeNode) -> Value {
        let mut map = Map::new();
        put::<D>(&mut map, Key::Element, self.encode_element(&node.element));
        put::<D>(&mut map, Key::Formatters, string_list(&node.formatters));
        match &node.children {
            Some(Children::Object(fields)) => {
                put::<D>(&mut map, Key::Children, self.encode_fields(fields));
            }
            Some(Children::List(item)) => {
                let encoded = match item {
                    ListItem::Node(item) => self.encode_node(item),
                    ListItem::Fields(fields) => self.encode_fields(fields),
                };
                let mut children = Map::new();
                children.insert(LIST_ITEM_KEY.to_string(), encoded);
                put::<D>(&mut map, Key::Children, Value::Object(children));
            }
            None => {}
        }
        if let Some(plugins) = &node.plugins {
            put::<D>(&mut map, Key::Plugins, string_list(plugins));
        }
        Value::Object(map)
    }

    fn encode_fields(&self, fields: &Fields) -> Value {
        let map = fields
            .iter()
            .map(|(name, node)| (name.clone(), self.encode_node(node)))
            .collect();
        Value::Object(map)
    }

    fn encode_element(&self, element: &SchemaElement) -> Value {
        let mut map = Map::new();
        put::<D>(&mut map, Key::Type, Value::String(element.element_type.to_string()));
        put_opt::<D>(&mut map, Key::Name, element.name.as_deref());
        put_opt::<D>(&mut map, Key::Description, element.description.as_deref());
        if let Some(strict) = element.strict {
            put::<D>(&mut map, Key::Strict, Value::Bool(strict));
        }
        put_opt::<D>(&mut map, Key::DateFormat, element.date_format.as_deref());
        put_opt::<D>(&mut map, Key::TimeFormat, element.time_format.as_deref());
        put_opt::<D>(&mut map, Key::OnFail, element.on_fail.as_deref());
        if !element.on_fails.is_empty() {
            let overrides = element
                .on_fails
                .iter()
                .map(|over| {
                    let mut entry = Map::new();
                    put::<D>(&mut entry, Key::ValidatorTag, Value::String(over.validator_tag.clone()));
                    put::<D>(&mut entry, Key::Method, Value::String(over.method.clone()));
                    Value::Object(entry)
                })
                .collect();
            put::<D>(&mut map, Key::OnFails, Value::Array(overrides));
        }
        put_opt::<D>(&mut map, Key::Model, element.model.as_deref());
        if !element.attributes.is_empty() {
            let attributes = element
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            put::<D>(&mut map, Key::Attributes, Value::Object(attributes));
        }
        Value::Object(map)
    }

    /// Encode a guard envelope
    pub fn encode_guard(&self, guard: &Guard) -> Value {
        let mut map = Map::new();
        put::<D>(&mut map, Key::Name, Value::String(guard.name.clone()));
        put::<D>(&mut map, Key::Railspec, self.encode(&guard.railspec));
        if let Some(num_reasks) = guard.num_reasks {
            put::<D>(&mut map, Key::NumReasks, Value::from(num_reasks));
        }
        Value::Object(map)
    }

    /// Encode a template envelope
    pub fn encode_template(&self, template: &RailspecTemplate) -> Value {
        let mut map = Map::new();
        put::<D>(&mut map, Key::Name, Value::String(template.name.clone()));
        put::<D>(&mut map, Key::Railspec, self.encode(&template.railspec));
        put_opt::<D>(&mut map, Key::Owner, template.owner.as_deref());
        if let Some(is_public) = template.is_public {
            put::<D>(&mut map, Key::IsPublic, Value::Bool(is_public));
        }
        Value::Object(map)
    }
}

fn put<D: Dialect>(map: &mut Map<String, Value>, key: Key, value: Value) {
    map.insert(D::key(key).to_string(), value);
}

fn put_opt<D: Dialect>(map: &mut Map<String, Value>, key: Key, value: Option<&str>) {
    if let Some(value) = value {
        put::<D>(map, key, Value::String(value.to_string()));
    }
}

fn string_list(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}
