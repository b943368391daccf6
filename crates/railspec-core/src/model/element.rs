//! Per-node schema metadata
//!
//! Copyright (c) 2025 Railspec Team
//! Licensed under the Apache-2.0 license

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// XML attribute name of the primary failure handler
pub const ON_FAIL_ATTR: &str = "on-fail";

/// Prefix of per-validator failure handler attributes (`on-fail-<validator>`)
pub const ON_FAIL_PREFIX: &str = "on-fail-";

/// Attribute names with a dedicated field on [`SchemaElement`] or the node,
/// which therefore cannot live in the extension bag
pub const RESERVED_ATTRIBUTES: [&str; 9] = [
    "type",
    "name",
    "description",
    "date-format",
    "time-format",
    "model",
    "format",
    "plugins",
    ON_FAIL_ATTR,
];

/// Whether an extension attribute would be read back as something else
///
/// `strict` is only claimed by the element for `true`/`false`; any other
/// value stays in the bag.
pub fn is_reserved_attribute(key: &str, value: &str) -> bool {
    RESERVED_ATTRIBUTES.contains(&key)
        || key.starts_with(ON_FAIL_PREFIX)
        || (key == "strict" && (value == "true" || value == "false"))
}

/// Type tag of a schema node
///
/// Known built-in tags get their own variant; anything else is carried
/// verbatim in [`ElementType::Unknown`] and only rejected when a runtime
/// registry has no constructor for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementType {
    String,
    Integer,
    Float,
    Bool,
    Date,
    Time,
    Email,
    Url,
    PythonCode,
    Sql,
    Percentage,
    Choice,
    Case,
    List,
    Object,
    Unknown(String),
}

impl ElementType {
    /// The tag as written in RAIL XML and JSON
    pub fn as_str(&self) -> &str {
        match self {
            ElementType::String => "string",
            ElementType::Integer => "integer",
            ElementType::Float => "float",
            ElementType::Bool => "bool",
            ElementType::Date => "date",
            ElementType::Time => "time",
            ElementType::Email => "email",
            ElementType::Url => "url",
            ElementType::PythonCode => "pythoncode",
            ElementType::Sql => "sql",
            ElementType::Percentage => "percentage",
            ElementType::Choice => "choice",
            ElementType::Case => "case",
            ElementType::List => "list",
            ElementType::Object => "object",
            ElementType::Unknown(tag) => tag,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ElementType::List)
    }

    /// Whether children of this type are keyed by their `name`
    pub fn has_named_children(&self) -> bool {
        !self.is_list()
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        match tag {
            "string" => ElementType::String,
            "integer" => ElementType::Integer,
            "float" => ElementType::Float,
            "bool" => ElementType::Bool,
            "date" => ElementType::Date,
            "time" => ElementType::Time,
            "email" => ElementType::Email,
            "url" => ElementType::Url,
            "pythoncode" => ElementType::PythonCode,
            "sql" => ElementType::Sql,
            "percentage" => ElementType::Percentage,
            "choice" => ElementType::Choice,
            "case" => ElementType::Case,
            "list" => ElementType::List,
            "object" => ElementType::Object,
            other => ElementType::Unknown(other.to_string()),
        }
    }
}

impl FromStr for ElementType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ElementType::from(s))
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ElementType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(ElementType::from(tag.as_str()))
    }
}

/// A per-validator failure handler override, e.g. `on-fail-length="reask"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnFailOverride {
    /// Full attribute name, including the `on-fail-` prefix
    pub validator_tag: String,
    /// Handler to run when that validator fails (`reask`, `fix`, `noop`, ...)
    pub method: String,
}

impl OnFailOverride {
    pub fn new<T: Into<String>, M: Into<String>>(validator_tag: T, method: M) -> Self {
        Self {
            validator_tag: validator_tag.into(),
            method: method.into(),
        }
    }

    /// The validator name with the `on-fail-` prefix removed
    pub fn validator(&self) -> &str {
        self.validator_tag
            .strip_prefix(ON_FAIL_PREFIX)
            .unwrap_or(&self.validator_tag)
    }
}

/// Metadata attached to one schema node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaElement {
    pub element_type: ElementType,
    pub name: Option<String>,
    pub description: Option<String>,
    pub strict: Option<bool>,
    pub date_format: Option<String>,
    pub time_format: Option<String>,
    pub on_fail: Option<String>,
    pub on_fails: Vec<OnFailOverride>,
    pub model: Option<String>,
    /// Non-reserved attributes, kept verbatim and in document order
    pub attributes: IndexMap<String, String>,
}

impl SchemaElement {
    /// Create an element with only a type tag
    pub fn new(element_type: ElementType) -> Self {
        Self {
            element_type,
            name: None,
            description: None,
            strict: None,
            date_format: None,
            time_format: None,
            on_fail: None,
            on_fails: Vec::new(),
            model: None,
            attributes: IndexMap::new(),
        }
    }

    /// Set the field name
    pub fn named<N: Into<String>>(mut self, name: N) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description
    pub fn with_description<D: Into<String>>(mut self, description: D) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a per-validator failure handler
    pub fn with_on_fail_override<T: Into<String>, M: Into<String>>(
        mut self,
        validator_tag: T,
        method: M,
    ) -> Self {
        self.on_fails.push(OnFailOverride::new(validator_tag, method));
        self
    }

    /// Handler for a given validator, falling back to the primary handler
    pub fn on_fail_for(&self, validator: &str) -> Option<&str> {
        self.on_fails
            .iter()
            .find(|o| o.validator() == validator)
            .map(|o| o.method.as_str())
            .or(self.on_fail.as_deref())
    }

    /// Attributes as they appear on the RAIL XML element, excluding
    /// `format` and `plugins` which belong to the node
    pub fn xml_attributes(&self) -> Vec<(String, String)> {
        let mut attrs = Vec::new();
        if let Some(name) = &self.name {
            attrs.push(("name".to_string(), name.clone()));
        }
        if let Some(description) = &self.description {
            attrs.push(("description".to_string(), description.clone()));
        }
        if let Some(strict) = self.strict {
            attrs.push(("strict".to_string(), strict.to_string()));
        }
        if let Some(date_format) = &self.date_format {
            attrs.push(("date-format".to_string(), date_format.clone()));
        }
        if let Some(time_format) = &self.time_format {
            attrs.push(("time-format".to_string(), time_format.clone()));
        }
        if let Some(on_fail) = &self.on_fail {
            attrs.push((ON_FAIL_ATTR.to_string(), on_fail.clone()));
        }
        for over in &self.on_fails {
            attrs.push((over.validator_tag.clone(), over.method.clone()));
        }
        if let Some(model) = &self.model {
            attrs.push(("model".to_string(), model.clone()));
        }
        for (key, value) in &self.attributes {
            attrs.push((key.clone(), value.clone()));
        }
        attrs
    }

    /// Whether this element carries anything besides its type tag
    pub fn is_bare(&self) -> bool {
        self.xml_attributes().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_type_tags() {
        assert_eq!(ElementType::from("pythoncode"), ElementType::PythonCode);
        assert_eq!(ElementType::from("list").as_str(), "list");
        assert_eq!(
            ElementType::from("widget"),
            ElementType::Unknown("widget".to_string())
        );
        assert_eq!(ElementType::Unknown("widget".to_string()).to_string(), "widget");
        assert!(ElementType::List.is_list());
        assert!(ElementType::Object.has_named_children());
    }

    #[test]
    fn test_element_type_serde() {
        let json = serde_json::to_value(ElementType::Date).unwrap();
        assert_eq!(json, serde_json::json!("date"));
        let tag: ElementType = serde_json::from_value(serde_json::json!("gizmo")).unwrap();
        assert_eq!(tag, ElementType::Unknown("gizmo".to_string()));
    }

    #[test]
    fn test_on_fail_lookup() {
        let element = SchemaElement::new(ElementType::String)
            .named("greeting")
            .with_on_fail_override("on-fail-length", "reask");
        assert_eq!(element.on_fail_for("length"), Some("reask"));
        assert_eq!(element.on_fail_for("lower-case"), None);

        let mut element = element;
        element.on_fail = Some("noop".to_string());
        assert_eq!(element.on_fail_for("lower-case"), Some("noop"));
    }

    #[test]
    fn test_reserved_attributes() {
        assert!(is_reserved_attribute("type", "x"));
        assert!(is_reserved_attribute("date-format", "%Y"));
        assert!(is_reserved_attribute("on-fail", "fix"));
        assert!(is_reserved_attribute("on-fail-length", "reask"));
        assert!(is_reserved_attribute("strict", "true"));
        assert!(!is_reserved_attribute("strict", "maybe"));
        assert!(!is_reserved_attribute("x-owner", "ops"));
    }

    #[test]
    fn test_xml_attributes_order() {
        let mut element = SchemaElement::new(ElementType::Date)
            .named("when")
            .with_description("Due date");
        element.date_format = Some("%Y-%m-%d".to_string());
        element.attributes.insert("x-owner".to_string(), "ops".to_string());

        let names: Vec<String> = element.xml_attributes().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["name", "description", "date-format", "x-owner"]);
        assert!(!element.is_bare());
        assert!(SchemaElement::new(ElementType::Object).is_bare());
    }
}
