//! Field naming for the two JSON dialects

/// Every field name either JSON dialect reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Type,
    Name,
    Description,
    Strict,
    DateFormat,
    TimeFormat,
    OnFail,
    /// Legacy single-handler tag, read but never written
    OnFailTag,
    OnFails,
    ValidatorTag,
    Method,
    Model,
    Attributes,
    Element,
    Formatters,
    Children,
    Plugins,
    Schema,
    InputSchema,
    OutputSchema,
    Instructions,
    Prompt,
    Script,
    Language,
    Source,
    /// Legacy name of a script's source
    Text,
    Version,
    Railspec,
    NumReasks,
    Owner,
    IsPublic,
}

impl Key {
    /// Persisted (snake_case) name
    pub fn snake(self) -> &'static str {
        match self {
            Key::Type => "type",
            Key::Name => "name",
            Key::Description => "description",
            Key::Strict => "strict",
            Key::DateFormat => "date_format",
            Key::TimeFormat => "time_format",
            Key::OnFail => "on_fail",
            Key::OnFailTag => "on_fail_tag",
            Key::OnFails => "on_fails",
            Key::ValidatorTag => "validator_tag",
            Key::Method => "method",
            Key::Model => "model",
            Key::Attributes => "attributes",
            Key::Element => "element",
            Key::Formatters => "formatters",
            Key::Children => "children",
            Key::Plugins => "plugins",
            Key::Schema => "schema",
            Key::InputSchema => "input_schema",
            Key::OutputSchema => "output_schema",
            Key::Instructions => "instructions",
            Key::Prompt => "prompt",
            Key::Script => "script",
            Key::Language => "language",
            Key::Source => "source",
            Key::Text => "text",
            Key::Version => "version",
            Key::Railspec => "railspec",
            Key::NumReasks => "num_reasks",
            Key::Owner => "owner",
            Key::IsPublic => "is_public",
        }
    }

    /// Wire (camelCase) name
    pub fn camel(self) -> &'static str {
        match self {
            Key::DateFormat => "dateFormat",
            Key::TimeFormat => "timeFormat",
            Key::OnFail => "onFail",
            Key::OnFailTag => "onFailTag",
            Key::OnFails => "onFails",
            Key::ValidatorTag => "validatorTag",
            Key::InputSchema => "inputSchema",
            Key::OutputSchema => "outputSchema",
            Key::NumReasks => "numReasks",
            Key::IsPublic => "isPublic",
            other => other.snake(),
        }
    }
}

/// Keys that mark a map as a node rather than a map of named fields.
/// Element keys are included because legacy documents flatten the element
/// into the node.
pub const NODE_KEYS: &[Key] = &[
    Key::Type,
    Key::Name,
    Key::Description,
    Key::Strict,
    Key::DateFormat,
    Key::TimeFormat,
    Key::OnFail,
    Key::OnFailTag,
    Key::OnFails,
    Key::Model,
    Key::Formatters,
    Key::Element,
    Key::Children,
    Key::Plugins,
];

/// A JSON naming convention
pub trait Dialect {
    /// Short name used in logs and CLI output
    const NAME: &'static str;

    /// Name of a field in this dialect
    fn key(key: Key) -> &'static str;

    /// Whether `name` is one of this dialect's node keys
    fn is_node_key(name: &str) -> bool {
        NODE_KEYS.iter().any(|key| Self::key(*key) == name)
    }
}

/// snake_case names used by guard storage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnakeCase;

impl Dialect for SnakeCase {
    const NAME: &'static str = "dict";

    fn key(key: Key) -> &'static str {
        key.snake()
    }
}

/// camelCase names used by the HTTP API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CamelCase;

impl Dialect for CamelCase {
    const NAME: &'static str = "wire";

    fn key(key: Key) -> &'static str {
        key.camel()
    }
}
