//! Schema-related structure definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::route::{Header, Parameter};

/// Path prefix under which registered component schemas live.
pub const COMPONENT_SCHEMA_PREFIX: &str = "#/components/schemas/";

/// Schema reference or inline schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaRef {
    /// Schema reference (e.g., "#/components/schemas/User")
    Ref(Reference),
    /// Inline schema
    Inline(Box<Schema>),
}

impl SchemaRef {
    /// Empty inline node, rendered as `{}`.
    ///
    /// Used where an operation carries no payload schema.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::Inline(Box::default())
    }

    /// Wrap a schema as an inline node
    #[must_use]
    pub fn inline(schema: Schema) -> Self {
        Self::Inline(Box::new(schema))
    }

    /// The reference, if this node is a pointer
    #[must_use]
    pub const fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Ref(reference) => Some(reference),
            Self::Inline(_) => None,
        }
    }

    /// The inline schema, if this node is not a pointer
    #[must_use]
    pub fn as_inline(&self) -> Option<&Schema> {
        match self {
            Self::Ref(_) => None,
            Self::Inline(schema) => Some(schema),
        }
    }

    /// Whether this is the empty placeholder node
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Inline(schema) if **schema == Schema::default())
    }
}

impl From<Schema> for SchemaRef {
    fn from(schema: Schema) -> Self {
        Self::inline(schema)
    }
}

impl From<Reference> for SchemaRef {
    fn from(reference: Reference) -> Self {
        Self::Ref(reference)
    }
}

/// Reference definition
///
/// Serializes as a single `$ref` field. The registry key it was created from
/// is carried along for lookups but never rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Reference path (e.g., "#/components/schemas/User")
    #[serde(rename = "$ref")]
    pub ref_path: String,
    #[serde(skip)]
    key: Option<String>,
}

impl Reference {
    /// Create a new reference
    #[must_use]
    pub const fn new(ref_path: String) -> Self {
        Self {
            ref_path,
            key: None,
        }
    }

    /// Create a component schema reference
    #[must_use]
    pub fn schema(key: &str) -> Self {
        Self {
            ref_path: format!("{COMPONENT_SCHEMA_PREFIX}{key}"),
            key: Some(key.to_string()),
        }
    }

    /// Registry key this reference points at.
    ///
    /// Falls back to the tail of the `$ref` path for references that were
    /// deserialized rather than handed out by a registry.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key
            .as_deref()
            .or_else(|| self.ref_path.strip_prefix(COMPONENT_SCHEMA_PREFIX))
    }
}

/// JSON Schema type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl SchemaType {
    /// Name as it appears in a rendered document
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data type format.
///
/// Only the formats defined by the `OpenAPI` 3.0 data type table are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaFormat {
    Int32,
    Int64,
    Float,
    Double,
    Byte,
    Binary,
    Date,
    DateTime,
    Password,
}

impl SchemaFormat {
    /// Name as it appears in a rendered document
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float => "float",
            Self::Double => "double",
            Self::Byte => "byte",
            Self::Binary => "binary",
            Self::Date => "date",
            Self::DateTime => "date-time",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for SchemaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "int32" => Ok(Self::Int32),
            "int64" => Ok(Self::Int64),
            "float" => Ok(Self::Float),
            "double" => Ok(Self::Double),
            "byte" => Ok(Self::Byte),
            "binary" => Ok(Self::Binary),
            "date" => Ok(Self::Date),
            "date-time" => Ok(Self::DateTime),
            "password" => Ok(Self::Password),
            other => Err(format!("unknown schema format: {other}")),
        }
    }
}

/// The `required` keyword.
///
/// A schema either marks itself required as a whole or lists the properties
/// it requires. Both forms cannot coexist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequiredSpec {
    /// `required: true` / `required: false`
    AllOrNone(bool),
    /// `required: ["name", ...]`, in declaration order
    Named(Vec<String>),
}

impl RequiredSpec {
    /// Property names listed as required; empty for the boolean form
    #[must_use]
    pub fn names(&self) -> &[String] {
        match self {
            Self::AllOrNone(_) => &[],
            Self::Named(names) => names,
        }
    }
}

/// JSON Schema definition
///
/// Child slots hold [`SchemaRef`], so every nested node is either an inline
/// shape or a `$ref` pointer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Schema type
    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    /// Format (for numbers or strings)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<SchemaFormat>,

    /// All conditions must be satisfied (AND)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<SchemaRef>>,
    /// Exactly one condition must be satisfied (XOR)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<SchemaRef>>,
    /// At least one condition must be satisfied (OR)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<SchemaRef>>,
    /// Condition must not be satisfied (NOT)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<SchemaRef>>,

    /// Array item schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaRef>>,
    /// Property definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaRef>>,
    /// Schema of values in a string-keyed map
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SchemaRef>>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    // Number constraints
    /// Maximum value; integer bounds stay exact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<serde_json::Number>,
    /// Minimum value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<serde_json::Number>,

    // String constraints
    /// Maximum length
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Minimum length
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Pattern (regex)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Required flag or list of required properties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<RequiredSpec>,
    /// Enum values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#enum: Option<Vec<serde_json::Value>>,
}

impl Schema {
    /// Create a new schema
    #[must_use]
    pub fn new(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    /// Create a string schema
    #[must_use]
    pub fn string() -> Self {
        Self::new(SchemaType::String)
    }

    /// Create an integer schema
    #[must_use]
    pub fn integer() -> Self {
        Self::new(SchemaType::Integer)
    }

    /// Create a number schema
    #[must_use]
    pub fn number() -> Self {
        Self::new(SchemaType::Number)
    }

    /// Create a boolean schema
    #[must_use]
    pub fn boolean() -> Self {
        Self::new(SchemaType::Boolean)
    }

    /// Create an array schema
    #[must_use]
    pub fn array(items: SchemaRef) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::new(SchemaType::Array)
        }
    }

    /// Create an object schema
    #[must_use]
    pub fn object() -> Self {
        Self::new(SchemaType::Object)
    }

    /// Create an object schema for a string-keyed map
    #[must_use]
    pub fn map(values: SchemaRef) -> Self {
        Self {
            additional_properties: Some(Box::new(values)),
            ..Self::object()
        }
    }

    /// Set the format
    #[must_use]
    pub const fn with_format(mut self, format: SchemaFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a property, listing it as required when asked
    #[must_use]
    pub fn with_property(mut self, name: &str, required: bool, prop: impl Into<SchemaRef>) -> Self {
        self.insert_property(name, required, prop.into());
        self
    }

    /// Add a scalar property with a description
    #[must_use]
    pub fn with_basic_property(
        self,
        name: &str,
        schema_type: SchemaType,
        description: &str,
        required: bool,
    ) -> Self {
        self.with_property(
            name,
            required,
            Self::new(schema_type).with_description(description),
        )
    }

    /// Mark the whole schema required (or not), replacing any property list
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(RequiredSpec::AllOrNone(required));
        self
    }

    /// Set array items
    #[must_use]
    pub fn with_items(mut self, items: impl Into<SchemaRef>) -> Self {
        self.items = Some(Box::new(items.into()));
        self
    }

    /// Append alternatives to `oneOf`
    #[must_use]
    pub fn with_one_of(mut self, alternatives: impl IntoIterator<Item = SchemaRef>) -> Self {
        self.one_of
            .get_or_insert_with(Vec::new)
            .extend(alternatives);
        self
    }

    /// Append alternatives to `anyOf`
    #[must_use]
    pub fn with_any_of(mut self, alternatives: impl IntoIterator<Item = SchemaRef>) -> Self {
        self.any_of
            .get_or_insert_with(Vec::new)
            .extend(alternatives);
        self
    }

    /// Append a member to `allOf`
    #[must_use]
    pub fn with_all_of(mut self, member: impl Into<SchemaRef>) -> Self {
        self.all_of.get_or_insert_with(Vec::new).push(member.into());
        self
    }

    /// Set the negated schema
    #[must_use]
    pub fn with_not(mut self, not: impl Into<SchemaRef>) -> Self {
        self.not = Some(Box::new(not.into()));
        self
    }

    /// Insert a property in place.
    ///
    /// A required property is appended to the named required list. A boolean
    /// `required` already present is replaced by the list.
    pub fn insert_property(&mut self, name: &str, required: bool, prop: SchemaRef) {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), prop);
        if required {
            self.push_required(name);
        }
    }

    /// Append a name to the required list
    pub fn push_required(&mut self, name: &str) {
        match &mut self.required {
            Some(RequiredSpec::Named(names)) => {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
            slot => *slot = Some(RequiredSpec::Named(vec![name.to_string()])),
        }
    }

    /// Look up an inline or referenced property by name
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&SchemaRef> {
        self.properties.as_ref()?.get(name)
    }

    /// Required property names; empty when none or when `required` is boolean
    #[must_use]
    pub fn required_names(&self) -> &[String] {
        self.required.as_ref().map_or(&[], RequiredSpec::names)
    }

    /// Check that the schema is internally consistent.
    ///
    /// Returns the reason for the first inconsistency found. Inline children
    /// are checked recursively; references are not followed.
    pub fn validate_shape(&self) -> Result<(), String> {
        let kind = self.schema_type;

        if self.items.is_some() && kind.is_some_and(|k| k != SchemaType::Array) {
            return Err(format!("`items` on a schema of type {}", kind_name(kind)));
        }
        if (self.properties.is_some() || self.additional_properties.is_some())
            && kind.is_some_and(|k| k != SchemaType::Object)
        {
            return Err(format!(
                "object keywords on a schema of type {}",
                kind_name(kind)
            ));
        }
        if (self.min_length.is_some() || self.max_length.is_some())
            && kind.is_some_and(|k| k != SchemaType::String)
        {
            return Err(format!(
                "length bounds on a schema of type {}",
                kind_name(kind)
            ));
        }
        if (self.minimum.is_some() || self.maximum.is_some())
            && kind.is_some_and(|k| !matches!(k, SchemaType::Integer | SchemaType::Number))
        {
            return Err(format!(
                "range bounds on a schema of type {}",
                kind_name(kind)
            ));
        }
        for (keyword, list) in [
            ("allOf", &self.all_of),
            ("oneOf", &self.one_of),
            ("anyOf", &self.any_of),
        ] {
            if list.as_ref().is_some_and(Vec::is_empty) {
                return Err(format!("`{keyword}` has no alternatives"));
            }
        }
        if self.r#enum.as_ref().is_some_and(Vec::is_empty) {
            return Err("`enum` has no values".to_string());
        }
        if let Some(RequiredSpec::Named(names)) = &self.required {
            for name in names {
                let declared = self
                    .properties
                    .as_ref()
                    .is_some_and(|props| props.contains_key(name));
                if !declared && self.all_of.is_none() {
                    return Err(format!("required property `{name}` is not declared"));
                }
            }
        }

        let children = self
            .all_of
            .iter()
            .chain(self.one_of.iter())
            .chain(self.any_of.iter())
            .flatten()
            .chain(self.not.as_deref())
            .chain(self.items.as_deref())
            .chain(self.properties.iter().flat_map(BTreeMap::values))
            .chain(self.additional_properties.as_deref());
        for child in children {
            if let SchemaRef::Inline(schema) = child {
                schema.validate_shape()?;
            }
        }
        Ok(())
    }
}

fn kind_name(kind: Option<SchemaType>) -> &'static str {
    kind.map_or("<untyped>", SchemaType::as_str)
}

/// `OpenAPI` Components (reusable components)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Schema definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<BTreeMap<String, Schema>>,
    /// Parameter definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, Parameter>>,
    /// Header definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, Header>>,
}
