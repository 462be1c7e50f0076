//! Field constraint metadata and its interpretation onto a schema node.

use serde_json::{Number, Value};

use crate::error::TagError;
use crate::schema::{Schema, SchemaFormat, SchemaType};

/// Constraint instructions attached to one field.
///
/// Values stay textual until [`apply`] knows the target node type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTags {
    pub description: Option<String>,
    pub format: Option<String>,
    pub pattern: Option<String>,
    /// Pipe-delimited literal values
    pub r#enum: Option<String>,
    pub default: Option<String>,
    pub required: bool,
    /// Lower length or value bound, depending on the node type
    pub min: Option<String>,
    /// Upper length or value bound, depending on the node type
    pub max: Option<String>,
}

impl FieldTags {
    #[must_use]
    pub fn with_description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_format(mut self, value: impl Into<String>) -> Self {
        self.format = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_pattern(mut self, value: impl Into<String>) -> Self {
        self.pattern = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_enum(mut self, value: impl Into<String>) -> Self {
        self.r#enum = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub const fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_min(mut self, value: impl Into<String>) -> Self {
        self.min = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_max(mut self, value: impl Into<String>) -> Self {
        self.max = Some(value.into());
        self
    }

    /// `self` with every value set in `other` taking precedence
    #[must_use]
    pub fn overlay(self, other: Self) -> Self {
        Self {
            description: other.description.or(self.description),
            format: other.format.or(self.format),
            pattern: other.pattern.or(self.pattern),
            r#enum: other.r#enum.or(self.r#enum),
            default: other.default.or(self.default),
            required: other.required || self.required,
            min: other.min.or(self.min),
            max: other.max.or(self.max),
        }
    }

    /// Parse a `key=value;key=value` documentation tag.
    ///
    /// Recognized keys are `description`, `format`, `pattern`, `enum` and
    /// `default`; others are ignored. A segment without `=` is an error.
    pub fn parse_doc(text: &str) -> Result<Self, TagError> {
        let mut tags = Self::default();
        if text.is_empty() {
            return Ok(tags);
        }
        for segment in text.split(';') {
            let Some((key, value)) = segment.split_once('=') else {
                return Err(TagError::Malformed(segment.to_string()));
            };
            let value = Some(value.to_string());
            match key {
                "description" => tags.description = value,
                "format" => tags.format = value,
                "pattern" => tags.pattern = value,
                "enum" => tags.r#enum = value,
                "default" => tags.default = value,
                _ => {}
            }
        }
        Ok(tags)
    }

    /// Parse a validator-style tag such as `required,min=1,max=128`.
    ///
    /// Empty text and `-` carry no constraints. Unknown rules are ignored.
    pub fn parse_validate(text: &str) -> Result<Self, TagError> {
        let mut tags = Self::default();
        if text.is_empty() || text == "-" {
            return Ok(tags);
        }
        for rule in text.split(',') {
            if rule == "required" {
                tags.required = true;
            } else if let Some(value) = rule.strip_prefix("min=") {
                tags.min = Some(value.to_string());
            } else if let Some(value) = rule.strip_prefix("max=") {
                tags.max = Some(value.to_string());
            }
        }
        Ok(tags)
    }
}

/// Encode `tags` onto `schema`.
///
/// Returns whether the field is required. Required-ness belongs to the parent
/// object and is never written onto `schema` itself.
pub fn apply(tags: &FieldTags, schema: &mut Schema) -> Result<bool, TagError> {
    if let Some(description) = &tags.description {
        schema.description = Some(description.clone());
    }
    if let Some(format) = &tags.format {
        let format = format
            .parse::<SchemaFormat>()
            .map_err(|_| TagError::parse(format, "format"))?;
        schema.format = Some(format);
    }
    if let Some(pattern) = &tags.pattern {
        schema.pattern = Some(pattern.clone());
    }
    if let Some(values) = &tags.r#enum {
        schema.r#enum = Some(
            values
                .split('|')
                .map(|v| Value::String(v.to_string()))
                .collect(),
        );
    }
    if let Some(default) = &tags.default {
        schema.default = Some(coerce_default(schema.schema_type, default)?);
    }
    if let Some(min) = &tags.min {
        apply_bound(schema, "min", min, Bound::Lower)?;
    }
    if let Some(max) = &tags.max {
        apply_bound(schema, "max", max, Bound::Upper)?;
    }
    Ok(tags.required)
}

#[derive(Clone, Copy)]
enum Bound {
    Lower,
    Upper,
}

fn apply_bound(
    schema: &mut Schema,
    constraint: &'static str,
    text: &str,
    bound: Bound,
) -> Result<(), TagError> {
    match schema.schema_type {
        Some(SchemaType::String) => {
            let length = text
                .parse::<usize>()
                .map_err(|_| TagError::parse(text, "length"))?;
            match bound {
                Bound::Lower => schema.min_length = Some(length),
                Bound::Upper => schema.max_length = Some(length),
            }
        }
        Some(SchemaType::Integer) => {
            let value = text
                .parse::<i64>()
                .map_err(|_| TagError::parse(text, "integer"))?;
            set_range(schema, value.into(), bound);
        }
        Some(SchemaType::Number) => {
            // Whole bounds keep their integer form
            let value = match text.parse::<i64>() {
                Ok(whole) => Number::from(whole),
                Err(_) => text
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .ok_or_else(|| TagError::parse(text, "number"))?,
            };
            set_range(schema, value, bound);
        }
        other => return Err(TagError::mismatch(constraint, other)),
    }
    Ok(())
}

fn set_range(schema: &mut Schema, value: Number, bound: Bound) {
    match bound {
        Bound::Lower => schema.minimum = Some(value),
        Bound::Upper => schema.maximum = Some(value),
    }
}

fn coerce_default(schema_type: Option<SchemaType>, text: &str) -> Result<Value, TagError> {
    match schema_type {
        Some(SchemaType::Integer) => text
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| TagError::parse(text, "integer")),
        Some(SchemaType::Number) => text
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| TagError::parse(text, "number")),
        Some(SchemaType::Boolean) => match text {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(TagError::parse(text, "boolean")),
        },
        Some(SchemaType::String) => Ok(Value::String(text.to_string())),
        other => Err(TagError::mismatch("default", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_json_snapshot;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn length_bounds_are_numeric() {
        let mut schema = Schema::string();
        let tags = FieldTags::default().with_min("5").with_max("128");

        let required = apply(&tags, &mut schema).unwrap();

        assert!(!required);
        assert_eq!(schema.min_length, Some(5));
        assert_eq!(schema.max_length, Some(128));
        assert_json_snapshot!(schema, @r#"
        {
          "type": "string",
          "maxLength": 128,
          "minLength": 5
        }
        "#);
    }

    #[rstest]
    #[case(Schema::integer(), "1", "10", json!(1), json!(10))]
    #[case(Schema::integer(), "-9007199254740993", "9007199254740993", json!(-9_007_199_254_740_993_i64), json!(9_007_199_254_740_993_i64))]
    #[case(Schema::number(), "0.5", "2.25", json!(0.5), json!(2.25))]
    #[case(Schema::number(), "0", "1e3", json!(0), json!(1000.0))]
    fn range_bounds_follow_node_type(
        #[case] mut schema: Schema,
        #[case] min: &str,
        #[case] max: &str,
        #[case] minimum: Value,
        #[case] maximum: Value,
    ) {
        let tags = FieldTags::default().with_min(min).with_max(max);
        apply(&tags, &mut schema).unwrap();
        assert_eq!(schema.minimum.map(Value::Number), Some(minimum));
        assert_eq!(schema.maximum.map(Value::Number), Some(maximum));
        assert!(schema.min_length.is_none());
    }

    #[rstest]
    #[case(Schema::boolean(), "boolean")]
    #[case(Schema::object(), "object")]
    #[case(Schema::array(Schema::string().into()), "array")]
    fn bounds_on_other_types_are_mismatches(#[case] mut schema: Schema, #[case] type_name: &str) {
        let err = apply(&FieldTags::default().with_max("3"), &mut schema).unwrap_err();
        assert_eq!(
            err,
            TagError::TypeMismatch {
                constraint: "max",
                schema_type: type_name.to_string(),
            }
        );
    }

    #[rstest]
    #[case(Schema::string(), "abc", "length")]
    #[case(Schema::string(), "-1", "length")]
    #[case(Schema::integer(), "1.5", "integer")]
    #[case(Schema::number(), "x", "number")]
    fn unparsable_bounds_name_value_and_target(
        #[case] mut schema: Schema,
        #[case] text: &str,
        #[case] target: &'static str,
    ) {
        let err = apply(&FieldTags::default().with_min(text), &mut schema).unwrap_err();
        assert_eq!(err, TagError::parse(text, target));
    }

    #[rstest]
    #[case(Schema::integer(), "42", serde_json::json!(42))]
    #[case(Schema::number(), "1.5", serde_json::json!(1.5))]
    #[case(Schema::boolean(), "true", serde_json::json!(true))]
    #[case(Schema::boolean(), "false", serde_json::json!(false))]
    #[case(Schema::string(), "hello world", serde_json::json!("hello world"))]
    fn default_is_coerced_to_node_type(
        #[case] mut schema: Schema,
        #[case] text: &str,
        #[case] expected: Value,
    ) {
        apply(&FieldTags::default().with_default(text), &mut schema).unwrap();
        assert_eq!(schema.default, Some(expected));
    }

    #[rstest]
    #[case(Schema::integer(), "ten")]
    #[case(Schema::boolean(), "yes")]
    #[case(Schema::object(), "{}")]
    fn bad_defaults_are_errors(#[case] mut schema: Schema, #[case] text: &str) {
        assert!(apply(&FieldTags::default().with_default(text), &mut schema).is_err());
    }

    #[test]
    fn required_is_reported_not_written() {
        let mut schema = Schema::string();
        let required = apply(&FieldTags::default().with_required(true), &mut schema).unwrap();
        assert!(required);
        assert!(schema.required.is_none());
    }

    #[test]
    fn format_must_be_known() {
        let mut schema = Schema::string();
        apply(&FieldTags::default().with_format("date"), &mut schema).unwrap();
        assert_eq!(schema.format, Some(SchemaFormat::Date));

        let err = apply(&FieldTags::default().with_format("uuid"), &mut schema).unwrap_err();
        assert_eq!(err, TagError::parse("uuid", "format"));
    }

    #[test]
    fn doc_tag_sets_descriptive_fields() {
        let tags =
            FieldTags::parse_doc("description=Book status;enum=draft|published;pattern=^[a-z]+$")
                .unwrap();
        let mut schema = Schema::string();
        apply(&tags, &mut schema).unwrap();

        assert_json_snapshot!(schema, @r#"
        {
          "type": "string",
          "description": "Book status",
          "pattern": "^[a-z]+$",
          "enum": [
            "draft",
            "published"
          ]
        }
        "#);
    }

    #[rstest]
    #[case("description")]
    #[case("format=date;oops")]
    fn doc_tag_rejects_segments_without_value(#[case] text: &str) {
        assert!(matches!(
            FieldTags::parse_doc(text),
            Err(TagError::Malformed(_))
        ));
    }

    #[test]
    fn doc_tag_keeps_equals_in_values() {
        let tags = FieldTags::parse_doc("pattern=^a=b$").unwrap();
        assert_eq!(tags.pattern.as_deref(), Some("^a=b$"));
    }

    #[rstest]
    #[case("", FieldTags::default())]
    #[case("-", FieldTags::default())]
    #[case("required", FieldTags::default().with_required(true))]
    #[case("required,min=1,max=128", FieldTags::default().with_required(true).with_min("1").with_max("128"))]
    #[case("email,max=64", FieldTags::default().with_max("64"))]
    fn validate_tag_table(#[case] text: &str, #[case] expected: FieldTags) {
        assert_eq!(FieldTags::parse_validate(text).unwrap(), expected);
    }
}
