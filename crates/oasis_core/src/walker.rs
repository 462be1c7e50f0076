//! Structural schema inference over type descriptors.

use crate::config::InferenceConfig;
use crate::describe::{Describe, FieldDescriptor, ScalarKind, Shape, TypeDescriptor};
use crate::error::{InferError, Result};
use crate::schema::{Schema, SchemaFormat};
use crate::tags;

/// Infer the schema of `T` with the default configuration.
pub fn infer<T: Describe + ?Sized>(sample: Option<&T>) -> Result<Schema> {
    Walker::new(InferenceConfig::default()).infer(T::describe(sample))
}

/// Walks one descriptor tree, tracking depth and the current field path.
#[derive(Debug)]
pub struct Walker {
    config: InferenceConfig,
    path: Vec<String>,
    depth: usize,
}

impl Walker {
    #[must_use]
    pub const fn new(config: InferenceConfig) -> Self {
        Self {
            config,
            path: Vec::new(),
            depth: 0,
        }
    }

    pub fn infer(&mut self, descriptor: TypeDescriptor<'_>) -> Result<Schema> {
        self.path.clear();
        self.depth = 0;
        self.walk(descriptor)
    }

    fn walk(&mut self, descriptor: TypeDescriptor<'_>) -> Result<Schema> {
        if self.depth >= self.config.max_depth {
            return Err(InferError::RecursionLimit {
                path: self.path_string(),
                limit: self.config.max_depth,
            });
        }
        self.depth += 1;
        tracing::trace!(path = %self.path_string(), depth = self.depth, "walking type descriptor");
        let result = self.walk_shape(descriptor.shape);
        self.depth -= 1;
        result
    }

    fn walk_shape(&mut self, shape: Shape<'_>) -> Result<Schema> {
        match shape {
            Shape::SelfDescribed(schema) => {
                self.check_self_described(&schema)?;
                Ok(schema)
            }
            Shape::Scalar(kind) => Ok(scalar_schema(kind)),
            Shape::Struct(fields) => self.walk_struct(fields),
            Shape::Sequence(element) => {
                let items = self.nested("[]", |walker| walker.walk(element.get()))?;
                Ok(Schema::array(items.into()))
            }
            Shape::Map(value) => {
                let values = self.nested("{}", |walker| walker.walk(value.get()))?;
                Ok(Schema::map(values.into()))
            }
            Shape::Optional(inner) => self.walk(inner.get()),
            Shape::Opaque => Ok(Schema::object()),
        }
    }

    fn walk_struct(&mut self, fields: Vec<FieldDescriptor<'_>>) -> Result<Schema> {
        let mut schema = Schema::object();
        for field in fields {
            if field.omit || field.name.is_empty() {
                continue;
            }
            let name = field.name.to_string();
            self.nested(&name, |walker| walker.walk_field(&mut schema, &field))?;
        }
        Ok(schema)
    }

    fn walk_field(&mut self, parent: &mut Schema, field: &FieldDescriptor<'_>) -> Result<()> {
        let mut child = self.walk(field.ty.get())?;
        if field.inline {
            parent.all_of.get_or_insert_with(Vec::new).push(child.into());
            return Ok(());
        }
        let path = self.path_string();
        let field_tags = field.resolved_tags().map_err(|e| e.at(&path))?;
        let required = tags::apply(&field_tags, &mut child).map_err(|e| e.at(&path))?;
        parent.insert_property(&field.name, required, child.into());
        Ok(())
    }

    fn check_self_described(&self, schema: &Schema) -> Result<()> {
        let has_shape = schema.schema_type.is_some()
            || schema.all_of.is_some()
            || schema.one_of.is_some()
            || schema.any_of.is_some()
            || schema.not.is_some();
        let verdict = if has_shape {
            schema.validate_shape()
        } else {
            Err("self-described schema has neither a type nor a composition".to_string())
        };
        verdict.map_err(|reason| InferError::UnsupportedShape {
            path: self.path_string(),
            reason,
        })
    }

    fn nested<R>(&mut self, segment: &str, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        self.path.push(segment.to_string());
        let result = f(self);
        self.path.pop();
        result
    }

    fn path_string(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            if !out.is_empty() && !segment.starts_with(['[', '{']) {
                out.push('.');
            }
            out.push_str(segment);
        }
        out
    }
}

fn scalar_schema(kind: ScalarKind) -> Schema {
    match kind {
        ScalarKind::Int32 => Schema::integer().with_format(SchemaFormat::Int32),
        ScalarKind::Int64 => Schema::integer().with_format(SchemaFormat::Int64),
        ScalarKind::Number => Schema::number(),
        ScalarKind::String => Schema::string(),
        ScalarKind::Boolean => Schema::boolean(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use super::*;
    use crate::describe::{Nested, SchemaDoc};
    use crate::schema::{RequiredSpec, SchemaRef, SchemaType};
    use crate::tags::FieldTags;
    use insta::assert_json_snapshot;
    use rstest::rstest;

    struct Book {
        name: String,
        author: String,
        date: String,
    }

    impl Describe for Book {
        fn describe<'a>(sample: Option<&'a Self>) -> TypeDescriptor<'a> {
            TypeDescriptor::named(
                module_path!(),
                "Book",
                Shape::Struct(vec![
                    FieldDescriptor::new("name", Nested::of(sample.map(|b| &b.name)))
                        .with_validate_tag("required,max=128"),
                    FieldDescriptor::new("author", Nested::of(sample.map(|b| &b.author)))
                        .with_tags(FieldTags::default().with_required(true).with_max("128")),
                    FieldDescriptor::new("date", Nested::of(sample.map(|b| &b.date)))
                        .with_doc_tag("format=date"),
                ]),
            )
        }
    }

    struct Audit {
        created_by: String,
    }

    impl Describe for Audit {
        fn describe<'a>(sample: Option<&'a Self>) -> TypeDescriptor<'a> {
            TypeDescriptor::named(
                module_path!(),
                "Audit",
                Shape::Struct(vec![FieldDescriptor::new(
                    "createdBy",
                    Nested::of(sample.map(|a| &a.created_by)),
                )]),
            )
        }
    }

    struct Shelf {
        label: Option<String>,
        books: Vec<Book>,
        audit: Audit,
        secret: String,
    }

    impl Describe for Shelf {
        fn describe<'a>(sample: Option<&'a Self>) -> TypeDescriptor<'a> {
            TypeDescriptor::named(
                module_path!(),
                "Shelf",
                Shape::Struct(vec![
                    FieldDescriptor::new("label", Nested::of(sample.map(|s| &s.label))),
                    FieldDescriptor::new("books", Nested::of(sample.map(|s| &s.books))),
                    FieldDescriptor::new("audit", Nested::of(sample.map(|s| &s.audit))).inline(),
                    FieldDescriptor::new("secret", Nested::of(sample.map(|s| &s.secret)))
                        .omitted(),
                ]),
            )
        }
    }

    struct Node {
        children: Vec<Node>,
    }

    impl Describe for Node {
        fn describe<'a>(sample: Option<&'a Self>) -> TypeDescriptor<'a> {
            TypeDescriptor::named(
                module_path!(),
                "Node",
                Shape::Struct(vec![FieldDescriptor::new(
                    "children",
                    Nested::of(sample.map(|n| &n.children)),
                )]),
            )
        }
    }

    struct ReplyError;

    impl SchemaDoc for ReplyError {
        fn schema_doc() -> Schema {
            Schema::object()
                .with_basic_property("code", SchemaType::Integer, "error code", true)
                .with_basic_property("message", SchemaType::String, "error message", true)
        }
    }

    impl Describe for ReplyError {
        fn describe<'a>(_: Option<&'a Self>) -> TypeDescriptor<'a> {
            TypeDescriptor::named(
                module_path!(),
                "ReplyError",
                Shape::SelfDescribed(Self::schema_doc()),
            )
        }
    }

    struct Broken;

    impl Describe for Broken {
        fn describe<'a>(_: Option<&'a Self>) -> TypeDescriptor<'a> {
            TypeDescriptor::anonymous(Shape::SelfDescribed(Schema {
                max_length: Some(3),
                ..Schema::integer()
            }))
        }
    }

    struct Holder {
        broken: Broken,
    }

    impl Describe for Holder {
        fn describe<'a>(sample: Option<&'a Self>) -> TypeDescriptor<'a> {
            TypeDescriptor::anonymous(Shape::Struct(vec![FieldDescriptor::new(
                "broken",
                Nested::of(sample.map(|h| &h.broken)),
            )]))
        }
    }

    struct Flagged {
        active: bool,
    }

    impl Describe for Flagged {
        fn describe<'a>(sample: Option<&'a Self>) -> TypeDescriptor<'a> {
            TypeDescriptor::anonymous(Shape::Struct(vec![
                FieldDescriptor::new("active", Nested::of(sample.map(|f| &f.active)))
                    .with_validate_tag("min=1"),
            ]))
        }
    }

    fn kind_and_format(schema: &Schema) -> (Option<SchemaType>, Option<SchemaFormat>) {
        (schema.schema_type, schema.format)
    }

    #[rstest]
    #[case(infer::<i32>(None), SchemaType::Integer, Some(SchemaFormat::Int32))]
    #[case(infer::<i64>(None), SchemaType::Integer, Some(SchemaFormat::Int64))]
    #[case(infer::<u8>(None), SchemaType::Integer, Some(SchemaFormat::Int64))]
    #[case(infer::<f32>(None), SchemaType::Number, None)]
    #[case(infer::<f64>(None), SchemaType::Number, None)]
    #[case(infer::<String>(None), SchemaType::String, None)]
    #[case(infer::<bool>(None), SchemaType::Boolean, None)]
    #[case(infer::<serde_json::Value>(None), SchemaType::Object, None)]
    #[case(infer::<Option<Box<i32>>>(None), SchemaType::Integer, Some(SchemaFormat::Int32))]
    fn scalar_mapping_table(
        #[case] schema: Result<Schema>,
        #[case] kind: SchemaType,
        #[case] format: Option<SchemaFormat>,
    ) {
        assert_eq!(kind_and_format(&schema.unwrap()), (Some(kind), format));
    }

    #[test]
    fn book_scenario() {
        let schema = infer::<Book>(None).unwrap();

        assert_eq!(
            schema.required,
            Some(RequiredSpec::Named(vec!["name".into(), "author".into()]))
        );
        let date = schema.property("date").and_then(SchemaRef::as_inline).unwrap();
        assert_eq!(date.format, Some(SchemaFormat::Date));
        assert!(date.max_length.is_none() && date.min_length.is_none());

        assert_json_snapshot!(schema, @r#"
        {
          "type": "object",
          "properties": {
            "author": {
              "type": "string",
              "maxLength": 128
            },
            "date": {
              "type": "string",
              "format": "date"
            },
            "name": {
              "type": "string",
              "maxLength": 128
            }
          },
          "required": [
            "name",
            "author"
          ]
        }
        "#);
    }

    #[test]
    fn struct_fields_follow_markers() {
        let schema = infer::<Shelf>(None).unwrap();

        assert_json_snapshot!(schema, @r#"
        {
          "type": "object",
          "allOf": [
            {
              "type": "object",
              "properties": {
                "createdBy": {
                  "type": "string"
                }
              }
            }
          ],
          "properties": {
            "books": {
              "type": "array",
              "items": {
                "type": "object",
                "properties": {
                  "author": {
                    "type": "string",
                    "maxLength": 128
                  },
                  "date": {
                    "type": "string",
                    "format": "date"
                  },
                  "name": {
                    "type": "string",
                    "maxLength": 128
                  }
                },
                "required": [
                  "name",
                  "author"
                ]
              }
            },
            "label": {
              "type": "string"
            }
          }
        }
        "#);
    }

    #[test]
    fn empty_map_still_types_its_values() {
        let empty: HashMap<String, i64> = HashMap::new();
        let schema = infer(Some(&empty)).unwrap();

        assert_eq!(schema.schema_type, Some(SchemaType::Object));
        let values = schema
            .additional_properties
            .as_deref()
            .and_then(SchemaRef::as_inline)
            .unwrap();
        assert_eq!(
            kind_and_format(values),
            (Some(SchemaType::Integer), Some(SchemaFormat::Int64))
        );
    }

    #[test]
    fn map_of_structs_uses_first_value() {
        let mut shelves = BTreeMap::new();
        shelves.insert(
            "a".to_string(),
            Audit {
                created_by: "me".into(),
            },
        );
        let schema = infer(Some(&shelves)).unwrap();
        let values = schema
            .additional_properties
            .as_deref()
            .and_then(SchemaRef::as_inline)
            .unwrap();
        assert!(values.property("createdBy").is_some());
    }

    #[test]
    fn self_described_schema_is_returned_verbatim() {
        let schema = infer::<ReplyError>(None).unwrap();
        assert_eq!(schema, ReplyError::schema_doc());
    }

    #[test]
    fn malformed_self_description_names_field_path() {
        let err = infer::<Holder>(None).unwrap_err();
        match err {
            InferError::UnsupportedShape { path, reason } => {
                assert_eq!(path, "broken");
                assert!(reason.contains("length"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn constraint_on_wrong_type_names_field_path() {
        let err = infer::<Flagged>(None).unwrap_err();
        assert_eq!(
            err,
            InferError::ConstraintTypeMismatch {
                path: "active".into(),
                constraint: "min",
                schema_type: "boolean".into(),
            }
        );
    }

    #[test]
    fn recursive_type_hits_depth_limit() {
        let mut walker = Walker::new(InferenceConfig { max_depth: 5 });
        let err = walker.infer(Node::describe(None)).unwrap_err();

        match err {
            InferError::RecursionLimit { path, limit } => {
                assert_eq!(limit, 5);
                assert!(path.starts_with("children[]"), "{path}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn walker_is_reusable_after_failure() {
        let mut walker = Walker::new(InferenceConfig { max_depth: 5 });
        assert!(walker.infer(Node::describe(None)).is_err());
        let schema = walker.infer(Book::describe(None)).unwrap();
        assert_eq!(schema.required_names(), ["name", "author"]);
    }
}
