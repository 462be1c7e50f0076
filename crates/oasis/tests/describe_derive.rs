use std::collections::HashMap;

use insta::assert_json_snapshot;
use oasis::engine::key_of;
use oasis::registry::ComponentRegistry;
use oasis::schema::{Schema, SchemaRef, SchemaType};
use oasis::{Describe, InferError, SchemaDoc, SchemaEngine};
use rstest::rstest;
use serde::Serialize;

/// Book info
#[derive(Describe, Serialize, Default)]
struct Book {
    #[oasis(required, min = 1, max = 128)]
    name: String,
    #[oasis(validate = "required,min=1,max=128")]
    author: String,
    #[oasis(doc = "format=date")]
    date: String,
}

#[derive(Describe, Serialize)]
#[oasis(schema_doc)]
struct ReplyError {
    code: String,
    message: String,
}

impl SchemaDoc for ReplyError {
    fn schema_doc() -> Schema {
        Schema::object()
            .with_basic_property(
                "code",
                SchemaType::Integer,
                "Error code of current string, read by program",
                false,
            )
            .with_basic_property(
                "message",
                SchemaType::String,
                "Human friendly message that may help with the problem",
                false,
            )
    }
}

#[derive(Describe, Serialize)]
#[serde(rename_all = "snake_case")]
enum Status {
    InStock,
    OutOfPrint,
    #[serde(skip)]
    #[allow(dead_code)]
    Internal,
}

#[derive(Describe, Serialize)]
struct Isbn(String);

#[derive(Describe, Serialize)]
struct Audit {
    created_by: String,
}

#[derive(Describe, Serialize)]
#[serde(rename_all = "camelCase")]
struct Listing {
    /// Shelf label
    shelf_label: Option<String>,
    status: Status,
    isbn: Isbn,
    #[serde(flatten)]
    audit: Audit,
    #[serde(skip)]
    internal_note: String,
}

#[derive(Describe, Serialize)]
#[serde(rename_all = "snake_case")]
enum FetchError {
    HTTPError,
    NotFound,
}

#[derive(Describe, Serialize)]
#[serde(rename_all = "camelCase")]
enum Format {
    XMLDoc,
    PlainText,
}

#[derive(Describe, Serialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
struct Loan {
    due_date: String,
    #[serde(rename(serialize = "borrower"))]
    member_id: i64,
}

#[derive(Describe, Serialize)]
struct Page<T> {
    items: Vec<T>,
    total: u32,
}

#[derive(Describe)]
struct Flagged {
    #[oasis(min = 1)]
    active: bool,
}

#[derive(Describe)]
struct Ledger {
    #[oasis(min = -9007199254740993, max = 9007199254740993)]
    id: i64,
}

#[derive(Describe)]
struct Counted {
    #[oasis(max = "lots")]
    count: i64,
}

fn to_json(schema: &Schema) -> serde_json::Value {
    serde_json::to_value(schema).unwrap()
}

#[test]
fn book_fields_take_their_tags() {
    let mut registry = ComponentRegistry::new();
    let reference = SchemaEngine::default()
        .resolve(&mut registry, "book", Some(&Book::default()))
        .unwrap();

    assert_eq!(
        reference.as_reference().map(|r| r.ref_path.as_str()),
        Some("#/components/schemas/book")
    );
    assert_json_snapshot!(to_json(registry.get("book").unwrap()), @r#"
    {
      "properties": {
        "author": {
          "maxLength": 128,
          "minLength": 1,
          "type": "string"
        },
        "date": {
          "format": "date",
          "type": "string"
        },
        "name": {
          "maxLength": 128,
          "minLength": 1,
          "type": "string"
        }
      },
      "required": [
        "name",
        "author"
      ],
      "type": "object"
    }
    "#);
}

#[test]
fn empty_map_is_typed_from_its_value_type() {
    let schema = SchemaEngine::default()
        .infer(Some(&HashMap::<String, i64>::new()))
        .unwrap();
    assert_eq!(
        to_json(&schema),
        serde_json::json!({
            "type": "object",
            "additionalProperties": { "type": "integer", "format": "int64" }
        })
    );
}

#[test]
fn schema_doc_types_are_used_verbatim() {
    let reply = ReplyError {
        code: "book_not_found".into(),
        message: "The request book is not found".into(),
    };
    let mut registry = ComponentRegistry::new();
    SchemaEngine::default()
        .resolve(&mut registry, "replyError", Some(&reply))
        .unwrap();
    assert_eq!(registry.get("replyError"), Some(&ReplyError::schema_doc()));
}

#[test]
fn serde_attributes_shape_the_schema() {
    let schema = SchemaEngine::default().infer::<Listing>(None).unwrap();
    assert_json_snapshot!(to_json(&schema), @r#"
    {
      "allOf": [
        {
          "properties": {
            "created_by": {
              "type": "string"
            }
          },
          "type": "object"
        }
      ],
      "properties": {
        "isbn": {
          "type": "string"
        },
        "shelfLabel": {
          "description": "Shelf label",
          "type": "string"
        },
        "status": {
          "enum": [
            "in_stock",
            "out_of_print"
          ],
          "type": "string"
        }
      },
      "type": "object"
    }
    "#);
}

fn enum_values(schema: &Schema) -> Vec<serde_json::Value> {
    schema.r#enum.clone().unwrap_or_default()
}

#[test]
fn enum_values_match_serialized_variants() {
    let engine = SchemaEngine::default();

    let errors = engine.infer::<FetchError>(None).unwrap();
    for value in [FetchError::HTTPError, FetchError::NotFound] {
        let serialized = serde_json::to_value(&value).unwrap();
        assert!(enum_values(&errors).contains(&serialized), "{serialized}");
    }
    assert_eq!(enum_values(&errors), ["h_t_t_p_error", "not_found"]);

    let formats = engine.infer::<Format>(None).unwrap();
    for value in [Format::XMLDoc, Format::PlainText] {
        let serialized = serde_json::to_value(&value).unwrap();
        assert!(enum_values(&formats).contains(&serialized), "{serialized}");
    }
}

#[test]
fn directional_renames_follow_the_serialized_names() {
    let loan = Loan {
        due_date: "2024-01-31".into(),
        member_id: 7,
    };
    let schema = SchemaEngine::default().infer(Some(&loan)).unwrap();
    let serialized = serde_json::to_value(&loan).unwrap();

    let mut names: Vec<&str> = schema
        .properties
        .as_ref()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    let mut expected: Vec<&str> = serialized
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    names.sort_unstable();
    expected.sort_unstable();
    assert_eq!(names, expected);
    assert_eq!(names, ["borrower", "dueDate"]);
}

#[rstest]
#[case(key_of::<Book>(), "describe_derive.Book")]
#[case(key_of::<Box<Book>>(), "describe_derive.Book")]
#[case(key_of::<Vec<Book>>(), "array.describe_derive.Book")]
#[case(key_of::<Vec<Box<Book>>>(), "array.describe_derive.Book")]
#[case(key_of::<Isbn>(), "describe_derive.Isbn")]
#[case(key_of::<Page<Book>>(), "describe_derive.Page[describe_derive.Book]")]
#[case(key_of::<Page<Vec<i32>>>(), "describe_derive.Page[array.int32]")]
fn derived_keys(#[case] key: String, #[case] expected: &str) {
    assert_eq!(key, expected);
}

#[test]
fn derived_keys_share_one_component() {
    let engine = SchemaEngine::default();
    let mut registry = ComponentRegistry::new();
    let book = Book::default();

    let refs = [
        engine.resolve(&mut registry, "", Some(&book)).unwrap(),
        engine.resolve(&mut registry, "", Some(&Box::new(Book::default()))).unwrap(),
        engine.resolve(&mut registry, "", Some(&vec![Book::default()])).unwrap(),
        engine
            .resolve(&mut registry, "", Some(&vec![Box::new(Book::default())]))
            .unwrap(),
    ];

    let keys: Vec<_> = refs
        .iter()
        .map(|r| r.as_reference().and_then(|r| r.key()).unwrap().to_string())
        .collect();
    assert_eq!(
        keys,
        [
            "describe_derive.Book",
            "describe_derive.Book",
            "array.describe_derive.Book",
            "array.describe_derive.Book",
        ]
    );
    assert_eq!(registry.len(), 2);
}

#[test]
fn generic_struct_infers_its_argument() {
    let schema = SchemaEngine::default().infer::<Page<Isbn>>(None).unwrap();
    let items = schema
        .property("items")
        .and_then(SchemaRef::as_inline)
        .unwrap();
    assert_eq!(items.schema_type, Some(SchemaType::Array));
    let total = schema
        .property("total")
        .and_then(SchemaRef::as_inline)
        .unwrap();
    assert_eq!(total.schema_type, Some(SchemaType::Integer));
}

#[test]
fn integer_bounds_beyond_f64_precision_stay_exact() {
    let schema = SchemaEngine::default().infer::<Ledger>(None).unwrap();
    let id = schema.property("id").and_then(SchemaRef::as_inline).unwrap();
    assert_eq!(
        to_json(id),
        serde_json::json!({
            "type": "integer",
            "format": "int64",
            "minimum": -9_007_199_254_740_993_i64,
            "maximum": 9_007_199_254_740_993_i64
        })
    );
}

#[test]
fn bound_on_boolean_names_the_field() {
    let err = SchemaEngine::default().infer::<Flagged>(None).unwrap_err();
    assert!(matches!(
        err,
        InferError::ConstraintTypeMismatch { ref path, constraint: "min", .. } if path == "active"
    ));
}

#[test]
fn unparsable_bound_names_the_field() {
    let err = SchemaEngine::default().infer::<Counted>(None).unwrap_err();
    assert!(matches!(
        err,
        InferError::ConstraintParseFailure { ref path, ref value, target: "integer" }
            if path == "count" && value == "lots"
    ));
}
