//! Parameter helpers that need schema inference

use oasis_core::route::Parameter;
use oasis_core::schema::SchemaType;
use oasis_core::{Describe, Schema, SchemaEngine};
use serde::Serialize;

use crate::error::Result;

/// Query parameter typed after `example`, which is also kept as the
/// parameter's example. Struct, sequence and map examples are typed
/// `object`; no format is carried.
pub fn query_param<V: Describe + Serialize + ?Sized>(
    name: &str,
    description: &str,
    example: &V,
) -> Result<Parameter> {
    typed_query_param(SchemaEngine::default(), name, description, example)
}

pub(crate) fn typed_query_param<V: Describe + Serialize + ?Sized>(
    engine: SchemaEngine,
    name: &str,
    description: &str,
    example: &V,
) -> Result<Parameter> {
    let inferred = engine.infer(Some(example))?;
    let schema_type = match inferred.schema_type {
        Some(
            scalar @ (SchemaType::String
            | SchemaType::Integer
            | SchemaType::Number
            | SchemaType::Boolean),
        ) => scalar,
        _ => SchemaType::Object,
    };
    Ok(Parameter::query(name, description)
        .with_schema(Schema {
            schema_type: Some(schema_type),
            ..Schema::default()
        })
        .with_example(serde_json::to_value(example)?))
}

/// Schema helpers for [`Parameter`].
pub trait ParameterExt: Sized {
    /// Use the inline schema inferred for `T`
    fn with_struct<T: Describe + ?Sized>(self, sample: Option<&T>) -> Result<Self>;
}

impl ParameterExt for Parameter {
    fn with_struct<T: Describe + ?Sized>(self, sample: Option<&T>) -> Result<Self> {
        let schema = SchemaEngine::default().infer(sample)?;
        Ok(self.with_schema(schema))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use oasis_core::route::ParameterLocation;

    use super::*;

    #[test]
    fn query_param_takes_scalar_type_from_example() {
        let param = query_param("limit", "Page size", &20_i64).unwrap();
        assert_eq!(
            serde_json::to_value(&param).unwrap(),
            serde_json::json!({
                "name": "limit",
                "in": "query",
                "description": "Page size",
                "schema": { "type": "integer" },
                "example": 20
            })
        );
    }

    #[test]
    fn query_param_types_containers_as_object() {
        let param = query_param("ids", "", &vec![1_i32, 2]).unwrap();
        let schema = param.schema.and_then(|s| s.as_inline().cloned()).unwrap();
        assert_eq!(schema.schema_type, Some(SchemaType::Object));
        assert!(schema.items.is_none());
        assert_eq!(param.example, Some(serde_json::json!([1, 2])));

        let param = query_param("filter", "", &BTreeMap::from([("a", 1_i64)])).unwrap();
        assert_eq!(
            serde_json::to_value(param.schema.unwrap()).unwrap(),
            serde_json::json!({ "type": "object" })
        );
    }

    #[test]
    fn with_struct_inlines_inferred_schema() {
        let param = Parameter::new(ParameterLocation::Query, "filter", "")
            .required()
            .with_struct::<BTreeMap<String, bool>>(None)
            .unwrap();
        assert_eq!(param.required, Some(true));
        assert_eq!(
            serde_json::to_value(param.schema.unwrap()).unwrap(),
            serde_json::json!({
                "type": "object",
                "additionalProperties": { "type": "boolean" }
            })
        );
    }
}
