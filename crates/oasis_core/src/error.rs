//! Errors raised while inferring and registering schemas.

use thiserror::Error;

use crate::schema::SchemaType;

/// Result alias for inference operations.
pub type Result<T, E = InferError> = std::result::Result<T, E>;

/// Failure of a single inference or registration step.
///
/// `path` is the dotted field path from the root type down to the node that
/// failed; it is empty for the root itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferError {
    #[error("unsupported shape at `{path}`: {reason}")]
    UnsupportedShape { path: String, reason: String },

    #[error("constraint `{constraint}` at `{path}` does not apply to a schema of type {schema_type}")]
    ConstraintTypeMismatch {
        path: String,
        constraint: &'static str,
        schema_type: String,
    },

    #[error("cannot parse `{value}` as {target} at `{path}`")]
    ConstraintParseFailure {
        path: String,
        value: String,
        target: &'static str,
    },

    #[error("schema `{key}` is already registered")]
    DuplicateRegistration { key: String },

    #[error("recursion limit of {limit} exceeded at `{path}`")]
    RecursionLimit { path: String, limit: usize },
}

/// Tag interpretation failure, before a field path is known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("constraint `{constraint}` does not apply to a schema of type {schema_type}")]
    TypeMismatch {
        constraint: &'static str,
        schema_type: String,
    },

    #[error("cannot parse `{value}` as {target}")]
    Parse { value: String, target: &'static str },

    #[error("malformed tag segment `{0}`")]
    Malformed(String),
}

impl TagError {
    pub(crate) fn mismatch(constraint: &'static str, schema_type: Option<SchemaType>) -> Self {
        Self::TypeMismatch {
            constraint,
            schema_type: schema_type.map_or_else(|| "<untyped>".to_string(), |t| t.to_string()),
        }
    }

    pub(crate) fn parse(value: &str, target: &'static str) -> Self {
        Self::Parse {
            value: value.to_string(),
            target,
        }
    }

    /// Attach the field path the tag was found on
    #[must_use]
    pub fn at(self, path: &str) -> InferError {
        let path = path.to_string();
        match self {
            Self::TypeMismatch {
                constraint,
                schema_type,
            } => InferError::ConstraintTypeMismatch {
                path,
                constraint,
                schema_type,
            },
            Self::Parse { value, target } => InferError::ConstraintParseFailure {
                path,
                value,
                target,
            },
            Self::Malformed(segment) => InferError::ConstraintParseFailure {
                path,
                value: segment,
                target: "tag segment",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_error_lifts_with_path() {
        let err = TagError::mismatch("min", Some(SchemaType::Boolean)).at("book.flag");
        assert_eq!(
            err,
            InferError::ConstraintTypeMismatch {
                path: "book.flag".into(),
                constraint: "min",
                schema_type: "boolean".into(),
            }
        );
        assert_eq!(
            err.to_string(),
            "constraint `min` at `book.flag` does not apply to a schema of type boolean"
        );
    }

    #[test]
    fn parse_error_names_value_and_target() {
        let err = TagError::parse("abc", "integer").at("count");
        assert_eq!(err.to_string(), "cannot parse `abc` as integer at `count`");
    }
}
