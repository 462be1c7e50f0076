//! Schema inference engine: walks a type once and shares the result through
//! the component registry.

use crate::config::{DEFAULT_MAX_DEPTH, InferenceConfig};
use crate::describe::{Describe, ScalarKind, Shape, TypeDescriptor};
use crate::error::{InferError, Result};
use crate::registry::ComponentRegistry;
use crate::schema::{Reference, Schema, SchemaRef};
use crate::walker::Walker;

/// Registry key for a descriptor.
///
/// Optional wrappers are unwrapped silently and every sequence level adds an
/// `array.` prefix, so `T`, `Box<T>`, `Vec<T>` and `Vec<Box<T>>` map to `K`,
/// `K`, `array.K` and `array.K`. Named types key as `namespace.Ident`; unnamed
/// bases fall back to their scalar name, or `object`.
///
/// More than `max_depth` wrapper levels is a `RecursionLimit` error.
pub fn derive_key(descriptor: TypeDescriptor<'_>, max_depth: usize) -> Result<String> {
    let mut prefix = String::new();
    let mut path = String::new();
    let mut current = descriptor;
    for _ in 0..=max_depth {
        if let Some(name) = &current.name {
            return Ok(prefix + &name.qualified());
        }
        current = match current.shape {
            Shape::Optional(inner) => inner.get(),
            Shape::Sequence(element) => {
                prefix.push_str("array.");
                path.push_str("[]");
                element.get()
            }
            Shape::Map(value) => {
                prefix.push_str("map.");
                path.push_str("{}");
                value.get()
            }
            Shape::Scalar(kind) => return Ok(prefix + scalar_key(kind)),
            Shape::SelfDescribed(schema) => {
                return Ok(prefix + schema.schema_type.map_or("object", |t| t.as_str()));
            }
            Shape::Struct(_) | Shape::Opaque => return Ok(prefix + "object"),
        };
    }
    Err(InferError::RecursionLimit {
        path,
        limit: max_depth,
    })
}

/// Registry key for `T`, as used in generic type names.
///
/// Wrapper chains of real types are finite; a hand-written descriptor that
/// nests itself past the default depth keys by its Rust type name instead.
#[must_use]
pub fn key_of<T: Describe + ?Sized>() -> String {
    derive_key(T::describe(None), DEFAULT_MAX_DEPTH)
        .unwrap_or_else(|_| std::any::type_name::<T>().to_string())
}

const fn scalar_key(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Int32 => "int32",
        ScalarKind::Int64 => "int64",
        ScalarKind::Number => "number",
        ScalarKind::String => "string",
        ScalarKind::Boolean => "boolean",
    }
}

/// Infers schemas and registers them as components.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaEngine {
    config: InferenceConfig,
}

impl SchemaEngine {
    #[must_use]
    pub const fn new(config: InferenceConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Inline schema for `T`, without touching any registry
    pub fn infer<T: Describe + ?Sized>(&self, sample: Option<&T>) -> Result<Schema> {
        Walker::new(self.config).infer(T::describe(sample))
    }

    /// Reference to the component for `value`.
    ///
    /// An absent value yields the empty placeholder node. An empty `key` is
    /// derived from the type. A key that is already registered is returned as
    /// is, without inferring again.
    pub fn resolve<T: Describe + ?Sized>(
        &self,
        registry: &mut ComponentRegistry,
        key: &str,
        value: Option<&T>,
    ) -> Result<SchemaRef> {
        match value {
            Some(value) => self.register(registry, key, Some(value)).map(SchemaRef::Ref),
            None => Ok(SchemaRef::placeholder()),
        }
    }

    /// Like [`resolve`](Self::resolve), inferring from the type alone
    pub fn resolve_type<T: Describe + ?Sized>(
        &self,
        registry: &mut ComponentRegistry,
        key: &str,
    ) -> Result<SchemaRef> {
        self.register::<T>(registry, key, None)
            .map(SchemaRef::Ref)
    }

    fn register<T: Describe + ?Sized>(
        &self,
        registry: &mut ComponentRegistry,
        key: &str,
        sample: Option<&T>,
    ) -> Result<Reference> {
        let key = if key.is_empty() {
            derive_key(T::describe(sample), self.config.max_depth)?
        } else {
            key.to_string()
        };
        registry.must_get_with(&key, || {
            let schema = self.infer(sample)?;
            tracing::debug!(key = %key, "materialized component schema");
            Ok(schema)
        })
    }
}
