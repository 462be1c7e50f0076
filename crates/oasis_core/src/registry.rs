//! Component reference registry
//!
//! Holds the schemas rendered under `components.schemas` and hands out `$ref`
//! pointers to them. A registry belongs to one document; mutation goes
//! through `&mut self`, so a get-or-insert can never interleave with another
//! one for the same key.

use std::collections::BTreeMap;

use crate::error::{InferError, Result};
use crate::schema::{Reference, Schema};

/// Keyed store of materialized component schemas.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    schemas: BTreeMap<String, Schema>,
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored schema for `key`, if any
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Schema> {
        self.schemas.get(key)
    }

    /// A reference to `key`, if it is registered
    #[must_use]
    pub fn reference(&self, key: &str) -> Option<Reference> {
        self.schemas.contains_key(key).then(|| Reference::schema(key))
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.schemas.contains_key(key)
    }

    /// Store `schema` under `key`, replacing any previous entry.
    ///
    /// References handed out earlier keep pointing at the key and therefore
    /// see the replacement.
    pub fn put(&mut self, key: &str, schema: Schema) -> Reference {
        if self.schemas.insert(key.to_string(), schema).is_some() {
            tracing::warn!(key, "replacing registered component schema");
        } else {
            tracing::debug!(key, "registered component schema");
        }
        Reference::schema(key)
    }

    /// Store `schema` under a key that must not exist yet
    pub fn insert_new(&mut self, key: &str, schema: Schema) -> Result<Reference> {
        if self.schemas.contains_key(key) {
            return Err(InferError::DuplicateRegistration {
                key: key.to_string(),
            });
        }
        Ok(self.put(key, schema))
    }

    /// Reference to `key`, running `infer` and storing its result only when
    /// the key is absent.
    pub fn must_get_with<E>(
        &mut self,
        key: &str,
        infer: impl FnOnce() -> Result<Schema, E>,
    ) -> Result<Reference, E> {
        if self.schemas.contains_key(key) {
            tracing::trace!(key, "component schema already registered");
            return Ok(Reference::schema(key));
        }
        let schema = infer()?;
        Ok(self.put(key, schema))
    }

    /// Registered schemas, ordered by key
    #[must_use]
    pub const fn schemas(&self) -> &BTreeMap<String, Schema> {
        &self.schemas
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
