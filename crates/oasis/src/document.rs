//! The document under construction
//!
//! A [`Document`] owns the paths, the component registry and the schema
//! engine. Paths and operations are added through [`PathBuilder`] and
//! [`Router`]; the finished document is rendered with
//! [`Document::openapi`], [`Document::to_json`] or [`Document::to_yaml`].

use std::collections::BTreeMap;

use oasis_core::openapi::{Info, OpenApi, OpenApiVersion, Server};
use oasis_core::route::{Header, HttpMethod, Operation, Parameter, PathItem};
use oasis_core::schema::Components;
use oasis_core::{ComponentRegistry, Describe, Reference, Schema, SchemaEngine, SchemaRef};

use crate::config::DocumentConfig;
use crate::error::{BuildError, Result};
use crate::operation::OperationBuilder;
use crate::operation_id::default_operation_id;
use crate::router::Router;

/// Builds an operation id from a lowercase method and a path
pub type OperationIdFn = fn(&str, &str) -> String;

/// An `OpenAPI` document being assembled.
#[derive(Debug)]
pub struct Document {
    version: OpenApiVersion,
    info: Info,
    servers: Vec<Server>,
    paths: BTreeMap<String, PathItem>,
    registry: ComponentRegistry,
    parameters: BTreeMap<String, Parameter>,
    headers: BTreeMap<String, Header>,
    engine: SchemaEngine,
    operation_id: Option<OperationIdFn>,
}

impl Document {
    /// Start a document for an `OpenAPI` 3.x `version`.
    ///
    /// `info.title` and `info.version` must be set.
    pub fn new(version: &str, info: Info) -> Result<Self> {
        Self::with_config(version, info, DocumentConfig::default())
    }

    pub fn with_config(version: &str, info: Info, config: DocumentConfig) -> Result<Self> {
        let version = OpenApiVersion::try_from(version).map_err(BuildError::UnsupportedVersion)?;
        if let Some(field) = info.missing_field() {
            return Err(BuildError::InvalidInfo(field));
        }
        Ok(Self {
            version,
            info,
            servers: Vec::new(),
            paths: BTreeMap::new(),
            registry: ComponentRegistry::new(),
            parameters: BTreeMap::new(),
            headers: BTreeMap::new(),
            engine: SchemaEngine::new(config.inference),
            operation_id: config
                .generate_operation_ids
                .then_some(default_operation_id as OperationIdFn),
        })
    }

    /// Replace the generator used for empty operation ids; `None` leaves them empty
    pub fn set_operation_id_generator(&mut self, generator: Option<OperationIdFn>) {
        self.operation_id = generator;
    }

    pub fn add_server(&mut self, server: Server) {
        self.servers.push(server);
    }

    #[must_use]
    pub const fn info(&self) -> &Info {
        &self.info
    }

    #[must_use]
    pub const fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Reference to a registered component schema
    #[must_use]
    pub fn schema(&self, key: &str) -> Option<Reference> {
        self.registry.reference(key)
    }

    /// Reference to the component for `value`, inferring and registering it
    /// on first use. An empty key is derived from the type; `None` yields the
    /// empty placeholder schema.
    pub fn must_get_schema<T: Describe + ?Sized>(
        &mut self,
        key: &str,
        value: Option<&T>,
    ) -> Result<SchemaRef> {
        Ok(self.engine.resolve(&mut self.registry, key, value)?)
    }

    /// Register a hand-written schema, replacing any previous one under `key`
    pub fn add_schema(&mut self, key: &str, schema: Schema) -> Reference {
        self.registry.put(key, schema)
    }

    /// Inline schema for `T`, without registering anything
    pub fn infer<T: Describe + ?Sized>(&self, sample: Option<&T>) -> Result<Schema> {
        Ok(self.engine.infer(sample)?)
    }

    pub fn add_param(&mut self, key: &str, param: Parameter) -> Reference {
        self.parameters.insert(key.to_string(), param);
        Reference::new(format!("#/components/parameters/{key}"))
    }

    pub fn param(&self, key: &str) -> Result<&Parameter> {
        self.parameters
            .get(key)
            .ok_or_else(|| BuildError::MissingComponent {
                kind: "parameter",
                key: key.to_string(),
            })
    }

    pub fn add_header(&mut self, key: &str, header: Header) -> Reference {
        self.headers.insert(key.to_string(), header);
        Reference::new(format!("#/components/headers/{key}"))
    }

    pub fn header(&self, key: &str) -> Result<&Header> {
        self.headers
            .get(key)
            .ok_or_else(|| BuildError::MissingComponent {
                kind: "header",
                key: key.to_string(),
            })
    }

    /// Add a new path. Defining the same path twice is an error.
    pub fn add_path(&mut self, path: &str, summary: &str, description: &str) -> Result<PathBuilder<'_>> {
        if self.paths.contains_key(path) {
            return Err(BuildError::DuplicatePath(path.to_string()));
        }
        tracing::debug!(path, "added path");
        self.paths.insert(
            path.to_string(),
            PathItem {
                summary: non_empty(summary),
                description: non_empty(description),
                ..PathItem::default()
            },
        );
        Ok(PathBuilder {
            doc: self,
            path: path.to_string(),
        })
    }

    /// Root router for grouping paths under shared prefixes
    pub fn router(&mut self) -> Router<'_> {
        Router::new(self)
    }

    #[must_use]
    pub fn path_item(&self, path: &str) -> Option<&PathItem> {
        self.paths.get(path)
    }

    /// Path item for `path`, created with the given shared parameters when
    /// it does not exist yet
    pub(crate) fn ensure_path(&mut self, path: &str, parameters: Vec<Parameter>) {
        if !self.paths.contains_key(path) {
            tracing::debug!(path, "added path");
            self.paths.insert(
                path.to_string(),
                PathItem {
                    parameters: (!parameters.is_empty()).then_some(parameters),
                    ..PathItem::default()
                },
            );
        }
    }

    pub(crate) fn add_operation(&mut self, path: &str, method: HttpMethod) -> Result<OperationBuilder<'_>> {
        let slot = self.paths.entry(path.to_string()).or_default().slot_mut(method);
        if slot.is_some() {
            return Err(BuildError::DuplicateOperation {
                path: path.to_string(),
                method,
            });
        }
        tracing::debug!(%method, path, "added operation");
        let operation = slot.insert(Operation::default());
        Ok(OperationBuilder::new(
            operation,
            &mut self.registry,
            self.engine,
            self.operation_id,
            path,
            method,
        ))
    }

    /// The serializable document, with registered components filled in
    #[must_use]
    pub fn openapi(&self) -> OpenApi {
        OpenApi {
            openapi: self.version.clone(),
            info: self.info.clone(),
            servers: (!self.servers.is_empty()).then(|| self.servers.clone()),
            paths: self.paths.clone(),
            components: Some(Components {
                schemas: non_empty_map(self.registry.schemas()),
                parameters: non_empty_map(&self.parameters),
                headers: non_empty_map(&self.headers),
            }),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.openapi())?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.openapi())?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.openapi())?)
    }
}

/// A path added with [`Document::add_path`].
#[derive(Debug)]
pub struct PathBuilder<'d> {
    doc: &'d mut Document,
    path: String,
}

impl PathBuilder<'_> {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Add an operation for `method`. Each method may be defined once per path.
    pub fn operation(&mut self, method: HttpMethod) -> Result<OperationBuilder<'_>> {
        self.doc.add_operation(&self.path, method)
    }

    /// Parameter shared by every operation on this path
    pub fn with_param(&mut self, param: Parameter) -> &mut Self {
        let item = self.doc.paths.entry(self.path.clone()).or_default();
        item.parameters.get_or_insert_with(Vec::new).push(param);
        self
    }

    pub fn with_path_param(&mut self, name: &str, description: &str) -> &mut Self {
        self.with_param(Parameter::path_param(name, description))
    }
}

pub(crate) fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn non_empty_map<V: Clone>(map: &BTreeMap<String, V>) -> Option<BTreeMap<String, V>> {
    (!map.is_empty()).then(|| map.clone())
}
