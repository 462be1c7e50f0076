//! Operation builder

use std::collections::BTreeMap;

use oasis_core::route::{
    Header, HttpMethod, MediaType, Operation, Parameter, ParameterLocation, RequestBody, Response,
};
use oasis_core::{ComponentRegistry, Describe, SchemaEngine, SchemaRef};
use serde::Serialize;

use crate::document::{OperationIdFn, non_empty};
use crate::error::{BuildError, Result};

/// Media type for JSON bodies
pub const MIME_JSON: &str = "application/json";

/// An operation added to a path.
///
/// Fallible steps return `Result<Self>`, so a whole operation can be chained
/// with `?`:
///
/// ```
/// # use oasis::{Document, openapi::Info, route::HttpMethod};
/// # fn main() -> oasis::Result<()> {
/// let mut doc = Document::new("3.0.0", Info::new("books", "v1"))?;
/// doc.add_path("/books", "", "")?
///     .operation(HttpMethod::Get)?
///     .metadata("", "List books", "")
///     .returns(200, "Book titles", "titles", Some(&vec!["Dune".to_string()]))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OperationBuilder<'d> {
    operation: &'d mut Operation,
    registry: &'d mut ComponentRegistry,
    engine: SchemaEngine,
    operation_id: Option<OperationIdFn>,
    path: String,
    method: HttpMethod,
}

impl<'d> OperationBuilder<'d> {
    pub(crate) fn new(
        operation: &'d mut Operation,
        registry: &'d mut ComponentRegistry,
        engine: SchemaEngine,
        operation_id: Option<OperationIdFn>,
        path: &str,
        method: HttpMethod,
    ) -> Self {
        Self {
            operation,
            registry,
            engine,
            operation_id,
            path: path.to_string(),
            method,
        }
    }

    #[must_use]
    pub fn operation(&self) -> &Operation {
        self.operation
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Set the id, summary and description. An empty id is generated from
    /// the method and path when the document has a generator.
    pub fn metadata(mut self, operation_id: &str, summary: &str, description: &str) -> Self {
        let operation_id = match (operation_id, self.operation_id) {
            ("", Some(generate)) => generate(self.method.as_lowercase(), &self.path),
            (id, _) => id.to_string(),
        };
        if !operation_id.is_empty() {
            self.operation.operation_id = Some(operation_id);
        }
        self.operation.summary = non_empty(summary);
        self.operation.description = non_empty(description);
        self
    }

    pub(crate) fn summarize(mut self, summary: &str, description: &str) -> Self {
        self.operation.summary = non_empty(summary);
        self.operation.description = non_empty(description);
        self
    }

    /// JSON response for `code`, with the component for `value` as schema
    /// and `value` itself as example. Each code may be declared once.
    pub fn returns<T: Describe + Serialize + ?Sized>(
        mut self,
        code: u16,
        description: &str,
        key: &str,
        value: Option<&T>,
    ) -> Result<Self> {
        let code = code.to_string();
        self.ensure_new_response(&code)?;
        let response = self.json_response(description, key, value)?;
        self.operation.responses.insert(code, response);
        Ok(self)
    }

    /// Response used when no declared code matches; replaces any earlier one
    pub fn returns_default<T: Describe + Serialize + ?Sized>(
        mut self,
        description: &str,
        key: &str,
        value: Option<&T>,
    ) -> Result<Self> {
        let response = self.json_response(description, key, value)?;
        self.operation.responses.insert("default".to_string(), response);
        Ok(self)
    }

    /// Response with a non-JSON body
    pub fn returns_non_json(
        mut self,
        code: u16,
        description: &str,
        mime: &str,
        headers: BTreeMap<String, Header>,
        schema: Option<SchemaRef>,
        example: Option<serde_json::Value>,
    ) -> Result<Self> {
        let code = code.to_string();
        self.ensure_new_response(&code)?;
        let response = Response {
            description: description.to_string(),
            headers: (!headers.is_empty()).then_some(headers),
            content: Some(BTreeMap::from([(
                mime.to_string(),
                MediaType {
                    schema,
                    example,
                },
            )])),
        };
        self.operation.responses.insert(code, response);
        Ok(self)
    }

    /// JSON request body
    pub fn read_json<T: Describe + Serialize + ?Sized>(
        mut self,
        description: &str,
        required: bool,
        key: &str,
        value: Option<&T>,
    ) -> Result<Self> {
        let media = self.json_media(key, value)?;
        self.operation.request_body = Some(RequestBody {
            description: non_empty(description),
            required: required.then_some(true),
            content: BTreeMap::from([(MIME_JSON.to_string(), media)]),
        });
        Ok(self)
    }

    /// Raw request body of any media type
    pub fn read(
        mut self,
        description: &str,
        required: bool,
        mime: &str,
        example: Option<serde_json::Value>,
    ) -> Self {
        self.operation.request_body = Some(RequestBody {
            description: non_empty(description),
            required: required.then_some(true),
            content: BTreeMap::from([(
                mime.to_string(),
                MediaType {
                    schema: None,
                    example,
                },
            )]),
        });
        self
    }

    /// Add a parameter; path parameters are always required strings
    pub fn add_param(self, location: ParameterLocation, name: &str, description: &str) -> Self {
        let param = match location {
            ParameterLocation::Path => Parameter::path_param(name, description),
            other => Parameter::new(other, name, description),
        };
        self.with_param(param)
    }

    pub fn with_param(mut self, param: Parameter) -> Self {
        self.operation
            .parameters
            .get_or_insert_with(Vec::new)
            .push(param);
        self
    }

    pub fn with_path_param(self, name: &str, description: &str) -> Self {
        self.with_param(Parameter::path_param(name, description))
    }

    /// Query parameter typed after `example`; non-scalar examples are typed
    /// `object`.
    pub fn with_query_param<V: Describe + Serialize + ?Sized>(
        self,
        name: &str,
        description: &str,
        example: &V,
    ) -> Result<Self> {
        let param = crate::param::typed_query_param(self.engine, name, description, example)?;
        Ok(self.with_param(param))
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tags = tags.into_iter().map(Into::<String>::into).peekable();
        if tags.peek().is_some() {
            self.operation
                .tags
                .get_or_insert_with(Vec::new)
                .extend(tags);
        }
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.operation.deprecated = Some(true);
        self
    }

    fn ensure_new_response(&self, code: &str) -> Result<()> {
        if self.operation.responses.contains_key(code) {
            return Err(BuildError::DuplicateResponse {
                path: self.path.clone(),
                method: self.method,
                code: code.to_string(),
            });
        }
        Ok(())
    }

    fn json_response<T: Describe + Serialize + ?Sized>(
        &mut self,
        description: &str,
        key: &str,
        value: Option<&T>,
    ) -> Result<Response> {
        let media = self.json_media(key, value)?;
        Ok(Response {
            description: description.to_string(),
            headers: None,
            content: Some(BTreeMap::from([(MIME_JSON.to_string(), media)])),
        })
    }

    fn json_media<T: Describe + Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: Option<&T>,
    ) -> Result<MediaType> {
        let schema = self.engine.resolve(self.registry, key, value)?;
        let example = value.map(serde_json::to_value).transpose()?;
        Ok(MediaType {
            schema: Some(schema),
            example,
        })
    }
}
