//! Nested routers
//!
//! A router groups paths under a prefix. Parameters and tags set on a router
//! apply to every path and operation created beneath it, including those of
//! nested routers.

use oasis_core::route::{HttpMethod, Parameter};

use crate::document::Document;
use crate::error::Result;
use crate::operation::OperationBuilder;

/// Groups paths under shared prefixes, parameters and tags.
#[derive(Debug)]
pub struct Router<'d> {
    doc: &'d mut Document,
    prefixes: Vec<String>,
    params: Vec<Parameter>,
    inherited_params: Vec<Parameter>,
    tags: Vec<String>,
    inherited_tags: Vec<String>,
}

impl<'d> Router<'d> {
    pub(crate) fn new(doc: &'d mut Document) -> Self {
        Self {
            doc,
            prefixes: Vec::new(),
            params: Vec::new(),
            inherited_params: Vec::new(),
            tags: Vec::new(),
            inherited_tags: Vec::new(),
        }
    }

    /// Parameter for every path first created through this router or its
    /// sub-routers
    pub fn with_param(&mut self, param: Parameter) -> &mut Self {
        self.params.push(param);
        self
    }

    pub fn with_path_param(&mut self, name: &str, description: &str) -> &mut Self {
        self.with_param(Parameter::path_param(name, description))
    }

    pub fn with_tags<I, S>(&mut self, tags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Build a sub-router for `prefix`. The sub-router sees this router's
    /// parameters and tags.
    pub fn route<F>(&mut self, prefix: &str, build: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Router<'_>) -> Result<()>,
    {
        let mut prefixes = self.prefixes.clone();
        prefixes.push(prefix.to_string());
        let inherited_params = self.collected_params();
        let inherited_tags = self.collected_tags();
        let mut sub = Router {
            doc: &mut *self.doc,
            prefixes,
            params: Vec::new(),
            inherited_params,
            tags: Vec::new(),
            inherited_tags,
        };
        build(&mut sub)?;
        Ok(self)
    }

    /// Add an operation at `path` below this router's prefix.
    ///
    /// A path created here gets the collected router parameters as shared
    /// path parameters; an existing path keeps its own.
    pub fn method(
        &mut self,
        method: HttpMethod,
        path: &str,
        summary: &str,
        description: &str,
    ) -> Result<OperationBuilder<'_>> {
        let full_path = join_paths(self.prefixes.iter().map(String::as_str).chain([path]));
        let params = self.collected_params();
        let tags = self.collected_tags();
        self.doc.ensure_path(&full_path, params);
        Ok(self
            .doc
            .add_operation(&full_path, method)?
            .summarize(summary, description)
            .with_tags(tags))
    }

    pub fn get(&mut self, path: &str, summary: &str, description: &str) -> Result<OperationBuilder<'_>> {
        self.method(HttpMethod::Get, path, summary, description)
    }

    pub fn put(&mut self, path: &str, summary: &str, description: &str) -> Result<OperationBuilder<'_>> {
        self.method(HttpMethod::Put, path, summary, description)
    }

    pub fn post(&mut self, path: &str, summary: &str, description: &str) -> Result<OperationBuilder<'_>> {
        self.method(HttpMethod::Post, path, summary, description)
    }

    pub fn delete(&mut self, path: &str, summary: &str, description: &str) -> Result<OperationBuilder<'_>> {
        self.method(HttpMethod::Delete, path, summary, description)
    }

    pub fn patch(&mut self, path: &str, summary: &str, description: &str) -> Result<OperationBuilder<'_>> {
        self.method(HttpMethod::Patch, path, summary, description)
    }

    pub fn head(&mut self, path: &str, summary: &str, description: &str) -> Result<OperationBuilder<'_>> {
        self.method(HttpMethod::Head, path, summary, description)
    }

    // Innermost router first.
    fn collected_params(&self) -> Vec<Parameter> {
        self.params
            .iter()
            .chain(&self.inherited_params)
            .cloned()
            .collect()
    }

    fn collected_tags(&self) -> Vec<String> {
        self.tags.iter().chain(&self.inherited_tags).cloned().collect()
    }
}

/// Join path segments with `/` and clean the result: repeated slashes
/// collapse, `.` segments drop, `..` removes the segment before it and a
/// trailing slash is removed. Empty segments are skipped; joining nothing
/// gives an empty string.
pub(crate) fn join_paths<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let joined = parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        return joined;
    }

    let rooted = joined.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let body = segments.join("/");
    match (rooted, body.is_empty()) {
        (true, _) => format!("/{body}"),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}
