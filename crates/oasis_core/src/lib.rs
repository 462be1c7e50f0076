//! Oasis core - OpenAPI model types and schema inference
//!
//! The model types (`schema`, `route`, `openapi`) serialize to an OpenAPI 3
//! document. On top of them sit the descriptor walker, the tag interpreter,
//! the inference engine and the component registry.

pub mod config;
pub mod describe;
pub mod engine;
pub mod error;
pub mod openapi;
pub mod registry;
pub mod route;
pub mod schema;
pub mod tags;
pub mod walker;

pub use config::InferenceConfig;
pub use describe::{Describe, SchemaDoc};
pub use engine::SchemaEngine;
pub use error::{InferError, TagError};
pub use registry::ComponentRegistry;
pub use schema::{Reference, Schema, SchemaRef};
