//! Oasis - build `OpenAPI` 3 documents in code
//!
//! Schemas are inferred from Rust types through the [`Describe`] derive and
//! registered once per document as components; paths and operations are
//! added with builders or nested routers.
//!
//! ```
//! use oasis::{Describe, Document, openapi::Info};
//! use serde::Serialize;
//!
//! #[derive(Describe, Serialize)]
//! struct Book {
//!     #[oasis(required, min = 1, max = 128)]
//!     name: String,
//! }
//!
//! # fn main() -> oasis::Result<()> {
//! let mut doc = Document::new("3.0.0", Info::new("books", "v1"))?;
//! let mut router = doc.router();
//! router.route("/books", |r| {
//!     r.get("/", "List books", "")?
//!         .returns(200, "All books", "bookArray", Some(&Vec::<Book>::new()))?;
//!     Ok(())
//! })?;
//! assert!(doc.schema("bookArray").is_some());
//! # Ok(())
//! # }
//! ```

extern crate self as oasis;

mod config;
mod document;
mod error;
mod operation;
mod operation_id;
mod param;
mod router;

// Re-export oasis_core modules so users and derived code don't need to depend on oasis_core directly
pub mod schema {
    pub use oasis_core::schema::*;
}

pub mod route {
    pub use oasis_core::route::*;
}

pub mod openapi {
    pub use oasis_core::openapi::*;
}

pub mod describe {
    pub use oasis_core::describe::*;
}

pub mod tags {
    pub use oasis_core::tags::*;
}

pub mod engine {
    pub use oasis_core::engine::*;
}

pub mod registry {
    pub use oasis_core::registry::*;
}

pub mod walker {
    pub use oasis_core::walker::*;
}

pub use oasis_core::{InferError, InferenceConfig, SchemaDoc, SchemaEngine, TagError};

pub use config::DocumentConfig;
pub use document::{Document, OperationIdFn, PathBuilder};
pub use error::{BuildError, Result};
pub use operation::{MIME_JSON, OperationBuilder};
pub use operation_id::default_operation_id;
pub use param::{ParameterExt, query_param};
pub use router::Router;

// The trait and the derive share a name, like serde's
pub use oasis_core::Describe;
pub use oasis_macro::Describe;

// Derived code refers to `::oasis::serde_json`
pub use serde_json;
