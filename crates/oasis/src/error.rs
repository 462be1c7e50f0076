use oasis_core::InferError;
use oasis_core::route::HttpMethod;
use thiserror::Error;

pub type Result<T, E = BuildError> = std::result::Result<T, E>;

/// Errors raised while assembling or rendering a document.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Infer(#[from] InferError),

    #[error("path `{0}` is already defined")]
    DuplicatePath(String),

    #[error("operation {method} `{path}` is already defined")]
    DuplicateOperation { path: String, method: HttpMethod },

    #[error("operation {method} `{path}` already has a `{code}` response")]
    DuplicateResponse {
        path: String,
        method: HttpMethod,
        code: String,
    },

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("info.{0} must not be empty")]
    InvalidInfo(&'static str),

    #[error("no {kind} component registered under `{key}`")]
    MissingComponent { kind: &'static str, key: String },

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
