use oasis_core::InferenceConfig;
use serde::{Deserialize, Serialize};

/// Document-level settings, loadable from JSON or YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Passed to the schema engine
    pub inference: InferenceConfig,
    /// Fill empty operation ids from the method and path
    pub generate_operation_ids: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            inference: InferenceConfig::default(),
            generate_operation_ids: true,
        }
    }
}
