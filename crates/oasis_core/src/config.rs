use serde::{Deserialize, Serialize};

/// Default nesting depth before inference gives up on a type graph.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Knobs for the schema walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Maximum descriptor nesting before `RecursionLimit` is raised
    pub max_depth: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: InferenceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, InferenceConfig::default());
        assert_eq!(config.max_depth, 32);
    }

    #[test]
    fn max_depth_is_read() {
        let config: InferenceConfig = serde_json::from_str(r#"{"max_depth": 4}"#).unwrap();
        assert_eq!(config.max_depth, 4);
    }
}
