//! Editor configuration.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo levels kept by the editor (0 = unlimited).
    pub max_undo_levels: usize,

    /// Attribute shallow clones leave behind.
    pub identifier_attribute: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_undo_levels: 100,
            identifier_attribute: "id".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = EditorConfig::from_json(r#"{ "max_undo_levels": 5 }"#).unwrap();
        assert_eq!(config.max_undo_levels, 5);
        assert_eq!(config.identifier_attribute, "id");

        assert_eq!(EditorConfig::from_json("{}").unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_invalid_json() {
        let err = EditorConfig::from_json(r#"{ "max_undo_levels": "many" }"#).unwrap_err();
        assert!(err.to_string().starts_with("Invalid editor configuration"));
    }
}
