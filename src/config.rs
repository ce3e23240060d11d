//! Extraction configuration.
//!
//! Loaded from YAML, or from JSON when the file ends in `.json`. Every field
//! is optional:
//!
//! ```yaml
//! naming: camel_case            # or `identical`
//! direction: out                # root direction for definitions
//! out_model_context:
//!   serializer-groups: [public]
//! exception_response_codes:
//!   - exception: NotFoundError
//!     code: 404
//!     message: Resource not found
//! ```

use crate::error::Result;
use crate::extraction::{ContextParameters, Direction, ModelContext};
use crate::metadata::naming::{CamelCaseNaming, IdenticalNaming, NamingStrategy, SerializedNameNaming};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// How internal property names map to wire names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingConfig {
    Identical,
    #[default]
    CamelCase,
}

/// Status code and default message for an exception type and its descendants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionResponseCode {
    pub exception: String,
    #[serde(default = "default_exception_code")]
    pub code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn default_exception_code() -> u16 {
    500
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub naming: NamingConfig,
    pub exception_response_codes: Vec<ExceptionResponseCode>,
    pub in_model_context: ModelContext,
    pub out_model_context: ModelContext,
    pub direction: Option<Direction>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            naming: NamingConfig::default(),
            exception_response_codes: Vec::new(),
            in_model_context: ModelContext::default(),
            out_model_context: ModelContext::default(),
            direction: Some(Direction::Out),
        }
    }
}

impl ExtractionConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration: {}", path.display());
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            _ => Self::from_yaml_str(&content),
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Naming strategy; explicit serialized names always win
    pub fn naming_strategy(&self) -> Arc<dyn NamingStrategy> {
        match self.naming {
            NamingConfig::Identical => Arc::new(SerializedNameNaming::new(IdenticalNaming)),
            NamingConfig::CamelCase => Arc::new(SerializedNameNaming::new(CamelCaseNaming::default())),
        }
    }

    /// Parameters seeding the root extraction context
    pub fn context_parameters(&self) -> ContextParameters {
        let mut parameters = ContextParameters::default();
        parameters.direction = self.direction;
        parameters.in_model_context = self.in_model_context.clone();
        parameters.out_model_context = self.out_model_context.clone();
        parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::PropertyMetadata;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ExtractionConfig::from_yaml_str("").unwrap();
        assert_eq!(config, ExtractionConfig::default());
        assert_eq!(config.direction, Some(Direction::Out));
        assert_eq!(config.naming, NamingConfig::CamelCase);
    }

    #[test]
    fn test_yaml_config() {
        let config = ExtractionConfig::from_yaml_str(
            r#"
naming: identical
direction: in
in_model_context:
  serializer-groups: [write]
exception_response_codes:
  - exception: NotFoundError
    code: 404
    message: Resource not found
  - exception: Failure
"#,
        )
        .unwrap();

        assert_eq!(config.naming, NamingConfig::Identical);
        assert_eq!(config.exception_response_codes.len(), 2);
        assert_eq!(config.exception_response_codes[1].code, 500);
        assert_eq!(config.exception_response_codes[1].message, None);

        let parameters = config.context_parameters();
        assert_eq!(parameters.direction, Some(Direction::In));
        assert_eq!(parameters.in_model_context, ModelContext::with_groups(["write"]));
    }

    #[test]
    fn test_naming_strategy_selection() {
        let mut property = PropertyMetadata::new("User", "firstName", None);

        let camel = ExtractionConfig::default().naming_strategy();
        assert_eq!(camel.translate_name(&property), "first_name");

        let identical = ExtractionConfig {
            naming: NamingConfig::Identical,
            ..Default::default()
        }
        .naming_strategy();
        assert_eq!(identical.translate_name(&property), "firstName");

        property.serialized_name = Some("given".to_string());
        assert_eq!(camel.translate_name(&property), "given");
    }

    #[test]
    fn test_json_config_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"direction": null, "naming": "identical"}"#).unwrap();

        let config = ExtractionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.direction, None);
        assert_eq!(config.naming, NamingConfig::Identical);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"naming: shouting\n").unwrap();
        assert!(ExtractionConfig::from_file(file.path()).is_err());
    }
}
