//! Validation and serialization of Swagger documents.
//!
//! Extraction never checks completeness; [`validate`] runs once, right before
//! a document is dumped, and reports every violation it finds at once.

use crate::error::{ExtractionError, Result as ExtractionResult};
use crate::schema::{ParameterLocation, Swagger, SWAGGER_VERSION};
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |text| text.trim().is_empty())
}

/// Checks the structural rules a dumped Swagger 2.0 document must satisfy.
///
/// # Errors
///
/// Returns [`ExtractionError::InvalidDocument`] listing every violation, in
/// document order.
pub fn validate(doc: &Swagger) -> ExtractionResult<()> {
    let mut violations = Vec::new();

    match doc.swagger.as_deref() {
        Some(SWAGGER_VERSION) => {}
        Some(other) => violations.push(format!("swagger: expected \"{SWAGGER_VERSION}\", found \"{other}\"")),
        None => violations.push("swagger: missing version".to_string()),
    }

    match &doc.info {
        Some(info) => {
            if is_blank(info.title.as_deref()) {
                violations.push("info.title: must not be blank".to_string());
            }
            if is_blank(info.version.as_deref()) {
                violations.push("info.version: must not be blank".to_string());
            }
        }
        None => violations.push("info: missing".to_string()),
    }

    for (index, tag) in doc.tags.iter().flatten().enumerate() {
        if tag.name.trim().is_empty() {
            violations.push(format!("tags[{index}].name: must not be blank"));
        }
    }

    for (path, item) in doc.paths.iter().flatten() {
        let shared = item.parameters.iter().map(|parameter| ("", parameter));
        let own = item
            .operations()
            .flat_map(|(method, operation)| operation.parameters.iter().map(move |parameter| (method, parameter)));

        for (method, parameter) in shared.chain(own) {
            let location = if method.is_empty() {
                format!("paths.{path}.parameters")
            } else {
                format!("paths.{path}.{method}.parameters")
            };
            if parameter.name.trim().is_empty() {
                violations.push(format!("{location}: parameter name must not be blank"));
            }
            if parameter.location == ParameterLocation::Body && parameter.schema.is_none() {
                violations.push(format!("{location}.{}: body parameter requires a schema", parameter.name));
            }
            if parameter.location == ParameterLocation::Body && parameter.parameter_type.is_some() {
                violations.push(format!("{location}.{}: body parameter must not carry a type", parameter.name));
            }
        }

        for (method, operation) in item.operations() {
            for (status, response) in &operation.responses {
                if response.description.is_none() {
                    violations.push(format!("paths.{path}.{method}.responses.{status}: description is required"));
                }
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        debug!("Document failed validation with {} violation(s)", violations.len());
        Err(ExtractionError::InvalidDocument { violations })
    }
}

/// Validates, then serializes a document to pretty-printed JSON.
pub fn dump_json(doc: &Swagger) -> ExtractionResult<String> {
    validate(doc)?;
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Validates, then serializes a document to YAML.
pub fn dump_yaml(doc: &Swagger) -> ExtractionResult<String> {
    validate(doc)?;
    Ok(serde_yaml::to_string(doc)?)
}

/// Serializes a Swagger document to YAML format.
///
/// Unlike [`dump_yaml`], no validation is performed, so partially extracted
/// documents can be inspected.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Example
///
/// ```ignore
/// use swagger_extraction::schema::Swagger;
/// use swagger_extraction::serializer::serialize_yaml;
///
/// let yaml = serialize_yaml(&Swagger::new()).unwrap();
/// assert_eq!(yaml, "swagger: '2.0'\n");
/// ```
pub fn serialize_yaml(doc: &Swagger) -> Result<String> {
    debug!("Serializing Swagger document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize Swagger document to YAML")
}

/// Serializes a Swagger document to JSON format with pretty printing.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(doc: &Swagger) -> Result<String> {
    debug!("Serializing Swagger document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize Swagger document to JSON")
}

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
/// Missing parent directories are created.
///
/// # Arguments
///
/// * `content` - The string content to write
/// * `path` - The file path to write to
///
/// # Errors
///
/// Returns an error if the directory or the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
