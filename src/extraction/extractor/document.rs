//! Bootstrap from an existing Swagger document.

use crate::error::{ExtractionError, Result};
use crate::extraction::{ExtractionContext, Extractor, Source, Target};
use crate::schema::{Swagger, SWAGGER_VERSION};
use log::debug;
use serde_json::{Map, Value};

/// Merges a raw Swagger 2.0 document (JSON or YAML) into the target document.
///
/// Top-level fields unset on the target are copied wholesale. Objects the
/// target already holds receive the incoming sub-fields they lack, one level
/// deep. Everything else already set is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwaggerDocumentExtractor;

impl SwaggerDocumentExtractor {
    /// Parse `raw` and return it when it carries the `swagger: "2.0"` signature.
    ///
    /// An unquoted YAML `swagger: 2.0` parses as a number and is accepted too;
    /// the returned document always carries the string form.
    fn signed_document(raw: &str) -> Option<Value> {
        let mut document: Value = serde_json::from_str(raw)
            .ok()
            .or_else(|| serde_yaml::from_str(raw).ok())?;
        let signed = match document.get("swagger")? {
            Value::String(version) => version == SWAGGER_VERSION,
            Value::Number(version) => version.as_f64() == Some(2.0),
            _ => false,
        };
        if !signed {
            return None;
        }
        document
            .as_object_mut()?
            .insert("swagger".to_string(), Value::String(SWAGGER_VERSION.to_string()));
        Some(document)
    }

    /// Whether `raw` is a Swagger 2.0 document this extractor would merge
    pub fn is_signed(raw: &str) -> bool {
        Self::signed_document(raw).is_some()
    }
}

/// One-level merge of `incoming` into `current`; see [`SwaggerDocumentExtractor`]
fn merge_document(current: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        if value.is_null() {
            continue;
        }
        let slot = current.entry(key).or_insert(Value::Null);
        match slot {
            Value::Null => *slot = value,
            Value::Object(existing) => {
                let Value::Object(fields) = value else {
                    continue;
                };
                for (field, field_value) in fields {
                    if field_value.is_null() {
                        continue;
                    }
                    let field_slot = existing.entry(field).or_insert(Value::Null);
                    if field_slot.is_null() {
                        *field_slot = field_value;
                    }
                }
            }
            _ => {}
        }
    }
}

impl Extractor for SwaggerDocumentExtractor {
    fn name(&self) -> &'static str {
        "swagger-document"
    }

    fn can_extract(&self, source: &Source<'_>, target: &Target<'_>, _context: &ExtractionContext<'_>) -> bool {
        match (source, target) {
            (Source::Raw(raw), Target::Document(_)) => Self::signed_document(raw).is_some(),
            _ => false,
        }
    }

    fn extract(&self, source: &Source<'_>, target: &mut Target<'_>, _context: &mut ExtractionContext<'_>) -> Result<()> {
        let (Source::Raw(raw), Target::Document(swagger)) = (source, target) else {
            return Err(ExtractionError::impossible(self.name()));
        };
        let Some(document) = Self::signed_document(raw) else {
            return Err(ExtractionError::impossible(self.name()));
        };

        // normalise through the document model so unknown fields are dropped
        let parsed: Swagger = serde_json::from_value(document)?;
        let Value::Object(incoming) = serde_json::to_value(&parsed)? else {
            return Err(ExtractionError::impossible(self.name()));
        };
        let Value::Object(mut current) = serde_json::to_value(&**swagger)? else {
            return Err(ExtractionError::impossible(self.name()));
        };

        debug!("Merging {} top-level fields from an existing document", incoming.len());
        merge_document(&mut current, incoming);
        **swagger = serde_json::from_value(Value::Object(current))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::SwaggerEngine;
    use crate::schema::{Info, Tag};
    use pretty_assertions::assert_eq;

    fn bootstrap(target: &mut Swagger, raw: &str) {
        let engine = SwaggerEngine::new();
        engine
            .extract_into(&Source::Raw(raw), &mut Target::Document(target))
            .unwrap();
    }

    #[test]
    fn test_merges_one_level_into_partial_records() {
        let mut swagger = Swagger::new();
        swagger.info = Some(Info {
            title: Some("Mine".to_string()),
            ..Default::default()
        });

        bootstrap(
            &mut swagger,
            r#"{"swagger":"2.0","info":{"title":"Theirs","version":"1.2.0","description":null},"host":"api.example.com"}"#,
        );

        let info = swagger.info.as_ref().unwrap();
        assert_eq!(info.title.as_deref(), Some("Mine"));
        assert_eq!(info.version.as_deref(), Some("1.2.0"));
        assert_eq!(info.description, None);
        assert_eq!(swagger.host.as_deref(), Some("api.example.com"));
    }

    #[test]
    fn test_unset_fields_are_replaced_wholesale() {
        let mut swagger = Swagger::new();
        bootstrap(
            &mut swagger,
            r#"{"swagger":"2.0","tags":[{"name":"users"}],"paths":{"/users":{"get":{"operationId":"list_users"}}}}"#,
        );

        assert_eq!(
            swagger.tags,
            Some(vec![Tag {
                name: "users".to_string(),
                ..Default::default()
            }])
        );
        let paths = swagger.paths.as_ref().unwrap();
        assert_eq!(
            paths["/users"].get.as_ref().unwrap().operation_id.as_deref(),
            Some("list_users")
        );
    }

    #[test]
    fn test_existing_arrays_are_kept() {
        let mut swagger = Swagger::new();
        swagger.schemes = Some(vec!["https".to_string()]);
        bootstrap(&mut swagger, r#"{"swagger":"2.0","schemes":["http","ws"]}"#);
        assert_eq!(swagger.schemes, Some(vec!["https".to_string()]));
    }

    #[test]
    fn test_yaml_input() {
        let mut swagger = Swagger::new();
        bootstrap(&mut swagger, "swagger: \"2.0\"\nbasePath: /api\n");
        assert_eq!(swagger.base_path.as_deref(), Some("/api"));
    }

    #[test]
    fn test_unquoted_yaml_version() {
        let raw = "swagger: 2.0\nbasePath: /api\n";
        assert!(SwaggerDocumentExtractor::is_signed(raw));

        let mut swagger = Swagger::default();
        bootstrap(&mut swagger, raw);
        assert_eq!(swagger.swagger.as_deref(), Some("2.0"));
        assert_eq!(swagger.base_path.as_deref(), Some("/api"));
    }

    #[test]
    fn test_signature_is_required() {
        let engine = SwaggerEngine::new();
        let mut swagger = Swagger::new();
        let mut context = engine.root_context();

        for raw in [
            r#"{"swagger":"3.0","host":"x"}"#,
            r#"{"swagger":3.0}"#,
            r#"{"openapi":"3.0.0"}"#,
            "not a document",
            "[1, 2]",
        ] {
            assert!(!SwaggerDocumentExtractor.can_extract(&Source::Raw(raw), &Target::Document(&mut swagger), &context));
        }

        let err = SwaggerDocumentExtractor
            .extract(&Source::Raw("{}"), &mut Target::Document(&mut swagger), &mut context)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Impossible { .. }));
        assert_eq!(swagger, Swagger::new());
    }

    #[test]
    fn test_malformed_signed_document() {
        let engine = SwaggerEngine::new();
        let mut swagger = Swagger::new();

        let err = engine
            .extract_into(
                &Source::Raw(r#"{"swagger":"2.0","paths":"not a map"}"#),
                &mut Target::Document(&mut swagger),
            )
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Document(_)));
    }

    #[test]
    fn test_bootstrap_is_idempotent() {
        let raw = r#"{"swagger":"2.0","info":{"title":"API","version":"1"},"host":"h"}"#;
        let mut swagger = Swagger::new();
        bootstrap(&mut swagger, raw);
        let first = swagger.clone();
        bootstrap(&mut swagger, raw);
        assert_eq!(swagger, first);
    }
}
