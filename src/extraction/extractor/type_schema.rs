//! Type reference to schema resolution.

use crate::error::{ExtractionError, Result};
use crate::extraction::{ExtractionContext, Extractor, Source, Target};
use crate::metadata::{PropertyMetadataSource, TypeRef};
use crate::schema::Schema;
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;

/// Swagger `type`/`format` pair for a scalar type name
pub(crate) fn primitive_type(name: &str) -> Option<(&'static str, Option<&'static str>)> {
    let mapped = match name {
        "string" | "String" | "str" | "char" => ("string", None),
        "int" | "integer" | "i8" | "i16" | "i32" | "u8" | "u16" | "u32" => ("integer", Some("int32")),
        "i64" | "i128" | "isize" | "u64" | "u128" | "usize" => ("integer", Some("int64")),
        "float" | "f32" => ("number", Some("float")),
        "double" | "number" | "f64" => ("number", Some("double")),
        "bool" | "boolean" => ("boolean", None),
        "DateTime" | "DateTimeImmutable" | "DateTimeInterface" | "NaiveDateTime" | "SystemTime" => {
            ("string", Some("date-time"))
        }
        "date" | "NaiveDate" => ("string", Some("date")),
        "Uuid" => ("string", Some("uuid")),
        _ => return None,
    };
    Some(mapped)
}

/// Resolves a [`Source::Type`] into a schema.
///
/// Wrappers are unwrapped, collections become arrays whose `items` are
/// resolved through the engine, scalars get their `type`/`format`, known
/// enumerations a string `enum` and known classes an object whose
/// properties are extracted by recursing with [`Source::Class`]. Anything
/// else is left as an `object` placeholder.
pub struct TypeSchemaExtractor {
    metadata: Arc<dyn PropertyMetadataSource>,
}

impl TypeSchemaExtractor {
    pub fn new(metadata: Arc<dyn PropertyMetadataSource>) -> Self {
        Self { metadata }
    }

    fn resolve(&self, type_ref: &TypeRef, schema: &mut Schema, context: &mut ExtractionContext<'_>) -> Result<()> {
        let type_ref = type_ref.unwrap_transparent();

        if type_ref.is_collection() {
            set_type(schema, "array");
            if let Some(element) = type_ref.collection_element() {
                let items = schema.items.get_or_insert_with(Default::default);
                let mut sub_context = context.create_sub_context();
                context
                    .engine()
                    .extract(&Source::Type(element), &mut Target::Schema(&mut **items), &mut sub_context)?;
            }
            return Ok(());
        }

        if let Some((schema_type, format)) = primitive_type(&type_ref.name) {
            set_type(schema, schema_type);
            if schema.format.is_none() {
                schema.format = format.map(str::to_string);
            }
            return Ok(());
        }

        if let Some(variants) = self.metadata.enum_variants(&type_ref.name) {
            set_type(schema, "string");
            if schema.enum_values.is_none() {
                schema.enum_values = Some(variants.iter().cloned().map(Value::String).collect());
            }
            return Ok(());
        }

        set_type(schema, "object");
        if self.metadata.class_metadata(&type_ref.name).is_none() {
            debug!("No metadata for type {}; leaving an object placeholder", type_ref);
            return Ok(());
        }

        let mut sub_context = context.create_sub_context();
        if !sub_context.enter_class(&type_ref.name) {
            warn!("Cyclic reference to {}; leaving a bare object", type_ref.name);
            return Ok(());
        }
        context
            .engine()
            .extract(&Source::Class(&type_ref.name), &mut Target::Schema(schema), &mut sub_context)
    }
}

fn set_type(schema: &mut Schema, schema_type: &str) {
    if !schema.is_typed() {
        schema.schema_type = Some(schema_type.to_string());
    }
}

impl Extractor for TypeSchemaExtractor {
    fn name(&self) -> &'static str {
        "type-schema"
    }

    fn can_extract(&self, source: &Source<'_>, target: &Target<'_>, _context: &ExtractionContext<'_>) -> bool {
        matches!((source, target), (Source::Type(_), Target::Schema(_)))
    }

    fn extract(&self, source: &Source<'_>, target: &mut Target<'_>, context: &mut ExtractionContext<'_>) -> Result<()> {
        match (source, target) {
            (Source::Type(type_ref), Target::Schema(schema)) => self.resolve(type_ref, schema, context),
            _ => Err(ExtractionError::impossible(self.name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{Section, SwaggerEngine};
    use crate::metadata::registry::MetadataRegistry;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn engine_with(registry: MetadataRegistry) -> SwaggerEngine {
        let mut engine = SwaggerEngine::empty();
        engine.register(TypeSchemaExtractor::new(Arc::new(registry)), 0, Section::Default);
        engine
    }

    fn resolve(engine: &SwaggerEngine, type_expression: &str) -> Schema {
        let type_ref = TypeRef::parse(type_expression).unwrap();
        let mut schema = Schema::default();
        engine
            .extract_into(&Source::Type(&type_ref), &mut Target::Schema(&mut schema))
            .unwrap();
        schema
    }

    #[test]
    fn test_primitive_types() {
        let engine = engine_with(MetadataRegistry::new());

        assert_eq!(resolve(&engine, "string"), Schema::of_type("string"));
        assert_eq!(resolve(&engine, "bool"), Schema::of_type("boolean"));

        let integer = resolve(&engine, "i64");
        assert_eq!(integer.schema_type.as_deref(), Some("integer"));
        assert_eq!(integer.format.as_deref(), Some("int64"));

        let timestamp = resolve(&engine, "\\DateTime");
        assert_eq!(timestamp.format.as_deref(), Some("date-time"));
    }

    #[test]
    fn test_transparent_wrappers() {
        let engine = engine_with(MetadataRegistry::new());
        assert_eq!(resolve(&engine, "Option<Box<f32>>"), resolve(&engine, "f32"));
        assert_eq!(resolve(&engine, "?int"), resolve(&engine, "int"));
    }

    #[test]
    fn test_keyed_and_plain_collections_share_items() {
        let engine = engine_with(MetadataRegistry::new());

        let keyed = resolve(&engine, "array<string, int>");
        let sequence = resolve(&engine, "Vec<int>");
        assert_eq!(keyed.schema_type.as_deref(), Some("array"));
        assert_eq!(keyed.items, sequence.items);
        assert_eq!(keyed.items.as_deref(), Some(&resolve(&engine, "int")));
    }

    #[test]
    fn test_collection_without_parameters() {
        let engine = engine_with(MetadataRegistry::new());
        let schema = resolve(&engine, "array");
        assert_eq!(schema, Schema::of_type("array"));
    }

    #[test]
    fn test_enumerations() {
        let mut registry = MetadataRegistry::new();
        registry.add_enum("Status", vec!["active".to_string(), "disabled".to_string()]);
        let engine = engine_with(registry);

        let schema = resolve(&engine, "Status");
        assert_eq!(schema.schema_type.as_deref(), Some("string"));
        assert_eq!(schema.enum_values, Some(vec![json!("active"), json!("disabled")]));
    }

    #[test]
    fn test_unknown_type_is_object_placeholder() {
        let engine = engine_with(MetadataRegistry::new());
        assert_eq!(resolve(&engine, "Mystery"), Schema::of_type("object"));
    }

    #[test]
    fn test_existing_type_is_kept() {
        let engine = engine_with(MetadataRegistry::new());
        let type_ref = TypeRef::named("int");
        let mut schema = Schema::of_type("string");

        engine
            .extract_into(&Source::Type(&type_ref), &mut Target::Schema(&mut schema))
            .unwrap();
        assert_eq!(schema.schema_type.as_deref(), Some("string"));
        assert_eq!(schema.format.as_deref(), Some("int32"));
    }

    #[test]
    fn test_primitive_type_table() {
        assert_eq!(primitive_type("u8"), Some(("integer", Some("int32"))));
        assert_eq!(primitive_type("float"), Some(("number", Some("float"))));
        assert_eq!(primitive_type("User"), None);
    }
}
