//! Class property metadata to object schema.

use crate::error::{ExtractionError, Result};
use crate::extraction::{ExtractionContext, Extractor, Source, Target};
use crate::metadata::docblock::DocBlock;
use crate::metadata::naming::NamingStrategy;
use crate::metadata::{DocCommentSource, MethodRef, PropertyMetadata, PropertyMetadataSource};
use crate::schema::Schema;
use log::debug;
use std::sync::Arc;

/// Fills an object schema with one property schema per serialized property of a class
pub struct PropertyMetadataExtractor {
    metadata: Arc<dyn PropertyMetadataSource>,
    docs: Arc<dyn DocCommentSource>,
    naming: Arc<dyn NamingStrategy>,
}

impl PropertyMetadataExtractor {
    pub fn new(
        metadata: Arc<dyn PropertyMetadataSource>,
        docs: Arc<dyn DocCommentSource>,
        naming: Arc<dyn NamingStrategy>,
    ) -> Self {
        Self { metadata, docs, naming }
    }

    /// Doc text of the property, or of its accessor for a virtual property
    fn description(&self, class: &str, property: &PropertyMetadata) -> String {
        let doc = match &property.accessor {
            Some(accessor) => self.docs.method_doc(&MethodRef::new(Some(class), accessor.as_str())),
            None => self.docs.property_doc(class, &property.name),
        };
        match doc {
            Some(raw) => DocBlock::parse(raw).full_text(),
            None => {
                debug!("No documentation for {}.{}", class, property.name);
                String::new()
            }
        }
    }

    fn property_schema(
        &self,
        property: &PropertyMetadata,
        context: &ExtractionContext<'_>,
    ) -> Result<Schema> {
        let mut schema = Schema::default();
        let Some(type_ref) = &property.type_ref else {
            return Ok(schema);
        };

        let engine = context.engine();
        let mut sub_context = context.create_sub_context();
        match type_ref.unwrap_transparent().collection_element() {
            Some(element) => {
                schema.schema_type = Some("array".to_string());
                let mut items = Schema::default();
                engine.extract(&Source::Type(element), &mut Target::Schema(&mut items), &mut sub_context)?;
                schema.items = Some(Box::new(items));
            }
            None => {
                engine.extract(&Source::Type(type_ref), &mut Target::Schema(&mut schema), &mut sub_context)?;
            }
        }
        Ok(schema)
    }
}

impl Extractor for PropertyMetadataExtractor {
    fn name(&self) -> &'static str {
        "property-metadata"
    }

    fn can_extract(&self, source: &Source<'_>, target: &Target<'_>, _context: &ExtractionContext<'_>) -> bool {
        match (source, target) {
            (Source::Class(class), Target::Schema(_)) => self.metadata.class_metadata(class).is_some(),
            _ => false,
        }
    }

    fn extract(&self, source: &Source<'_>, target: &mut Target<'_>, context: &mut ExtractionContext<'_>) -> Result<()> {
        let (Source::Class(class), Target::Schema(schema)) = (source, target) else {
            return Err(ExtractionError::impossible(self.name()));
        };
        let Some(class_metadata) = self.metadata.class_metadata(class) else {
            return Err(ExtractionError::impossible(self.name()));
        };

        let groups = context.serializer_groups().cloned();
        let mut class_context = context.create_sub_context();
        class_context.enter_class(class);

        if !schema.is_typed() {
            schema.schema_type = Some("object".to_string());
        }

        for property in &class_metadata.properties {
            if let Some(groups) = &groups {
                if !property.in_any_group(groups) {
                    debug!("Skipping {}.{}: not in groups {:?}", class, property.name, groups);
                    continue;
                }
            }

            let name = self.naming.translate_name(property);
            if schema.properties.contains_key(&name) {
                continue;
            }

            let mut property_schema = self.property_schema(property, &class_context)?;
            if property.read_only {
                property_schema.read_only = Some(true);
            }
            if property_schema.description.is_none() {
                property_schema.description = Some(self.description(class, property));
            }
            schema.properties.insert(name, property_schema);
        }

        Ok(())
    }
}
