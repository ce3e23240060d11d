//! Shipped extractors and their default wiring.

pub mod constraint;
pub mod doc_operation;
pub mod document;
pub mod property_metadata;
pub mod type_schema;

pub use constraint::{
    ChoiceRule, ConstraintExtractionContext, ConstraintExtractor, ConstraintRule, LengthRule, NotBlankRule,
    NotNullRule, RangeRule,
};
pub use doc_operation::DocCommentOperationExtractor;
pub use document::SwaggerDocumentExtractor;
pub use property_metadata::PropertyMetadataExtractor;
pub use type_schema::TypeSchemaExtractor;

use crate::config::ExtractionConfig;
use crate::extraction::{Extractor, Section, SwaggerEngine};
use crate::metadata::registry::MetadataRegistry;
use std::sync::Arc;

/// Priority of the extractors that build schemas and operations
pub const PRIORITY_SCHEMA: i32 = 0;
/// Constraint rules run once properties exist
pub const PRIORITY_CONSTRAINTS: i32 = 10;

/// Register every metadata-driven extractor in [`Section::Default`]
pub fn register_default_extractors(
    engine: &mut SwaggerEngine,
    registry: Arc<MetadataRegistry>,
    config: &ExtractionConfig,
) {
    let naming = config.naming_strategy();

    engine.register(TypeSchemaExtractor::new(registry.clone()), PRIORITY_SCHEMA, Section::Default);
    engine.register(
        PropertyMetadataExtractor::new(registry.clone(), registry.clone(), naming.clone()),
        PRIORITY_SCHEMA,
        Section::Default,
    );

    let mut doc_extractor = DocCommentOperationExtractor::new(registry.clone(), registry.clone());
    for mapping in &config.exception_response_codes {
        doc_extractor.register_exception_response_codes(&mapping.exception, mapping.code, mapping.message.clone());
    }
    engine.register(doc_extractor, PRIORITY_SCHEMA, Section::Default);

    let constraint_extractors: Vec<Box<dyn Extractor>> = vec![
        Box::new(ConstraintExtractor::new(NotBlankRule, registry.clone(), registry.clone(), naming.clone())),
        Box::new(ConstraintExtractor::new(NotNullRule, registry.clone(), registry.clone(), naming.clone())),
        Box::new(ConstraintExtractor::new(LengthRule, registry.clone(), registry.clone(), naming.clone())),
        Box::new(ConstraintExtractor::new(RangeRule, registry.clone(), registry.clone(), naming.clone())),
        Box::new(ConstraintExtractor::new(ChoiceRule, registry.clone(), registry, naming)),
    ];
    for extractor in constraint_extractors {
        engine.register_boxed(extractor, PRIORITY_CONSTRAINTS, Section::Default);
    }
}
