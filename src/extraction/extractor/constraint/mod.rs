//! Validation constraints applied to property schemas.
//!
//! [`ConstraintExtractor`] walks the constraints declared on a class and hands
//! every one its [`ConstraintRule`] supports to that rule, together with the
//! property schema and the owning schema's `required` list. One extractor is
//! registered per rule; each makes a narrow "fill if unset" adjustment.

mod not_blank;
mod rules;

pub use not_blank::NotBlankRule;
pub use rules::{ChoiceRule, LengthRule, NotNullRule, RangeRule};

use crate::error::{ExtractionError, Result};
use crate::extraction::{ExtractionContext, Extractor, Source, Target};
use crate::metadata::naming::NamingStrategy;
use crate::metadata::{Constraint, ConstraintSource, PropertyMetadataSource};
use crate::schema::Schema;
use std::sync::Arc;

/// What a rule may touch while applying one constraint
pub struct ConstraintExtractionContext<'a> {
    /// Wire name of the property
    pub property_name: &'a str,
    pub property_schema: &'a mut Schema,
    /// `required` list of the owning object schema
    pub required: &'a mut Vec<String>,
}

impl ConstraintExtractionContext<'_> {
    /// Add the property to `required` unless it is already listed
    pub fn mark_required(&mut self) {
        if !self.required.iter().any(|name| name == self.property_name) {
            self.required.push(self.property_name.to_string());
        }
    }
}

/// The effect of one constraint kind
pub trait ConstraintRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn supports(&self, constraint: &Constraint) -> bool;

    /// Apply `constraint`; fails with `UnsupportedConstraint` for a kind `supports` rejects
    fn apply(&self, constraint: &Constraint, context: &mut ConstraintExtractionContext<'_>) -> Result<()>;
}

pub(crate) fn unsupported(rule: &dyn ConstraintRule, constraint: &Constraint) -> ExtractionError {
    ExtractionError::UnsupportedConstraint {
        extractor: rule.name(),
        constraint: constraint.kind().to_string(),
    }
}

/// Runs one [`ConstraintRule`] over every property of a class
pub struct ConstraintExtractor<R> {
    rule: R,
    constraints: Arc<dyn ConstraintSource>,
    metadata: Arc<dyn PropertyMetadataSource>,
    naming: Arc<dyn NamingStrategy>,
}

impl<R: ConstraintRule> ConstraintExtractor<R> {
    pub fn new(
        rule: R,
        constraints: Arc<dyn ConstraintSource>,
        metadata: Arc<dyn PropertyMetadataSource>,
        naming: Arc<dyn NamingStrategy>,
    ) -> Self {
        Self {
            rule,
            constraints,
            metadata,
            naming,
        }
    }

    /// Wire name of `property`, falling back to the internal name for unknown properties
    fn wire_name(&self, class: &str, property: &str) -> String {
        self.metadata
            .class_metadata(class)
            .and_then(|metadata| metadata.properties.iter().find(|p| p.name == property))
            .map(|metadata| self.naming.translate_name(metadata))
            .unwrap_or_else(|| property.to_string())
    }

    fn applies_to(&self, class: &str) -> bool {
        self.constraints
            .property_constraints(class)
            .iter()
            .flat_map(|entry| entry.constraints.iter())
            .any(|constraint| self.rule.supports(constraint))
    }
}

impl<R: ConstraintRule> Extractor for ConstraintExtractor<R> {
    fn name(&self) -> &'static str {
        self.rule.name()
    }

    fn can_extract(&self, source: &Source<'_>, target: &Target<'_>, _context: &ExtractionContext<'_>) -> bool {
        match (source, target) {
            (Source::Class(class), Target::Schema(_)) => self.applies_to(class),
            _ => false,
        }
    }

    fn extract(&self, source: &Source<'_>, target: &mut Target<'_>, _context: &mut ExtractionContext<'_>) -> Result<()> {
        let (Source::Class(class), Target::Schema(schema)) = (source, target) else {
            return Err(ExtractionError::impossible(self.name()));
        };
        if !self.applies_to(class) {
            return Err(ExtractionError::impossible(self.name()));
        }

        let schema: &mut Schema = schema;
        for entry in self.constraints.property_constraints(class) {
            let property_name = self.wire_name(class, &entry.property);
            let Some(property_schema) = schema.properties.get_mut(&property_name) else {
                continue;
            };

            for constraint in entry.constraints.iter().filter(|c| self.rule.supports(c)) {
                let mut context = ConstraintExtractionContext {
                    property_name: &property_name,
                    property_schema: &mut *property_schema,
                    required: &mut schema.required,
                };
                self.rule.apply(constraint, &mut context)?;
            }
        }
        Ok(())
    }
}
