use super::{unsupported, ConstraintExtractionContext, ConstraintRule};
use crate::error::Result;
use crate::metadata::Constraint;

/// Format marker set on properties that must not be blank
pub const NOT_EMPTY_FORMAT: &str = "not empty";

/// A property that must not be blank gets the `not empty` format and becomes required.
/// Properties that already carry a format are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotBlankRule;

impl ConstraintRule for NotBlankRule {
    fn name(&self) -> &'static str {
        "not-blank-constraint"
    }

    fn supports(&self, constraint: &Constraint) -> bool {
        matches!(constraint, Constraint::NotBlank)
    }

    fn apply(&self, constraint: &Constraint, context: &mut ConstraintExtractionContext<'_>) -> Result<()> {
        if !self.supports(constraint) {
            return Err(unsupported(self, constraint));
        }
        if context.property_schema.format.is_none() {
            context.property_schema.format = Some(NOT_EMPTY_FORMAT.to_string());
            context.mark_required();
        }
        Ok(())
    }
}
