use super::{unsupported, ConstraintExtractionContext, ConstraintRule};
use crate::error::Result;
use crate::metadata::Constraint;

/// A property that must not be null becomes required
#[derive(Debug, Clone, Copy, Default)]
pub struct NotNullRule;

impl ConstraintRule for NotNullRule {
    fn name(&self) -> &'static str {
        "not-null-constraint"
    }

    fn supports(&self, constraint: &Constraint) -> bool {
        matches!(constraint, Constraint::NotNull)
    }

    fn apply(&self, constraint: &Constraint, context: &mut ConstraintExtractionContext<'_>) -> Result<()> {
        if !self.supports(constraint) {
            return Err(unsupported(self, constraint));
        }
        context.mark_required();
        Ok(())
    }
}

/// String length bounds become `minLength`/`maxLength`
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthRule;

impl ConstraintRule for LengthRule {
    fn name(&self) -> &'static str {
        "length-constraint"
    }

    fn supports(&self, constraint: &Constraint) -> bool {
        matches!(constraint, Constraint::Length { .. })
    }

    fn apply(&self, constraint: &Constraint, context: &mut ConstraintExtractionContext<'_>) -> Result<()> {
        let Constraint::Length { min, max } = constraint else {
            return Err(unsupported(self, constraint));
        };
        let schema = &mut *context.property_schema;
        if schema.min_length.is_none() {
            schema.min_length = *min;
        }
        if schema.max_length.is_none() {
            schema.max_length = *max;
        }
        Ok(())
    }
}

/// Numeric bounds become `minimum`/`maximum`
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeRule;

impl ConstraintRule for RangeRule {
    fn name(&self) -> &'static str {
        "range-constraint"
    }

    fn supports(&self, constraint: &Constraint) -> bool {
        matches!(constraint, Constraint::Range { .. })
    }

    fn apply(&self, constraint: &Constraint, context: &mut ConstraintExtractionContext<'_>) -> Result<()> {
        let Constraint::Range { min, max } = constraint else {
            return Err(unsupported(self, constraint));
        };
        let schema = &mut *context.property_schema;
        if schema.minimum.is_none() {
            schema.minimum = *min;
        }
        if schema.maximum.is_none() {
            schema.maximum = *max;
        }
        Ok(())
    }
}

/// A closed set of choices becomes `enum`
#[derive(Debug, Clone, Copy, Default)]
pub struct ChoiceRule;

impl ConstraintRule for ChoiceRule {
    fn name(&self) -> &'static str {
        "choice-constraint"
    }

    fn supports(&self, constraint: &Constraint) -> bool {
        matches!(constraint, Constraint::Choice { .. })
    }

    fn apply(&self, constraint: &Constraint, context: &mut ConstraintExtractionContext<'_>) -> Result<()> {
        let Constraint::Choice { choices } = constraint else {
            return Err(unsupported(self, constraint));
        };
        if context.property_schema.enum_values.is_none() && !choices.is_empty() {
            context.property_schema.enum_values = Some(choices.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::schema::Schema;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// Helper function to apply one rule to a fresh `age` property
    fn apply_to(
        rule: &dyn ConstraintRule,
        constraint: Constraint,
        schema: &mut Schema,
        required: &mut Vec<String>,
    ) -> Result<()> {
        let mut context = ConstraintExtractionContext {
            property_name: "age",
            property_schema: schema,
            required,
        };
        rule.apply(&constraint, &mut context)
    }

    #[test]
    fn test_not_null_requires_once() {
        let mut schema = Schema::of_type("integer");
        let mut required = Vec::new();

        apply_to(&NotNullRule, Constraint::NotNull, &mut schema, &mut required).unwrap();
        apply_to(&NotNullRule, Constraint::NotNull, &mut schema, &mut required).unwrap();
        assert_eq!(required, vec!["age".to_string()]);
        assert_eq!(schema, Schema::of_type("integer"));
    }

    #[test]
    fn test_length_fills_unset_bounds() {
        let mut schema = Schema::of_type("string");
        schema.max_length = Some(10);
        let mut required = Vec::new();

        let length = Constraint::Length { min: Some(2), max: Some(64) };
        apply_to(&LengthRule, length, &mut schema, &mut required).unwrap();
        assert_eq!(schema.min_length, Some(2));
        assert_eq!(schema.max_length, Some(10));
        assert!(required.is_empty());
    }

    #[test]
    fn test_range_fills_unset_bounds() {
        let mut schema = Schema::of_type("integer");
        let mut required = Vec::new();

        let range = Constraint::Range { min: None, max: Some(120.0) };
        apply_to(&RangeRule, range, &mut schema, &mut required).unwrap();
        assert_eq!(schema.minimum, None);
        assert_eq!(schema.maximum, Some(120.0));
    }

    #[test]
    fn test_choice_sets_enum_once() {
        let mut schema = Schema::of_type("string");
        let mut required = Vec::new();

        let first = Constraint::Choice { choices: vec![json!("a"), json!("b")] };
        let second = Constraint::Choice { choices: vec![json!("c")] };
        apply_to(&ChoiceRule, first, &mut schema, &mut required).unwrap();
        apply_to(&ChoiceRule, second, &mut schema, &mut required).unwrap();
        assert_eq!(schema.enum_values, Some(vec![json!("a"), json!("b")]));
    }

    #[test]
    fn test_rules_reject_foreign_constraints() {
        let mut schema = Schema::default();
        let mut required = Vec::new();
        let rules: [&dyn ConstraintRule; 4] = [&NotNullRule, &LengthRule, &RangeRule, &ChoiceRule];

        for rule in rules {
            let err = apply_to(rule, Constraint::NotBlank, &mut schema, &mut required).unwrap_err();
            assert!(matches!(err, ExtractionError::UnsupportedConstraint { .. }));
        }
        assert_eq!(schema, Schema::default());
    }
}
