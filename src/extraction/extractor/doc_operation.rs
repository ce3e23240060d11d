//! Method documentation comment to operation.

use super::type_schema::primitive_type;
use crate::error::{ExtractionError, Result};
use crate::extraction::{Direction, ExtractionContext, Extractor, Source, Target};
use crate::metadata::docblock::{DocBlock, DocTag};
use crate::metadata::{DeclarationSource, DocCommentSource, TypeRef};
use crate::schema::{Operation, ParameterLocation, Response, Schema};
use indexmap::IndexMap;
use log::debug;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

const DEFAULT_EXCEPTION_CODE: u16 = 500;

/// Fills an operation from the structured doc comment of the method behind it.
///
/// Summary and description, a `200` response from `@return`, `deprecated`
/// from `@deprecated`, one error response per `@throws` and parameter
/// descriptions and types from `@param`. Nothing already set is overwritten.
pub struct DocCommentOperationExtractor {
    docs: Arc<dyn DocCommentSource>,
    declarations: Arc<dyn DeclarationSource>,
    exception_response_codes: IndexMap<String, (u16, Option<String>)>,
}

impl DocCommentOperationExtractor {
    pub fn new(docs: Arc<dyn DocCommentSource>, declarations: Arc<dyn DeclarationSource>) -> Self {
        Self {
            docs,
            declarations,
            exception_response_codes: IndexMap::new(),
        }
    }

    /// Map an exception type (and its descendants) to a status code and default message.
    /// Registering the same exception again replaces its mapping.
    pub fn register_exception_response_codes(
        &mut self,
        exception: impl Into<String>,
        code: u16,
        message: Option<String>,
    ) {
        self.exception_response_codes.insert(exception.into(), (code, message));
    }

    /// Status code and message of the closest mapped type in the lineage of `exception`
    fn exception_information(&self, exception: &str) -> (u16, Option<String>) {
        let mut queue = VecDeque::from([exception.to_string()]);
        let mut seen = HashSet::new();

        while let Some(name) = queue.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some((code, message)) = self.exception_response_codes.get(&name) {
                return (*code, message.clone());
            }
            if let Some(declaration) = self.declarations.declaration(&name) {
                queue.extend(declaration.parents.iter().cloned());
            }
        }

        (DEFAULT_EXCEPTION_CODE, None)
    }

    fn extract_return(
        &self,
        block: &DocBlock,
        operation: &mut Operation,
        context: &ExtractionContext<'_>,
    ) -> Result<()> {
        for tag in block.returns() {
            let DocTag::Return { type_ref, description } = tag else {
                continue;
            };
            if operation.responses.contains_key("200") {
                continue;
            }

            let mut schema = Schema::default();
            let mut sub_context = context.create_sub_context();
            sub_context.set_direction(Direction::Out);
            context
                .engine()
                .extract(&Source::Type(type_ref), &mut Target::Schema(&mut schema), &mut sub_context)?;

            operation.responses.insert(
                "200".to_string(),
                Response {
                    description: Some(description.clone()),
                    schema: Some(schema),
                },
            );
        }
        Ok(())
    }

    fn extract_throws(&self, block: &DocBlock, operation: &mut Operation) {
        for tag in block.throws() {
            let DocTag::Throws { type_ref, description } = tag else {
                continue;
            };
            let Some(declaration) = self.declarations.declaration(&type_ref.name) else {
                debug!("Cannot resolve thrown type {}; skipping", type_ref);
                continue;
            };
            if !declaration.is_concrete() {
                debug!("Thrown type {} is {:?}; skipping", declaration.name, declaration.kind);
                continue;
            }

            let (code, message) = self.exception_information(&declaration.name);
            let description = if !description.is_empty() {
                description.clone()
            } else if let Some(message) = message {
                message
            } else {
                declaration
                    .doc
                    .as_deref()
                    .map(|doc| DocBlock::parse(doc).full_text())
                    .unwrap_or_default()
            };

            operation
                .responses
                .entry(code.to_string())
                .or_insert_with(|| Response {
                    description: Some(description),
                    schema: None,
                });
        }
    }

    fn extract_params(
        &self,
        block: &DocBlock,
        operation: &mut Operation,
        context: &ExtractionContext<'_>,
    ) -> Result<()> {
        for tag in block.params() {
            let DocTag::Param {
                type_ref,
                variable,
                description,
            } = tag
            else {
                continue;
            };

            if let Some(parameter) = operation.parameters.iter_mut().find(|p| &p.name == variable) {
                if parameter.description.is_none() && !description.is_empty() {
                    parameter.description = Some(description.clone());
                }
                // body parameters are typed through their schema only
                if parameter.parameter_type.is_none() && parameter.location != ParameterLocation::Body {
                    if let Some(type_ref) = type_ref {
                        apply_parameter_type(type_ref, &mut parameter.parameter_type, &mut parameter.format);
                    }
                }
                continue;
            }

            let Some(property) = operation
                .body_parameter_mut()
                .and_then(|body| body.schema.as_mut())
                .and_then(|schema| schema.properties.get_mut(variable))
            else {
                debug!("Unmatched @param {}; ignoring", variable);
                continue;
            };

            if property.description.is_none() && !description.is_empty() {
                property.description = Some(description.clone());
            }
            if !property.is_typed() {
                if let Some(type_ref) = type_ref {
                    let mut sub_context = context.create_sub_context();
                    sub_context.set_direction(Direction::In);
                    context
                        .engine()
                        .extract(&Source::Type(type_ref), &mut Target::Schema(property), &mut sub_context)?;
                }
            }
        }
        Ok(())
    }
}

/// Flat `type`/`format` of a non-body parameter
fn apply_parameter_type(type_ref: &TypeRef, parameter_type: &mut Option<String>, format: &mut Option<String>) {
    match primitive_type(&type_ref.unwrap_transparent().name) {
        Some((mapped_type, mapped_format)) => {
            *parameter_type = Some(mapped_type.to_string());
            if format.is_none() {
                *format = mapped_format.map(str::to_string);
            }
        }
        None => *parameter_type = Some(type_ref.to_string()),
    }
}

impl Extractor for DocCommentOperationExtractor {
    fn name(&self) -> &'static str {
        "doc-comment-operation"
    }

    fn can_extract(&self, source: &Source<'_>, target: &Target<'_>, _context: &ExtractionContext<'_>) -> bool {
        match (source, target) {
            (Source::Method(method), Target::Operation(_)) => self.docs.method_doc(method).is_some(),
            _ => false,
        }
    }

    fn extract(&self, source: &Source<'_>, target: &mut Target<'_>, context: &mut ExtractionContext<'_>) -> Result<()> {
        let (Source::Method(method), Target::Operation(operation)) = (source, target) else {
            return Err(ExtractionError::impossible(self.name()));
        };
        let Some(raw) = self.docs.method_doc(method) else {
            return Err(ExtractionError::impossible(self.name()));
        };
        let block = DocBlock::parse(raw);

        if operation.summary.is_none() && !block.summary.is_empty() {
            operation.summary = Some(block.summary.clone());
        }
        if operation.description.is_none() && !block.description.is_empty() {
            operation.description = Some(block.description.clone());
        }

        self.extract_return(&block, operation, context)?;

        if block.is_deprecated() {
            operation.deprecated = Some(true);
        }

        self.extract_throws(&block, operation);
        self.extract_params(&block, operation, context)
    }
}
