//! Per-call extraction state.
//!
//! An [`ExtractionContext`] pairs the engine driving the extraction with a
//! [`ContextParameters`] value. Forking with
//! [`ExtractionContext::create_sub_context`] copies the parameters, so a
//! nested extraction can change them without affecting its caller and the
//! caller's later changes never reach an already forked child.

use super::engine::SwaggerEngine;
use crate::error::{ExtractionError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

pub const PARAM_DIRECTION: &str = "direction";
pub const PARAM_IN_MODEL_CONTEXT: &str = "in-model-context";
pub const PARAM_OUT_MODEL_CONTEXT: &str = "out-model-context";

/// Whether a schema models a request payload or a response payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

/// Model settings for one direction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelContext {
    /// Only properties in one of these serializer groups are extracted
    #[serde(rename = "serializer-groups", default, skip_serializing_if = "Option::is_none")]
    pub serializer_groups: Option<BTreeSet<String>>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl ModelContext {
    pub fn with_groups<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            serializer_groups: Some(groups.into_iter().map(Into::into).collect()),
            extra: IndexMap::new(),
        }
    }
}

/// Parameters threaded through an extraction call tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextParameters {
    pub direction: Option<Direction>,
    pub in_model_context: ModelContext,
    pub out_model_context: ModelContext,
    /// Parameters not known to the shipped extractors
    pub extra: IndexMap<String, Value>,
    /// Classes currently being resolved, outermost first
    resolving: Vec<String>,
}

/// Engine handle plus parameters for one extraction
#[derive(Debug, Clone)]
pub struct ExtractionContext<'e> {
    engine: &'e SwaggerEngine,
    parameters: ContextParameters,
}

impl<'e> ExtractionContext<'e> {
    pub fn new(engine: &'e SwaggerEngine) -> Self {
        Self::with_parameters(engine, ContextParameters::default())
    }

    pub fn with_parameters(engine: &'e SwaggerEngine, parameters: ContextParameters) -> Self {
        Self { engine, parameters }
    }

    /// The engine every nested extraction must go through
    pub fn engine(&self) -> &'e SwaggerEngine {
        self.engine
    }

    pub fn parameters(&self) -> &ContextParameters {
        &self.parameters
    }

    /// Fork a context bound to the same engine with a snapshot of the parameters
    pub fn create_sub_context(&self) -> ExtractionContext<'e> {
        self.clone()
    }

    pub fn direction(&self) -> Option<Direction> {
        self.parameters.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.parameters.direction = Some(direction);
    }

    /// Model context selected by the current direction
    pub fn model_context(&self) -> Option<&ModelContext> {
        match self.parameters.direction {
            Some(Direction::In) => Some(&self.parameters.in_model_context),
            Some(Direction::Out) => Some(&self.parameters.out_model_context),
            None => None,
        }
    }

    /// Active serializer group filter; `None` or an empty set disables filtering
    pub fn serializer_groups(&self) -> Option<&BTreeSet<String>> {
        self.model_context()
            .and_then(|model| model.serializer_groups.as_ref())
            .filter(|groups| !groups.is_empty())
    }

    /// Read a parameter by name, including the well-known typed ones
    pub fn get_parameter(&self, name: &str) -> Option<Value> {
        match name {
            PARAM_DIRECTION => self
                .parameters
                .direction
                .map(|direction| Value::String(direction.as_str().to_string())),
            PARAM_IN_MODEL_CONTEXT => serde_json::to_value(&self.parameters.in_model_context).ok(),
            PARAM_OUT_MODEL_CONTEXT => serde_json::to_value(&self.parameters.out_model_context).ok(),
            other => self.parameters.extra.get(other).cloned(),
        }
    }

    pub fn get_parameter_or(&self, name: &str, default: Value) -> Value {
        self.get_parameter(name).unwrap_or(default)
    }

    /// Set a parameter by name. `null` clears a well-known parameter.
    pub fn set_parameter(&mut self, name: &str, value: Value) -> Result<()> {
        let invalid = |e: serde_json::Error| ExtractionError::InvalidParameter {
            name: name.to_string(),
            message: e.to_string(),
        };

        match name {
            PARAM_DIRECTION => {
                self.parameters.direction = match value {
                    Value::Null => None,
                    value => Some(serde_json::from_value(value).map_err(invalid)?),
                };
            }
            PARAM_IN_MODEL_CONTEXT => {
                self.parameters.in_model_context = match value {
                    Value::Null => ModelContext::default(),
                    value => serde_json::from_value(value).map_err(invalid)?,
                };
            }
            PARAM_OUT_MODEL_CONTEXT => {
                self.parameters.out_model_context = match value {
                    Value::Null => ModelContext::default(),
                    value => serde_json::from_value(value).map_err(invalid)?,
                };
            }
            other => {
                self.parameters.extra.insert(other.to_string(), value);
            }
        }
        Ok(())
    }

    /// Whether `class` is already being resolved further up this call tree
    pub fn is_resolving(&self, class: &str) -> bool {
        self.parameters.resolving.iter().any(|entry| entry == class)
    }

    /// Record that this context resolves `class`; returns `false` on a cycle
    pub fn enter_class(&mut self, class: &str) -> bool {
        if self.is_resolving(class) {
            return false;
        }
        self.parameters.resolving.push(class.to_string());
        true
    }
}
