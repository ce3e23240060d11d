//! Extraction engine and extractor contract.
//!
//! A [`SwaggerEngine`] owns an ordered list of [`Extractor`] plugins. Each
//! extraction request pairs a [`Source`] (a class, a method, a type or raw
//! text) with a mutable [`Target`] inside the document being built. Every
//! registered extractor that accepts the pair runs in order and may recurse
//! back into the engine through its [`ExtractionContext`].

pub mod context;
pub mod engine;
pub mod extractor;

pub use context::{ContextParameters, Direction, ExtractionContext, ModelContext};
pub use engine::{sort_registrations, SwaggerEngine};

use crate::error::Result;
use crate::metadata::{MethodRef, TypeRef};
use crate::schema::{Operation, Schema, Swagger};
use std::fmt;

/// What an extractor reads from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Source<'s> {
    /// A class known to the metadata providers, by name
    Class(&'s str),
    /// A documented method
    Method(&'s MethodRef),
    /// A declared type to turn into a schema
    Type(&'s TypeRef),
    /// Raw serialized input, e.g. an existing Swagger document
    Raw(&'s str),
}

/// The record an extractor writes into
#[derive(Debug)]
pub enum Target<'t> {
    Document(&'t mut Swagger),
    Schema(&'t mut Schema),
    Operation(&'t mut Operation),
}

impl Target<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Target::Document(_) => "document",
            Target::Schema(_) => "schema",
            Target::Operation(_) => "operation",
        }
    }
}

/// A plugin contributing part of a document.
///
/// `extract` re-checks applicability and fails with
/// [`crate::error::ExtractionError::Impossible`] when called on a pair that
/// `can_extract` rejects. Writes are "fill if unset": running an extractor
/// twice against the same target leaves it unchanged.
pub trait Extractor: Send + Sync {
    /// Stable identifier used in logs and errors
    fn name(&self) -> &'static str;

    /// Whether this extractor can contribute to the pair. Must not mutate anything.
    fn can_extract(&self, source: &Source<'_>, target: &Target<'_>, context: &ExtractionContext<'_>) -> bool;

    fn extract(
        &self,
        source: &Source<'_>,
        target: &mut Target<'_>,
        context: &mut ExtractionContext<'_>,
    ) -> Result<()>;
}

/// Coarse grouping of extractors, ordered above their priority
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Section {
    /// Seeding the document from pre-existing input
    Bootstrap,
    #[default]
    Default,
    Named(String),
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Bootstrap => write!(f, "bootstrap"),
            Section::Default => write!(f, "default"),
            Section::Named(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for Section {
    fn from(name: &str) -> Self {
        match name {
            "bootstrap" => Section::Bootstrap,
            "default" => Section::Default,
            other => Section::Named(other.to_string()),
        }
    }
}

/// One extractor registered under a section and priority
pub struct ExtractorRegistration {
    pub extractor: Box<dyn Extractor>,
    pub section: Section,
    pub priority: i32,
}

impl fmt::Debug for ExtractorRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorRegistration")
            .field("extractor", &self.extractor.name())
            .field("section", &self.section)
            .field("priority", &self.priority)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_names_round_trip() {
        assert_eq!(Section::from("bootstrap"), Section::Bootstrap);
        assert_eq!(Section::from("default"), Section::Default);
        assert_eq!(Section::from("constraints"), Section::Named("constraints".to_string()));
        assert_eq!(Section::Named("constraints".to_string()).to_string(), "constraints");
    }

    #[test]
    fn test_target_kind() {
        let mut schema = Schema::default();
        assert_eq!(Target::Schema(&mut schema).kind(), "schema");
    }
}
