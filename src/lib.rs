//! Swagger extraction - incrementally derive Swagger 2.0 documents from metadata.
//!
//! A [`SwaggerEngine`](extraction::SwaggerEngine) holds a prioritized chain of
//! [`Extractor`](extraction::Extractor)s. Each one is asked whether it can
//! contribute to a (source, target) pair and, if so, fills in whatever the
//! target does not already carry. Extractors recurse through the engine with
//! forked [`ExtractionContext`](extraction::ExtractionContext)s, so a class
//! property typed as another class is resolved by the same chain.
//!
//! # Architecture
//!
//! 1. [`metadata`] - provider traits plus the [`MetadataRegistry`](metadata::registry::MetadataRegistry),
//!    filled from descriptors or Rust sources
//! 2. [`extraction`] - engine, context and the shipped extractors
//! 3. [`schema`] - the Swagger 2.0 document model being populated
//! 4. [`serializer`] - dump-time validation and YAML/JSON output
//! 5. [`config`] - naming, exception mappings and root context parameters
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use swagger_extraction::config::ExtractionConfig;
//! use swagger_extraction::extraction::extractor::register_default_extractors;
//! use swagger_extraction::extraction::{Source, SwaggerEngine, Target};
//! use swagger_extraction::metadata::registry::MetadataRegistry;
//! use swagger_extraction::schema::Schema;
//!
//! let mut registry = MetadataRegistry::new();
//! registry.load_descriptor_str("classes:\n  Tag:\n    properties:\n      - name: label\n        type: string\n").unwrap();
//!
//! let mut engine = SwaggerEngine::new();
//! register_default_extractors(&mut engine, Arc::new(registry), &ExtractionConfig::default());
//!
//! let mut schema = Schema::default();
//! engine.extract_into(&Source::Class("Tag"), &mut Target::Schema(&mut schema)).unwrap();
//! assert_eq!(schema.properties["label"].schema_type.as_deref(), Some("string"));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod metadata;
pub mod schema;
pub mod serializer;
