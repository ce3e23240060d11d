use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Error types raised while extracting or dumping a schema document
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// An extractor was asked to handle a source/target pair it does not accept.
    ///
    /// The engine always checks `can_extract` first, so this only surfaces when an
    /// extractor is driven directly or discovers mid-way that required data is absent.
    #[error("extractor `{extractor}` cannot extract the requested source/target pair")]
    Impossible { extractor: &'static str },

    /// A constraint rule was handed a constraint kind it does not handle
    #[error("constraint `{constraint}` is not supported by `{extractor}`")]
    UnsupportedConstraint {
        extractor: &'static str,
        constraint: String,
    },

    /// A well-known context parameter was given a value of the wrong shape
    #[error("invalid context parameter `{name}`: {message}")]
    InvalidParameter { name: String, message: String },

    /// A raw document carried the expected signature but did not match the document model
    #[error("malformed schema document: {0}")]
    Document(#[from] serde_json::Error),

    /// Aggregated dump-time validation failure
    #[error("invalid schema document:\n{}", .violations.join("\n"))]
    InvalidDocument { violations: Vec<String> },

    /// A Rust source file could not be parsed
    #[error("failed to parse {}: {message}", .file.display())]
    Parse { file: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ExtractionError {
    /// Shorthand for the "extraction impossible" contract violation
    pub fn impossible(extractor: &'static str) -> Self {
        ExtractionError::Impossible { extractor }
    }
}
