//! Error types for the tlgen generator.

use thiserror::Error;
use tlgen_define::TypeExprError;

/// Errors that can occur while parsing, resolving or emitting a schema.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A schema line was malformed or appeared out of context
    #[error("Failed to parse schema at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// A property type string could not be split into its parts
    #[error("Invalid type '{raw_type}' in {entity}: {source}")]
    InvalidType {
        entity: String,
        raw_type: String,
        #[source]
        source: TypeExprError,
    },

    /// A declaration references a name that is not declared anywhere.
    ///
    /// Raised before any emission starts, since every emitted file depends on
    /// a fully resolved model.
    #[error("Unresolved reference in {entity}: '{reference}' is not declared")]
    UnresolvedReference { entity: String, reference: String },

    /// Two declarations of the same kind share a name
    #[error("Duplicate {kind} declaration '{name}'")]
    DuplicateDeclaration { kind: &'static str, name: String },

    /// Failed to generate code
    #[error("Code generation failed: {0}")]
    CodeGenError(String),

    /// Failed to read the schema file
    #[error("Failed to read schema file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output file
    #[error("Failed to write output file '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl GeneratorError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        GeneratorError::ParseError {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn unresolved(entity: impl Into<String>, reference: impl Into<String>) -> Self {
        GeneratorError::UnresolvedReference {
            entity: entity.into(),
            reference: reference.into(),
        }
    }
}
