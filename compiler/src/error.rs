//! Error types for compiler configuration and output.
//!
//! Problems inside individual schema documents are not errors: they become
//! [`Diagnostic`](crate::Diagnostic)s and compilation continues. These
//! variants cover the failures that stop a run before or after compilation.

use thiserror::Error;

/// Errors that can occur while loading configuration or writing results.
#[derive(Debug, Error)]
pub enum CompileError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Configuration is structurally valid YAML but unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for results with [`CompileError`].
pub type Result<T> = std::result::Result<T, CompileError>;
