use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors surfaced by a handler or by the field accessors it relies on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HandlerError {
    /// An operation was invoked on a handler that only stubs it.
    #[error("Operation not implemented: {0}")]
    NotImplemented(String),

    /// Carries the full path that was requested, not just the missing segment.
    #[error("Unknown property {0} requested")]
    PropertyNotFound(String),

    #[error("Invalid field path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Processing failed: {0}")]
    ProcessingFailure(String),
}

impl HandlerError {
    pub fn not_implemented(operation: impl Into<String>) -> Self {
        HandlerError::NotImplemented(operation.into())
    }

    pub fn processing(cause: impl std::fmt::Display) -> Self {
        HandlerError::ProcessingFailure(cause.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Handler already registered: {0}")]
    DuplicateHandler(String),

    #[error("Unknown handler: {0}")]
    UnknownHandler(String),

    #[error("Invalid metadata for '{id}': {reason}")]
    InvalidMetadata { id: String, reason: String },
}
