//! Error taxonomy for the metadata layer

use thiserror::Error;

/// Errors surfaced by catalog introspection.
///
/// None of these are retried: they are either configuration problems
/// (wrong credentials or path) or structural mismatches between the
/// queries and the live catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// Opening or closing a session failed
    #[error("connection error: {0}")]
    Connection(String),

    /// The engine rejected or failed a statement; carries the raw engine message
    #[error("{0}")]
    Execution(String),

    /// A result had a shape the caller relied on not having
    /// (no row where exactly one is required, unknown privilege code, ...)
    #[error("contract violation: {0}")]
    ContractViolation(String),
}

impl MetadataError {
    pub fn not_found(kind: &str, name: &str) -> Self {
        MetadataError::ContractViolation(format!("{} '{}' not found in catalog", kind, name))
    }

    pub fn missing_column(column: &str) -> Self {
        MetadataError::ContractViolation(format!("result has no column {}", column))
    }
}

pub type Result<T> = std::result::Result<T, MetadataError>;
