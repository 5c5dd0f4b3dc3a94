// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for Catalog operations
//!
//! This module defines the error types used throughout the catalog layer.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for Catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur during Catalog operations
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum CatalogError {
    /// No group matches the name at any qualification level
    #[error("Group does not exist: {0}")]
    GroupNotFound(String),

    /// A partial name matches more than one group
    #[error(
        "Group specified is ambiguous, resubmit the query by fully qualifying the group name: {name}"
    )]
    AmbiguousGroup {
        name: String,
        candidates: Vec<String>,
    },

    /// No procedure matches the name
    #[error("Procedure does not exist: {0}")]
    ProcedureNotFound(String),

    /// A partial name matches more than one procedure
    #[error(
        "Procedure specified is ambiguous, resubmit the query by fully qualifying the procedure name: {name}"
    )]
    AmbiguousProcedure {
        name: String,
        candidates: Vec<String>,
    },

    /// Failed to serialize or deserialize catalog data
    #[error("Failed to read catalog document: {0}")]
    SerializationError(String),

    /// Invalid catalog contents
    #[error("Invalid catalog configuration: {0}")]
    ConfigurationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_group_not_found() {
        let err = CatalogError::GroupNotFound("pm1.nope".to_string());
        assert_eq!(err.to_string(), "Group does not exist: pm1.nope");
    }

    #[test]
    fn test_error_display_ambiguous_group() {
        let err = CatalogError::AmbiguousGroup {
            name: "g1".to_string(),
            candidates: vec!["pm1.g1".to_string(), "pm2.g1".to_string()],
        };
        let msg = format!("{}", err);
        assert!(msg.contains("ambiguous"));
        assert!(msg.ends_with(": g1"));
    }
}
