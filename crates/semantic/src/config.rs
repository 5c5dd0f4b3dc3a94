// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Resolver configuration
//!
//! Knobs for the coercion policy and resolution limits. Every field has a
//! default, so a partial JSON document only overrides what it names:
//!
//! ```
//! use sql_resolver_semantic::ResolverConfig;
//! use sql_resolver_ir::DataType;
//!
//! let config = ResolverConfig::from_json(r#"{ "max_nesting_depth": 8 }"#).unwrap();
//! assert_eq!(config.max_nesting_depth, 8);
//! assert_eq!(config.default_type, DataType::String);
//! assert!(config.implicit_literal_parsing);
//! ```

use serde::{Deserialize, Serialize};
use sql_resolver_ir::DataType;

use crate::error::{SemanticError, SemanticResult};

/// Resolver behaviour settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Type given to projected NULLs and untyped `?` references in SELECT
    pub default_type: DataType,

    /// Allow a string literal whose text parses as the target type to be
    /// converted implicitly (`e2 = '5'`)
    pub implicit_literal_parsing: bool,

    /// Retype exact integral literals compared with, or assigned to, a
    /// narrower integral column instead of converting the column
    pub narrow_exact_literals: bool,

    /// Maximum subquery nesting depth
    pub max_nesting_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_type: DataType::String,
            implicit_literal_parsing: true,
            narrow_exact_literals: true,
            max_nesting_depth: 64,
        }
    }
}

impl ResolverConfig {
    /// Parse a configuration document
    ///
    /// # Errors
    ///
    /// Returns `SemanticError::Configuration` if the document does not parse
    /// or names `null` as the default type.
    pub fn from_json(json: &str) -> SemanticResult<Self> {
        let config: ResolverConfig =
            serde_json::from_str(json).map_err(|e| SemanticError::Configuration(e.to_string()))?;
        if config.default_type == DataType::Null {
            return Err(SemanticError::Configuration(
                "default_type cannot be null".to_string(),
            ));
        }
        Ok(config)
    }
}
