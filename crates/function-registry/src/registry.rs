// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use crate::{FunctionMetadata, FunctionType, builtin};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Errors raised while registering signatures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Failed to read function definitions: {0}")]
    InvalidDefinition(String),
}

/// Function registry for builtin SQL functions
///
/// Stores every overload under its lowercase name. Namespaced functions are
/// stored under `namespace.name`.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, Vec<FunctionMetadata>>,
}

impl FunctionRegistry {
    /// Create a new function registry with all builtin functions loaded
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sql_resolver_function_registry::FunctionRegistry;
    ///
    /// let registry = FunctionRegistry::new();
    /// assert!(registry.has_function("concat"));
    /// ```
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for function in builtin::all_functions() {
            registry.register(function);
        }
        registry
    }

    /// Create a registry without any signatures
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Add one overload
    pub fn register(&mut self, function: FunctionMetadata) {
        self.functions
            .entry(function.qualified_name().to_ascii_lowercase())
            .or_default()
            .push(function);
    }

    /// Builder method: add one overload
    pub fn with_function(mut self, function: FunctionMetadata) -> Self {
        self.register(function);
        self
    }

    /// Register overloads from a JSON array of function definitions
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidDefinition` when the document does not
    /// parse.
    pub fn register_json(&mut self, json: &str) -> Result<usize, RegistryError> {
        let functions: Vec<FunctionMetadata> = serde_json::from_str(json)
            .map_err(|e| RegistryError::InvalidDefinition(e.to_string()))?;
        let count = functions.len();
        for function in functions {
            self.register(function);
        }
        debug!(count, "registered function definitions");
        Ok(count)
    }

    /// All overloads of a function (case-insensitive)
    pub fn get_functions(&self, name: &str) -> &[FunctionMetadata] {
        self.functions
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Overloads that accept `arg_count` arguments
    pub fn candidates(&self, name: &str, arg_count: usize) -> Vec<&FunctionMetadata> {
        self.get_functions(name)
            .iter()
            .filter(|f| f.accepts_arity(arg_count))
            .collect()
    }

    /// Check if a function exists
    pub fn has_function(&self, name: &str) -> bool {
        !self.get_functions(name).is_empty()
    }

    /// Whether the name belongs to an aggregate function
    pub fn is_aggregate(&self, name: &str) -> bool {
        self.get_functions(name)
            .iter()
            .any(|f| f.function_type == FunctionType::Aggregate)
    }

    /// Number of distinct function names
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataType;
    use rstest::rstest;

    #[test]
    fn test_new_registry() {
        let registry = FunctionRegistry::new();
        assert!(!registry.is_empty());
        assert!(FunctionRegistry::empty().is_empty());
    }

    #[rstest]
    #[case("LOWER")]
    #[case("lower")]
    #[case("Lower")]
    fn test_get_function_case_insensitive(#[case] name: &str) {
        let registry = FunctionRegistry::new();
        assert_eq!(registry.get_functions(name).len(), 1);
    }

    #[test]
    fn test_candidates_filter_arity() {
        let registry = FunctionRegistry::new();
        assert_eq!(registry.candidates("substring", 2).len(), 1);
        assert_eq!(registry.candidates("substring", 3).len(), 1);
        assert!(registry.candidates("substring", 4).is_empty());
        // varargs
        assert!(!registry.candidates("coalesce", 5).is_empty());
    }

    #[test]
    fn test_aggregate_overloads() {
        let registry = FunctionRegistry::new();
        assert!(registry.is_aggregate("SUM"));
        assert!(!registry.is_aggregate("lower"));
        let sum_integer = registry
            .get_functions("sum")
            .iter()
            .find(|f| f.parameter_type(0) == Some(DataType::Integer))
            .map(|f| f.return_type);
        assert_eq!(sum_integer, Some(DataType::Long));
    }

    #[test]
    fn test_register_namespaced_json() {
        let mut registry = FunctionRegistry::empty();
        let count = registry
            .register_json(
                r#"[{"name": "myfunc", "namespace": "mynamespace", "return_type": "string",
                     "parameters": [{"name": "x", "data_type": "string"}]}]"#,
            )
            .unwrap();
        assert_eq!(count, 1);
        assert!(registry.has_function("MYNAMESPACE.MYFUNC"));
        assert!(!registry.has_function("myfunc"));
        assert!(registry.register_json("{").is_err());
    }
}
