// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Function Registry
//!
//! This crate provides the signature catalog the resolver scores overloads
//! against. Only signatures live here; nothing is ever evaluated.
//!
//! ## Features
//!
//! - Builtin numeric, string, date/time, system and aggregate signatures
//! - Case-insensitive lookup by name and arity
//! - Registration of extra signatures loaded from JSON
//!
//! ## Usage
//!
//! ```rust
//! use sql_resolver_function_registry::{DataType, FunctionRegistry};
//!
//! let registry = FunctionRegistry::new();
//! let candidates = registry.candidates("LOWER", 1);
//! assert_eq!(candidates[0].return_type, DataType::String);
//! assert!(registry.is_aggregate("sum"));
//! ```

pub mod builtin;
pub mod registry;

// Re-exports from ir for convenience
pub use sql_resolver_ir::{
    DataType, FunctionDescriptor, FunctionMetadata, FunctionParameter, FunctionType,
};

pub use registry::{FunctionRegistry, RegistryError};
