// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Resolver - Catalog Layer
//!
//! This crate provides the read-only metadata source the resolver binds
//! names against. It defines the [`MetadataCatalog`] trait and an in-memory
//! [`StaticCatalog`] loadable from YAML or JSON.
//!
//! ## Name qualification
//!
//! Groups and procedures live under dotted full names such as
//! `pm1.cat1.cat2.cat3.g1`. A reference may use any segment-aligned suffix
//! (`cat3.g1`, `g1`) as long as it picks out exactly one object; an exact
//! full-name match always wins. A leading virtual database name is ignored.
//!
//! ## Usage
//!
//! ```rust
//! use sql_resolver_catalog::{CatalogError, MetadataCatalog, StaticCatalog};
//!
//! let catalog = StaticCatalog::from_yaml_str(r#"
//! groups:
//!   - full_name: pm1.g1
//!     columns:
//!       - { name: e1, data_type: string }
//!   - full_name: pm2.g1
//! "#).unwrap();
//!
//! assert_eq!(catalog.get_columns("pm1.g1").unwrap().len(), 1);
//! assert!(matches!(
//!     catalog.resolve_group("g1"),
//!     Err(CatalogError::AmbiguousGroup { .. })
//! ));
//! ```

pub mod error;
pub mod metadata;
pub mod r#static;
pub mod r#trait;

// Re-exports
pub use error::{CatalogError, CatalogResult};
pub use metadata::{
    ColumnMetadata, DataType, FunctionMetadata, FunctionParameter, FunctionType, GroupKind,
    GroupMetadata, ParameterDirection, ProcedureMetadata, ProcedureParameter,
    matches_partial_name, strip_vdb_prefix,
};
pub use r#static::{CatalogDocument, StaticCatalog};
pub use r#trait::MetadataCatalog;
