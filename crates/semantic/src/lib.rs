// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # SQL Resolver - Semantic Layer
//!
//! This crate binds an unresolved command tree to metadata: every group and
//! element gets a metadata identity, every expression gets a type, and
//! implicit conversions are made explicit in the tree.
//!
//! ## Overview
//!
//! - **Scope management**: groups visible to each query block, with
//!   correlation to enclosing blocks
//! - **Name resolution**: groups, elements, functions, procedures and
//!   procedure variables
//! - **Type checking**: overload selection, implicit conversion, literal
//!   narrowing and common-type unification
//! - **Temp metadata**: temp tables, WITH items, inline views and cursors
//!   created during resolution
//!
//! ## Core Concepts
//!
//! ### Scopes
//!
//! A [`Scope`] holds the groups visible in one query block. Scopes form a
//! tree; a name not found in a scope is looked up in its parent.
//!
//! ```rust
//! use sql_resolver_semantic::{ElementLookup, GroupEntry, ColumnEntry, ScopeManager, ScopeType};
//! use sql_resolver_ir::{DataType, GroupSymbol, MetadataId};
//!
//! let mut manager = ScopeManager::new();
//! let outer = manager.create_scope(ScopeType::Query, None);
//! let id = MetadataId::Column {
//!     group: "pm1.g1".into(),
//!     column: "e1".into(),
//! };
//! manager
//!     .add_group(
//!         outer,
//!         GroupEntry::new(GroupSymbol::new("pm1.g1"), "pm1.g1")
//!             .with_columns(vec![ColumnEntry::new("e1", DataType::String, id)]),
//!     )
//!     .unwrap();
//!
//! let inner = manager.create_scope(ScopeType::Query, Some(outer));
//! assert!(matches!(
//!     manager.lookup_element(Some(inner), None, "e1"),
//!     ElementLookup::Found { scope_id, .. } if scope_id == outer
//! ));
//! ```
//!
//! ### Resolving commands
//!
//! [`QueryResolver`] is the entry point. See its documentation for an
//! example; [`ResolveOptions`] supplies external groups, positional
//! reference names and the target of an update procedure.

pub mod coercion;
pub mod command;
pub mod config;
pub mod correlation;
pub mod dml;
pub mod error;
pub mod exec;
pub mod expression;
pub mod function;
pub mod group;
pub mod procedure;
pub mod resolver;
pub mod scope;
pub mod symbol;
pub mod temp;

// Re-export commonly used types
pub use coercion::TypeLattice;
pub use config::ResolverConfig;
pub use error::{ParameterBindingError, SemanticError, SemanticResult};
pub use function::LITERAL_PARSE_COST;
pub use resolver::{ExternalGroup, QueryResolver, ResolveOptions, ResolvedCommand};
pub use scope::{ElementLookup, Scope, ScopeManager, ScopeType};
pub use symbol::{ColumnEntry, GroupEntry, QualifierMatch};
pub use temp::{TempColumn, TempGroup, TempGroupKind, TempMetadataStore, VisibleTemps};
