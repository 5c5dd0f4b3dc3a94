// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Resolver - Intermediate Representation
//!
//! This crate provides the command trees the resolver consumes and produces.
//! The representation is designed to:
//! - Carry names exactly as written until resolution binds them
//! - Hold resolved bindings (`metadata_id`, `data_type`) in the same nodes
//! - Print back to a canonical SQL string through `Display`
//! - Share catalog metadata types with the catalog and function crates

pub mod command;
pub mod criteria;
pub mod display;
pub mod expr;
pub mod metadata;
pub mod query;
pub mod types;
pub mod value;

// Re-export commonly used types
pub use command::{
    AssignmentValue, Block, ColumnDefinition, Command, Create, CreateProcedure, Delete, DropTable,
    Insert, InsertSource, ProcedureArguments, ProcedureKind, ProjectedColumn, SetClause,
    SpParameter, Statement, StoredProcedure, Subquery, Update,
};
pub use criteria::{CompareOp, Criteria, LogicalOp, Quantifier};
pub use display::{Identifier, is_reserved_word};
pub use expr::{
    Aggregate, AggregateKind, CONVERT, CaseExpression, Constant, ElementSymbol, Expression,
    Function, GroupSymbol, Reference, SearchedCase,
};
pub use metadata::{
    ColumnMetadata, FunctionDescriptor, FunctionMetadata, FunctionParameter, FunctionType,
    GroupKind, GroupMetadata, MetadataId, ParameterDirection, ProcedureMetadata,
    ProcedureParameter, TempGroupId, last_segment,
};
pub use query::{
    FromClause, JoinType, Limit, OrderByItem, Query, Select, SelectItem, SetOperator, SetQuery,
    WithItem,
};
pub use types::DataType;
pub use value::{Value, ValueError};
