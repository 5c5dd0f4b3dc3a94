// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata types for catalog objects
//!
//! This module re-exports metadata types from the `sql-resolver-ir` crate
//! and holds the name matching rules every catalog shares.

// Re-export all metadata types from the ir crate
pub use sql_resolver_ir::{
    ColumnMetadata, DataType, FunctionMetadata, FunctionParameter, FunctionType, GroupKind,
    GroupMetadata, ParameterDirection, ProcedureMetadata, ProcedureParameter,
};

/// Whether `name` addresses `full_name` at some qualification level
///
/// Matching is case-insensitive and aligned to `.` segments, so `cat3.g1`
/// matches `pm1.cat1.cat2.cat3.g1` but `t3.g1` does not.
///
/// # Examples
///
/// ```
/// use sql_resolver_catalog::matches_partial_name;
///
/// assert!(matches_partial_name("pm1.cat1.cat2.cat3.g1", "cat3.g1"));
/// assert!(matches_partial_name("pm1.g1", "PM1.G1"));
/// assert!(!matches_partial_name("pm1.cat1.cat2.cat3.g1", "t3.g1"));
/// ```
pub fn matches_partial_name(full_name: &str, name: &str) -> bool {
    if name.is_empty() || name.len() > full_name.len() {
        return false;
    }
    if full_name.eq_ignore_ascii_case(name) {
        return true;
    }
    let split = full_name.len() - name.len();
    full_name.is_char_boundary(split)
        && full_name[split..].eq_ignore_ascii_case(name)
        && full_name[..split].ends_with('.')
}

/// Remove a leading `vdb.` qualifier if present
pub fn strip_vdb_prefix<'a>(vdb_name: Option<&str>, name: &'a str) -> &'a str {
    match vdb_name {
        Some(vdb) => match name.split_once('.') {
            Some((first, rest)) if first.eq_ignore_ascii_case(vdb) => rest,
            _ => name,
        },
        None => name,
    }
}
