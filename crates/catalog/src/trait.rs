// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog trait for metadata lookup
//!
//! This module defines the synchronous, read-only [`MetadataCatalog`] trait
//! the resolver queries for groups, procedures and user-defined functions.

use tracing::trace;

use crate::error::{CatalogError, CatalogResult};
use crate::metadata::{
    ColumnMetadata, FunctionMetadata, GroupMetadata, ProcedureMetadata, strip_vdb_prefix,
};

/// Metadata catalog abstraction
///
/// Implementations only have to answer candidate searches; the default
/// methods apply the qualification rules: an exact full-name match wins,
/// otherwise a partial name must match exactly one object.
///
/// All lookups are case-insensitive. Implementations must be safe to share
/// between threads resolving concurrently.
///
/// # Examples
///
/// ```
/// use sql_resolver_catalog::{MetadataCatalog, StaticCatalog};
/// use sql_resolver_ir::{ColumnMetadata, DataType, GroupMetadata};
///
/// let catalog = StaticCatalog::new()
///     .with_group(GroupMetadata::new("pm1.cat1.g2")
///         .with_columns(vec![ColumnMetadata::new("e1", DataType::String)]));
///
/// let group = catalog.resolve_group("cat1.g2").unwrap();
/// assert_eq!(group.full_name, "pm1.cat1.g2");
/// ```
pub trait MetadataCatalog: Send + Sync {
    /// Name of the virtual database, accepted as a leading qualifier
    fn vdb_name(&self) -> Option<&str> {
        None
    }

    /// Groups whose full name equals `name` or ends with `.name`
    ///
    /// # Errors
    ///
    /// Implementations backed by external stores may fail; the in-memory
    /// catalog never does.
    fn find_groups(&self, name: &str) -> CatalogResult<Vec<GroupMetadata>>;

    /// Procedures whose full name equals `name` or ends with `.name`
    fn find_procedures(&self, name: &str) -> CatalogResult<Vec<ProcedureMetadata>>;

    /// User-defined function overloads for a possibly namespaced name
    fn find_functions(&self, _name: &str) -> CatalogResult<Vec<FunctionMetadata>> {
        Ok(Vec::new())
    }

    /// Resolve a possibly partial group name to exactly one group
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::GroupNotFound` if nothing matches.
    /// Returns `CatalogError::AmbiguousGroup` if a partial name matches more
    /// than one group, even when one candidate looks more specific.
    fn resolve_group(&self, name: &str) -> CatalogResult<GroupMetadata> {
        let lookup = strip_vdb_prefix(self.vdb_name(), name);
        let mut candidates = self.find_groups(lookup)?;
        trace!(name, candidates = candidates.len(), "group candidates");

        if let Some(pos) = candidates
            .iter()
            .position(|g| g.full_name.eq_ignore_ascii_case(lookup))
        {
            return Ok(candidates.swap_remove(pos));
        }
        match candidates.len() {
            0 => Err(CatalogError::GroupNotFound(name.to_string())),
            1 => Ok(candidates.remove(0)),
            _ => Err(CatalogError::AmbiguousGroup {
                name: name.to_string(),
                candidates: candidates.into_iter().map(|g| g.full_name).collect(),
            }),
        }
    }

    /// Get the ordered columns of a group
    fn get_columns(&self, group: &str) -> CatalogResult<Vec<ColumnMetadata>> {
        self.resolve_group(group).map(|g| g.columns)
    }

    /// Resolve a possibly partial procedure name to exactly one procedure
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProcedureNotFound` or
    /// `CatalogError::AmbiguousProcedure` by the same rules as groups.
    fn get_procedure(&self, name: &str) -> CatalogResult<ProcedureMetadata> {
        let lookup = strip_vdb_prefix(self.vdb_name(), name);
        let mut candidates = self.find_procedures(lookup)?;

        if let Some(pos) = candidates
            .iter()
            .position(|p| p.full_name.eq_ignore_ascii_case(lookup))
        {
            return Ok(candidates.swap_remove(pos));
        }
        match candidates.len() {
            0 => Err(CatalogError::ProcedureNotFound(name.to_string())),
            1 => Ok(candidates.remove(0)),
            _ => Err(CatalogError::AmbiguousProcedure {
                name: name.to_string(),
                candidates: candidates.into_iter().map(|p| p.full_name).collect(),
            }),
        }
    }

    /// Whether any group or procedure is addressable by `name`
    fn name_in_use(&self, name: &str) -> CatalogResult<bool> {
        let lookup = strip_vdb_prefix(self.vdb_name(), name);
        Ok(!self.find_groups(lookup)?.is_empty() || !self.find_procedures(lookup)?.is_empty())
    }
}
