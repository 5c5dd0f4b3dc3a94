// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Static Catalog
//!
//! This module provides an in-memory catalog built either through builder
//! methods or from a JSON/YAML schema document.
//!
//! ## Document format
//!
//! ```yaml
//! vdb_name: example1
//! groups:
//!   - full_name: pm1.g1
//!     columns:
//!       - { name: e1, data_type: string }
//!       - { name: e2, data_type: integer, selectable: false }
//! procedures:
//!   - full_name: pm1.sq3
//!     parameters:
//!       - { name: in, direction: in, data_type: string }
//!     result_set:
//!       - { name: e1, data_type: string }
//! functions:
//!   - { name: myfunc, namespace: mynamespace, return_type: string,
//!       parameters: [ { name: x, data_type: string } ] }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};
use crate::metadata::{
    FunctionMetadata, GroupMetadata, ProcedureMetadata, matches_partial_name,
};
use crate::MetadataCatalog;

/// Serialized form of a [`StaticCatalog`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub vdb_name: Option<String>,
    #[serde(default)]
    pub groups: Vec<GroupMetadata>,
    #[serde(default)]
    pub procedures: Vec<ProcedureMetadata>,
    #[serde(default)]
    pub functions: Vec<FunctionMetadata>,
}

/// In-memory catalog with predefined metadata
///
/// Objects are keyed by lowercase full name and kept in insertion order, so
/// candidate lists (and the ambiguity errors built from them) are stable.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    vdb_name: Option<String>,
    groups: IndexMap<String, GroupMetadata>,
    procedures: IndexMap<String, ProcedureMetadata>,
    functions: Vec<FunctionMetadata>,
}

impl StaticCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the virtual database name
    pub fn with_vdb_name(mut self, name: impl Into<String>) -> Self {
        self.vdb_name = Some(name.into());
        self
    }

    /// Builder method: add or replace a group
    pub fn with_group(mut self, group: GroupMetadata) -> Self {
        self.add_group(group);
        self
    }

    /// Builder method: add or replace a procedure
    pub fn with_procedure(mut self, procedure: ProcedureMetadata) -> Self {
        self.procedures
            .insert(procedure.full_name.to_ascii_lowercase(), procedure);
        self
    }

    /// Builder method: add a user-defined function overload
    pub fn with_function(mut self, function: FunctionMetadata) -> Self {
        self.functions.push(function);
        self
    }

    pub fn add_group(&mut self, group: GroupMetadata) {
        self.groups.insert(group.full_name.to_ascii_lowercase(), group);
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Build a catalog from a parsed document
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ConfigurationError` if two groups or two
    /// procedures share a full name.
    pub fn from_document(document: CatalogDocument) -> CatalogResult<Self> {
        let mut catalog = Self {
            vdb_name: document.vdb_name,
            ..Self::default()
        };
        for group in document.groups {
            let key = group.full_name.to_ascii_lowercase();
            if catalog.groups.contains_key(&key) {
                return Err(CatalogError::ConfigurationError(format!(
                    "duplicate group {}",
                    group.full_name
                )));
            }
            catalog.groups.insert(key, group);
        }
        for procedure in document.procedures {
            let key = procedure.full_name.to_ascii_lowercase();
            if catalog.procedures.contains_key(&key) {
                return Err(CatalogError::ConfigurationError(format!(
                    "duplicate procedure {}",
                    procedure.full_name
                )));
            }
            catalog.procedures.insert(key, procedure);
        }
        catalog.functions = document.functions;
        debug!(
            groups = catalog.groups.len(),
            procedures = catalog.procedures.len(),
            functions = catalog.functions.len(),
            "loaded static catalog"
        );
        Ok(catalog)
    }

    /// Load a catalog from a JSON document
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        let document: CatalogDocument = serde_json::from_str(json)
            .map_err(|e| CatalogError::SerializationError(e.to_string()))?;
        Self::from_document(document)
    }

    /// Load a catalog from a YAML document
    pub fn from_yaml_str(yaml: &str) -> CatalogResult<Self> {
        let document: CatalogDocument = serde_yaml::from_str(yaml)
            .map_err(|e| CatalogError::SerializationError(e.to_string()))?;
        Self::from_document(document)
    }

    /// Snapshot the catalog as a document
    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            vdb_name: self.vdb_name.clone(),
            groups: self.groups.values().cloned().collect(),
            procedures: self.procedures.values().cloned().collect(),
            functions: self.functions.clone(),
        }
    }
}

impl MetadataCatalog for StaticCatalog {
    fn vdb_name(&self) -> Option<&str> {
        self.vdb_name.as_deref()
    }

    fn find_groups(&self, name: &str) -> CatalogResult<Vec<GroupMetadata>> {
        Ok(self
            .groups
            .values()
            .filter(|g| matches_partial_name(&g.full_name, name))
            .cloned()
            .collect())
    }

    fn find_procedures(&self, name: &str) -> CatalogResult<Vec<ProcedureMetadata>> {
        Ok(self
            .procedures
            .values()
            .filter(|p| matches_partial_name(&p.full_name, name))
            .cloned()
            .collect())
    }

    fn find_functions(&self, name: &str) -> CatalogResult<Vec<FunctionMetadata>> {
        Ok(self
            .functions
            .iter()
            .filter(|f| {
                f.qualified_name().eq_ignore_ascii_case(name)
                    || (f.namespace.is_none() && f.name.eq_ignore_ascii_case(name))
            })
            .cloned()
            .collect())
    }
}
