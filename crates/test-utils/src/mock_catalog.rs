// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock catalog builder for testing
//!
//! Builds a [`StaticCatalog`] with a terse fluent API so tests can declare
//! just the groups they need.

use std::sync::Arc;

use sql_resolver_catalog::{
    ColumnMetadata, DataType, FunctionMetadata, GroupMetadata, MetadataCatalog,
    ProcedureMetadata, StaticCatalog,
};

use crate::fixtures;

/// Builder for creating mock catalogs with a fluent API
#[derive(Debug, Default)]
pub struct MockCatalogBuilder {
    catalog: StaticCatalog,
}

impl MockCatalogBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the `example1` schema
    pub fn with_example1(mut self) -> Self {
        self.catalog = fixtures::example1();
        self
    }

    pub fn with_vdb_name(mut self, name: &str) -> Self {
        self.catalog = self.catalog.with_vdb_name(name);
        self
    }

    /// Add a group with the given columns
    pub fn with_group(mut self, full_name: &str, columns: &[(&str, DataType)]) -> Self {
        let columns = columns
            .iter()
            .map(|(name, data_type)| ColumnMetadata::new(*name, *data_type))
            .collect();
        self.catalog = self
            .catalog
            .with_group(GroupMetadata::new(full_name).with_columns(columns));
        self
    }

    /// Add a fully specified group
    pub fn with_group_metadata(mut self, group: GroupMetadata) -> Self {
        self.catalog = self.catalog.with_group(group);
        self
    }

    pub fn with_procedure(mut self, procedure: ProcedureMetadata) -> Self {
        self.catalog = self.catalog.with_procedure(procedure);
        self
    }

    pub fn with_function(mut self, function: FunctionMetadata) -> Self {
        self.catalog = self.catalog.with_function(function);
        self
    }

    /// Build the catalog
    pub fn build(self) -> StaticCatalog {
        self.catalog
    }

    /// Build the catalog behind the handle a resolver takes
    pub fn build_shared(self) -> Arc<dyn MetadataCatalog> {
        Arc::new(self.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_adds_groups() {
        let catalog = MockCatalogBuilder::new()
            .with_group("db.t", &[("a", DataType::Integer), ("b", DataType::String)])
            .build();

        let columns = catalog.get_columns("t").unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_builder_extends_example1() {
        let catalog = MockCatalogBuilder::new()
            .with_example1()
            .with_group("pm9.extra", &[("x", DataType::Long)])
            .build_shared();

        assert!(catalog.resolve_group("pm1.g1").is_ok());
        assert!(catalog.resolve_group("pm9.extra").is_ok());
        assert_eq!(catalog.vdb_name(), Some("example1"));
    }
}
