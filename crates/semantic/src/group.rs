// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Group resolution
//!
//! A group name resolves, in order, to a visible temp group, a catalog
//! group, or (in FROM clauses only) a procedure used as a table.

use sql_resolver_catalog::CatalogError;
use sql_resolver_ir::{GroupSymbol, MetadataId, ParameterDirection, ProcedureMetadata};
use tracing::debug;

use crate::error::{SemanticError, SemanticResult};
use crate::resolver::Session;
use crate::symbol::{ColumnEntry, GroupEntry};

/// Metadata a group name resolved to
#[derive(Debug, Clone)]
pub(crate) struct BoundGroup {
    pub full_name: String,
    pub metadata_id: MetadataId,
    pub columns: Vec<ColumnEntry>,
}

impl BoundGroup {
    /// Scope entry for `symbol`, recording the metadata id on it
    pub fn into_entry(self, mut symbol: GroupSymbol) -> (GroupSymbol, GroupEntry) {
        symbol.metadata_id = Some(self.metadata_id);
        let entry = GroupEntry::new(symbol.clone(), self.full_name).with_columns(self.columns);
        (symbol, entry)
    }
}

impl Session<'_> {
    /// Look up a group name
    ///
    /// With `allow_procedure`, a name that is not a group but is a
    /// procedure resolves to the procedure's result set plus its input
    /// parameters; the parameters are not selectable.
    pub(crate) fn lookup_group(
        &self,
        name: &str,
        allow_procedure: bool,
    ) -> SemanticResult<BoundGroup> {
        if let Some(temp) = self.temps.find_visible(name) {
            return Ok(BoundGroup {
                full_name: temp.name.clone(),
                metadata_id: MetadataId::TempGroup(temp.id),
                columns: temp.column_entries(),
            });
        }

        match self.catalog().resolve_group(name) {
            Ok(group) => {
                debug!(name, full_name = %group.full_name, "bound catalog group");
                let columns = group
                    .columns
                    .iter()
                    .map(|c| ColumnEntry::from_catalog(&group.full_name, c))
                    .collect();
                Ok(BoundGroup {
                    metadata_id: MetadataId::Group(group.full_name.clone()),
                    full_name: group.full_name,
                    columns,
                })
            }
            Err(CatalogError::GroupNotFound(_)) if allow_procedure => {
                match self.catalog().get_procedure(name) {
                    Ok(procedure) => procedure_group(&procedure),
                    Err(CatalogError::ProcedureNotFound(_)) => {
                        Err(CatalogError::GroupNotFound(name.to_string()).into())
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a FROM clause group
    pub(crate) fn resolve_from_group(
        &self,
        symbol: GroupSymbol,
    ) -> SemanticResult<(GroupSymbol, GroupEntry)> {
        let bound = self.lookup_group(symbol.non_alias_name(), true)?;
        Ok(bound.into_entry(symbol))
    }

    /// Resolve the target of an UPDATE or DELETE
    pub(crate) fn resolve_target_group(
        &self,
        symbol: GroupSymbol,
    ) -> SemanticResult<(GroupSymbol, GroupEntry)> {
        let bound = self.lookup_group(symbol.non_alias_name(), false)?;
        Ok(bound.into_entry(symbol))
    }
}

fn procedure_group(procedure: &ProcedureMetadata) -> SemanticResult<BoundGroup> {
    let name = &procedure.full_name;
    let column_id = |column: &str| MetadataId::ProcedureColumn {
        procedure: name.clone(),
        column: column.to_string(),
    };

    let mut columns: Vec<ColumnEntry> = procedure
        .result_set
        .iter()
        .map(|c| {
            ColumnEntry::new(c.name.clone(), c.data_type, column_id(&c.name)).with_updatable(false)
        })
        .collect();
    columns.extend(
        procedure
            .parameters
            .iter()
            .filter(|p| p.direction != ParameterDirection::Return)
            .map(|p| {
                ColumnEntry::new(p.name.clone(), p.data_type, column_id(&p.name))
                    .with_selectable(false)
                    .with_updatable(false)
            }),
    );

    for (i, column) in columns.iter().enumerate() {
        if columns[..i]
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(&column.name))
        {
            return Err(SemanticError::NonUniqueProcedureColumns(name.clone()));
        }
    }

    debug!(procedure = %name, columns = columns.len(), "procedure used as a table");
    Ok(BoundGroup {
        full_name: name.clone(),
        metadata_id: MetadataId::Procedure(name.clone()),
        columns,
    })
}
