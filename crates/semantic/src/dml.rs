// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Data modification and temp table DDL
//!
//! INSERT targets a catalog group or a temp group; inserting into an
//! unknown `#name` creates the temp group from the column list and values.
//! UPDATE SET columns and INSERT columns resolve against the target group
//! only, while values and WHERE criteria also see enclosing scopes.

use sql_resolver_catalog::CatalogError;
use sql_resolver_ir::{
    Command, Create, DataType, Delete, DropTable, ElementSymbol, Insert, InsertSource, MetadataId,
    SetClause, Update,
};
use tracing::debug;

use crate::command::{CommandContext, select_outputs};
use crate::error::{SemanticError, SemanticResult};
use crate::expression::{Clause, ExprContext};
use crate::group::BoundGroup;
use crate::resolver::Session;
use crate::scope::ScopeType;
use crate::symbol::GroupEntry;
use crate::temp::TempGroupKind;

/// Prefix marking a name as a local temp table
const TEMP_PREFIX: char = '#';

/// Text and type of each column a query-like command projects
pub(crate) fn query_sources(command: &Command) -> Vec<(String, Option<DataType>)> {
    match command {
        Command::Query(query) => select_outputs(&query.select)
            .into_iter()
            .map(|(_, e)| (e.to_string(), e.data_type()))
            .collect(),
        _ => command
            .projected_columns()
            .into_iter()
            .map(|c| (c.name, c.data_type))
            .collect(),
    }
}

impl Session<'_> {
    pub(crate) fn resolve_insert(
        &mut self,
        insert: Insert,
        parent: Option<usize>,
    ) -> SemanticResult<Insert> {
        let name = insert.group.non_alias_name().to_string();
        let existing = match self.lookup_group(&name, false) {
            Ok(bound) => Some(bound),
            Err(SemanticError::Catalog(CatalogError::GroupNotFound(_)))
                if name.starts_with(TEMP_PREFIX) =>
            {
                None
            }
            Err(e) => return Err(e),
        };

        let source = match insert.source {
            InsertSource::Values(values) => {
                let cx = ExprContext::new(parent, Clause::Values);
                InsertSource::Values(
                    values
                        .into_iter()
                        .map(|v| self.resolve_expression(v, cx))
                        .collect::<SemanticResult<Vec<_>>>()?,
                )
            }
            InsertSource::Query(command) => InsertSource::Query(Box::new(self.resolve_command(
                *command,
                parent,
                CommandContext::branch(),
            )?)),
        };

        let bound = match existing {
            Some(bound) => bound,
            None => self.create_insert_target(&name, &insert.columns, &source)?,
        };
        let (group, entry) = bound.into_entry(insert.group);

        let columns = if insert.explicit_columns {
            let target = self
                .scopes
                .create_scope_with(ScopeType::Target, None, vec![entry.clone()])?;
            let mut columns = Vec::with_capacity(insert.columns.len());
            for column in insert.columns {
                let column = self.resolve_element(column, Some(target))?;
                check_updatable(&entry, &column)?;
                columns.push(column);
            }
            columns
        } else {
            entry
                .columns
                .iter()
                .enumerate()
                .filter_map(|(i, c)| entry.bind_element(&c.name, i))
                .collect()
        };

        let source = match source {
            InsertSource::Values(values) => {
                if values.len() != columns.len() {
                    return Err(SemanticError::InsertArity {
                        elements: columns.len(),
                        values: values.len(),
                    });
                }
                let mut converted = Vec::with_capacity(values.len());
                for (value, column) in values.into_iter().zip(&columns) {
                    let target = column.data_type.unwrap_or(self.default_type());
                    converted.push(self.coerce_or_error(value, target, true)?);
                }
                InsertSource::Values(converted)
            }
            InsertSource::Query(command) => {
                let targets: Vec<(String, DataType)> = columns
                    .iter()
                    .map(|c| {
                        (
                            format!("{}.{}", entry.full_name, c.short_name()),
                            c.data_type.unwrap_or(self.default_type()),
                        )
                    })
                    .collect();
                let types = self.insert_query_types(&query_sources(&command), &targets)?;
                InsertSource::Query(Box::new(self.apply_projection_types(*command, &types)?))
            }
        };

        Ok(Insert {
            group,
            columns,
            explicit_columns: insert.explicit_columns,
            source,
        })
    }

    /// Projection types a query must take to fill `targets`
    ///
    /// `sources` holds the text and type of each projected column, `targets`
    /// the `group.column` name and type of each column filled.
    ///
    /// # Errors
    ///
    /// `InsertArity` when the column counts differ, `InsertQueryConversion`
    /// when a projected type does not implicitly convert to its column.
    pub(crate) fn insert_query_types(
        &self,
        sources: &[(String, Option<DataType>)],
        targets: &[(String, DataType)],
    ) -> SemanticResult<Vec<Option<DataType>>> {
        if sources.len() != targets.len() {
            return Err(SemanticError::InsertArity {
                elements: targets.len(),
                values: sources.len(),
            });
        }

        let mut types = Vec::with_capacity(targets.len());
        for ((column, to), (text, from)) in targets.iter().zip(sources) {
            if let Some(from) = *from {
                if from != *to && !self.lattice().can_implicitly_convert(from, *to) {
                    return Err(SemanticError::InsertQueryConversion {
                        expression: text.clone(),
                        from,
                        column: column.clone(),
                        to: *to,
                    });
                }
            }
            types.push(Some(*to));
        }
        Ok(types)
    }

    /// Create the temp group an `INSERT INTO #name` implies
    fn create_insert_target(
        &mut self,
        name: &str,
        written: &[ElementSymbol],
        source: &InsertSource,
    ) -> SemanticResult<BoundGroup> {
        let default = self.default_type();
        let types: Vec<DataType> = match source {
            InsertSource::Values(values) => values
                .iter()
                .map(|v| v.data_type().unwrap_or(default))
                .collect(),
            InsertSource::Query(command) => command
                .projected_columns()
                .iter()
                .map(|c| c.data_type.unwrap_or(default))
                .collect(),
        };
        let names: Vec<String> = if written.is_empty() {
            match source {
                InsertSource::Query(command) => command
                    .projected_columns()
                    .into_iter()
                    .map(|c| c.name)
                    .collect(),
                InsertSource::Values(values) => {
                    (1..=values.len()).map(|i| format!("expr{}", i)).collect()
                }
            }
        } else {
            written.iter().map(|c| c.short_name().to_string()).collect()
        };
        if names.len() != types.len() {
            return Err(SemanticError::InsertArity {
                elements: names.len(),
                values: types.len(),
            });
        }

        let columns: Vec<(&str, DataType)> = names
            .iter()
            .map(String::as_str)
            .zip(types)
            .collect();
        let id = self.temps.create_group(name, TempGroupKind::Table, &columns)?;
        self.temps.make_visible(id);
        debug!(name, columns = columns.len(), "created temp group from INSERT");
        Ok(BoundGroup {
            full_name: name.to_string(),
            metadata_id: MetadataId::TempGroup(id),
            columns: self
                .temps
                .get(id)
                .map(|g| g.column_entries())
                .unwrap_or_default(),
        })
    }

    pub(crate) fn resolve_update(
        &mut self,
        update: Update,
        parent: Option<usize>,
    ) -> SemanticResult<Update> {
        let (group, entry) = self.resolve_target_group(update.group)?;
        let target = self
            .scopes
            .create_scope_with(ScopeType::Target, None, vec![entry.clone()])?;
        let values = self
            .scopes
            .create_scope_with(ScopeType::Target, parent, vec![entry.clone()])?;

        let mut changes = Vec::with_capacity(update.changes.len());
        for change in update.changes {
            let column = self.resolve_element(change.column, Some(target))?;
            check_updatable(&entry, &column)?;
            let value = self.resolve_expression(change.value, ExprContext::new(Some(values), Clause::Set))?;
            let data_type = column.data_type.unwrap_or(self.default_type());
            let value = self.coerce_or_error(value, data_type, true)?;
            changes.push(SetClause { column, value });
        }
        let criteria = update
            .criteria
            .map(|c| self.resolve_criteria(c, ExprContext::new(Some(values), Clause::Where)))
            .transpose()?;

        Ok(Update {
            group,
            changes,
            criteria,
        })
    }

    pub(crate) fn resolve_delete(
        &mut self,
        delete: Delete,
        parent: Option<usize>,
    ) -> SemanticResult<Delete> {
        let (group, entry) = self.resolve_target_group(delete.group)?;
        let scope = self
            .scopes
            .create_scope_with(ScopeType::Target, parent, vec![entry])?;
        let criteria = delete
            .criteria
            .map(|c| self.resolve_criteria(c, ExprContext::new(Some(scope), Clause::Where)))
            .transpose()?;
        Ok(Delete { group, criteria })
    }

    /// `CREATE LOCAL TEMPORARY TABLE`
    pub(crate) fn resolve_create(&mut self, create: Create) -> SemanticResult<Create> {
        let name = create.table.name.clone();
        if name.contains('.') {
            return Err(SemanticError::QualifiedTempTable(name));
        }
        if self.temps.find_visible(&name).is_some() || self.catalog().name_in_use(&name)? {
            return Err(SemanticError::TempTableExists(name));
        }

        let columns: Vec<(&str, DataType)> = create
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.data_type))
            .collect();
        let id = self.temps.create_group(&name, TempGroupKind::Table, &columns)?;
        if let Some(missing) = create.primary_key.iter().find(|pk| {
            self.temps
                .get(id)
                .is_none_or(|g| g.get_column(pk).is_none())
        }) {
            return Err(SemanticError::ElementNotFound(missing.clone()));
        }
        self.temps.make_visible(id);
        debug!(name = %name, columns = columns.len(), "created temp table");

        let mut table = create.table;
        table.metadata_id = Some(MetadataId::TempGroup(id));
        Ok(Create { table, ..create })
    }

    /// `DROP TABLE` of a temp table
    pub(crate) fn resolve_drop(&mut self, drop: DropTable) -> SemanticResult<DropTable> {
        let name = drop.table.non_alias_name().to_string();
        match self.temps.hide(&name) {
            Some(id) => {
                let mut table = drop.table;
                table.metadata_id = Some(MetadataId::TempGroup(id));
                Ok(DropTable { table })
            }
            None => Err(CatalogError::GroupNotFound(name).into()),
        }
    }
}

fn check_updatable(entry: &GroupEntry, column: &ElementSymbol) -> SemanticResult<()> {
    match entry.find_column(column.short_name()) {
        Some((_, c)) if !c.updatable => Err(SemanticError::ReadOnlyElement(column.name.clone())),
        _ => Ok(()),
    }
}
