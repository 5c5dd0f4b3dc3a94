// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Temporary metadata
//!
//! Groups that exist only for the duration of one resolution: temp tables,
//! SELECT INTO targets, WITH items, inline views, procedure variables and
//! loop cursors.
//!
//! Groups are stored in an arena addressed by [`TempGroupId`]; elements bound
//! to them carry `MetadataId::TempColumn(id, position)`. Separately, a map of
//! *visible* names records which temp tables and WITH items a group name
//! resolves to right now. Procedural blocks save that map on entry and
//! restore it on exit, so temp visibility is lexical while the arena keeps
//! every group ever created.

use indexmap::IndexMap;
use serde::Serialize;
use sql_resolver_ir::{DataType, MetadataId, TempGroupId};

use crate::error::{SemanticError, SemanticResult};
use crate::symbol::ColumnEntry;

/// What created a temp group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TempGroupKind {
    /// `CREATE LOCAL TEMPORARY TABLE`, `SELECT INTO` or `INSERT INTO #t`
    Table,
    /// A WITH clause item
    With,
    /// A subquery in FROM
    InlineView,
    /// The `VARIABLES` group of a procedure
    Variables,
    /// The cursor of a `LOOP ON` statement
    Cursor,
    /// A group supplied by the caller
    External,
}

/// Column of a temp group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TempColumn {
    pub name: String,
    pub data_type: DataType,
}

/// A group created during resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TempGroup {
    pub id: TempGroupId,
    pub name: String,
    pub kind: TempGroupKind,
    /// Columns keyed by lowercase name, in declared order
    columns: IndexMap<String, TempColumn>,
}

impl TempGroup {
    pub fn columns(&self) -> impl Iterator<Item = &TempColumn> {
        self.columns.values()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn get_column(&self, name: &str) -> Option<(usize, &TempColumn)> {
        self.columns
            .get_full(&name.to_ascii_lowercase())
            .map(|(i, _, c)| (i, c))
    }

    /// Column entries for a scope
    pub fn column_entries(&self) -> Vec<ColumnEntry> {
        self.columns
            .values()
            .enumerate()
            .map(|(i, c)| {
                ColumnEntry::new(
                    c.name.clone(),
                    c.data_type,
                    MetadataId::TempColumn(self.id, i),
                )
            })
            .collect()
    }

    fn push_column(&mut self, name: &str, data_type: DataType) -> SemanticResult<usize> {
        let key = name.to_ascii_lowercase();
        if self.columns.contains_key(&key) {
            return Err(SemanticError::DuplicateColumnName {
                group: self.name.clone(),
                column: name.to_string(),
            });
        }
        let (index, _) = self.columns.insert_full(
            key,
            TempColumn {
                name: name.to_string(),
                data_type,
            },
        );
        Ok(index)
    }
}

/// Saved set of visible temp names
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleTemps(IndexMap<String, TempGroupId>);

/// Arena of temp groups plus the currently visible names
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TempMetadataStore {
    groups: Vec<TempGroup>,
    #[serde(skip)]
    visible: IndexMap<String, TempGroupId>,
}

impl TempMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group
    ///
    /// # Errors
    ///
    /// Returns `SemanticError::DuplicateColumnName` if two columns share a
    /// name (case-insensitively).
    ///
    /// # Examples
    ///
    /// ```
    /// use sql_resolver_semantic::{TempGroupKind, TempMetadataStore};
    /// use sql_resolver_ir::DataType;
    ///
    /// let mut store = TempMetadataStore::new();
    /// let err = store
    ///     .create_group("#t", TempGroupKind::Table, &[("a", DataType::Integer), ("A", DataType::String)])
    ///     .unwrap_err();
    /// assert_eq!(err.to_string(), "Cannot create group '#t' with multiple columns named 'A'");
    /// ```
    pub fn create_group(
        &mut self,
        name: &str,
        kind: TempGroupKind,
        columns: &[(&str, DataType)],
    ) -> SemanticResult<TempGroupId> {
        let id = TempGroupId(self.groups.len());
        let mut group = TempGroup {
            id,
            name: name.to_string(),
            kind,
            columns: IndexMap::new(),
        };
        for (column, data_type) in columns {
            group.push_column(column, *data_type)?;
        }
        self.groups.push(group);
        Ok(id)
    }

    /// Append a column to an existing group, returning its position
    pub fn add_column(
        &mut self,
        id: TempGroupId,
        name: &str,
        data_type: DataType,
    ) -> SemanticResult<usize> {
        match self.groups.get_mut(id.0) {
            Some(group) => group.push_column(name, data_type),
            None => Err(SemanticError::Catalog(
                sql_resolver_catalog::CatalogError::GroupNotFound(id.to_string()),
            )),
        }
    }

    pub fn get(&self, id: TempGroupId) -> Option<&TempGroup> {
        self.groups.get(id.0)
    }

    /// Make a group resolvable by its name
    pub fn make_visible(&mut self, id: TempGroupId) {
        if let Some(group) = self.groups.get(id.0) {
            self.visible.insert(group.name.to_ascii_lowercase(), id);
        }
    }

    /// Stop a name from resolving, returning the group it named
    pub fn hide(&mut self, name: &str) -> Option<TempGroupId> {
        self.visible.shift_remove(&name.to_ascii_lowercase())
    }

    /// Visible group named `name`
    pub fn find_visible(&self, name: &str) -> Option<&TempGroup> {
        self.visible
            .get(&name.to_ascii_lowercase())
            .and_then(|id| self.get(*id))
    }

    pub fn save_visible(&self) -> VisibleTemps {
        VisibleTemps(self.visible.clone())
    }

    pub fn restore_visible(&mut self, saved: VisibleTemps) {
        self.visible = saved.0;
    }

    /// Every group created, in creation order
    pub fn groups(&self) -> impl Iterator<Item = &TempGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
