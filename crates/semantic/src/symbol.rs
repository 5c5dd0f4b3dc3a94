// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Symbol table entries
//!
//! This module defines the groups and columns a scope makes visible.
//!
//! A [`GroupEntry`] is one FROM clause item (catalog group, temp group,
//! inline view, procedure used as a table) or one synthetic group such as
//! `VARIABLES`. It keeps the symbol as bound, so printing an entry gives the
//! text the query used (`pm4.g2 AS Y`).

use serde::{Deserialize, Serialize};
use sql_resolver_catalog::matches_partial_name;
use sql_resolver_ir::{ColumnMetadata, DataType, ElementSymbol, GroupSymbol, MetadataId};

/// How a qualifier matched a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualifierMatch {
    /// The alias, the written name or the full name
    Exact,
    /// A trailing segment suffix of the full name
    Partial,
}

/// A group visible in a scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEntry {
    /// The bound symbol: alias (or written name), definition and metadata id
    pub symbol: GroupSymbol,

    /// Canonical name used for partial qualification
    pub full_name: String,

    /// Columns in declared order
    pub columns: Vec<ColumnEntry>,
}

impl GroupEntry {
    /// Create a new group entry
    ///
    /// # Examples
    ///
    /// ```
    /// use sql_resolver_semantic::GroupEntry;
    /// use sql_resolver_ir::GroupSymbol;
    ///
    /// let entry = GroupEntry::new(GroupSymbol::aliased("pm4.g2", "Y"), "pm4.g2");
    /// assert_eq!(entry.name(), "Y");
    /// assert_eq!(entry.display_name(), "pm4.g2 AS Y");
    /// ```
    pub fn new(symbol: GroupSymbol, full_name: impl Into<String>) -> Self {
        Self {
            symbol,
            full_name: full_name.into(),
            columns: Vec::new(),
        }
    }

    /// Set the columns for this group
    pub fn with_columns(mut self, columns: Vec<ColumnEntry>) -> Self {
        self.columns = columns;
        self
    }

    /// Name the group is addressed by in this scope
    pub fn name(&self) -> &str {
        &self.symbol.name
    }

    /// The group as written, with its alias if any
    pub fn display_name(&self) -> String {
        self.symbol.to_string()
    }

    /// Check whether `qualifier` addresses this group
    ///
    /// An aliased group answers only to its alias. Otherwise the written
    /// name and the full name match exactly, and any trailing segment
    /// suffix of the full name matches partially.
    ///
    /// # Examples
    ///
    /// ```
    /// use sql_resolver_semantic::{GroupEntry, QualifierMatch};
    /// use sql_resolver_ir::GroupSymbol;
    ///
    /// let entry = GroupEntry::new(GroupSymbol::new("pm1.g1"), "pm1.g1");
    /// assert_eq!(entry.match_qualifier("PM1.G1"), Some(QualifierMatch::Exact));
    /// assert_eq!(entry.match_qualifier("g1"), Some(QualifierMatch::Partial));
    /// assert_eq!(entry.match_qualifier("m1.g1"), None);
    ///
    /// let aliased = GroupEntry::new(GroupSymbol::aliased("pm1.g1", "x"), "pm1.g1");
    /// assert_eq!(aliased.match_qualifier("pm1.g1"), None);
    /// ```
    pub fn match_qualifier(&self, qualifier: &str) -> Option<QualifierMatch> {
        if self.symbol.is_aliased() {
            return self
                .symbol
                .name
                .eq_ignore_ascii_case(qualifier)
                .then_some(QualifierMatch::Exact);
        }
        if self.symbol.name.eq_ignore_ascii_case(qualifier)
            || self.full_name.eq_ignore_ascii_case(qualifier)
        {
            Some(QualifierMatch::Exact)
        } else if matches_partial_name(&self.full_name, qualifier) {
            Some(QualifierMatch::Partial)
        } else {
            None
        }
    }

    /// Find a column by name, returning its position
    pub fn find_column(&self, name: &str) -> Option<(usize, &ColumnEntry)> {
        self.columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.name.eq_ignore_ascii_case(name))
    }

    /// Build the element bound to the column at `index`
    ///
    /// The element keeps `written` as its name so it prints as the query
    /// wrote it.
    pub fn bind_element(&self, written: &str, index: usize) -> Option<ElementSymbol> {
        let column = self.columns.get(index)?;
        Some(ElementSymbol {
            name: written.to_string(),
            group: Some(self.symbol.clone()),
            metadata_id: Some(column.metadata_id.clone()),
            data_type: Some(column.data_type),
            external: false,
        })
    }

    /// Elements for `*` expansion, skipping non-selectable columns
    pub fn expand(&self) -> Vec<ElementSymbol> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.selectable)
            .filter_map(|(i, c)| self.bind_element(&format!("{}.{}", self.name(), c.name), i))
            .collect()
    }
}

/// A column of a [`GroupEntry`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnEntry {
    /// Column name
    pub name: String,

    /// Data type of the column
    pub data_type: DataType,

    /// Identity recorded on elements bound to this column
    pub metadata_id: MetadataId,

    /// Whether `*` expansion includes this column
    #[serde(default)]
    pub selectable: bool,

    /// Whether UPDATE SET and INSERT may target this column
    #[serde(default)]
    pub updatable: bool,
}

impl ColumnEntry {
    /// Create a new selectable, updatable column
    ///
    /// # Examples
    ///
    /// ```
    /// use sql_resolver_semantic::ColumnEntry;
    /// use sql_resolver_ir::{DataType, MetadataId, TempGroupId};
    ///
    /// let column = ColumnEntry::new("x", DataType::Integer, MetadataId::TempColumn(TempGroupId(0), 0));
    /// assert!(column.selectable);
    /// ```
    pub fn new(name: impl Into<String>, data_type: DataType, metadata_id: MetadataId) -> Self {
        Self {
            name: name.into(),
            data_type,
            metadata_id,
            selectable: true,
            updatable: true,
        }
    }

    /// Column of a catalog group
    pub fn from_catalog(group: &str, column: &ColumnMetadata) -> Self {
        Self {
            name: column.name.clone(),
            data_type: column.data_type,
            metadata_id: MetadataId::Column {
                group: group.to_string(),
                column: column.name.clone(),
            },
            selectable: column.selectable,
            updatable: column.updatable,
        }
    }

    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn with_updatable(mut self, updatable: bool) -> Self {
        self.updatable = updatable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g1() -> GroupEntry {
        let columns = vec![
            ColumnMetadata::new("e1", DataType::String),
            ColumnMetadata::new("e2", DataType::Integer).with_selectable(false),
        ];
        GroupEntry::new(GroupSymbol::new("g1"), "pm1.cat1.g1").with_columns(
            columns
                .iter()
                .map(|c| ColumnEntry::from_catalog("pm1.cat1.g1", c))
                .collect(),
        )
    }

    #[test]
    fn test_match_written_full_and_partial_names() {
        let entry = g1();
        assert_eq!(entry.match_qualifier("g1"), Some(QualifierMatch::Exact));
        assert_eq!(entry.match_qualifier("pm1.cat1.g1"), Some(QualifierMatch::Exact));
        assert_eq!(entry.match_qualifier("cat1.g1"), Some(QualifierMatch::Partial));
        assert_eq!(entry.match_qualifier("at1.g1"), None);
    }

    #[test]
    fn test_find_column_ignores_case() {
        let entry = g1();
        assert_eq!(entry.find_column("E2").map(|(i, _)| i), Some(1));
        assert!(entry.find_column("e3").is_none());
    }

    #[test]
    fn test_bind_element_keeps_written_name() {
        let element = g1().bind_element("cat1.g1.e1", 0).unwrap();
        assert_eq!(element.name, "cat1.g1.e1");
        assert_eq!(element.data_type, Some(DataType::String));
        assert_eq!(
            element.metadata_id,
            Some(MetadataId::Column {
                group: "pm1.cat1.g1".into(),
                column: "e1".into()
            })
        );
    }

    #[test]
    fn test_expand_skips_non_selectable() {
        let names: Vec<String> = g1().expand().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["g1.e1"]);
    }
}
