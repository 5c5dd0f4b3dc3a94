// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Scope management for semantic resolution
//!
//! This module defines scope types and the scope manager for tracking
//! groups and their visibility across nested commands.
//!
//! Scopes live in one arena per resolution and are addressed by id. Ids grow
//! monotonically, so every scope created while a nested command resolves has
//! a larger id than any scope of its enclosing commands. The correlation
//! resolver relies on this to decide whether a binding is external.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{SemanticError, SemanticResult};
use crate::symbol::{GroupEntry, QualifierMatch};

/// Type of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeType {
    /// Groups of a query's FROM clause
    Query,
    /// Groups of one join subtree, seen by its ON criteria
    Join,
    /// FROM groups preceding a `TABLE(...)` item
    Lateral,
    /// Target group of INSERT, UPDATE or DELETE
    Target,
    /// Procedure body with its `VARIABLES` group
    Procedure,
    /// Loop body exposing the cursor group
    Block,
    /// Groups injected by the caller
    External,
}

/// Represents a lexical scope
///
/// Scopes form a hierarchy where child scopes can access groups from parent
/// scopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    /// Unique identifier for this scope
    pub id: usize,

    /// Parent scope ID (if any)
    pub parent_id: Option<usize>,

    /// Groups visible in this scope, in FROM clause order
    pub groups: Vec<GroupEntry>,

    /// Type of this scope
    pub scope_type: ScopeType,
}

impl Scope {
    /// Create a new scope
    ///
    /// # Examples
    ///
    /// ```
    /// use sql_resolver_semantic::{Scope, ScopeType};
    ///
    /// let scope = Scope::new(0, ScopeType::Query);
    /// assert_eq!(scope.id, 0);
    /// assert!(scope.groups.is_empty());
    /// ```
    pub fn new(id: usize, scope_type: ScopeType) -> Self {
        Self {
            id,
            parent_id: None,
            groups: Vec::new(),
            scope_type,
        }
    }

    /// Set the parent scope
    pub fn with_parent(mut self, parent_id: usize) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Positions of the groups `qualifier` addresses in this scope only
    ///
    /// Exact matches win over partial ones.
    pub fn find_groups(&self, qualifier: &str) -> Vec<usize> {
        let matches: Vec<(usize, QualifierMatch)> = self
            .groups
            .iter()
            .enumerate()
            .filter_map(|(i, g)| g.match_qualifier(qualifier).map(|m| (i, m)))
            .collect();
        let exact: Vec<usize> = matches
            .iter()
            .filter(|(_, m)| *m == QualifierMatch::Exact)
            .map(|(i, _)| *i)
            .collect();
        if exact.is_empty() {
            matches.into_iter().map(|(i, _)| i).collect()
        } else {
            exact
        }
    }

    /// Add a group to this scope
    ///
    /// # Returns
    ///
    /// `Ok(())` if successful, `Err(SemanticError::DuplicateGroup)` if a
    /// group with the same name or alias is already present
    pub fn add_group(&mut self, group: GroupEntry) -> SemanticResult<()> {
        if self
            .groups
            .iter()
            .any(|g| g.name().eq_ignore_ascii_case(group.name()))
        {
            return Err(SemanticError::DuplicateGroup(group.name().to_string()));
        }

        self.groups.push(group);
        Ok(())
    }
}

/// Outcome of an element lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementLookup {
    /// Exactly one group at the nearest scope defines the element
    Found {
        scope_id: usize,
        group: usize,
        column: usize,
    },
    /// Several groups at the nearest scope define it; their display names
    Ambiguous(Vec<String>),
    /// Nothing defines it; whether the qualifier named any group at all
    NotFound { qualifier_matched: bool },
}

/// Manages hierarchical scopes and element lookup
#[derive(Debug, Clone, Default)]
pub struct ScopeManager {
    /// All scopes managed by this manager
    scopes: Vec<Scope>,
}

impl ScopeManager {
    /// Create a new scope manager
    ///
    /// # Examples
    ///
    /// ```
    /// use sql_resolver_semantic::ScopeManager;
    ///
    /// let manager = ScopeManager::new();
    /// assert_eq!(manager.scope_count(), 0);
    /// ```
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// Create a new scope
    ///
    /// # Examples
    ///
    /// ```
    /// use sql_resolver_semantic::{ScopeManager, ScopeType};
    ///
    /// let mut manager = ScopeManager::new();
    /// let parent_id = manager.create_scope(ScopeType::Query, None);
    /// let child_id = manager.create_scope(ScopeType::Query, Some(parent_id));
    ///
    /// assert!(child_id > parent_id);
    /// ```
    pub fn create_scope(&mut self, scope_type: ScopeType, parent_id: Option<usize>) -> usize {
        let id = self.scopes.len();

        let mut scope = Scope::new(id, scope_type);
        if let Some(parent) = parent_id {
            scope = scope.with_parent(parent);
        }

        self.scopes.push(scope);
        id
    }

    /// Create a scope already holding `groups`
    pub fn create_scope_with(
        &mut self,
        scope_type: ScopeType,
        parent_id: Option<usize>,
        groups: Vec<GroupEntry>,
    ) -> SemanticResult<usize> {
        let id = self.create_scope(scope_type, parent_id);
        for group in groups {
            self.add_group(id, group)?;
        }
        Ok(id)
    }

    /// Get a scope by ID
    pub fn get_scope(&self, id: usize) -> Option<&Scope> {
        self.scopes.get(id)
    }

    /// Get a mutable reference to a scope by ID
    pub fn get_scope_mut(&mut self, id: usize) -> Option<&mut Scope> {
        self.scopes.get_mut(id)
    }

    /// Add a group to an existing scope
    pub fn add_group(&mut self, scope_id: usize, group: GroupEntry) -> SemanticResult<()> {
        match self.get_scope_mut(scope_id) {
            Some(scope) => scope.add_group(group),
            None => Ok(()),
        }
    }

    /// Group at a position of a scope
    pub fn group(&self, scope_id: usize, index: usize) -> Option<&GroupEntry> {
        self.get_scope(scope_id)?.groups.get(index)
    }

    /// Look up an element starting at `scope_id` and walking outward
    ///
    /// The nearest scope with any match decides: one defining group binds,
    /// several are ambiguous. An unqualified name considers every group of
    /// a scope; a qualified one only the groups the qualifier addresses.
    ///
    /// # Examples
    ///
    /// ```
    /// use sql_resolver_semantic::{ColumnEntry, ElementLookup, GroupEntry, ScopeManager, ScopeType};
    /// use sql_resolver_ir::{DataType, GroupSymbol, MetadataId};
    ///
    /// let mut manager = ScopeManager::new();
    /// let outer = manager.create_scope(ScopeType::Query, None);
    /// let inner = manager.create_scope(ScopeType::Query, Some(outer));
    /// let group = GroupEntry::new(GroupSymbol::new("pm4.g2"), "pm4.g2").with_columns(vec![
    ///     ColumnEntry::new("e5", DataType::Integer, MetadataId::Group("pm4.g2".into())),
    /// ]);
    /// manager.add_group(outer, group).unwrap();
    ///
    /// let found = manager.lookup_element(Some(inner), None, "e5");
    /// assert!(matches!(found, ElementLookup::Found { scope_id, .. } if scope_id == outer));
    /// ```
    pub fn lookup_element(
        &self,
        scope_id: Option<usize>,
        qualifier: Option<&str>,
        column: &str,
    ) -> ElementLookup {
        let mut current_id = scope_id;
        let mut qualifier_matched = false;

        while let Some(id) = current_id {
            let Some(scope) = self.get_scope(id) else {
                break;
            };
            let candidates: Vec<usize> = match qualifier {
                Some(q) => {
                    let groups = scope.find_groups(q);
                    qualifier_matched |= !groups.is_empty();
                    groups
                }
                None => (0..scope.groups.len()).collect(),
            };
            let hits: Vec<(usize, usize)> = candidates
                .into_iter()
                .filter_map(|g| scope.groups[g].find_column(column).map(|(c, _)| (g, c)))
                .collect();
            trace!(scope = id, column, hits = hits.len(), "element lookup");

            match hits.as_slice() {
                [] => current_id = scope.parent_id,
                [(group, column)] => {
                    return ElementLookup::Found {
                        scope_id: id,
                        group: *group,
                        column: *column,
                    };
                }
                _ => {
                    return ElementLookup::Ambiguous(
                        hits.iter()
                            .map(|(g, _)| scope.groups[*g].display_name())
                            .collect(),
                    );
                }
            }
        }

        ElementLookup::NotFound { qualifier_matched }
    }

    /// Get the total number of scopes
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}
