// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Query resolver
//!
//! [`QueryResolver`] is the entry point: it takes an unresolved command tree
//! and returns the same tree with every symbol bound to metadata and every
//! expression typed.
//!
//! ## Architecture
//!
//! One call to [`QueryResolver::resolve_with`] creates a private session
//! that owns all per-call state:
//!
//! - a [`ScopeManager`] holding every scope created for the command
//! - a [`TempMetadataStore`] for temp tables, WITH items, inline views,
//!   procedure variables and loop cursors
//! - a stack of correlation frames, one per subquery being resolved
//!
//! The resolver itself holds only shared, read-only state (catalog, function
//! registry, configuration), so one resolver can serve concurrent callers.
//!
//! The session's resolution steps live in sibling modules:
//!
//! | module        | resolves                                         |
//! |---------------|--------------------------------------------------|
//! | `group`       | FROM clause groups, DML targets                  |
//! | `expression`  | elements, constants, CASE, criteria              |
//! | `function`    | function overloads, conversions, LOOKUP, aggregates |
//! | `correlation` | subqueries and their external references         |
//! | `command`     | queries and set queries                          |
//! | `dml`         | INSERT, UPDATE, DELETE, temp table DDL           |
//! | `exec`        | EXEC argument binding                            |
//! | `procedure`   | procedure blocks, variables, loops               |

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sql_resolver_catalog::MetadataCatalog;
use sql_resolver_function_registry::FunctionRegistry;
use sql_resolver_ir::{Command, DataType, ElementSymbol, GroupSymbol, MetadataId};
use tracing::{debug, instrument};

use crate::coercion::TypeLattice;
use crate::command::CommandContext;
use crate::config::ResolverConfig;
use crate::correlation::CorrelationFrame;
use crate::error::SemanticResult;
use crate::scope::{ScopeManager, ScopeType};
use crate::symbol::GroupEntry;
use crate::temp::{TempGroupKind, TempMetadataStore};

/// A group supplied by the caller, visible to the whole command
///
/// Elements bound to external groups are reported in
/// [`ResolvedCommand::external_references`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalGroup {
    pub name: String,
    pub columns: Vec<(String, DataType)>,
}

impl ExternalGroup {
    pub fn new(name: impl Into<String>, columns: &[(&str, DataType)]) -> Self {
        Self {
            name: name.into(),
            columns: columns
                .iter()
                .map(|(n, t)| (n.to_string(), *t))
                .collect(),
        }
    }
}

/// Per-call inputs beyond the command itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOptions {
    /// Groups visible outside the command (e.g. a trigger's NEW/OLD rows)
    #[serde(default)]
    pub external_groups: Vec<ExternalGroup>,

    /// Element names whose types `?` references take, by reference index
    #[serde(default)]
    pub bindings: Vec<String>,

    /// Virtual group an update procedure is defined for; supplies the
    /// `INPUT` and `CHANGING` groups
    #[serde(default)]
    pub update_target: Option<String>,
}

impl ResolveOptions {
    pub fn with_external_group(mut self, group: ExternalGroup) -> Self {
        self.external_groups.push(group);
        self
    }

    pub fn with_bindings(mut self, bindings: &[&str]) -> Self {
        self.bindings = bindings.iter().map(|b| b.to_string()).collect();
        self
    }

    pub fn with_update_target(mut self, target: impl Into<String>) -> Self {
        self.update_target = Some(target.into());
        self
    }
}

/// A resolved command plus what resolution created along the way
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCommand {
    pub command: Command,

    /// Every temp group created while resolving
    pub temp_metadata: TempMetadataStore,

    /// Elements bound to groups outside the command
    pub external_references: Vec<ElementSymbol>,
}

impl fmt::Display for ResolvedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command)
    }
}

/// Binds and types command trees against a metadata catalog
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sql_resolver_catalog::StaticCatalog;
/// use sql_resolver_ir::{
///     ColumnMetadata, Command, DataType, Expression, FromClause, GroupMetadata, GroupSymbol,
///     Query, SelectItem,
/// };
/// use sql_resolver_semantic::QueryResolver;
///
/// let catalog = StaticCatalog::new().with_group(
///     GroupMetadata::new("pm1.g1").with_columns(vec![ColumnMetadata::new("e1", DataType::String)]),
/// );
/// let resolver = QueryResolver::new(Arc::new(catalog));
///
/// let query = Query::select(vec![SelectItem::expr(Expression::element("e1"))])
///     .with_from(vec![FromClause::group(GroupSymbol::new("pm1.g1"))]);
/// let resolved = resolver.resolve(Command::Query(query)).unwrap();
/// assert_eq!(resolved.command.projected_columns()[0].data_type, Some(DataType::String));
/// ```
pub struct QueryResolver {
    catalog: Arc<dyn MetadataCatalog>,
    functions: Arc<FunctionRegistry>,
    lattice: TypeLattice,
    config: ResolverConfig,
}

impl QueryResolver {
    /// Create a resolver with the built-in function library and default
    /// configuration
    pub fn new(catalog: Arc<dyn MetadataCatalog>) -> Self {
        Self {
            catalog,
            functions: Arc::new(FunctionRegistry::new()),
            lattice: TypeLattice::default(),
            config: ResolverConfig::default(),
        }
    }

    /// Use a different function library
    pub fn with_functions(mut self, functions: Arc<FunctionRegistry>) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.lattice = TypeLattice::new(config.default_type);
        self.config = config;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn lattice(&self) -> &TypeLattice {
        &self.lattice
    }

    /// Resolve a command with no external groups or bindings
    #[instrument(skip_all, fields(kind = command.kind_name()))]
    pub fn resolve(&self, command: Command) -> SemanticResult<ResolvedCommand> {
        self.resolve_with(command, &ResolveOptions::default())
    }

    /// Resolve a command
    ///
    /// # Errors
    ///
    /// Returns the first [`SemanticError`](crate::SemanticError) found; no
    /// partially resolved tree is returned.
    #[instrument(skip_all, fields(kind = command.kind_name()))]
    pub fn resolve_with(
        &self,
        command: Command,
        options: &ResolveOptions,
    ) -> SemanticResult<ResolvedCommand> {
        let mut session = Session::new(self, options);
        let parent = session.register_external_groups(&options.external_groups)?;

        session.push_frame()?;
        let result = session.resolve_command(command, parent, CommandContext::default());
        let external_references = session.pop_frame();
        let command = result?;

        debug!(
            temp_groups = session.temps.len(),
            scopes = session.scopes.scope_count(),
            external = external_references.len(),
            "resolved command"
        );
        Ok(ResolvedCommand {
            command,
            temp_metadata: session.temps,
            external_references,
        })
    }
}

/// State of one resolution call
pub(crate) struct Session<'r> {
    resolver: &'r QueryResolver,
    pub(crate) scopes: ScopeManager,
    pub(crate) temps: TempMetadataStore,
    pub(crate) frames: Vec<CorrelationFrame>,
    pub(crate) bindings: &'r [String],
    pub(crate) update_target: Option<&'r str>,
}

impl<'r> Session<'r> {
    fn new(resolver: &'r QueryResolver, options: &'r ResolveOptions) -> Self {
        Self {
            resolver,
            scopes: ScopeManager::new(),
            temps: TempMetadataStore::new(),
            frames: Vec::new(),
            bindings: &options.bindings,
            update_target: options.update_target.as_deref(),
        }
    }

    pub(crate) fn catalog(&self) -> &'r dyn MetadataCatalog {
        self.resolver.catalog.as_ref()
    }

    pub(crate) fn functions(&self) -> &'r FunctionRegistry {
        self.resolver.functions.as_ref()
    }

    pub(crate) fn lattice(&self) -> &'r TypeLattice {
        &self.resolver.lattice
    }

    pub(crate) fn config(&self) -> &'r ResolverConfig {
        &self.resolver.config
    }

    pub(crate) fn default_type(&self) -> DataType {
        self.resolver.lattice.default_type()
    }

    /// Put caller-supplied groups in an outermost scope
    fn register_external_groups(
        &mut self,
        groups: &[ExternalGroup],
    ) -> SemanticResult<Option<usize>> {
        if groups.is_empty() {
            return Ok(None);
        }
        let scope = self.scopes.create_scope(ScopeType::External, None);
        for group in groups {
            let columns: Vec<(&str, DataType)> = group
                .columns
                .iter()
                .map(|(n, t)| (n.as_str(), *t))
                .collect();
            let id = self
                .temps
                .create_group(&group.name, TempGroupKind::External, &columns)?;
            let mut symbol = GroupSymbol::new(group.name.clone());
            symbol.metadata_id = Some(MetadataId::TempGroup(id));
            let entry = GroupEntry::new(symbol, group.name.clone()).with_columns(
                self.temps
                    .get(id)
                    .map(|g| g.column_entries())
                    .unwrap_or_default(),
            );
            self.scopes.add_group(scope, entry)?;
        }
        Ok(Some(scope))
    }
}
