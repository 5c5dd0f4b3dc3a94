// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Commands
//!
//! The top-level [`Command`] variant and the non-query command kinds:
//! INSERT, UPDATE, DELETE, EXEC, temp table DDL and procedure bodies.

use serde::{Deserialize, Serialize};

use crate::criteria::Criteria;
use crate::expr::{ElementSymbol, Expression, GroupSymbol};
use crate::metadata::ParameterDirection;
use crate::query::{Query, SelectItem, SetQuery};
use crate::types::DataType;

/// A nested command plus the symbols it binds from enclosing scopes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subquery {
    pub command: Box<Command>,
    /// Filled by resolution, nearest declaring scope first
    pub correlated_references: Vec<ElementSymbol>,
}

impl Subquery {
    pub fn new(command: Command) -> Self {
        Self {
            command: Box::new(command),
            correlated_references: Vec::new(),
        }
    }

    pub fn is_correlated(&self) -> bool {
        !self.correlated_references.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InsertSource {
    Values(Vec<Expression>),
    Query(Box<Command>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insert {
    pub group: GroupSymbol,
    /// Explicit column list; filled with every target column when omitted
    pub columns: Vec<ElementSymbol>,
    /// Whether the column list was written
    pub explicit_columns: bool,
    pub source: InsertSource,
}

impl Insert {
    pub fn values(group: GroupSymbol, columns: &[&str], values: Vec<Expression>) -> Self {
        Self {
            group,
            columns: columns.iter().map(|c| ElementSymbol::new(*c)).collect(),
            explicit_columns: !columns.is_empty(),
            source: InsertSource::Values(values),
        }
    }

    pub fn query(group: GroupSymbol, columns: &[&str], query: Command) -> Self {
        Self {
            group,
            columns: columns.iter().map(|c| ElementSymbol::new(*c)).collect(),
            explicit_columns: !columns.is_empty(),
            source: InsertSource::Query(Box::new(query)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetClause {
    pub column: ElementSymbol,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub group: GroupSymbol,
    pub changes: Vec<SetClause>,
    pub criteria: Option<Criteria>,
}

impl Update {
    pub fn new(group: GroupSymbol, changes: Vec<(&str, Expression)>) -> Self {
        Self {
            group,
            changes: changes
                .into_iter()
                .map(|(c, value)| SetClause {
                    column: ElementSymbol::new(c),
                    value,
                })
                .collect(),
            criteria: None,
        }
    }

    pub fn with_where(mut self, criteria: Criteria) -> Self {
        self.criteria = Some(criteria);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delete {
    pub group: GroupSymbol,
    pub criteria: Option<Criteria>,
}

/// Arguments of an EXEC as written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProcedureArguments {
    Positional(Vec<Expression>),
    /// `name => expr`; the legacy `name = expr` form parses the same way
    Named(Vec<(String, Expression)>),
}

/// A procedure parameter after binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpParameter {
    pub name: String,
    pub direction: ParameterDirection,
    pub data_type: DataType,
    /// Bound input value; `None` for OUT and RETURN parameters
    pub expression: Option<Expression>,
    /// Declaration position
    pub index: usize,
    /// Value came from the declared default or an implied NULL
    pub using_default: bool,
}

/// `EXEC name(args)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProcedure {
    /// Procedure name as written
    pub name: String,
    pub arguments: ProcedureArguments,
    pub group: Option<GroupSymbol>,
    /// Every declared parameter in declaration order
    pub parameters: Vec<SpParameter>,
    /// Return value, then result set columns, then INOUT/OUT parameters
    pub projected: Vec<ElementSymbol>,
}

impl StoredProcedure {
    pub fn positional(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self {
            name: name.into(),
            arguments: ProcedureArguments::Positional(args),
            group: None,
            parameters: Vec::new(),
            projected: Vec::new(),
        }
    }

    pub fn named(name: impl Into<String>, args: Vec<(&str, Expression)>) -> Self {
        Self {
            name: name.into(),
            arguments: ProcedureArguments::Named(
                args.into_iter().map(|(n, e)| (n.to_string(), e)).collect(),
            ),
            group: None,
            parameters: Vec::new(),
            projected: Vec::new(),
        }
    }

    /// Bound input values in declaration order
    pub fn input_values(&self) -> impl Iterator<Item = (&SpParameter, &Expression)> {
        self.parameters
            .iter()
            .filter_map(|p| p.expression.as_ref().map(|e| (p, e)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
}

/// `CREATE LOCAL TEMPORARY TABLE`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Create {
    pub table: GroupSymbol,
    pub columns: Vec<ColumnDefinition>,
    pub primary_key: Vec<String>,
}

impl Create {
    pub fn new(table: impl Into<String>, columns: &[(&str, DataType)]) -> Self {
        Self {
            table: GroupSymbol::new(table),
            columns: columns
                .iter()
                .map(|(name, data_type)| ColumnDefinition {
                    name: name.to_string(),
                    data_type: *data_type,
                })
                .collect(),
            primary_key: Vec::new(),
        }
    }

    pub fn with_primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(|c| c.to_string()).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTable {
    pub table: GroupSymbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcedureKind {
    /// Body of a virtual procedure
    Virtual,
    /// INSERT/UPDATE/DELETE procedure of a virtual group
    Update,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssignmentValue {
    Expression(Expression),
    Command(Box<Command>),
}

/// Procedural statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Declare {
        variable: ElementSymbol,
        data_type: DataType,
        value: Option<AssignmentValue>,
    },
    Assignment {
        variable: ElementSymbol,
        value: AssignmentValue,
    },
    Command(Box<Command>),
    If {
        condition: Criteria,
        then_block: Block,
        else_block: Option<Block>,
    },
    While {
        condition: Criteria,
        block: Block,
    },
    /// `LOOP ON (query) AS cursor`
    Loop {
        query: Box<Command>,
        cursor: String,
        block: Block,
    },
    Block(Block),
    Raise(Expression),
    Break,
    Continue,
}

impl Statement {
    pub fn command(command: Command) -> Self {
        Statement::Command(Box::new(command))
    }

    pub fn declare(name: &str, data_type: DataType, value: Option<Expression>) -> Self {
        Statement::Declare {
            variable: ElementSymbol::new(name),
            data_type,
            value: value.map(AssignmentValue::Expression),
        }
    }

    pub fn assign(name: &str, value: Expression) -> Self {
        Statement::Assignment {
            variable: ElementSymbol::new(name),
            value: AssignmentValue::Expression(value),
        }
    }
}

/// `CREATE [VIRTUAL] PROCEDURE BEGIN .. END`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProcedure {
    pub kind: ProcedureKind,
    pub block: Block,
}

/// Command tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Query(Query),
    SetQuery(SetQuery),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    StoredProcedure(StoredProcedure),
    Create(Create),
    Drop(DropTable),
    CreateProcedure(CreateProcedure),
}

/// One projected output column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedColumn {
    pub name: String,
    pub data_type: Option<DataType>,
}

impl Command {
    /// Keyword naming the command kind, for messages and tracing
    pub fn kind_name(&self) -> &'static str {
        match self {
            Command::Query(_) => "SELECT",
            Command::SetQuery(s) => s.op.keyword(),
            Command::Insert(_) => "INSERT",
            Command::Update(_) => "UPDATE",
            Command::Delete(_) => "DELETE",
            Command::StoredProcedure(_) => "EXEC",
            Command::Create(_) => "CREATE",
            Command::Drop(_) => "DROP",
            Command::CreateProcedure(_) => "CREATE PROCEDURE",
        }
    }

    /// Whether the command yields rows
    pub fn is_query_like(&self) -> bool {
        matches!(
            self,
            Command::Query(_) | Command::SetQuery(_) | Command::StoredProcedure(_)
        )
    }

    /// Output columns of a resolved command
    ///
    /// Unaliased non-element expressions are named `expr1`, `expr2`, ...
    /// after their 1-based select position.
    pub fn projected_columns(&self) -> Vec<ProjectedColumn> {
        match self {
            Command::Query(query) => {
                let mut columns = Vec::new();
                for item in &query.select.items {
                    match item {
                        SelectItem::All { elements } | SelectItem::AllInGroup { elements, .. } => {
                            columns.extend(elements.iter().map(|e| ProjectedColumn {
                                name: e.short_name().to_string(),
                                data_type: e.data_type,
                            }));
                        }
                        SelectItem::Expression { expr, alias } => {
                            let name = match (alias, expr.output_name()) {
                                (Some(alias), _) => alias.clone(),
                                (None, Some(name)) => name.to_string(),
                                (None, None) => format!("expr{}", columns.len() + 1),
                            };
                            columns.push(ProjectedColumn {
                                name,
                                data_type: expr.data_type(),
                            });
                        }
                    }
                }
                columns
            }
            Command::SetQuery(set) => set.left.projected_columns(),
            Command::StoredProcedure(sp) => sp
                .projected
                .iter()
                .map(|e| ProjectedColumn {
                    name: e.short_name().to_string(),
                    data_type: e.data_type,
                })
                .collect(),
            Command::Insert(_)
            | Command::Update(_)
            | Command::Delete(_)
            | Command::Create(_)
            | Command::Drop(_)
            | Command::CreateProcedure(_) => Vec::new(),
        }
    }
}

impl From<Query> for Command {
    fn from(value: Query) -> Self {
        Command::Query(value)
    }
}

impl From<SetQuery> for Command {
    fn from(value: SetQuery) -> Self {
        Command::SetQuery(value)
    }
}

impl From<Insert> for Command {
    fn from(value: Insert) -> Self {
        Command::Insert(value)
    }
}

impl From<Update> for Command {
    fn from(value: Update) -> Self {
        Command::Update(value)
    }
}

impl From<Delete> for Command {
    fn from(value: Delete) -> Self {
        Command::Delete(value)
    }
}

impl From<StoredProcedure> for Command {
    fn from(value: StoredProcedure) -> Self {
        Command::StoredProcedure(value)
    }
}

impl From<Create> for Command {
    fn from(value: Create) -> Self {
        Command::Create(value)
    }
}

impl From<DropTable> for Command {
    fn from(value: DropTable) -> Self {
        Command::Drop(value)
    }
}

impl From<CreateProcedure> for Command {
    fn from(value: CreateProcedure) -> Self {
        Command::CreateProcedure(value)
    }
}
