// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Expressions
//!
//! This module represents the symbols and scalar expressions of a command.
//!
//! ## Design
//!
//! Every symbol kind is a variant of one closed [`Expression`] enum:
//!
//! - **Elements**: column or variable references such as `pm1.g1.e1` or `e1`
//! - **Constants**: typed literal values
//! - **Functions**: scalar calls, infix operators and conversions
//! - **Aggregates**: `COUNT(*)`, `SUM(x)` and friends
//! - **CASE**: simple and searched forms
//! - **Scalar subqueries**: a nested command projecting one column
//! - **References**: `?` positional placeholders
//!
//! A freshly built expression carries names exactly as written and no
//! resolved data. Resolution fills in [`ElementSymbol::group`],
//! `metadata_id` and `data_type`, and may wrap arguments in conversions
//! flagged [`Function::implicit`].
//!
//! ## Implicit conversions
//!
//! ```text
//! Function {
//!   name: "convert",
//!   args: [Element("e2"), Constant('string')],
//!   implicit: true,
//! }
//! ```
//!
//! prints as plain `e2`; an explicit `convert(e2, string)` prints in full.

use serde::{Deserialize, Serialize};

use crate::command::Subquery;
use crate::criteria::Criteria;
use crate::metadata::{FunctionDescriptor, MetadataId, last_segment};
use crate::types::DataType;
use crate::value::Value;

/// Name of the conversion function
pub const CONVERT: &str = "convert";

/// Infix operators printed as `(left op right)`
pub const INFIX_OPERATORS: [&str; 5] = ["+", "-", "*", "/", "||"];

/// A group reference as it appears in FROM, INSERT, UPDATE and DELETE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSymbol {
    /// Alias if one was given, otherwise the name as written
    pub name: String,
    /// Name as written when aliased
    pub definition: Option<String>,
    pub metadata_id: Option<MetadataId>,
}

impl GroupSymbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: None,
            metadata_id: None,
        }
    }

    /// `definition AS alias`
    pub fn aliased(definition: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: alias.into(),
            definition: Some(definition.into()),
            metadata_id: None,
        }
    }

    pub fn is_aliased(&self) -> bool {
        self.definition.is_some()
    }

    /// The name that identifies the underlying object
    pub fn non_alias_name(&self) -> &str {
        self.definition.as_deref().unwrap_or(&self.name)
    }
}

/// A reference to a column or variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSymbol {
    /// Name as written, possibly qualified
    pub name: String,
    /// Group the element was bound to
    pub group: Option<GroupSymbol>,
    pub metadata_id: Option<MetadataId>,
    pub data_type: Option<DataType>,
    /// Bound through an enclosing command's scope
    pub external: bool,
}

impl ElementSymbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: None,
            metadata_id: None,
            data_type: None,
            external: false,
        }
    }

    /// Unqualified column name
    pub fn short_name(&self) -> &str {
        last_segment(&self.name)
    }

    /// Everything before the last segment
    pub fn qualifier(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(q, _)| q)
    }

    pub fn is_resolved(&self) -> bool {
        self.metadata_id.is_some()
    }
}

/// A literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub value: Value,
    /// `None` only for an untyped NULL
    pub data_type: Option<DataType>,
    /// Stands for a list of values (bound IN lists)
    pub multi_valued: bool,
}

impl Constant {
    pub fn new(value: Value) -> Self {
        let data_type = match value.natural_type() {
            DataType::Null => None,
            t => Some(t),
        };
        Self {
            value,
            data_type,
            multi_valued: false,
        }
    }

    pub fn typed(value: Value, data_type: DataType) -> Self {
        Self {
            value,
            data_type: Some(data_type),
            multi_valued: false,
        }
    }
}

/// A function call, infix operator or conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub args: Vec<Expression>,
    pub descriptor: Option<FunctionDescriptor>,
    pub data_type: Option<DataType>,
    /// Synthesized by the resolver, hidden by the printer
    pub implicit: bool,
}

impl Function {
    pub fn new(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self {
            name: name.into(),
            args,
            descriptor: None,
            data_type: None,
            implicit: false,
        }
    }

    /// Resolver-inserted `convert(expr, target)`
    pub fn implicit_convert(expr: Expression, target: DataType) -> Self {
        Self {
            name: CONVERT.to_string(),
            args: vec![
                expr,
                Expression::Constant(Constant::new(Value::String(target.name().to_string()))),
            ],
            descriptor: None,
            data_type: Some(target),
            implicit: true,
        }
    }

    pub fn is_conversion(&self) -> bool {
        self.name.eq_ignore_ascii_case(CONVERT) || self.name.eq_ignore_ascii_case("cast")
    }

    pub fn is_infix(&self) -> bool {
        self.args.len() == 2 && INFIX_OPERATORS.contains(&self.name.as_str())
    }
}

/// Aggregate function kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateKind {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateKind {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateKind::Count => "COUNT",
            AggregateKind::Sum => "SUM",
            AggregateKind::Avg => "AVG",
            AggregateKind::Min => "MIN",
            AggregateKind::Max => "MAX",
        }
    }
}

/// An aggregate call; `arg` is `None` for `COUNT(*)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub kind: AggregateKind,
    pub distinct: bool,
    pub arg: Option<Box<Expression>>,
    pub data_type: Option<DataType>,
}

impl Aggregate {
    pub fn new(kind: AggregateKind, arg: Expression) -> Self {
        Self {
            kind,
            distinct: false,
            arg: Some(Box::new(arg)),
            data_type: None,
        }
    }

    pub fn count_star() -> Self {
        Self {
            kind: AggregateKind::Count,
            distinct: false,
            arg: None,
            data_type: None,
        }
    }
}

/// `CASE operand WHEN .. THEN .. ELSE .. END`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseExpression {
    pub operand: Box<Expression>,
    pub whens: Vec<(Expression, Expression)>,
    pub else_expr: Option<Box<Expression>>,
    pub data_type: Option<DataType>,
}

/// `CASE WHEN criteria THEN .. ELSE .. END`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchedCase {
    pub whens: Vec<(Criteria, Expression)>,
    pub else_expr: Option<Box<Expression>>,
    pub data_type: Option<DataType>,
}

/// `?` placeholder, numbered by appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub index: usize,
    pub data_type: Option<DataType>,
}

/// Scalar expression / symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Element(ElementSymbol),
    Constant(Constant),
    Function(Function),
    Aggregate(Aggregate),
    Case(CaseExpression),
    SearchedCase(SearchedCase),
    ScalarSubquery(Subquery),
    Reference(Reference),
}

impl Expression {
    pub fn element(name: impl Into<String>) -> Self {
        Expression::Element(ElementSymbol::new(name))
    }

    pub fn constant(value: Value) -> Self {
        Expression::Constant(Constant::new(value))
    }

    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Function(Function::new(name, args))
    }

    /// Resolved type; `None` for untyped NULLs and unresolved trees
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Expression::Element(e) => e.data_type,
            Expression::Constant(c) => c.data_type,
            Expression::Function(f) => f.data_type,
            Expression::Aggregate(a) => a.data_type,
            Expression::Case(c) => c.data_type,
            Expression::SearchedCase(c) => c.data_type,
            Expression::ScalarSubquery(s) => s
                .command
                .projected_columns()
                .first()
                .and_then(|c| c.data_type),
            Expression::Reference(r) => r.data_type,
        }
    }

    /// The expression underneath any resolver-inserted conversions
    pub fn without_implicit(&self) -> &Expression {
        match self {
            Expression::Function(f) if f.implicit && !f.args.is_empty() => {
                f.args[0].without_implicit()
            }
            other => other,
        }
    }

    /// Owned counterpart of [`Expression::without_implicit`]
    pub fn into_explicit(self) -> Expression {
        match self {
            Expression::Function(f) if f.implicit && !f.args.is_empty() => {
                match f.args.into_iter().next() {
                    Some(inner) => inner.into_explicit(),
                    None => Expression::Constant(Constant::new(Value::Null)),
                }
            }
            other => other,
        }
    }

    pub fn is_null_constant(&self) -> bool {
        matches!(self, Expression::Constant(c) if c.value.is_null())
    }

    /// Output name when projected without an alias
    pub fn output_name(&self) -> Option<&str> {
        match self.without_implicit() {
            Expression::Element(e) => Some(e.short_name()),
            _ => None,
        }
    }

    /// Whether an aggregate appears outside nested subqueries
    pub fn contains_aggregate(&self) -> bool {
        match self {
            Expression::Aggregate(_) => true,
            Expression::Function(f) => f.args.iter().any(Expression::contains_aggregate),
            Expression::Case(c) => {
                c.operand.contains_aggregate()
                    || c.whens
                        .iter()
                        .any(|(w, t)| w.contains_aggregate() || t.contains_aggregate())
                    || c.else_expr.as_ref().is_some_and(|e| e.contains_aggregate())
            }
            Expression::SearchedCase(c) => {
                c.whens
                    .iter()
                    .any(|(w, t)| w.contains_aggregate() || t.contains_aggregate())
                    || c.else_expr.as_ref().is_some_and(|e| e.contains_aggregate())
            }
            Expression::Element(_)
            | Expression::Constant(_)
            | Expression::ScalarSubquery(_)
            | Expression::Reference(_) => false,
        }
    }

    /// Elements referenced outside aggregates and nested subqueries
    pub fn collect_ungrouped_elements<'a>(&'a self, out: &mut Vec<&'a ElementSymbol>) {
        match self {
            Expression::Element(e) => out.push(e),
            Expression::Function(f) => {
                for arg in &f.args {
                    arg.collect_ungrouped_elements(out);
                }
            }
            Expression::Case(c) => {
                c.operand.collect_ungrouped_elements(out);
                for (w, t) in &c.whens {
                    w.collect_ungrouped_elements(out);
                    t.collect_ungrouped_elements(out);
                }
                if let Some(e) = &c.else_expr {
                    e.collect_ungrouped_elements(out);
                }
            }
            Expression::SearchedCase(c) => {
                for (w, t) in &c.whens {
                    w.collect_ungrouped_elements(out);
                    t.collect_ungrouped_elements(out);
                }
                if let Some(e) = &c.else_expr {
                    e.collect_ungrouped_elements(out);
                }
            }
            Expression::Aggregate(_)
            | Expression::Constant(_)
            | Expression::ScalarSubquery(_)
            | Expression::Reference(_) => {}
        }
    }

    /// Structural equality on resolved bindings, ignoring how names were
    /// written and any implicit conversions
    pub fn same_binding(&self, other: &Expression) -> bool {
        match (self.without_implicit(), other.without_implicit()) {
            (Expression::Element(a), Expression::Element(b)) => match (&a.metadata_id, &b.metadata_id) {
                (Some(x), Some(y)) => {
                    x == y
                        && a.group.as_ref().map(|g| g.name.to_ascii_lowercase())
                            == b.group.as_ref().map(|g| g.name.to_ascii_lowercase())
                }
                _ => a.name.eq_ignore_ascii_case(&b.name),
            },
            (Expression::Constant(a), Expression::Constant(b)) => a.value == b.value,
            (Expression::Function(a), Expression::Function(b)) => {
                a.name.eq_ignore_ascii_case(&b.name)
                    && a.args.len() == b.args.len()
                    && a.args.iter().zip(&b.args).all(|(x, y)| x.same_binding(y))
            }
            (Expression::Aggregate(a), Expression::Aggregate(b)) => {
                a.kind == b.kind
                    && a.distinct == b.distinct
                    && match (&a.arg, &b.arg) {
                        (Some(x), Some(y)) => x.same_binding(y),
                        (None, None) => true,
                        _ => false,
                    }
            }
            (a, b) => a == b,
        }
    }
}

impl From<ElementSymbol> for Expression {
    fn from(value: ElementSymbol) -> Self {
        Expression::Element(value)
    }
}

impl From<Constant> for Expression {
    fn from(value: Constant) -> Self {
        Expression::Constant(value)
    }
}

impl From<Function> for Expression {
    fn from(value: Function) -> Self {
        Expression::Function(value)
    }
}

impl From<Aggregate> for Expression {
    fn from(value: Aggregate) -> Self {
        Expression::Aggregate(value)
    }
}
