// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Shorthand constructors for unresolved command trees
//!
//! ```
//! use sql_resolver_test_utils::builders::*;
//!
//! let query = select(&["e1", "e2"]).with_from(from(&["pm1.g1"])).with_where(eq(elem("e2"), int(1)));
//! assert_eq!(query.to_string(), "SELECT e1, e2 FROM pm1.g1 WHERE e2 = 1");
//! ```

use sql_resolver_ir::{
    Aggregate, AggregateKind, Command, CompareOp, Criteria, Expression, FromClause, GroupSymbol,
    JoinType, Query, Reference, SelectItem, Subquery, Value,
};

pub fn elem(name: &str) -> Expression {
    Expression::element(name)
}

pub fn int(value: i64) -> Expression {
    Expression::constant(Value::Integer(value))
}

pub fn string(value: &str) -> Expression {
    Expression::constant(Value::String(value.to_string()))
}

pub fn boolean(value: bool) -> Expression {
    Expression::constant(Value::Boolean(value))
}

pub fn double(value: f64) -> Expression {
    Expression::constant(Value::Double(value))
}

pub fn null() -> Expression {
    Expression::constant(Value::Null)
}

/// `?` number `index`, counted from zero
pub fn reference(index: usize) -> Expression {
    Expression::Reference(Reference {
        index,
        data_type: None,
    })
}

pub fn func(name: &str, args: Vec<Expression>) -> Expression {
    Expression::function(name, args)
}

pub fn convert(expr: Expression, type_name: &str) -> Expression {
    func("convert", vec![expr, string(type_name)])
}

pub fn aggregate(kind: AggregateKind, arg: Expression) -> Expression {
    Expression::Aggregate(Aggregate::new(kind, arg))
}

pub fn count_star() -> Expression {
    Expression::Aggregate(Aggregate::count_star())
}

pub fn scalar(command: impl Into<Command>) -> Expression {
    Expression::ScalarSubquery(Subquery::new(command.into()))
}

pub fn subquery(command: impl Into<Command>) -> Subquery {
    Subquery::new(command.into())
}

pub fn compare(left: Expression, op: CompareOp, right: Expression) -> Criteria {
    Criteria::compare(left, op, right)
}

pub fn eq(left: Expression, right: Expression) -> Criteria {
    Criteria::compare(left, CompareOp::Eq, right)
}

/// `SELECT a, b, ..` over plain element names
pub fn select(names: &[&str]) -> Query {
    Query::select(names.iter().map(|n| SelectItem::expr(elem(n))).collect())
}

pub fn select_exprs(exprs: Vec<Expression>) -> Query {
    Query::select(exprs.into_iter().map(SelectItem::expr).collect())
}

pub fn select_star() -> Query {
    Query::select(vec![SelectItem::all()])
}

/// Comma-separated FROM groups; `"pm1.g1 AS x"` is aliased
pub fn from(groups: &[&str]) -> Vec<FromClause> {
    groups.iter().map(|g| FromClause::group(group(g))).collect()
}

/// A group symbol, aliased when written `name AS alias`
pub fn group(text: &str) -> GroupSymbol {
    match text.split_once(" AS ") {
        Some((definition, alias)) => GroupSymbol::aliased(definition.trim(), alias.trim()),
        None => GroupSymbol::new(text),
    }
}

pub fn join(left: &str, join_type: JoinType, right: &str, criteria: Option<Criteria>) -> FromClause {
    FromClause::join(
        FromClause::group(group(left)),
        join_type,
        FromClause::group(group(right)),
        criteria,
    )
}
