// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Resolver-specific test helpers and custom assertions

use std::fmt::Display;

use sql_resolver_ir::{
    AssignmentValue, Block, Command, Criteria, DataType, ElementSymbol, Expression, FromClause,
    InsertSource, ProcedureArguments, Query, SelectItem, Statement,
};

/// Assert the canonical string of a command or expression
#[track_caller]
pub fn assert_sql_eq(actual: &impl Display, expected: &str) {
    pretty_assertions::assert_eq!(actual.to_string(), expected);
}

/// Assert the output types of a query-like command, in projection order
#[track_caller]
pub fn assert_projected_types(command: &Command, expected: &[DataType]) {
    let actual: Vec<Option<DataType>> = command
        .projected_columns()
        .into_iter()
        .map(|c| c.data_type)
        .collect();
    let expected: Vec<Option<DataType>> = expected.iter().copied().map(Some).collect();
    pretty_assertions::assert_eq!(actual, expected);
}

/// Assert the output names of a query-like command, in projection order
#[track_caller]
pub fn assert_projected_names(command: &Command, expected: &[&str]) {
    let actual: Vec<String> = command
        .projected_columns()
        .into_iter()
        .map(|c| c.name)
        .collect();
    pretty_assertions::assert_eq!(actual, expected);
}

/// Assert every element of a command tree carries a binding and a type
#[track_caller]
pub fn assert_fully_resolved(command: &Command) {
    let unresolved: Vec<&str> = collect_elements(command)
        .into_iter()
        .filter(|e| !e.is_resolved() || e.data_type.is_none())
        .map(|e| e.name.as_str())
        .collect();
    assert!(
        unresolved.is_empty(),
        "unresolved elements {:?} in {}",
        unresolved,
        command
    );
}

/// Every element symbol in a command tree, nested commands included
pub fn collect_elements(command: &Command) -> Vec<&ElementSymbol> {
    let mut out = Vec::new();
    walk_command(command, &mut out);
    out
}

fn walk_command<'a>(command: &'a Command, out: &mut Vec<&'a ElementSymbol>) {
    match command {
        Command::Query(query) => walk_query(query, out),
        Command::SetQuery(set) => {
            walk_command(&set.left, out);
            walk_command(&set.right, out);
            for item in &set.order_by {
                walk_expression(&item.expr, out);
            }
        }
        Command::Insert(insert) => {
            out.extend(&insert.columns);
            match &insert.source {
                InsertSource::Values(values) => {
                    values.iter().for_each(|v| walk_expression(v, out))
                }
                InsertSource::Query(query) => walk_command(query, out),
            }
        }
        Command::Update(update) => {
            for change in &update.changes {
                out.push(&change.column);
                walk_expression(&change.value, out);
            }
            if let Some(criteria) = &update.criteria {
                walk_criteria(criteria, out);
            }
        }
        Command::Delete(delete) => {
            if let Some(criteria) = &delete.criteria {
                walk_criteria(criteria, out);
            }
        }
        Command::StoredProcedure(sp) => {
            match &sp.arguments {
                ProcedureArguments::Positional(args) => {
                    args.iter().for_each(|a| walk_expression(a, out))
                }
                ProcedureArguments::Named(args) => {
                    args.iter().for_each(|(_, a)| walk_expression(a, out))
                }
            }
            out.extend(&sp.projected);
        }
        Command::Create(_) | Command::Drop(_) => {}
        Command::CreateProcedure(procedure) => walk_block(&procedure.block, out),
    }
}

fn walk_query<'a>(query: &'a Query, out: &mut Vec<&'a ElementSymbol>) {
    for item in &query.with {
        walk_command(&item.command, out);
    }
    for item in &query.select.items {
        match item {
            SelectItem::All { elements } | SelectItem::AllInGroup { elements, .. } => {
                out.extend(elements)
            }
            SelectItem::Expression { expr, .. } => walk_expression(expr, out),
        }
    }
    for clause in &query.from {
        walk_from(clause, out);
    }
    if let Some(criteria) = &query.criteria {
        walk_criteria(criteria, out);
    }
    query.group_by.iter().for_each(|e| walk_expression(e, out));
    if let Some(having) = &query.having {
        walk_criteria(having, out);
    }
    for item in &query.order_by {
        walk_expression(&item.expr, out);
    }
    if let Some(limit) = &query.limit {
        if let Some(offset) = &limit.offset {
            walk_expression(offset, out);
        }
        walk_expression(&limit.row_limit, out);
    }
}

fn walk_from<'a>(clause: &'a FromClause, out: &mut Vec<&'a ElementSymbol>) {
    match clause {
        FromClause::Group(_) => {}
        FromClause::Join {
            left,
            right,
            criteria,
            ..
        } => {
            walk_from(left, out);
            walk_from(right, out);
            if let Some(criteria) = criteria {
                walk_criteria(criteria, out);
            }
        }
        FromClause::Subquery { subquery, .. } => walk_command(&subquery.command, out),
    }
}

fn walk_expression<'a>(expr: &'a Expression, out: &mut Vec<&'a ElementSymbol>) {
    match expr {
        Expression::Element(element) => out.push(element),
        Expression::Constant(_) | Expression::Reference(_) => {}
        Expression::Function(function) => {
            function.args.iter().for_each(|a| walk_expression(a, out))
        }
        Expression::Aggregate(aggregate) => {
            if let Some(arg) = &aggregate.arg {
                walk_expression(arg, out);
            }
        }
        Expression::Case(case) => {
            walk_expression(&case.operand, out);
            for (when, then) in &case.whens {
                walk_expression(when, out);
                walk_expression(then, out);
            }
            if let Some(else_expr) = &case.else_expr {
                walk_expression(else_expr, out);
            }
        }
        Expression::SearchedCase(case) => {
            for (when, then) in &case.whens {
                walk_criteria(when, out);
                walk_expression(then, out);
            }
            if let Some(else_expr) = &case.else_expr {
                walk_expression(else_expr, out);
            }
        }
        Expression::ScalarSubquery(subquery) => walk_command(&subquery.command, out),
    }
}

fn walk_criteria<'a>(criteria: &'a Criteria, out: &mut Vec<&'a ElementSymbol>) {
    match criteria {
        Criteria::Compound { criteria, .. } => {
            criteria.iter().for_each(|c| walk_criteria(c, out))
        }
        Criteria::Not(inner) => walk_criteria(inner, out),
        Criteria::InSubquery { expr, subquery, .. } => {
            walk_expression(expr, out);
            walk_command(&subquery.command, out);
        }
        Criteria::QuantifiedCompare { left, subquery, .. } => {
            walk_expression(left, out);
            walk_command(&subquery.command, out);
        }
        Criteria::Exists { subquery, .. } => walk_command(&subquery.command, out),
        other => other
            .operands()
            .into_iter()
            .for_each(|e| walk_expression(e, out)),
    }
}

fn walk_block<'a>(block: &'a Block, out: &mut Vec<&'a ElementSymbol>) {
    for statement in &block.statements {
        match statement {
            Statement::Declare {
                variable, value, ..
            } => {
                out.push(variable);
                if let Some(value) = value {
                    walk_assignment(value, out);
                }
            }
            Statement::Assignment { variable, value } => {
                out.push(variable);
                walk_assignment(value, out);
            }
            Statement::Command(command) => walk_command(command, out),
            Statement::If {
                condition,
                then_block,
                else_block,
            } => {
                walk_criteria(condition, out);
                walk_block(then_block, out);
                if let Some(else_block) = else_block {
                    walk_block(else_block, out);
                }
            }
            Statement::While { condition, block } => {
                walk_criteria(condition, out);
                walk_block(block, out);
            }
            Statement::Loop { query, block, .. } => {
                walk_command(query, out);
                walk_block(block, out);
            }
            Statement::Block(block) => walk_block(block, out),
            Statement::Raise(expr) => walk_expression(expr, out),
            Statement::Break | Statement::Continue => {}
        }
    }
}

fn walk_assignment<'a>(value: &'a AssignmentValue, out: &mut Vec<&'a ElementSymbol>) {
    match value {
        AssignmentValue::Expression(expr) => walk_expression(expr, out),
        AssignmentValue::Command(command) => walk_command(command, out),
    }
}
