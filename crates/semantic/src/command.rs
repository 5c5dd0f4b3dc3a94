// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Query resolution
//!
//! Clauses of a query resolve in a fixed order:
//!
//! 1. WITH items, each becoming a temp group visible to the rest of the query
//! 2. FROM, building the query scope (joins and inline views get scopes of
//!    their own whose parent is the enclosing command's scope)
//! 3. SELECT, expanding `*` and `g.*`
//! 4. WHERE, GROUP BY, HAVING
//! 5. ORDER BY, which may name SELECT aliases and positions
//! 6. LIMIT
//! 7. INTO, converting to an existing group's columns or creating a temp
//!    group
//!
//! Set queries resolve both branches, then convert each output column to the
//! branches' common type.

use sql_resolver_ir::{
    Command, Constant, DataType, ElementSymbol, Expression, FromClause, GroupSymbol, Limit,
    MetadataId, OrderByItem, Query, Select, SelectItem, SetQuery, Value, WithItem,
};
use tracing::debug;

use crate::error::{SemanticError, SemanticResult};
use crate::expression::{Clause, ExprContext, assign_type};
use crate::resolver::Session;
use crate::scope::ScopeType;
use crate::symbol::GroupEntry;
use crate::temp::TempGroupKind;

/// How a command is being resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CommandContext {
    /// A branch of a set query: untyped projected NULLs and `?` stay untyped
    /// so the set query can type them from the other branch
    pub set_branch: bool,
}

impl CommandContext {
    pub fn branch() -> Self {
        Self { set_branch: true }
    }
}

/// Output name and expression of each projected column
pub(crate) fn select_outputs(select: &Select) -> Vec<(String, Expression)> {
    let mut outputs = Vec::new();
    for item in &select.items {
        match item {
            SelectItem::All { elements } | SelectItem::AllInGroup { elements, .. } => {
                outputs.extend(
                    elements
                        .iter()
                        .map(|e| (e.short_name().to_string(), Expression::Element(e.clone()))),
                );
            }
            SelectItem::Expression { expr, alias } => {
                let name = match (alias, expr.output_name()) {
                    (Some(alias), _) => alias.clone(),
                    (None, Some(name)) => name.to_string(),
                    (None, None) => format!("expr{}", outputs.len() + 1),
                };
                outputs.push((name, expr.clone()));
            }
        }
    }
    outputs
}

/// ORDER BY position constant, if the expression is one
fn order_position(expr: &Expression) -> Option<i64> {
    match expr.without_implicit() {
        Expression::Constant(Constant {
            value: Value::Integer(n),
            ..
        }) => Some(*n),
        _ => None,
    }
}

fn check_position(position: i64, count: usize) -> SemanticResult<usize> {
    match usize::try_from(position) {
        Ok(p) if p >= 1 && p <= count => Ok(p - 1),
        _ => Err(SemanticError::OrderByPositionOutOfRange { position, count }),
    }
}

impl Session<'_> {
    /// Resolve any command whose enclosing scopes start at `parent`
    pub(crate) fn resolve_command(
        &mut self,
        command: Command,
        parent: Option<usize>,
        cx: CommandContext,
    ) -> SemanticResult<Command> {
        match command {
            Command::Query(query) => self.resolve_query(query, parent, cx).map(Command::Query),
            Command::SetQuery(set) => self
                .resolve_set_query(set, parent, cx)
                .map(Command::SetQuery),
            Command::Insert(insert) => self.resolve_insert(insert, parent).map(Command::Insert),
            Command::Update(update) => self.resolve_update(update, parent).map(Command::Update),
            Command::Delete(delete) => self.resolve_delete(delete, parent).map(Command::Delete),
            Command::StoredProcedure(sp) => self
                .resolve_stored_procedure(sp, parent)
                .map(Command::StoredProcedure),
            Command::Create(create) => self.resolve_create(create).map(Command::Create),
            Command::Drop(drop) => self.resolve_drop(drop).map(Command::Drop),
            Command::CreateProcedure(procedure) => self
                .resolve_procedure(procedure, parent)
                .map(Command::CreateProcedure),
        }
    }

    fn resolve_query(
        &mut self,
        query: Query,
        parent: Option<usize>,
        cx: CommandContext,
    ) -> SemanticResult<Query> {
        let saved = self.temps.save_visible();
        let with = self.resolve_with(query.with, parent)?;

        let scope = self.scopes.create_scope(ScopeType::Query, parent);
        let mut from = Vec::with_capacity(query.from.len());
        for item in query.from {
            let (item, entries) = self.resolve_from_clause(item, scope, parent, &[])?;
            for entry in entries {
                self.scopes.add_group(scope, entry)?;
            }
            from.push(item);
        }

        let select = self.resolve_select(query.select, scope, cx)?;
        let criteria = query
            .criteria
            .map(|c| self.resolve_criteria(c, ExprContext::new(Some(scope), Clause::Where)))
            .transpose()?;

        let mut group_by = Vec::with_capacity(query.group_by.len());
        for expr in query.group_by {
            let expr = self.resolve_expression(expr, ExprContext::new(Some(scope), Clause::GroupBy))?;
            let mut elements = Vec::new();
            expr.collect_ungrouped_elements(&mut elements);
            if let Some(external) = elements.iter().find(|e| e.external) {
                return Err(SemanticError::InvalidCorrelation(external.name.clone()));
            }
            group_by.push(expr);
        }

        let having = query
            .having
            .map(|c| self.resolve_criteria(c, ExprContext::new(Some(scope), Clause::Having)))
            .transpose()?;

        let mut resolved = Query {
            with,
            select,
            into: None,
            from,
            criteria,
            group_by,
            having,
            order_by: Vec::new(),
            limit: None,
        };
        resolved.order_by = self.resolve_order_by(query.order_by, &resolved, scope, cx)?;
        resolved.limit = query
            .limit
            .map(|l| self.resolve_limit(l, Some(scope)))
            .transpose()?;

        self.temps.restore_visible(saved);
        match query.into {
            Some(into) => self.resolve_into(into, resolved),
            None => Ok(resolved),
        }
    }

    fn resolve_with(
        &mut self,
        items: Vec<WithItem>,
        parent: Option<usize>,
    ) -> SemanticResult<Vec<WithItem>> {
        let mut resolved: Vec<WithItem> = Vec::with_capacity(items.len());
        for item in items {
            if resolved
                .iter()
                .any(|w| w.name.eq_ignore_ascii_case(&item.name))
            {
                return Err(SemanticError::DuplicateWithItem(item.name));
            }

            self.push_frame()?;
            let command = self.resolve_command(*item.command, parent, CommandContext::default());
            self.pop_frame();
            let command = command?;

            let projected = command.projected_columns();
            let names: Vec<&str> = if item.columns.is_empty() {
                projected.iter().map(|c| c.name.as_str()).collect()
            } else if item.columns.len() == projected.len() {
                item.columns.iter().map(String::as_str).collect()
            } else {
                return Err(SemanticError::WithColumnCount {
                    name: item.name,
                    declared: item.columns.len(),
                    projected: projected.len(),
                });
            };
            let columns: Vec<(&str, DataType)> = names
                .into_iter()
                .zip(&projected)
                .map(|(n, c)| (n, c.data_type.unwrap_or(self.default_type())))
                .collect();
            let id = self
                .temps
                .create_group(&item.name, TempGroupKind::With, &columns)?;
            self.temps.make_visible(id);
            debug!(name = %item.name, columns = columns.len(), "bound WITH item");

            resolved.push(WithItem {
                name: item.name,
                columns: item.columns,
                command: Box::new(command),
            });
        }
        Ok(resolved)
    }

    /// Resolve one FROM item, returning the groups it contributes
    ///
    /// `preceding` holds groups of enclosing join branches not yet added to
    /// the query scope; lateral views see them.
    fn resolve_from_clause(
        &mut self,
        item: FromClause,
        query_scope: usize,
        parent: Option<usize>,
        preceding: &[GroupEntry],
    ) -> SemanticResult<(FromClause, Vec<GroupEntry>)> {
        match item {
            FromClause::Group(symbol) => {
                let (symbol, entry) = self.resolve_from_group(symbol)?;
                Ok((FromClause::Group(symbol), vec![entry]))
            }
            FromClause::Join {
                left,
                join_type,
                right,
                criteria,
            } => {
                let (left, mut entries) =
                    self.resolve_from_clause(*left, query_scope, parent, preceding)?;
                let mut visible = preceding.to_vec();
                visible.extend(entries.iter().cloned());
                let (right, right_entries) =
                    self.resolve_from_clause(*right, query_scope, parent, &visible)?;
                entries.extend(right_entries);

                let join_scope =
                    self.scopes
                        .create_scope_with(ScopeType::Join, parent, entries.clone())?;
                let criteria = criteria
                    .map(|c| self.resolve_criteria(c, ExprContext::new(Some(join_scope), Clause::From)))
                    .transpose()?;
                Ok((
                    FromClause::Join {
                        left: Box::new(left),
                        join_type,
                        right: Box::new(right),
                        criteria,
                    },
                    entries,
                ))
            }
            FromClause::Subquery {
                subquery,
                alias,
                lateral,
            } => {
                let subquery_parent = if lateral {
                    let mut groups = self
                        .scopes
                        .get_scope(query_scope)
                        .map(|s| s.groups.clone())
                        .unwrap_or_default();
                    groups.extend(preceding.iter().cloned());
                    Some(
                        self.scopes
                            .create_scope_with(ScopeType::Lateral, parent, groups)?,
                    )
                } else {
                    parent
                };
                let subquery =
                    self.resolve_subquery(subquery, subquery_parent, CommandContext::default())?;
                let entry = self.inline_view_entry(&alias, &subquery.command)?;
                Ok((
                    FromClause::Subquery {
                        subquery,
                        alias,
                        lateral,
                    },
                    vec![entry],
                ))
            }
        }
    }

    fn inline_view_entry(&mut self, alias: &str, command: &Command) -> SemanticResult<GroupEntry> {
        let projected = command.projected_columns();
        let columns: Vec<(&str, DataType)> = projected
            .iter()
            .map(|c| (c.name.as_str(), c.data_type.unwrap_or(self.default_type())))
            .collect();
        let id = self
            .temps
            .create_group(alias, TempGroupKind::InlineView, &columns)?;
        let mut symbol = GroupSymbol::new(alias);
        symbol.metadata_id = Some(MetadataId::TempGroup(id));
        let columns = self
            .temps
            .get(id)
            .map(|g| g.column_entries())
            .unwrap_or_default();
        Ok(GroupEntry::new(symbol, alias).with_columns(columns))
    }

    fn resolve_select(
        &mut self,
        select: Select,
        scope: usize,
        cx: CommandContext,
    ) -> SemanticResult<Select> {
        let mut items = Vec::with_capacity(select.items.len());
        for item in select.items {
            let item = match item {
                SelectItem::All { .. } => {
                    let elements = self
                        .scopes
                        .get_scope(scope)
                        .map(|s| s.groups.iter().flat_map(GroupEntry::expand).collect())
                        .unwrap_or_default();
                    SelectItem::All { elements }
                }
                SelectItem::AllInGroup { group, .. } => {
                    let qualifier = sql_resolver_catalog::strip_vdb_prefix(
                        self.catalog().vdb_name(),
                        &group,
                    );
                    let Some(s) = self.scopes.get_scope(scope) else {
                        return Err(SemanticError::UnknownGroupContext(format!("{}.*", group)));
                    };
                    let elements = match s.find_groups(qualifier).as_slice() {
                        [] => {
                            return Err(SemanticError::UnknownGroupContext(format!(
                                "{}.*",
                                group
                            )));
                        }
                        [index] => s.groups[*index].expand(),
                        _ => return Err(SemanticError::AmbiguousAllInGroup(group)),
                    };
                    SelectItem::AllInGroup { group, elements }
                }
                SelectItem::Expression { expr, alias } => {
                    let mut expr =
                        self.resolve_expression(expr, ExprContext::new(Some(scope), Clause::Select))?;
                    if !cx.set_branch && (expr.data_type().is_none() || expr.is_null_constant()) {
                        assign_type(&mut expr, self.default_type());
                    }
                    SelectItem::Expression { expr, alias }
                }
            };
            items.push(item);
        }
        Ok(Select {
            distinct: select.distinct,
            items,
        })
    }

    fn resolve_order_by(
        &mut self,
        items: Vec<OrderByItem>,
        query: &Query,
        scope: usize,
        cx: CommandContext,
    ) -> SemanticResult<Vec<OrderByItem>> {
        let outputs = select_outputs(&query.select);
        let mut resolved = Vec::with_capacity(items.len());

        for item in items {
            let expr = item.expr.into_explicit();

            if let Some(n) = order_position(&expr) {
                let position = check_position(n, outputs.len())?;
                resolved.push(OrderByItem {
                    expr: Expression::Constant(Constant::new(Value::Integer(n))),
                    descending: item.descending,
                    position: Some(position),
                });
                continue;
            }

            if let Expression::Element(element) = &expr {
                if let Some((expr, position)) = match_output_name(element, &outputs)? {
                    resolved.push(OrderByItem {
                        expr,
                        descending: item.descending,
                        position: Some(position),
                    });
                    continue;
                }
            }

            let text = expr.to_string();
            let expr = self.resolve_expression(expr, ExprContext::new(Some(scope), Clause::OrderBy))?;
            let position = outputs.iter().position(|(_, out)| out.same_binding(&expr));
            if position.is_none() {
                // a set query branch can only sort by what it exposes
                if query.select.distinct || cx.set_branch {
                    return Err(SemanticError::UnrelatedOrderBy(text));
                }
                if query.is_grouped() && !is_grouped_expression(&expr, &query.group_by) {
                    return Err(SemanticError::UnrelatedOrderBy(text));
                }
            }
            resolved.push(OrderByItem {
                expr,
                descending: item.descending,
                position,
            });
        }
        Ok(resolved)
    }

    pub(crate) fn resolve_limit(
        &mut self,
        limit: Limit,
        scope: Option<usize>,
    ) -> SemanticResult<Limit> {
        let cx = ExprContext::new(scope, Clause::Limit);
        let offset = match limit.offset {
            Some(offset) => {
                let offset = self.resolve_expression(offset, cx)?;
                Some(self.coerce_or_error(offset, DataType::Integer, true)?)
            }
            None => None,
        };
        let row_limit = self.resolve_expression(limit.row_limit, cx)?;
        let row_limit = self.coerce_or_error(row_limit, DataType::Integer, true)?;
        Ok(Limit { offset, row_limit })
    }

    /// Bind the INTO target, creating a temp group if nothing by that name
    /// exists
    /// Bind the INTO target of a resolved query
    ///
    /// An existing group is filled like `INSERT INTO g SELECT ..`: the
    /// projection is converted to the group's column types. Otherwise a temp
    /// table is created from the projection.
    fn resolve_into(&mut self, group: GroupSymbol, query: Query) -> SemanticResult<Query> {
        let outputs = select_outputs(&query.select);
        let name = group.non_alias_name().to_string();

        let existing = match self.lookup_group(&name, false) {
            Ok(bound) => Some(bound),
            Err(SemanticError::Catalog(sql_resolver_catalog::CatalogError::GroupNotFound(_))) => {
                None
            }
            Err(e) => return Err(e),
        };
        if let Some(bound) = existing {
            let targets: Vec<(String, DataType)> = bound
                .columns
                .iter()
                .map(|c| (format!("{}.{}", bound.full_name, c.name), c.data_type))
                .collect();
            let sources: Vec<(String, Option<DataType>)> = outputs
                .iter()
                .map(|(_, e)| (e.to_string(), e.data_type()))
                .collect();
            let types = self.insert_query_types(&sources, &targets)?;
            let mut query = self.retype_query(query, &types)?;
            let mut group = group;
            group.metadata_id = Some(bound.metadata_id);
            query.into = Some(group);
            return Ok(query);
        }

        let columns: Vec<(&str, DataType)> = outputs
            .iter()
            .map(|(n, e)| (n.as_str(), e.data_type().unwrap_or(self.default_type())))
            .collect();
        let id = self.temps.create_group(&name, TempGroupKind::Table, &columns)?;
        self.temps.make_visible(id);
        debug!(name = %name, columns = columns.len(), "created SELECT INTO target");

        let mut group = group;
        group.metadata_id = Some(MetadataId::TempGroup(id));
        Ok(Query {
            into: Some(group),
            ..query
        })
    }

    fn resolve_set_query(
        &mut self,
        set: SetQuery,
        parent: Option<usize>,
        cx: CommandContext,
    ) -> SemanticResult<SetQuery> {
        let left = self.resolve_command(*set.left, parent, CommandContext::branch())?;
        let right = self.resolve_command(*set.right, parent, CommandContext::branch())?;

        let left_columns = left.projected_columns();
        let right_columns = right.projected_columns();
        if left_columns.len() != right_columns.len() {
            return Err(SemanticError::SetQueryArity(set.op.keyword().to_string()));
        }

        let lattice = self.lattice();
        let types: Vec<Option<DataType>> = left_columns
            .iter()
            .zip(&right_columns)
            .map(|(l, r)| {
                let present: Vec<DataType> = l.data_type.into_iter().chain(r.data_type).collect();
                if present.is_empty() && cx.set_branch {
                    None
                } else {
                    lattice.common_type(&present)
                }
            })
            .collect();
        debug!(op = set.op.keyword(), columns = types.len(), "reconciled set query");

        let left = self.apply_projection_types(left, &types)?;
        let right = self.apply_projection_types(right, &types)?;
        let names: Vec<(String, Option<DataType>)> = left
            .projected_columns()
            .into_iter()
            .map(|c| (c.name, c.data_type))
            .collect();

        let order_by = set
            .order_by
            .into_iter()
            .map(|item| resolve_set_order_by_item(item, &names))
            .collect::<SemanticResult<Vec<_>>>()?;
        let limit = set
            .limit
            .map(|l| self.resolve_limit(l, None))
            .transpose()?;

        Ok(SetQuery {
            op: set.op,
            all: set.all,
            left: Box::new(left),
            right: Box::new(right),
            order_by,
            limit,
        })
    }

    /// Convert a command's projected columns to `types`
    ///
    /// A `None` entry leaves the column as is. `*` items are expanded when
    /// one of their columns needs a conversion.
    pub(crate) fn apply_projection_types(
        &self,
        command: Command,
        types: &[Option<DataType>],
    ) -> SemanticResult<Command> {
        match command {
            Command::Query(query) => Ok(Command::Query(self.retype_query(query, types)?)),
            Command::SetQuery(mut set) => {
                let current: Vec<Option<DataType>> = set
                    .left
                    .projected_columns()
                    .iter()
                    .map(|c| c.data_type)
                    .collect();
                check_nested_order_by(&set.order_by, &current, types)?;
                set.left = Box::new(self.apply_projection_types(*set.left, types)?);
                set.right = Box::new(self.apply_projection_types(*set.right, types)?);
                Ok(Command::SetQuery(set))
            }
            Command::StoredProcedure(sp) => {
                for (element, target) in sp.projected.iter().zip(types) {
                    if let (Some(from), Some(to)) = (element.data_type, *target) {
                        if from != to && !self.lattice().can_implicitly_convert(from, to) {
                            return Err(SemanticError::NotConvertible {
                                expected: to,
                                expression: element.name.clone(),
                                actual: from,
                            });
                        }
                    }
                }
                Ok(Command::StoredProcedure(sp))
            }
            other => Ok(other),
        }
    }

    /// Convert a query's projection to `types`
    fn retype_query(&self, mut query: Query, types: &[Option<DataType>]) -> SemanticResult<Query> {
        let current: Vec<Option<DataType>> = select_outputs(&query.select)
            .iter()
            .map(|(_, e)| e.data_type())
            .collect();
        check_nested_order_by(&query.order_by, &current, types)?;
        query.select.items = self.retype_select_items(query.select.items, types)?;
        Ok(query)
    }

    fn retype_select_items(
        &self,
        items: Vec<SelectItem>,
        types: &[Option<DataType>],
    ) -> SemanticResult<Vec<SelectItem>> {
        let target_at = |i: usize| types.get(i).copied().flatten();
        let mut column = 0;
        let mut retyped = Vec::with_capacity(items.len());

        for item in items {
            match item {
                SelectItem::Expression { expr, alias } => {
                    let expr = match target_at(column) {
                        Some(t) => self.coerce_or_error(expr, t, false)?,
                        None => expr,
                    };
                    column += 1;
                    retyped.push(SelectItem::Expression { expr, alias });
                }
                SelectItem::All { ref elements } | SelectItem::AllInGroup { ref elements, .. } => {
                    let needs_conversion = elements.iter().enumerate().any(|(i, e)| {
                        matches!((e.data_type, target_at(column + i)), (Some(a), Some(b)) if a != b)
                    });
                    if !needs_conversion {
                        column += elements.len();
                        retyped.push(item);
                        continue;
                    }
                    let elements = match item {
                        SelectItem::All { elements } | SelectItem::AllInGroup { elements, .. } => {
                            elements
                        }
                        SelectItem::Expression { .. } => Vec::new(),
                    };
                    for element in elements {
                        let expr = Expression::Element(element);
                        let expr = match target_at(column) {
                            Some(t) => self.coerce_or_error(expr, t, false)?,
                            None => expr,
                        };
                        column += 1;
                        retyped.push(SelectItem::Expression { expr, alias: None });
                    }
                }
            }
        }
        Ok(retyped)
    }
}

/// Match an unqualified ORDER BY name against SELECT output names
fn match_output_name(
    element: &ElementSymbol,
    outputs: &[(String, Expression)],
) -> SemanticResult<Option<(Expression, usize)>> {
    if element.qualifier().is_some() {
        return Ok(None);
    }
    let hits: Vec<usize> = outputs
        .iter()
        .enumerate()
        .filter(|(_, (name, _))| name.eq_ignore_ascii_case(&element.name))
        .map(|(i, _)| i)
        .collect();
    let Some(&first) = hits.first() else {
        return Ok(None);
    };
    let source = &outputs[first].1;
    if hits[1..]
        .iter()
        .any(|&i| !outputs[i].1.same_binding(source))
    {
        return Err(SemanticError::AmbiguousOrderBy(element.name.clone()));
    }

    let bound = match source.without_implicit() {
        Expression::Element(e) => ElementSymbol {
            name: element.name.clone(),
            data_type: source.data_type(),
            ..e.clone()
        },
        other => ElementSymbol {
            name: element.name.clone(),
            group: None,
            metadata_id: None,
            data_type: other.data_type().or(source.data_type()),
            external: false,
        },
    };
    Ok(Some((Expression::Element(bound), first)))
}

/// Whether every element outside aggregates in `expr` is grouped on
fn is_grouped_expression(expr: &Expression, group_by: &[Expression]) -> bool {
    if group_by.iter().any(|g| g.same_binding(expr)) {
        return true;
    }
    let mut elements = Vec::new();
    expr.collect_ungrouped_elements(&mut elements);
    elements.iter().all(|e| {
        let e = Expression::Element((*e).clone());
        group_by.iter().any(|g| g.same_binding(&e))
    })
}

fn check_nested_order_by(
    order_by: &[OrderByItem],
    current: &[Option<DataType>],
    targets: &[Option<DataType>],
) -> SemanticResult<()> {
    for item in order_by {
        let Some(position) = item.position else {
            continue;
        };
        let from = current.get(position).copied().flatten();
        let to = targets.get(position).copied().flatten();
        if let (Some(from), Some(to)) = (from, to) {
            if from != to {
                return Err(SemanticError::NestedOrderByConversion {
                    expression: item.expr.to_string(),
                    from,
                    to,
                });
            }
        }
    }
    Ok(())
}

/// Set query ORDER BY accepts only positions and output names
fn resolve_set_order_by_item(
    item: OrderByItem,
    columns: &[(String, Option<DataType>)],
) -> SemanticResult<OrderByItem> {
    let expr = item.expr.into_explicit();
    if let Some(n) = order_position(&expr) {
        let position = check_position(n, columns.len())?;
        return Ok(OrderByItem {
            expr: Expression::Constant(Constant::new(Value::Integer(n))),
            descending: item.descending,
            position: Some(position),
        });
    }

    let Expression::Element(element) = expr else {
        return Err(SemanticError::InvalidSetQueryOrderBy(expr.to_string()));
    };
    if element.qualifier().is_some() {
        return Err(SemanticError::InvalidSetQueryOrderBy(element.name));
    }
    let hits: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, (name, _))| name.eq_ignore_ascii_case(&element.name))
        .map(|(i, _)| i)
        .collect();
    match hits.as_slice() {
        [] => Err(SemanticError::InvalidSetQueryOrderBy(element.name)),
        [position] => Ok(OrderByItem {
            expr: Expression::Element(ElementSymbol {
                data_type: columns[*position].1,
                ..element
            }),
            descending: item.descending,
            position: Some(*position),
        }),
        _ => Err(SemanticError::AmbiguousOrderBy(element.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_outputs_names_unaliased_expressions_by_position() {
        let select = Select {
            distinct: false,
            items: vec![
                SelectItem::expr(Expression::element("pm1.g1.e1")),
                SelectItem::expr(Expression::constant(Value::Integer(1))),
                SelectItem::aliased(Expression::constant(Value::Null), "n"),
            ],
        };
        let names: Vec<String> = select_outputs(&select).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["e1", "expr2", "n"]);
    }

    #[test]
    fn test_check_position_range() {
        assert_eq!(check_position(2, 2).unwrap(), 1);
        assert_eq!(
            check_position(0, 2).unwrap_err(),
            SemanticError::OrderByPositionOutOfRange { position: 0, count: 2 }
        );
        assert!(check_position(3, 2).is_err());
    }

    #[test]
    fn test_set_order_by_rejects_expressions() {
        let columns = vec![("e1".to_string(), Some(DataType::String))];
        let item = OrderByItem::new(Expression::function(
            "concat",
            vec![Expression::element("e1"), Expression::element("e1")],
        ));
        assert!(matches!(
            resolve_set_order_by_item(item, &columns),
            Err(SemanticError::InvalidSetQueryOrderBy(_))
        ));

        let item = OrderByItem::new(Expression::element("E1"));
        let resolved = resolve_set_order_by_item(item, &columns).unwrap();
        assert_eq!(resolved.position, Some(0));
        assert_eq!(resolved.expr.data_type(), Some(DataType::String));
    }
}
