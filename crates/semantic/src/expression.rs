// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Expression and criteria resolution
//!
//! Resolution is bottom-up: children are bound and typed first, then the
//! parent reconciles their types. Reconciliation inserts implicit
//! conversions (`Function { implicit: true, .. }`) that print as their
//! argument, so resolved SQL reads as it was written.
//!
//! Before resolving, any implicit conversion from an earlier resolution is
//! stripped and literal types are reset, which makes resolving an already
//! resolved tree produce the same tree.
//!
//! ## Literal rules
//!
//! Two exceptions to the type lattice apply to literals only:
//!
//! - a string literal whose text parses as the target type converts to it
//!   (`e2 = '5'`), controlled by `implicit_literal_parsing`
//! - an exact integral literal that fits a narrower integral target is
//!   retyped instead of widening the other side (`shortcol = 5`), controlled
//!   by `narrow_exact_literals`

use sql_resolver_catalog::strip_vdb_prefix;
use sql_resolver_ir::{
    CaseExpression, Constant, Criteria, DataType, ElementSymbol, Expression, Function, Reference,
    SearchedCase, Subquery, Value,
};

use crate::command::CommandContext;
use crate::error::{SemanticError, SemanticResult};
use crate::resolver::Session;
use crate::scope::ElementLookup;

/// Clause an expression appears in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Clause {
    Select,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    Values,
    Set,
    Procedure,
}

impl Clause {
    pub fn keyword(self) -> &'static str {
        match self {
            Clause::Select => "SELECT",
            Clause::From => "FROM",
            Clause::Where => "WHERE",
            Clause::GroupBy => "GROUP BY",
            Clause::Having => "HAVING",
            Clause::OrderBy => "ORDER BY",
            Clause::Limit => "LIMIT",
            Clause::Values => "VALUES",
            Clause::Set => "SET",
            Clause::Procedure => "procedure",
        }
    }

    pub fn allows_aggregates(self) -> bool {
        matches!(self, Clause::Select | Clause::Having | Clause::OrderBy)
    }
}

/// Where an expression is being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExprContext {
    pub scope: Option<usize>,
    pub clause: Clause,
}

impl ExprContext {
    pub fn new(scope: Option<usize>, clause: Clause) -> Self {
        Self { scope, clause }
    }
}

/// Give an untyped NULL, `?` or CASE the type `target`
pub(crate) fn assign_type(expr: &mut Expression, target: DataType) {
    match expr {
        Expression::Constant(c) if c.value.is_null() => c.data_type = Some(target),
        Expression::Reference(r) => r.data_type = Some(target),
        Expression::Case(c) if c.data_type.is_none() => c.data_type = Some(target),
        Expression::SearchedCase(c) if c.data_type.is_none() => c.data_type = Some(target),
        _ => {}
    }
}

/// Type of an expression, treating typed NULL literals as untyped
fn effective_type(expr: &Expression) -> Option<DataType> {
    if expr.is_null_constant() {
        return None;
    }
    match expr.data_type() {
        Some(DataType::Null) => None,
        other => other,
    }
}

fn is_literal(expr: &Expression) -> bool {
    matches!(expr, Expression::Constant(c) if !c.value.is_null())
}

fn contains_reference(expr: &Expression) -> bool {
    matches!(expr.without_implicit(), Expression::Reference(_))
}

impl Session<'_> {
    /// Resolve an expression, returning it bound and typed
    pub(crate) fn resolve_expression(
        &mut self,
        expr: Expression,
        cx: ExprContext,
    ) -> SemanticResult<Expression> {
        match expr.into_explicit() {
            Expression::Element(element) => {
                Ok(Expression::Element(self.resolve_element(element, cx.scope)?))
            }
            Expression::Constant(c) => {
                let multi_valued = c.multi_valued;
                let mut constant = Constant::new(c.value);
                constant.multi_valued = multi_valued;
                Ok(Expression::Constant(constant))
            }
            Expression::Reference(r) => self.resolve_reference(r, cx),
            Expression::Function(f) => self.resolve_function(f, cx),
            Expression::Aggregate(a) => self.resolve_aggregate(a, cx),
            Expression::Case(c) => self.resolve_case(c, cx),
            Expression::SearchedCase(c) => self.resolve_searched_case(c, cx),
            Expression::ScalarSubquery(s) => {
                let subquery = self.resolve_single_column_subquery(s, cx)?;
                Ok(Expression::ScalarSubquery(subquery))
            }
        }
    }

    /// Bind an element in `scope` or an enclosing scope
    pub(crate) fn resolve_element(
        &mut self,
        element: ElementSymbol,
        scope: Option<usize>,
    ) -> SemanticResult<ElementSymbol> {
        let qualifier = element
            .qualifier()
            .map(|q| strip_vdb_prefix(self.catalog().vdb_name(), q).to_string());

        match self
            .scopes
            .lookup_element(scope, qualifier.as_deref(), element.short_name())
        {
            ElementLookup::Found {
                scope_id,
                group,
                column,
            } => {
                let mut bound = self
                    .scopes
                    .group(scope_id, group)
                    .and_then(|g| g.bind_element(&element.name, column))
                    .ok_or_else(|| SemanticError::ElementNotFound(element.name.clone()))?;
                self.record_binding(scope_id, &mut bound);
                Ok(bound)
            }
            ElementLookup::Ambiguous(groups) => Err(SemanticError::AmbiguousElement {
                name: element.name,
                groups,
            }),
            ElementLookup::NotFound { qualifier_matched } => {
                if qualifier.is_some() && !qualifier_matched {
                    Err(SemanticError::UnknownGroupContext(element.name))
                } else {
                    Err(SemanticError::ElementNotFound(element.name))
                }
            }
        }
    }

    /// A `?` takes the type of its bound element, if the caller gave one
    fn resolve_reference(&mut self, reference: Reference, cx: ExprContext) -> SemanticResult<Expression> {
        let data_type = match self.bindings.get(reference.index) {
            Some(name) => self
                .resolve_element(ElementSymbol::new(name.clone()), cx.scope)?
                .data_type,
            None => None,
        };
        Ok(Expression::Reference(Reference {
            index: reference.index,
            data_type,
        }))
    }

    pub(crate) fn resolve_single_column_subquery(
        &mut self,
        subquery: Subquery,
        cx: ExprContext,
    ) -> SemanticResult<Subquery> {
        let subquery = self.resolve_subquery(subquery, cx.scope, CommandContext::default())?;
        if subquery.command.projected_columns().len() != 1 {
            return Err(SemanticError::SubqueryColumnCount(
                subquery.command.to_string(),
            ));
        }
        Ok(subquery)
    }

    /// Retype an exact integral literal, or wrap a parsable string literal
    ///
    /// Returns the expression unchanged in `Err` when neither rule applies.
    fn coerce_literal(
        &self,
        expr: Expression,
        target: DataType,
        narrowing: bool,
    ) -> Result<Expression, Expression> {
        let config = self.config();
        match expr {
            Expression::Constant(c)
                if narrowing
                    && config.narrow_exact_literals
                    && target.is_integral()
                    && c.data_type.is_some_and(|t| t.is_integral())
                    && c.value.fits_integral(target) =>
            {
                Ok(Expression::Constant(Constant {
                    data_type: Some(target),
                    ..c
                }))
            }
            Expression::Constant(c)
                if config.implicit_literal_parsing
                    && c.data_type == Some(DataType::String)
                    && !target.is_string_like()
                    && matches!(&c.value, Value::String(s) if Value::parse_as(s, target).is_ok()) =>
            {
                Ok(Expression::Function(Function::implicit_convert(
                    Expression::Constant(c),
                    target,
                )))
            }
            other => Err(other),
        }
    }

    /// Make `expr` produce `target`, inserting an implicit conversion if
    /// one exists
    ///
    /// Untyped expressions take the target type. Returns the expression
    /// unchanged in `Err` when no conversion applies.
    pub(crate) fn coerce(
        &self,
        expr: Expression,
        target: DataType,
        narrowing: bool,
    ) -> Result<Expression, Expression> {
        let mut expr = expr;
        let Some(from) = effective_type(&expr) else {
            assign_type(&mut expr, target);
            return Ok(expr);
        };
        if from == target {
            return Ok(expr);
        }
        match self.coerce_literal(expr, target, narrowing) {
            Ok(converted) => Ok(converted),
            Err(expr) if self.lattice().can_implicitly_convert(from, target) => Ok(
                Expression::Function(Function::implicit_convert(expr, target)),
            ),
            Err(expr) => Err(expr),
        }
    }

    /// [`Session::coerce`], failing with `NotConvertible`
    pub(crate) fn coerce_or_error(
        &self,
        expr: Expression,
        target: DataType,
        narrowing: bool,
    ) -> SemanticResult<Expression> {
        self.coerce(expr, target, narrowing).map_err(|expr| {
            SemanticError::NotConvertible {
                expected: target,
                expression: expr.to_string(),
                actual: expr.data_type().unwrap_or(DataType::Null),
            }
        })
    }

    /// Reconcile the two sides of a comparison
    ///
    /// `render` prints the criteria for error messages.
    fn reconcile<F>(
        &self,
        left: Expression,
        right: Expression,
        render: F,
    ) -> SemanticResult<(Expression, Expression)>
    where
        F: Fn(&Expression, &Expression) -> String,
    {
        let (mut left, mut right) = (left, right);
        match (effective_type(&left), effective_type(&right)) {
            (None, None) => {
                if contains_reference(&left) || contains_reference(&right) {
                    return Err(SemanticError::UndeterminedReferenceType(render(&left, &right)));
                }
                let t = self.default_type();
                assign_type(&mut left, t);
                assign_type(&mut right, t);
                Ok((left, right))
            }
            (Some(t), None) => {
                assign_type(&mut right, t);
                Ok((left, right))
            }
            (None, Some(t)) => {
                assign_type(&mut left, t);
                Ok((left, right))
            }
            (Some(l), Some(r)) if l == r => Ok((left, right)),
            (Some(l), Some(r)) => {
                let lattice = self.lattice();
                if is_literal(&right) {
                    match self.coerce_literal(right, l, true) {
                        Ok(right) => return Ok((left, right)),
                        Err(unchanged) => right = unchanged,
                    }
                }
                if is_literal(&left) {
                    match self.coerce_literal(left, r, true) {
                        Ok(left) => return Ok((left, right)),
                        Err(unchanged) => left = unchanged,
                    }
                }
                if lattice.can_implicitly_convert(r, l) {
                    Ok((left, Expression::Function(Function::implicit_convert(right, l))))
                } else if lattice.can_implicitly_convert(l, r) {
                    Ok((Expression::Function(Function::implicit_convert(left, r)), right))
                } else {
                    Err(SemanticError::TypeMismatch {
                        left: l,
                        right: r,
                        criteria: render(&left, &right),
                    })
                }
            }
        }
    }

    /// Convert the left side of an IN or quantified subquery comparison to
    /// the subquery's column type
    fn match_subquery_type(
        &self,
        expr: Expression,
        subquery: &Subquery,
        render: impl Fn(&Expression) -> String,
    ) -> SemanticResult<Expression> {
        let column_type = subquery
            .command
            .projected_columns()
            .first()
            .and_then(|c| c.data_type);
        let Some(target) = column_type else {
            return Ok(expr);
        };
        match effective_type(&expr) {
            Some(from) => self.coerce(expr, target, true).map_err(|expr| {
                SemanticError::TypeMismatch {
                    left: from,
                    right: target,
                    criteria: render(&expr),
                }
            }),
            None => {
                let mut expr = expr;
                assign_type(&mut expr, target);
                Ok(expr)
            }
        }
    }

    /// Convert a LIKE operand to string
    fn coerce_to_string(&self, expr: Expression) -> SemanticResult<Expression> {
        match effective_type(&expr) {
            Some(t) if t.is_string_like() => Ok(expr),
            _ => self.coerce_or_error(expr, DataType::String, false),
        }
    }

    /// Resolve a predicate
    pub(crate) fn resolve_criteria(
        &mut self,
        criteria: Criteria,
        cx: ExprContext,
    ) -> SemanticResult<Criteria> {
        match criteria {
            Criteria::Compare { left, op, right } => {
                let left = self.resolve_expression(left, cx)?;
                let right = self.resolve_expression(right, cx)?;
                let (left, right) = self.reconcile(left, right, |l, r| {
                    Criteria::compare(l.clone(), op, r.clone()).to_string()
                })?;
                Ok(Criteria::Compare { left, op, right })
            }
            Criteria::Compound { op, criteria } => {
                let criteria = criteria
                    .into_iter()
                    .map(|c| self.resolve_criteria(c, cx))
                    .collect::<SemanticResult<Vec<_>>>()?;
                Ok(Criteria::Compound { op, criteria })
            }
            Criteria::Not(inner) => Ok(Criteria::Not(Box::new(
                self.resolve_criteria(*inner, cx)?,
            ))),
            Criteria::IsNull { expr, negated } => {
                let mut expr = self.resolve_expression(expr, cx)?;
                if effective_type(&expr).is_none() {
                    if contains_reference(&expr) {
                        let text = Criteria::IsNull { expr, negated }.to_string();
                        return Err(SemanticError::UndeterminedReferenceType(text));
                    }
                    assign_type(&mut expr, self.default_type());
                }
                Ok(Criteria::IsNull { expr, negated })
            }
            Criteria::Between {
                expr,
                lower,
                upper,
                negated,
            } => {
                let expr = self.resolve_expression(expr, cx)?;
                let lower = self.resolve_expression(lower, cx)?;
                let upper = self.resolve_expression(upper, cx)?;
                let text = |e: &Expression, l: &Expression, u: &Expression| {
                    Criteria::Between {
                        expr: e.clone(),
                        lower: l.clone(),
                        upper: u.clone(),
                        negated,
                    }
                    .to_string()
                };
                let (expr, lower) = self.reconcile(expr, lower, |e, l| text(e, l, &upper))?;
                let (expr, upper) = self.reconcile(expr, upper, |e, u| text(e, &lower, u))?;
                Ok(Criteria::Between {
                    expr,
                    lower,
                    upper,
                    negated,
                })
            }
            Criteria::Like {
                expr,
                pattern,
                escape,
                negated,
            } => {
                let expr = self.resolve_expression(expr, cx)?;
                let pattern = self.resolve_expression(pattern, cx)?;
                Ok(Criteria::Like {
                    expr: self.coerce_to_string(expr)?,
                    pattern: self.coerce_to_string(pattern)?,
                    escape,
                    negated,
                })
            }
            Criteria::InList {
                expr,
                values,
                negated,
            } => self.resolve_in_list(expr, values, negated, cx),
            Criteria::InSubquery {
                expr,
                subquery,
                negated,
            } => {
                let expr = self.resolve_expression(expr, cx)?;
                let subquery = self.resolve_single_column_subquery(subquery, cx)?;
                let expr = self.match_subquery_type(expr, &subquery, |e| {
                    Criteria::InSubquery {
                        expr: e.clone(),
                        subquery: subquery.clone(),
                        negated,
                    }
                    .to_string()
                })?;
                Ok(Criteria::InSubquery {
                    expr,
                    subquery,
                    negated,
                })
            }
            Criteria::QuantifiedCompare {
                left,
                op,
                quantifier,
                subquery,
            } => {
                let left = self.resolve_expression(left, cx)?;
                let subquery = self.resolve_single_column_subquery(subquery, cx)?;
                let left = self.match_subquery_type(left, &subquery, |l| {
                    Criteria::QuantifiedCompare {
                        left: l.clone(),
                        op,
                        quantifier,
                        subquery: subquery.clone(),
                    }
                    .to_string()
                })?;
                Ok(Criteria::QuantifiedCompare {
                    left,
                    op,
                    quantifier,
                    subquery,
                })
            }
            Criteria::Exists { subquery, negated } => {
                let subquery =
                    self.resolve_subquery(subquery, cx.scope, CommandContext::default())?;
                Ok(Criteria::Exists { subquery, negated })
            }
        }
    }

    /// `expr IN (v1, v2, ...)`: literals adapt to the tested expression,
    /// then everything converts to the common type
    fn resolve_in_list(
        &mut self,
        expr: Expression,
        values: Vec<Expression>,
        negated: bool,
        cx: ExprContext,
    ) -> SemanticResult<Criteria> {
        let expr = self.resolve_expression(expr, cx)?;
        let mut resolved = Vec::with_capacity(values.len());
        for value in values {
            let value = self.resolve_expression(value, cx)?;
            let value = match effective_type(&expr) {
                Some(t) if is_literal(&value) => {
                    self.coerce_literal(value, t, true).unwrap_or_else(|v| v)
                }
                _ => value,
            };
            resolved.push(value);
        }
        let render = |e: &Expression, v: &[Expression]| {
            Criteria::InList {
                expr: e.clone(),
                values: v.to_vec(),
                negated,
            }
            .to_string()
        };

        let types: Vec<DataType> = std::iter::once(&expr)
            .chain(resolved.iter())
            .filter_map(effective_type)
            .collect();
        if types.is_empty()
            && (contains_reference(&expr) || resolved.iter().any(contains_reference))
        {
            return Err(SemanticError::UndeterminedReferenceType(render(
                &expr, &resolved,
            )));
        }
        let target = self
            .lattice()
            .common_type(&types)
            .ok_or_else(|| SemanticError::NoCommonType(render(&expr, &resolved)))?;

        let expr_type = effective_type(&expr);
        let expr = match self.coerce(expr, target, false) {
            Ok(expr) => expr,
            Err(expr) => {
                return Err(SemanticError::TypeMismatch {
                    left: expr_type.unwrap_or(DataType::Null),
                    right: target,
                    criteria: render(&expr, &resolved),
                });
            }
        };
        let mut values = Vec::with_capacity(resolved.len());
        for value in resolved {
            let value_type = effective_type(&value);
            match self.coerce(value, target, false) {
                Ok(value) => values.push(value),
                Err(value) => {
                    return Err(SemanticError::TypeMismatch {
                        left: target,
                        right: value_type.unwrap_or(DataType::Null),
                        criteria: value.to_string(),
                    });
                }
            }
        }
        Ok(Criteria::InList {
            expr,
            values,
            negated,
        })
    }

    fn resolve_case(&mut self, case: CaseExpression, cx: ExprContext) -> SemanticResult<Expression> {
        let text = case.to_string();
        let mut operand = self.resolve_expression(*case.operand, cx)?;
        let mut whens = Vec::with_capacity(case.whens.len());
        let mut thens = Vec::with_capacity(case.whens.len());
        for (when, then) in case.whens {
            let when = self.resolve_expression(when, cx)?;
            let (o, w) = self.reconcile(operand, when, |o, w| format!("{} = {}", o, w))?;
            operand = o;
            whens.push(w);
            thens.push(self.resolve_expression(then, cx)?);
        }
        let else_expr = case
            .else_expr
            .map(|e| self.resolve_expression(*e, cx))
            .transpose()?;

        let (thens, else_expr, data_type) = self.unify_results(thens, else_expr, &text)?;
        Ok(Expression::Case(CaseExpression {
            operand: Box::new(operand),
            whens: whens.into_iter().zip(thens).collect(),
            else_expr: else_expr.map(Box::new),
            data_type: Some(data_type),
        }))
    }

    fn resolve_searched_case(
        &mut self,
        case: SearchedCase,
        cx: ExprContext,
    ) -> SemanticResult<Expression> {
        let text = case.to_string();
        let mut whens = Vec::with_capacity(case.whens.len());
        let mut thens = Vec::with_capacity(case.whens.len());
        for (when, then) in case.whens {
            whens.push(self.resolve_criteria(when, cx)?);
            thens.push(self.resolve_expression(then, cx)?);
        }
        let else_expr = case
            .else_expr
            .map(|e| self.resolve_expression(*e, cx))
            .transpose()?;

        let (thens, else_expr, data_type) = self.unify_results(thens, else_expr, &text)?;
        Ok(Expression::SearchedCase(SearchedCase {
            whens: whens.into_iter().zip(thens).collect(),
            else_expr: else_expr.map(Box::new),
            data_type: Some(data_type),
        }))
    }

    /// Convert CASE results to their common type
    fn unify_results(
        &self,
        thens: Vec<Expression>,
        else_expr: Option<Expression>,
        text: &str,
    ) -> SemanticResult<(Vec<Expression>, Option<Expression>, DataType)> {
        let types: Vec<DataType> = thens
            .iter()
            .chain(else_expr.iter())
            .filter_map(effective_type)
            .collect();
        let target = self
            .lattice()
            .common_type(&types)
            .ok_or_else(|| SemanticError::NoCommonType(text.to_string()))?;
        let convert = |e: Expression| {
            self.coerce(e, target, false)
                .map_err(|_| SemanticError::NoCommonType(text.to_string()))
        };
        let thens = thens
            .into_iter()
            .map(convert)
            .collect::<SemanticResult<Vec<_>>>()?;
        let else_expr = else_expr.map(convert).transpose()?;
        Ok((thens, else_expr, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_type_only_touches_untyped_nodes() {
        let mut null = Expression::constant(Value::Null);
        assign_type(&mut null, DataType::Integer);
        assert_eq!(null.data_type(), Some(DataType::Integer));

        let mut literal = Expression::constant(Value::Integer(1));
        assign_type(&mut literal, DataType::String);
        assert_eq!(literal.data_type(), Some(DataType::Integer));
    }

    #[test]
    fn test_effective_type_ignores_typed_nulls() {
        let null = Expression::Constant(Constant::typed(Value::Null, DataType::String));
        assert_eq!(effective_type(&null), None);
    }

    #[test]
    fn test_aggregates_allowed_clauses() {
        assert!(Clause::Having.allows_aggregates());
        assert!(!Clause::Where.allows_aggregates());
        assert_eq!(Clause::GroupBy.keyword(), "GROUP BY");
    }
}
