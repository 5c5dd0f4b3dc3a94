// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Criteria
//!
//! Boolean predicates used by WHERE, HAVING, join ON clauses, searched CASE
//! and procedural IF/WHILE statements.

use serde::{Deserialize, Serialize};

use crate::command::Subquery;
use crate::expr::Expression;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// Quantifier of a subquery comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantifier {
    Any,
    Some,
    All,
}

impl Quantifier {
    pub fn keyword(&self) -> &'static str {
        match self {
            Quantifier::Any => "ANY",
            Quantifier::Some => "SOME",
            Quantifier::All => "ALL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

/// Predicate tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Criteria {
    Compare {
        left: Expression,
        op: CompareOp,
        right: Expression,
    },
    Compound {
        op: LogicalOp,
        criteria: Vec<Criteria>,
    },
    Not(Box<Criteria>),
    IsNull {
        expr: Expression,
        negated: bool,
    },
    Between {
        expr: Expression,
        lower: Expression,
        upper: Expression,
        negated: bool,
    },
    Like {
        expr: Expression,
        pattern: Expression,
        escape: Option<char>,
        negated: bool,
    },
    /// `expr IN (v1, v2, ..)`
    InList {
        expr: Expression,
        values: Vec<Expression>,
        negated: bool,
    },
    /// `expr IN (SELECT ..)`
    InSubquery {
        expr: Expression,
        subquery: Subquery,
        negated: bool,
    },
    /// `expr op ANY|SOME|ALL (SELECT ..)`
    QuantifiedCompare {
        left: Expression,
        op: CompareOp,
        quantifier: Quantifier,
        subquery: Subquery,
    },
    Exists {
        subquery: Subquery,
        negated: bool,
    },
}

impl Criteria {
    pub fn compare(left: Expression, op: CompareOp, right: Expression) -> Self {
        Criteria::Compare { left, op, right }
    }

    pub fn and(criteria: Vec<Criteria>) -> Self {
        Criteria::Compound {
            op: LogicalOp::And,
            criteria,
        }
    }

    pub fn or(criteria: Vec<Criteria>) -> Self {
        Criteria::Compound {
            op: LogicalOp::Or,
            criteria,
        }
    }

    pub fn in_list(expr: Expression, values: Vec<Expression>) -> Self {
        Criteria::InList {
            expr,
            values,
            negated: false,
        }
    }

    pub fn in_subquery(expr: Expression, subquery: Subquery) -> Self {
        Criteria::InSubquery {
            expr,
            subquery,
            negated: false,
        }
    }

    pub fn exists(subquery: Subquery) -> Self {
        Criteria::Exists {
            subquery,
            negated: false,
        }
    }

    /// Scalar operands, not descending into subqueries
    pub fn operands(&self) -> Vec<&Expression> {
        match self {
            Criteria::Compare { left, right, .. } => vec![left, right],
            Criteria::Compound { criteria, .. } => {
                criteria.iter().flat_map(Criteria::operands).collect()
            }
            Criteria::Not(inner) => inner.operands(),
            Criteria::IsNull { expr, .. } => vec![expr],
            Criteria::Between {
                expr, lower, upper, ..
            } => vec![expr, lower, upper],
            Criteria::Like { expr, pattern, .. } => vec![expr, pattern],
            Criteria::InList { expr, values, .. } => {
                std::iter::once(expr).chain(values.iter()).collect()
            }
            Criteria::InSubquery { expr, .. } => vec![expr],
            Criteria::QuantifiedCompare { left, .. } => vec![left],
            Criteria::Exists { .. } => Vec::new(),
        }
    }

    pub fn contains_aggregate(&self) -> bool {
        self.operands().into_iter().any(Expression::contains_aggregate)
    }

    pub fn collect_ungrouped_elements<'a>(&'a self, out: &mut Vec<&'a crate::ElementSymbol>) {
        for operand in self.operands() {
            operand.collect_ungrouped_elements(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Aggregate, AggregateKind};
    use crate::value::Value;

    #[test]
    fn test_operands_flatten_compound() {
        let crit = Criteria::and(vec![
            Criteria::compare(
                Expression::element("e1"),
                CompareOp::Eq,
                Expression::constant(Value::Integer(1)),
            ),
            Criteria::in_list(
                Expression::element("e2"),
                vec![Expression::constant(Value::Integer(1))],
            ),
        ]);
        assert_eq!(crit.operands().len(), 4);
        assert!(!crit.contains_aggregate());
    }

    #[test]
    fn test_contains_aggregate_in_having_shape() {
        let crit = Criteria::compare(
            Expression::Aggregate(Aggregate::count_star()),
            CompareOp::Gt,
            Expression::constant(Value::Integer(1)),
        );
        assert!(crit.contains_aggregate());
        let sum = Aggregate::new(AggregateKind::Sum, Expression::element("e2"));
        let mut out = Vec::new();
        let agg_expr = Expression::Aggregate(sum);
        agg_expr.collect_ungrouped_elements(&mut out);
        assert!(out.is_empty());
    }
}
