// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Query Representation
//!
//! This module represents SELECT queries and set operations.
//!
//! ## Query Structure
//!
//! A [`Query`] consists of:
//!
//! - **WITH**: named subqueries visible to the rest of the query
//! - **SELECT**: projected items, `*` and `g.*` expanded by resolution
//! - **INTO**: optional target group (usually a `#temp` table)
//! - **FROM**: groups, joins and inline views
//! - **WHERE / GROUP BY / HAVING / ORDER BY / LIMIT**
//!
//! A [`SetQuery`] combines two commands with UNION, INTERSECT or EXCEPT.
//! Branches are [`Command`]s so set operations nest freely.
//!
//! ## Builders
//!
//! ```
//! use sql_resolver_ir::{Expression, FromClause, GroupSymbol, Query, SelectItem};
//!
//! let query = Query::select(vec![SelectItem::expr(Expression::element("e1"))])
//!     .with_from(vec![FromClause::group(GroupSymbol::new("pm1.g1"))]);
//! assert_eq!(query.to_string(), "SELECT e1 FROM pm1.g1");
//! ```

use serde::{Deserialize, Serialize};

use crate::command::{Command, Subquery};
use crate::criteria::Criteria;
use crate::expr::{ElementSymbol, Expression, GroupSymbol};

/// A projected item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectItem {
    /// `*`, expanded to every selectable column of every FROM group
    All { elements: Vec<ElementSymbol> },
    /// `g.*`
    AllInGroup {
        group: String,
        elements: Vec<ElementSymbol>,
    },
    /// `expr [AS alias]`
    Expression {
        expr: Expression,
        alias: Option<String>,
    },
}

impl SelectItem {
    pub fn all() -> Self {
        SelectItem::All {
            elements: Vec::new(),
        }
    }

    pub fn all_in_group(group: impl Into<String>) -> Self {
        SelectItem::AllInGroup {
            group: group.into(),
            elements: Vec::new(),
        }
    }

    pub fn expr(expr: Expression) -> Self {
        SelectItem::Expression { expr, alias: None }
    }

    pub fn aliased(expr: Expression, alias: impl Into<String>) -> Self {
        SelectItem::Expression {
            expr,
            alias: Some(alias.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Select {
    pub distinct: bool,
    pub items: Vec<SelectItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
}

impl JoinType {
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::LeftOuter => "LEFT OUTER JOIN",
            JoinType::RightOuter => "RIGHT OUTER JOIN",
            JoinType::FullOuter => "FULL OUTER JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }
}

/// An item of the FROM clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FromClause {
    Group(GroupSymbol),
    Join {
        left: Box<FromClause>,
        join_type: JoinType,
        right: Box<FromClause>,
        criteria: Option<Criteria>,
    },
    /// Inline view `(cmd) AS alias`, or `TABLE(cmd) AS alias` when lateral
    Subquery {
        subquery: Subquery,
        alias: String,
        lateral: bool,
    },
}

impl FromClause {
    pub fn group(group: GroupSymbol) -> Self {
        FromClause::Group(group)
    }

    pub fn join(
        left: FromClause,
        join_type: JoinType,
        right: FromClause,
        criteria: Option<Criteria>,
    ) -> Self {
        FromClause::Join {
            left: Box::new(left),
            join_type,
            right: Box::new(right),
            criteria,
        }
    }

    pub fn inline_view(command: Command, alias: impl Into<String>) -> Self {
        FromClause::Subquery {
            subquery: Subquery::new(command),
            alias: alias.into(),
            lateral: false,
        }
    }

    pub fn lateral(command: Command, alias: impl Into<String>) -> Self {
        FromClause::Subquery {
            subquery: Subquery::new(command),
            alias: alias.into(),
            lateral: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByItem {
    pub expr: Expression,
    pub descending: bool,
    /// Zero-based select position the item refers to, if any
    pub position: Option<usize>,
}

impl OrderByItem {
    pub fn new(expr: Expression) -> Self {
        Self {
            expr,
            descending: false,
            position: None,
        }
    }

    pub fn desc(mut self) -> Self {
        self.descending = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limit {
    pub offset: Option<Expression>,
    pub row_limit: Expression,
}

/// `name [(columns)] AS (command)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithItem {
    pub name: String,
    pub columns: Vec<String>,
    pub command: Box<Command>,
}

impl WithItem {
    pub fn new(name: impl Into<String>, command: Command) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            command: Box::new(command),
        }
    }

    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }
}

/// A single SELECT
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    pub with: Vec<WithItem>,
    pub select: Select,
    pub into: Option<GroupSymbol>,
    pub from: Vec<FromClause>,
    pub criteria: Option<Criteria>,
    pub group_by: Vec<Expression>,
    pub having: Option<Criteria>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<Limit>,
}

impl Query {
    /// Create a query projecting `items`
    pub fn select(items: Vec<SelectItem>) -> Self {
        Self {
            select: Select {
                distinct: false,
                items,
            },
            ..Self::default()
        }
    }

    pub fn with_distinct(mut self) -> Self {
        self.select.distinct = true;
        self
    }

    pub fn with_from(mut self, from: Vec<FromClause>) -> Self {
        self.from = from;
        self
    }

    pub fn with_where(mut self, criteria: Criteria) -> Self {
        self.criteria = Some(criteria);
        self
    }

    pub fn with_group_by(mut self, group_by: Vec<Expression>) -> Self {
        self.group_by = group_by;
        self
    }

    pub fn with_having(mut self, having: Criteria) -> Self {
        self.having = Some(having);
        self
    }

    pub fn with_order_by(mut self, order_by: Vec<OrderByItem>) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_limit(mut self, offset: Option<Expression>, row_limit: Expression) -> Self {
        self.limit = Some(Limit { offset, row_limit });
        self
    }

    pub fn with_into(mut self, group: GroupSymbol) -> Self {
        self.into = Some(group);
        self
    }

    pub fn with_with(mut self, items: Vec<WithItem>) -> Self {
        self.with = items;
        self
    }

    /// Whether grouping semantics apply to the select list
    pub fn is_grouped(&self) -> bool {
        !self.group_by.is_empty()
            || self.having.is_some()
            || self.select.items.iter().any(|item| match item {
                SelectItem::Expression { expr, .. } => expr.contains_aggregate(),
                _ => false,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetOperator {
    Union,
    Intersect,
    Except,
}

impl SetOperator {
    pub fn keyword(&self) -> &'static str {
        match self {
            SetOperator::Union => "UNION",
            SetOperator::Intersect => "INTERSECT",
            SetOperator::Except => "EXCEPT",
        }
    }
}

/// `left op [ALL] right [ORDER BY ..] [LIMIT ..]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetQuery {
    pub op: SetOperator,
    pub all: bool,
    pub left: Box<Command>,
    pub right: Box<Command>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<Limit>,
}

impl SetQuery {
    pub fn new(op: SetOperator, all: bool, left: Command, right: Command) -> Self {
        Self {
            op,
            all,
            left: Box::new(left),
            right: Box::new(right),
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn union_all(left: Command, right: Command) -> Self {
        Self::new(SetOperator::Union, true, left, right)
    }

    pub fn with_order_by(mut self, order_by: Vec<OrderByItem>) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_limit(mut self, offset: Option<Expression>, row_limit: Expression) -> Self {
        self.limit = Some(Limit { offset, row_limit });
        self
    }
}
