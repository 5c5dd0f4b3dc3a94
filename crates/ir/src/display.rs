// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Canonical printer
//!
//! `Display` implementations producing the canonical SQL string of a
//! command tree:
//!
//! - keywords are uppercase, names are printed as written
//! - name segments that are reserved words or not plain identifiers are
//!   double-quoted (`pm1.sq2."in"`)
//! - resolver-inserted conversions are invisible
//! - infix operators are parenthesized (`(e2 + 1)`)
//! - named procedure arguments always use `=>`, so the legacy `name = expr`
//!   form prints as `name => expr`

use std::fmt::{self, Display, Formatter};

use crate::command::{
    AssignmentValue, Block, Command, Create, CreateProcedure, Delete, DropTable, Insert, InsertSource,
    ProcedureArguments, ProcedureKind, Statement, StoredProcedure, Update,
};
use crate::criteria::{Criteria, LogicalOp};
use crate::expr::{
    Aggregate, CaseExpression, Constant, ElementSymbol, Expression, Function, GroupSymbol,
    SearchedCase,
};
use crate::query::{FromClause, Limit, OrderByItem, Query, SelectItem, SetQuery, WithItem};
use crate::value::Value;

const RESERVED_WORDS: &[&str] = &[
    "all", "and", "any", "as", "asc", "begin", "between", "break", "by", "call", "case", "cast",
    "continue", "convert", "create", "cross", "declare", "delete", "desc", "distinct", "drop",
    "else", "end", "error", "except", "exec", "execute", "exists", "false", "from", "full",
    "group", "having", "if", "in", "inner", "insert", "intersect", "into", "is", "join", "left",
    "like", "limit", "local", "loop", "not", "null", "on", "or", "order", "outer", "procedure",
    "right", "select", "set", "some", "table", "temporary", "then", "true", "union", "update",
    "values", "virtual", "when", "where", "while", "with",
];

/// Whether `word` must be quoted when used as a name
pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(word))
}

fn needs_quotes(segment: &str) -> bool {
    let mut chars = segment.chars();
    let plain = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || matches!(first, '_' | '#' | '@'))
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '#' | '@'))
        }
        None => false,
    };
    !plain || is_reserved_word(segment)
}

/// A possibly qualified name, quoted per segment where needed
#[derive(Debug, Clone, Copy)]
pub struct Identifier<'a>(pub &'a str);

impl Display for Identifier<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.split('.').enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            if needs_quotes(segment) {
                write!(f, "\"{}\"", segment.replace('"', "\"\""))?;
            } else {
                f.write_str(segment)?;
            }
        }
        Ok(())
    }
}

fn write_list<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(true) => f.write_str("TRUE"),
            Value::Boolean(false) => f.write_str("FALSE"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::BigInteger(digits) => f.write_str(digits),
            Value::Double(v) => write!(f, "{:?}", v),
            Value::BigDecimal(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Date(d) => write!(f, "{{d'{}'}}", d.format("%Y-%m-%d")),
            Value::Time(t) => write!(f, "{{t'{}'}}", t.format("%H:%M:%S")),
            Value::Timestamp(ts) => write!(f, "{{ts'{}'}}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

impl Display for GroupSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.definition {
            Some(definition) => write!(f, "{} AS {}", Identifier(definition), Identifier(&self.name)),
            None => write!(f, "{}", Identifier(&self.name)),
        }
    }
}

impl Display for ElementSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Identifier(&self.name))
    }
}

impl Display for Constant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Second argument of `convert`/`cast`, printed as a bare type name
fn type_argument(expr: &Expression) -> Option<&str> {
    match expr {
        Expression::Constant(Constant {
            value: Value::String(name),
            ..
        }) => Some(name),
        _ => None,
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.implicit {
            if let Some(inner) = self.args.first() {
                return write!(f, "{}", inner);
            }
        }
        if self.is_conversion() && self.args.len() == 2 {
            if let Some(target) = type_argument(&self.args[1]) {
                return if self.name.eq_ignore_ascii_case("cast") {
                    write!(f, "{}({} AS {})", self.name, self.args[0], target)
                } else {
                    write!(f, "{}({}, {})", self.name, self.args[0], target)
                };
            }
        }
        if self.is_infix() {
            return write!(f, "({} {} {})", self.args[0], self.name, self.args[1]);
        }
        write!(f, "{}(", self.name)?;
        write_list(f, &self.args)?;
        f.write_str(")")
    }
}

impl Display for Aggregate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind.name())?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        match &self.arg {
            Some(arg) => write!(f, "{})", arg),
            None => f.write_str("*)"),
        }
    }
}

impl Display for CaseExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "CASE {}", self.operand)?;
        for (when, then) in &self.whens {
            write!(f, " WHEN {} THEN {}", when, then)?;
        }
        if let Some(else_expr) = &self.else_expr {
            write!(f, " ELSE {}", else_expr)?;
        }
        f.write_str(" END")
    }
}

impl Display for SearchedCase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("CASE")?;
        for (when, then) in &self.whens {
            write!(f, " WHEN {} THEN {}", when, then)?;
        }
        if let Some(else_expr) = &self.else_expr {
            write!(f, " ELSE {}", else_expr)?;
        }
        f.write_str(" END")
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Element(e) => write!(f, "{}", e),
            Expression::Constant(c) => write!(f, "{}", c),
            Expression::Function(func) => write!(f, "{}", func),
            Expression::Aggregate(a) => write!(f, "{}", a),
            Expression::Case(c) => write!(f, "{}", c),
            Expression::SearchedCase(c) => write!(f, "{}", c),
            Expression::ScalarSubquery(s) => write!(f, "({})", s.command),
            Expression::Reference(_) => f.write_str("?"),
        }
    }
}

fn not_keyword(negated: bool) -> &'static str {
    if negated { "NOT " } else { "" }
}

impl Display for Criteria {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Criteria::Compare { left, op, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            Criteria::Compound { op, criteria } => {
                let keyword = match op {
                    LogicalOp::And => " AND ",
                    LogicalOp::Or => " OR ",
                };
                for (i, crit) in criteria.iter().enumerate() {
                    if i > 0 {
                        f.write_str(keyword)?;
                    }
                    if matches!(crit, Criteria::Compound { .. }) {
                        write!(f, "({})", crit)?;
                    } else {
                        write!(f, "{}", crit)?;
                    }
                }
                Ok(())
            }
            Criteria::Not(inner) => write!(f, "NOT ({})", inner),
            Criteria::IsNull { expr, negated } => {
                write!(f, "{} IS {}NULL", expr, not_keyword(*negated))
            }
            Criteria::Between {
                expr,
                lower,
                upper,
                negated,
            } => write!(
                f,
                "{} {}BETWEEN {} AND {}",
                expr,
                not_keyword(*negated),
                lower,
                upper
            ),
            Criteria::Like {
                expr,
                pattern,
                escape,
                negated,
            } => {
                write!(f, "{} {}LIKE {}", expr, not_keyword(*negated), pattern)?;
                if let Some(escape) = escape {
                    write!(f, " ESCAPE '{}'", escape)?;
                }
                Ok(())
            }
            Criteria::InList {
                expr,
                values,
                negated,
            } => {
                write!(f, "{} {}IN (", expr, not_keyword(*negated))?;
                write_list(f, values)?;
                f.write_str(")")
            }
            Criteria::InSubquery {
                expr,
                subquery,
                negated,
            } => write!(f, "{} {}IN ({})", expr, not_keyword(*negated), subquery.command),
            Criteria::QuantifiedCompare {
                left,
                op,
                quantifier,
                subquery,
            } => write!(
                f,
                "{} {} {} ({})",
                left,
                op.symbol(),
                quantifier.keyword(),
                subquery.command
            ),
            Criteria::Exists { subquery, negated } => {
                write!(f, "{}EXISTS ({})", not_keyword(*negated), subquery.command)
            }
        }
    }
}

impl Display for SelectItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SelectItem::All { .. } => f.write_str("*"),
            SelectItem::AllInGroup { group, .. } => write!(f, "{}.*", Identifier(group)),
            SelectItem::Expression { expr, alias } => {
                write!(f, "{}", expr)?;
                if let Some(alias) = alias {
                    write!(f, " AS {}", Identifier(alias))?;
                }
                Ok(())
            }
        }
    }
}

impl Display for FromClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FromClause::Group(group) => write!(f, "{}", group),
            FromClause::Join {
                left,
                join_type,
                right,
                criteria,
            } => {
                write!(f, "{} {} ", left, join_type.keyword())?;
                if matches!(right.as_ref(), FromClause::Join { .. }) {
                    write!(f, "({})", right)?;
                } else {
                    write!(f, "{}", right)?;
                }
                if let Some(criteria) = criteria {
                    write!(f, " ON {}", criteria)?;
                }
                Ok(())
            }
            FromClause::Subquery {
                subquery,
                alias,
                lateral,
            } => {
                let prefix = if *lateral { "TABLE" } else { "" };
                write!(f, "{}({}) AS {}", prefix, subquery.command, Identifier(alias))
            }
        }
    }
}

impl Display for OrderByItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if self.descending {
            f.write_str(" DESC")?;
        }
        Ok(())
    }
}

impl Display for Limit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.offset {
            Some(offset) => write!(f, "LIMIT {}, {}", offset, self.row_limit),
            None => write!(f, "LIMIT {}", self.row_limit),
        }
    }
}

impl Display for WithItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Identifier(&self.name))?;
        if !self.columns.is_empty() {
            let columns: Vec<Identifier<'_>> =
                self.columns.iter().map(|c| Identifier(c)).collect();
            f.write_str(" (")?;
            write_list(f, &columns)?;
            f.write_str(")")?;
        }
        write!(f, " AS ({})", self.command)
    }
}

fn write_order_and_limit(
    f: &mut Formatter<'_>,
    order_by: &[OrderByItem],
    limit: &Option<Limit>,
) -> fmt::Result {
    if !order_by.is_empty() {
        f.write_str(" ORDER BY ")?;
        write_list(f, order_by)?;
    }
    if let Some(limit) = limit {
        write!(f, " {}", limit)?;
    }
    Ok(())
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.with.is_empty() {
            f.write_str("WITH ")?;
            write_list(f, &self.with)?;
            f.write_str(" ")?;
        }
        f.write_str("SELECT ")?;
        if self.select.distinct {
            f.write_str("DISTINCT ")?;
        }
        write_list(f, &self.select.items)?;
        if let Some(into) = &self.into {
            write!(f, " INTO {}", into)?;
        }
        if !self.from.is_empty() {
            f.write_str(" FROM ")?;
            write_list(f, &self.from)?;
        }
        if let Some(criteria) = &self.criteria {
            write!(f, " WHERE {}", criteria)?;
        }
        if !self.group_by.is_empty() {
            f.write_str(" GROUP BY ")?;
            write_list(f, &self.group_by)?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {}", having)?;
        }
        write_order_and_limit(f, &self.order_by, &self.limit)
    }
}

fn write_branch(f: &mut Formatter<'_>, branch: &Command, right_side: bool) -> fmt::Result {
    let parenthesize = match branch {
        Command::SetQuery(set) => right_side || !set.order_by.is_empty() || set.limit.is_some(),
        Command::Query(query) => !query.order_by.is_empty() || query.limit.is_some(),
        _ => false,
    };
    if parenthesize {
        write!(f, "({})", branch)
    } else {
        write!(f, "{}", branch)
    }
}

impl Display for SetQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_branch(f, &self.left, false)?;
        write!(f, " {}", self.op.keyword())?;
        if self.all {
            f.write_str(" ALL")?;
        }
        f.write_str(" ")?;
        write_branch(f, &self.right, true)?;
        write_order_and_limit(f, &self.order_by, &self.limit)
    }
}

impl Display for Insert {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {}", self.group)?;
        if self.explicit_columns && !self.columns.is_empty() {
            f.write_str(" (")?;
            write_list(f, &self.columns)?;
            f.write_str(")")?;
        }
        match &self.source {
            InsertSource::Values(values) => {
                f.write_str(" VALUES (")?;
                write_list(f, values)?;
                f.write_str(")")
            }
            InsertSource::Query(query) => write!(f, " {}", query),
        }
    }
}

impl Display for Update {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE {} SET ", self.group)?;
        for (i, change) in self.changes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} = {}", change.column, change.value)?;
        }
        if let Some(criteria) = &self.criteria {
            write!(f, " WHERE {}", criteria)?;
        }
        Ok(())
    }
}

impl Display for Delete {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {}", self.group)?;
        if let Some(criteria) = &self.criteria {
            write!(f, " WHERE {}", criteria)?;
        }
        Ok(())
    }
}

impl Display for StoredProcedure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "EXEC {}(", Identifier(&self.name))?;
        match &self.arguments {
            ProcedureArguments::Positional(args) => write_list(f, args)?,
            ProcedureArguments::Named(args) => {
                for (i, (name, expr)) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} => {}", Identifier(name), expr)?;
                }
            }
        }
        f.write_str(")")
    }
}

impl Display for Create {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE LOCAL TEMPORARY TABLE {} (", Identifier(&self.table.name))?;
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", Identifier(&column.name), column.data_type)?;
        }
        if !self.primary_key.is_empty() {
            let keys: Vec<Identifier<'_>> =
                self.primary_key.iter().map(|k| Identifier(k)).collect();
            f.write_str(", PRIMARY KEY(")?;
            write_list(f, &keys)?;
            f.write_str(")")?;
        }
        f.write_str(")")
    }
}

impl Display for DropTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "DROP TABLE {}", Identifier(&self.table.name))
    }
}

impl Display for AssignmentValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentValue::Expression(expr) => write!(f, "{}", expr),
            AssignmentValue::Command(command) => write!(f, "{}", command),
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Declare {
                variable,
                data_type,
                value,
            } => {
                write!(f, "DECLARE {} {}", data_type, variable)?;
                if let Some(value) = value {
                    write!(f, " = {}", value)?;
                }
                f.write_str(";")
            }
            Statement::Assignment { variable, value } => write!(f, "{} = {};", variable, value),
            Statement::Command(command) => write!(f, "{};", command),
            Statement::If {
                condition,
                then_block,
                else_block,
            } => {
                write!(f, "IF({})\n{}", condition, then_block)?;
                if let Some(else_block) = else_block {
                    write!(f, "\nELSE\n{}", else_block)?;
                }
                Ok(())
            }
            Statement::While { condition, block } => write!(f, "WHILE({})\n{}", condition, block),
            Statement::Loop {
                query,
                cursor,
                block,
            } => write!(f, "LOOP ON ({}) AS {}\n{}", query, Identifier(cursor), block),
            Statement::Block(block) => write!(f, "{}", block),
            Statement::Raise(expr) => write!(f, "ERROR {};", expr),
            Statement::Break => f.write_str("BREAK;"),
            Statement::Continue => f.write_str("CONTINUE;"),
        }
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("BEGIN\n")?;
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        f.write_str("END")
    }
}

impl Display for CreateProcedure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            ProcedureKind::Virtual => write!(f, "CREATE VIRTUAL PROCEDURE\n{}", self.block),
            ProcedureKind::Update => write!(f, "CREATE PROCEDURE\n{}", self.block),
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Command::Query(query) => write!(f, "{}", query),
            Command::SetQuery(set) => write!(f, "{}", set),
            Command::Insert(insert) => write!(f, "{}", insert),
            Command::Update(update) => write!(f, "{}", update),
            Command::Delete(delete) => write!(f, "{}", delete),
            Command::StoredProcedure(sp) => write!(f, "{}", sp),
            Command::Create(create) => write!(f, "{}", create),
            Command::Drop(drop) => write!(f, "{}", drop),
            Command::CreateProcedure(procedure) => write!(f, "{}", procedure),
        }
    }
}
