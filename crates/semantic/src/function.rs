// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Function resolution
//!
//! Overloads are chosen by total conversion cost over the arguments:
//!
//! - an untyped argument (NULL, `?`) costs nothing
//! - a typed argument costs its implicit conversion cost to the parameter
//! - a string literal parsable as the parameter type costs
//!   [`LITERAL_PARSE_COST`]
//!
//! The cheapest candidate wins; a tie is ambiguous. `convert`/`cast` and
//! `lookup` have their own rules.

use sql_resolver_ir::{
    Aggregate, AggregateKind, CONVERT, Constant, DataType, Expression, Function, FunctionDescriptor,
    FunctionMetadata, FunctionType, Value,
};
use tracing::trace;

use crate::error::{SemanticError, SemanticResult};
use crate::expression::{ExprContext, assign_type};
use crate::resolver::Session;

/// Cost of converting a string literal by parsing its text
pub const LITERAL_PARSE_COST: u32 = 10;

const LOOKUP: &str = "lookup";

fn string_constant(expr: &Expression) -> Option<&str> {
    match expr {
        Expression::Constant(Constant {
            value: Value::String(s),
            ..
        }) => Some(s),
        _ => None,
    }
}

impl Session<'_> {
    pub(crate) fn resolve_function(
        &mut self,
        function: Function,
        cx: ExprContext,
    ) -> SemanticResult<Expression> {
        if function.is_conversion() {
            return self.resolve_conversion(function, cx);
        }
        if function.name.eq_ignore_ascii_case(LOOKUP) {
            return self.resolve_lookup(function, cx);
        }

        let args = function
            .args
            .into_iter()
            .map(|a| self.resolve_expression(a, cx))
            .collect::<SemanticResult<Vec<_>>>()?;
        let text = || Function::new(function.name.clone(), args.clone()).to_string();

        let candidates = self.function_candidates(&function.name, args.len())?;
        let chosen = self.choose_overload(&candidates, &args, text)?;

        let mut bound = Vec::with_capacity(args.len());
        for (i, arg) in args.into_iter().enumerate() {
            let target = chosen.parameter_type(i).unwrap_or(DataType::Object);
            match self.coerce(arg, target, false) {
                Ok(arg) => bound.push(arg),
                Err(_) => {
                    return Err(SemanticError::UnknownFunctionForm(function.name.clone()));
                }
            }
        }
        Ok(Expression::Function(Function {
            descriptor: Some(chosen.descriptor(bound.len())),
            data_type: Some(chosen.return_type),
            name: function.name,
            args: bound,
            implicit: false,
        }))
    }

    /// Builtin and catalog overloads accepting `arity` arguments
    fn function_candidates(
        &self,
        name: &str,
        arity: usize,
    ) -> SemanticResult<Vec<FunctionMetadata>> {
        let mut candidates: Vec<FunctionMetadata> = self
            .functions()
            .candidates(name, arity)
            .into_iter()
            .cloned()
            .collect();
        candidates.extend(
            self.catalog()
                .find_functions(name)?
                .into_iter()
                .filter(|f| f.accepts_arity(arity)),
        );
        Ok(candidates)
    }

    fn argument_cost(&self, arg: &Expression, target: DataType) -> Option<u32> {
        let from = match arg.data_type() {
            None | Some(DataType::Null) => return Some(0),
            Some(t) if arg.is_null_constant() || t == target => return Some(0),
            Some(t) => t,
        };
        self.lattice()
            .implicit_conversion_cost(from, target)
            .or_else(|| {
                let parsable = self.config().implicit_literal_parsing
                    && from == DataType::String
                    && !target.is_string_like()
                    && string_constant(arg).is_some_and(|s| Value::parse_as(s, target).is_ok());
                parsable.then_some(LITERAL_PARSE_COST)
            })
    }

    fn signature_cost(&self, candidate: &FunctionMetadata, args: &[Expression]) -> Option<u32> {
        args.iter().enumerate().try_fold(0u32, |total, (i, arg)| {
            Some(total + self.argument_cost(arg, candidate.parameter_type(i)?)?)
        })
    }

    fn choose_overload<F>(
        &self,
        candidates: &[FunctionMetadata],
        args: &[Expression],
        text: F,
    ) -> SemanticResult<FunctionMetadata>
    where
        F: Fn() -> String,
    {
        let mut best: Option<(u32, usize)> = None;
        let mut tied = false;
        for (i, candidate) in candidates.iter().enumerate() {
            let Some(cost) = self.signature_cost(candidate, args) else {
                continue;
            };
            trace!(signature = %candidate.signature(), cost, "overload candidate");
            match best {
                Some((b, _)) if cost > b => {}
                Some((b, _)) if cost == b => tied = true,
                _ => {
                    best = Some((cost, i));
                    tied = false;
                }
            }
        }
        match best {
            None => Err(SemanticError::UnknownFunctionForm(text())),
            Some(_) if tied => Err(SemanticError::AmbiguousFunctionForm(text())),
            Some((_, i)) => Ok(candidates[i].clone()),
        }
    }

    /// `convert(x, type)` and `cast(x AS type)`
    fn resolve_conversion(
        &mut self,
        function: Function,
        cx: ExprContext,
    ) -> SemanticResult<Expression> {
        let text = function.to_string();
        let target = match function.args.get(1) {
            Some(arg) if function.args.len() == 2 => match arg {
                Expression::Element(e) => DataType::from_name(&e.name),
                other => string_constant(other).and_then(DataType::from_name),
            },
            _ => None,
        }
        .ok_or(SemanticError::UnknownFunctionForm(text))?;

        let mut args = function.args.into_iter();
        let value = args
            .next()
            .map(|v| self.resolve_expression(v, cx))
            .transpose()?
            .unwrap_or(Expression::Constant(Constant::new(Value::Null)));
        let type_arg = Expression::Constant(Constant::new(Value::String(
            target.name().to_string(),
        )));

        let from = match value.data_type() {
            Some(from) if !value.is_null_constant() => from,
            _ => target,
        };
        if !self.lattice().can_explicitly_convert(from, target) {
            return Err(SemanticError::InvalidConversion {
                expression: value.to_string(),
                from,
                to: target,
            });
        }
        let mut value = value;
        if from == target {
            assign_type(&mut value, target);
        }

        Ok(Expression::Function(Function {
            name: function.name,
            args: vec![value, type_arg],
            descriptor: Some(FunctionDescriptor {
                name: CONVERT.to_string(),
                namespace: None,
                arg_types: vec![from, DataType::String],
                return_type: target,
                function_type: FunctionType::Scalar,
            }),
            data_type: Some(target),
            implicit: false,
        }))
    }

    /// `lookup('group', 'returnColumn', 'keyColumn', key)`
    fn resolve_lookup(&mut self, function: Function, cx: ExprContext) -> SemanticResult<Expression> {
        let text = function.to_string();
        if function.args.len() != 4 {
            return Err(SemanticError::UnknownFunctionForm(text));
        }
        let names: Vec<String> = function.args[..3]
            .iter()
            .map(|a| string_constant(a).map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| SemanticError::InvalidLookup {
                function: text.clone(),
            })?;
        let (group, return_column, key_column) = (&names[0], &names[1], &names[2]);

        let bound = self.lookup_group(group, false)?;
        let column_type = |column: &str| {
            bound
                .columns
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(column))
                .map(|c| c.data_type)
                .ok_or_else(|| SemanticError::ElementNotFound(format!("{}.{}", group, column)))
        };
        let return_type = column_type(return_column)?;
        let key_type = column_type(key_column)?;

        let mut args = function.args.into_iter();
        let mut resolved: Vec<Expression> = args
            .by_ref()
            .take(3)
            .map(|a| self.resolve_expression(a, cx))
            .collect::<SemanticResult<Vec<_>>>()?;
        let key = match args.next() {
            Some(key) => self.resolve_expression(key, cx)?,
            None => return Err(SemanticError::UnknownFunctionForm(text)),
        };
        resolved.push(self.coerce_or_error(key, key_type, false)?);

        Ok(Expression::Function(Function {
            name: function.name,
            args: resolved,
            descriptor: Some(FunctionDescriptor {
                name: LOOKUP.to_string(),
                namespace: None,
                arg_types: vec![DataType::String, DataType::String, DataType::String, key_type],
                return_type,
                function_type: FunctionType::Scalar,
            }),
            data_type: Some(return_type),
            implicit: false,
        }))
    }

    pub(crate) fn resolve_aggregate(
        &mut self,
        aggregate: Aggregate,
        cx: ExprContext,
    ) -> SemanticResult<Expression> {
        if !cx.clause.allows_aggregates() {
            return Err(SemanticError::AggregateNotAllowed {
                expression: aggregate.to_string(),
                clause: cx.clause.keyword().to_string(),
            });
        }
        let text = aggregate.to_string();
        let arg = aggregate
            .arg
            .map(|a| self.resolve_expression(*a, cx))
            .transpose()?;

        let (arg, data_type) = match (aggregate.kind, arg) {
            (AggregateKind::Count, arg) => (arg, DataType::Integer),
            (AggregateKind::Min | AggregateKind::Max, Some(mut arg)) => {
                let t = match arg.data_type() {
                    Some(t) if !arg.is_null_constant() => t,
                    _ => {
                        let t = self.default_type();
                        assign_type(&mut arg, t);
                        t
                    }
                };
                (Some(arg), t)
            }
            (AggregateKind::Sum | AggregateKind::Avg, Some(arg)) => {
                let name = aggregate.kind.name().to_ascii_lowercase();
                let candidates = self.function_candidates(&name, 1)?;
                let args = [arg];
                let chosen = self.choose_overload(&candidates, &args, || text.clone())?;
                let [arg] = args;
                let target = chosen.parameter_type(0).unwrap_or(DataType::Object);
                let arg = self
                    .coerce(arg, target, false)
                    .map_err(|_| SemanticError::UnknownFunctionForm(text.clone()))?;
                (Some(arg), chosen.return_type)
            }
            (_, None) => return Err(SemanticError::UnknownFunctionForm(text)),
        };

        Ok(Expression::Aggregate(Aggregate {
            kind: aggregate.kind,
            distinct: aggregate.distinct,
            arg: arg.map(Box::new),
            data_type: Some(data_type),
        }))
    }
}
