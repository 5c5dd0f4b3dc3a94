// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # EXEC argument binding
//!
//! Positional arguments bind to input parameters in declaration order;
//! named arguments bind by case-insensitive name. An input left unbound
//! takes its declared default, or a typed NULL if it is optional.

use sql_resolver_ir::{
    Constant, ElementSymbol, Expression, GroupSymbol, MetadataId, ParameterDirection,
    ProcedureArguments, ProcedureMetadata, ProcedureParameter, SpParameter, StoredProcedure, Value,
    last_segment,
};
use tracing::debug;

use crate::error::{ParameterBindingError, SemanticResult};
use crate::expression::{Clause, ExprContext};
use crate::resolver::Session;

/// Value an unbound input parameter takes
fn default_value(
    parameter: &ProcedureParameter,
    procedure: &str,
) -> Result<Expression, ParameterBindingError> {
    match &parameter.default_value {
        Some(text) if text.eq_ignore_ascii_case("null") => Ok(Expression::Constant(
            Constant::typed(Value::Null, parameter.data_type),
        )),
        Some(text) => Value::parse_as(text, parameter.data_type)
            .map(|v| Expression::Constant(Constant::typed(v, parameter.data_type)))
            .map_err(|_| ParameterBindingError::InvalidDefault {
                name: parameter.name.clone(),
                procedure: procedure.to_string(),
                default: text.clone(),
                data_type: parameter.data_type,
            }),
        None if parameter.optional => Ok(Expression::Constant(Constant::typed(
            Value::Null,
            parameter.data_type,
        ))),
        None => Err(ParameterBindingError::MissingRequired {
            name: parameter.name.clone(),
            procedure: procedure.to_string(),
        }),
    }
}

/// Elements an EXEC projects: return value, result set, then outputs
fn projected_elements(procedure: &ProcedureMetadata, group: &GroupSymbol) -> Vec<ElementSymbol> {
    let name = &procedure.full_name;
    let element = |column: &str, data_type| ElementSymbol {
        name: format!("{}.{}", name, column),
        group: Some(group.clone()),
        metadata_id: Some(MetadataId::ProcedureColumn {
            procedure: name.clone(),
            column: column.to_string(),
        }),
        data_type: Some(data_type),
        external: false,
    };

    let mut projected: Vec<ElementSymbol> = procedure
        .return_parameter()
        .map(|p| element(&p.name, p.data_type))
        .into_iter()
        .collect();
    projected.extend(
        procedure
            .result_set
            .iter()
            .map(|c| element(&c.name, c.data_type)),
    );
    projected.extend(
        procedure
            .parameters
            .iter()
            .filter(|p| matches!(p.direction, ParameterDirection::InOut | ParameterDirection::Out))
            .map(|p| element(&p.name, p.data_type)),
    );
    projected
}

impl Session<'_> {
    pub(crate) fn resolve_stored_procedure(
        &mut self,
        sp: StoredProcedure,
        parent: Option<usize>,
    ) -> SemanticResult<StoredProcedure> {
        let procedure = self.catalog().get_procedure(&sp.name)?;
        let full_name = procedure.full_name.clone();
        let cx = ExprContext::new(parent, Clause::Procedure);
        let mut bound: Vec<Option<Expression>> = vec![None; procedure.parameters.len()];

        let arguments = match sp.arguments {
            ProcedureArguments::Positional(args) => {
                let inputs: Vec<usize> = procedure
                    .parameters
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.direction.accepts_input())
                    .map(|(i, _)| i)
                    .collect();
                if args.len() > inputs.len() {
                    return Err(ParameterBindingError::ExtraPositional {
                        count: args.len() - inputs.len(),
                        procedure: full_name,
                    }
                    .into());
                }
                let mut resolved = Vec::with_capacity(args.len());
                for (arg, index) in args.into_iter().zip(inputs) {
                    let arg = self.resolve_argument(arg, &procedure.parameters[index], cx)?;
                    bound[index] = Some(arg.clone());
                    resolved.push(arg);
                }
                ProcedureArguments::Positional(resolved)
            }
            ProcedureArguments::Named(args) => {
                let mut resolved = Vec::with_capacity(args.len());
                for (name, arg) in args {
                    let short = last_segment(&name);
                    let index = procedure
                        .parameters
                        .iter()
                        .position(|p| p.name.eq_ignore_ascii_case(short))
                        .ok_or_else(|| ParameterBindingError::UnknownParameter {
                            name: name.clone(),
                            procedure: full_name.clone(),
                        })?;
                    let parameter = &procedure.parameters[index];
                    if !parameter.direction.accepts_input() {
                        return Err(ParameterBindingError::NotAnInput {
                            name,
                            procedure: full_name,
                        }
                        .into());
                    }
                    if bound[index].is_some() {
                        return Err(ParameterBindingError::DuplicateParameter {
                            name,
                            procedure: full_name,
                        }
                        .into());
                    }
                    let arg = self.resolve_argument(arg, parameter, cx)?;
                    bound[index] = Some(arg.clone());
                    resolved.push((name, arg));
                }
                ProcedureArguments::Named(resolved)
            }
        };

        let mut parameters = Vec::with_capacity(procedure.parameters.len());
        for (i, (parameter, value)) in procedure.parameters.iter().zip(bound).enumerate() {
            let (expression, using_default) = match value {
                _ if !parameter.direction.accepts_input() => (None, false),
                Some(value) => (Some(value), false),
                None => (Some(default_value(parameter, &full_name)?), true),
            };
            parameters.push(SpParameter {
                name: parameter.name.clone(),
                direction: parameter.direction,
                data_type: parameter.data_type,
                expression,
                index: i + 1,
                using_default,
            });
        }

        let mut group = GroupSymbol::new(full_name.clone());
        group.metadata_id = Some(MetadataId::Procedure(full_name.clone()));
        let projected = projected_elements(&procedure, &group);
        debug!(
            procedure = %full_name,
            parameters = parameters.len(),
            projected = projected.len(),
            "bound procedure arguments"
        );

        Ok(StoredProcedure {
            name: sp.name,
            arguments,
            group: Some(group),
            parameters,
            projected,
        })
    }

    fn resolve_argument(
        &mut self,
        arg: Expression,
        parameter: &ProcedureParameter,
        cx: ExprContext,
    ) -> SemanticResult<Expression> {
        let arg = self.resolve_expression(arg, cx)?;
        self.coerce_or_error(arg, parameter.data_type, true)
    }
}
