// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Procedure resolution
//!
//! A procedure body resolves in a `Procedure` scope holding the `VARIABLES`
//! group. Each block that declares variables gets its own `VARIABLES` temp
//! group, and the scope entry lists the columns of every enclosing block's
//! group in declaration order. A variable is therefore visible from its
//! declaration to the end of its block, while the temp groups themselves
//! only ever grow, so every `TempColumn` bound to a variable stays valid.
//! Temp tables created in a block are hidden again when the block ends.
//!
//! Update procedures also see:
//!
//! - `VARIABLES.ROWS_UPDATED`, an integer
//! - `INPUT`, the new values of the target group's columns
//! - `CHANGING`, a boolean per target column
//!
//! `INPUT` and `CHANGING` are read-only.

use sql_resolver_ir::{
    AssignmentValue, Block, Command, CreateProcedure, DataType, ElementSymbol, GroupSymbol,
    MetadataId, ProcedureKind, Statement, TempGroupId,
};
use tracing::debug;

use crate::command::CommandContext;
use crate::error::{SemanticError, SemanticResult};
use crate::expression::{Clause, ExprContext};
use crate::resolver::Session;
use crate::scope::ScopeType;
use crate::symbol::GroupEntry;
use crate::temp::TempGroupKind;

pub const VARIABLES: &str = "VARIABLES";
pub const ROWS_UPDATED: &str = "ROWS_UPDATED";
pub const INPUT: &str = "INPUT";
pub const CHANGING: &str = "CHANGING";

/// Procedure-wide state threaded through statements
struct ProcedureState {
    /// Procedure-level group, holding `ROWS_UPDATED`
    variables: TempGroupId,
    /// Variable group of each open block, created on its first DECLARE
    frames: Vec<Option<TempGroupId>>,
    /// Scope holding the `VARIABLES` entry
    scope: usize,
    loop_depth: usize,
}

impl ProcedureState {
    /// Variable groups in scope, outermost first
    fn groups(&self) -> Vec<TempGroupId> {
        let mut groups = vec![self.variables];
        groups.extend(
            self.frames
                .iter()
                .flatten()
                .filter(|id| **id != self.variables),
        );
        groups
    }
}

/// Variable name without a `VARIABLES.` qualifier
fn variable_name(name: &str) -> &str {
    match name.split_once('.') {
        Some((qualifier, rest)) if qualifier.eq_ignore_ascii_case(VARIABLES) => rest,
        _ => name,
    }
}

fn is_variables_group(element: &ElementSymbol) -> bool {
    element
        .group
        .as_ref()
        .is_some_and(|g| g.name.eq_ignore_ascii_case(VARIABLES))
}

impl Session<'_> {
    pub(crate) fn resolve_procedure(
        &mut self,
        procedure: CreateProcedure,
        parent: Option<usize>,
    ) -> SemanticResult<CreateProcedure> {
        let variables = self
            .temps
            .create_group(VARIABLES, TempGroupKind::Variables, &[])?;
        let scope = self.scopes.create_scope(ScopeType::Procedure, parent);

        if procedure.kind == ProcedureKind::Update {
            self.temps
                .add_column(variables, ROWS_UPDATED, DataType::Integer)?;
            self.add_update_groups(scope)?;
        }
        let mut state = ProcedureState {
            variables,
            frames: Vec::new(),
            scope,
            loop_depth: 0,
        };
        self.sync_variables(&state);

        let block = self.resolve_block_in(procedure.block, scope, &mut state, Some(variables))?;
        debug!(kind = ?procedure.kind, "resolved procedure");
        Ok(CreateProcedure {
            kind: procedure.kind,
            block,
        })
    }

    /// Add `INPUT` and `CHANGING` for the update target
    fn add_update_groups(&mut self, scope: usize) -> SemanticResult<()> {
        let Some(target) = self.update_target else {
            return Ok(());
        };
        let bound = self.lookup_group(target, false)?;

        let input: Vec<(&str, DataType)> = bound
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.data_type))
            .collect();
        let changing: Vec<(&str, DataType)> = bound
            .columns
            .iter()
            .map(|c| (c.name.as_str(), DataType::Boolean))
            .collect();

        for (name, columns) in [(INPUT, input), (CHANGING, changing)] {
            let id = self
                .temps
                .create_group(name, TempGroupKind::External, &columns)?;
            let mut symbol = GroupSymbol::new(name);
            symbol.metadata_id = Some(MetadataId::TempGroup(id));
            let columns = self
                .temps
                .get(id)
                .map(|g| g.column_entries())
                .unwrap_or_default()
                .into_iter()
                .map(|c| c.with_updatable(false))
                .collect();
            self.scopes
                .add_group(scope, GroupEntry::new(symbol, name).with_columns(columns))?;
        }
        Ok(())
    }

    /// Rebuild the `VARIABLES` entry from the temp store
    fn sync_variables(&mut self, state: &ProcedureState) {
        let mut symbol = GroupSymbol::new(VARIABLES);
        symbol.metadata_id = Some(MetadataId::TempGroup(state.variables));
        let columns = state
            .groups()
            .into_iter()
            .filter_map(|id| self.temps.get(id))
            .flat_map(|g| g.column_entries())
            .collect();
        let entry = GroupEntry::new(symbol, VARIABLES).with_columns(columns);

        if let Some(scope) = self.scopes.get_scope_mut(state.scope) {
            match scope
                .groups
                .iter_mut()
                .find(|g| g.name().eq_ignore_ascii_case(VARIABLES))
            {
                Some(existing) => *existing = entry,
                None => scope.groups.push(entry),
            }
        }
    }

    fn resolve_block(
        &mut self,
        block: Block,
        scope: usize,
        state: &mut ProcedureState,
    ) -> SemanticResult<Block> {
        self.resolve_block_in(block, scope, state, None)
    }

    /// Resolve a block whose declarations go to `frame`, or to a group
    /// created on the first DECLARE
    fn resolve_block_in(
        &mut self,
        block: Block,
        scope: usize,
        state: &mut ProcedureState,
        frame: Option<TempGroupId>,
    ) -> SemanticResult<Block> {
        let saved = self.temps.save_visible();
        state.frames.push(frame);

        let mut statements = Vec::with_capacity(block.statements.len());
        for statement in block.statements {
            statements.push(self.resolve_statement(statement, scope, state)?);
        }

        state.frames.pop();
        self.temps.restore_visible(saved);
        self.sync_variables(state);
        Ok(Block { statements })
    }

    /// Whether a variable of this name is in scope
    fn variable_in_scope(&self, state: &ProcedureState, name: &str) -> bool {
        state
            .groups()
            .into_iter()
            .filter_map(|id| self.temps.get(id))
            .any(|g| g.get_column(name).is_some())
    }

    /// Variable group of the innermost block, creating it if needed
    fn declaring_group(&mut self, state: &mut ProcedureState) -> SemanticResult<TempGroupId> {
        if let Some(Some(id)) = state.frames.last() {
            return Ok(*id);
        }
        let id = self
            .temps
            .create_group(VARIABLES, TempGroupKind::Variables, &[])?;
        if let Some(frame) = state.frames.last_mut() {
            *frame = Some(id);
        }
        Ok(id)
    }

    fn resolve_statement(
        &mut self,
        statement: Statement,
        scope: usize,
        state: &mut ProcedureState,
    ) -> SemanticResult<Statement> {
        let cx = ExprContext::new(Some(scope), Clause::Procedure);
        match statement {
            Statement::Declare {
                variable,
                data_type,
                value,
            } => {
                let name = variable_name(&variable.name).to_string();
                if self.variable_in_scope(state, &name) {
                    return Err(SemanticError::DuplicateVariable(variable.name));
                }
                let value = value
                    .map(|v| self.resolve_assignment_value(v, data_type, &variable.name, scope))
                    .transpose()?;

                let owner = self.declaring_group(state)?;
                let index = self.temps.add_column(owner, &name, data_type)?;
                self.sync_variables(state);
                let mut group = GroupSymbol::new(VARIABLES);
                group.metadata_id = Some(MetadataId::TempGroup(state.variables));
                let variable = ElementSymbol {
                    name: variable.name,
                    group: Some(group),
                    metadata_id: Some(MetadataId::TempColumn(owner, index)),
                    data_type: Some(data_type),
                    external: false,
                };
                Ok(Statement::Declare {
                    variable,
                    data_type,
                    value,
                })
            }
            Statement::Assignment { variable, value } => {
                let variable = self.resolve_element(variable, Some(scope))?;
                if !is_variables_group(&variable) {
                    return Err(SemanticError::ReadOnlyElement(variable.name));
                }
                let data_type = variable.data_type.unwrap_or(self.default_type());
                if variable.short_name().eq_ignore_ascii_case(ROWS_UPDATED)
                    && matches!(&value, AssignmentValue::Command(c) if c.is_query_like())
                {
                    return Err(SemanticError::ScalarAssignment(variable.name));
                }
                let value =
                    self.resolve_assignment_value(value, data_type, &variable.name, scope)?;
                Ok(Statement::Assignment { variable, value })
            }
            Statement::Command(command) => Ok(Statement::Command(Box::new(
                self.resolve_command(*command, Some(scope), CommandContext::default())?,
            ))),
            Statement::If {
                condition,
                then_block,
                else_block,
            } => {
                let condition = self.resolve_criteria(condition, cx)?;
                let then_block = self.resolve_block(then_block, scope, state)?;
                let else_block = else_block
                    .map(|b| self.resolve_block(b, scope, state))
                    .transpose()?;
                Ok(Statement::If {
                    condition,
                    then_block,
                    else_block,
                })
            }
            Statement::While { condition, block } => {
                let condition = self.resolve_criteria(condition, cx)?;
                state.loop_depth += 1;
                let block = self.resolve_block(block, scope, state);
                state.loop_depth -= 1;
                Ok(Statement::While {
                    condition,
                    block: block?,
                })
            }
            Statement::Loop {
                query,
                cursor,
                block,
            } => {
                let query = self.resolve_command(*query, Some(scope), CommandContext::default())?;
                let loop_scope = self.cursor_scope(&cursor, &query, scope)?;
                state.loop_depth += 1;
                let block = self.resolve_block(block, loop_scope, state);
                state.loop_depth -= 1;
                Ok(Statement::Loop {
                    query: Box::new(query),
                    cursor,
                    block: block?,
                })
            }
            Statement::Block(block) => Ok(Statement::Block(self.resolve_block(block, scope, state)?)),
            Statement::Raise(expr) => Ok(Statement::Raise(self.resolve_expression(expr, cx)?)),
            Statement::Break if state.loop_depth == 0 => {
                Err(SemanticError::StatementOutsideLoop("BREAK".to_string()))
            }
            Statement::Continue if state.loop_depth == 0 => {
                Err(SemanticError::StatementOutsideLoop("CONTINUE".to_string()))
            }
            Statement::Break => Ok(Statement::Break),
            Statement::Continue => Ok(Statement::Continue),
        }
    }

    /// Block scope exposing a loop cursor's columns
    fn cursor_scope(&mut self, cursor: &str, query: &Command, scope: usize) -> SemanticResult<usize> {
        let default = self.default_type();
        let projected = query.projected_columns();
        let columns: Vec<(&str, DataType)> = projected
            .iter()
            .map(|c| (c.name.as_str(), c.data_type.unwrap_or(default)))
            .collect();
        let id = self
            .temps
            .create_group(cursor, TempGroupKind::Cursor, &columns)?;
        let mut symbol = GroupSymbol::new(cursor);
        symbol.metadata_id = Some(MetadataId::TempGroup(id));
        let entry = GroupEntry::new(symbol, cursor).with_columns(
            self.temps
                .get(id)
                .map(|g| g.column_entries())
                .unwrap_or_default(),
        );
        self.scopes
            .create_scope_with(ScopeType::Block, Some(scope), vec![entry])
    }

    fn resolve_assignment_value(
        &mut self,
        value: AssignmentValue,
        data_type: DataType,
        variable: &str,
        scope: usize,
    ) -> SemanticResult<AssignmentValue> {
        match value {
            AssignmentValue::Expression(expr) => {
                let expr =
                    self.resolve_expression(expr, ExprContext::new(Some(scope), Clause::Procedure))?;
                Ok(AssignmentValue::Expression(self.coerce_or_error(
                    expr, data_type, true,
                )?))
            }
            AssignmentValue::Command(command) => {
                let command =
                    self.resolve_command(*command, Some(scope), CommandContext::default())?;
                if command.is_query_like() {
                    let projected = command.projected_columns();
                    let [column] = projected.as_slice() else {
                        return Err(SemanticError::ScalarAssignment(variable.to_string()));
                    };
                    if let Some(from) = column.data_type {
                        if from != data_type && !self.lattice().can_implicitly_convert(from, data_type)
                        {
                            return Err(SemanticError::NotConvertible {
                                expected: data_type,
                                expression: command.to_string(),
                                actual: from,
                            });
                        }
                    }
                }
                Ok(AssignmentValue::Command(Box::new(command)))
            }
        }
    }
}
