// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Correlated references
//!
//! Each subquery being resolved pushes a frame remembering how many scopes
//! existed when it started. Scope ids only grow, so any scope with a smaller
//! id belongs to an enclosing command: an element bound there is external
//! to the subquery and is recorded in its frame, and in every enclosing
//! frame the scope is also outside of.

use sql_resolver_ir::{ElementSymbol, Subquery};
use tracing::trace;

use crate::command::CommandContext;
use crate::error::{SemanticError, SemanticResult};
use crate::resolver::Session;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CorrelationFrame {
    /// Scopes with an id below this are outside the command
    first_scope_id: usize,
    references: Vec<ElementSymbol>,
}

fn same_reference(a: &ElementSymbol, b: &ElementSymbol) -> bool {
    a.metadata_id == b.metadata_id
        && a.group.as_ref().map(|g| g.name.to_ascii_lowercase())
            == b.group.as_ref().map(|g| g.name.to_ascii_lowercase())
}

impl Session<'_> {
    pub(crate) fn push_frame(&mut self) -> SemanticResult<()> {
        let limit = self.config().max_nesting_depth;
        // the root frame does not count as nesting
        if self.frames.len() > limit {
            return Err(SemanticError::NestingTooDeep { limit });
        }
        self.frames.push(CorrelationFrame {
            first_scope_id: self.scopes.scope_count(),
            references: Vec::new(),
        });
        Ok(())
    }

    pub(crate) fn pop_frame(&mut self) -> Vec<ElementSymbol> {
        self.frames
            .pop()
            .map(|f| f.references)
            .unwrap_or_default()
    }

    /// Mark `element`, just bound in `scope_id`, as external where it is
    pub(crate) fn record_binding(&mut self, scope_id: usize, element: &mut ElementSymbol) {
        element.external = self
            .frames
            .last()
            .is_some_and(|f| scope_id < f.first_scope_id);
        if !element.external {
            return;
        }
        for frame in self.frames.iter_mut() {
            if scope_id < frame.first_scope_id
                && !frame
                    .references
                    .iter()
                    .any(|r| same_reference(r, element))
            {
                frame.references.push(element.clone());
            }
        }
    }

    /// Resolve a nested command whose enclosing scopes start at `parent`
    pub(crate) fn resolve_subquery(
        &mut self,
        subquery: Subquery,
        parent: Option<usize>,
        cx: CommandContext,
    ) -> SemanticResult<Subquery> {
        self.push_frame()?;
        let result = self.resolve_command(*subquery.command, parent, cx);
        let correlated_references = self.pop_frame();
        let command = result?;

        trace!(
            kind = command.kind_name(),
            correlated = correlated_references.len(),
            "resolved subquery"
        );
        Ok(Subquery {
            command: Box::new(command),
            correlated_references,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sql_resolver_ir::{DataType, GroupSymbol, MetadataId};

    fn element(name: &str, group: &str) -> ElementSymbol {
        ElementSymbol {
            name: name.to_string(),
            group: Some(GroupSymbol::new(group)),
            metadata_id: Some(MetadataId::Column {
                group: group.to_string(),
                column: name.to_string(),
            }),
            data_type: Some(DataType::Integer),
            external: false,
        }
    }

    #[test]
    fn test_same_reference_ignores_written_name() {
        let mut a = element("e2", "pm1.g1");
        let b = element("e2", "pm1.g1");
        a.name = "pm1.g1.e2".to_string();
        assert!(same_reference(&a, &b));
        assert!(!same_reference(&a, &element("e2", "pm1.g2")));
    }
}
