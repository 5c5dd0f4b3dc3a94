// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Shared helpers for the resolver integration tests

#![allow(dead_code)]

use std::sync::Arc;

use sql_resolver_ir::Command;
use sql_resolver_semantic::{
    QueryResolver, ResolveOptions, ResolvedCommand, SemanticError,
};
use sql_resolver_test_utils::{example1, example3, init_tracing};

/// Resolver over the `example1` schema
pub fn resolver() -> QueryResolver {
    init_tracing();
    QueryResolver::new(Arc::new(example1()))
}

/// Resolver over the `example3` schema
pub fn resolver3() -> QueryResolver {
    init_tracing();
    QueryResolver::new(Arc::new(example3()))
}

#[track_caller]
pub fn resolve_ok(command: impl Into<Command>) -> ResolvedCommand {
    let command = command.into();
    let text = command.to_string();
    match resolver().resolve(command) {
        Ok(resolved) => resolved,
        Err(e) => panic!("failed to resolve {}: {}", text, e),
    }
}

#[track_caller]
pub fn resolve_with_ok(command: impl Into<Command>, options: &ResolveOptions) -> ResolvedCommand {
    let command = command.into();
    let text = command.to_string();
    match resolver().resolve_with(command, options) {
        Ok(resolved) => resolved,
        Err(e) => panic!("failed to resolve {}: {}", text, e),
    }
}

#[track_caller]
pub fn resolve_err(command: impl Into<Command>) -> SemanticError {
    let command = command.into();
    let text = command.to_string();
    match resolver().resolve(command) {
        Ok(resolved) => panic!("expected {} to fail, resolved to {}", text, resolved),
        Err(e) => e,
    }
}
