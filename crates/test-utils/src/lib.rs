// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for the SQL resolver
//!
//! This crate provides common testing components including:
//! - Sample schemas (`example1`, `example3`)
//! - A mock catalog builder
//! - Shorthand builders for unresolved command trees
//! - Resolver-specific assertions

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod mock_catalog;

// Re-exports for convenience
pub use assertions::{
    assert_fully_resolved, assert_projected_names, assert_projected_types, assert_sql_eq,
    collect_elements,
};
pub use fixtures::{example1, example3};
pub use mock_catalog::MockCatalogBuilder;

/// Install a test subscriber honoring `RUST_LOG`
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
