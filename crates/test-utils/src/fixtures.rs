// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Sample schemas for resolver tests
//!
//! `example1` is the workhorse schema:
//!
//! | group    | columns                                              |
//! |----------|------------------------------------------------------|
//! | pm1.g1   | e1 string, e2 integer, e3 boolean, e4 double         |
//! | pm1.g2   | same as pm1.g1                                       |
//! | pm1.g3   | same as pm1.g1                                       |
//! | pm2.g1   | same as pm1.g1                                       |
//! | pm2.g2   | e1 string, e2 integer (read-only), e3 boolean         |
//! | pm3.g1   | e1 date, e2 time, e3 timestamp, e4 bigdecimal        |
//! | pm4.g1   | same as pm1.g1                                       |
//! | pm4.g2   | e1 string, e2 integer, e3 boolean, e4 double, e5 integer, e6 string |
//!
//! plus the procedures listed on [`example1`].

use sql_resolver_catalog::{
    ColumnMetadata, DataType, FunctionMetadata, GroupMetadata, ParameterDirection,
    ProcedureMetadata, ProcedureParameter, StaticCatalog,
};

/// Raw YAML of the `example3` schema
pub const EXAMPLE3_YAML: &str = include_str!("../fixtures/example3.yaml");

fn standard_columns() -> Vec<ColumnMetadata> {
    vec![
        ColumnMetadata::new("e1", DataType::String),
        ColumnMetadata::new("e2", DataType::Integer),
        ColumnMetadata::new("e3", DataType::Boolean),
        ColumnMetadata::new("e4", DataType::Double),
    ]
}

fn standard_group(full_name: &str) -> GroupMetadata {
    GroupMetadata::new(full_name).with_columns(standard_columns())
}

fn result_set() -> Vec<ColumnMetadata> {
    vec![
        ColumnMetadata::new("e1", DataType::String),
        ColumnMetadata::new("e2", DataType::Integer),
    ]
}

/// Groups of `example1`
pub fn example1_groups() -> Vec<GroupMetadata> {
    vec![
        standard_group("pm1.g1"),
        standard_group("pm1.g2"),
        standard_group("pm1.g3"),
        standard_group("pm2.g1"),
        GroupMetadata::new("pm2.g2").with_columns(vec![
            ColumnMetadata::new("e1", DataType::String),
            ColumnMetadata::new("e2", DataType::Integer).with_updatable(false),
            ColumnMetadata::new("e3", DataType::Boolean),
        ]),
        GroupMetadata::new("pm3.g1").with_columns(vec![
            ColumnMetadata::new("e1", DataType::Date),
            ColumnMetadata::new("e2", DataType::Time),
            ColumnMetadata::new("e3", DataType::Timestamp),
            ColumnMetadata::new("e4", DataType::BigDecimal),
        ]),
        standard_group("pm4.g1"),
        GroupMetadata::new("pm4.g2").with_columns(vec![
            ColumnMetadata::new("e1", DataType::String),
            ColumnMetadata::new("e2", DataType::Integer),
            ColumnMetadata::new("e3", DataType::Boolean),
            ColumnMetadata::new("e4", DataType::Double),
            ColumnMetadata::new("e5", DataType::Integer),
            ColumnMetadata::new("e6", DataType::String),
        ]),
    ]
}

/// Procedures of `example1`
///
/// - `pm1.sq1()` returning `e1, e2`
/// - `pm1.sq2(in string)` returning `e1, e2`
/// - `pm1.sq3(in string, in2 integer)` returning `e1, e2`
/// - `pm1.sq3b(in string, in2 integer default 5)` returning `e1, e2`
/// - `pm1.sqOptional(in string, opt integer optional)` returning `e1, e2`
/// - `pm1.sqBadDefault(in integer default 'abc')`
/// - `pm1.sp2(inkey integer, outval OUT string, ret RETURN boolean)` returning `e1`
/// - `pm1.spDup(e1 string)` returning `e1`, whose names clash
pub fn example1_procedures() -> Vec<ProcedureMetadata> {
    vec![
        ProcedureMetadata::new("pm1.sq1").with_result_set(result_set()),
        ProcedureMetadata::new("pm1.sq2")
            .with_parameters(vec![ProcedureParameter::input("in", DataType::String)])
            .with_result_set(result_set()),
        ProcedureMetadata::new("pm1.sq3")
            .with_parameters(vec![
                ProcedureParameter::input("in", DataType::String),
                ProcedureParameter::input("in2", DataType::Integer),
            ])
            .with_result_set(result_set()),
        ProcedureMetadata::new("pm1.sq3b")
            .with_parameters(vec![
                ProcedureParameter::input("in", DataType::String),
                ProcedureParameter::input("in2", DataType::Integer).with_default("5"),
            ])
            .with_result_set(result_set()),
        ProcedureMetadata::new("pm1.sqOptional")
            .with_parameters(vec![
                ProcedureParameter::input("in", DataType::String),
                ProcedureParameter::input("opt", DataType::Integer).with_optional(),
            ])
            .with_result_set(result_set()),
        ProcedureMetadata::new("pm1.sqBadDefault").with_parameters(vec![
            ProcedureParameter::input("in", DataType::Integer).with_default("abc"),
        ]),
        ProcedureMetadata::new("pm1.sp2")
            .with_parameters(vec![
                ProcedureParameter::input("inkey", DataType::Integer),
                ProcedureParameter::new("outval", ParameterDirection::Out, DataType::String),
                ProcedureParameter::new("ret", ParameterDirection::Return, DataType::Boolean),
            ])
            .with_result_set(vec![ColumnMetadata::new("e1", DataType::String)]),
        ProcedureMetadata::new("pm1.spDup")
            .with_parameters(vec![ProcedureParameter::input("e1", DataType::String)])
            .with_result_set(vec![ColumnMetadata::new("e1", DataType::String)]),
    ]
}

/// The `example1` catalog
pub fn example1() -> StaticCatalog {
    let mut catalog = StaticCatalog::new().with_vdb_name("example1").with_function(
        FunctionMetadata::new("xyz", DataType::String).with_args(&[DataType::String]),
    );
    for group in example1_groups() {
        catalog = catalog.with_group(group);
    }
    for procedure in example1_procedures() {
        catalog = catalog.with_procedure(procedure);
    }
    catalog
}

/// The `example3` catalog, loaded from [`EXAMPLE3_YAML`]
///
/// # Panics
///
/// Panics if the bundled document is malformed.
pub fn example3() -> StaticCatalog {
    StaticCatalog::from_yaml_str(EXAMPLE3_YAML).expect("example3.yaml is a valid catalog document")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sql_resolver_catalog::MetadataCatalog;

    #[test]
    fn test_example1_contents() {
        let catalog = example1();
        assert_eq!(catalog.group_count(), 8);
        assert_eq!(catalog.get_columns("pm4.g2").unwrap().len(), 6);
        assert!(catalog.get_procedure("pm1.sq3b").is_ok());
    }

    #[test]
    fn test_example3_loads() {
        let catalog = example3();
        assert_eq!(catalog.vdb_name(), Some("example3"));
        assert!(catalog.resolve_group("cat2.cat3.g1").is_ok());
        assert!(catalog.resolve_group("cat3.g1").is_err());
    }
}
