// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for SELECT resolution over the `example1` schema

mod common;

use std::sync::Arc;

use common::{resolve_err, resolve_ok, resolve_with_ok, resolver, resolver3};
use pretty_assertions::assert_eq;
use rstest::rstest;
use sql_resolver_catalog::CatalogError;
use sql_resolver_ir::{
    AggregateKind, Command, CompareOp, Criteria, DataType, Expression, FromClause, GroupSymbol,
    JoinType, MetadataId, OrderByItem, Query, SearchedCase, SelectItem, WithItem,
};
use sql_resolver_semantic::{
    QueryResolver, ResolveOptions, ResolverConfig, SemanticError, TempGroupKind,
};
use sql_resolver_test_utils::builders::*;
use sql_resolver_test_utils::{
    MockCatalogBuilder, assert_fully_resolved, assert_projected_names, assert_projected_types,
    assert_sql_eq, collect_elements,
};

fn where_clause(command: &Command) -> &Criteria {
    match command {
        Command::Query(query) => query.criteria.as_ref().expect("query has a WHERE clause"),
        other => panic!("expected a query, got {}", other),
    }
}

#[test]
fn test_select_binds_columns() {
    let resolved = resolve_ok(select(&["e1", "e2"]).with_from(from(&["pm1.g1"])));

    assert_sql_eq(&resolved, "SELECT e1, e2 FROM pm1.g1");
    assert_projected_types(&resolved.command, &[DataType::String, DataType::Integer]);
    assert_fully_resolved(&resolved.command);

    let elements = collect_elements(&resolved.command);
    assert_eq!(
        elements[0].metadata_id,
        Some(MetadataId::Column {
            group: "pm1.g1".to_string(),
            column: "e1".to_string(),
        })
    );
    assert!(resolved.external_references.is_empty());
    assert!(resolved.temp_metadata.is_empty());
}

#[test]
fn test_select_star_expands_in_column_order() {
    let resolved = resolve_ok(select_star().with_from(from(&["pm1.g1"])));

    assert_sql_eq(&resolved, "SELECT * FROM pm1.g1");
    assert_projected_names(&resolved.command, &["e1", "e2", "e3", "e4"]);
    assert_projected_types(
        &resolved.command,
        &[DataType::String, DataType::Integer, DataType::Boolean, DataType::Double],
    );
    assert_fully_resolved(&resolved.command);
}

#[test]
fn test_select_group_star_covers_one_group() {
    let query = Query::select(vec![SelectItem::all_in_group("x")])
        .with_from(from(&["pm1.g1 AS x", "pm2.g2"]));
    let resolved = resolve_ok(query);

    assert_sql_eq(&resolved, "SELECT x.* FROM pm1.g1 AS x, pm2.g2");
    assert_projected_names(&resolved.command, &["e1", "e2", "e3", "e4"]);
}

#[test]
fn test_group_star_matching_two_groups_is_ambiguous() {
    let query = Query::select(vec![SelectItem::all_in_group("g1")])
        .with_from(from(&["pm1.g1", "pm2.g1"]));

    assert_eq!(
        resolve_err(query),
        SemanticError::AmbiguousAllInGroup("g1".to_string())
    );
}

#[test]
fn test_group_star_with_unknown_group() {
    let query = Query::select(vec![SelectItem::all_in_group("pm9")]).with_from(from(&["pm1.g1"]));

    assert_eq!(
        resolve_err(query),
        SemanticError::UnknownGroupContext("pm9.*".to_string())
    );
}

#[test]
fn test_unqualified_element_in_two_groups_is_ambiguous() {
    let err = resolve_err(select(&["e1"]).with_from(from(&["pm1.g1", "pm1.g2"])));

    assert_eq!(
        err,
        SemanticError::AmbiguousElement {
            name: "e1".to_string(),
            groups: vec!["pm1.g1".to_string(), "pm1.g2".to_string()],
        }
    );
    assert!(err.to_string().ends_with("[pm1.g1, pm1.g2]"));
}

#[rstest]
#[case::full_name("pm1.g1.e1")]
#[case::partial_name("g1.e1")]
#[case::vdb_qualified("example1.pm1.g1.e1")]
fn test_qualified_element_forms(#[case] name: &str) {
    let resolved = resolve_ok(select(&[name]).with_from(from(&["pm1.g1"])));

    assert_sql_eq(&resolved, &format!("SELECT {} FROM pm1.g1", name));
    assert_projected_names(&resolved.command, &["e1"]);
    assert_fully_resolved(&resolved.command);
}

#[test]
fn test_partial_qualifier_matching_two_groups_is_ambiguous() {
    let err = resolve_err(select(&["g1.e1"]).with_from(from(&["pm1.g1", "pm2.g1"])));
    assert!(matches!(err, SemanticError::AmbiguousElement { ref name, .. } if name == "g1.e1"));
}

#[test]
fn test_alias_hides_group_name() {
    let resolved = resolve_ok(select(&["x.e1"]).with_from(from(&["pm1.g1 AS x"])));
    assert_sql_eq(&resolved, "SELECT x.e1 FROM pm1.g1 AS x");

    let err = resolve_err(select(&["pm1.g1.e1"]).with_from(from(&["pm1.g1 AS x"])));
    assert_eq!(
        err,
        SemanticError::UnknownGroupContext("pm1.g1.e1".to_string())
    );
}

#[test]
fn test_self_join_through_aliases() {
    let query = select(&["a.e1", "b.e1"])
        .with_from(from(&["pm1.g1 AS a", "pm1.g1 AS b"]))
        .with_where(eq(elem("a.e2"), elem("b.e2")));
    let resolved = resolve_ok(query);

    let groups: Vec<String> = collect_elements(&resolved.command)
        .into_iter()
        .map(|e| e.group.as_ref().map(|g| g.name.clone()).unwrap_or_default())
        .collect();
    assert_eq!(groups, vec!["a", "b", "a", "b"]);
    assert_fully_resolved(&resolved.command);
}

#[test]
fn test_duplicate_from_group_requires_alias() {
    assert_eq!(
        resolve_err(select(&["e1"]).with_from(from(&["pm1.g1", "pm1.g1"]))),
        SemanticError::DuplicateGroup("pm1.g1".to_string())
    );
}

#[test]
fn test_unknown_element() {
    let err = resolve_err(select(&["e9"]).with_from(from(&["pm1.g1"])));
    assert_eq!(err, SemanticError::ElementNotFound("e9".to_string()));
    assert_eq!(
        err.to_string(),
        "Element \"e9\" is not defined by any relevant group."
    );
}

#[test]
fn test_unknown_group() {
    assert_eq!(
        resolve_err(select(&["e1"]).with_from(from(&["pm1.nope"]))),
        SemanticError::Catalog(CatalogError::GroupNotFound("pm1.nope".to_string()))
    );
}

#[test]
fn test_partial_group_name_must_be_unique() {
    let resolved = resolve_ok(select(&["e1"]).with_from(from(&["g3"])));
    let Command::Query(query) = &resolved.command else {
        panic!("expected a query");
    };
    let FromClause::Group(group) = &query.from[0] else {
        panic!("expected a group");
    };
    assert_eq!(group.metadata_id, Some(MetadataId::Group("pm1.g3".to_string())));

    let err = resolve_err(select(&["e1"]).with_from(from(&["g1"])));
    assert!(matches!(
        err,
        SemanticError::Catalog(CatalogError::AmbiguousGroup { ref name, .. }) if name == "g1"
    ));
}

#[test]
fn test_deep_partial_names_in_example3() {
    let resolver = resolver3();

    let resolved = resolver
        .resolve(select(&["e2"]).with_from(from(&["cat2.cat3.g1"])).into())
        .unwrap();
    assert_projected_types(&resolved.command, &[DataType::Integer]);
    let elements = collect_elements(&resolved.command);
    assert_eq!(
        elements[0].metadata_id,
        Some(MetadataId::Column {
            group: "pm1.cat1.cat2.cat3.g1".to_string(),
            column: "e2".to_string(),
        })
    );

    let err = resolver
        .resolve(select(&["e2"]).with_from(from(&["cat3.g1"])).into())
        .unwrap_err();
    assert!(matches!(
        err,
        SemanticError::Catalog(CatalogError::AmbiguousGroup { ref candidates, .. }) if candidates.len() == 2
    ));
}

#[test]
fn test_star_skips_non_selectable_columns() {
    let resolved = resolver3()
        .resolve(select_star().with_from(from(&["pm3.g2"])).into())
        .unwrap();
    assert_projected_names(&resolved.command, &["e1"]);
}

#[test]
fn test_inner_join_criteria_see_both_sides() {
    let query = select(&["a.e1", "b.e2"]).with_from(vec![join(
        "pm1.g1 AS a",
        JoinType::Inner,
        "pm1.g2 AS b",
        Some(eq(elem("a.e2"), elem("b.e2"))),
    )]);
    let resolved = resolve_ok(query);

    assert_sql_eq(
        &resolved,
        "SELECT a.e1, b.e2 FROM pm1.g1 AS a INNER JOIN pm1.g2 AS b ON a.e2 = b.e2",
    );
    assert_fully_resolved(&resolved.command);
}

#[test]
fn test_inline_view_becomes_temp_group() {
    let view = select(&["e1", "e2"]).with_from(from(&["pm1.g1"]));
    let query = select(&["x.e1", "x.e2"])
        .with_from(vec![FromClause::inline_view(view.into(), "x")]);
    let resolved = resolve_ok(query);

    assert_sql_eq(&resolved, "SELECT x.e1, x.e2 FROM (SELECT e1, e2 FROM pm1.g1) AS x");
    assert_projected_types(&resolved.command, &[DataType::String, DataType::Integer]);
    assert_fully_resolved(&resolved.command);

    let view = resolved
        .temp_metadata
        .groups()
        .find(|g| g.name == "x")
        .expect("inline view group");
    assert_eq!(view.kind, TempGroupKind::InlineView);
    assert_eq!(view.column_count(), 2);
}

#[test]
fn test_inline_view_cannot_see_sibling_groups() {
    let view = select(&["e2"])
        .with_from(from(&["pm1.g2"]))
        .with_where(eq(elem("e1"), elem("pm1.g1.e1")));
    let query = select(&["x.e2"]).with_from(vec![
        FromClause::group(GroupSymbol::new("pm1.g1")),
        FromClause::inline_view(view.into(), "x"),
    ]);

    assert_eq!(
        resolve_err(query),
        SemanticError::UnknownGroupContext("pm1.g1.e1".to_string())
    );
}

#[test]
fn test_lateral_view_sees_preceding_groups() {
    let view = select(&["e2"])
        .with_from(from(&["pm1.g2"]))
        .with_where(eq(elem("e1"), elem("pm1.g1.e1")));
    let query = select(&["pm1.g1.e1", "x.e2"]).with_from(vec![
        FromClause::group(GroupSymbol::new("pm1.g1")),
        FromClause::lateral(view.into(), "x"),
    ]);
    let resolved = resolve_ok(query);

    let Command::Query(query) = &resolved.command else {
        panic!("expected a query");
    };
    let FromClause::Subquery { subquery, .. } = &query.from[1] else {
        panic!("expected a lateral view");
    };
    let correlated: Vec<&str> = subquery
        .correlated_references
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(correlated, vec!["pm1.g1.e1"]);
}

#[test]
fn test_with_item_columns_rename_output() {
    let item = WithItem::new("w", select(&["e1"]).with_from(from(&["pm1.g1"])).into())
        .with_columns(&["a"]);
    let query = select(&["a"]).with_from(from(&["w"])).with_with(vec![item]);
    let resolved = resolve_ok(query);

    assert_sql_eq(&resolved, "WITH w (a) AS (SELECT e1 FROM pm1.g1) SELECT a FROM w");
    assert_projected_names(&resolved.command, &["a"]);
    assert_projected_types(&resolved.command, &[DataType::String]);
    assert!(
        resolved
            .temp_metadata
            .groups()
            .any(|g| g.name == "w" && g.kind == TempGroupKind::With)
    );
}

#[test]
fn test_with_item_errors() {
    let item = || WithItem::new("w", select(&["e1"]).with_from(from(&["pm1.g1"])).into());

    let duplicate = select(&["e1"])
        .with_from(from(&["w"]))
        .with_with(vec![item(), item()]);
    assert_eq!(
        resolve_err(duplicate),
        SemanticError::DuplicateWithItem("w".to_string())
    );

    let miscounted = select(&["a"])
        .with_from(from(&["w"]))
        .with_with(vec![item().with_columns(&["a", "b"])]);
    assert_eq!(
        resolve_err(miscounted),
        SemanticError::WithColumnCount {
            name: "w".to_string(),
            declared: 2,
            projected: 1,
        }
    );
}

#[test]
fn test_select_into_creates_temp_table() {
    let query = select(&["e1", "e2"])
        .with_into(GroupSymbol::new("#t"))
        .with_from(from(&["pm1.g1"]));
    let resolved = resolve_ok(query);

    assert_sql_eq(&resolved, "SELECT e1, e2 INTO #t FROM pm1.g1");
    let table = resolved
        .temp_metadata
        .groups()
        .find(|g| g.name == "#t")
        .expect("SELECT INTO target");
    assert_eq!(table.kind, TempGroupKind::Table);
    let columns: Vec<(&str, DataType)> = table
        .columns()
        .map(|c| (c.name.as_str(), c.data_type))
        .collect();
    assert_eq!(
        columns,
        vec![("e1", DataType::String), ("e2", DataType::Integer)]
    );
}

#[test]
fn test_select_into_existing_group_converts_projection() {
    let query = select(&["e1", "e2", "e3", "e2"])
        .with_into(GroupSymbol::new("pm1.g1"))
        .with_from(from(&["pm1.g2"]));
    let resolved = resolve_ok(query);

    assert_sql_eq(&resolved, "SELECT e1, e2, e3, e2 INTO pm1.g1 FROM pm1.g2");
    assert_projected_types(
        &resolved.command,
        &[
            DataType::String,
            DataType::Integer,
            DataType::Boolean,
            DataType::Double,
        ],
    );
    let Command::Query(query) = &resolved.command else {
        panic!("expected a query");
    };
    let SelectItem::Expression { expr, .. } = &query.select.items[3] else {
        panic!("expected an expression item");
    };
    assert!(matches!(expr, Expression::Function(f) if f.implicit));
    assert_eq!(
        query.into.as_ref().and_then(|g| g.metadata_id.clone()),
        Some(MetadataId::Group("pm1.g1".to_string()))
    );
    assert!(resolved.temp_metadata.is_empty());
}

#[rstest]
#[case::unconvertible(
    select(&["e1", "e2", "e3", "e4"]).with_from(from(&["pm3.g1"])),
    SemanticError::InsertQueryConversion {
        expression: "e2".to_string(),
        from: DataType::Time,
        column: "pm1.g1.e2".to_string(),
        to: DataType::Integer,
    }
)]
#[case::arity(
    select(&["e1", "e2"]).with_from(from(&["pm1.g2"])),
    SemanticError::InsertArity { elements: 4, values: 2 }
)]
fn test_select_into_existing_group_errors(#[case] query: Query, #[case] expected: SemanticError) {
    let query = query.with_into(GroupSymbol::new("pm1.g1"));
    assert_eq!(resolve_err(query), expected);
}

#[test]
fn test_procedure_in_from_exposes_result_set() {
    let resolved = resolve_ok(select_star().with_from(from(&["pm1.sp2"])));
    assert_projected_names(&resolved.command, &["e1"]);

    let query = select(&["e1"])
        .with_from(from(&["pm1.sp2"]))
        .with_where(eq(elem("inkey"), int(1)));
    let resolved = resolve_ok(query);
    let elements = collect_elements(&resolved.command);
    assert_eq!(
        elements[1].metadata_id,
        Some(MetadataId::ProcedureColumn {
            procedure: "pm1.sp2".to_string(),
            column: "inkey".to_string(),
        })
    );
}

#[test]
fn test_procedure_with_clashing_names_cannot_be_a_table() {
    assert_eq!(
        resolve_err(select_star().with_from(from(&["pm1.spDup"]))),
        SemanticError::NonUniqueProcedureColumns("pm1.spDup".to_string())
    );
}

#[test]
fn test_parsable_string_literal_converts_implicitly() {
    let resolved = resolve_ok(
        select(&["e1"])
            .with_from(from(&["pm1.g1"]))
            .with_where(eq(elem("e2"), string("5"))),
    );

    assert_sql_eq(&resolved, "SELECT e1 FROM pm1.g1 WHERE e2 = '5'");
    let Criteria::Compare { right, .. } = where_clause(&resolved.command) else {
        panic!("expected a comparison");
    };
    let Expression::Function(conversion) = right else {
        panic!("expected an implicit conversion, got {:?}", right);
    };
    assert!(conversion.implicit);
    assert_eq!(conversion.data_type, Some(DataType::Integer));
}

#[test]
fn test_unparsable_literal_widens_the_other_side() {
    let resolved = resolve_ok(
        select(&["e1"])
            .with_from(from(&["pm1.g1"]))
            .with_where(eq(elem("e2"), string("abc"))),
    );

    let Criteria::Compare { left, right, .. } = where_clause(&resolved.command) else {
        panic!("expected a comparison");
    };
    assert_eq!(left.data_type(), Some(DataType::String));
    assert_eq!(right.data_type(), Some(DataType::String));
}

#[test]
fn test_comparison_without_conversion_fails() {
    let err = resolve_err(
        select(&["e1"])
            .with_from(from(&["pm3.g1"]))
            .with_where(eq(elem("e4"), elem("e1"))),
    );

    assert_eq!(
        err,
        SemanticError::TypeMismatch {
            left: DataType::BigDecimal,
            right: DataType::Date,
            criteria: "e4 = e1".to_string(),
        }
    );
}

#[test]
fn test_date_widens_to_timestamp_in_comparison() {
    let resolved = resolve_ok(
        select(&["e1"])
            .with_from(from(&["pm3.g1"]))
            .with_where(compare(elem("e1"), CompareOp::Lt, elem("e3"))),
    );

    let Criteria::Compare { left, .. } = where_clause(&resolved.command) else {
        panic!("expected a comparison");
    };
    assert_eq!(left.data_type(), Some(DataType::Timestamp));
    assert_sql_eq(&resolved, "SELECT e1 FROM pm3.g1 WHERE e1 < e3");
}

#[test]
fn test_exact_literal_narrows_to_column_type() {
    let catalog = MockCatalogBuilder::new()
        .with_group("pm5.g1", &[("s", DataType::Short), ("e1", DataType::String)])
        .build_shared();
    let resolved = QueryResolver::new(catalog)
        .resolve(
            select(&["e1"])
                .with_from(from(&["pm5.g1"]))
                .with_where(eq(elem("s"), int(5)))
                .into(),
        )
        .unwrap();

    let Criteria::Compare { left, right, .. } = where_clause(&resolved.command) else {
        panic!("expected a comparison");
    };
    assert_eq!(left.data_type(), Some(DataType::Short));
    assert!(matches!(right, Expression::Constant(c) if c.data_type == Some(DataType::Short)));
}

#[test]
fn test_literal_narrowing_can_be_disabled() {
    let catalog = MockCatalogBuilder::new()
        .with_group("pm5.g1", &[("s", DataType::Short)])
        .build_shared();
    let config = ResolverConfig {
        narrow_exact_literals: false,
        ..ResolverConfig::default()
    };
    let resolved = QueryResolver::new(catalog)
        .with_config(config)
        .resolve(
            select(&["s"])
                .with_from(from(&["pm5.g1"]))
                .with_where(eq(elem("s"), int(5)))
                .into(),
        )
        .unwrap();

    let Criteria::Compare { left, .. } = where_clause(&resolved.command) else {
        panic!("expected a comparison");
    };
    assert_eq!(left.data_type(), Some(DataType::Integer));
}

#[rstest]
#[case::integer_plus_literal(func("+", vec![elem("e2"), int(1)]), DataType::Integer, "(e2 + 1)")]
#[case::integer_plus_double(func("+", vec![elem("e2"), elem("e4")]), DataType::Double, "(e2 + e4)")]
#[case::concat(func("concat", vec![elem("e1"), elem("e2")]), DataType::String, "concat(e1, e2)")]
#[case::length(func("length", vec![elem("e1")]), DataType::Integer, "length(e1)")]
#[case::catalog_function(func("xyz", vec![elem("e1")]), DataType::String, "xyz(e1)")]
#[case::convert(convert(elem("e2"), "string"), DataType::String, "convert(e2, string)")]
#[case::sum(aggregate(AggregateKind::Sum, elem("e2")), DataType::Long, "SUM(e2)")]
#[case::avg(aggregate(AggregateKind::Avg, elem("e4")), DataType::Double, "AVG(e4)")]
#[case::max(aggregate(AggregateKind::Max, elem("e1")), DataType::String, "MAX(e1)")]
#[case::count(count_star(), DataType::Integer, "COUNT(*)")]
fn test_function_return_types(
    #[case] expr: Expression,
    #[case] expected: DataType,
    #[case] text: &str,
) {
    let resolved = resolve_ok(select_exprs(vec![expr]).with_from(from(&["pm1.g1"])));

    assert_sql_eq(&resolved, &format!("SELECT {} FROM pm1.g1", text));
    assert_projected_types(&resolved.command, &[expected]);
    assert_projected_names(&resolved.command, &["expr1"]);
}

#[test]
fn test_function_errors() {
    assert_eq!(
        resolve_err(select_exprs(vec![func("nope", vec![elem("e1")])]).with_from(from(&["pm1.g1"]))),
        SemanticError::UnknownFunctionForm("nope(e1)".to_string())
    );
    assert_eq!(
        resolve_err(select_exprs(vec![func("+", vec![null(), null()])])),
        SemanticError::AmbiguousFunctionForm("(NULL + NULL)".to_string())
    );
    assert_eq!(
        resolve_err(select_exprs(vec![convert(elem("e3"), "date")]).with_from(from(&["pm1.g1"]))),
        SemanticError::InvalidConversion {
            expression: "e3".to_string(),
            from: DataType::Boolean,
            to: DataType::Date,
        }
    );
}

#[test]
fn test_searched_case_takes_common_type() {
    let case = Expression::SearchedCase(SearchedCase {
        whens: vec![(compare(elem("e2"), CompareOp::Gt, int(0)), elem("e2"))],
        else_expr: Some(Box::new(elem("e4"))),
        data_type: None,
    });
    let resolved = resolve_ok(select_exprs(vec![case]).with_from(from(&["pm1.g1"])));

    assert_sql_eq(
        &resolved,
        "SELECT CASE WHEN e2 > 0 THEN e2 ELSE e4 END FROM pm1.g1",
    );
    assert_projected_types(&resolved.command, &[DataType::Double]);
}

#[test]
fn test_group_by_and_having() {
    let query = select_exprs(vec![elem("e1"), count_star()])
        .with_from(from(&["pm1.g1"]))
        .with_group_by(vec![elem("e1")])
        .with_having(compare(count_star(), CompareOp::Gt, int(1)));
    let resolved = resolve_ok(query);

    assert_sql_eq(
        &resolved,
        "SELECT e1, COUNT(*) FROM pm1.g1 GROUP BY e1 HAVING COUNT(*) > 1",
    );
    assert_projected_types(&resolved.command, &[DataType::String, DataType::Integer]);
    assert_projected_names(&resolved.command, &["e1", "expr2"]);
}

#[test]
fn test_aggregate_in_where_is_rejected() {
    let query = select(&["e1"])
        .with_from(from(&["pm1.g1"]))
        .with_where(compare(count_star(), CompareOp::Gt, int(1)));

    assert_eq!(
        resolve_err(query),
        SemanticError::AggregateNotAllowed {
            expression: "COUNT(*)".to_string(),
            clause: "WHERE".to_string(),
        }
    );
}

#[test]
fn test_order_by_binds_select_outputs() {
    let query = Query::select(vec![
        SelectItem::aliased(elem("e1"), "x"),
        SelectItem::expr(elem("e2")),
    ])
    .with_from(from(&["pm1.g1"]))
    .with_order_by(vec![OrderByItem::new(elem("x")), OrderByItem::new(elem("e2")).desc()]);
    let resolved = resolve_ok(query);

    assert_sql_eq(&resolved, "SELECT e1 AS x, e2 FROM pm1.g1 ORDER BY x, e2 DESC");
    let Command::Query(query) = &resolved.command else {
        panic!("expected a query");
    };
    let positions: Vec<Option<usize>> = query.order_by.iter().map(|o| o.position).collect();
    assert_eq!(positions, vec![Some(0), Some(1)]);
    assert_fully_resolved(&resolved.command);
}

#[test]
fn test_order_by_unrelated_expression() {
    let query = select(&["e1"])
        .with_from(from(&["pm1.g1"]))
        .with_order_by(vec![OrderByItem::new(elem("e2"))]);
    let resolved = resolve_ok(query);
    let Command::Query(query) = &resolved.command else {
        panic!("expected a query");
    };
    assert_eq!(query.order_by[0].position, None);

    let distinct = select(&["e1"])
        .with_distinct()
        .with_from(from(&["pm1.g1"]))
        .with_order_by(vec![OrderByItem::new(elem("e2"))]);
    assert_eq!(
        resolve_err(distinct),
        SemanticError::UnrelatedOrderBy("e2".to_string())
    );
}

#[test]
fn test_order_by_position_out_of_range() {
    let query = select(&["e1", "e2"])
        .with_from(from(&["pm1.g1"]))
        .with_order_by(vec![OrderByItem::new(int(3))]);

    assert_eq!(
        resolve_err(query),
        SemanticError::OrderByPositionOutOfRange {
            position: 3,
            count: 2,
        }
    );
}

#[test]
fn test_limit_requires_integers() {
    let resolved = resolve_ok(
        select(&["e1"])
            .with_from(from(&["pm1.g1"]))
            .with_limit(Some(int(5)), int(10)),
    );
    assert_sql_eq(&resolved, "SELECT e1 FROM pm1.g1 LIMIT 5, 10");

    let err = resolve_err(
        select(&["e1"])
            .with_from(from(&["pm1.g1"]))
            .with_limit(None, string("x")),
    );
    assert_eq!(
        err,
        SemanticError::NotConvertible {
            expected: DataType::Integer,
            expression: "'x'".to_string(),
            actual: DataType::String,
        }
    );
}

#[test]
fn test_untyped_select_items_take_default_type() {
    let resolved = resolve_ok(select_exprs(vec![null(), reference(0)]));
    assert_projected_types(&resolved.command, &[DataType::String, DataType::String]);

    let config = ResolverConfig {
        default_type: DataType::Object,
        ..ResolverConfig::default()
    };
    let resolved = resolver()
        .with_config(config)
        .resolve(select_exprs(vec![null()]).into())
        .unwrap();
    assert_projected_types(&resolved.command, &[DataType::Object]);
}

#[test]
fn test_reference_takes_type_from_comparison() {
    let resolved = resolve_ok(
        select(&["e1"])
            .with_from(from(&["pm1.g1"]))
            .with_where(eq(elem("e2"), reference(0))),
    );
    let Criteria::Compare { right, .. } = where_clause(&resolved.command) else {
        panic!("expected a comparison");
    };
    assert_eq!(right.data_type(), Some(DataType::Integer));
}

#[test]
fn test_reference_takes_type_from_binding() {
    let options = ResolveOptions::default().with_bindings(&["pm1.g1.e4"]);
    let resolved = resolve_with_ok(
        select_exprs(vec![reference(0)]).with_from(from(&["pm1.g1"])),
        &options,
    );
    assert_projected_types(&resolved.command, &[DataType::Double]);
}

#[test]
fn test_comparing_two_references_is_undetermined() {
    let query = select(&["e1"])
        .with_from(from(&["pm1.g1"]))
        .with_where(eq(reference(0), reference(1)));

    assert_eq!(
        resolve_err(query),
        SemanticError::UndeterminedReferenceType("? = ?".to_string())
    );
}

#[test]
fn test_nesting_depth_limit() {
    let innermost = select(&["e2"]).with_from(from(&["pm1.g3"]));
    let middle = select_exprs(vec![scalar(innermost)]).with_from(from(&["pm1.g2"]));
    let query = select_exprs(vec![scalar(middle)]).with_from(from(&["pm1.g1"]));

    let config = ResolverConfig {
        max_nesting_depth: 1,
        ..ResolverConfig::default()
    };
    let err = QueryResolver::new(Arc::new(sql_resolver_test_utils::example1()))
        .with_config(config)
        .resolve(query.clone().into())
        .unwrap_err();
    assert_eq!(err, SemanticError::NestingTooDeep { limit: 1 });

    assert!(resolver().resolve(query.into()).is_ok());
}

#[test]
fn test_resolving_twice_gives_the_same_tree() {
    let query = select_exprs(vec![elem("e1"), func("+", vec![elem("e2"), int(1)])])
        .with_from(from(&["pm1.g1"]))
        .with_where(eq(elem("e2"), string("5")))
        .with_order_by(vec![OrderByItem::new(elem("e1"))]);

    let resolver = resolver();
    let once = resolver.resolve(query.into()).unwrap();
    let twice = resolver.resolve(once.command.clone()).unwrap();

    assert_eq!(once.command, twice.command);
    assert_sql_eq(
        &twice,
        "SELECT e1, (e2 + 1) FROM pm1.g1 WHERE e2 = '5' ORDER BY e1",
    );
}
