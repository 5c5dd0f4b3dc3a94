// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for EXEC argument binding and procedure bodies

mod common;

use common::{resolve_err, resolve_ok, resolve_with_ok, resolver};
use pretty_assertions::assert_eq;
use rstest::rstest;
use sql_resolver_catalog::CatalogError;
use sql_resolver_ir::{
    AssignmentValue, Block, Command, CompareOp, Constant, Create, CreateProcedure, DataType,
    DropTable, ElementSymbol, Expression, GroupSymbol, Insert, MetadataId, ProcedureArguments,
    ProcedureKind, SelectItem, Statement, StoredProcedure, Update, Value,
};
use sql_resolver_semantic::{
    ParameterBindingError, ResolveOptions, SemanticError, TempGroupKind,
};
use sql_resolver_test_utils::builders::*;
use sql_resolver_test_utils::{assert_fully_resolved, assert_projected_names, assert_projected_types, assert_sql_eq};

fn exec(name: &str, args: Vec<Expression>) -> StoredProcedure {
    StoredProcedure::positional(name, args)
}

fn resolved_exec(command: &Command) -> &StoredProcedure {
    match command {
        Command::StoredProcedure(sp) => sp,
        other => panic!("expected EXEC, got {}", other),
    }
}

fn virtual_procedure(statements: Vec<Statement>) -> CreateProcedure {
    CreateProcedure {
        kind: ProcedureKind::Virtual,
        block: Block::new(statements),
    }
}

fn update_procedure(statements: Vec<Statement>) -> CreateProcedure {
    CreateProcedure {
        kind: ProcedureKind::Update,
        block: Block::new(statements),
    }
}

fn binding_err(command: impl Into<Command>) -> ParameterBindingError {
    match resolve_err(command) {
        SemanticError::ParameterBinding(e) => e,
        other => panic!("expected a parameter binding error, got {}", other),
    }
}

fn typed_constant(value: Value, data_type: DataType) -> Expression {
    Expression::Constant(Constant::typed(value, data_type))
}

fn assign_query(name: &str, command: impl Into<Command>) -> Statement {
    Statement::Assignment {
        variable: ElementSymbol::new(name),
        value: AssignmentValue::Command(Box::new(command.into())),
    }
}

#[test]
fn test_exec_positional() {
    let resolved = resolve_ok(exec("pm1.sq3", vec![string("a"), int(1)]));

    assert_sql_eq(&resolved, "EXEC pm1.sq3('a', 1)");
    assert_projected_names(&resolved.command, &["e1", "e2"]);
    assert_projected_types(&resolved.command, &[DataType::String, DataType::Integer]);
    assert_fully_resolved(&resolved.command);

    let sp = resolved_exec(&resolved.command);
    assert_eq!(
        sp.group.as_ref().and_then(|g| g.metadata_id.clone()),
        Some(MetadataId::Procedure("pm1.sq3".into()))
    );
    let indexes: Vec<usize> = sp.parameters.iter().map(|p| p.index).collect();
    assert_eq!(indexes, vec![1, 2]);
    assert!(sp.parameters.iter().all(|p| !p.using_default));
}

#[test]
fn test_exec_named_out_of_order() {
    let sp = StoredProcedure::named("pm1.sq3", vec![("in2", int(1)), ("in", string("a"))]);
    let resolved = resolve_ok(sp);

    assert_sql_eq(&resolved, "EXEC pm1.sq3(in2 => 1, \"in\" => 'a')");
    let sp = resolved_exec(&resolved.command);
    let bound: Vec<(&str, String)> = sp
        .input_values()
        .map(|(p, e)| (p.name.as_str(), e.to_string()))
        .collect();
    assert_eq!(
        bound,
        vec![("in", "'a'".to_string()), ("in2", "1".to_string())]
    );
}

#[test]
fn test_exec_named_argument_is_case_insensitive() {
    let sp = StoredProcedure::named("pm1.sq2", vec![("IN", string("a"))]);
    let resolved = resolve_ok(sp);
    assert_eq!(resolved_exec(&resolved.command).parameters[0].name, "in");
}

#[test]
fn test_exec_uses_declared_default() {
    let resolved = resolve_ok(exec("pm1.sq3b", vec![string("a")]));
    let sp = resolved_exec(&resolved.command);

    assert!(sp.parameters[1].using_default);
    assert_eq!(
        sp.parameters[1].expression,
        Some(typed_constant(Value::Integer(5), DataType::Integer))
    );
    // positional arguments keep their written form
    assert_sql_eq(&resolved, "EXEC pm1.sq3b('a')");
}

#[test]
fn test_exec_optional_parameter_defaults_to_null() {
    let resolved = resolve_ok(exec("pm1.sqOptional", vec![string("a")]));
    let sp = resolved_exec(&resolved.command);

    assert!(sp.parameters[1].using_default);
    assert_eq!(
        sp.parameters[1].expression,
        Some(typed_constant(Value::Null, DataType::Integer))
    );
}

#[rstest]
#[case::missing_required(
    exec("pm1.sq3", vec![string("a")]),
    ParameterBindingError::MissingRequired { name: "in2".into(), procedure: "pm1.sq3".into() }
)]
#[case::extra_positional(
    exec("pm1.sq1", vec![string("a")]),
    ParameterBindingError::ExtraPositional { count: 1, procedure: "pm1.sq1".into() }
)]
#[case::unknown_parameter(
    StoredProcedure::named("pm1.sq2", vec![("nope", string("a"))]),
    ParameterBindingError::UnknownParameter { name: "nope".into(), procedure: "pm1.sq2".into() }
)]
#[case::duplicate_parameter(
    StoredProcedure::named("pm1.sq2", vec![("in", string("a")), ("IN", string("b"))]),
    ParameterBindingError::DuplicateParameter { name: "IN".into(), procedure: "pm1.sq2".into() }
)]
#[case::output_parameter(
    StoredProcedure::named("pm1.sp2", vec![("inkey", int(1)), ("outval", string("x"))]),
    ParameterBindingError::NotAnInput { name: "outval".into(), procedure: "pm1.sp2".into() }
)]
#[case::invalid_default(
    exec("pm1.sqBadDefault", vec![]),
    ParameterBindingError::InvalidDefault {
        name: "in".into(),
        procedure: "pm1.sqBadDefault".into(),
        default: "abc".into(),
        data_type: DataType::Integer,
    }
)]
fn test_exec_binding_errors(
    #[case] sp: StoredProcedure,
    #[case] expected: ParameterBindingError,
) {
    assert_eq!(binding_err(sp), expected);
}

#[test]
fn test_exec_projection_order() {
    let resolved = resolve_ok(exec("pm1.sp2", vec![int(1)]));

    assert_projected_names(&resolved.command, &["ret", "e1", "outval"]);
    assert_projected_types(
        &resolved.command,
        &[DataType::Boolean, DataType::String, DataType::String],
    );
    let names: Vec<&str> = resolved_exec(&resolved.command)
        .projected
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, vec!["pm1.sp2.ret", "pm1.sp2.e1", "pm1.sp2.outval"]);

    let sp = resolved_exec(&resolved.command);
    assert_eq!(sp.parameters[1].expression, None);
    assert_eq!(sp.parameters[2].expression, None);
}

#[test]
fn test_exec_argument_not_convertible() {
    let err = resolve_err(exec("pm1.sq3", vec![string("a"), string("abc")]));
    assert_eq!(
        err,
        SemanticError::NotConvertible {
            expected: DataType::Integer,
            expression: "'abc'".to_string(),
            actual: DataType::String,
        }
    );
}

#[test]
fn test_exec_argument_narrowing_and_parsing() {
    let resolved = resolve_ok(exec("pm1.sq3", vec![int(7), string("5")]));
    let sp = resolved_exec(&resolved.command);
    let ProcedureArguments::Positional(args) = &sp.arguments else {
        panic!("expected positional arguments");
    };
    assert_eq!(args[0].data_type(), Some(DataType::String));
    assert_eq!(args[1].data_type(), Some(DataType::Integer));
}

#[test]
fn test_exec_partial_name() {
    let resolved = resolve_ok(exec("sq3", vec![string("a"), int(1)]));

    assert_sql_eq(&resolved, "EXEC sq3('a', 1)");
    assert_eq!(
        resolved_exec(&resolved.command).projected[0].name,
        "pm1.sq3.e1"
    );
}

#[test]
fn test_exec_unknown_procedure() {
    assert_eq!(
        resolve_err(exec("pm1.nope", vec![])),
        SemanticError::Catalog(CatalogError::ProcedureNotFound("pm1.nope".to_string()))
    );
}

#[test]
fn test_exec_as_scalar_subquery() {
    let query = select_exprs(vec![scalar(exec("pm1.sp2", vec![elem("e2")]))])
        .with_from(from(&["pm1.g1"]));
    let err = resolve_err(query);
    assert!(matches!(err, SemanticError::SubqueryColumnCount(_)));
}

#[test]
fn test_procedure_declares_and_uses_variables() {
    let procedure = virtual_procedure(vec![
        Statement::declare("x", DataType::Integer, Some(int(1))),
        Statement::command(
            select(&["e1"])
                .with_from(from(&["pm1.g1"]))
                .with_where(eq(elem("e2"), elem("x")))
                .into(),
        ),
        Statement::command(exec("pm1.sq2", vec![elem("VARIABLES.x")]).into()),
    ]);
    let resolved = resolve_ok(procedure);

    assert_sql_eq(
        &resolved,
        "CREATE VIRTUAL PROCEDURE\nBEGIN\nDECLARE integer x = 1;\nSELECT e1 FROM pm1.g1 WHERE e2 = x;\nEXEC pm1.sq2(VARIABLES.x);\nEND",
    );
    assert_fully_resolved(&resolved.command);

    let variables = resolved
        .temp_metadata
        .groups()
        .find(|g| g.kind == TempGroupKind::Variables)
        .expect("a VARIABLES group");
    assert_eq!(variables.name, "VARIABLES");
}

#[rstest]
#[case::unqualified("x")]
#[case::qualified("VARIABLES.x")]
fn test_variable_used_before_declaration(#[case] name: &str) {
    let procedure = virtual_procedure(vec![
        Statement::assign(name, int(1)),
        Statement::declare("x", DataType::Integer, None),
    ]);
    assert_eq!(
        resolve_err(procedure),
        SemanticError::ElementNotFound(name.to_string())
    );
}

#[test]
fn test_duplicate_variable() {
    let procedure = virtual_procedure(vec![
        Statement::declare("x", DataType::Integer, None),
        Statement::declare("VARIABLES.x", DataType::String, None),
    ]);
    assert_eq!(
        resolve_err(procedure),
        SemanticError::DuplicateVariable("VARIABLES.x".to_string())
    );
}

#[test]
fn test_block_variables_go_out_of_scope() {
    let inner = Block::new(vec![Statement::declare("x", DataType::Integer, None)]);
    let procedure = virtual_procedure(vec![
        Statement::Block(inner.clone()),
        Statement::assign("x", int(1)),
    ]);
    assert_eq!(
        resolve_err(procedure),
        SemanticError::ElementNotFound("x".to_string())
    );

    let redeclared = virtual_procedure(vec![
        Statement::Block(inner),
        Statement::declare("x", DataType::String, Some(string("a"))),
    ]);
    assert!(resolver().resolve(redeclared.into()).is_ok());
}

/// Declarations of the procedure body, depth first
fn declarations(block: &Block) -> Vec<&ElementSymbol> {
    let mut found = Vec::new();
    for statement in &block.statements {
        match statement {
            Statement::Declare { variable, .. } => found.push(variable),
            Statement::Block(inner) => found.extend(declarations(inner)),
            _ => {}
        }
    }
    found
}

#[test]
fn test_block_variables_keep_their_metadata() {
    let procedure = virtual_procedure(vec![
        Statement::Block(Block::new(vec![
            Statement::declare("x", DataType::Integer, None),
            Statement::assign("x", int(1)),
        ])),
        Statement::Block(Block::new(vec![
            Statement::declare("y", DataType::String, None),
            Statement::assign("y", string("a")),
        ])),
        Statement::Block(Block::new(vec![Statement::declare(
            "x",
            DataType::String,
            None,
        )])),
        Statement::declare("z", DataType::Boolean, None),
    ]);
    let resolved = resolve_ok(procedure);
    let Command::CreateProcedure(procedure) = &resolved.command else {
        panic!("expected a procedure");
    };

    let declared = declarations(&procedure.block);
    assert_eq!(declared.len(), 4);
    let mut ids = Vec::new();
    for variable in declared {
        let Some(MetadataId::TempColumn(group, index)) = &variable.metadata_id else {
            panic!("{} is not bound to a temp column", variable.name);
        };
        let column = resolved
            .temp_metadata
            .get(*group)
            .and_then(|g| g.columns().nth(*index))
            .unwrap_or_else(|| panic!("{} points at a missing column", variable.name));
        assert_eq!(column.name, variable.name);
        assert_eq!(Some(column.data_type), variable.data_type);
        ids.push((*group, *index));
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}

#[test]
fn test_declare_value_must_convert() {
    let procedure = virtual_procedure(vec![Statement::declare(
        "x",
        DataType::Integer,
        Some(string("abc")),
    )]);
    assert!(matches!(
        resolve_err(procedure),
        SemanticError::NotConvertible {
            expected: DataType::Integer,
            ..
        }
    ));
}

#[test]
fn test_assignment_from_query() {
    let procedure = virtual_procedure(vec![
        Statement::declare("x", DataType::String, None),
        assign_query("x", select(&["e1"]).with_from(from(&["pm1.g1"]))),
    ]);
    assert!(resolver().resolve(procedure.into()).is_ok());

    let wide = virtual_procedure(vec![
        Statement::declare("x", DataType::String, None),
        assign_query("x", select(&["e1", "e2"]).with_from(from(&["pm1.g1"]))),
    ]);
    assert_eq!(
        resolve_err(wide),
        SemanticError::ScalarAssignment("x".to_string())
    );
}

#[test]
fn test_assignment_query_type_mismatch() {
    let procedure = virtual_procedure(vec![
        Statement::declare("x", DataType::Integer, None),
        assign_query("x", select(&["e1"]).with_from(from(&["pm1.g1"]))),
    ]);
    assert_eq!(
        resolve_err(procedure),
        SemanticError::NotConvertible {
            expected: DataType::Integer,
            expression: "SELECT e1 FROM pm1.g1".to_string(),
            actual: DataType::String,
        }
    );
}

#[test]
fn test_update_procedure_groups() {
    let procedure = update_procedure(vec![
        Statement::If {
            condition: eq(elem("CHANGING.e1"), boolean(true)),
            then_block: Block::new(vec![
                Statement::declare("x", DataType::Integer, Some(elem("INPUT.e2"))),
                Statement::command(
                    Update::new(group("pm1.g2"), vec![("e1", elem("INPUT.e1"))])
                        .with_where(eq(elem("e2"), elem("x")))
                        .into(),
                ),
            ]),
            else_block: None,
        },
        Statement::assign("ROWS_UPDATED", int(1)),
    ]);
    let options = ResolveOptions::default().with_update_target("pm1.g1");
    let resolved = resolve_with_ok(procedure, &options);

    assert_fully_resolved(&resolved.command);
    let Command::CreateProcedure(procedure) = &resolved.command else {
        panic!("expected a procedure");
    };
    let Statement::Assignment { variable, .. } = &procedure.block.statements[1] else {
        panic!("expected an assignment");
    };
    assert_eq!(variable.data_type, Some(DataType::Integer));
    assert_eq!(
        variable.group.as_ref().map(|g| g.name.as_str()),
        Some("VARIABLES")
    );
}

#[test]
fn test_update_procedure_input_is_read_only() {
    let procedure = update_procedure(vec![Statement::assign("INPUT.e1", string("a"))]);
    let options = ResolveOptions::default().with_update_target("pm1.g1");
    let err = resolver()
        .resolve_with(procedure.into(), &options)
        .unwrap_err();

    assert_eq!(err, SemanticError::ReadOnlyElement("INPUT.e1".to_string()));
}

#[test]
fn test_update_procedure_without_target_has_no_input() {
    let procedure = update_procedure(vec![Statement::assign("INPUT.e1", string("a"))]);
    assert_eq!(
        resolve_err(procedure),
        SemanticError::UnknownGroupContext("INPUT.e1".to_string())
    );
}

#[test]
fn test_loop_cursor() {
    let procedure = virtual_procedure(vec![Statement::Loop {
        query: Box::new(select(&["e1", "e2"]).with_from(from(&["pm1.g1"])).into()),
        cursor: "c".to_string(),
        block: Block::new(vec![
            Statement::declare("y", DataType::String, Some(elem("c.e1"))),
            Statement::If {
                condition: compare(elem("c.e2"), CompareOp::Gt, int(5)),
                then_block: Block::new(vec![Statement::Break]),
                else_block: Some(Block::new(vec![Statement::Continue])),
            },
        ]),
    }]);
    let resolved = resolve_ok(procedure);

    assert_fully_resolved(&resolved.command);
    let cursor = resolved
        .temp_metadata
        .groups()
        .find(|g| g.kind == TempGroupKind::Cursor)
        .expect("a cursor group");
    let columns: Vec<(&str, DataType)> = cursor
        .columns()
        .map(|c| (c.name.as_str(), c.data_type))
        .collect();
    assert_eq!(
        columns,
        vec![("e1", DataType::String), ("e2", DataType::Integer)]
    );
}

#[test]
fn test_cursor_not_visible_after_loop() {
    let procedure = virtual_procedure(vec![
        Statement::Loop {
            query: Box::new(select(&["e1"]).with_from(from(&["pm1.g1"])).into()),
            cursor: "c".to_string(),
            block: Block::default(),
        },
        Statement::Raise(elem("c.e1")),
    ]);
    assert_eq!(
        resolve_err(procedure),
        SemanticError::UnknownGroupContext("c.e1".to_string())
    );
}

#[rstest]
#[case::break_statement(Statement::Break, "BREAK")]
#[case::continue_statement(Statement::Continue, "CONTINUE")]
fn test_statement_outside_loop(#[case] statement: Statement, #[case] keyword: &str) {
    let procedure = virtual_procedure(vec![statement]);
    assert_eq!(
        resolve_err(procedure),
        SemanticError::StatementOutsideLoop(keyword.to_string())
    );
}

#[test]
fn test_while_loop() {
    let procedure = virtual_procedure(vec![
        Statement::declare("i", DataType::Integer, Some(int(0))),
        Statement::While {
            condition: compare(elem("i"), CompareOp::Lt, int(10)),
            block: Block::new(vec![
                Statement::assign("i", func("+", vec![elem("i"), int(1)])),
                Statement::Break,
            ]),
        },
        Statement::Raise(func("concat", vec![string("done "), elem("i")])),
    ]);
    let resolved = resolve_ok(procedure);

    assert_sql_eq(
        &resolved,
        "CREATE VIRTUAL PROCEDURE\nBEGIN\nDECLARE integer i = 0;\nWHILE(i < 10)\nBEGIN\ni = (i + 1);\nBREAK;\nEND\nERROR concat('done ', i);\nEND",
    );
}

#[test]
fn test_temp_table_lifecycle() {
    let create = Create::new("#t", &[("a", DataType::Integer), ("b", DataType::String)]);
    let procedure = virtual_procedure(vec![
        Statement::command(create.into()),
        Statement::command(Insert::values(group("#t"), &["a"], vec![int(1)]).into()),
        Statement::command(select_star().with_from(from(&["#t"])).into()),
        Statement::command(
            DropTable {
                table: GroupSymbol::new("#t"),
            }
            .into(),
        ),
    ]);
    let resolved = resolve_ok(procedure);

    let tables: Vec<&str> = resolved
        .temp_metadata
        .groups()
        .filter(|g| g.kind == TempGroupKind::Table)
        .map(|g| g.name.as_str())
        .collect();
    assert_eq!(tables, vec!["#t"]);
    assert!(resolved.temp_metadata.find_visible("#t").is_none());

    let Command::CreateProcedure(procedure) = &resolved.command else {
        panic!("expected a procedure");
    };
    let Statement::Command(query) = &procedure.block.statements[2] else {
        panic!("expected a query statement");
    };
    let Command::Query(query) = query.as_ref() else {
        panic!("expected a query");
    };
    assert!(matches!(&query.select.items[0], SelectItem::All { elements } if elements.len() == 2));
}

#[test]
fn test_dropped_temp_table_is_gone() {
    let procedure = virtual_procedure(vec![
        Statement::command(Create::new("#t", &[("a", DataType::Integer)]).into()),
        Statement::command(
            DropTable {
                table: GroupSymbol::new("#t"),
            }
            .into(),
        ),
        Statement::command(select(&["a"]).with_from(from(&["#t"])).into()),
    ]);
    assert_eq!(
        resolve_err(procedure),
        SemanticError::Catalog(CatalogError::GroupNotFound("#t".to_string()))
    );
}

#[test]
fn test_temp_table_created_twice() {
    let create = Create::new("#t", &[("a", DataType::Integer)]);
    let procedure = virtual_procedure(vec![
        Statement::command(create.clone().into()),
        Statement::command(create.into()),
    ]);
    assert_eq!(
        resolve_err(procedure),
        SemanticError::TempTableExists("#t".to_string())
    );
}

#[test]
fn test_temp_table_scoped_to_block() {
    let procedure = virtual_procedure(vec![
        Statement::Block(Block::new(vec![Statement::command(
            Create::new("#t", &[("a", DataType::Integer)]).into(),
        )])),
        Statement::command(select(&["a"]).with_from(from(&["#t"])).into()),
    ]);
    assert_eq!(
        resolve_err(procedure),
        SemanticError::Catalog(CatalogError::GroupNotFound("#t".to_string()))
    );
}
