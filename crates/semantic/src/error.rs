// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Error types for semantic resolution
//!
//! Every failure the resolver reports is a [`SemanticError`]. Each variant
//! carries the offending fragment as printed SQL text so messages read the
//! same way the query was written.
//!
//! Group lookups that fail in the catalog (`Group does not exist`, ambiguous
//! partial names, unknown procedures) surface through
//! [`SemanticError::Catalog`].

use sql_resolver_catalog::CatalogError;
use sql_resolver_ir::DataType;
use thiserror::Error;

/// Result type alias for semantic operations
pub type SemanticResult<T> = Result<T, SemanticError>;

/// Errors raised while binding EXEC arguments to procedure parameters
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParameterBindingError {
    #[error("{count} extra positional parameter(s) passed to {procedure}.")]
    ExtraPositional { count: usize, procedure: String },

    #[error("Parameter {name} is not defined for procedure {procedure}.")]
    UnknownParameter { name: String, procedure: String },

    #[error("Parameter {name} is specified more than once for procedure {procedure}.")]
    DuplicateParameter { name: String, procedure: String },

    #[error("Parameter {name} of procedure {procedure} is not an input parameter.")]
    NotAnInput { name: String, procedure: String },

    #[error("Required parameter {name} of procedure {procedure} has no value and no default.")]
    MissingRequired { name: String, procedure: String },

    #[error(
        "Default value '{default}' of parameter {name} of procedure {procedure} cannot be converted to {data_type}."
    )]
    InvalidDefault {
        name: String,
        procedure: String,
        default: String,
        data_type: DataType,
    },
}

/// Errors that can occur during semantic resolution
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// No group in any visible scope defines the element
    #[error("Element \"{0}\" is not defined by any relevant group.")]
    ElementNotFound(String),

    /// The element's qualifier names no visible group
    #[error("Symbol {0} is specified with an unknown group context")]
    UnknownGroupContext(String),

    /// More than one group at the nearest scope defines the element
    #[error(
        "Element \"{name}\" is ambiguous and should be qualified, at a single scope it exists in [{}]",
        .groups.join(", ")
    )]
    AmbiguousElement { name: String, groups: Vec<String> },

    /// `g.*` matches more than one FROM clause group
    #[error("The symbol {0}.* refers to more than one group defined in the FROM clause.")]
    AmbiguousAllInGroup(String),

    /// Two FROM clause entries share a name or alias
    #[error("Group {0} is specified more than once in the FROM clause; an alias is required.")]
    DuplicateGroup(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(
        "The expressions in this criteria are being compared but are of differing types ({left} and {right}) and no implicit conversion is available: {criteria}"
    )]
    TypeMismatch {
        left: DataType,
        right: DataType,
        criteria: String,
    },

    #[error(
        "Expected value of type '{expected}' but '{expression}' is of type '{actual}' and no implicit conversion is available."
    )]
    NotConvertible {
        expected: DataType,
        expression: String,
        actual: DataType,
    },

    #[error("Unable to convert '{expression}' of type [{from}] to the expected type [{to}].")]
    InvalidConversion {
        expression: String,
        from: DataType,
        to: DataType,
    },

    #[error("Unable to find a common type for the values of {0}.")]
    NoCommonType(String),

    #[error(
        "The function '{0}' is an unknown form.  Check that the function name and number of arguments is correct."
    )]
    UnknownFunctionForm(String),

    #[error(
        "The function '{0}' has more than one matching signature.  Use an explicit convert to select one."
    )]
    AmbiguousFunctionForm(String),

    #[error("Aggregate expression {expression} is not allowed in the {clause} clause.")]
    AggregateNotAllowed { expression: String, clause: String },

    #[error("The first three arguments for the LOOKUP function must be specified as constants.")]
    InvalidLookup { function: String },

    #[error(
        "Expression '{0}' has a parameter with non-determinable type information.  The use of an explicit convert may be necessary."
    )]
    UndeterminedReferenceType(String),

    #[error(transparent)]
    ParameterBinding(#[from] ParameterBindingError),

    #[error(
        "Cannot access procedure {0} using table semantics since the parameter and result set column names are not all unique."
    )]
    NonUniqueProcedureColumns(String),

    #[error("Cannot create group '{group}' with multiple columns named '{column}'")]
    DuplicateColumnName { group: String, column: String },

    #[error("Correlated reference {0} is not allowed in the GROUP BY clause.")]
    InvalidCorrelation(String),

    #[error("The subquery {0} must project exactly one column.")]
    SubqueryColumnCount(String),

    #[error("Subqueries nested deeper than {limit} levels are not supported.")]
    NestingTooDeep { limit: usize },

    #[error(
        "Cannot create temporary table \"{0}\". Local temporary tables must be created with unqualified names."
    )]
    QualifiedTempTable(String),

    #[error("Cannot create temporary table \"{0}\". An object with the same name already exists.")]
    TempTableExists(String),

    #[error("Queries combined with the set operator {0} must have the same number of output elements.")]
    SetQueryArity(String),

    #[error("ORDER BY expression '{0}' cannot be used with a set query.")]
    InvalidSetQueryOrderBy(String),

    #[error(
        "Element '{0}' in ORDER BY is ambiguous and may refer to more than one element of SELECT clause."
    )]
    AmbiguousOrderBy(String),

    #[error(
        "Unrelated ORDER BY expression {0} cannot be used with SELECT DISTINCT or a grouped query."
    )]
    UnrelatedOrderBy(String),

    #[error("ORDER BY position {position} is not in the range 1 to {count} of the SELECT clause.")]
    OrderByPositionOutOfRange { position: i64, count: usize },

    #[error(
        "The Expression {expression} used in a nested UNION ORDER BY clause cannot be implicitly converted from type {from} to type {to}."
    )]
    NestedOrderByConversion {
        expression: String,
        from: DataType,
        to: DataType,
    },

    #[error(
        "INSERT statement must have the same number of elements and values specified.  This statement has {elements} elements and {values} values."
    )]
    InsertArity { elements: usize, values: usize },

    #[error(
        "Cannot convert insert query expression projected symbol '{expression}' of type {from} to insert column '{column}' of type {to}"
    )]
    InsertQueryConversion {
        expression: String,
        from: DataType,
        column: String,
        to: DataType,
    },

    #[error("Element {0} cannot be assigned a value.")]
    ReadOnlyElement(String),

    #[error("WITH clause item {0} is defined more than once.")]
    DuplicateWithItem(String),

    #[error("WITH clause item {name} names {declared} columns but its query projects {projected}.")]
    WithColumnCount {
        name: String,
        declared: usize,
        projected: usize,
    },

    #[error("Variable {0} was previously declared.")]
    DuplicateVariable(String),

    #[error("Assignment to {0} requires a query projecting exactly one column.")]
    ScalarAssignment(String),

    #[error("{0} statement is not inside a loop.")]
    StatementOutsideLoop(String),

    #[error("Invalid resolver configuration: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_element_not_found() {
        let err = SemanticError::ElementNotFound("VARIABLES.X".to_string());
        assert_eq!(
            err.to_string(),
            "Element \"VARIABLES.X\" is not defined by any relevant group."
        );
    }

    #[test]
    fn test_error_display_ambiguous_element_lists_groups() {
        let err = SemanticError::AmbiguousElement {
            name: "e1".to_string(),
            groups: vec!["pm4.g2 AS Y".to_string(), "pm4.g1".to_string()],
        };
        let msg = format!("{}", err);
        assert!(msg.contains("ambiguous"));
        assert!(msg.ends_with("[pm4.g2 AS Y, pm4.g1]"));
    }

    #[test]
    fn test_error_display_type_mismatch_names_both_types() {
        let err = SemanticError::TypeMismatch {
            left: DataType::Timestamp,
            right: DataType::Boolean,
            criteria: "pm3.g1.e4 > TRUE".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("(timestamp and boolean)"));
        assert!(msg.ends_with(": pm3.g1.e4 > TRUE"));
    }

    #[test]
    fn test_error_display_not_convertible() {
        let err = SemanticError::NotConvertible {
            expected: DataType::Boolean,
            expression: "3".to_string(),
            actual: DataType::Integer,
        };
        assert_eq!(
            err.to_string(),
            "Expected value of type 'boolean' but '3' is of type 'integer' and no implicit conversion is available."
        );
    }

    #[test]
    fn test_catalog_errors_are_transparent() {
        let err: SemanticError = CatalogError::GroupNotFound("pm1.nope".to_string()).into();
        assert_eq!(err.to_string(), "Group does not exist: pm1.nope");
    }

    #[test]
    fn test_parameter_binding_errors_are_transparent() {
        let err: SemanticError = ParameterBindingError::ExtraPositional {
            count: 1,
            procedure: "pm1.sp2".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "1 extra positional parameter(s) passed to pm1.sp2.");
    }

    #[test]
    fn test_error_display_insert_arity() {
        let err = SemanticError::InsertArity {
            elements: 2,
            values: 3,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("2 elements and 3 values"));
    }

    #[test]
    fn test_error_display_temp_table() {
        let err = SemanticError::QualifiedTempTable("pm1.g1".to_string());
        assert!(err.to_string().contains("unqualified names"));
        let err = SemanticError::TempTableExists("g1".to_string());
        assert!(err.to_string().contains("already exists"));
    }
}
