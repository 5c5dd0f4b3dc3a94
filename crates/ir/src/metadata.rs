// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata types for catalog objects
//!
//! This module defines the types a metadata catalog hands to the resolver:
//! groups (tables and views) with their columns, stored procedures with
//! their parameters and result sets, and function signatures.
//!
//! It also defines [`MetadataId`], the handle a resolved symbol keeps to the
//! object it was bound to. Catalog objects are identified by their full
//! name; resolve-time objects (temp tables, inline views, procedure
//! variables) by an index into the resolver's temp metadata store.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::DataType;

fn default_true() -> bool {
    true
}

/// Group classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    #[default]
    Physical,
    Virtual,
}

/// Metadata for a group column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// Whether `*` expansion includes the column
    #[serde(default = "default_true")]
    pub selectable: bool,
    /// Whether the column may be an INSERT/UPDATE target
    #[serde(default = "default_true")]
    pub updatable: bool,
    /// Default value text
    #[serde(default)]
    pub default_value: Option<String>,
}

impl ColumnMetadata {
    /// Create a new column metadata with builder pattern
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            selectable: true,
            updatable: true,
            default_value: None,
        }
    }

    /// Builder method: set selectability
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Builder method: set updatability
    pub fn with_updatable(mut self, updatable: bool) -> Self {
        self.updatable = updatable;
        self
    }

    /// Builder method: set default value
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_value = Some(default.into());
        self
    }
}

/// Metadata for a group (table or view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMetadata {
    /// Fully qualified name, e.g. `pm1.cat1.cat2.cat3.g1`
    pub full_name: String,
    /// Physical or virtual
    #[serde(default)]
    pub kind: GroupKind,
    /// Ordered column list
    #[serde(default)]
    pub columns: Vec<ColumnMetadata>,
}

impl GroupMetadata {
    /// Create new group metadata with builder pattern
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            kind: GroupKind::Physical,
            columns: Vec::new(),
        }
    }

    /// Builder method: set columns
    pub fn with_columns(mut self, columns: Vec<ColumnMetadata>) -> Self {
        self.columns = columns;
        self
    }

    /// Builder method: set group kind
    pub fn with_kind(mut self, kind: GroupKind) -> Self {
        self.kind = kind;
        self
    }

    /// Get column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Last segment of the full name
    pub fn short_name(&self) -> &str {
        last_segment(&self.full_name)
    }
}

/// Parameter direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterDirection {
    In,
    InOut,
    Out,
    Return,
}

impl ParameterDirection {
    /// Whether a caller may supply a value
    pub fn accepts_input(&self) -> bool {
        matches!(self, ParameterDirection::In | ParameterDirection::InOut)
    }

    /// Whether the parameter shows up in the procedure's projection
    pub fn is_output(&self) -> bool {
        matches!(
            self,
            ParameterDirection::InOut | ParameterDirection::Out | ParameterDirection::Return
        )
    }
}

/// Stored procedure parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureParameter {
    pub name: String,
    pub direction: ParameterDirection,
    pub data_type: DataType,
    /// Default value text, parsed by the parameter type when used
    #[serde(default)]
    pub default_value: Option<String>,
    /// May be omitted by the caller
    #[serde(default)]
    pub optional: bool,
}

impl ProcedureParameter {
    pub fn new(name: impl Into<String>, direction: ParameterDirection, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            direction,
            data_type,
            default_value: None,
            optional: false,
        }
    }

    pub fn input(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name, ParameterDirection::In, data_type)
    }

    /// Builder method: set default value text
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_value = Some(default.into());
        self
    }

    /// Builder method: mark as optional
    pub fn with_optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Metadata for a stored procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureMetadata {
    pub full_name: String,
    #[serde(default)]
    pub parameters: Vec<ProcedureParameter>,
    #[serde(default)]
    pub result_set: Vec<ColumnMetadata>,
}

impl ProcedureMetadata {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            parameters: Vec::new(),
            result_set: Vec::new(),
        }
    }

    /// Builder method: set parameters
    pub fn with_parameters(mut self, parameters: Vec<ProcedureParameter>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Builder method: set result set columns
    pub fn with_result_set(mut self, columns: Vec<ColumnMetadata>) -> Self {
        self.result_set = columns;
        self
    }

    /// Parameters a caller may bind, in declaration order
    pub fn input_parameters(&self) -> impl Iterator<Item = &ProcedureParameter> {
        self.parameters.iter().filter(|p| p.direction.accepts_input())
    }

    pub fn return_parameter(&self) -> Option<&ProcedureParameter> {
        self.parameters
            .iter()
            .find(|p| p.direction == ParameterDirection::Return)
    }
}

/// Function classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionType {
    #[default]
    Scalar,
    Aggregate,
}

/// Function parameter definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionParameter {
    /// Parameter name
    pub name: String,
    /// Parameter data type
    pub data_type: DataType,
}

impl FunctionParameter {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Metadata for a function signature
///
/// One overload per value; `abs(integer)` and `abs(double)` are two entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionMetadata {
    /// Function name without namespace
    pub name: String,
    /// Namespace for user-defined functions
    #[serde(default)]
    pub namespace: Option<String>,
    /// Return type
    pub return_type: DataType,
    /// Function parameters
    #[serde(default)]
    pub parameters: Vec<FunctionParameter>,
    /// Last parameter repeats
    #[serde(default)]
    pub varargs: bool,
    /// Function type (scalar, aggregate)
    #[serde(default)]
    pub function_type: FunctionType,
    /// Function description/documentation
    #[serde(default)]
    pub description: Option<String>,
}

impl FunctionMetadata {
    /// Create new function metadata with builder pattern
    pub fn new(name: impl Into<String>, return_type: DataType) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            return_type,
            parameters: Vec::new(),
            varargs: false,
            function_type: FunctionType::Scalar,
            description: None,
        }
    }

    /// Builder method: add parameters
    pub fn with_parameters(mut self, params: Vec<FunctionParameter>) -> Self {
        self.parameters = params;
        self
    }

    /// Builder method: positional parameter types, named `arg1..argN`
    pub fn with_args(mut self, types: &[DataType]) -> Self {
        self.parameters = types
            .iter()
            .enumerate()
            .map(|(i, t)| FunctionParameter::new(format!("arg{}", i + 1), *t))
            .collect();
        self
    }

    /// Builder method: set function type
    pub fn with_type(mut self, function_type: FunctionType) -> Self {
        self.function_type = function_type;
        self
    }

    /// Builder method: set namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Builder method: repeat the last parameter
    pub fn with_varargs(mut self) -> Self {
        self.varargs = true;
        self
    }

    /// Builder method: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// `namespace.name`, or the bare name
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// Whether `count` arguments can bind to this signature
    pub fn accepts_arity(&self, count: usize) -> bool {
        if self.varargs && !self.parameters.is_empty() {
            count >= self.parameters.len() - 1
        } else {
            count == self.parameters.len()
        }
    }

    /// Declared type of the argument at `index`, expanding varargs
    pub fn parameter_type(&self, index: usize) -> Option<DataType> {
        match self.parameters.get(index) {
            Some(p) => Some(p.data_type),
            None if self.varargs => self.parameters.last().map(|p| p.data_type),
            None => None,
        }
    }

    /// Descriptor for a call with `arg_count` arguments
    pub fn descriptor(&self, arg_count: usize) -> FunctionDescriptor {
        FunctionDescriptor {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            arg_types: (0..arg_count)
                .filter_map(|i| self.parameter_type(i))
                .collect(),
            return_type: self.return_type,
            function_type: self.function_type,
        }
    }

    /// Get function signature, e.g. `abs(integer) -> integer`
    pub fn signature(&self) -> String {
        let params: Vec<&str> = self.parameters.iter().map(|p| p.data_type.name()).collect();
        format!(
            "{}({}{}) -> {}",
            self.qualified_name(),
            params.join(", "),
            if self.varargs { "..." } else { "" },
            self.return_type
        )
    }
}

/// The overload a function call was bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub namespace: Option<String>,
    pub arg_types: Vec<DataType>,
    pub return_type: DataType,
    pub function_type: FunctionType,
}

/// Index of a group in the resolver's temp metadata store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TempGroupId(pub usize);

impl fmt::Display for TempGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "temp#{}", self.0)
    }
}

/// What a resolved symbol is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetadataId {
    /// Catalog group by full name
    Group(String),
    /// Catalog column
    Column { group: String, column: String },
    /// Catalog procedure by full name
    Procedure(String),
    /// Procedure parameter or result set column
    ProcedureColumn { procedure: String, column: String },
    /// Resolve-time group
    TempGroup(TempGroupId),
    /// Column of a resolve-time group, by position
    TempColumn(TempGroupId, usize),
}

impl MetadataId {
    pub fn is_temporary(&self) -> bool {
        matches!(self, MetadataId::TempGroup(_) | MetadataId::TempColumn(..))
    }
}

/// Last `.`-separated segment of a name
pub fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_column_lookup_ignores_case() {
        let group = GroupMetadata::new("pm1.g1").with_columns(vec![
            ColumnMetadata::new("e1", DataType::String),
            ColumnMetadata::new("e2", DataType::Integer),
        ]);
        assert_eq!(group.get_column("E2").map(|c| c.data_type), Some(DataType::Integer));
        assert!(group.get_column("e9").is_none());
        assert_eq!(group.short_name(), "g1");
    }

    #[test]
    fn test_function_arity_and_varargs() {
        let concat = FunctionMetadata::new("concat", DataType::String)
            .with_args(&[DataType::String, DataType::String]);
        assert!(concat.accepts_arity(2));
        assert!(!concat.accepts_arity(3));

        let coalesce = FunctionMetadata::new("coalesce", DataType::Object)
            .with_args(&[DataType::Object])
            .with_varargs();
        assert!(coalesce.accepts_arity(0));
        assert!(coalesce.accepts_arity(4));
        assert_eq!(coalesce.parameter_type(3), Some(DataType::Object));
        assert_eq!(coalesce.descriptor(3).arg_types.len(), 3);
    }

    #[test]
    fn test_signature() {
        let f = FunctionMetadata::new("myfunc", DataType::String)
            .with_namespace("mynamespace")
            .with_args(&[DataType::Integer]);
        assert_eq!(f.signature(), "mynamespace.myfunc(integer) -> string");
    }

    #[test]
    fn test_procedure_input_parameters() {
        let proc = ProcedureMetadata::new("pm2.spTest8").with_parameters(vec![
            ProcedureParameter::input("inkey", DataType::Integer),
            ProcedureParameter::new("outkey", ParameterDirection::Out, DataType::Integer),
            ProcedureParameter::new("ret", ParameterDirection::Return, DataType::Integer),
        ]);
        let inputs: Vec<_> = proc.input_parameters().map(|p| p.name.as_str()).collect();
        assert_eq!(inputs, vec!["inkey"]);
        assert_eq!(proc.return_parameter().map(|p| p.name.as_str()), Some("ret"));
    }

    #[test]
    fn test_column_defaults_from_json() {
        let column: ColumnMetadata =
            serde_json::from_str(r#"{"name": "e1", "data_type": "string"}"#).unwrap();
        assert!(column.selectable);
        assert!(column.updatable);
    }
}
