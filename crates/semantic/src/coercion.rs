// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Type lattice
//!
//! Implicit and explicit conversion rules between scalar types.
//!
//! ## Costs
//!
//! Implicit conversions carry a cost used to rank function overloads and to
//! pick common types:
//!
//! | from            | to                   | cost             |
//! |-----------------|----------------------|------------------|
//! | `null`          | anything             | 0                |
//! | numeric         | wider numeric        | rank difference  |
//! | boolean         | numeric              | rank of target   |
//! | char            | string               | 1                |
//! | date, time      | timestamp            | 1                |
//! | string          | clob                 | 1                |
//! | other scalars   | string               | 20               |
//! | anything        | object               | 100              |
//!
//! The numeric ranks run byte, short, integer, long, biginteger, float,
//! double, bigdecimal. `biginteger` to `float`/`double` and `long` to
//! `float` lose precision and are explicit only.
//!
//! String is an island: string to any other type is explicit only. The
//! literal exceptions (parsable string literals, narrowed integral literals)
//! apply to literal expressions and live in the expression resolver.

use sql_resolver_ir::DataType;

const STRING_COST: u32 = 20;
const OBJECT_COST: u32 = 100;

/// Conversion rules plus the designated default type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeLattice {
    default_type: DataType,
}

impl Default for TypeLattice {
    fn default() -> Self {
        Self::new(DataType::String)
    }
}

impl TypeLattice {
    pub fn new(default_type: DataType) -> Self {
        Self { default_type }
    }

    /// Type used when nothing in context determines one
    pub fn default_type(&self) -> DataType {
        self.default_type
    }

    /// Cost of an implicit conversion, `None` if there is none
    ///
    /// # Examples
    ///
    /// ```
    /// use sql_resolver_semantic::TypeLattice;
    /// use sql_resolver_ir::DataType;
    ///
    /// let lattice = TypeLattice::default();
    /// assert_eq!(lattice.implicit_conversion_cost(DataType::Integer, DataType::Long), Some(1));
    /// assert_eq!(lattice.implicit_conversion_cost(DataType::String, DataType::Integer), None);
    /// ```
    pub fn implicit_conversion_cost(&self, from: DataType, to: DataType) -> Option<u32> {
        use DataType::*;

        if from == to || from == Null {
            return Some(0);
        }
        if to == Null {
            return None;
        }
        if to == Object {
            return Some(OBJECT_COST);
        }
        match (from, to) {
            (Boolean, t) if t.is_numeric() => t.numeric_rank(),
            (Char, String) | (Date | Time, Timestamp) | (String, Clob) => Some(1),
            (f, t) if f.is_numeric() && t.is_numeric() => numeric_widening(f, t),
            (Clob | Blob | Xml | Varbinary | Object, String) => None,
            (_, String) => Some(STRING_COST),
            _ => None,
        }
    }

    pub fn can_implicitly_convert(&self, from: DataType, to: DataType) -> bool {
        self.implicit_conversion_cost(from, to).is_some()
    }

    /// Whether `convert(x, to)` is valid for an `x` of type `from`
    pub fn can_explicitly_convert(&self, from: DataType, to: DataType) -> bool {
        use DataType::*;

        if self.can_implicitly_convert(from, to) {
            return true;
        }
        match (from, to) {
            (_, Null) => false,
            (String | Char | Clob | Object, _) => true,
            (f, t) if f.is_numeric() && (t.is_numeric() || t == Boolean) => true,
            (Timestamp, Date | Time) => true,
            (Xml, String) | (Blob, Varbinary) | (Varbinary, Blob) => true,
            _ => false,
        }
    }

    /// Smallest-cost type every input converts to
    ///
    /// NULLs are ignored; with nothing else present the default type is
    /// returned. Types already among the inputs are preferred, in input
    /// order on equal cost, then string, then object.
    ///
    /// # Examples
    ///
    /// ```
    /// use sql_resolver_semantic::TypeLattice;
    /// use sql_resolver_ir::DataType::*;
    ///
    /// let lattice = TypeLattice::default();
    /// assert_eq!(lattice.common_type(&[Integer, Null, Double]), Some(Double));
    /// assert_eq!(lattice.common_type(&[Integer, String]), Some(String));
    /// assert_eq!(lattice.common_type(&[Null]), Some(String));
    /// ```
    pub fn common_type(&self, types: &[DataType]) -> Option<DataType> {
        let mut present: Vec<DataType> = Vec::new();
        for t in types {
            if *t != DataType::Null && !present.contains(t) {
                present.push(*t);
            }
        }
        if present.is_empty() {
            return Some(self.default_type);
        }

        let total = |target: DataType| {
            present.iter().try_fold(0u32, |acc, t| {
                Some(acc + self.implicit_conversion_cost(*t, target)?)
            })
        };
        present
            .iter()
            .filter_map(|t| total(*t).map(|cost| (cost, *t)))
            .min_by_key(|(cost, _)| *cost)
            .map(|(_, t)| t)
            .or_else(|| total(DataType::String).map(|_| DataType::String))
            .or_else(|| total(DataType::Object).map(|_| DataType::Object))
    }
}

fn numeric_widening(from: DataType, to: DataType) -> Option<u32> {
    let (from_rank, to_rank) = (from.numeric_rank()?, to.numeric_rank()?);
    if to_rank <= from_rank {
        return None;
    }
    match (from, to) {
        (DataType::BigInteger, DataType::Float | DataType::Double)
        | (DataType::Long, DataType::Float) => None,
        _ => Some(to_rank - from_rank),
    }
}
