// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Scalar types
//!
//! The closed set of scalar types a resolved symbol can carry.
//!
//! Type names are lowercase in both the printed form (`convert(e2, string)`)
//! and the serialized form used by catalog documents. [`DataType::Null`] is
//! the internal type of an untyped `NULL` literal and never appears in
//! catalog metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Char,
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    BigInteger,
    Float,
    Double,
    BigDecimal,
    Date,
    Time,
    Timestamp,
    Object,
    Blob,
    Clob,
    Xml,
    Varbinary,
    Null,
}

impl DataType {
    /// Every type, in declaration order
    pub const ALL: [DataType; 20] = [
        DataType::String,
        DataType::Char,
        DataType::Boolean,
        DataType::Byte,
        DataType::Short,
        DataType::Integer,
        DataType::Long,
        DataType::BigInteger,
        DataType::Float,
        DataType::Double,
        DataType::BigDecimal,
        DataType::Date,
        DataType::Time,
        DataType::Timestamp,
        DataType::Object,
        DataType::Blob,
        DataType::Clob,
        DataType::Xml,
        DataType::Varbinary,
        DataType::Null,
    ];

    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Char => "char",
            DataType::Boolean => "boolean",
            DataType::Byte => "byte",
            DataType::Short => "short",
            DataType::Integer => "integer",
            DataType::Long => "long",
            DataType::BigInteger => "biginteger",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::BigDecimal => "bigdecimal",
            DataType::Date => "date",
            DataType::Time => "time",
            DataType::Timestamp => "timestamp",
            DataType::Object => "object",
            DataType::Blob => "blob",
            DataType::Clob => "clob",
            DataType::Xml => "xml",
            DataType::Varbinary => "varbinary",
            DataType::Null => "null",
        }
    }

    /// Look up a type by name, accepting the common SQL aliases
    ///
    /// # Examples
    ///
    /// ```
    /// use sql_resolver_ir::DataType;
    ///
    /// assert_eq!(DataType::from_name("VARCHAR"), Some(DataType::String));
    /// assert_eq!(DataType::from_name("bigint"), Some(DataType::Long));
    /// assert_eq!(DataType::from_name("geometry"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let data_type = match lower.as_str() {
            "string" | "varchar" | "text" => DataType::String,
            "char" | "character" => DataType::Char,
            "boolean" | "bool" => DataType::Boolean,
            "byte" | "tinyint" => DataType::Byte,
            "short" | "smallint" => DataType::Short,
            "integer" | "int" => DataType::Integer,
            "long" | "bigint" => DataType::Long,
            "biginteger" => DataType::BigInteger,
            "float" | "real" => DataType::Float,
            "double" => DataType::Double,
            "bigdecimal" | "decimal" | "numeric" => DataType::BigDecimal,
            "date" => DataType::Date,
            "time" => DataType::Time,
            "timestamp" => DataType::Timestamp,
            "object" => DataType::Object,
            "blob" => DataType::Blob,
            "clob" => DataType::Clob,
            "xml" => DataType::Xml,
            "varbinary" => DataType::Varbinary,
            "null" => DataType::Null,
            _ => return None,
        };
        Some(data_type)
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_rank().is_some()
    }

    /// Exact whole-number types
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            DataType::Byte
                | DataType::Short
                | DataType::Integer
                | DataType::Long
                | DataType::BigInteger
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, DataType::Date | DataType::Time | DataType::Timestamp)
    }

    pub fn is_string_like(&self) -> bool {
        matches!(self, DataType::String | DataType::Char | DataType::Clob)
    }

    /// Position on the numeric widening chain, narrowest first
    pub fn numeric_rank(&self) -> Option<u32> {
        match self {
            DataType::Byte => Some(1),
            DataType::Short => Some(2),
            DataType::Integer => Some(3),
            DataType::Long => Some(4),
            DataType::BigInteger => Some(5),
            DataType::Float => Some(6),
            DataType::Double => Some(7),
            DataType::BigDecimal => Some(8),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for data_type in DataType::ALL {
            assert_eq!(DataType::from_name(data_type.name()), Some(data_type));
        }
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&DataType::BigDecimal).unwrap();
        assert_eq!(json, "\"bigdecimal\"");
        let parsed: DataType = serde_json::from_str("\"timestamp\"").unwrap();
        assert_eq!(parsed, DataType::Timestamp);
    }

    #[test]
    fn test_integral_and_numeric() {
        assert!(DataType::Short.is_integral());
        assert!(!DataType::Double.is_integral());
        assert!(DataType::Double.is_numeric());
        assert!(!DataType::String.is_numeric());
        assert!(DataType::Byte.numeric_rank() < DataType::BigDecimal.numeric_rank());
    }
}
