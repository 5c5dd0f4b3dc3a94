// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Literal values
//!
//! Typed literal payloads carried by [`Constant`](crate::Constant) nodes,
//! plus the lexical parsing used for procedure parameter defaults and for
//! string literals compared against non-string columns.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::types::DataType;

/// Errors raised while interpreting literal text
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("'{text}' cannot be interpreted as a value of type {target}")]
    Unparsable { text: String, target: DataType },
}

/// A literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    /// Digits of an integer too large for 64 bits
    BigInteger(String),
    Double(f64),
    BigDecimal(Decimal),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Type a literal gets before any context is applied
    ///
    /// Integers that fit in 32 bits are `integer`, wider ones `long`.
    pub fn natural_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Null,
            Value::Boolean(_) => DataType::Boolean,
            Value::Integer(v) => {
                if i32::try_from(*v).is_ok() {
                    DataType::Integer
                } else {
                    DataType::Long
                }
            }
            Value::BigInteger(_) => DataType::BigInteger,
            Value::Double(_) => DataType::Double,
            Value::BigDecimal(_) => DataType::BigDecimal,
            Value::String(_) => DataType::String,
            Value::Date(_) => DataType::Date,
            Value::Time(_) => DataType::Time,
            Value::Timestamp(_) => DataType::Timestamp,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether an exact integral literal is representable in `target`
    /// without loss
    pub fn fits_integral(&self, target: DataType) -> bool {
        let Value::Integer(v) = self else {
            return false;
        };
        match target {
            DataType::Byte => i8::try_from(*v).is_ok(),
            DataType::Short => i16::try_from(*v).is_ok(),
            DataType::Integer => i32::try_from(*v).is_ok(),
            DataType::Long | DataType::BigInteger => true,
            _ => false,
        }
    }

    /// Parse literal text as a value of `target`
    ///
    /// # Examples
    ///
    /// ```
    /// use sql_resolver_ir::{DataType, Value};
    ///
    /// let date = Value::parse_as("2003-02-27", DataType::Date).unwrap();
    /// assert_eq!(date.to_string(), "{d'2003-02-27'}");
    /// assert!(Value::parse_as("abc", DataType::Integer).is_err());
    /// ```
    pub fn parse_as(text: &str, target: DataType) -> Result<Value, ValueError> {
        let unparsable = || ValueError::Unparsable {
            text: text.to_string(),
            target,
        };
        let trimmed = text.trim();

        match target {
            DataType::String
            | DataType::Char
            | DataType::Clob
            | DataType::Xml
            | DataType::Object => Ok(Value::String(text.to_string())),
            DataType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                _ => Err(unparsable()),
            },
            DataType::Byte | DataType::Short | DataType::Integer | DataType::Long => {
                let parsed = i64::from_str(trimmed).map_err(|_| unparsable())?;
                let value = Value::Integer(parsed);
                if value.fits_integral(target) {
                    Ok(value)
                } else {
                    Err(unparsable())
                }
            }
            DataType::BigInteger => {
                let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(unparsable());
                }
                match i64::from_str(trimmed) {
                    Ok(v) => Ok(Value::Integer(v)),
                    Err(_) => Ok(Value::BigInteger(trimmed.to_string())),
                }
            }
            DataType::Float | DataType::Double => f64::from_str(trimmed)
                .map(Value::Double)
                .map_err(|_| unparsable()),
            DataType::BigDecimal => Decimal::from_str(trimmed)
                .map(Value::BigDecimal)
                .map_err(|_| unparsable()),
            DataType::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| unparsable()),
            DataType::Time => NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
                .map(Value::Time)
                .map_err(|_| unparsable()),
            DataType::Timestamp => NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f")
                .map(Value::Timestamp)
                .map_err(|_| unparsable()),
            DataType::Blob | DataType::Varbinary | DataType::Null => Err(unparsable()),
        }
    }
}
