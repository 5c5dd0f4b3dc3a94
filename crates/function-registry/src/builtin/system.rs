// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Date/time, null-handling and system builtin function definitions
//!
//! `convert`, `cast` and `lookup` are registered so they count as known
//! names; the resolver types them as special forms.

use crate::{DataType, FunctionMetadata};

/// Types with their own `ifnull`/`coalesce` overloads
const NULLABLE_TYPES: [DataType; 12] = [
    DataType::String,
    DataType::Boolean,
    DataType::Short,
    DataType::Integer,
    DataType::Long,
    DataType::BigInteger,
    DataType::Double,
    DataType::BigDecimal,
    DataType::Date,
    DataType::Time,
    DataType::Timestamp,
    DataType::Object,
];

/// Get all date/time and system builtin functions
pub fn all_functions() -> Vec<FunctionMetadata> {
    let mut functions = vec![
        FunctionMetadata::new("now", DataType::Timestamp)
            .with_description("Current date and time"),
        FunctionMetadata::new("curdate", DataType::Date).with_description("Current date"),
        FunctionMetadata::new("curtime", DataType::Time).with_description("Current time"),
        FunctionMetadata::new("parsedate", DataType::Date)
            .with_args(&[DataType::String, DataType::String])
            .with_description("Parse a date with a format"),
        FunctionMetadata::new("formatdate", DataType::String)
            .with_args(&[DataType::Date, DataType::String])
            .with_description("Format a date"),
        FunctionMetadata::new("formattimestamp", DataType::String)
            .with_args(&[DataType::Timestamp, DataType::String])
            .with_description("Format a timestamp"),
        FunctionMetadata::new("timestampadd", DataType::Timestamp)
            .with_args(&[DataType::String, DataType::Integer, DataType::Timestamp])
            .with_description("Add an interval to a timestamp"),
        FunctionMetadata::new("user", DataType::String)
            .with_description("Name of the current user"),
        FunctionMetadata::new("convert", DataType::Object)
            .with_args(&[DataType::Object, DataType::String])
            .with_description("Convert a value to the named type"),
        FunctionMetadata::new("cast", DataType::Object)
            .with_args(&[DataType::Object, DataType::String])
            .with_description("Convert a value to the named type"),
        FunctionMetadata::new("lookup", DataType::Object)
            .with_args(&[
                DataType::String,
                DataType::String,
                DataType::String,
                DataType::Object,
            ])
            .with_description("Look up a value in a code table"),
    ];

    for (name, desc) in [
        ("year", "Year of a date"),
        ("month", "Month of a date"),
        ("dayofmonth", "Day of the month"),
    ] {
        for t in [DataType::Date, DataType::Timestamp] {
            functions.push(
                FunctionMetadata::new(name, DataType::Integer)
                    .with_args(&[t])
                    .with_description(desc),
            );
        }
    }

    for t in NULLABLE_TYPES {
        functions.push(
            FunctionMetadata::new("ifnull", t)
                .with_args(&[t, t])
                .with_description("Return the second value if the first is null"),
        );
        functions.push(
            FunctionMetadata::new("nvl", t)
                .with_args(&[t, t])
                .with_description("Return the second value if the first is null"),
        );
        functions.push(
            FunctionMetadata::new("coalesce", t)
                .with_args(&[t, t])
                .with_varargs()
                .with_description("Return the first non-null value"),
        );
    }

    functions
}
