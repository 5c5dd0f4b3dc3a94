// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Arithmetic and numeric builtin function definitions

use crate::{DataType, FunctionMetadata};

/// Types with their own arithmetic overloads
pub const ARITHMETIC_TYPES: [DataType; 6] = [
    DataType::Integer,
    DataType::Long,
    DataType::BigInteger,
    DataType::Float,
    DataType::Double,
    DataType::BigDecimal,
];

/// Get all numeric builtin functions
pub fn all_functions() -> Vec<FunctionMetadata> {
    let mut functions = Vec::new();

    for t in ARITHMETIC_TYPES {
        for (op, desc) in [
            ("+", "Addition"),
            ("-", "Subtraction"),
            ("*", "Multiplication"),
            ("/", "Division"),
        ] {
            functions.push(
                FunctionMetadata::new(op, t)
                    .with_args(&[t, t])
                    .with_description(desc),
            );
        }
        functions.push(
            FunctionMetadata::new("abs", t)
                .with_args(&[t])
                .with_description("Absolute value"),
        );
        functions.push(
            FunctionMetadata::new("mod", t)
                .with_args(&[t, t])
                .with_description("Remainder of division"),
        );
    }

    functions.extend([
        FunctionMetadata::new("ceiling", DataType::Double)
            .with_args(&[DataType::Double])
            .with_description("Round up to nearest integer"),
        FunctionMetadata::new("floor", DataType::Double)
            .with_args(&[DataType::Double])
            .with_description("Round down to nearest integer"),
        FunctionMetadata::new("round", DataType::Double)
            .with_args(&[DataType::Double, DataType::Integer])
            .with_description("Round to the given number of places"),
        FunctionMetadata::new("round", DataType::BigDecimal)
            .with_args(&[DataType::BigDecimal, DataType::Integer])
            .with_description("Round to the given number of places"),
        FunctionMetadata::new("power", DataType::Double)
            .with_args(&[DataType::Double, DataType::Double])
            .with_description("Raise to a power"),
        FunctionMetadata::new("power", DataType::BigDecimal)
            .with_args(&[DataType::BigDecimal, DataType::Integer])
            .with_description("Raise to an integral power"),
        FunctionMetadata::new("sqrt", DataType::Double)
            .with_args(&[DataType::Double])
            .with_description("Square root"),
        FunctionMetadata::new("bitor", DataType::Integer)
            .with_args(&[DataType::Integer, DataType::Integer])
            .with_description("Bitwise OR"),
        FunctionMetadata::new("bitand", DataType::Integer)
            .with_args(&[DataType::Integer, DataType::Integer])
            .with_description("Bitwise AND"),
        FunctionMetadata::new("rand", DataType::Double).with_description("Random value"),
    ]);

    functions
}
