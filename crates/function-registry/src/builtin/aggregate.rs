// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Aggregate function definitions
//!
//! Only SUM and AVG have typed overloads. COUNT always yields integer and
//! MIN/MAX keep their argument type, so those carry `object` placeholders.

use crate::{DataType, FunctionMetadata, FunctionType};

use DataType::{BigDecimal, BigInteger, Byte, Double, Float, Integer, Long, Short};

/// Get all aggregate functions
pub fn all_functions() -> Vec<FunctionMetadata> {
    let sums = [
        (Byte, Long),
        (Short, Long),
        (Integer, Long),
        (Long, BigInteger),
        (BigInteger, BigInteger),
        (Float, Double),
        (Double, Double),
        (BigDecimal, BigDecimal),
    ];
    let avgs = [
        (Byte, Double),
        (Short, Double),
        (Integer, Double),
        (Long, Double),
        (BigInteger, BigDecimal),
        (Float, Double),
        (Double, Double),
        (BigDecimal, BigDecimal),
    ];

    let mut functions = Vec::new();
    for (arg, ret) in sums {
        functions.push(aggregate("sum", ret, arg, "Sum of values"));
    }
    for (arg, ret) in avgs {
        functions.push(aggregate("avg", ret, arg, "Average of values"));
    }
    functions.push(aggregate("count", Integer, DataType::Object, "Count the number of rows"));
    functions.push(aggregate("min", DataType::Object, DataType::Object, "Minimum value"));
    functions.push(aggregate("max", DataType::Object, DataType::Object, "Maximum value"));
    functions
}

fn aggregate(name: &str, ret: DataType, arg: DataType, desc: &str) -> FunctionMetadata {
    FunctionMetadata::new(name, ret)
        .with_args(&[arg])
        .with_type(FunctionType::Aggregate)
        .with_description(desc)
}
