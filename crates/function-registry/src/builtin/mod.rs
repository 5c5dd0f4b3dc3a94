// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Builtin SQL function definitions
//!
//! Overloads are listed one signature per entry. Arithmetic is declared per
//! numeric type so overload scoring picks the narrowest common type.

pub mod aggregate;
pub mod numeric;
pub mod string;
pub mod system;

use crate::FunctionMetadata;

/// Every builtin signature
pub fn all_functions() -> Vec<FunctionMetadata> {
    let mut functions = numeric::all_functions();
    functions.extend(string::all_functions());
    functions.extend(system::all_functions());
    functions.extend(aggregate::all_functions());
    functions
}
