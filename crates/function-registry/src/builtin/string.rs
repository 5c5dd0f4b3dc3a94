// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! String builtin function definitions

use crate::{DataType, FunctionMetadata};

use DataType::{Integer, String as Text};

/// Get all string builtin functions
pub fn all_functions() -> Vec<FunctionMetadata> {
    vec![
        FunctionMetadata::new("||", Text)
            .with_args(&[Text, Text])
            .with_description("Concatenate strings"),
        FunctionMetadata::new("concat", Text)
            .with_args(&[Text, Text])
            .with_description("Concatenate strings"),
        FunctionMetadata::new("lower", Text)
            .with_args(&[Text])
            .with_description("Convert to lowercase"),
        FunctionMetadata::new("lcase", Text)
            .with_args(&[Text])
            .with_description("Convert to lowercase"),
        FunctionMetadata::new("upper", Text)
            .with_args(&[Text])
            .with_description("Convert to uppercase"),
        FunctionMetadata::new("ucase", Text)
            .with_args(&[Text])
            .with_description("Convert to uppercase"),
        FunctionMetadata::new("trim", Text)
            .with_args(&[Text])
            .with_description("Remove leading and trailing whitespace"),
        FunctionMetadata::new("ltrim", Text)
            .with_args(&[Text])
            .with_description("Remove leading whitespace"),
        FunctionMetadata::new("rtrim", Text)
            .with_args(&[Text])
            .with_description("Remove trailing whitespace"),
        FunctionMetadata::new("length", Integer)
            .with_args(&[Text])
            .with_description("Text length"),
        FunctionMetadata::new("substring", Text)
            .with_args(&[Text, Integer])
            .with_description("Extract the rest of a string"),
        FunctionMetadata::new("substring", Text)
            .with_args(&[Text, Integer, Integer])
            .with_description("Extract substring"),
        FunctionMetadata::new("left", Text)
            .with_args(&[Text, Integer])
            .with_description("Leftmost characters"),
        FunctionMetadata::new("right", Text)
            .with_args(&[Text, Integer])
            .with_description("Rightmost characters"),
        FunctionMetadata::new("replace", Text)
            .with_args(&[Text, Text, Text])
            .with_description("Replace every occurrence of a substring"),
        FunctionMetadata::new("locate", Integer)
            .with_args(&[Text, Text])
            .with_description("Position of a substring"),
        FunctionMetadata::new("repeat", Text)
            .with_args(&[Text, Integer])
            .with_description("Repeat a string"),
    ]
}
