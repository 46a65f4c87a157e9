// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Schema definition errors.

use serde_json::Value;
use thiserror::Error;

/// Errors raised while defining or extending class schemas.
///
/// All of these are configuration errors: they surface at definition time and
/// indicate a malformed descriptor rather than a runtime condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A class with this name is already registered.
    #[error("class `{0}` is already registered")]
    DuplicateClass(String),

    /// The descriptor names a base class that is not registered.
    #[error("class `{class}` extends unknown base class `{base}`")]
    UnknownBaseType {
        /// The class being registered.
        class: String,
        /// The missing base class.
        base: String,
    },

    /// A lookup by class name failed.
    #[error("unknown class `{0}`")]
    UnknownClass(String),

    /// A property declares a type tag this registry does not understand.
    #[error("property `{class}.{property}` has unknown type `{type_tag}`")]
    UnknownType {
        /// Declaring class.
        class: String,
        /// Property name.
        property: String,
        /// The offending type tag.
        type_tag: String,
    },

    /// An enumeration property declares no values.
    #[error("enum property `{class}.{property}` declares no values")]
    EmptyEnum {
        /// Declaring class.
        class: String,
        /// Property name.
        property: String,
    },

    /// A declared default value does not fit the property type.
    #[error("default value {value} of `{class}.{property}` is not a valid `{type_tag}`")]
    InvalidDefault {
        /// Declaring class.
        class: String,
        /// Property name.
        property: String,
        /// Declared type tag.
        type_tag: String,
        /// The rejected default.
        value: Value,
    },

    /// The default aggregation names an aggregation the class does not have.
    #[error("default aggregation `{aggregation}` of `{class}` is not an aggregation")]
    UnknownDefaultAggregation {
        /// Declaring class.
        class: String,
        /// The missing aggregation.
        aggregation: String,
    },

    /// The descriptor could not be parsed.
    #[error("malformed descriptor for `{class}`: {message}")]
    Malformed {
        /// Class being parsed.
        class: String,
        /// Parser message.
        message: String,
    },

    /// More classes than a [`ClassId`](crate::ClassId) can address.
    #[error("too many classes registered (max {max})", max = u16::MAX)]
    TooManyClasses,

    /// More properties than a [`PropertyId`](crate::PropertyId) can address.
    #[error("too many properties on `{0}` (max {max})", max = u16::MAX)]
    TooManyProperties(String),
}

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
