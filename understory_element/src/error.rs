// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for element trees and render passes.

use thiserror::Error;
use understory_schema::{Multiplicity, SchemaError, Value};

use crate::key::{AreaId, ElementKey};

/// Errors raised by element construction and mutation.
///
/// Configuration problems (unknown settings keys, values that cannot be
/// coerced) and programming errors (unknown member names, stale keys) end up
/// here. Expected misses such as removing a child that is not owned are
/// reported through `Option`/`bool` return values instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElementError {
    /// The key is stale or was never issued by this tree.
    #[error("element {0:?} does not exist")]
    UnknownElement(ElementKey),

    /// The area id was never issued by this tree.
    #[error("{0} does not exist")]
    UnknownArea(AreaId),

    /// No class with this name is registered.
    #[error("unknown class `{0}`")]
    UnknownClass(String),

    /// The class declares no property with this name.
    #[error("class `{class}` has no property `{property}`")]
    UnknownProperty {
        /// Class of the element.
        class: String,
        /// Requested property.
        property: String,
    },

    /// The class declares no aggregation with this name.
    #[error("class `{class}` has no aggregation `{aggregation}`")]
    UnknownAggregation {
        /// Class of the element.
        class: String,
        /// Requested aggregation.
        aggregation: String,
    },

    /// The class declares no association with this name.
    #[error("class `{class}` has no association `{association}`")]
    UnknownAssociation {
        /// Class of the element.
        class: String,
        /// Requested association.
        association: String,
    },

    /// The class declares no event with this name.
    #[error("class `{class}` has no event `{event}`")]
    UnknownEvent {
        /// Class of the element.
        class: String,
        /// Requested event.
        event: String,
    },

    /// A settings key resolves to nothing on the class.
    #[error("class `{class}` has no setting `{key}`")]
    UnknownSetting {
        /// Class of the element.
        class: String,
        /// The unresolved key.
        key: String,
    },

    /// A settings value does not fit what its key resolved to.
    #[error("invalid value for setting `{key}` of `{class}`: {reason}")]
    InvalidSetting {
        /// Class of the element.
        class: String,
        /// The settings key.
        key: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// Settings content was given but the class has no default aggregation.
    #[error("class `{0}` has no default aggregation for settings content")]
    NoDefaultAggregation(String),

    /// A single-valued operation was used on a multi-valued member or vice versa.
    #[error("`{class}.{name}` is {expected:?}-valued")]
    MultiplicityMismatch {
        /// Class of the element.
        class: String,
        /// Member name.
        name: String,
        /// The declared multiplicity.
        expected: Multiplicity,
    },

    /// The child class does not match the aggregation's element type.
    #[error("aggregation `{aggregation}` expects `{expected}`, got `{actual}`")]
    AggregationTypeMismatch {
        /// Aggregation name.
        aggregation: String,
        /// Declared element type.
        expected: String,
        /// Class of the rejected child.
        actual: String,
    },

    /// The child is the owner or one of its ancestors.
    #[error("adding {child:?} below {owner:?} would create a cycle")]
    WouldCreateCycle {
        /// Prospective owner.
        owner: ElementKey,
        /// Rejected child.
        child: ElementKey,
    },

    /// An explicit id is not a valid identifier.
    #[error("`{0}` is not a valid element id")]
    InvalidId(String),

    /// An explicit id is already in use.
    #[error("element id `{0}` is already in use")]
    DuplicateId(String),

    /// An explicit id lies in the namespace of generated ids.
    #[error("element id `{0}` uses the prefix reserved for generated ids")]
    ReservedId(String),

    /// A late-bound schema change failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Result type for element operations.
pub type ElementResult<T> = Result<T, ElementError>;

/// Errors raised during a render pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// No renderer is registered for the class or any of its bases.
    #[error("no renderer registered for `{class}` (element `{id}`)")]
    NoRenderer {
        /// Id of the element.
        id: String,
        /// Class of the element.
        class: String,
    },

    /// A renderer reported a failure.
    #[error("renderer for `{id}` failed: {message}")]
    Failed {
        /// Id of the element being rendered.
        id: String,
        /// Renderer message.
        message: String,
    },

    /// A renderer read a member that does not exist.
    #[error(transparent)]
    Element(#[from] ElementError),
}

impl RenderError {
    /// Convenience constructor for renderer failures.
    pub fn failed(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            id: id.into(),
            message: message.into(),
        }
    }
}

pub(crate) fn unexpected_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(_) => "a boolean".to_owned(),
        Value::Number(_) => "a number".to_owned(),
        Value::String(_) => "a string".to_owned(),
        Value::Array(_) => "an array".to_owned(),
        Value::Object(_) => "an object".to_owned(),
    }
}
