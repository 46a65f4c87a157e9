// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-cutting behavior shared by unrelated classes.
//!
//! A [`ClassMixin`] extends an already registered class, typically by
//! late-binding properties. Because subclass schemas are frozen when they are
//! registered, apply mixins before registering classes that derive from the
//! target.

use understory_schema::{ClassId, PropertyDescriptor, SchemaRegistry, SchemaResult, Value};

use crate::key::ElementKey;
use crate::tree::ElementTree;

/// Behavior attached to a class after registration.
pub trait ClassMixin {
    /// Extends `class` in `registry`.
    ///
    /// # Errors
    ///
    /// Returns the schema error of a rejected extension.
    fn apply(&self, registry: &mut SchemaRegistry, class: ClassId) -> SchemaResult<()>;
}

/// Adds an `enabled` flag that disabled ancestors override.
///
/// ```rust
/// use serde_json::json;
/// use understory_element::{ClassMixin, ElementTree, EnabledPropagator, Settings};
/// use understory_schema::{AggregationDescriptor, ClassDescriptor};
///
/// let mut tree = ElementTree::new();
/// let form = tree
///     .schemas_mut()
///     .register(
///         "Form",
///         ClassDescriptor::extending("Control")
///             .aggregation("fields", AggregationDescriptor::multiple("Control")),
///     )
///     .unwrap();
/// EnabledPropagator.apply(tree.schemas_mut(), form).unwrap();
///
/// let outer = tree.create("Form", None, Settings::new()).unwrap();
/// let inner = tree.create("Form", None, Settings::new()).unwrap();
/// tree.add_aggregation(outer, "fields", inner).unwrap();
/// assert_eq!(tree.get_property(inner, "enabled").unwrap(), &json!(true));
///
/// tree.set_property(outer, "enabled", false).unwrap();
/// assert_eq!(tree.get_property(inner, "enabled").unwrap(), &json!(true));
/// assert!(!EnabledPropagator::is_effectively_enabled(&tree, inner));
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct EnabledPropagator;

impl EnabledPropagator {
    /// Name of the late-bound property.
    pub const PROPERTY: &'static str = "enabled";

    /// Returns `false` if the element or any owning element carrying the
    /// property has it set to `false`.
    #[must_use]
    pub fn is_effectively_enabled(tree: &ElementTree, key: ElementKey) -> bool {
        core::iter::once(key)
            .chain(tree.ancestors(key))
            .all(|k| !matches!(tree.get_property(k, Self::PROPERTY), Ok(Value::Bool(false))))
    }
}

impl ClassMixin for EnabledPropagator {
    fn apply(&self, registry: &mut SchemaRegistry, class: ClassId) -> SchemaResult<()> {
        registry.add_property(
            class,
            Self::PROPERTY,
            PropertyDescriptor::new("boolean")
                .default_value(true)
                .group("Behavior"),
        )?;
        Ok(())
    }
}
