// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Class schema registry.
//!
//! This module provides [`SchemaRegistry`] for registering class descriptors
//! and looking up the resulting flattened [`ClassSchema`]s.

use core::ops::Index;

use hashbrown::HashMap;

use crate::descriptor::{AggregationDescriptor, ClassDescriptor, PropertyDescriptor};
use crate::error::{SchemaError, SchemaResult};
use crate::id::{ClassId, PropertyId};
use crate::schema::ClassSchema;
use crate::uid::UidGenerator;

/// Name of the built-in root class.
pub const ELEMENT: &str = "Element";

/// Name of the built-in renderable class.
pub const CONTROL: &str = "Control";

/// A registry of class schemas.
///
/// Classes are registered once, base classes before the classes that extend
/// them. Each registration freezes a flattened copy of the base schema, so the
/// registry never walks the base chain for lookups.
///
/// The registry also owns the per-token counters behind [`uid`](Self::uid).
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use understory_schema::{ClassDescriptor, PropertyDescriptor, SchemaRegistry};
///
/// let mut registry = SchemaRegistry::with_core_classes();
///
/// let button = registry
///     .register(
///         "Button",
///         ClassDescriptor::extending("Control")
///             .property("text", PropertyDescriptor::new("string"))
///             .event("press"),
///     )
///     .unwrap();
///
/// let schema = &registry[button];
/// assert_eq!(schema.property_defaults()["visible"], json!(true));
/// assert_eq!(schema.property_defaults()["text"], json!(""));
/// assert!(registry.is_a(button, "Control"));
/// assert_eq!(registry.uid(button), "__button0");
/// ```
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    classes: Vec<ClassSchema>,
    by_name: HashMap<String, ClassId>,
    uids: UidGenerator,
}

impl SchemaRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry whose generated ids start with `prefix`.
    #[must_use]
    pub fn with_uid_prefix(prefix: impl Into<String>) -> Self {
        Self {
            uids: UidGenerator::with_prefix(prefix),
            ..Self::default()
        }
    }

    /// Creates a registry with the built-in [`ELEMENT`] and [`CONTROL`] classes.
    ///
    /// - `Element` is the root class. It declares the multi aggregation
    ///   `dependents`, whose children are owned but never rendered.
    /// - `Control` extends `Element` with the properties `visible` (default
    ///   `true`) and `busy` (default `false`).
    #[must_use]
    pub fn with_core_classes() -> Self {
        let mut registry = Self::new();
        registry.register_core_classes();
        registry
    }

    /// Registers the built-in classes into this registry.
    ///
    /// # Panics
    ///
    /// Panics if a class named [`ELEMENT`] or [`CONTROL`] already exists.
    pub fn register_core_classes(&mut self) {
        let element = ClassDescriptor::new()
            .aggregation("dependents", AggregationDescriptor::multiple(ELEMENT));
        let control = ClassDescriptor::extending(ELEMENT)
            .property(
                "visible",
                PropertyDescriptor::new("boolean")
                    .default_value(true)
                    .group("Appearance"),
            )
            .property(
                "busy",
                PropertyDescriptor::new("boolean").group("Behavior"),
            );
        for (name, descriptor) in [(ELEMENT, element), (CONTROL, control)] {
            if let Err(err) = self.register(name, descriptor) {
                panic!("core class `{name}` failed to register: {err}");
            }
        }
    }

    /// Registers a class.
    ///
    /// The base class named by the descriptor must already be registered.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the name is taken, the base is unknown, or
    /// the descriptor is malformed.
    pub fn register(
        &mut self,
        name: &str,
        descriptor: ClassDescriptor,
    ) -> SchemaResult<ClassId> {
        if self.by_name.contains_key(name) {
            return Err(SchemaError::DuplicateClass(name.into()));
        }
        if self.classes.len() >= usize::from(u16::MAX) {
            return Err(SchemaError::TooManyClasses);
        }
        let base = match &descriptor.base_type {
            None => None,
            Some(base) => {
                let base_id = self.by_name(base).ok_or_else(|| SchemaError::UnknownBaseType {
                    class: name.into(),
                    base: base.clone(),
                })?;
                Some(&self.classes[usize::from(base_id.index())])
            }
        };

        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let id = ClassId::new(self.classes.len() as u16);
        let schema = ClassSchema::derive(id, name, base, &descriptor)?;

        tracing::debug!(
            class = name,
            base = descriptor.base_type.as_deref().unwrap_or("-"),
            properties = schema.all_properties().len(),
            aggregations = schema.all_aggregations().len(),
            "registered class schema"
        );
        self.classes.push(schema);
        self.by_name.insert(name.into(), id);
        Ok(id)
    }

    /// Registers a class from a JSON descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Malformed`] if the JSON does not describe a
    /// [`ClassDescriptor`], or any error of [`register`](Self::register).
    pub fn register_json(&mut self, name: &str, json: &str) -> SchemaResult<ClassId> {
        let descriptor: ClassDescriptor =
            serde_json::from_str(json).map_err(|err| SchemaError::Malformed {
                class: name.into(),
                message: err.to_string(),
            })?;
        self.register(name, descriptor)
    }

    /// Late-binds an additional property to an already registered class.
    ///
    /// This is how cross-cutting traits attach properties to classes they do
    /// not own. It must run before any subclass of `class` is registered:
    /// subclasses copy their base schema when they are derived, and a
    /// property added afterwards does not reach them. This ordering is not
    /// checked.
    ///
    /// Re-adding an existing name replaces its declaration in place.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownClass`] for a foreign id, or a descriptor
    /// error.
    pub fn add_property(
        &mut self,
        class: ClassId,
        name: &str,
        descriptor: PropertyDescriptor,
    ) -> SchemaResult<PropertyId> {
        let schema = self
            .classes
            .get_mut(usize::from(class.index()))
            .ok_or_else(|| SchemaError::UnknownClass(format!("{class:?}")))?;
        let id = schema.add_property(name, &descriptor)?;
        tracing::debug!(class = schema.name(), property = name, "late-bound property");
        Ok(id)
    }

    /// Returns the number of registered classes.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if no classes are registered.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Looks up a class by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    /// Returns the schema of a class.
    #[must_use]
    pub fn get(&self, id: ClassId) -> Option<&ClassSchema> {
        self.classes.get(usize::from(id.index()))
    }

    /// Returns the schema of a class by name.
    #[must_use]
    pub fn schema(&self, name: &str) -> Option<&ClassSchema> {
        self.by_name(name).and_then(|id| self.get(id))
    }

    /// Walks from `class` up to its root, starting with `class` itself.
    pub fn ancestors(&self, class: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        let mut current = self.get(class).map(ClassSchema::id);
        core::iter::from_fn(move || {
            let id = current?;
            current = self.get(id).and_then(ClassSchema::base);
            Some(id)
        })
    }

    /// Returns `true` if `class` is the class named `type_name` or derives
    /// from it. Unknown names never match.
    #[must_use]
    pub fn is_a(&self, class: ClassId, type_name: &str) -> bool {
        let Some(target) = self.by_name(type_name) else {
            return false;
        };
        self.ancestors(class).any(|id| id == target)
    }

    /// Returns a fresh, globally unique id for an instance of `class`.
    ///
    /// # Panics
    ///
    /// Panics if `class` was not produced by this registry.
    pub fn uid(&mut self, class: ClassId) -> String {
        let token = self.classes[usize::from(class.index())].uid_token();
        self.uids.next(token)
    }

    /// Returns a fresh id for an arbitrary token, sharing the class counters.
    pub fn uid_for_token(&mut self, token: &str) -> String {
        self.uids.next(token)
    }

    /// Returns `true` if `id` lies in the namespace of generated ids.
    ///
    /// Element runtimes reject such ids when they are given explicitly, so
    /// the counters alone keep generated ids unique.
    #[must_use]
    pub fn is_generated_id(&self, id: &str) -> bool {
        self.uids.is_generated(id)
    }

    /// Returns an iterator over all registered classes.
    pub fn iter(&self) -> impl Iterator<Item = &ClassSchema> {
        self.classes.iter()
    }
}

impl Index<ClassId> for SchemaRegistry {
    type Output = ClassSchema;

    fn index(&self, id: ClassId) -> &ClassSchema {
        &self.classes[usize::from(id.index())]
    }
}
