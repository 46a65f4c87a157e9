// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element sparse property storage.
//!
//! Only explicitly set values are stored. Reads of unset properties fall back
//! to the class schema's defaults, which keeps elements small and lets
//! late-bound properties reach elements that already exist.
//!
//! Entries live in a `SmallVec` sorted by [`PropertyId`] and are found by
//! binary search: contiguous, no hash buckets, and O(log n) for the handful of
//! properties a typical element sets.

use smallvec::SmallVec;
use understory_schema::{ClassSchema, PropertyId, Value};

/// Default inline capacity for property entries.
///
/// Most elements set fewer than 8 non-default properties, so this avoids heap
/// allocation in the common case.
const INLINE_CAPACITY: usize = 8;

/// Sparse storage of explicitly set property values.
#[derive(Clone, Debug, Default)]
pub(crate) struct PropertyStore {
    entries: SmallVec<[(PropertyId, Value); INLINE_CAPACITY]>,
}

impl PropertyStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    fn find(&self, id: PropertyId) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&id, |(pid, _)| *pid)
    }

    /// Returns the explicitly set value, if any.
    pub(crate) fn get(&self, id: PropertyId) -> Option<&Value> {
        self.find(id).ok().map(|idx| &self.entries[idx].1)
    }

    /// Returns the stored value, or the schema default.
    ///
    /// Returns `None` only for ids the schema does not know.
    pub(crate) fn get_effective<'a>(
        &'a self,
        id: PropertyId,
        schema: &'a ClassSchema,
    ) -> Option<&'a Value> {
        self.get(id)
            .or_else(|| schema.property_by_id(id).map(|p| p.default_value()))
    }

    /// Stores a value, returning the previous explicit value.
    pub(crate) fn set(&mut self, id: PropertyId, value: Value) -> Option<Value> {
        match self.find(id) {
            Ok(idx) => Some(core::mem::replace(&mut self.entries[idx].1, value)),
            Err(idx) => {
                self.entries.insert(idx, (id, value));
                None
            }
        }
    }

    /// Removes the explicit value so the default shows through again.
    pub(crate) fn clear(&mut self, id: PropertyId) -> bool {
        if let Ok(idx) = self.find(id) {
            self.entries.remove(idx);
            true
        } else {
            false
        }
    }

    /// Iterates explicit values in id order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (PropertyId, &Value)> + '_ {
        self.entries.iter().map(|(id, value)| (*id, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use understory_schema::{ClassDescriptor, PropertyDescriptor, SchemaRegistry};

    fn schema() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .register(
                "Box",
                ClassDescriptor::new()
                    .property("width", PropertyDescriptor::new("float").default_value(10.0))
                    .property("label", PropertyDescriptor::new("string")),
            )
            .unwrap();
        registry
    }

    #[test]
    fn unset_reads_default() {
        let registry = schema();
        let schema = registry.schema("Box").unwrap();
        let width = schema.property_id("width").unwrap();
        let store = PropertyStore::new();

        assert!(store.get(width).is_none());
        assert_eq!(store.get_effective(width, schema), Some(&json!(10.0)));
        assert_eq!(store.get_effective(PropertyId::new(99), schema), None);
    }

    #[test]
    fn set_replace_clear() {
        let registry = schema();
        let schema = registry.schema("Box").unwrap();
        let width = schema.property_id("width").unwrap();
        let label = schema.property_id("label").unwrap();
        let mut store = PropertyStore::new();

        assert_eq!(store.set(label, json!("a")), None);
        assert_eq!(store.set(width, json!(5.0)), None);
        assert_eq!(store.set(width, json!(6.0)), Some(json!(5.0)));
        assert_eq!(store.len(), 2);

        // Sorted by id regardless of insertion order.
        let ids: Vec<_> = store.iter().map(|(id, _)| id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));

        assert!(store.clear(width));
        assert!(!store.clear(width));
        assert_eq!(store.get_effective(width, schema), Some(&json!(10.0)));
    }
}
