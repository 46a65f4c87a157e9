// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Class and property identification types.
//!
//! This module provides [`ClassId`] for identifying a registered class schema
//! and [`PropertyId`] for identifying a property within one class's flattened
//! property list.

use core::fmt;

/// A runtime class identifier.
///
/// This is a lightweight handle (u16) that uniquely identifies a class schema
/// within a [`SchemaRegistry`](crate::SchemaRegistry).
///
/// # Example
///
/// ```rust
/// use understory_schema::ClassId;
///
/// let id = ClassId::new(3);
/// assert_eq!(id.index(), 3);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(u16);

impl ClassId {
    /// Creates a new class ID from the given index.
    ///
    /// This is typically called by [`SchemaRegistry::register`](crate::SchemaRegistry::register)
    /// rather than directly.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the underlying index of this class ID.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassId").field(&self.0).finish()
    }
}

/// A property identifier, local to one class schema.
///
/// Ids index the class's flattened property list: ancestor properties come
/// first, then the class's own declarations. An id is only meaningful
/// together with the [`ClassSchema`](crate::ClassSchema) that produced it.
/// Properties late-bound with
/// [`SchemaRegistry::add_property`](crate::SchemaRegistry::add_property) are
/// appended, so existing ids stay valid.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(u16);

impl PropertyId {
    /// Creates a new property ID from the given index.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the underlying index of this property ID.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyId").field(&self.0).finish()
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyId({})", self.0)
    }
}
