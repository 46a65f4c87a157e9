// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handles for elements and render roots.

use core::fmt;

/// Handle of an element in an [`ElementTree`](crate::ElementTree).
///
/// A small, copyable handle made of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On creation, a fresh slot is allocated with generation `1`.
/// - On destruction, the slot is freed; every `ElementKey` pointing at it is
///   now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new,
///   distinct `ElementKey`.
///
/// Stale keys never alias a different live element because the generation
/// must match. Use [`ElementTree::is_alive`](crate::ElementTree::is_alive) to
/// check a key.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct ElementKey(u32, u32);

impl ElementKey {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

impl fmt::Debug for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementKey({}v{})", self.0, self.1)
    }
}

/// Handle of a [`UiArea`](crate::UiArea).
///
/// Areas are never removed, so this is a plain index.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct AreaId(u32);

impl AreaId {
    pub(crate) const fn new(idx: u32) -> Self {
        Self(idx)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "area#{}", self.0)
    }
}
