// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Invalidation: deciding who has to re-render after a mutation.
//!
//! Invalidating an element walks upwards until one of these holds:
//!
//! 1. The element has rendered output and sits in a [`UiArea`](crate::UiArea).
//!    It is queued with that area on its own and the walk stops, so a dirty
//!    leaf never forces its ancestors to re-render.
//! 2. The element has an owner and has either rendered output (but no area)
//!    or is visible. The walk continues at the owner. An area owner is marked
//!    dirty as a whole.
//! 3. Neither holds. Nothing happens.
//!
//! Areas deduplicate their queues, so repeated invalidations before the next
//! [`rerender`](crate::ElementTree::rerender) cost nothing.

use crate::element::{ElementFlags, Owner};
use crate::key::ElementKey;
use crate::tree::ElementTree;

/// Whether a mutation invalidates the element it changes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Invalidation {
    /// Invalidate as usual.
    #[default]
    Invalidate,
    /// Change state only; the caller takes care of rendering.
    Suppress,
}

impl ElementTree {
    /// Marks an element as needing a re-render.
    ///
    /// Stale keys and elements being destroyed are ignored.
    pub fn invalidate(&mut self, key: ElementKey) {
        let mut current = key;
        let mut origin = None;
        loop {
            let Some(element) = self.element(current) else {
                tracing::warn!(element = ?current, "invalidate on a destroyed element");
                return;
            };
            if element.flags.contains(ElementFlags::BEING_DESTROYED) {
                return;
            }
            let rendered = element.flags.contains(ElementFlags::RENDERED);
            let owner = element.owner.clone();

            if rendered && let Some(area) = self.ui_area(current) {
                let queued = self.areas[area.idx()].add_invalidated(current);
                tracing::trace!(element = ?current, ?origin, %area, queued, "queued re-render");
                return;
            }
            if !rendered && !self.is_visible(current) {
                tracing::trace!(element = ?current, ?origin, "invisible and unrendered, ignored");
                return;
            }
            match owner {
                Some(Owner::Element { key: parent, .. }) => {
                    tracing::trace!(element = ?current, parent = ?parent, "bubbling invalidation");
                    origin = Some(current);
                    current = parent;
                }
                Some(Owner::Area(area)) => {
                    self.areas[area.idx()].invalidate_all();
                    tracing::trace!(element = ?current, ?origin, %area, "area invalidated");
                    return;
                }
                None => {
                    tracing::trace!(element = ?current, ?origin, "unowned, nothing to invalidate");
                    return;
                }
            }
        }
    }
}
