// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render roots.
//!
//! A [`UiArea`] is the surface a subtree is rendered into. It owns its root
//! content the way an aggregation owns children, and it collects the work of
//! the next render pass: either "everything" (the area itself was
//! invalidated) or a deduplicated FIFO queue of individually invalidated
//! elements.

use hashbrown::{HashMap, HashSet};

use crate::element::Owner;
use crate::error::{ElementError, ElementResult};
use crate::invalidate::Invalidation;
use crate::key::{AreaId, ElementKey};
use crate::tree::ElementTree;

/// A render root and its pending work.
#[derive(Debug)]
pub struct UiArea {
    id: AreaId,
    root_id: String,
    content: Vec<ElementKey>,
    invalidated: bool,
    pending: Vec<ElementKey>,
    queued: HashSet<ElementKey>,
    output: HashMap<ElementKey, String>,
}

impl UiArea {
    fn new(id: AreaId, root_id: String) -> Self {
        Self {
            id,
            root_id,
            content: Vec::new(),
            invalidated: false,
            pending: Vec::new(),
            queued: HashSet::new(),
            output: HashMap::new(),
        }
    }

    /// Returns the handle of this area.
    #[must_use]
    pub fn id(&self) -> AreaId {
        self.id
    }

    /// Returns the id of the host surface this area renders into.
    #[must_use]
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// Returns the root content in order.
    #[must_use]
    pub fn content(&self) -> &[ElementKey] {
        &self.content
    }

    /// Returns `true` if the whole area needs to be re-rendered.
    #[must_use]
    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    /// Returns the individually queued elements in queue order.
    #[must_use]
    pub fn pending(&self) -> &[ElementKey] {
        &self.pending
    }

    /// Returns `true` if the next render pass has work here.
    #[must_use]
    pub fn needs_rerender(&self) -> bool {
        self.invalidated || !self.pending.is_empty()
    }

    /// Returns the markup last rendered for `key` as a pass root.
    #[must_use]
    pub fn output(&self, key: ElementKey) -> Option<&str> {
        self.output.get(&key).map(String::as_str)
    }

    /// Queues `key` for the next pass. Returns `false` if already queued.
    pub(crate) fn add_invalidated(&mut self, key: ElementKey) -> bool {
        if !self.queued.insert(key) {
            return false;
        }
        self.pending.push(key);
        true
    }

    /// Marks the whole area for re-rendering.
    pub(crate) fn invalidate_all(&mut self) {
        self.invalidated = true;
    }

    pub(crate) fn take_invalidated(&mut self) -> bool {
        core::mem::take(&mut self.invalidated)
    }

    pub(crate) fn take_pending(&mut self) -> Vec<ElementKey> {
        self.queued.clear();
        core::mem::take(&mut self.pending)
    }

    pub(crate) fn set_output(&mut self, key: ElementKey, markup: String) {
        self.output.insert(key, markup);
    }

    pub(crate) fn clear_output(&mut self) {
        self.output.clear();
    }

    pub(crate) fn remove_output(&mut self, key: ElementKey) -> bool {
        self.output.remove(&key).is_some()
    }

    fn remove_content(&mut self, key: ElementKey) -> bool {
        let Some(pos) = self.content.iter().position(|&k| k == key) else {
            return false;
        };
        self.content.remove(pos);
        true
    }
}

impl ElementTree {
    /// Creates a render area for the host surface `root_id`.
    pub fn create_area(&mut self, root_id: impl Into<String>) -> AreaId {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "area counts beyond u32::MAX are not supported"
        )]
        let id = AreaId::new(self.areas.len() as u32);
        self.areas.push(UiArea::new(id, root_id.into()));
        id
    }

    /// Returns an area.
    #[must_use]
    pub fn area(&self, id: AreaId) -> Option<&UiArea> {
        self.areas.get(id.idx())
    }

    /// Iterates all areas in creation order.
    pub fn areas(&self) -> impl Iterator<Item = &UiArea> {
        self.areas.iter()
    }

    /// Returns `true` if any area has work for the next render pass.
    #[must_use]
    pub fn needs_rerender(&self) -> bool {
        self.areas.iter().any(UiArea::needs_rerender)
    }

    /// Appends `key` to the root content of an area.
    ///
    /// The element is detached from any previous owner first. The area is
    /// invalidated as a whole.
    ///
    /// # Errors
    ///
    /// Fails for unknown areas and stale keys.
    pub fn add_area_content(&mut self, area: AreaId, key: ElementKey) -> ElementResult<()> {
        if self.area(area).is_none() {
            return Err(ElementError::UnknownArea(area));
        }
        self.live(key)?;
        self.detach(key, Invalidation::Invalidate);
        self.data_mut(key)?.owner = Some(Owner::Area(area));
        let target = &mut self.areas[area.idx()];
        target.content.push(key);
        target.invalidate_all();
        Ok(())
    }

    /// Removes `key` from the root content of an area without destroying it.
    ///
    /// Returns `false` if it was not part of that area's content.
    pub fn remove_area_content(&mut self, area: AreaId, key: ElementKey) -> bool {
        let owned = matches!(
            self.element(key).and_then(|e| e.owner.as_ref()),
            Some(Owner::Area(owner)) if *owner == area
        );
        owned && self.detach(key, Invalidation::Invalidate).is_some()
    }

    /// Returns the area the element is rendered into, walking up its owners.
    #[must_use]
    pub fn ui_area(&self, key: ElementKey) -> Option<AreaId> {
        let mut current = key;
        loop {
            match self.element(current)?.owner.as_ref()? {
                Owner::Element { key, .. } => current = *key,
                Owner::Area(area) => return Some(*area),
            }
        }
    }

    /// Removes `key` from its owner's storage and clears its back-reference.
    ///
    /// Returns the previous owner. Invalidates it unless suppressed.
    ///
    /// Output stored for the element or its descendants on their area is
    /// dropped, since it no longer describes anything rendered there.
    pub(crate) fn detach(&mut self, key: ElementKey, invalidation: Invalidation) -> Option<Owner> {
        self.drop_subtree_output(key);
        let owner = self.element_mut(key)?.owner.take()?;
        match &owner {
            Owner::Element {
                key: parent,
                aggregation,
            } => {
                if let Some(parent_data) = self.element_mut(*parent)
                    && let Some(children) = parent_data.aggregations.get_mut(aggregation)
                {
                    children.retain(|&child| child != key);
                    if children.is_empty() {
                        parent_data.aggregations.remove(aggregation);
                    }
                }
                if invalidation == Invalidation::Invalidate {
                    self.invalidate(*parent);
                }
            }
            Owner::Area(area) => {
                let area = &mut self.areas[area.idx()];
                area.remove_content(key);
                if invalidation == Invalidation::Invalidate {
                    area.invalidate_all();
                }
            }
        }
        Some(owner)
    }

    fn drop_subtree_output(&mut self, key: ElementKey) {
        let Some(area) = self.ui_area(key) else {
            return;
        };
        if self.areas[area.idx()].output.is_empty() {
            return;
        }
        let mut keys = self.find_aggregated_objects(key);
        keys.push(key);
        let area = &mut self.areas[area.idx()];
        for key in keys {
            area.remove_output(key);
        }
    }
}
