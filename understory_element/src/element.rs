// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element state held in the tree's arena.

use hashbrown::HashMap;
use understory_schema::ClassId;

use crate::event::EventRegistry;
use crate::key::{AreaId, ElementKey};
use crate::store::PropertyStore;

bitflags::bitflags! {
    /// Lifecycle state of an element.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// A render pass has produced output for the element.
        const RENDERED        = 0b0000_0001;
        /// Destruction is in progress; invalidations are ignored.
        const BEING_DESTROYED = 0b0000_0010;
    }
}

/// Where an element is owned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Owner {
    /// Held in an aggregation of another element.
    Element {
        key: ElementKey,
        aggregation: String,
    },
    /// Root content of a render area.
    Area(AreaId),
}

#[derive(Debug)]
pub(crate) struct ElementData {
    pub(crate) id: String,
    pub(crate) class: ClassId,
    pub(crate) properties: PropertyStore,
    /// Children per aggregation name. Empty lists are removed.
    pub(crate) aggregations: HashMap<String, Vec<ElementKey>>,
    /// Target ids per association name. Empty lists are removed.
    pub(crate) associations: HashMap<String, Vec<String>>,
    pub(crate) owner: Option<Owner>,
    pub(crate) events: EventRegistry,
    pub(crate) flags: ElementFlags,
}

impl ElementData {
    pub(crate) fn new(id: String, class: ClassId) -> Self {
        Self {
            id,
            class,
            properties: PropertyStore::new(),
            aggregations: HashMap::new(),
            associations: HashMap::new(),
            owner: None,
            events: EventRegistry::default(),
            flags: ElementFlags::empty(),
        }
    }

    pub(crate) fn parent(&self) -> Option<ElementKey> {
        match &self.owner {
            Some(Owner::Element { key, .. }) => Some(*key),
            _ => None,
        }
    }

    pub(crate) fn aggregation(&self, name: &str) -> &[ElementKey] {
        self.aggregations.get(name).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn association(&self, name: &str) -> &[String] {
        self.associations.get(name).map_or(&[], Vec::as_slice)
    }
}
