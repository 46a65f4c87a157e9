// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Aggregation mutators: owned children.
//!
//! An element is owned by at most one aggregation (or area) at a time.
//! Placing an owned element somewhere else detaches it from its old owner
//! first; that owner is invalidated like on an explicit remove.

use understory_schema::Multiplicity;

use crate::element::Owner;
use crate::error::{ElementError, ElementResult};
use crate::invalidate::Invalidation;
use crate::key::ElementKey;
use crate::tree::ElementTree;

impl ElementTree {
    /// Resolves an aggregation and returns its element type.
    fn checked_aggregation(
        &self,
        key: ElementKey,
        name: &str,
        multiplicity: Option<Multiplicity>,
    ) -> ElementResult<String> {
        let schema = self.schema_of(key)?;
        let info = schema
            .aggregation(name)
            .ok_or_else(|| ElementError::UnknownAggregation {
                class: schema.name().to_owned(),
                aggregation: name.to_owned(),
            })?;
        if let Some(expected) = multiplicity
            && info.multiplicity() != expected
        {
            return Err(ElementError::MultiplicityMismatch {
                class: schema.name().to_owned(),
                name: name.to_owned(),
                expected: info.multiplicity(),
            });
        }
        Ok(info.element_type().to_owned())
    }

    /// Checks that `child` may be placed into `owner.name`.
    fn check_child(
        &self,
        owner: ElementKey,
        name: &str,
        element_type: &str,
        child: ElementKey,
    ) -> ElementResult<()> {
        let class = self.live(child)?.class;
        if !self.schemas.is_a(class, element_type) {
            return Err(ElementError::AggregationTypeMismatch {
                aggregation: name.to_owned(),
                expected: element_type.to_owned(),
                actual: self.schemas[class].name().to_owned(),
            });
        }
        if child == owner || self.ancestors(owner).any(|a| a == child) {
            return Err(ElementError::WouldCreateCycle { owner, child });
        }
        Ok(())
    }

    /// Links an unowned `child` into `owner.name` without checks.
    pub(crate) fn attach(
        &mut self,
        owner: ElementKey,
        name: &str,
        child: ElementKey,
        index: Option<usize>,
    ) {
        if let Some(parent) = self.element_mut(owner) {
            let children = parent.aggregations.entry_ref(name).or_default();
            match index {
                Some(i) => children.insert(i.min(children.len()), child),
                None => children.push(child),
            }
        }
        if let Some(child) = self.element_mut(child) {
            child.owner = Some(Owner::Element {
                key: owner,
                aggregation: name.to_owned(),
            });
        }
    }

    fn invalidate_unless(&mut self, key: ElementKey, invalidation: Invalidation) {
        if invalidation == Invalidation::Invalidate {
            self.invalidate(key);
        }
    }

    /// Returns the children of an aggregation in order.
    ///
    /// Single aggregations yield zero or one child.
    ///
    /// # Errors
    ///
    /// Fails for stale keys and unknown aggregations.
    pub fn get_aggregation(&self, key: ElementKey, name: &str) -> ElementResult<&[ElementKey]> {
        self.checked_aggregation(key, name, None)?;
        Ok(self.live(key)?.aggregation(name))
    }

    /// Sets the child of a single aggregation, invalidating the owner.
    ///
    /// # Errors
    ///
    /// See [`set_aggregation_with`](Self::set_aggregation_with).
    pub fn set_aggregation(
        &mut self,
        key: ElementKey,
        name: &str,
        child: Option<ElementKey>,
    ) -> ElementResult<()> {
        self.set_aggregation_with(key, name, child, Invalidation::Invalidate)
    }

    /// Sets or clears the child of a single aggregation.
    ///
    /// A previous child is detached, not destroyed. Setting the current
    /// child again is a no-op.
    ///
    /// # Errors
    ///
    /// Fails for stale keys, unknown or multi aggregations, children of the
    /// wrong class, and cycles.
    pub fn set_aggregation_with(
        &mut self,
        key: ElementKey,
        name: &str,
        child: Option<ElementKey>,
        invalidation: Invalidation,
    ) -> ElementResult<()> {
        let element_type = self.checked_aggregation(key, name, Some(Multiplicity::Single))?;
        let current = self.live(key)?.aggregation(name).first().copied();
        if current == child {
            return Ok(());
        }
        if let Some(child) = child {
            self.check_child(key, name, &element_type, child)?;
        }
        if let Some(old) = current {
            self.detach(old, Invalidation::Suppress);
        }
        if let Some(child) = child {
            self.detach(child, invalidation);
            self.attach(key, name, child, None);
        }
        self.invalidate_unless(key, invalidation);
        Ok(())
    }

    /// Appends a child to a multi aggregation, invalidating the owner.
    ///
    /// # Errors
    ///
    /// See [`add_aggregation_with`](Self::add_aggregation_with).
    pub fn add_aggregation(
        &mut self,
        key: ElementKey,
        name: &str,
        child: ElementKey,
    ) -> ElementResult<()> {
        self.add_aggregation_with(key, name, child, Invalidation::Invalidate)
    }

    /// Appends a child to a multi aggregation.
    ///
    /// A child owned elsewhere (including earlier in this aggregation) is
    /// detached first.
    ///
    /// # Errors
    ///
    /// Fails for stale keys, unknown or single aggregations, children of the
    /// wrong class, and cycles.
    pub fn add_aggregation_with(
        &mut self,
        key: ElementKey,
        name: &str,
        child: ElementKey,
        invalidation: Invalidation,
    ) -> ElementResult<()> {
        let element_type = self.checked_aggregation(key, name, Some(Multiplicity::Multiple))?;
        self.check_child(key, name, &element_type, child)?;
        self.detach(child, invalidation);
        self.attach(key, name, child, None);
        self.invalidate_unless(key, invalidation);
        Ok(())
    }

    /// Inserts a child into a multi aggregation, invalidating the owner.
    ///
    /// # Errors
    ///
    /// See [`insert_aggregation_with`](Self::insert_aggregation_with).
    pub fn insert_aggregation(
        &mut self,
        key: ElementKey,
        name: &str,
        child: ElementKey,
        index: isize,
    ) -> ElementResult<()> {
        self.insert_aggregation_with(key, name, child, index, Invalidation::Invalidate)
    }

    /// Inserts a child into a multi aggregation at `index`.
    ///
    /// Negative indices insert at the front; indices past the end append.
    /// The index applies after the child left any previous position.
    ///
    /// # Errors
    ///
    /// Fails for stale keys, unknown or single aggregations, children of the
    /// wrong class, and cycles.
    pub fn insert_aggregation_with(
        &mut self,
        key: ElementKey,
        name: &str,
        child: ElementKey,
        index: isize,
        invalidation: Invalidation,
    ) -> ElementResult<()> {
        let element_type = self.checked_aggregation(key, name, Some(Multiplicity::Multiple))?;
        self.check_child(key, name, &element_type, child)?;
        self.detach(child, invalidation);
        let index = usize::try_from(index).unwrap_or(0);
        self.attach(key, name, child, Some(index));
        self.invalidate_unless(key, invalidation);
        Ok(())
    }

    /// Removes a child, invalidating the owner.
    ///
    /// # Errors
    ///
    /// See [`remove_aggregation_with`](Self::remove_aggregation_with).
    pub fn remove_aggregation(
        &mut self,
        key: ElementKey,
        name: &str,
        child: ElementKey,
    ) -> ElementResult<Option<ElementKey>> {
        self.remove_aggregation_with(key, name, child, Invalidation::Invalidate)
    }

    /// Removes a child without destroying it.
    ///
    /// Returns `None` if `child` is not held by this aggregation.
    ///
    /// # Errors
    ///
    /// Fails for stale owner keys and unknown aggregations.
    pub fn remove_aggregation_with(
        &mut self,
        key: ElementKey,
        name: &str,
        child: ElementKey,
        invalidation: Invalidation,
    ) -> ElementResult<Option<ElementKey>> {
        self.checked_aggregation(key, name, None)?;
        let held = matches!(
            self.element(child).and_then(|c| c.owner.as_ref()),
            Some(Owner::Element { key: owner, aggregation }) if *owner == key && aggregation == name
        );
        if !held {
            return Ok(None);
        }
        self.detach(child, invalidation);
        Ok(Some(child))
    }

    /// Removes the child at `index`, invalidating the owner.
    ///
    /// Returns `None` for an index past the end.
    ///
    /// # Errors
    ///
    /// Fails for stale keys and unknown aggregations.
    pub fn remove_aggregation_at(
        &mut self,
        key: ElementKey,
        name: &str,
        index: usize,
    ) -> ElementResult<Option<ElementKey>> {
        let Some(&child) = self.get_aggregation(key, name)?.get(index) else {
            return Ok(None);
        };
        self.remove_aggregation(key, name, child)
    }

    /// Removes every child, invalidating the owner.
    ///
    /// # Errors
    ///
    /// See [`remove_all_aggregation_with`](Self::remove_all_aggregation_with).
    pub fn remove_all_aggregation(
        &mut self,
        key: ElementKey,
        name: &str,
    ) -> ElementResult<Vec<ElementKey>> {
        self.remove_all_aggregation_with(key, name, Invalidation::Invalidate)
    }

    /// Removes every child without destroying them and returns them in order.
    ///
    /// # Errors
    ///
    /// Fails for stale keys and unknown aggregations.
    pub fn remove_all_aggregation_with(
        &mut self,
        key: ElementKey,
        name: &str,
        invalidation: Invalidation,
    ) -> ElementResult<Vec<ElementKey>> {
        self.checked_aggregation(key, name, None)?;
        let children = self
            .data_mut(key)?
            .aggregations
            .remove(name)
            .unwrap_or_default();
        for &child in &children {
            if let Some(child) = self.element_mut(child) {
                child.owner = None;
            }
        }
        if !children.is_empty() {
            self.invalidate_unless(key, invalidation);
        }
        Ok(children)
    }

    /// Destroys every child, invalidating the owner.
    ///
    /// # Errors
    ///
    /// See [`destroy_aggregation_with`](Self::destroy_aggregation_with).
    pub fn destroy_aggregation(&mut self, key: ElementKey, name: &str) -> ElementResult<()> {
        self.destroy_aggregation_with(key, name, Invalidation::Invalidate)
    }

    /// Removes and destroys every child of an aggregation.
    ///
    /// # Errors
    ///
    /// Fails for stale keys and unknown aggregations.
    pub fn destroy_aggregation_with(
        &mut self,
        key: ElementKey,
        name: &str,
        invalidation: Invalidation,
    ) -> ElementResult<()> {
        let children = self.remove_all_aggregation_with(key, name, invalidation)?;
        for child in children {
            self.destroy_with(child, Invalidation::Suppress);
        }
        Ok(())
    }

    /// Returns the position of `child` in an aggregation.
    ///
    /// # Errors
    ///
    /// Fails for stale keys and unknown aggregations.
    pub fn index_of_aggregation(
        &self,
        key: ElementKey,
        name: &str,
        child: ElementKey,
    ) -> ElementResult<Option<usize>> {
        Ok(self
            .get_aggregation(key, name)?
            .iter()
            .position(|&k| k == child))
    }
}
