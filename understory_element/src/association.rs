// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Association mutators: non-owning references by id.
//!
//! Targets are stored as id strings and never resolved eagerly, so a target
//! may be created after, or destroyed before, the element pointing at it.

use understory_schema::Multiplicity;

use crate::error::{ElementError, ElementResult};
use crate::key::ElementKey;
use crate::tree::ElementTree;

impl ElementTree {
    fn checked_association(
        &self,
        key: ElementKey,
        name: &str,
        multiplicity: Option<Multiplicity>,
    ) -> ElementResult<()> {
        let schema = self.schema_of(key)?;
        let info = schema
            .association(name)
            .ok_or_else(|| ElementError::UnknownAssociation {
                class: schema.name().to_owned(),
                association: name.to_owned(),
            })?;
        match multiplicity {
            Some(expected) if info.multiplicity() != expected => {
                Err(ElementError::MultiplicityMismatch {
                    class: schema.name().to_owned(),
                    name: name.to_owned(),
                    expected: info.multiplicity(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Returns the target ids of an association in order.
    ///
    /// # Errors
    ///
    /// Fails for stale keys and unknown associations.
    pub fn get_association(&self, key: ElementKey, name: &str) -> ElementResult<&[String]> {
        self.checked_association(key, name, None)?;
        Ok(self.live(key)?.association(name))
    }

    /// Sets or clears the target of a single association.
    ///
    /// Invalidates the element when the target changes.
    ///
    /// # Errors
    ///
    /// Fails for stale keys and unknown or multi associations.
    pub fn set_association(
        &mut self,
        key: ElementKey,
        name: &str,
        target: Option<&str>,
    ) -> ElementResult<()> {
        self.checked_association(key, name, Some(Multiplicity::Single))?;
        let element = self.data_mut(key)?;
        let current = element.association(name).first().map(String::as_str);
        if current == target {
            return Ok(());
        }
        match target {
            Some(id) => {
                element.associations.insert(name.to_owned(), vec![id.to_owned()]);
            }
            None => {
                element.associations.remove(name);
            }
        }
        self.invalidate(key);
        Ok(())
    }

    /// Appends a target id to a multi association.
    ///
    /// # Errors
    ///
    /// Fails for stale keys and unknown or single associations.
    pub fn add_association(&mut self, key: ElementKey, name: &str, target: &str) -> ElementResult<()> {
        self.checked_association(key, name, Some(Multiplicity::Multiple))?;
        self.data_mut(key)?
            .associations
            .entry_ref(name)
            .or_default()
            .push(target.to_owned());
        self.invalidate(key);
        Ok(())
    }

    /// Removes the first occurrence of a target id.
    ///
    /// Returns `None` if the id was not referenced.
    ///
    /// # Errors
    ///
    /// Fails for stale keys and unknown associations.
    pub fn remove_association(
        &mut self,
        key: ElementKey,
        name: &str,
        target: &str,
    ) -> ElementResult<Option<String>> {
        self.checked_association(key, name, None)?;
        let element = self.data_mut(key)?;
        let Some(targets) = element.associations.get_mut(name) else {
            return Ok(None);
        };
        let Some(pos) = targets.iter().position(|t| t == target) else {
            return Ok(None);
        };
        let removed = targets.remove(pos);
        if targets.is_empty() {
            element.associations.remove(name);
        }
        self.invalidate(key);
        Ok(Some(removed))
    }

    /// Removes every target id and returns them in order.
    ///
    /// # Errors
    ///
    /// Fails for stale keys and unknown associations.
    pub fn remove_all_association(
        &mut self,
        key: ElementKey,
        name: &str,
    ) -> ElementResult<Vec<String>> {
        self.checked_association(key, name, None)?;
        let removed = self
            .data_mut(key)?
            .associations
            .remove(name)
            .unwrap_or_default();
        if !removed.is_empty() {
            self.invalidate(key);
        }
        Ok(removed)
    }
}
