// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deep cloning of element subtrees.

use hashbrown::HashMap;

use crate::error::{ElementError, ElementResult};
use crate::invalidate::Invalidation;
use crate::key::ElementKey;
use crate::tree::ElementTree;

impl ElementTree {
    /// Clones an element and everything it owns.
    ///
    /// Every clone gets the id `"{original}-{suffix}"`; without a suffix a
    /// fresh one is generated from the configured clone token. The clone
    /// copies explicitly set properties and re-creates each owned child, so
    /// the two trees share nothing. It is unowned and has never rendered.
    ///
    /// Associations pointing into the cloned subtree are redirected to the
    /// corresponding clones; others are copied as they are. Event
    /// subscriptions are copied with their data, and a listener equal to the
    /// original element is replaced by its clone.
    ///
    /// ```rust
    /// use understory_element::{ElementTree, Settings};
    /// use understory_schema::{ClassDescriptor, PropertyDescriptor};
    ///
    /// let mut tree = ElementTree::new();
    /// tree.schemas_mut()
    ///     .register(
    ///         "Tag",
    ///         ClassDescriptor::extending("Control")
    ///             .property("text", PropertyDescriptor::new("string")),
    ///     )
    ///     .unwrap();
    /// let tag = tree.create("Tag", Some("tag"), Settings::new().value("text", "new")).unwrap();
    ///
    /// let copy = tree.clone_element(tag, Some("row1")).unwrap();
    /// assert_eq!(tree.id(copy).unwrap(), "tag-row1");
    /// assert_eq!(tree.get_property(copy, "text").unwrap(), "new");
    ///
    /// let generated = tree.clone_element(tag, None).unwrap();
    /// assert_eq!(tree.id(generated).unwrap(), "tag-__clone0");
    /// ```
    ///
    /// # Errors
    ///
    /// Fails for stale keys and when a derived id is already taken. Nothing
    /// is left behind on failure.
    pub fn clone_element(&mut self, key: ElementKey, suffix: Option<&str>) -> ElementResult<ElementKey> {
        self.live(key)?;
        let suffix = match suffix {
            Some(suffix) => suffix.to_owned(),
            None => {
                let token = self.config.clone_token.clone();
                self.schemas.uid_for_token(&token)
            }
        };

        let mut pairs = Vec::new();
        let root = match self.clone_subtree(key, &suffix, &mut pairs) {
            Ok(root) => root,
            Err(err) => {
                // Clones whose subtree failed were never attached.
                for &(_, partial) in &pairs {
                    self.destroy_with(partial, Invalidation::Suppress);
                }
                return Err(err);
            }
        };

        let renamed: HashMap<String, String> = pairs
            .iter()
            .filter_map(|&(original, copy)| {
                Some((self.element(original)?.id.clone(), self.element(copy)?.id.clone()))
            })
            .collect();
        for &(original, copy) in &pairs {
            let Some(source) = self.element(original) else {
                continue;
            };
            let associations = source
                .associations
                .iter()
                .map(|(name, targets)| {
                    let targets = targets
                        .iter()
                        .map(|t| renamed.get(t).unwrap_or(t).clone())
                        .collect();
                    (name.clone(), targets)
                })
                .collect();
            if let Some(clone) = self.element_mut(copy) {
                clone.associations = associations;
            }
        }

        tracing::debug!(original = ?key, clone = ?root, elements = pairs.len(), "cloned subtree");
        Ok(root)
    }

    fn clone_subtree(
        &mut self,
        key: ElementKey,
        suffix: &str,
        pairs: &mut Vec<(ElementKey, ElementKey)>,
    ) -> ElementResult<ElementKey> {
        let source = self.live(key)?;
        let id = format!("{}-{suffix}", source.id);
        if self.by_id(&id).is_some() {
            return Err(ElementError::DuplicateId(id));
        }
        let class = source.class;
        let properties = source.properties.clone();
        let mut events = source.events.clone();
        let children: Vec<(String, Vec<ElementKey>)> = self.schemas[class]
            .all_aggregations()
            .iter()
            .filter_map(|info| {
                let children = source.aggregations.get(info.name())?;
                Some((info.name().to_owned(), children.clone()))
            })
            .collect();

        let copy = self.insert_element(id, class);
        events.rebind_listener(key, copy);
        if let Some(clone) = self.element_mut(copy) {
            clone.properties = properties;
            clone.events = events;
        }
        pairs.push((key, copy));

        for (name, children) in children {
            for child in children {
                let child_copy = self.clone_subtree(child, suffix, pairs)?;
                self.attach(copy, &name, child_copy, None);
            }
        }
        Ok(copy)
    }
}
