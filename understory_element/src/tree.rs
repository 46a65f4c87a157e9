// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The element arena: construction, ids, properties and destruction.

use hashbrown::HashMap;
use understory_schema::{ClassId, ClassSchema, SchemaRegistry, Value};

use crate::area::UiArea;
use crate::config::TreeConfig;
use crate::element::{ElementData, ElementFlags, Owner};
use crate::error::{ElementError, ElementResult};
use crate::invalidate::Invalidation;
use crate::key::ElementKey;
use crate::settings::Settings;

#[derive(Debug)]
struct Slot {
    generation: u32,
    data: Option<ElementData>,
}

/// A tree of schema-driven elements.
///
/// The tree owns every element, the class registry they are built from, the
/// id registry, and the render areas. Elements are addressed by
/// [`ElementKey`]s; parents own their aggregated children and children keep a
/// back-reference to their owner.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use understory_element::{ElementTree, Settings};
/// use understory_schema::{ClassDescriptor, PropertyDescriptor};
///
/// let mut tree = ElementTree::new();
/// tree.schemas_mut()
///     .register(
///         "Button",
///         ClassDescriptor::extending("Control")
///             .property("text", PropertyDescriptor::new("string")),
///     )
///     .unwrap();
///
/// let ok = tree
///     .create("Button", Some("ok"), Settings::new().value("text", "OK"))
///     .unwrap();
/// assert_eq!(tree.get_property(ok, "text").unwrap(), &json!("OK"));
/// assert_eq!(tree.by_id("ok"), Some(ok));
///
/// let generated = tree.create("Button", None, Settings::new()).unwrap();
/// assert_eq!(tree.id(generated).unwrap(), "__button0");
/// ```
#[derive(Debug)]
pub struct ElementTree {
    pub(crate) schemas: SchemaRegistry,
    slots: Vec<Slot>,
    free: Vec<u32>,
    ids: HashMap<String, ElementKey>,
    pub(crate) areas: Vec<UiArea>,
    pub(crate) config: TreeConfig,
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree {
    /// Creates an empty tree with the default configuration and the core
    /// `Element` and `Control` classes registered.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Creates an empty tree with the given configuration.
    #[must_use]
    pub fn with_config(config: TreeConfig) -> Self {
        let mut schemas = SchemaRegistry::with_uid_prefix(config.uid_prefix.clone());
        schemas.register_core_classes();
        Self {
            schemas,
            slots: Vec::new(),
            free: Vec::new(),
            ids: HashMap::new(),
            areas: Vec::new(),
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Returns the class registry.
    #[must_use]
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Returns the class registry for registering classes.
    pub fn schemas_mut(&mut self) -> &mut SchemaRegistry {
        &mut self.schemas
    }

    // =========================================================================
    // Arena
    // =========================================================================

    fn alloc(&mut self, data: ElementData) -> ElementKey {
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation += 1;
            slot.data = Some(data);
            return ElementKey::new(idx, slot.generation);
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "element counts beyond u32::MAX are not supported"
        )]
        let idx = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            data: Some(data),
        });
        ElementKey::new(idx, 1)
    }

    pub(crate) fn element(&self, key: ElementKey) -> Option<&ElementData> {
        self.slots
            .get(key.idx())
            .filter(|slot| slot.generation == key.generation())
            .and_then(|slot| slot.data.as_ref())
    }

    pub(crate) fn element_mut(&mut self, key: ElementKey) -> Option<&mut ElementData> {
        self.slots
            .get_mut(key.idx())
            .filter(|slot| slot.generation == key.generation())
            .and_then(|slot| slot.data.as_mut())
    }

    pub(crate) fn live(&self, key: ElementKey) -> ElementResult<&ElementData> {
        self.element(key).ok_or(ElementError::UnknownElement(key))
    }

    pub(crate) fn data_mut(&mut self, key: ElementKey) -> ElementResult<&mut ElementData> {
        self.element_mut(key).ok_or(ElementError::UnknownElement(key))
    }

    pub(crate) fn schema_of(&self, key: ElementKey) -> ElementResult<&ClassSchema> {
        let class = self.live(key)?.class;
        Ok(&self.schemas[class])
    }

    /// Registers a new element under `id` without applying settings.
    ///
    /// The id must be free; callers check explicit ids with
    /// [`check_new_id`](Self::check_new_id).
    pub(crate) fn insert_element(&mut self, id: String, class: ClassId) -> ElementKey {
        debug_assert!(
            !self.ids.contains_key(&id),
            "element id `{id}` is already registered"
        );
        let key = self.alloc(ElementData::new(id.clone(), class));
        self.ids.insert(id, key);
        key
    }

    /// Checks an explicit id for shape and uniqueness.
    ///
    /// Ids in the generated namespace are refused so that later generated
    /// ids cannot collide with them.
    pub(crate) fn check_new_id(&self, id: &str) -> ElementResult<()> {
        if !is_valid_id(id) {
            return Err(ElementError::InvalidId(id.to_owned()));
        }
        if self.schemas.is_generated_id(id) {
            return Err(ElementError::ReservedId(id.to_owned()));
        }
        if self.ids.contains_key(id) {
            return Err(ElementError::DuplicateId(id.to_owned()));
        }
        Ok(())
    }

    /// Draws the next free generated id for `class`.
    ///
    /// Counters only move forward. Ids already taken are skipped, which only
    /// happens when the uid prefix is empty.
    fn generate_id(&mut self, class: ClassId) -> String {
        loop {
            let id = self.schemas.uid(class);
            if !self.ids.contains_key(&id) {
                return id;
            }
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Returns the number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if the tree holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns `true` if `key` refers to a live element.
    #[must_use]
    pub fn is_alive(&self, key: ElementKey) -> bool {
        self.element(key).is_some()
    }

    /// Returns `true` once the element has been destroyed.
    #[must_use]
    pub fn is_destroyed(&self, key: ElementKey) -> bool {
        !self.is_alive(key)
    }

    /// Returns `true` if a render pass produced output for the element.
    #[must_use]
    pub fn is_rendered(&self, key: ElementKey) -> bool {
        self.element(key)
            .is_some_and(|e| e.flags.contains(ElementFlags::RENDERED))
    }

    /// Resolves an element id.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<ElementKey> {
        self.ids.get(id).copied()
    }

    /// Returns the id of an element.
    ///
    /// # Errors
    ///
    /// Fails for stale keys.
    pub fn id(&self, key: ElementKey) -> ElementResult<&str> {
        Ok(&self.live(key)?.id)
    }

    /// Returns the class of an element.
    ///
    /// # Errors
    ///
    /// Fails for stale keys.
    pub fn class(&self, key: ElementKey) -> ElementResult<ClassId> {
        Ok(self.live(key)?.class)
    }

    /// Returns the flattened schema of an element's class.
    ///
    /// # Errors
    ///
    /// Fails for stale keys.
    pub fn schema(&self, key: ElementKey) -> ElementResult<&ClassSchema> {
        self.schema_of(key)
    }

    /// Returns the owning element, if any.
    #[must_use]
    pub fn parent(&self, key: ElementKey) -> Option<ElementKey> {
        self.element(key).and_then(ElementData::parent)
    }

    /// Returns the name of the aggregation holding the element.
    #[must_use]
    pub fn parent_aggregation_name(&self, key: ElementKey) -> Option<&str> {
        match &self.element(key)?.owner {
            Some(Owner::Element { aggregation, .. }) => Some(aggregation),
            _ => None,
        }
    }

    /// Walks the owning elements upwards, nearest first.
    pub fn ancestors(&self, key: ElementKey) -> impl Iterator<Item = ElementKey> + '_ {
        let mut current = self.parent(key);
        core::iter::from_fn(move || {
            let next = current?;
            current = self.parent(next);
            Some(next)
        })
    }

    /// Returns the owned children in schema aggregation order.
    #[must_use]
    pub fn children(&self, key: ElementKey) -> Vec<ElementKey> {
        let Some(element) = self.element(key) else {
            return Vec::new();
        };
        self.schemas[element.class]
            .all_aggregations()
            .iter()
            .flat_map(|info| element.aggregation(info.name()))
            .copied()
            .collect()
    }

    /// Returns all owned descendants, depth first in child order.
    #[must_use]
    pub fn find_aggregated_objects(&self, key: ElementKey) -> Vec<ElementKey> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementKey> = self.children(key).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    /// Returns `true` unless the element has a `visible` property set to
    /// `false`. Elements without the property count as visible.
    #[must_use]
    pub fn is_visible(&self, key: ElementKey) -> bool {
        !matches!(self.get_property(key, "visible"), Ok(Value::Bool(false)))
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Creates an element of `class`.
    ///
    /// `id` must match `[A-Za-z_][-A-Za-z0-9_.:]*` and be unused. Without one,
    /// a string `id` entry in `settings` is used, and failing that a fresh id
    /// is generated from the class name. The remaining settings are applied
    /// as described in [`apply_settings`](Self::apply_settings).
    ///
    /// If a setting fails, the half-built element is destroyed, children it
    /// had already adopted are released unharmed, and the error is returned.
    ///
    /// # Errors
    ///
    /// Fails for unknown classes, bad or duplicate ids, and any settings
    /// error.
    pub fn create(
        &mut self,
        class: &str,
        id: Option<&str>,
        mut settings: Settings,
    ) -> ElementResult<ElementKey> {
        let class_id = self
            .schemas
            .by_name(class)
            .ok_or_else(|| ElementError::UnknownClass(class.to_owned()))?;
        let settings_id = settings.take_id();
        let id = match id.map(str::to_owned).or(settings_id) {
            Some(id) => {
                self.check_new_id(&id)?;
                id
            }
            None => self.generate_id(class_id),
        };
        let key = self.insert_element(id, class_id);
        tracing::debug!(element = ?key, class, "created element");

        if let Err(err) = self.apply_settings(key, settings) {
            for child in self.children(key) {
                if let Some(child) = self.element_mut(child) {
                    child.owner = None;
                }
            }
            if let Some(element) = self.element_mut(key) {
                element.aggregations.clear();
            }
            self.destroy_with(key, Invalidation::Suppress);
            return Err(err);
        }
        Ok(key)
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the current value of a property, or its default.
    ///
    /// # Errors
    ///
    /// Fails for stale keys and unknown property names.
    pub fn get_property(&self, key: ElementKey, name: &str) -> ElementResult<&Value> {
        let element = self.live(key)?;
        let schema = &self.schemas[element.class];
        schema
            .property_id(name)
            .and_then(|id| element.properties.get_effective(id, schema))
            .ok_or_else(|| ElementError::UnknownProperty {
                class: schema.name().to_owned(),
                property: name.to_owned(),
            })
    }

    /// Sets a property and invalidates the element if the value changed.
    ///
    /// See [`set_property_with`](Self::set_property_with).
    ///
    /// # Errors
    ///
    /// Fails for stale keys and unknown property names.
    pub fn set_property(
        &mut self,
        key: ElementKey,
        name: &str,
        value: impl Into<Value>,
    ) -> ElementResult<bool> {
        self.set_property_with(key, name, value.into(), Invalidation::Invalidate)
    }

    /// Sets a property.
    ///
    /// - A value deep-equal to the current one is a no-op and returns `false`.
    /// - `null` on a property whose type does not accept it resets the
    ///   property to its default.
    /// - A value that does not match the declared type is logged and stored
    ///   anyway.
    ///
    /// Otherwise the value is stored, the element is invalidated unless
    /// suppressed, and `true` is returned.
    ///
    /// # Errors
    ///
    /// Fails for stale keys and unknown property names.
    pub fn set_property_with(
        &mut self,
        key: ElementKey,
        name: &str,
        value: Value,
        invalidation: Invalidation,
    ) -> ElementResult<bool> {
        let element = self.live(key)?;
        let schema = &self.schemas[element.class];
        let (id, info) = schema
            .property_id(name)
            .and_then(|id| Some((id, schema.property_by_id(id)?)))
            .ok_or_else(|| ElementError::UnknownProperty {
                class: schema.name().to_owned(),
                property: name.to_owned(),
            })?;

        let ty = info.semantic_type();
        let resets = value.is_null() && !ty.accepts(&Value::Null);
        let target = if resets { info.default_value() } else { &value };
        if element
            .properties
            .get_effective(id, schema)
            .is_some_and(|current| same_value(current, target))
        {
            return Ok(false);
        }
        if !resets && self.config.check_property_types && !ty.accepts(&value) {
            tracing::warn!(
                element = %element.id,
                property = name,
                expected = %ty,
                %value,
                "property value does not match its declared type"
            );
        }

        let element = self.data_mut(key)?;
        if resets {
            element.properties.clear(id);
        } else {
            element.properties.set(id, value);
        }
        if invalidation == Invalidation::Invalidate {
            self.invalidate(key);
        }
        Ok(true)
    }

    /// Iterates the explicitly set properties of an element by name.
    pub fn explicit_properties(&self, key: ElementKey) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.element(key).into_iter().flat_map(move |element| {
            let schema = &self.schemas[element.class];
            element
                .properties
                .iter()
                .filter_map(move |(id, value)| Some((schema.property_by_id(id)?.name(), value)))
        })
    }

    // =========================================================================
    // Destruction
    // =========================================================================

    /// Destroys an element and everything it owns, invalidating its owner.
    ///
    /// Returns `false` if the element was already gone.
    pub fn destroy(&mut self, key: ElementKey) -> bool {
        self.destroy_with(key, Invalidation::Invalidate)
    }

    /// Destroys an element and everything it owns.
    ///
    /// The element is removed from its owner (which is invalidated unless
    /// suppressed), its children are destroyed without further invalidation,
    /// its subscribers are dropped and its id is released. Associations
    /// pointing at it elsewhere are left alone. Stale keys are a no-op.
    pub fn destroy_with(&mut self, key: ElementKey, invalidation: Invalidation) -> bool {
        let Some(element) = self.element_mut(key) else {
            return false;
        };
        if element.flags.contains(ElementFlags::BEING_DESTROYED) {
            return false;
        }
        element.flags.insert(ElementFlags::BEING_DESTROYED);

        self.detach(key, invalidation);

        let children = self.children(key);
        if let Some(element) = self.element_mut(key) {
            element.aggregations.clear();
        }
        for &child in &children {
            if let Some(child) = self.element_mut(child) {
                child.owner = None;
            }
        }
        for child in children {
            self.destroy_with(child, Invalidation::Suppress);
        }

        let slot = &mut self.slots[key.idx()];
        if let Some(element) = slot.data.take() {
            if self.ids.get(&element.id) == Some(&key) {
                self.ids.remove(&element.id);
            }
            tracing::debug!(element = ?key, id = %element.id, "destroyed element");
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "slot indices originate from u32 keys"
        )]
        let idx = key.idx() as u32;
        self.free.push(idx);
        true
    }
}

/// Returns `true` for ids matching `[A-Za-z_][-A-Za-z0-9_.:]*`.
fn is_valid_id(id: &str) -> bool {
    let mut chars = id.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

/// Value equality that treats numbers by magnitude, so `12` equals `12.0`.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x == y || x.as_f64().is_some_and(|x| y.as_f64() == Some(x))
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_value(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| same_value(x, y)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use understory_schema::{AggregationDescriptor, ClassDescriptor, PropertyDescriptor};

    fn tree() -> ElementTree {
        let mut tree = ElementTree::new();
        tree.schemas_mut()
            .register(
                "Button",
                ClassDescriptor::extending("Control")
                    .property("text", PropertyDescriptor::new("string"))
                    .property("enabled", PropertyDescriptor::new("boolean").default_value(true))
                    .property("width", PropertyDescriptor::new("int"))
                    .property("scale", PropertyDescriptor::new("float").default_value(12.0))
                    .property(
                        "type",
                        PropertyDescriptor::enumeration(["Default", "Emphasized"]),
                    ),
            )
            .unwrap();
        tree.schemas_mut()
            .register(
                "Panel",
                ClassDescriptor::extending("Control")
                    .aggregation("content", AggregationDescriptor::multiple("Control")),
            )
            .unwrap();
        tree
    }

    #[test]
    fn id_shapes() {
        assert!(is_valid_id("ok"));
        assert!(is_valid_id("_a-b.c:d9"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("9lives"));
        assert!(!is_valid_id("has space"));
    }

    #[test]
    fn explicit_and_generated_ids() {
        let mut tree = tree();
        let a = tree.create("Button", Some("save"), Settings::new()).unwrap();
        assert_eq!(tree.id(a).unwrap(), "save");
        assert_eq!(
            tree.create("Button", Some("save"), Settings::new()),
            Err(ElementError::DuplicateId("save".into()))
        );
        assert_eq!(
            tree.create("Button", Some("1st"), Settings::new()),
            Err(ElementError::InvalidId("1st".into()))
        );

        let b = tree.create("Button", None, Settings::new()).unwrap();
        let c = tree.create("Button", None, Settings::new()).unwrap();
        assert_eq!(tree.id(b).unwrap(), "__button0");
        assert_eq!(tree.id(c).unwrap(), "__button1");
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn explicit_ids_cannot_take_generated_names() {
        let mut tree = tree();
        assert_eq!(
            tree.create("Button", Some("__button0"), Settings::new()),
            Err(ElementError::ReservedId("__button0".into()))
        );
        assert!(matches!(
            tree.create("Button", None, Settings::new().value("id", "__button1")),
            Err(ElementError::ReservedId(_))
        ));

        let a = tree.create("Button", None, Settings::new()).unwrap();
        let b = tree.create("Button", None, Settings::new()).unwrap();
        assert_eq!(tree.len(), 2);
        assert_ne!(tree.id(a).unwrap(), tree.id(b).unwrap());
        assert_eq!(tree.by_id("__button0"), Some(a));
        assert_eq!(tree.by_id(tree.id(b).unwrap()), Some(b));
    }

    #[test]
    fn empty_uid_prefix_skips_taken_ids() {
        let config = TreeConfig {
            uid_prefix: String::new(),
            ..TreeConfig::default()
        };
        let mut tree = ElementTree::with_config(config);
        tree.schemas_mut()
            .register("Button", ClassDescriptor::extending("Control"))
            .unwrap();
        let explicit = tree.create("Button", Some("button0"), Settings::new()).unwrap();
        let generated = tree.create("Button", None, Settings::new()).unwrap();
        assert_eq!(tree.id(generated).unwrap(), "button1");
        assert_eq!(tree.by_id("button0"), Some(explicit));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn settings_id_entry() {
        let mut tree = tree();
        let key = tree
            .create("Button", None, Settings::new().value("id", "fromSettings"))
            .unwrap();
        assert_eq!(tree.by_id("fromSettings"), Some(key));
    }

    #[test]
    fn unknown_class() {
        let mut tree = tree();
        assert_eq!(
            tree.create("Nope", None, Settings::new()),
            Err(ElementError::UnknownClass("Nope".into()))
        );
    }

    #[test]
    fn defaults_and_round_trip() {
        let mut tree = tree();
        let key = tree.create("Button", None, Settings::new()).unwrap();
        assert_eq!(tree.get_property(key, "enabled").unwrap(), &json!(true));
        assert_eq!(tree.get_property(key, "text").unwrap(), &json!(""));
        assert_eq!(tree.get_property(key, "type").unwrap(), &json!("Default"));

        assert!(tree.set_property(key, "enabled", false).unwrap());
        assert_eq!(tree.get_property(key, "enabled").unwrap(), &json!(false));
        assert!(!tree.set_property(key, "enabled", false).unwrap());
    }

    #[test]
    fn writing_the_default_is_a_no_op() {
        let mut tree = tree();
        let key = tree.create("Button", None, Settings::new()).unwrap();
        assert!(!tree.set_property(key, "text", "").unwrap());
        assert_eq!(tree.explicit_properties(key).count(), 0);
    }

    #[test]
    fn integral_and_float_numbers_compare_equal() {
        let mut tree = tree();
        let key = tree.create("Button", None, Settings::new()).unwrap();
        assert!(!tree.set_property(key, "scale", 12).unwrap());
        assert_eq!(tree.explicit_properties(key).count(), 0);

        assert!(tree.set_property(key, "scale", 3).unwrap());
        assert!(!tree.set_property(key, "scale", 3.0).unwrap());
        assert_eq!(tree.get_property(key, "scale").unwrap(), &json!(3));

        assert!(same_value(&json!([1, { "a": 2.0 }]), &json!([1.0, { "a": 2 }])));
        assert!(!same_value(&json!([1]), &json!([1, 2])));
        assert!(!same_value(&json!(1), &json!("1")));
    }

    #[test]
    fn null_resets_to_default() {
        let mut tree = tree();
        let key = tree.create("Button", None, Settings::new()).unwrap();
        tree.set_property(key, "width", 40).unwrap();
        assert!(tree.set_property(key, "width", Value::Null).unwrap());
        assert_eq!(tree.get_property(key, "width").unwrap(), &json!(0));
        assert_eq!(tree.explicit_properties(key).count(), 0);
    }

    #[test]
    fn mismatched_type_is_stored() {
        let mut tree = tree();
        let key = tree.create("Button", None, Settings::new()).unwrap();
        assert!(tree.set_property(key, "width", "wide").unwrap());
        assert_eq!(tree.get_property(key, "width").unwrap(), &json!("wide"));
    }

    #[test]
    fn unknown_property() {
        let mut tree = tree();
        let key = tree.create("Button", None, Settings::new()).unwrap();
        let err = tree.set_property(key, "colour", "red").unwrap_err();
        assert_eq!(
            err,
            ElementError::UnknownProperty {
                class: "Button".into(),
                property: "colour".into()
            }
        );
        assert!(tree.get_property(key, "colour").is_err());
    }

    #[test]
    fn destroy_cascades_and_is_idempotent() {
        let mut tree = tree();
        let panel = tree.create("Panel", Some("panel"), Settings::new()).unwrap();
        let inner = tree.create("Panel", None, Settings::new()).unwrap();
        let leaf = tree.create("Button", Some("leaf"), Settings::new()).unwrap();
        tree.add_aggregation(panel, "content", inner).unwrap();
        tree.add_aggregation(inner, "content", leaf).unwrap();
        assert_eq!(tree.find_aggregated_objects(panel), vec![inner, leaf]);
        assert_eq!(tree.ancestors(leaf).collect::<Vec<_>>(), vec![inner, panel]);

        assert!(tree.destroy(panel));
        assert!(!tree.destroy(panel));
        assert!(tree.is_destroyed(inner));
        assert!(tree.is_destroyed(leaf));
        assert_eq!(tree.by_id("leaf"), None);
        assert!(tree.is_empty());
        assert_eq!(
            tree.get_property(leaf, "text"),
            Err(ElementError::UnknownElement(leaf))
        );
    }

    #[test]
    fn slots_are_reused_with_new_generation() {
        let mut tree = tree();
        let a = tree.create("Button", Some("a"), Settings::new()).unwrap();
        tree.destroy(a);
        let b = tree.create("Button", Some("a"), Settings::new()).unwrap();
        assert_ne!(a, b);
        assert!(!tree.is_alive(a));
        assert!(tree.is_alive(b));
    }

    #[test]
    fn failed_settings_release_children() {
        let mut tree = tree();
        let child = tree.create("Button", None, Settings::new()).unwrap();
        let err = tree
            .create(
                "Panel",
                Some("broken"),
                Settings::new()
                    .element("content", child)
                    .value("nonsense", 1),
            )
            .unwrap_err();
        assert!(matches!(err, ElementError::UnknownSetting { .. }));
        assert!(tree.is_alive(child));
        assert_eq!(tree.parent(child), None);
        assert_eq!(tree.by_id("broken"), None);
    }
}
