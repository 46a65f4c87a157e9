// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction-time settings.
//!
//! A [`Settings`] map is an ordered list of `key → value` entries plus
//! untyped content. Each key is resolved through the class schema (see
//! [`ClassSchema::resolve_setting`](understory_schema::ClassSchema::resolve_setting))
//! to a property, an aggregation, an association or an event, and applied
//! with the matching mutator. Property values are coerced to the declared
//! type; anything that cannot be applied is a configuration error.

use core::fmt;

use understory_schema::{SettingKind, Value};

use crate::error::{ElementError, ElementResult, unexpected_value};
use crate::event::EventHandler;
use crate::key::ElementKey;
use crate::tree::ElementTree;

/// The value of one settings entry.
#[derive(Clone)]
pub enum SettingValue {
    /// A plain value: property values and association ids.
    Value(Value),
    /// One element: a child for an aggregation or a target for an association.
    Element(ElementKey),
    /// Several elements.
    Elements(Vec<ElementKey>),
    /// An event subscription.
    Handler {
        /// The handler.
        handler: EventHandler,
        /// Data bound to the subscription.
        data: Option<Value>,
        /// Listener recorded with the subscription.
        listener: Option<ElementKey>,
    },
}

impl SettingValue {
    fn describe(&self) -> String {
        match self {
            Self::Value(value) => unexpected_value(value),
            Self::Element(_) => "an element".to_owned(),
            Self::Elements(_) => "a list of elements".to_owned(),
            Self::Handler { .. } => "an event handler".to_owned(),
        }
    }
}

impl fmt::Debug for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Element(key) => f.debug_tuple("Element").field(key).finish(),
            Self::Elements(keys) => f.debug_tuple("Elements").field(keys).finish(),
            Self::Handler { data, listener, .. } => f
                .debug_struct("Handler")
                .field("data", data)
                .field("listener", listener)
                .finish_non_exhaustive(),
        }
    }
}

/// Settings applied when an element is created.
///
/// ```rust
/// use understory_element::{ElementTree, Settings};
/// use understory_schema::{AggregationDescriptor, ClassDescriptor, PropertyDescriptor};
///
/// let mut tree = ElementTree::new();
/// let schemas = tree.schemas_mut();
/// schemas
///     .register(
///         "Item",
///         ClassDescriptor::extending("Control")
///             .property("count", PropertyDescriptor::new("int")),
///     )
///     .unwrap();
/// schemas
///     .register(
///         "List",
///         ClassDescriptor::extending("Control")
///             .aggregation("items", AggregationDescriptor::multiple("Item"))
///             .default_aggregation("items"),
///     )
///     .unwrap();
///
/// // Strings are coerced to the declared property type.
/// let first = tree.create("Item", None, Settings::new().value("count", "3")).unwrap();
/// let second = tree.create("Item", None, Settings::new()).unwrap();
/// assert_eq!(tree.get_property(first, "count").unwrap(), 3);
///
/// // Untyped content goes to the default aggregation.
/// let list = tree
///     .create("List", None, Settings::new().content(first).content(second))
///     .unwrap();
/// assert_eq!(tree.get_aggregation(list, "items").unwrap(), &[first, second]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Settings {
    entries: Vec<(String, SettingValue)>,
    content: Vec<ElementKey>,
}

impl Settings {
    /// Creates empty settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: SettingValue) -> Self {
        self.entries.push((key.into(), value));
        self
    }

    /// Adds a plain value entry.
    #[must_use]
    pub fn value(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, SettingValue::Value(value.into()))
    }

    /// Adds an element entry.
    #[must_use]
    pub fn element(self, key: impl Into<String>, element: ElementKey) -> Self {
        self.set(key, SettingValue::Element(element))
    }

    /// Adds a list-of-elements entry.
    #[must_use]
    pub fn elements(
        self,
        key: impl Into<String>,
        elements: impl IntoIterator<Item = ElementKey>,
    ) -> Self {
        self.set(key, SettingValue::Elements(elements.into_iter().collect()))
    }

    /// Adds an event subscription.
    #[must_use]
    pub fn on(self, key: impl Into<String>, handler: EventHandler) -> Self {
        self.on_with(key, None, handler, None)
    }

    /// Adds an event subscription with bound data and a listener.
    #[must_use]
    pub fn on_with(
        self,
        key: impl Into<String>,
        data: Option<Value>,
        handler: EventHandler,
        listener: Option<ElementKey>,
    ) -> Self {
        self.set(
            key,
            SettingValue::Handler {
                handler,
                data,
                listener,
            },
        )
    }

    /// Adds untyped content for the class's default aggregation.
    #[must_use]
    pub fn content(mut self, element: ElementKey) -> Self {
        self.content.push(element);
        self
    }

    /// Returns `true` if there are no entries and no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.content.is_empty()
    }

    /// Removes and returns a string `id` entry.
    pub(crate) fn take_id(&mut self) -> Option<String> {
        let pos = self.entries.iter().position(|(key, value)| {
            key == "id" && matches!(value, SettingValue::Value(Value::String(_)))
        })?;
        match self.entries.remove(pos).1 {
            SettingValue::Value(Value::String(id)) => Some(id),
            _ => None,
        }
    }
}

impl From<serde_json::Map<String, Value>> for Settings {
    /// Converts a JSON object into plain value entries, in key order.
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self {
            entries: map
                .into_iter()
                .map(|(key, value)| (key, SettingValue::Value(value)))
                .collect(),
            content: Vec::new(),
        }
    }
}

impl ElementTree {
    /// Applies settings to an existing element, in entry order.
    ///
    /// | key resolves to        | accepted values                                 |
    /// |------------------------|-------------------------------------------------|
    /// | property               | a value, coerced to the declared type           |
    /// | single aggregation     | an element, or a list of at most one            |
    /// | multi aggregation      | an element or a list, appended                  |
    /// | single association     | an id string, an element, or `null`             |
    /// | multi association      | an id string, an array of them, or element(s)   |
    /// | event                  | a handler                                       |
    ///
    /// Content is added to the default aggregation.
    ///
    /// Entries applied before a failing one stay applied.
    ///
    /// # Errors
    ///
    /// Fails for unresolved keys, values that do not fit the resolved member,
    /// and any error of the underlying mutator.
    pub fn apply_settings(&mut self, key: ElementKey, settings: Settings) -> ElementResult<()> {
        for (name, value) in settings.entries {
            self.apply_setting(key, &name, value)?;
        }
        if settings.content.is_empty() {
            return Ok(());
        }
        let schema = self.schema_of(key)?;
        let Some(info) = schema.default_aggregation() else {
            return Err(ElementError::NoDefaultAggregation(schema.name().to_owned()));
        };
        let aggregation = info.name().to_owned();
        let multiple = info.is_multiple();
        let entry = if multiple {
            SettingValue::Elements(settings.content)
        } else {
            match settings.content.as_slice() {
                [one] => SettingValue::Element(*one),
                _ => SettingValue::Elements(settings.content),
            }
        };
        self.apply_setting(key, &aggregation, entry)
    }

    fn apply_setting(&mut self, key: ElementKey, name: &str, value: SettingValue) -> ElementResult<()> {
        let schema = self.schema_of(key)?;
        let class = schema.name().to_owned();
        let Some((kind, member)) = schema.resolve_setting(name) else {
            return Err(ElementError::UnknownSetting {
                class,
                key: name.to_owned(),
            });
        };
        let ty = match kind {
            SettingKind::Property => schema.property(member).map(|p| p.semantic_type().clone()),
            _ => None,
        };
        let invalid = |reason: String| ElementError::InvalidSetting {
            class: class.clone(),
            key: name.to_owned(),
            reason,
        };

        match (kind, value) {
            (SettingKind::Property, SettingValue::Value(value)) => {
                let value = match ty {
                    Some(ty) => ty.coerce(value).map_err(|value| {
                        invalid(format!("expected {ty}, got {}", unexpected_value(&value)))
                    })?,
                    None => value,
                };
                self.set_property(key, member, value)?;
            }
            (SettingKind::SingleAggregation, SettingValue::Element(child)) => {
                self.set_aggregation(key, member, Some(child))?;
            }
            (SettingKind::SingleAggregation, SettingValue::Elements(children))
                if children.len() <= 1 =>
            {
                self.set_aggregation(key, member, children.first().copied())?;
            }
            (SettingKind::MultipleAggregation, SettingValue::Element(child)) => {
                self.add_aggregation(key, member, child)?;
            }
            (SettingKind::MultipleAggregation, SettingValue::Elements(children)) => {
                for child in children {
                    self.add_aggregation(key, member, child)?;
                }
            }
            (SettingKind::SingleAssociation, SettingValue::Value(Value::Null)) => {
                self.set_association(key, member, None)?;
            }
            (SettingKind::SingleAssociation, SettingValue::Value(Value::String(id))) => {
                self.set_association(key, member, Some(&id))?;
            }
            (SettingKind::SingleAssociation, SettingValue::Element(target)) => {
                let id = self.live(target)?.id.clone();
                self.set_association(key, member, Some(&id))?;
            }
            (SettingKind::MultipleAssociation, SettingValue::Value(Value::String(id))) => {
                self.add_association(key, member, &id)?;
            }
            (SettingKind::MultipleAssociation, SettingValue::Value(Value::Array(ids))) => {
                let ids = ids
                    .into_iter()
                    .map(|id| match id {
                        Value::String(id) => Ok(id),
                        other => Err(invalid(format!(
                            "expected id strings, got {}",
                            unexpected_value(&other)
                        ))),
                    })
                    .collect::<ElementResult<Vec<_>>>()?;
                for id in ids {
                    self.add_association(key, member, &id)?;
                }
            }
            (SettingKind::MultipleAssociation, SettingValue::Element(target)) => {
                let id = self.live(target)?.id.clone();
                self.add_association(key, member, &id)?;
            }
            (SettingKind::MultipleAssociation, SettingValue::Elements(targets)) => {
                for target in targets {
                    let id = self.live(target)?.id.clone();
                    self.add_association(key, member, &id)?;
                }
            }
            (
                SettingKind::Event,
                SettingValue::Handler {
                    handler,
                    data,
                    listener,
                },
            ) => {
                self.attach_event_with(key, member, data, handler, listener)?;
            }
            (kind, other) => {
                return Err(invalid(format!("{kind:?} cannot take {}", other.describe())));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use serde_json::json;
    use std::rc::Rc;
    use understory_schema::{
        AggregationDescriptor, AssociationDescriptor, ClassDescriptor, PropertyDescriptor,
    };

    use crate::event::event_handler;

    fn tree() -> ElementTree {
        let mut tree = ElementTree::new();
        let schemas = tree.schemas_mut();
        schemas
            .register(
                "Label",
                ClassDescriptor::extending("Control")
                    .property("text", PropertyDescriptor::new("string"))
                    .property("width", PropertyDescriptor::new("float"))
                    .property("wrapping", PropertyDescriptor::new("boolean"))
                    .property(
                        "design",
                        PropertyDescriptor::enumeration(["Standard", "Bold"]),
                    ),
            )
            .unwrap();
        schemas
            .register(
                "Form",
                ClassDescriptor::extending("Control")
                    .property("title", PropertyDescriptor::new("string"))
                    .aggregation("fields", AggregationDescriptor::multiple("Control"))
                    .aggregation("title", AggregationDescriptor::single("Control"))
                    .aggregation("toolbar", AggregationDescriptor::single("Control"))
                    .association("labelledBy", AssociationDescriptor::multiple("Control"))
                    .association("initialFocus", AssociationDescriptor::single("Control"))
                    .event("submit")
                    .default_aggregation("fields"),
            )
            .unwrap();
        tree
    }

    #[test]
    fn properties_are_coerced() {
        let mut tree = tree();
        let label = tree
            .create(
                "Label",
                None,
                Settings::new()
                    .value("text", "Name")
                    .value("width", 12)
                    .value("wrapping", "true")
                    .value("design", "Bold"),
            )
            .unwrap();
        assert_eq!(tree.get_property(label, "text").unwrap(), &json!("Name"));
        assert_eq!(tree.get_property(label, "width").unwrap(), &json!(12));
        assert_eq!(tree.get_property(label, "wrapping").unwrap(), &json!(true));
        assert_eq!(tree.get_property(label, "design").unwrap(), &json!("Bold"));
    }

    #[test]
    fn uncoercible_values_fail_loudly() {
        let mut tree = tree();
        let err = tree
            .create("Label", None, Settings::new().value("wrapping", "maybe"))
            .unwrap_err();
        assert!(matches!(err, ElementError::InvalidSetting { ref key, .. } if key == "wrapping"));

        let err = tree
            .create("Label", None, Settings::new().value("design", "Italic"))
            .unwrap_err();
        assert!(matches!(err, ElementError::InvalidSetting { .. }));
    }

    #[test]
    fn unknown_key_fails() {
        let mut tree = tree();
        assert!(matches!(
            tree.create("Label", None, Settings::new().value("colour", "red")),
            Err(ElementError::UnknownSetting { .. })
        ));
    }

    #[test]
    fn property_wins_name_collisions_unless_prefixed() {
        let mut tree = tree();
        let caption = tree.create("Label", None, Settings::new()).unwrap();
        let form = tree
            .create(
                "Form",
                None,
                Settings::new()
                    .value("title", "Login")
                    .element("aggregation:title", caption),
            )
            .unwrap();
        assert_eq!(tree.get_property(form, "title").unwrap(), &json!("Login"));
        assert_eq!(tree.get_aggregation(form, "title").unwrap(), &[caption]);

        // An element cannot be a property value.
        assert!(matches!(
            tree.create("Form", None, Settings::new().element("title", caption)),
            Err(ElementError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn aggregations_associations_and_events() {
        let mut tree = tree();
        let a = tree.create("Label", Some("a"), Settings::new()).unwrap();
        let b = tree.create("Label", Some("b"), Settings::new()).unwrap();
        let bar = tree.create("Label", None, Settings::new()).unwrap();
        let submitted = Rc::new(Cell::new(false));
        let flag = submitted.clone();

        let form = tree
            .create(
                "Form",
                None,
                Settings::new()
                    .elements("fields", [a, b])
                    .elements("toolbar", [bar])
                    .value("labelledBy", json!(["a", "b"]))
                    .element("initialFocus", b)
                    .on("submit", event_handler(move |_, _| flag.set(true))),
            )
            .unwrap();

        assert_eq!(tree.get_aggregation(form, "fields").unwrap(), &[a, b]);
        assert_eq!(tree.get_aggregation(form, "toolbar").unwrap(), &[bar]);
        assert_eq!(tree.get_association(form, "labelledBy").unwrap(), ["a", "b"]);
        assert_eq!(tree.get_association(form, "initialFocus").unwrap(), ["b"]);

        tree.fire_event(form, "submit", Value::Null).unwrap();
        assert!(submitted.get());
    }

    #[test]
    fn single_aggregation_rejects_lists() {
        let mut tree = tree();
        let a = tree.create("Label", None, Settings::new()).unwrap();
        let b = tree.create("Label", None, Settings::new()).unwrap();
        assert!(matches!(
            tree.create("Form", None, Settings::new().elements("toolbar", [a, b])),
            Err(ElementError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn content_needs_a_default_aggregation() {
        let mut tree = tree();
        let a = tree.create("Label", None, Settings::new()).unwrap();
        let form = tree.create("Form", None, Settings::new().content(a)).unwrap();
        assert_eq!(tree.get_aggregation(form, "fields").unwrap(), &[a]);

        let b = tree.create("Label", None, Settings::new()).unwrap();
        assert_eq!(
            tree.create("Label", None, Settings::new().content(b)),
            Err(ElementError::NoDefaultAggregation("Label".into()))
        );
    }

    #[test]
    fn from_json_object() {
        let mut tree = tree();
        let json = json!({ "id": "nameLabel", "text": "Name", "wrapping": false });
        let settings = Settings::from(json.as_object().cloned().unwrap());
        let label = tree.create("Label", None, settings).unwrap();
        assert_eq!(tree.id(label).unwrap(), "nameLabel");
        assert_eq!(tree.get_property(label, "text").unwrap(), &json!("Name"));
    }
}
