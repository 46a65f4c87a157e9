// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flattened class schemas.
//!
//! A [`ClassSchema`] is produced once per class by
//! [`SchemaRegistry::register`](crate::SchemaRegistry::register). It copies
//! the flattened views of its base class at derivation time and layers its own
//! declarations on top, so lookups never walk the base chain.

use hashbrown::HashMap;
use serde_json::Value;

use crate::descriptor::{ClassDescriptor, PropertyDescriptor, singular_of};
use crate::error::{SchemaError, SchemaResult};
use crate::id::{ClassId, PropertyId};
use crate::uid::uid_token;
use crate::value::SemanticType;

/// Whether an aggregation or association holds one target or a list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    /// At most one target.
    Single,
    /// An ordered list of targets.
    Multiple,
}

impl Multiplicity {
    fn from_multiple(multiple: bool) -> Self {
        if multiple { Self::Multiple } else { Self::Single }
    }
}

/// What a settings key resolves to.
///
/// The declaration order is the precedence order used when one name exists in
/// several categories: a lower variant wins.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingKind {
    /// A property setter.
    Property,
    /// A single aggregation setter.
    SingleAggregation,
    /// A multi aggregation appender.
    MultipleAggregation,
    /// A single association setter.
    SingleAssociation,
    /// A multi association appender.
    MultipleAssociation,
    /// An event attacher.
    Event,
}

/// A resolved property declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyInfo {
    name: String,
    ty: SemanticType,
    default_value: Value,
    group: String,
    owner: ClassId,
}

impl PropertyInfo {
    /// Property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    #[must_use]
    pub fn semantic_type(&self) -> &SemanticType {
        &self.ty
    }

    /// Default value, already coerced to the declared type.
    #[must_use]
    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    /// Mutability group.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Class that declared (or last overrode) this property.
    #[must_use]
    pub fn owner(&self) -> ClassId {
        self.owner
    }

    fn resolve(
        class: &str,
        owner: ClassId,
        name: &str,
        descriptor: &PropertyDescriptor,
    ) -> SchemaResult<Self> {
        let ty = if descriptor.type_tag == "enum" {
            if descriptor.values.is_empty() {
                return Err(SchemaError::EmptyEnum {
                    class: class.into(),
                    property: name.into(),
                });
            }
            SemanticType::Enum(descriptor.values.clone())
        } else {
            SemanticType::parse(&descriptor.type_tag).ok_or_else(|| SchemaError::UnknownType {
                class: class.into(),
                property: name.into(),
                type_tag: descriptor.type_tag.clone(),
            })?
        };
        let default_value = match &descriptor.default_value {
            None => ty.default_value(),
            Some(value) => ty
                .coerce(value.clone())
                .map_err(|value| SchemaError::InvalidDefault {
                    class: class.into(),
                    property: name.into(),
                    type_tag: ty.to_string(),
                    value,
                })?,
        };
        Ok(Self {
            name: name.into(),
            ty,
            default_value,
            group: descriptor.group.clone(),
            owner,
        })
    }
}

/// A resolved aggregation or association declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkInfo {
    name: String,
    element_type: String,
    multiplicity: Multiplicity,
    singular_name: String,
    owner: ClassId,
}

/// A resolved aggregation declaration.
pub type AggregationInfo = LinkInfo;

/// A resolved association declaration.
pub type AssociationInfo = LinkInfo;

impl LinkInfo {
    fn new(
        owner: ClassId,
        name: &str,
        element_type: &str,
        multiple: bool,
        singular_name: Option<&String>,
    ) -> Self {
        Self {
            name: name.into(),
            element_type: element_type.into(),
            multiplicity: Multiplicity::from_multiple(multiple),
            singular_name: singular_name.cloned().unwrap_or_else(|| singular_of(name)),
            owner,
        }
    }

    /// Name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class name that targets must derive from.
    #[must_use]
    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    /// Single or multiple.
    #[must_use]
    pub fn multiplicity(&self) -> Multiplicity {
        self.multiplicity
    }

    /// Shorthand for `multiplicity() == Multiplicity::Multiple`.
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.multiplicity == Multiplicity::Multiple
    }

    /// Singular name, used to name per-item mutators (`addItem`, `removeItem`).
    #[must_use]
    pub fn singular_name(&self) -> &str {
        &self.singular_name
    }

    /// Class that declared (or last overrode) this link.
    #[must_use]
    pub fn owner(&self) -> ClassId {
        self.owner
    }
}

/// A resolved event declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventInfo {
    name: String,
    allow_prevent_default: bool,
    owner: ClassId,
}

impl EventInfo {
    /// Event name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether handlers may cancel the default action.
    #[must_use]
    pub fn allow_prevent_default(&self) -> bool {
        self.allow_prevent_default
    }

    /// Class that declared this event.
    #[must_use]
    pub fn owner(&self) -> ClassId {
        self.owner
    }
}

/// An ordered, name-indexed list of declarations.
///
/// Overriding a name replaces the entry in place so positions stay stable.
#[derive(Clone, Debug)]
struct Declarations<T> {
    entries: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Declarations<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Declarations<T> {
    fn upsert(&mut self, name: &str, entry: T) -> usize {
        if let Some(&idx) = self.index.get(name) {
            self.entries[idx] = entry;
            idx
        } else {
            let idx = self.entries.len();
            self.entries.push(entry);
            self.index.insert(name.into(), idx);
            idx
        }
    }

    fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&idx| &self.entries[idx])
    }
}

/// The flattened schema of one class.
///
/// Every view (`all_properties`, `all_aggregations`, ...) contains the
/// declarations of the class and all its ancestors, ancestors first, with
/// same-named declarations of the class replacing the inherited ones.
#[derive(Clone, Debug)]
pub struct ClassSchema {
    id: ClassId,
    name: String,
    base: Option<ClassId>,
    uid_token: String,
    properties: Declarations<PropertyInfo>,
    aggregations: Declarations<AggregationInfo>,
    associations: Declarations<AssociationInfo>,
    events: Declarations<EventInfo>,
    default_aggregation: Option<String>,
    defaults: HashMap<String, Value>,
    json_keys: HashMap<String, SettingKind>,
}

impl ClassSchema {
    /// Derives a schema from a base schema (if any) and a descriptor.
    pub(crate) fn derive(
        id: ClassId,
        name: &str,
        base: Option<&Self>,
        descriptor: &ClassDescriptor,
    ) -> SchemaResult<Self> {
        let mut schema = match base {
            Some(base) => Self {
                id,
                name: name.into(),
                base: Some(base.id),
                uid_token: uid_token(name),
                properties: base.properties.clone(),
                aggregations: base.aggregations.clone(),
                associations: base.associations.clone(),
                events: base.events.clone(),
                default_aggregation: base.default_aggregation.clone(),
                defaults: HashMap::new(),
                json_keys: HashMap::new(),
            },
            None => Self {
                id,
                name: name.into(),
                base: None,
                uid_token: uid_token(name),
                properties: Declarations::default(),
                aggregations: Declarations::default(),
                associations: Declarations::default(),
                events: Declarations::default(),
                default_aggregation: None,
                defaults: HashMap::new(),
                json_keys: HashMap::new(),
            },
        };

        for (prop_name, property) in &descriptor.properties {
            let info = PropertyInfo::resolve(name, id, prop_name, property)?;
            schema.properties.upsert(prop_name, info);
        }
        for (agg_name, aggregation) in &descriptor.aggregations {
            let info = LinkInfo::new(
                id,
                agg_name,
                &aggregation.type_tag,
                aggregation.multiple,
                aggregation.singular_name.as_ref(),
            );
            schema.aggregations.upsert(agg_name, info);
        }
        for (assoc_name, association) in &descriptor.associations {
            let info = LinkInfo::new(
                id,
                assoc_name,
                &association.type_tag,
                association.multiple,
                association.singular_name.as_ref(),
            );
            schema.associations.upsert(assoc_name, info);
        }
        for (event_name, event) in &descriptor.events {
            let info = EventInfo {
                name: event_name.clone(),
                allow_prevent_default: event.allow_prevent_default,
                owner: id,
            };
            schema.events.upsert(event_name, info);
        }

        if let Some(default_aggregation) = &descriptor.default_aggregation {
            if schema.aggregations.get(default_aggregation).is_none() {
                return Err(SchemaError::UnknownDefaultAggregation {
                    class: name.into(),
                    aggregation: default_aggregation.clone(),
                });
            }
            schema.default_aggregation = Some(default_aggregation.clone());
        }
        if schema.properties.entries.len() > usize::from(u16::MAX) {
            return Err(SchemaError::TooManyProperties(name.into()));
        }

        schema.rebuild_caches();
        Ok(schema)
    }

    /// Late-binds a property; see [`SchemaRegistry::add_property`](crate::SchemaRegistry::add_property).
    pub(crate) fn add_property(
        &mut self,
        name: &str,
        descriptor: &PropertyDescriptor,
    ) -> SchemaResult<PropertyId> {
        let info = PropertyInfo::resolve(&self.name, self.id, name, descriptor)?;
        if self.properties.get(name).is_none()
            && self.properties.entries.len() >= usize::from(u16::MAX)
        {
            return Err(SchemaError::TooManyProperties(self.name.clone()));
        }
        let idx = self.properties.upsert(name, info);
        self.rebuild_caches();
        Ok(property_id(idx))
    }

    fn rebuild_caches(&mut self) {
        self.defaults = self
            .properties
            .entries
            .iter()
            .map(|p| (p.name.clone(), p.default_value.clone()))
            .collect();

        let mut keys: HashMap<String, SettingKind> = HashMap::new();
        let mut add = |name: &str, kind: SettingKind| {
            match keys.get_mut(name) {
                Some(existing) if kind < *existing => *existing = kind,
                Some(_) => {}
                None => {
                    keys.insert(name.to_owned(), kind);
                }
            }
        };
        for p in &self.properties.entries {
            add(&p.name, SettingKind::Property);
        }
        for a in &self.aggregations.entries {
            let kind = if a.is_multiple() {
                SettingKind::MultipleAggregation
            } else {
                SettingKind::SingleAggregation
            };
            add(&a.name, kind);
        }
        for a in &self.associations.entries {
            let kind = if a.is_multiple() {
                SettingKind::MultipleAssociation
            } else {
                SettingKind::SingleAssociation
            };
            add(&a.name, kind);
        }
        for e in &self.events.entries {
            add(&e.name, SettingKind::Event);
        }
        self.json_keys = keys;
    }

    /// Class id.
    #[must_use]
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base class, or `None` for a root class.
    #[must_use]
    pub fn base(&self) -> Option<ClassId> {
        self.base
    }

    /// Token used for generated ids of this class.
    #[must_use]
    pub fn uid_token(&self) -> &str {
        &self.uid_token
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// All properties, ancestors first.
    ///
    /// Inherited entries come first. Entries declared by one class follow in
    /// name order, because descriptors keep their members in sorted maps;
    /// declaration order in source or JSON is not preserved.
    #[must_use]
    pub fn all_properties(&self) -> &[PropertyInfo] {
        &self.properties.entries
    }

    /// Properties declared or overridden by this class itself.
    pub fn own_properties(&self) -> impl Iterator<Item = &PropertyInfo> + '_ {
        self.properties
            .entries
            .iter()
            .filter(move |p| p.owner == self.id)
    }

    /// Looks up a property id by name.
    #[must_use]
    pub fn property_id(&self, name: &str) -> Option<PropertyId> {
        self.properties.index.get(name).map(|&idx| property_id(idx))
    }

    /// Looks up a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.get(name)
    }

    /// Looks up a property by id.
    #[must_use]
    pub fn property_by_id(&self, id: PropertyId) -> Option<&PropertyInfo> {
        self.properties.entries.get(usize::from(id.index()))
    }

    /// Default value of every property, keyed by name.
    ///
    /// Explicit defaults win over type defaults, and a class's defaults win over
    /// inherited ones. The map is computed when the schema is derived and
    /// refreshed by late-bound properties.
    #[must_use]
    pub fn property_defaults(&self) -> &HashMap<String, Value> {
        &self.defaults
    }

    // =========================================================================
    // Aggregations, associations, events
    // =========================================================================

    /// All aggregations, ancestors first.
    ///
    /// Ordered like [`all_properties`](Self::all_properties).
    #[must_use]
    pub fn all_aggregations(&self) -> &[AggregationInfo] {
        &self.aggregations.entries
    }

    /// Looks up an aggregation by name.
    #[must_use]
    pub fn aggregation(&self, name: &str) -> Option<&AggregationInfo> {
        self.aggregations.get(name)
    }

    /// The aggregation receiving untyped settings content.
    #[must_use]
    pub fn default_aggregation(&self) -> Option<&AggregationInfo> {
        self.default_aggregation
            .as_deref()
            .and_then(|name| self.aggregations.get(name))
    }

    /// All associations, ancestors first.
    ///
    /// Ordered like [`all_properties`](Self::all_properties).
    #[must_use]
    pub fn all_associations(&self) -> &[AssociationInfo] {
        &self.associations.entries
    }

    /// Looks up an association by name.
    #[must_use]
    pub fn association(&self, name: &str) -> Option<&AssociationInfo> {
        self.associations.get(name)
    }

    /// All events, ancestors first.
    ///
    /// Ordered like [`all_properties`](Self::all_properties).
    #[must_use]
    pub fn all_events(&self) -> &[EventInfo] {
        &self.events.entries
    }

    /// Looks up an event by name.
    #[must_use]
    pub fn event(&self, name: &str) -> Option<&EventInfo> {
        self.events.get(name)
    }

    // =========================================================================
    // Settings keys
    // =========================================================================

    /// Name → kind table used to resolve settings keys.
    ///
    /// When a name is declared in several categories the lowest
    /// [`SettingKind`] wins (property before aggregation before association
    /// before event).
    #[must_use]
    pub fn json_keys(&self) -> &HashMap<String, SettingKind> {
        &self.json_keys
    }

    /// Resolves a settings key to its kind and bare name.
    ///
    /// A `property:`, `aggregation:`, `association:` or `event:` prefix
    /// restricts the lookup to that category and bypasses the precedence of
    /// [`json_keys`](Self::json_keys).
    ///
    /// ```rust
    /// use understory_schema::{ClassDescriptor, PropertyDescriptor, SchemaRegistry, SettingKind};
    ///
    /// let mut registry = SchemaRegistry::new();
    /// let id = registry
    ///     .register(
    ///         "Tile",
    ///         ClassDescriptor::new()
    ///             .property("press", PropertyDescriptor::new("boolean"))
    ///             .event("press"),
    ///     )
    ///     .unwrap();
    /// let tile = &registry[id];
    ///
    /// assert_eq!(tile.resolve_setting("press"), Some((SettingKind::Property, "press")));
    /// assert_eq!(tile.resolve_setting("event:press"), Some((SettingKind::Event, "press")));
    /// assert_eq!(tile.resolve_setting("aggregation:press"), None);
    /// ```
    #[must_use]
    pub fn resolve_setting<'k>(&self, key: &'k str) -> Option<(SettingKind, &'k str)> {
        let Some((prefix, name)) = key.split_once(':') else {
            return self.json_keys.get(key).map(|&kind| (kind, key));
        };
        let kind = match prefix {
            "property" => self.property(name).map(|_| SettingKind::Property),
            "aggregation" => self.aggregation(name).map(|a| {
                if a.is_multiple() {
                    SettingKind::MultipleAggregation
                } else {
                    SettingKind::SingleAggregation
                }
            }),
            "association" => self.association(name).map(|a| {
                if a.is_multiple() {
                    SettingKind::MultipleAssociation
                } else {
                    SettingKind::SingleAssociation
                }
            }),
            "event" => self.event(name).map(|_| SettingKind::Event),
            _ => None,
        };
        kind.map(|kind| (kind, name))
    }
}

fn property_id(idx: usize) -> PropertyId {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "property count is capped at u16::MAX"
    )]
    let index = idx as u16;
    PropertyId::new(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{AggregationDescriptor, AssociationDescriptor};
    use serde_json::json;

    fn base() -> ClassSchema {
        let descriptor = ClassDescriptor::new()
            .property("text", PropertyDescriptor::new("string").default_value("base"))
            .property("width", PropertyDescriptor::new("int"))
            .aggregation("items", AggregationDescriptor::multiple("Element"));
        ClassSchema::derive(ClassId::new(0), "Base", None, &descriptor).unwrap()
    }

    #[test]
    fn root_schema_views() {
        let schema = base();
        assert_eq!(schema.all_properties().len(), 2);
        assert_eq!(schema.own_properties().count(), 2);
        assert_eq!(schema.property_id("width"), Some(PropertyId::new(1)));
        assert_eq!(schema.property_defaults()["text"], json!("base"));
        assert_eq!(schema.property_defaults()["width"], json!(0));
        assert_eq!(schema.aggregation("items").unwrap().singular_name(), "item");
        assert_eq!(schema.uid_token(), "base");
    }

    #[test]
    fn subtype_overrides_in_place() {
        let base = base();
        let descriptor = ClassDescriptor::extending("Base")
            .property("text", PropertyDescriptor::new("string").default_value("sub"))
            .property("height", PropertyDescriptor::new("float"));
        let sub = ClassSchema::derive(ClassId::new(1), "Sub", Some(&base), &descriptor).unwrap();

        assert_eq!(sub.all_properties().len(), 3);
        // Overridden property keeps its inherited position.
        assert_eq!(sub.property_id("text"), Some(PropertyId::new(0)));
        assert_eq!(sub.property("text").unwrap().owner(), ClassId::new(1));
        assert_eq!(sub.property_defaults()["text"], json!("sub"));
        assert_eq!(sub.property_defaults()["width"], json!(0));
        assert_eq!(sub.own_properties().count(), 2);
        assert!(sub.aggregation("items").is_some());

        // The base is untouched.
        assert_eq!(base.property_defaults()["text"], json!("base"));
    }

    #[test]
    fn own_entries_follow_name_order() {
        let base = base();
        let descriptor = ClassDescriptor::extending("Base")
            .property("zoom", PropertyDescriptor::new("float"))
            .property("alpha", PropertyDescriptor::new("float"))
            .event("submit")
            .event("change");
        let sub = ClassSchema::derive(ClassId::new(1), "Sub", Some(&base), &descriptor).unwrap();

        let names: Vec<_> = sub.all_properties().iter().map(PropertyInfo::name).collect();
        assert_eq!(names, ["text", "width", "alpha", "zoom"]);
        let events: Vec<_> = sub.all_events().iter().map(EventInfo::name).collect();
        assert_eq!(events, ["change", "submit"]);
    }

    #[test]
    fn default_aggregation_is_inherited() {
        let mut descriptor = ClassDescriptor::new()
            .aggregation("content", AggregationDescriptor::multiple("Element"));
        descriptor.default_aggregation = Some("content".into());
        let base = ClassSchema::derive(ClassId::new(0), "Box", None, &descriptor).unwrap();
        let sub = ClassSchema::derive(
            ClassId::new(1),
            "VBox",
            Some(&base),
            &ClassDescriptor::extending("Box"),
        )
        .unwrap();
        assert_eq!(sub.default_aggregation().unwrap().name(), "content");
    }

    #[test]
    fn unknown_default_aggregation_is_rejected() {
        let descriptor = ClassDescriptor::new().default_aggregation("content");
        let err = ClassSchema::derive(ClassId::new(0), "Box", None, &descriptor).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownDefaultAggregation { .. }));
    }

    #[test]
    fn invalid_default_is_rejected() {
        let descriptor = ClassDescriptor::new()
            .property("count", PropertyDescriptor::new("int").default_value("many"));
        let err = ClassSchema::derive(ClassId::new(0), "Counter", None, &descriptor).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefault { .. }));

        let descriptor = ClassDescriptor::new()
            .property("count", PropertyDescriptor::new("int").default_value("3"));
        let schema = ClassSchema::derive(ClassId::new(0), "Counter", None, &descriptor).unwrap();
        assert_eq!(schema.property_defaults()["count"], json!(3));
    }

    #[test]
    fn unknown_type_and_empty_enum_are_rejected() {
        let descriptor = ClassDescriptor::new()
            .property("size", PropertyDescriptor::new("sap.ui.core.CSSSize"));
        assert!(matches!(
            ClassSchema::derive(ClassId::new(0), "A", None, &descriptor),
            Err(SchemaError::UnknownType { .. })
        ));

        let descriptor = ClassDescriptor::new()
            .property("mode", PropertyDescriptor::enumeration(Vec::<String>::new()));
        assert!(matches!(
            ClassSchema::derive(ClassId::new(0), "A", None, &descriptor),
            Err(SchemaError::EmptyEnum { .. })
        ));
    }

    #[test]
    fn json_keys_precedence() {
        let descriptor = ClassDescriptor::new()
            .property("shared", PropertyDescriptor::new("string"))
            .aggregation("shared", AggregationDescriptor::single("Element"))
            .aggregation("link", AggregationDescriptor::multiple("Element"))
            .association("link", AssociationDescriptor::single("Element"))
            .association("target", AssociationDescriptor::multiple("Element"))
            .event("target");
        let schema = ClassSchema::derive(ClassId::new(0), "A", None, &descriptor).unwrap();
        let keys = schema.json_keys();

        assert_eq!(keys["shared"], SettingKind::Property);
        assert_eq!(keys["link"], SettingKind::MultipleAggregation);
        assert_eq!(keys["target"], SettingKind::MultipleAssociation);

        assert_eq!(
            schema.resolve_setting("aggregation:shared"),
            Some((SettingKind::SingleAggregation, "shared"))
        );
        assert_eq!(
            schema.resolve_setting("association:link"),
            Some((SettingKind::SingleAssociation, "link"))
        );
        assert_eq!(
            schema.resolve_setting("event:target"),
            Some((SettingKind::Event, "target"))
        );
        assert_eq!(schema.resolve_setting("nothing"), None);
        assert_eq!(schema.resolve_setting("bogus:shared"), None);
    }

    #[test]
    fn add_property_appends_and_refreshes_caches() {
        let mut schema = base();
        let id = schema
            .add_property("enabled", &PropertyDescriptor::new("boolean").default_value(true))
            .unwrap();
        assert_eq!(id, PropertyId::new(2));
        assert_eq!(schema.property_defaults()["enabled"], json!(true));
        assert_eq!(schema.json_keys()["enabled"], SettingKind::Property);

        // Re-adding overrides in place.
        let again = schema
            .add_property("enabled", &PropertyDescriptor::new("boolean"))
            .unwrap();
        assert_eq!(again, id);
        assert_eq!(schema.property_defaults()["enabled"], json!(false));
    }
}
