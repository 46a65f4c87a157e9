// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static class descriptors.
//!
//! A [`ClassDescriptor`] is the declarative input to
//! [`SchemaRegistry::register`](crate::SchemaRegistry::register). It can be
//! deserialized from JSON or assembled in code with the builder-style methods.
//!
//! ```rust
//! use serde_json::json;
//! use understory_schema::{AggregationDescriptor, ClassDescriptor, PropertyDescriptor};
//!
//! let from_json: ClassDescriptor = serde_json::from_value(json!({
//!     "baseType": "Control",
//!     "properties": { "text": { "type": "string" } },
//!     "aggregations": { "items": { "type": "Control", "multiple": true } },
//!     "events": { "press": {} },
//!     "defaultAggregation": "items"
//! }))
//! .unwrap();
//!
//! let in_code = ClassDescriptor::extending("Control")
//!     .property("text", PropertyDescriptor::new("string"))
//!     .aggregation("items", AggregationDescriptor::multiple("Control"))
//!     .event("press")
//!     .default_aggregation("items");
//!
//! assert_eq!(from_json, in_code);
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Declarative description of one class.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClassDescriptor {
    /// Name of the base class, or `None` for a root class.
    #[serde(default)]
    pub base_type: Option<String>,
    /// Properties declared by this class.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyDescriptor>,
    /// Aggregations declared by this class.
    #[serde(default)]
    pub aggregations: BTreeMap<String, AggregationDescriptor>,
    /// Associations declared by this class.
    #[serde(default)]
    pub associations: BTreeMap<String, AssociationDescriptor>,
    /// Events declared by this class.
    #[serde(default)]
    pub events: BTreeMap<String, EventDescriptor>,
    /// Aggregation receiving untyped content in settings.
    #[serde(default)]
    pub default_aggregation: Option<String>,
}

impl ClassDescriptor {
    /// Creates an empty root class descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty descriptor deriving from `base_type`.
    #[must_use]
    pub fn extending(base_type: impl Into<String>) -> Self {
        Self {
            base_type: Some(base_type.into()),
            ..Self::default()
        }
    }

    /// Adds a property declaration.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, property: PropertyDescriptor) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    /// Adds an aggregation declaration.
    #[must_use]
    pub fn aggregation(
        mut self,
        name: impl Into<String>,
        aggregation: AggregationDescriptor,
    ) -> Self {
        self.aggregations.insert(name.into(), aggregation);
        self
    }

    /// Adds an association declaration.
    #[must_use]
    pub fn association(
        mut self,
        name: impl Into<String>,
        association: AssociationDescriptor,
    ) -> Self {
        self.associations.insert(name.into(), association);
        self
    }

    /// Adds an event declaration.
    #[must_use]
    pub fn event(mut self, name: impl Into<String>) -> Self {
        self.events.insert(name.into(), EventDescriptor::default());
        self
    }

    /// Sets the default aggregation.
    #[must_use]
    pub fn default_aggregation(mut self, name: impl Into<String>) -> Self {
        self.default_aggregation = Some(name.into());
        self
    }
}

fn any_type() -> String {
    "any".into()
}

fn element_type() -> String {
    "Element".into()
}

fn misc_group() -> String {
    "Misc".into()
}

fn yes() -> bool {
    true
}

/// Declaration of a property.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PropertyDescriptor {
    /// Semantic type tag (`boolean`, `int`, `float`, `string`, `string[]`,
    /// `object`, `any` or `enum`).
    #[serde(rename = "type", default = "any_type")]
    pub type_tag: String,
    /// Explicit default; the type default is used when absent.
    #[serde(default)]
    pub default_value: Option<Value>,
    /// Mutability group, informational only.
    #[serde(default = "misc_group")]
    pub group: String,
    /// Allowed values when `type_tag` is `enum`.
    #[serde(default)]
    pub values: Vec<String>,
}

impl PropertyDescriptor {
    /// Creates a property of the given type tag with the type default.
    #[must_use]
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            default_value: None,
            group: misc_group(),
            values: Vec::new(),
        }
    }

    /// Creates an enumeration property. The first value is the type default.
    #[must_use]
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            ..Self::new("enum")
        }
    }

    /// Sets an explicit default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Sets the group.
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }
}

/// Declaration of an aggregation.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AggregationDescriptor {
    /// Class name every child must derive from.
    #[serde(rename = "type", default = "element_type")]
    pub type_tag: String,
    /// Whether the aggregation holds an ordered list of children.
    #[serde(default = "yes")]
    pub multiple: bool,
    /// Singular form of the name; derived from the name when absent.
    #[serde(default)]
    pub singular_name: Option<String>,
}

impl AggregationDescriptor {
    /// A multi-valued aggregation of `type_tag` children.
    #[must_use]
    pub fn multiple(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            multiple: true,
            singular_name: None,
        }
    }

    /// A single-valued aggregation of a `type_tag` child.
    #[must_use]
    pub fn single(type_tag: impl Into<String>) -> Self {
        Self {
            multiple: false,
            ..Self::multiple(type_tag)
        }
    }

    /// Overrides the singular name.
    #[must_use]
    pub fn singular_name(mut self, name: impl Into<String>) -> Self {
        self.singular_name = Some(name.into());
        self
    }
}

/// Declaration of an association.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssociationDescriptor {
    /// Class name of the referenced elements.
    #[serde(rename = "type", default = "element_type")]
    pub type_tag: String,
    /// Whether the association holds an ordered list of ids.
    #[serde(default)]
    pub multiple: bool,
    /// Singular form of the name; derived from the name when absent.
    #[serde(default)]
    pub singular_name: Option<String>,
}

impl AssociationDescriptor {
    /// A single-valued association.
    #[must_use]
    pub fn single(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            multiple: false,
            singular_name: None,
        }
    }

    /// A multi-valued association.
    #[must_use]
    pub fn multiple(type_tag: impl Into<String>) -> Self {
        Self {
            multiple: true,
            ..Self::single(type_tag)
        }
    }
}

/// Declaration of an event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EventDescriptor {
    /// Whether handlers may cancel the default action.
    #[serde(default)]
    pub allow_prevent_default: bool,
}

/// Derives the singular form of a plural aggregation or association name.
///
/// `items` becomes `item`, `entries` becomes `entry`, `boxes` becomes `box`
/// and `shelves` becomes `shelf`. Names that do not look plural (`content`)
/// are returned unchanged.
#[must_use]
pub fn singular_of(name: &str) -> String {
    const RULES: &[(&str, &str)] = &[
        ("ies", "y"),
        ("lves", "lf"),
        ("eaves", "eaf"),
        ("aches", "ache"),
        ("ches", "ch"),
        ("shes", "sh"),
        ("sses", "ss"),
        ("xes", "x"),
        ("oes", "o"),
    ];
    for &(plural, singular) in RULES {
        if let Some(stem) = name.strip_suffix(plural)
            && !stem.is_empty()
        {
            return format!("{stem}{singular}");
        }
    }
    match name.strip_suffix('s') {
        Some(stem) if !stem.is_empty() && !stem.ends_with('s') => stem.into(),
        _ => name.into(),
    }
}
