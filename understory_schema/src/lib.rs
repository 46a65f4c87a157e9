// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Schema: inheritable class schemas for UI elements.
//!
//! This crate describes *what* a widget class is made of. A class declares
//! properties, aggregations (owned children), associations (non-owning id
//! references) and events. The registry flattens each class together with its
//! ancestors into an immutable [`ClassSchema`] that element runtimes (such as
//! `understory_element`) consult for defaults, accessor names and settings
//! resolution.
//!
//! ## Core Concepts
//!
//! - [`ClassDescriptor`]: the static, declarative description of one class,
//!   loadable from JSON.
//! - [`SchemaRegistry`]: registers descriptors, links each class to its base,
//!   and owns the per-token counters behind generated ids.
//! - [`ClassSchema`]: the flattened result. A class's views are always a
//!   superset of its base's views; same-named declarations override.
//! - [`SemanticType`]: property type tags with defaults and coercion of
//!   loosely typed settings values.
//! - [`SettingKind`]: what a settings key resolves to, ordered by precedence.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use understory_schema::{
//!     AggregationDescriptor, ClassDescriptor, PropertyDescriptor, SchemaRegistry, SettingKind,
//! };
//!
//! let mut registry = SchemaRegistry::with_core_classes();
//!
//! let list = registry
//!     .register(
//!         "List",
//!         ClassDescriptor::extending("Control")
//!             .property("headerText", PropertyDescriptor::new("string"))
//!             .aggregation("items", AggregationDescriptor::multiple("Control"))
//!             .default_aggregation("items")
//!             .event("select"),
//!     )
//!     .unwrap();
//!
//! let schema = &registry[list];
//! assert_eq!(schema.property_defaults()["visible"], json!(true));
//! assert_eq!(schema.aggregation("items").unwrap().singular_name(), "item");
//! assert_eq!(schema.resolve_setting("select"), Some((SettingKind::Event, "select")));
//! assert_eq!(registry.uid(list), "__list0");
//! ```
//!
//! ## Ordering Contract
//!
//! Subclass schemas are frozen when they are registered.
//! [`SchemaRegistry::add_property`] therefore only reaches subclasses that
//! are registered after the call.

mod descriptor;
mod error;
mod id;
mod registry;
mod schema;
mod uid;
mod value;

pub use descriptor::{
    AggregationDescriptor, AssociationDescriptor, ClassDescriptor, EventDescriptor,
    PropertyDescriptor, singular_of,
};
pub use error::{SchemaError, SchemaResult};
pub use id::{ClassId, PropertyId};
pub use registry::{CONTROL, ELEMENT, SchemaRegistry};
pub use schema::{
    AggregationInfo, AssociationInfo, ClassSchema, EventInfo, LinkInfo, Multiplicity,
    PropertyInfo, SettingKind,
};
pub use serde_json::Value;
pub use uid::{DEFAULT_UID_PREFIX, UidGenerator, uid_token};
pub use value::SemanticType;
