// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Element: a schema-driven UI element tree.
//!
//! Elements are instances of classes described by `understory_schema`. The
//! [`ElementTree`] stores their property values (falling back to schema
//! defaults), owns aggregated children, keeps non-owning associations by id,
//! dispatches events, and decides after every mutation what has to be
//! re-rendered.
//!
//! ## Core Concepts
//!
//! - [`ElementTree`]: arena of elements addressed by generational
//!   [`ElementKey`]s, plus the id registry and the class registry.
//! - [`Settings`]: construction-time `key → value` entries, resolved through
//!   the class schema to properties, aggregations, associations or events.
//! - [`UiArea`]: a render root. Elements placed in an area render there.
//! - [`Invalidation`]: every mutator invalidates the changed element unless
//!   told otherwise. Rendered elements in an area are queued on their own;
//!   everything else bubbles to its owner.
//! - [`RendererRegistry`] and [`ElementTree::rerender`]: the render pass
//!   that drains the queues through per-class [`Renderer`]s.
//!
//! ## Quick Start
//!
//! ```rust
//! use understory_element::{ElementTree, RendererRegistry, Settings};
//! use understory_schema::{ClassDescriptor, PropertyDescriptor};
//!
//! let mut tree = ElementTree::new();
//! let label = tree
//!     .schemas_mut()
//!     .register(
//!         "Label",
//!         ClassDescriptor::extending("Control")
//!             .property("text", PropertyDescriptor::new("string")),
//!     )
//!     .unwrap();
//!
//! let mut renderers = RendererRegistry::new();
//! renderers.register_fn(label, |rm, key| {
//!     let text = rm.tree().get_property(key, "text")?.as_str().unwrap_or_default();
//!     rm.open_start("label", key)?.open_end().write_escaped(text).close("label");
//!     Ok(())
//! });
//!
//! let area = tree.create_area("app");
//! let greeting = tree
//!     .create("Label", Some("greeting"), Settings::new().value("text", "Hello"))
//!     .unwrap();
//! tree.add_area_content(area, greeting).unwrap();
//!
//! tree.rerender(&renderers).unwrap();
//! assert_eq!(
//!     tree.area(area).unwrap().output(greeting),
//!     Some(r#"<label id="greeting">Hello</label>"#)
//! );
//!
//! // Only the changed element is queued for the next pass.
//! tree.set_property(greeting, "text", "Bye").unwrap();
//! assert_eq!(tree.area(area).unwrap().pending(), &[greeting]);
//! ```
//!
//! ## Threading
//!
//! Trees are single-threaded: event handlers are `Rc` closures that receive
//! `&mut ElementTree`.

mod aggregation;
mod area;
mod association;
mod clone;
mod config;
mod element;
mod error;
mod event;
mod invalidate;
mod key;
mod mixin;
mod render;
mod settings;
mod store;
mod tree;

pub use area::UiArea;
pub use config::TreeConfig;
pub use element::ElementFlags;
pub use error::{ElementError, ElementResult, RenderError};
pub use event::{Event, EventHandler, event_handler};
pub use invalidate::Invalidation;
pub use key::{AreaId, ElementKey};
pub use mixin::{ClassMixin, EnabledPropagator};
pub use render::{RenderManager, RenderReport, Renderer, RendererRegistry};
pub use settings::{SettingValue, Settings};
pub use tree::ElementTree;
