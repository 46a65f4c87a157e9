// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `understory_element` crate.
//!
//! These drive a small list widget hierarchy through the public API: property
//! defaults and writes, ownership of aggregated children, event dispatch,
//! cloning, and how invalidation feeds the render pass.

use core::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};
use understory_element::{
    ElementError, ElementTree, Invalidation, RendererRegistry, Settings, TreeConfig, event_handler,
};
use understory_schema::{AggregationDescriptor, ClassDescriptor, PropertyDescriptor};

fn tree() -> (ElementTree, RendererRegistry) {
    let mut tree = ElementTree::new();
    let schemas = tree.schemas_mut();
    let item = schemas
        .register(
            "Item",
            ClassDescriptor::extending("Control")
                .property("title", PropertyDescriptor::new("string"))
                .property("enabled", PropertyDescriptor::new("boolean").default_value(true))
                .property("weight", PropertyDescriptor::new("float").default_value(12.0))
                .event("press"),
        )
        .unwrap();
    let list = schemas
        .register(
            "List",
            ClassDescriptor::extending("Control")
                .aggregation("items", AggregationDescriptor::multiple("Item"))
                .default_aggregation("items"),
        )
        .unwrap();

    let mut renderers = RendererRegistry::new();
    renderers.register_fn(item, |rm, key| {
        let title = rm.tree().get_property(key, "title")?.as_str().unwrap_or_default();
        rm.open_start("li", key)?.open_end().write_escaped(title).close("li");
        Ok(())
    });
    renderers.register_fn(list, |rm, key| {
        rm.open_start("ul", key)?.open_end();
        for &item in rm.tree().get_aggregation(key, "items")? {
            rm.render_control(item)?;
        }
        rm.close("ul");
        Ok(())
    });
    (tree, renderers)
}

#[test]
fn defaults_until_written() {
    let (mut tree, _) = tree();
    let item = tree.create("Item", None, Settings::new()).unwrap();
    assert_eq!(tree.get_property(item, "enabled").unwrap(), &json!(true));
    assert_eq!(tree.get_property(item, "title").unwrap(), &json!(""));
    assert_eq!(tree.get_property(item, "visible").unwrap(), &json!(true));

    assert!(tree.set_property(item, "enabled", false).unwrap());
    assert_eq!(tree.get_property(item, "enabled").unwrap(), &json!(false));
    assert!(!tree.set_property(item, "enabled", false).unwrap());

    assert!(matches!(
        tree.set_property(item, "colour", "red"),
        Err(ElementError::UnknownProperty { .. })
    ));
}

#[test]
fn index_of_follows_removals() {
    let (mut tree, _) = tree();
    let list = tree.create("List", None, Settings::new()).unwrap();
    let a = tree.create("Item", None, Settings::new()).unwrap();
    let b = tree.create("Item", None, Settings::new()).unwrap();

    tree.add_aggregation(list, "items", a).unwrap();
    tree.add_aggregation(list, "items", b).unwrap();
    assert_eq!(tree.index_of_aggregation(list, "items", b).unwrap(), Some(1));
    assert_eq!(tree.parent(b), Some(list));

    assert_eq!(tree.remove_aggregation(list, "items", a).unwrap(), Some(a));
    assert_eq!(tree.index_of_aggregation(list, "items", b).unwrap(), Some(0));
    assert_eq!(tree.parent(a), None);
    assert_eq!(tree.remove_aggregation(list, "items", a).unwrap(), None);
}

#[test]
fn insert_clamps_and_destroy_invalidates_handles() {
    let (mut tree, _) = tree();
    let list = tree.create("List", None, Settings::new()).unwrap();
    let a = tree.create("Item", None, Settings::new()).unwrap();
    let b = tree.create("Item", None, Settings::new()).unwrap();
    let c = tree.create("Item", None, Settings::new()).unwrap();

    tree.insert_aggregation(list, "items", a, 10).unwrap();
    tree.insert_aggregation(list, "items", b, -3).unwrap();
    tree.insert_aggregation(list, "items", c, 1).unwrap();
    assert_eq!(tree.get_aggregation(list, "items").unwrap(), &[b, c, a]);

    tree.destroy_aggregation(list, "items").unwrap();
    assert!(tree.get_aggregation(list, "items").unwrap().is_empty());
    for key in [a, b, c] {
        assert!(tree.is_destroyed(key));
        assert_eq!(
            tree.get_property(key, "title"),
            Err(ElementError::UnknownElement(key))
        );
    }
}

#[test]
fn handlers_run_in_attach_order_with_shared_parameters() {
    let (mut tree, _) = tree();
    let item = tree.create("Item", None, Settings::new()).unwrap();
    let calls = Rc::new(RefCell::new(Vec::new()));

    for name in ["h1", "h2"] {
        let calls = calls.clone();
        tree.attach_event(
            item,
            "press",
            event_handler(move |_, event| {
                calls.borrow_mut().push((name, event.parameters().clone()));
            }),
        )
        .unwrap();
    }

    assert!(tree.fire_event(item, "press", json!({ "x": 1 })).unwrap());
    assert_eq!(
        *calls.borrow(),
        vec![("h1", json!({ "x": 1 })), ("h2", json!({ "x": 1 }))]
    );
}

#[test]
fn settings_build_a_tree() {
    let (mut tree, _) = tree();
    let pressed = Rc::new(RefCell::new(0));
    let counter = pressed.clone();
    let a = tree
        .create("Item", Some("a"), Settings::new().value("title", "A"))
        .unwrap();
    let b = tree
        .create(
            "Item",
            Some("b"),
            Settings::new()
                .value("enabled", "false")
                .on("press", event_handler(move |_, _| *counter.borrow_mut() += 1)),
        )
        .unwrap();
    let list = tree
        .create("List", Some("list"), Settings::new().content(a).content(b))
        .unwrap();

    assert_eq!(tree.get_aggregation(list, "items").unwrap(), &[a, b]);
    assert_eq!(tree.get_property(b, "enabled").unwrap(), &json!(false));
    assert_eq!(tree.by_id("a"), Some(a));
    tree.fire_event(b, "press", Value::Null).unwrap();
    assert_eq!(*pressed.borrow(), 1);

    assert!(matches!(
        tree.create("Item", None, Settings::new().value("colour", "red")),
        Err(ElementError::UnknownSetting { .. })
    ));
}

#[test]
fn clone_is_disjoint_from_original() {
    let (mut tree, _) = tree();
    let list = tree.create("List", Some("list"), Settings::new()).unwrap();
    let item = tree
        .create("Item", Some("item"), Settings::new().value("title", "One"))
        .unwrap();
    tree.add_aggregation(list, "items", item).unwrap();

    let copy = tree.clone_element(list, None).unwrap();
    assert_eq!(tree.id(copy).unwrap(), "list-__clone0");
    let copied = tree.get_aggregation(copy, "items").unwrap()[0];
    assert_eq!(tree.id(copied).unwrap(), "item-__clone0");
    assert_eq!(tree.get_property(copied, "title").unwrap(), &json!("One"));

    tree.destroy_aggregation(copy, "items").unwrap();
    assert_eq!(tree.get_aggregation(list, "items").unwrap(), &[item]);
    assert_eq!(tree.get_property(item, "title").unwrap(), &json!("One"));
}

#[test]
fn changes_before_first_render_dirty_the_area() {
    let (mut tree, renderers) = tree();
    let area = tree.create_area("content");
    let list = tree.create("List", Some("l"), Settings::new()).unwrap();
    let item = tree.create("Item", Some("i"), Settings::new()).unwrap();
    tree.add_aggregation(list, "items", item).unwrap();
    tree.add_area_content(area, list).unwrap();

    let report = tree.rerender(&renderers).unwrap();
    assert_eq!(report.rendered, vec![(area, list)]);
    assert!(tree.is_rendered(item));
    assert_eq!(
        tree.area(area).unwrap().output(list),
        Some(r#"<ul id="l"><li id="i"></li></ul>"#)
    );
}

#[test]
fn rendered_leaf_registers_itself_and_no_op_writes_do_not_requeue() {
    let (mut tree, renderers) = tree();
    let area = tree.create_area("content");
    let list = tree.create("List", None, Settings::new()).unwrap();
    let item = tree.create("Item", None, Settings::new()).unwrap();
    tree.add_aggregation(list, "items", item).unwrap();
    tree.add_area_content(area, list).unwrap();
    tree.rerender(&renderers).unwrap();

    tree.set_property(item, "title", "x").unwrap();
    tree.set_property(item, "title", "x").unwrap();
    tree.set_property(item, "title", "y").unwrap();
    let ui = tree.area(area).unwrap();
    assert_eq!(ui.pending(), &[item]);
    assert!(!ui.is_invalidated());

    let report = tree.rerender(&renderers).unwrap();
    assert_eq!(report.rendered, vec![(area, item)]);
}

#[test]
fn integral_write_over_float_default_is_a_no_op() {
    let (mut tree, renderers) = tree();
    let area = tree.create_area("content");
    let list = tree.create("List", None, Settings::new()).unwrap();
    let item = tree.create("Item", None, Settings::new()).unwrap();
    tree.add_aggregation(list, "items", item).unwrap();
    tree.add_area_content(area, list).unwrap();
    tree.rerender(&renderers).unwrap();

    assert!(!tree.set_property(item, "weight", 12).unwrap());
    assert_eq!(tree.explicit_properties(item).count(), 0);
    assert!(tree.area(area).unwrap().pending().is_empty());
    assert!(!tree.needs_rerender());

    assert!(tree.set_property(item, "weight", 12.5).unwrap());
    assert_eq!(tree.area(area).unwrap().pending(), &[item]);
}

#[test]
fn rendered_but_unrooted_element_bubbles_nowhere() {
    let (mut tree, renderers) = tree();
    let area = tree.create_area("content");
    let list = tree.create("List", None, Settings::new()).unwrap();
    let item = tree.create("Item", None, Settings::new()).unwrap();
    tree.add_aggregation(list, "items", item).unwrap();
    tree.add_area_content(area, list).unwrap();
    tree.rerender(&renderers).unwrap();

    // Leaving the area marks it dirty; the detached list keeps its history.
    assert!(tree.remove_area_content(area, list));
    tree.rerender(&renderers).unwrap();
    assert!(tree.is_rendered(item));
    assert_eq!(tree.ui_area(item), None);

    tree.set_property(item, "title", "orphan").unwrap();
    assert!(!tree.needs_rerender());

    // Once placed again it renders with the area.
    tree.add_area_content(area, list).unwrap();
    assert!(tree.area(area).unwrap().is_invalidated());
}

#[test]
fn invisible_unrendered_child_touches_nothing() {
    let (mut tree, renderers) = tree();
    let area = tree.create_area("content");
    let list = tree.create("List", None, Settings::new()).unwrap();
    tree.add_area_content(area, list).unwrap();
    tree.rerender(&renderers).unwrap();

    let hidden = tree
        .create("Item", None, Settings::new().value("visible", false))
        .unwrap();
    tree.add_aggregation_with(list, "items", hidden, Invalidation::Suppress)
        .unwrap();
    tree.set_property(hidden, "title", "quiet").unwrap();
    assert!(!tree.needs_rerender());
}

#[test]
fn destroyed_before_render_is_skipped() {
    let (mut tree, renderers) = tree();
    let area = tree.create_area("content");
    let list = tree.create("List", None, Settings::new()).unwrap();
    let a = tree.create("Item", None, Settings::new()).unwrap();
    let b = tree.create("Item", None, Settings::new()).unwrap();
    tree.add_aggregation(list, "items", a).unwrap();
    tree.add_aggregation(list, "items", b).unwrap();
    tree.add_area_content(area, list).unwrap();
    tree.rerender(&renderers).unwrap();

    tree.set_property(a, "title", "gone").unwrap();
    tree.set_property(b, "title", "kept").unwrap();
    tree.destroy_with(a, Invalidation::Suppress);

    let report = tree.rerender(&renderers).unwrap();
    assert_eq!(report.rendered, vec![(area, b)]);
    assert!(!report.contains(a));
}

#[test]
fn config_drives_generated_ids() {
    let config = TreeConfig::from_json(r#"{ "uidPrefix": "x-", "cloneToken": "copy" }"#).unwrap();
    let mut tree = ElementTree::with_config(config);
    tree.schemas_mut()
        .register("Chip", ClassDescriptor::extending("Control"))
        .unwrap();
    let chip = tree.create("Chip", None, Settings::new()).unwrap();
    assert_eq!(tree.id(chip).unwrap(), "x-chip0");
    let copy = tree.clone_element(chip, None).unwrap();
    assert_eq!(tree.id(copy).unwrap(), "x-chip0-x-copy0");
}
