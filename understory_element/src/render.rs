// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render passes.
//!
//! Markup is produced by [`Renderer`]s, registered per class in a
//! [`RendererRegistry`]. Application code never calls them: it mutates
//! elements, which invalidates them, and then runs
//! [`ElementTree::rerender`] once per scheduling turn. The pass drains every
//! area's pending work and renders each affected element once through a
//! [`RenderManager`].

use core::fmt;

use hashbrown::{HashMap, HashSet};
use understory_schema::{ClassId, SchemaRegistry};

use crate::element::ElementFlags;
use crate::error::RenderError;
use crate::key::{AreaId, ElementKey};
use crate::tree::ElementTree;

/// Turns one element into markup.
///
/// Renderers read element state through [`RenderManager::tree`] and render
/// children with [`RenderManager::render_control`].
pub trait Renderer {
    /// Writes the markup of `key` into `rm`.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] to abort the pass.
    fn render(&self, rm: &mut RenderManager<'_>, key: ElementKey) -> Result<(), RenderError>;
}

struct FnRenderer<F>(F);

impl<F> Renderer for FnRenderer<F>
where
    F: Fn(&mut RenderManager<'_>, ElementKey) -> Result<(), RenderError>,
{
    fn render(&self, rm: &mut RenderManager<'_>, key: ElementKey) -> Result<(), RenderError> {
        (self.0)(rm, key)
    }
}

/// Renderers by class.
///
/// Lookup falls back along the base-class chain, so a renderer registered
/// for `Control` serves every control without a more specific one.
#[derive(Default)]
pub struct RendererRegistry {
    renderers: HashMap<ClassId, Box<dyn Renderer>>,
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("classes", &self.renderers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RendererRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the renderer of `class`, replacing any previous one.
    pub fn register(&mut self, class: ClassId, renderer: impl Renderer + 'static) {
        self.renderers.insert(class, Box::new(renderer));
    }

    /// Registers a closure as the renderer of `class`.
    pub fn register_fn<F>(&mut self, class: ClassId, render: F)
    where
        F: Fn(&mut RenderManager<'_>, ElementKey) -> Result<(), RenderError> + 'static,
    {
        self.register(class, FnRenderer(render));
    }

    /// Finds the renderer for `class` or its nearest base.
    #[must_use]
    pub fn lookup(&self, schemas: &SchemaRegistry, class: ClassId) -> Option<&dyn Renderer> {
        schemas
            .ancestors(class)
            .find_map(|id| self.renderers.get(&id))
            .map(Box::as_ref)
    }
}

/// Markup writer handed to renderers during a pass.
pub struct RenderManager<'a> {
    tree: &'a ElementTree,
    renderers: &'a RendererRegistry,
    buffer: String,
    rendered: Vec<ElementKey>,
}

impl fmt::Debug for RenderManager<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderManager")
            .field("buffer", &self.buffer)
            .field("rendered", &self.rendered)
            .finish_non_exhaustive()
    }
}

impl<'a> RenderManager<'a> {
    fn new(tree: &'a ElementTree, renderers: &'a RendererRegistry) -> Self {
        Self {
            tree,
            renderers,
            buffer: String::new(),
            rendered: Vec::new(),
        }
    }

    /// The tree being rendered.
    #[must_use]
    pub fn tree(&self) -> &'a ElementTree {
        self.tree
    }

    /// Appends raw markup.
    pub fn write(&mut self, markup: &str) -> &mut Self {
        self.buffer.push_str(markup);
        self
    }

    /// Appends text with `&`, `<`, `>`, `"` and `'` escaped.
    pub fn write_escaped(&mut self, text: &str) -> &mut Self {
        for c in text.chars() {
            match c {
                '&' => self.buffer.push_str("&amp;"),
                '<' => self.buffer.push_str("&lt;"),
                '>' => self.buffer.push_str("&gt;"),
                '"' => self.buffer.push_str("&quot;"),
                '\'' => self.buffer.push_str("&#39;"),
                _ => self.buffer.push(c),
            }
        }
        self
    }

    /// Opens a start tag carrying the element's id: `<tag id="...">`.
    ///
    /// Finish it with [`open_end`](Self::open_end).
    ///
    /// # Errors
    ///
    /// Fails for stale keys.
    pub fn open_start(&mut self, tag: &str, key: ElementKey) -> Result<&mut Self, RenderError> {
        let tree = self.tree;
        let id = tree.id(key)?;
        self.buffer.push('<');
        self.buffer.push_str(tag);
        self.buffer.push_str(" id=\"");
        self.write_escaped(id);
        self.buffer.push('"');
        Ok(self)
    }

    /// Writes an escaped attribute inside an open start tag.
    pub fn attr(&mut self, name: &str, value: &str) -> &mut Self {
        self.buffer.push(' ');
        self.buffer.push_str(name);
        self.buffer.push_str("=\"");
        self.write_escaped(value);
        self.buffer.push('"');
        self
    }

    /// Closes a start tag.
    pub fn open_end(&mut self) -> &mut Self {
        self.buffer.push('>');
        self
    }

    /// Writes an end tag.
    pub fn close(&mut self, tag: &str) -> &mut Self {
        self.buffer.push_str("</");
        self.buffer.push_str(tag);
        self.buffer.push('>');
        self
    }

    /// Renders an element with the renderer of its class.
    ///
    /// Invisible elements produce a hidden placeholder instead, so that a
    /// later re-render has a place to put them.
    ///
    /// # Errors
    ///
    /// Fails for stale keys, classes without a renderer, and renderer errors.
    pub fn render_control(&mut self, key: ElementKey) -> Result<(), RenderError> {
        let tree = self.tree;
        let element = tree.live(key)?;
        if !tree.is_visible(key) {
            self.write("<span id=\"invisible-");
            self.write_escaped(&element.id);
            self.write("\" hidden></span>");
        } else {
            let renderers = self.renderers;
            let renderer = renderers
                .lookup(&tree.schemas, element.class)
                .ok_or_else(|| RenderError::NoRenderer {
                    id: element.id.clone(),
                    class: tree.schemas[element.class].name().to_owned(),
                })?;
            renderer.render(self, key)?;
        }
        self.rendered.push(key);
        Ok(())
    }

    fn finish(self) -> (String, Vec<ElementKey>) {
        (self.buffer, self.rendered)
    }
}

/// What a render pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Elements rendered as pass roots, in order, with their area.
    pub rendered: Vec<(AreaId, ElementKey)>,
}

impl RenderReport {
    /// Returns `true` if nothing was rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }

    /// Returns `true` if `key` was rendered as a pass root.
    #[must_use]
    pub fn contains(&self, key: ElementKey) -> bool {
        self.rendered.iter().any(|&(_, k)| k == key)
    }
}

impl ElementTree {
    /// Runs one render pass over every area with pending work.
    ///
    /// For each area, in creation order:
    ///
    /// - an invalidated area re-renders all of its content;
    /// - otherwise each queued element that is still alive, still in this
    ///   area, and has no queued ancestor is rendered once, in queue order.
    ///
    /// Every element visited by a renderer is marked as rendered, and each
    /// root's markup replaces its previous output on the area. Output of
    /// descendants now covered by that markup is dropped, as is output of
    /// queued elements that are skipped.
    ///
    /// # Errors
    ///
    /// A renderer failure aborts the pass. The failing element is not queued
    /// again; elements of the same area that were not reached yet stay
    /// queued. Areas after it are left untouched.
    pub fn rerender(&mut self, renderers: &RendererRegistry) -> Result<RenderReport, RenderError> {
        let _span = tracing::trace_span!("rerender").entered();
        let mut report = RenderReport::default();

        for idx in 0..self.areas.len() {
            let area = &mut self.areas[idx];
            if !area.needs_rerender() {
                continue;
            }
            let area_id = area.id();
            let full = area.take_invalidated();
            let pending = area.take_pending();
            let roots = if full {
                area.clear_output();
                area.content().to_vec()
            } else {
                let roots = self.pass_roots(area_id, &pending);
                let area = &mut self.areas[idx];
                for key in pending.iter().filter(|key| !roots.contains(key)) {
                    area.remove_output(*key);
                }
                roots
            };

            for (i, &root) in roots.iter().enumerate() {
                let mut rm = RenderManager::new(self, renderers);
                let result = rm.render_control(root);
                let (markup, rendered) = rm.finish();
                if let Err(err) = result {
                    tracing::warn!(element = ?root, %area_id, error = %err, "render pass aborted");
                    let area = &mut self.areas[idx];
                    for &rest in &roots[i + 1..] {
                        area.add_invalidated(rest);
                    }
                    return Err(err);
                }
                for &key in &rendered {
                    if let Some(element) = self.element_mut(key) {
                        element.flags.insert(ElementFlags::RENDERED);
                    }
                }
                let area = &mut self.areas[idx];
                for &key in rendered.iter().filter(|&&key| key != root) {
                    area.remove_output(key);
                }
                area.set_output(root, markup);
                report.rendered.push((area_id, root));
            }
        }

        tracing::debug!(rendered = report.rendered.len(), "render pass finished");
        Ok(report)
    }

    /// Filters an area's queue down to the elements to render this pass.
    fn pass_roots(&self, area: AreaId, pending: &[ElementKey]) -> Vec<ElementKey> {
        let queued: HashSet<ElementKey> = pending.iter().copied().collect();
        pending
            .iter()
            .copied()
            .filter(|&key| {
                if !self.is_alive(key) {
                    tracing::trace!(element = ?key, "skipping destroyed element");
                    return false;
                }
                self.ui_area(key) == Some(area) && !self.ancestors(key).any(|a| queued.contains(&a))
            })
            .collect()
    }
}
