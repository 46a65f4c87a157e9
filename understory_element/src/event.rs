// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element publish/subscribe.
//!
//! Every element owns a table mapping event names to ordered subscriber
//! records. A record is a handler plus optional bound data
//! and an optional listener element. Records are never deduplicated; detaching
//! removes the first record whose handler *and* listener match.
//!
//! Firing snapshots the subscriber list before the first call, so handlers
//! may attach, detach or even destroy the source without disturbing the
//! current dispatch. Handler panics are not caught.

use core::cell::Cell;
use core::fmt;
use std::rc::Rc;

use hashbrown::HashMap;
use smallvec::SmallVec;
use understory_schema::Value;

use crate::error::{ElementError, ElementResult};
use crate::key::ElementKey;
use crate::tree::ElementTree;

/// A shared event handler.
///
/// Handlers are compared by pointer identity when detaching, so keep the
/// `Rc` you attached around if you intend to detach it later.
pub type EventHandler = Rc<dyn Fn(&mut ElementTree, &Event)>;

/// Wraps a closure as an [`EventHandler`].
///
/// Saves spelling out the closure's parameter types.
pub fn event_handler<F>(f: F) -> EventHandler
where
    F: Fn(&mut ElementTree, &Event) + 'static,
{
    Rc::new(f)
}

/// An event as seen by one subscriber.
pub struct Event {
    name: String,
    source: ElementKey,
    parameters: Value,
    data: Option<Value>,
    listener: Option<ElementKey>,
    allow_prevent_default: bool,
    prevented: Cell<bool>,
}

impl Event {
    /// Name of the fired event.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The element that fired the event.
    #[must_use]
    pub fn source(&self) -> ElementKey {
        self.source
    }

    /// Call-time parameters, usually a JSON object.
    #[must_use]
    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    /// Looks up one call-time parameter.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// Data bound when this subscriber attached.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Listener recorded when this subscriber attached.
    #[must_use]
    pub fn listener(&self) -> Option<ElementKey> {
        self.listener
    }

    /// Asks the firing element to skip its default action.
    ///
    /// Ignored for events that do not allow it.
    pub fn prevent_default(&self) {
        if self.allow_prevent_default {
            self.prevented.set(true);
        }
    }

    /// Returns `true` once any subscriber prevented the default action.
    #[must_use]
    pub fn is_default_prevented(&self) -> bool {
        self.prevented.get()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("parameters", &self.parameters)
            .field("data", &self.data)
            .field("listener", &self.listener)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub(crate) struct Subscriber {
    handler: EventHandler,
    data: Option<Value>,
    listener: Option<ElementKey>,
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("handler", &Rc::as_ptr(&self.handler).cast::<()>())
            .field("data", &self.data)
            .field("listener", &self.listener)
            .finish()
    }
}

/// Subscriber lists keyed by event name.
#[derive(Clone, Debug, Default)]
pub(crate) struct EventRegistry {
    subscribers: HashMap<String, SmallVec<[Subscriber; 2]>>,
}

impl EventRegistry {
    fn attach(&mut self, name: &str, subscriber: Subscriber) {
        self.subscribers
            .entry_ref(name)
            .or_default()
            .push(subscriber);
    }

    fn detach(&mut self, name: &str, handler: &EventHandler, listener: Option<ElementKey>) -> bool {
        let Some(list) = self.subscribers.get_mut(name) else {
            return false;
        };
        let Some(pos) = list
            .iter()
            .position(|s| Rc::ptr_eq(&s.handler, handler) && s.listener == listener)
        else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            self.subscribers.remove(name);
        }
        true
    }

    fn snapshot(&self, name: &str) -> SmallVec<[Subscriber; 2]> {
        self.subscribers.get(name).cloned().unwrap_or_default()
    }

    pub(crate) fn has_listeners(&self, name: &str) -> bool {
        self.subscribers.contains_key(name)
    }

    /// Points records whose listener is `from` at `to`.
    pub(crate) fn rebind_listener(&mut self, from: ElementKey, to: ElementKey) {
        for subscriber in self.subscribers.values_mut().flatten() {
            if subscriber.listener == Some(from) {
                subscriber.listener = Some(to);
            }
        }
    }
}

impl ElementTree {
    /// Appends `handler` to the subscribers of `event`.
    ///
    /// Equivalent to [`attach_event_with`](Self::attach_event_with) without
    /// data or listener.
    ///
    /// # Errors
    ///
    /// Fails for stale keys and events the class does not declare.
    pub fn attach_event(
        &mut self,
        key: ElementKey,
        event: &str,
        handler: EventHandler,
    ) -> ElementResult<()> {
        self.attach_event_with(key, event, None, handler, None)
    }

    /// Appends a subscriber record with bound `data` and a `listener`.
    ///
    /// Attaching the same handler twice adds two records.
    ///
    /// # Errors
    ///
    /// Fails for stale keys and events the class does not declare.
    pub fn attach_event_with(
        &mut self,
        key: ElementKey,
        event: &str,
        data: Option<Value>,
        handler: EventHandler,
        listener: Option<ElementKey>,
    ) -> ElementResult<()> {
        self.check_event(key, event)?;
        let element = self.data_mut(key)?;
        element.events.attach(
            event,
            Subscriber {
                handler,
                data,
                listener,
            },
        );
        Ok(())
    }

    /// Removes the first record matching `handler` and `listener`.
    ///
    /// Returns `false` when nothing matched, including for stale keys.
    pub fn detach_event(
        &mut self,
        key: ElementKey,
        event: &str,
        handler: &EventHandler,
        listener: Option<ElementKey>,
    ) -> bool {
        self.element_mut(key)
            .is_some_and(|element| element.events.detach(event, handler, listener))
    }

    /// Returns `true` if `event` has at least one subscriber.
    #[must_use]
    pub fn has_listeners(&self, key: ElementKey, event: &str) -> bool {
        self.element(key)
            .is_some_and(|element| element.events.has_listeners(event))
    }

    /// Invokes the subscribers of `event` in registration order.
    ///
    /// Every subscriber receives the same `parameters` together with its own
    /// bound data and listener. Returns `false` if the event allows
    /// preventing the default action and a subscriber did so.
    ///
    /// # Errors
    ///
    /// Fails for stale keys and events the class does not declare.
    ///
    /// # Panics
    ///
    /// Panics raised by handlers propagate to the caller.
    pub fn fire_event(
        &mut self,
        key: ElementKey,
        event: &str,
        parameters: Value,
    ) -> ElementResult<bool> {
        let allow_prevent_default = self.check_event(key, event)?;
        let subscribers = self.live(key)?.events.snapshot(event);
        tracing::trace!(element = ?key, event, subscribers = subscribers.len(), "firing event");

        let mut fired = Event {
            name: event.to_owned(),
            source: key,
            parameters,
            data: None,
            listener: None,
            allow_prevent_default,
            prevented: Cell::new(false),
        };
        for subscriber in subscribers {
            fired.data = subscriber.data;
            fired.listener = subscriber.listener;
            (subscriber.handler)(self, &fired);
        }
        Ok(!fired.is_default_prevented())
    }

    /// Returns whether the event allows preventing its default action.
    fn check_event(&self, key: ElementKey, event: &str) -> ElementResult<bool> {
        let schema = self.schema_of(key)?;
        schema
            .event(event)
            .map(|info| info.allow_prevent_default())
            .ok_or_else(|| ElementError::UnknownEvent {
                class: schema.name().to_owned(),
                event: event.to_owned(),
            })
    }
}
