// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener registry and dispatch.

use std::collections::BTreeMap;

use crate::error::EventError;
use crate::types::{Event, EventKind, ListenerKey};

/// Boxed event handler.
pub type Handler<P> = Box<dyn FnMut(&mut Event<P>)>;

/// Per-kind ordered handler lists.
///
/// Handlers run in registration order. Re-registering a named key replaces the handler in
/// its original position.
pub struct Listeners<P> {
    next_key: u64,
    by_kind: BTreeMap<EventKind, Vec<(ListenerKey, Handler<P>)>>,
}

impl<P> Default for Listeners<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> core::fmt::Debug for Listeners<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (kind, list) in &self.by_kind {
            map.entry(kind, &list.len());
        }
        map.finish()
    }
}

impl<P> Listeners<P> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            next_key: 1,
            by_kind: BTreeMap::new(),
        }
    }

    /// Register a handler under a generated key.
    pub fn add(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&mut Event<P>) + 'static,
    ) -> ListenerKey {
        let key = ListenerKey::Generated(self.next_key);
        self.next_key += 1;
        self.by_kind
            .entry(kind)
            .or_default()
            .push((key.clone(), Box::new(handler)));
        key
    }

    /// Register a handler under a caller-chosen key.
    ///
    /// Fails with [`EventError::InvalidKey`] unless `key` matches `[A-Za-z0-9_-]+`.
    pub fn add_named(
        &mut self,
        kind: EventKind,
        key: &str,
        handler: impl FnMut(&mut Event<P>) + 'static,
    ) -> Result<ListenerKey, EventError> {
        let key = ListenerKey::named(key)?;
        let list = self.by_kind.entry(kind).or_default();
        match list.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = Box::new(handler),
            None => list.push((key.clone(), Box::new(handler))),
        }
        Ok(key)
    }

    /// Remove the handler registered under `key`. Returns whether one was removed.
    pub fn remove(&mut self, kind: EventKind, key: &ListenerKey) -> bool {
        let Some(list) = self.by_kind.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(k, _)| k != key);
        let removed = list.len() != before;
        if list.is_empty() {
            self.by_kind.remove(&kind);
        }
        removed
    }

    /// Run every handler for `event.kind` and return `event.return_value`.
    pub fn dispatch(&mut self, event: &mut Event<P>) -> bool {
        if let Some(list) = self.by_kind.get_mut(&event.kind) {
            log::trace!("dispatching {} to {} listeners", event.kind, list.len());
            for (_, handler) in list.iter_mut() {
                handler(&mut *event);
            }
        }
        event.return_value
    }

    /// Whether any handler listens for `kind`.
    pub fn has(&self, kind: EventKind) -> bool {
        self.by_kind.contains_key(&kind)
    }

    /// Total number of handlers.
    pub fn len(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    /// True when no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }

    /// Drop every handler. Generated keys keep counting.
    pub fn clear(&mut self) {
        self.by_kind.clear();
    }
}
