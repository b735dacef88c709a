// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batches of markers sharing listeners.

use canopy_events::{Event, EventKind, ListenerKey};

use crate::error::MarkerError;
use crate::marker::{Marker, MarkerEvent, MarkerKey};
use crate::options::MarkerOptions;

/// Markers built together, each knowing its index in the batch.
#[derive(Debug, Default)]
pub struct MarkerCollection {
    markers: Vec<Marker>,
}

impl MarkerCollection {
    /// Build one marker per option set, keyed `0, 1, 2, ...`.
    pub fn new(options: impl IntoIterator<Item = MarkerOptions>) -> Result<Self, MarkerError> {
        Self::starting_at(MarkerKey(0), options)
    }

    /// Build one marker per option set, keyed sequentially from `first`.
    ///
    /// Fails on the first invalid option set, or when the keys would run past `u64::MAX`;
    /// no collection is built.
    pub fn starting_at(
        first: MarkerKey,
        options: impl IntoIterator<Item = MarkerOptions>,
    ) -> Result<Self, MarkerError> {
        let markers = options
            .into_iter()
            .enumerate()
            .map(|(i, opts)| {
                let key = u64::try_from(i)
                    .ok()
                    .and_then(|i| first.0.checked_add(i))
                    .ok_or(MarkerError::KeyOverflow { first: first.0 })?;
                let mut marker = Marker::new(MarkerKey(key), opts)?;
                marker.set_index(i);
                Ok(marker)
            })
            .collect::<Result<Vec<_>, MarkerError>>()?;
        log::debug!("built {} markers from key {}", markers.len(), first.0);
        Ok(Self { markers })
    }

    /// Register a copy of `handler` on every marker.
    ///
    /// Each marker assigns its own generated key; the returned keys are in marker order.
    pub fn on(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&mut Event<MarkerEvent>) + Clone + 'static,
    ) -> Vec<ListenerKey> {
        self.markers
            .iter_mut()
            .map(|m| m.on(kind, handler.clone()))
            .collect()
    }

    /// Register a copy of `handler` on every marker under the same name.
    pub fn on_named(
        &mut self,
        kind: EventKind,
        name: &str,
        handler: impl FnMut(&mut Event<MarkerEvent>) + Clone + 'static,
    ) -> Result<ListenerKey, MarkerError> {
        let key = ListenerKey::named(name)?;
        for marker in &mut self.markers {
            marker.on_named(kind, name, handler.clone())?;
        }
        Ok(key)
    }

    /// Remove the handler named `key` from every marker. Returns how many were removed.
    pub fn off(&mut self, kind: EventKind, key: &ListenerKey) -> usize {
        self.markers
            .iter_mut()
            .map(|m| m.off(kind, key))
            .filter(|&removed| removed)
            .count()
    }

    /// The markers, in index order.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Mutable access to the markers.
    pub fn markers_mut(&mut self) -> &mut [Marker] {
        &mut self.markers
    }

    /// The marker at `index`.
    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// True when the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Take the markers, e.g. to register them with a manager.
    pub fn into_markers(self) -> Vec<Marker> {
        self.markers
    }
}
