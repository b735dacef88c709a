// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_events::EventError;
use thiserror::Error;

/// Errors from building or updating markers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MarkerError {
    /// The content has neither text nor an icon.
    #[error("marker content needs text or an icon")]
    MissingContent,
    /// A coordinate is NaN or infinite.
    #[error("marker position ({x}, {y}) is not finite")]
    InvalidPosition {
        /// Longitude.
        x: f64,
        /// Latitude.
        y: f64,
    },
    /// Sequential keys starting at `first` do not fit in a `u64`.
    #[error("marker keys starting at {first} overflow")]
    KeyOverflow {
        /// First requested key.
        first: u64,
    },
    /// Listener registration failed.
    #[error(transparent)]
    Event(#[from] EventError),
}
