// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Errors from event parsing and listener registration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    /// Listener keys may contain only ASCII letters, digits, `_` and `-`.
    #[error("nonstandard listener key: {0:?}")]
    InvalidKey(String),
    /// The name matches no [`EventKind`](crate::EventKind).
    #[error("unknown event kind: {0:?}")]
    UnknownKind(String),
}
