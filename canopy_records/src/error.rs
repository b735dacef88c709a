// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for flattening.

/// Errors raised by [`Flattener`](crate::Flattener).
///
/// Raised synchronously at the offending call; nothing is retained on failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FlattenError {
    /// The dataset is not a non-empty array of nodes.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// The options cannot produce meaningful output.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}
