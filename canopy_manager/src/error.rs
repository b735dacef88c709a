// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Errors reported by [`Manager`](crate::Manager).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ManagerError {
    /// The overlay cannot be registered; the manager is unchanged.
    #[error("invalid overlay: {0}")]
    InvalidOverlay(String),
    /// The manager options are inconsistent; no manager was built.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}
