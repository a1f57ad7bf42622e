// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # tangible-observability
//!
//! Logging infrastructure for the dashboard: a human-readable console layer
//! plus a JSON file layer rotated daily inside a per-run folder.
//!
//! Every crate logs through `tracing`; this crate only decides where the
//! events go and which crates are allowed to emit `debug` events.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known dashboard crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "tangible-dashboard",
    "tangible-config",
    "tangible-calibration",
    "tangible-router",
    "tangible-io",
];

/// Convert a crate name into the tracing target used by its log events
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
