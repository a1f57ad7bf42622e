// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # tangible-calibration
//!
//! Turns the three raw ADC samples reported by a proxy (tile, row, column
//! voltage dividers) into an absolute board coordinate.
//!
//! ```text
//! raw sample ──► voltage (per-axis gain) ──► calibration level (band or closest)
//!                                                │
//!                  tile > 0 ? relative + tile offset : relative ──► Coordinate
//! ```
//!
//! Resolution is a pure function of the samples and the immutable
//! [`CalibrationTable`]; the only side effect is a `warn!` event whenever an
//! axis falls back to its closest level.

pub mod axis;
pub mod error;
pub mod resolver;
pub mod table;

pub use axis::{Axis, ToleranceBand};
pub use error::CalibrationError;
pub use resolver::{AxisMatch, Coordinate, MatchQuality, PositionResolver, RawSamples, Resolution};
pub use table::CalibrationTable;

pub use tangible_config::{TileOffset, VoltageLevel};
