// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Immutable calibration table shared by every proxy

use tangible_config::{CalibrationConfig, TileOffset, VoltageLevel};

use crate::{Axis, CalibrationError};

/// Per-axis voltage levels plus the tile adjustment table
///
/// Built once from configuration and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    tile_levels: Vec<VoltageLevel>,
    row_levels: Vec<VoltageLevel>,
    column_levels: Vec<VoltageLevel>,
    tile_adjustments: Vec<TileOffset>,
}

impl CalibrationTable {
    /// Build a table, rejecting empty axes and non-finite voltages
    pub fn from_config(config: &CalibrationConfig) -> Result<Self, CalibrationError> {
        let table = Self {
            tile_levels: config.tile_levels.clone(),
            row_levels: config.row_levels.clone(),
            column_levels: config.column_levels.clone(),
            tile_adjustments: config.tile_adjustments.clone(),
        };

        for axis in Axis::ALL {
            let levels = table.levels(axis);
            if levels.is_empty() {
                return Err(CalibrationError::EmptyAxis(axis));
            }
            if let Some(index) = levels.iter().position(|level| !level.voltage.is_finite()) {
                return Err(CalibrationError::NonFiniteVoltage { axis, index });
            }
        }

        Ok(table)
    }

    /// The reference board wiring
    pub fn reference() -> Self {
        let config = CalibrationConfig::default();
        Self {
            tile_levels: config.tile_levels,
            row_levels: config.row_levels,
            column_levels: config.column_levels,
            tile_adjustments: config.tile_adjustments,
        }
    }

    /// Levels of one axis, in scan order
    pub fn levels(&self, axis: Axis) -> &[VoltageLevel] {
        match axis {
            Axis::Tile => &self.tile_levels,
            Axis::Row => &self.row_levels,
            Axis::Column => &self.column_levels,
        }
    }

    /// Offset for a 1-based tile number
    pub fn adjustment(&self, tile: i32) -> Result<TileOffset, CalibrationError> {
        usize::try_from(tile)
            .ok()
            .and_then(|tile| tile.checked_sub(1))
            .and_then(|index| self.tile_adjustments.get(index))
            .copied()
            .ok_or(CalibrationError::TileAdjustmentOutOfRange {
                tile,
                table_len: self.tile_adjustments.len(),
            })
    }

    pub fn tile_count(&self) -> usize {
        self.tile_adjustments.len()
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self::reference()
    }
}
