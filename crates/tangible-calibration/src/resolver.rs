// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Position resolution from raw voltage samples

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tracing::{debug, warn};

use crate::{Axis, CalibrationError, CalibrationTable};

/// Absolute board coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub row: i32,
    pub col: i32,
}

impl Coordinate {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The three raw ADC samples of one sensor report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSamples {
    pub tile: i32,
    pub row: i32,
    pub col: i32,
}

impl RawSamples {
    pub const fn new(tile: i32, row: i32, col: i32) -> Self {
        Self { tile, row, col }
    }

    fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Tile => self.tile,
            Axis::Row => self.row,
            Axis::Column => self.col,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchQuality {
    /// Voltage fell inside a level's tolerance band
    InBand,
    /// No band matched; the nearest level was used
    Closest,
}

/// Decoded value of one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMatch {
    pub axis: Axis,
    pub voltage: f64,
    pub position: i32,
    pub quality: MatchQuality,
}

impl AxisMatch {
    pub fn is_degraded(&self) -> bool {
        self.quality == MatchQuality::Closest
    }
}

/// Outcome of resolving a plugged-in proxy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub coordinate: Coordinate,
    pub tile: AxisMatch,
    pub row: AxisMatch,
    pub column: AxisMatch,
}

impl Resolution {
    /// Axes that fell back to the closest level
    pub fn degraded_axes(&self) -> Vec<Axis> {
        [self.tile, self.row, self.column]
            .iter()
            .filter(|m| m.is_degraded())
            .map(|m| m.axis)
            .collect()
    }

    pub fn is_degraded(&self) -> bool {
        self.tile.is_degraded() || self.row.is_degraded() || self.column.is_degraded()
    }
}

/// Resolves raw samples against a fixed calibration table
#[derive(Debug, Clone, Default)]
pub struct PositionResolver {
    table: CalibrationTable,
}

impl PositionResolver {
    pub fn new(table: CalibrationTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CalibrationTable {
        &self.table
    }

    /// Resolve a sensor report into an absolute coordinate
    ///
    /// Returns `Ok(None)` when the proxy is not plugged in. Fails only when the
    /// resolved tile has no adjustment entry or its offset overflows the
    /// coordinate.
    pub fn resolve(
        &self,
        samples: RawSamples,
        plugged_in: bool,
    ) -> Result<Option<Resolution>, CalibrationError> {
        if !plugged_in {
            return Ok(None);
        }

        let tile = self.decode_axis(Axis::Tile, samples.get(Axis::Tile))?;
        let row = self.decode_axis(Axis::Row, samples.get(Axis::Row))?;
        let column = self.decode_axis(Axis::Column, samples.get(Axis::Column))?;

        let coordinate = if tile.position > 0 {
            let offset = self.table.adjustment(tile.position)?;
            let overflow = || CalibrationError::CoordinateOverflow {
                tile: tile.position,
                row_offset: offset.row,
                col_offset: offset.col,
            };
            Coordinate::new(
                row.position.checked_add(offset.row).ok_or_else(overflow)?,
                column.position.checked_add(offset.col).ok_or_else(overflow)?,
            )
        } else {
            Coordinate::new(row.position, column.position)
        };

        debug!(
            tile = tile.position,
            relative_row = row.position,
            relative_col = column.position,
            %coordinate,
            "Resolved proxy position"
        );

        Ok(Some(Resolution {
            coordinate,
            tile,
            row,
            column,
        }))
    }

    /// Decode one raw sample to a discrete position on `axis`
    ///
    /// Levels are scanned in stored order and the first in-band level wins.
    /// Without an in-band level the nearest one is returned as degraded.
    pub fn decode_axis(&self, axis: Axis, raw: i32) -> Result<AxisMatch, CalibrationError> {
        let voltage = axis.voltage(raw);
        let levels = self.table.levels(axis);
        let band = axis.band();

        if let Some(level) = levels.iter().find(|level| band.contains(level.voltage, voltage)) {
            return Ok(AxisMatch {
                axis,
                voltage,
                position: level.position,
                quality: MatchQuality::InBand,
            });
        }

        let closest = levels
            .iter()
            .min_by(|a, b| {
                (a.voltage - voltage)
                    .abs()
                    .total_cmp(&(b.voltage - voltage).abs())
            })
            .ok_or(CalibrationError::EmptyAxis(axis))?;

        warn!(
            %axis,
            raw,
            voltage,
            position = closest.position,
            reference_voltage = closest.voltage,
            "No calibration band matched, using closest level"
        );

        Ok(AxisMatch {
            axis,
            voltage,
            position: closest.position,
            quality: MatchQuality::Closest,
        })
    }
}
