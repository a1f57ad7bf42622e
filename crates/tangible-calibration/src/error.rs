//! Calibration error types

use crate::Axis;

/// Errors raised by calibration data or position resolution.
///
/// Every variant points at deployed calibration data that does not match the
/// hardware wiring, never at a transient bad reading.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    /// A resolved tile has no entry in the 1-based adjustment table
    #[error("Tile {tile} has no adjustment entry (table holds {table_len} tiles)")]
    TileAdjustmentOutOfRange { tile: i32, table_len: usize },

    /// Relative position plus tile offset leaves the `i32` coordinate range
    #[error("Tile {tile} offset ({row_offset}, {col_offset}) pushes the coordinate out of range")]
    CoordinateOverflow {
        tile: i32,
        row_offset: i32,
        col_offset: i32,
    },

    #[error("Calibration list for the {0} axis is empty")]
    EmptyAxis(Axis),

    #[error("Calibration level {index} of the {axis} axis has a non-finite voltage")]
    NonFiniteVoltage { axis: Axis, index: usize },
}
