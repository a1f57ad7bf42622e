//! Sensing axes and their hardware constants

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Full-scale reading of the proxies' 12-bit ADC
pub const ADC_FULL_SCALE: f64 = 4095.0;

/// ADC reference voltage
pub const ADC_REFERENCE_VOLTAGE: f64 = 3.3;

/// One of the three voltage dividers a proxy samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Tile,
    Row,
    Column,
}

/// Acceptance window around a reference voltage: `[v - below, v + above]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceBand {
    pub below: f64,
    pub above: f64,
}

impl ToleranceBand {
    pub fn contains(&self, reference: f64, voltage: f64) -> bool {
        reference - self.below <= voltage && voltage <= reference + self.above
    }
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Tile, Axis::Row, Axis::Column];

    /// Divider ratio of the sensing circuit feeding this axis
    pub fn gain(&self) -> f64 {
        match self {
            Axis::Tile => 1.68,
            Axis::Row | Axis::Column => 1.51,
        }
    }

    /// Tolerance band, wider on the low side to absorb supply sag
    pub fn band(&self) -> ToleranceBand {
        match self {
            Axis::Tile => ToleranceBand {
                below: 0.22,
                above: 0.05,
            },
            Axis::Row | Axis::Column => ToleranceBand {
                below: 1.0,
                above: 0.05,
            },
        }
    }

    /// Physical voltage seen by the divider for a raw ADC sample
    pub fn voltage(&self, raw: i32) -> f64 {
        (f64::from(raw) / ADC_FULL_SCALE) * ADC_REFERENCE_VOLTAGE * self.gain()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Tile => "tile",
            Axis::Row => "row",
            Axis::Column => "column",
        }
    }
}

impl Display for Axis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
