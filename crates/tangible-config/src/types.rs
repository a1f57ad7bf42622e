// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `tangible_dashboard.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub system: SystemConfig,
    pub broker: BrokerConfig,
    pub topics: TopicsConfig,
    pub proxies: ProxiesConfig,
    pub calibration: CalibrationConfig,
    pub light_controller: LightControllerConfig,
}

/// System-level configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    pub log_level: String,
    pub log_dir: PathBuf,
    pub log_retention_days: u64,
    pub log_retention_runs: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: PathBuf::from("./logs"),
            log_retention_days: 30,
            log_retention_runs: 10,
        }
    }
}

/// Message bus (hub publisher) connection settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// ZMQ endpoint of the hub publisher
    pub address: String,
    /// Poll interval of the listener loop, in milliseconds
    pub receive_timeout_ms: u64,
    pub receive_hwm: u32,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            address: "tcp://127.0.0.1:5556".to_string(),
            receive_timeout_ms: 500,
            receive_hwm: 1000,
        }
    }
}

impl BrokerConfig {
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }
}

/// Fixed hub-level topics
///
/// Per-proxy topics (`proxy_state_update_proxy_{id}`, `hub_state_update_proxy_{id}`)
/// are part of the wire contract with the proxies and cannot be renamed here.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TopicsConfig {
    /// Topic carrying `"id1,id2"` path animation requests
    pub animation: String,
    /// Topic carrying `"id,row,col"` manual position pins
    pub override_topic: String,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            animation: "dashboardAnimations".to_string(),
            override_topic: "dashboardOverride".to_string(),
        }
    }
}

/// Configured proxy tokens
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxiesConfig {
    pub ids: Vec<u32>,
    /// Proxy used as the start of hub-originated path animations
    pub hub_origin_id: u32,
}

impl Default for ProxiesConfig {
    fn default() -> Self {
        Self {
            ids: vec![0, 1, 2, 3],
            hub_origin_id: 0,
        }
    }
}

/// A single calibration point: the reference voltage measured for a discrete position
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct VoltageLevel {
    pub voltage: f64,
    pub position: i32,
}

impl VoltageLevel {
    pub const fn new(voltage: f64, position: i32) -> Self {
        Self { voltage, position }
    }
}

/// Offset translating a tile-relative coordinate into the absolute board frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TileOffset {
    pub row: i32,
    pub col: i32,
}

impl TileOffset {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

/// Voltage lookup tables for the resistive sensing hardware
///
/// Level lists are scanned in their stored order, so order is significant.
/// `tile_adjustments[0]` belongs to tile 1.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub tile_levels: Vec<VoltageLevel>,
    pub row_levels: Vec<VoltageLevel>,
    pub column_levels: Vec<VoltageLevel>,
    pub tile_adjustments: Vec<TileOffset>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            tile_levels: vec![
                // Board row 1
                VoltageLevel::new(5.26, 4),
                VoltageLevel::new(4.57, 3),
                VoltageLevel::new(4.25, 2),
                VoltageLevel::new(3.85, 1),
                // Board row 2
                VoltageLevel::new(3.51, 5),
                VoltageLevel::new(3.19, 6),
                VoltageLevel::new(2.86, 7),
                VoltageLevel::new(2.54, 8),
                // Board row 3
                VoltageLevel::new(2.30, 12),
                VoltageLevel::new(1.98, 11),
                VoltageLevel::new(1.67, 10),
                VoltageLevel::new(1.36, 9),
                // Board row 4
                VoltageLevel::new(1.07, 13),
                VoltageLevel::new(0.76, 14),
                VoltageLevel::new(0.45, 15),
                VoltageLevel::new(0.06, 16),
            ],
            row_levels: vec![
                VoltageLevel::new(5.1, 1),
                VoltageLevel::new(3.6, 2),
                VoltageLevel::new(2.2, 3),
                VoltageLevel::new(0.7, 4),
            ],
            column_levels: vec![
                VoltageLevel::new(4.4, 1),
                VoltageLevel::new(2.9, 2),
                VoltageLevel::new(1.5, 3),
                VoltageLevel::new(0.2, 4),
            ],
            tile_adjustments: (0..16)
                .map(|index| TileOffset::new((index / 4) * 4, (index % 4) * 4))
                .collect(),
        }
    }
}

/// Serial light controller (animation sink) settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LightControllerConfig {
    pub device_path: PathBuf,
    /// Serial line speed; the line is opened raw, 8N1
    pub baud_rate: u32,
    /// Write timeout on the serial port
    pub write_timeout_ms: u64,
    /// Minimum pause after each frame written to the device
    pub min_send_interval_ms: u64,
    pub queue_capacity: usize,
    pub play_boot_sequence: bool,
}

impl Default for LightControllerConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from("/dev/ttyUSB0"),
            baud_rate: 9600,
            write_timeout_ms: 1000,
            min_send_interval_ms: 5000,
            queue_capacity: 64,
            play_boot_sequence: true,
        }
    }
}

impl LightControllerConfig {
    pub fn min_send_interval(&self) -> Duration {
        Duration::from_millis(self.min_send_interval_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}
