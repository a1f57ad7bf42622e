// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Tangible Dashboard
//!
//! Tracks movable proxy tokens on a resistive sensing board, reconciles their
//! position and state with the control hub over a publish/subscribe bus, and
//! drives a light controller that animates changes.
//!
//! ## Crates
//!
//! - [`config`]: `tangible_dashboard.toml` loading, overrides and validation
//! - [`observability`]: logging initialization and per-crate debug flags
//! - [`calibration`]: voltage calibration tables and position resolution
//! - [`router`]: proxy state, change detection and animation dispatch
//! - [`io`]: bus subscriber and light controller sinks
//!
//! ## Example
//!
//! ```rust
//! use tangible_dashboard::prelude::*;
//!
//! let config = DashboardConfig::default();
//! let mut router = Router::from_config(&config, TracingSink).unwrap();
//!
//! router.on_message("proxy_state_update_proxy_2", b"2593,2876,3534,x");
//! assert_eq!(router.proxy(2).unwrap().position(), Some(Coordinate::new(6, 1)));
//! ```

pub use tangible_calibration as calibration;
pub use tangible_config as config;
pub use tangible_io as io;
pub use tangible_observability as observability;
pub use tangible_router as router;

/// Common imports
pub mod prelude {
    pub use tangible_calibration::{CalibrationTable, Coordinate, PositionResolver, RawSamples};
    pub use tangible_config::{load_config, validate_config, DashboardConfig};
    pub use tangible_io::{BusEvent, BusListener, BusSubscriber, LightController, TracingSink};
    pub use tangible_router::{AnimationCommand, AnimationSink, Router, SharedRouter};
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
