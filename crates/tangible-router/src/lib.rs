// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # tangible-router
//!
//! The reconciliation engine of Tangible Dashboard.
//!
//! The [`Router`] owns one [`ProxyState`] and one [`Snapshot`] per configured
//! proxy. Every inbound bus event goes through [`Router::on_message`]:
//!
//! ```text
//! (topic, payload) ──► classify topic ──► decode payload ──► update ProxyState
//!                                                               │
//!                       AnimationSink ◄── dispatch ◄── compare against Snapshot
//! ```
//!
//! Bad input never escapes `on_message`; it is logged and the event dropped.
//! The router is not reentrant. Transports that deliver from several threads
//! share it through [`SharedRouter`].

pub mod command;
pub mod error;
pub mod proxy;
pub mod router;
pub mod snapshot;
pub mod topic;

pub use command::{AnimationCommand, AnimationSink};
pub use error::{RouterError, RouterResult, Severity};
pub use proxy::{Lifecycle, ProxyId, ProxyState, StateValue};
pub use router::{ChangeKind, Router, SharedRouter};
pub use snapshot::Snapshot;
pub use topic::{
    hub_topic, sensor_topic, OverridePayload, SensorFlag, SensorPayload, TopicKind,
    HUB_TOPIC_PREFIX, SENSOR_TOPIC_PREFIX,
};

pub use tangible_calibration::{Coordinate, RawSamples};
