// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # tangible-io
//!
//! I/O collaborators of the router:
//! - [`bus`]: subscriber abstraction, ZMQ SUB adapter and the listener loop
//!   that feeds events into a [`SharedRouter`](tangible_router::SharedRouter)
//! - [`light`]: animation sinks, including the paced serial light controller

pub mod bus;
pub mod error;
pub mod light;

pub use bus::listener::BusListener;
pub use bus::{BusEvent, BusSubscriber};
#[cfg(feature = "zmq-transport")]
pub use bus::zmq_sub::ZmqBusSubscriber;
pub use error::{IoError, IoResult};
pub use light::{LightController, TracingSink};
