// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! ZMQ SUB adapter
//!
//! Connects to the hub's PUB socket. Both framings are accepted: two-frame
//! `[topic, payload]` messages and single-frame `"topic payload"` messages.

use tangible_config::BrokerConfig;
use tracing::{debug, info};

use super::{BusEvent, BusSubscriber};
use crate::{IoError, IoResult};

pub struct ZmqBusSubscriber {
    context: zmq::Context,
    address: String,
    receive_hwm: i32,
    socket: Option<zmq::Socket>,
}

impl ZmqBusSubscriber {
    pub fn new(config: &BrokerConfig) -> Self {
        Self {
            context: zmq::Context::new(),
            address: config.address.clone(),
            receive_hwm: i32::try_from(config.receive_hwm).unwrap_or(i32::MAX),
            socket: None,
        }
    }

    /// Subscriber for `address` with default socket options
    pub fn with_address(address: impl Into<String>) -> Self {
        Self::new(&BrokerConfig {
            address: address.into(),
            ..BrokerConfig::default()
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn socket(&self) -> IoResult<&zmq::Socket> {
        self.socket.as_ref().ok_or(IoError::NotRunning)
    }
}

impl BusSubscriber for ZmqBusSubscriber {
    fn connect(&mut self) -> IoResult<()> {
        if self.socket.is_some() {
            return Err(IoError::AlreadyRunning);
        }

        let socket = self.context.socket(zmq::SUB)?;
        socket.set_linger(0)?;
        socket.set_rcvhwm(self.receive_hwm)?;
        socket
            .connect(&self.address)
            .map_err(|e| IoError::Transport(format!("connect to {} failed: {}", self.address, e)))?;

        self.socket = Some(socket);
        info!(address = %self.address, "Connected to message bus");
        Ok(())
    }

    fn disconnect(&mut self) -> IoResult<()> {
        if self.socket.take().is_some() {
            info!(address = %self.address, "Disconnected from message bus");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    fn subscribe(&mut self, topic: &str) -> IoResult<()> {
        self.socket()?.set_subscribe(topic.as_bytes())?;
        Ok(())
    }

    fn receive_timeout(&mut self, timeout_ms: u64) -> IoResult<Option<BusEvent>> {
        let socket = self.socket()?;

        let poll_items = &mut [socket.as_poll_item(zmq::POLLIN)];
        zmq::poll(poll_items, i64::try_from(timeout_ms).unwrap_or(i64::MAX))?;
        if !poll_items[0].is_readable() {
            return Ok(None);
        }

        let first = socket.recv_bytes(0)?;
        if !socket.get_rcvmore()? {
            return Ok(Some(BusEvent::from_single_frame(&first)));
        }

        let payload = socket.recv_bytes(0)?;
        while socket.get_rcvmore()? {
            let extra = socket.recv_bytes(0)?;
            debug!(bytes = extra.len(), "Ignoring extra message frame");
        }

        Ok(Some(BusEvent::new(first, payload)))
    }
}
