//! Message bus side of the dashboard
//!
//! The router only needs two things from the transport: a way to subscribe to
//! topics and a stream of `(topic, payload)` events. [`BusSubscriber`] is that
//! seam; [`listener::BusListener`] drives it.

pub mod listener;
#[cfg(feature = "zmq-transport")]
pub mod zmq_sub;

use crate::IoResult;

/// One inbound bus message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusEvent {
    pub topic: Vec<u8>,
    pub payload: Vec<u8>,
}

impl BusEvent {
    pub fn new(topic: impl Into<Vec<u8>>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Split a single-frame `"topic payload"` message on its first space
    ///
    /// A frame without a space is all topic.
    pub fn from_single_frame(frame: &[u8]) -> Self {
        match frame.iter().position(|&byte| byte == b' ') {
            Some(split) => Self::new(&frame[..split], &frame[split + 1..]),
            None => Self::new(frame, Vec::new()),
        }
    }
}

/// Subscriber side of a publish/subscribe transport
pub trait BusSubscriber: Send {
    fn connect(&mut self) -> IoResult<()>;

    fn disconnect(&mut self) -> IoResult<()>;

    fn is_connected(&self) -> bool;

    fn subscribe(&mut self, topic: &str) -> IoResult<()>;

    /// Wait up to `timeout_ms` for the next event; `Ok(None)` on timeout
    fn receive_timeout(&mut self, timeout_ms: u64) -> IoResult<Option<BusEvent>>;
}
