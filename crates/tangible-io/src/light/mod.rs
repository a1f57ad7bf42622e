//! Animation sinks

pub mod controller;
pub mod tracing_sink;

pub use controller::LightController;
pub use tracing_sink::TracingSink;
