//! I/O error types

pub type IoResult<T> = Result<T, IoError>;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Transport is not running")]
    NotRunning,

    #[error("Transport is already running")]
    AlreadyRunning,

    /// Opening or configuring the light controller serial port failed
    #[error("Light controller device {path}: {source}")]
    Device {
        path: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("Light controller queue is full ({pending} pending)")]
    QueueFull { pending: usize },

    #[error("Light controller queue is closed")]
    SinkClosed,
}

#[cfg(feature = "zmq-transport")]
impl From<zmq::Error> for IoError {
    fn from(err: zmq::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
