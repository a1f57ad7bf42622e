// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Serial light controller
//!
//! Commands go into a bounded queue drained by one worker thread. After each
//! frame the worker pauses for the minimum send interval, which the controller
//! firmware needs to finish an animation.
//!
//! The serial line is opened raw at the configured baud rate, 8N1 without flow
//! control, so frames reach the firmware byte for byte.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;
use serialport::{DataBits, FlowControl, Parity, SerialPortBuilder, StopBits};
use tangible_config::LightControllerConfig;
use tangible_router::{AnimationCommand, AnimationSink};
use tracing::{debug, error, info, warn};

use crate::{IoError, IoResult};

const WORKER_NAME: &str = "light-controller";
const RECV_TICK: Duration = Duration::from_millis(100);
const PACING_SLICE: Duration = Duration::from_millis(20);

pub struct LightController {
    sender: Sender<AnimationCommand>,
    shutdown: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
    dropped: AtomicU64,
}

impl LightController {
    /// Open the configured serial port and start the worker
    pub fn open(config: &LightControllerConfig) -> IoResult<Self> {
        let line = LineSettings::from_config(config);
        let port = line.builder().open().map_err(|source| IoError::Device {
            path: line.path.clone(),
            source,
        })?;
        info!(device = %line.path, baud = line.baud_rate, "Opened light controller");
        Self::with_writer(port, config)
    }

    /// Start a controller writing frames to any byte sink
    pub fn with_writer<W: Write + Send + 'static>(
        writer: W,
        config: &LightControllerConfig,
    ) -> IoResult<Self> {
        let (sender, receiver) = channel::bounded(config.queue_capacity.max(1));
        let shutdown = Arc::new(AtomicBool::new(false));
        let handle = spawn_worker(
            writer,
            receiver,
            Arc::clone(&shutdown),
            config.min_send_interval(),
        )?;

        Ok(Self {
            sender,
            shutdown,
            handle: Mutex::new(Some(handle)),
            dropped: AtomicU64::new(0),
        })
    }

    /// Commands waiting for the worker
    pub fn queued(&self) -> usize {
        self.sender.len()
    }

    /// Commands rejected because the queue was full or closed
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        !self.shutdown.load(Ordering::Relaxed)
            && self
                .handle
                .lock()
                .as_ref()
                .map_or(false, |handle| !handle.is_finished())
    }

    /// Signal the worker to stop and wait for it. Queued commands are discarded.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                error!("Light controller worker panicked");
            }
            debug!(discarded = self.sender.len(), "Light controller stopped");
        }
    }

    /// Queue a command without blocking
    pub fn try_submit(&self, command: AnimationCommand) -> IoResult<()> {
        match self.sender.try_send(command) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(IoError::QueueFull {
                pending: self.sender.len(),
            }),
            Err(TrySendError::Disconnected(_)) => Err(IoError::SinkClosed),
        }
    }
}

impl AnimationSink for LightController {
    fn submit(&self, command: AnimationCommand) {
        match self.try_submit(command) {
            Ok(()) => debug!(%command, "Animation queued"),
            Err(e) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(%command, error = %e, "Animation dropped");
            }
        }
    }
}

impl Drop for LightController {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Serial line of the light controller: raw 8N1, no flow control
#[derive(Debug, Clone, PartialEq, Eq)]
struct LineSettings {
    path: String,
    baud_rate: u32,
    timeout: Duration,
}

impl LineSettings {
    fn from_config(config: &LightControllerConfig) -> Self {
        Self {
            path: config.device_path.to_string_lossy().into_owned(),
            baud_rate: config.baud_rate,
            timeout: config.write_timeout(),
        }
    }

    fn builder(&self) -> SerialPortBuilder {
        serialport::new(self.path.as_str(), self.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.timeout)
    }
}

fn spawn_worker<W: Write + Send + 'static>(
    mut writer: W,
    receiver: Receiver<AnimationCommand>,
    shutdown: Arc<AtomicBool>,
    interval: Duration,
) -> IoResult<JoinHandle<()>> {
    thread::Builder::new()
        .name(WORKER_NAME.to_string())
        .spawn(move || {
            while !shutdown.load(Ordering::Relaxed) {
                match receiver.recv_timeout(RECV_TICK) {
                    Ok(command) => {
                        let frame = command.encode();
                        match writer
                            .write_all(frame.as_bytes())
                            .and_then(|_| writer.flush())
                        {
                            Ok(()) => info!(%command, "Message sent"),
                            Err(e) => error!(%command, error = %e, "Failed to write to light controller"),
                        }
                        pace(&shutdown, interval);
                    }
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        })
        .map_err(IoError::WorkerSpawn)
}

/// Sleep for `interval`, returning early once shutdown is requested
fn pace(shutdown: &AtomicBool, interval: Duration) {
    let deadline = Instant::now() + interval;
    loop {
        let now = Instant::now();
        if now >= deadline || shutdown.load(Ordering::Relaxed) {
            return;
        }
        thread::sleep((deadline - now).min(PACING_SLICE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Blocks every write until the test opens the gate once
    struct GatedWriter {
        entered: Sender<()>,
        gate: Receiver<()>,
        out: SharedBuffer,
    }

    impl Write for GatedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let _ = self.entered.send(());
            let _ = self.gate.recv();
            self.out.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn config(interval_ms: u64, capacity: usize) -> LightControllerConfig {
        LightControllerConfig {
            min_send_interval_ms: interval_ms,
            queue_capacity: capacity,
            ..LightControllerConfig::default()
        }
    }

    fn wait_for(buffer: &SharedBuffer, expected: &str) -> String {
        let deadline = Instant::now() + Duration::from_secs(3);
        while Instant::now() < deadline && buffer.text() != expected {
            thread::sleep(Duration::from_millis(5));
        }
        buffer.text()
    }

    #[test]
    fn test_frames_written_in_order() {
        let buffer = SharedBuffer::default();
        let controller = LightController::with_writer(buffer.clone(), &config(0, 8)).unwrap();
        assert!(controller.is_running());

        controller.play_boot_sequence();
        controller.show_point(6, 5);
        controller.show_path(0, 1, 6, 5);

        assert_eq!(wait_for(&buffer, "boot6,5\n0,1,6,5\n"), "boot6,5\n0,1,6,5\n");
        assert_eq!(controller.dropped_count(), 0);
    }

    #[test]
    fn test_minimum_interval_between_frames() {
        let buffer = SharedBuffer::default();
        let controller = LightController::with_writer(buffer.clone(), &config(400, 8)).unwrap();

        let started = Instant::now();
        controller.show_point(1, 1);
        controller.show_point(2, 2);

        assert_eq!(wait_for(&buffer, "1,1\n"), "1,1\n");
        assert_eq!(wait_for(&buffer, "1,1\n2,2\n"), "1,1\n2,2\n");
        assert!(started.elapsed() >= Duration::from_millis(400));
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let (entered_tx, entered_rx) = channel::unbounded();
        let (gate_tx, gate_rx) = channel::unbounded();
        let out = SharedBuffer::default();
        let writer = GatedWriter {
            entered: entered_tx,
            gate: gate_rx,
            out: out.clone(),
        };
        let controller = LightController::with_writer(writer, &config(0, 1)).unwrap();

        controller.show_point(1, 1);
        // Worker now holds the first command inside write
        entered_rx.recv_timeout(Duration::from_secs(3)).unwrap();

        controller.show_point(2, 2);
        controller.show_point(3, 3);
        assert_eq!(controller.queued(), 1);
        assert_eq!(controller.dropped_count(), 1);
        assert!(matches!(
            controller.try_submit(AnimationCommand::ShowPoint { row: 4, col: 4 }),
            Err(IoError::QueueFull { pending: 1 })
        ));

        gate_tx.send(()).unwrap();
        gate_tx.send(()).unwrap();
        assert_eq!(wait_for(&out, "1,1\n2,2\n"), "1,1\n2,2\n");
    }

    #[test]
    fn test_stop_interrupts_pacing() {
        let buffer = SharedBuffer::default();
        let controller = LightController::with_writer(buffer.clone(), &config(10_000, 8)).unwrap();
        controller.show_point(1, 1);
        assert_eq!(wait_for(&buffer, "1,1\n"), "1,1\n");

        let started = Instant::now();
        controller.stop();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!controller.is_running());

        // Worker is gone; further commands are rejected
        controller.show_point(2, 2);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(buffer.text(), "1,1\n");
        assert_eq!(controller.dropped_count(), 1);
    }

    #[test]
    fn test_open_missing_device() {
        let config = LightControllerConfig {
            device_path: "/nonexistent/tangible/ttyUSB9".into(),
            ..LightControllerConfig::default()
        };
        match LightController::open(&config) {
            Err(IoError::Device { path, .. }) => assert_eq!(path, "/nonexistent/tangible/ttyUSB9"),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("opened a missing device"),
        }
    }

    #[test]
    fn test_line_settings_follow_config() {
        let config = LightControllerConfig {
            device_path: "/dev/ttyACM3".into(),
            baud_rate: 115_200,
            write_timeout_ms: 250,
            ..LightControllerConfig::default()
        };
        assert_eq!(
            LineSettings::from_config(&config),
            LineSettings {
                path: "/dev/ttyACM3".to_string(),
                baud_rate: 115_200,
                timeout: Duration::from_millis(250),
            }
        );

        let defaults = LineSettings::from_config(&LightControllerConfig::default());
        assert_eq!(defaults.baud_rate, 9600);
        assert_eq!(defaults.timeout, Duration::from_secs(1));
    }
}
