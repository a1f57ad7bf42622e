// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Listener loop feeding bus events into the router

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tangible_router::{AnimationSink, SharedRouter};
use tracing::{error, info, warn};

use super::{BusEvent, BusSubscriber};
use crate::IoResult;

/// Drives a [`BusSubscriber`] and hands each event to the router, one at a time
pub struct BusListener<B, S> {
    subscriber: B,
    router: SharedRouter<S>,
    poll_timeout_ms: u64,
}

impl<B: BusSubscriber, S: AnimationSink> BusListener<B, S> {
    /// `poll_timeout` bounds how long a shutdown request can go unnoticed.
    /// It is raised to 1 ms, since a zero poll would spin.
    pub fn new(subscriber: B, router: SharedRouter<S>, poll_timeout: Duration) -> Self {
        Self {
            subscriber,
            router,
            poll_timeout_ms: u64::try_from(poll_timeout.as_millis())
                .unwrap_or(u64::MAX)
                .max(1),
        }
    }

    /// Connect, subscribe, then process events until `running` is cleared
    pub fn run(&mut self, running: &AtomicBool) -> IoResult<()> {
        self.subscriber.connect()?;
        self.on_connect()?;
        info!("Bus listener started");

        while running.load(Ordering::Relaxed) {
            match self.subscriber.receive_timeout(self.poll_timeout_ms) {
                Ok(Some(event)) => self.dispatch(event),
                Ok(None) => continue,
                Err(e) => {
                    warn!(error = %e, "Bus receive failed");
                    std::thread::sleep(Duration::from_millis(self.poll_timeout_ms));
                }
            }
        }

        self.subscriber.disconnect()?;
        info!("Bus listener stopped");
        Ok(())
    }

    /// Issue every subscription the router needs
    pub fn on_connect(&mut self) -> IoResult<()> {
        let router = self.router.lock();
        let subscriber = &mut self.subscriber;
        router.on_connect(|topic| subscriber.subscribe(topic))
    }

    pub fn dispatch(&self, event: BusEvent) {
        match std::str::from_utf8(&event.topic) {
            Ok(topic) => self.router.lock().on_message(topic, &event.payload),
            Err(e) => error!(error = %e, "Failed to decode topic; event dropped"),
        }
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn router(&self) -> &SharedRouter<S> {
        &self.router
    }

    pub fn subscriber(&self) -> &B {
        &self.subscriber
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use tangible_router::{AnimationCommand, Router};

    /// Seats a proxy on tile 5, row 2, column 1
    const SEAT_TILE5: &[u8] = b"2593,2876,3534,x";

    #[derive(Default)]
    struct Recorder(Mutex<Vec<AnimationCommand>>);

    impl AnimationSink for Recorder {
        fn submit(&self, command: AnimationCommand) {
            self.0.lock().push(command);
        }
    }

    /// Replays canned events, then clears the running flag
    struct ScriptedSubscriber {
        events: VecDeque<BusEvent>,
        subscriptions: Vec<String>,
        connected: bool,
        running: Arc<AtomicBool>,
    }

    impl BusSubscriber for ScriptedSubscriber {
        fn connect(&mut self) -> IoResult<()> {
            self.connected = true;
            Ok(())
        }

        fn disconnect(&mut self) -> IoResult<()> {
            self.connected = false;
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn subscribe(&mut self, topic: &str) -> IoResult<()> {
            self.subscriptions.push(topic.to_string());
            Ok(())
        }

        fn receive_timeout(&mut self, _timeout_ms: u64) -> IoResult<Option<BusEvent>> {
            let next = self.events.pop_front();
            if next.is_none() {
                self.running.store(false, Ordering::Relaxed);
            }
            Ok(next)
        }
    }

    #[test]
    fn test_run_processes_events_in_order() {
        let running = Arc::new(AtomicBool::new(true));
        let subscriber = ScriptedSubscriber {
            events: VecDeque::from(vec![
                BusEvent::new("proxy_state_update_proxy_2", SEAT_TILE5),
                BusEvent::new(vec![0xff, 0xfe], b"1".to_vec()),
                BusEvent::from_single_frame(b"dashboardOverride 1,9,9"),
                BusEvent::new("dashboardAnimations", "1,2"),
            ]),
            subscriptions: Vec::new(),
            connected: false,
            running: Arc::clone(&running),
        };

        let router = Router::new([0, 1, 2], Default::default(), Recorder::default())
            .unwrap()
            .into_shared();
        let mut listener = BusListener::new(subscriber, router, Duration::from_millis(5));

        listener.run(&running).unwrap();

        let router = listener.router().lock();
        assert_eq!(listener.subscriber().subscriptions, router.subscription_topics());
        assert!(!listener.subscriber().is_connected());

        // Tile 5 sits at (4, 0) on the reference board
        assert_eq!(
            *router.sink().0.lock(),
            vec![
                AnimationCommand::ShowPoint { row: 6, col: 1 },
                AnimationCommand::ShowPoint { row: 9, col: 9 },
                AnimationCommand::ShowPath {
                    start_row: 9,
                    start_col: 9,
                    end_row: 6,
                    end_col: 1
                },
            ]
        );
    }

    #[test]
    fn test_zero_poll_timeout_is_raised() {
        let subscriber = ScriptedSubscriber {
            events: VecDeque::new(),
            subscriptions: Vec::new(),
            connected: false,
            running: Arc::new(AtomicBool::new(true)),
        };
        let router = Router::new([0], Default::default(), Recorder::default())
            .unwrap()
            .into_shared();

        let listener = BusListener::new(subscriber, router, Duration::ZERO);
        assert_eq!(listener.poll_timeout(), Duration::from_millis(1));
    }
}
