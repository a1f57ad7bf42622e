// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Reconciliation engine
//!
//! Owns every [`ProxyState`] and its [`Snapshot`]. Each inbound event updates
//! live state, then change detection compares it to the snapshot and decides
//! whether an animation is emitted.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tangible_calibration::{CalibrationTable, Coordinate, PositionResolver, RawSamples};
use tangible_config::{DashboardConfig, TopicsConfig};
use tracing::{debug, error, info, warn};

use crate::topic::{parse_animation_request, parse_hub_state};
use crate::{
    hub_topic, sensor_topic, AnimationCommand, AnimationSink, OverridePayload, ProxyId,
    ProxyState, RouterError, RouterResult, SensorFlag, SensorPayload, Severity, Snapshot,
    TopicKind,
};

/// Router behind the per-engine lock, for transports delivering from other threads
pub type SharedRouter<S> = Arc<Mutex<Router<S>>>;

/// Which comparison change detection runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Sensor-driven: position first, then state
    Proxy,
    /// Hub-driven: state only, animated from the hub origin
    Hub,
}

#[derive(Debug, Clone, Copy)]
enum Emission {
    Point(ProxyId),
    Path(ProxyId, ProxyId),
}

pub struct Router<S> {
    resolver: PositionResolver,
    proxies: BTreeMap<ProxyId, ProxyState>,
    snapshots: BTreeMap<ProxyId, Snapshot>,
    topics: TopicsConfig,
    hub_origin: ProxyId,
    sink: S,
}

impl<S: AnimationSink> Router<S> {
    /// Create a router tracking a fixed set of proxies
    ///
    /// Uses the default fixed topics and proxy 0 as hub origin.
    pub fn new(
        proxy_ids: impl IntoIterator<Item = ProxyId>,
        resolver: PositionResolver,
        sink: S,
    ) -> RouterResult<Self> {
        let mut proxies = BTreeMap::new();
        let mut snapshots = BTreeMap::new();
        for id in proxy_ids {
            if proxies.insert(id, ProxyState::new(id)).is_some() {
                return Err(RouterError::DuplicateProxy(id));
            }
            snapshots.insert(id, Snapshot::default());
        }

        Ok(Self {
            resolver,
            proxies,
            snapshots,
            topics: TopicsConfig::default(),
            hub_origin: 0,
            sink,
        })
    }

    pub fn from_config(config: &DashboardConfig, sink: S) -> RouterResult<Self> {
        let table = CalibrationTable::from_config(&config.calibration)?;
        let router = Self::new(
            config.proxies.ids.iter().copied(),
            PositionResolver::new(table),
            sink,
        )?
        .with_topics(config.topics.clone())
        .with_hub_origin(config.proxies.hub_origin_id);
        Ok(router)
    }

    pub fn with_topics(mut self, topics: TopicsConfig) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_hub_origin(mut self, id: ProxyId) -> Self {
        self.hub_origin = id;
        self
    }

    pub fn into_shared(self) -> SharedRouter<S> {
        Arc::new(Mutex::new(self))
    }

    /// Every topic the router consumes, per-proxy topics first
    pub fn subscription_topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self
            .proxies
            .keys()
            .flat_map(|&id| [sensor_topic(id), hub_topic(id)])
            .collect();
        topics.push(self.topics.animation.clone());
        topics.push(self.topics.override_topic.clone());
        topics
    }

    /// (Re-)issue all subscriptions after the transport (re)connects
    pub fn on_connect<E>(&self, mut subscribe: impl FnMut(&str) -> Result<(), E>) -> Result<(), E> {
        for topic in self.subscription_topics() {
            subscribe(&topic)?;
            info!(%topic, "Subscribed");
        }
        Ok(())
    }

    /// Inbound entry point. Never fails; rejected events are logged and dropped.
    pub fn on_message(&mut self, topic: &str, payload: &[u8]) {
        if let Err(err) = self.process_message(topic, payload) {
            report(topic, &err);
        }
    }

    /// Same as [`Router::on_message`] but hands the rejection back to the caller
    pub fn process_message(&mut self, topic: &str, payload: &[u8]) -> RouterResult<()> {
        let payload = std::str::from_utf8(payload).map_err(|source| RouterError::PayloadDecode {
            topic: topic.to_string(),
            source,
        })?;
        info!(topic, payload, "Message received");

        match TopicKind::classify(topic, &self.topics)? {
            TopicKind::SensorUpdate(id) => self.handle_sensor_update(id, topic, payload),
            TopicKind::HubState(id) => self.handle_hub_state(id, payload),
            TopicKind::AnimationRequest => {
                let (start, end) = parse_animation_request(topic, payload)?;
                self.dispatch_path(start, end)
            }
            TopicKind::Override => self.handle_override(topic, payload),
        }
    }

    fn handle_sensor_update(&mut self, id: ProxyId, topic: &str, payload: &str) -> RouterResult<()> {
        let overridden = self.proxy_or_err(id)?.is_overridden();
        let sensor = SensorPayload::parse(topic, payload)?;

        // Resolve before touching the proxy so a calibration defect leaves it unchanged
        match sensor.flag {
            SensorFlag::Reseat => {
                let position = self.resolve(sensor.samples)?;
                let proxy = self.proxy_mut(id)?;
                proxy.set_override(false);
                proxy.apply_sensor_report(sensor.samples, position, None);
            }
            SensorFlag::State(state) if overridden => {
                self.proxy_mut(id)?.set_state(state);
            }
            SensorFlag::State(state) => {
                let position = self.resolve(sensor.samples)?;
                self.proxy_mut(id)?
                    .apply_sensor_report(sensor.samples, position, Some(state));
            }
        }

        info!(
            proxy = id,
            tile_raw = sensor.samples.tile,
            row_raw = sensor.samples.row,
            col_raw = sensor.samples.col,
            flag = ?sensor.flag,
            "Updated proxy from sensor report"
        );
        self.compare_proxy_data(id, ChangeKind::Proxy)
    }

    fn handle_hub_state(&mut self, id: ProxyId, payload: &str) -> RouterResult<()> {
        self.proxy_or_err(id)?;
        let state = parse_hub_state(payload)?;
        self.proxy_mut(id)?.set_state(state);

        info!(proxy = id, %state, "Updated proxy state from hub");
        self.compare_proxy_data(id, ChangeKind::Hub)
    }

    fn handle_override(&mut self, topic: &str, payload: &str) -> RouterResult<()> {
        let pin = OverridePayload::parse(topic, payload)?;
        self.proxy_mut(pin.id)?.pin(pin.position);

        // The point reflects the pinned coordinate; the flag only applies afterwards
        if let Err(err) = self.dispatch_point(pin.id) {
            report(topic, &err);
        }
        info!(proxy = pin.id, position = %pin.position, "Manual override");

        self.proxy_mut(pin.id)?.set_override(true);
        Ok(())
    }

    /// Compare a proxy against its snapshot and emit on change
    ///
    /// The snapshot is refreshed whenever an emission is decided, even if the
    /// dispatch itself is dropped for an unmet precondition.
    pub fn compare_proxy_data(&mut self, id: ProxyId, kind: ChangeKind) -> RouterResult<()> {
        let proxy = self.proxy_or_err(id)?;
        let snapshot = self.snapshots.get(&id).copied().unwrap_or_default();

        let emission = match kind {
            ChangeKind::Proxy if snapshot.position_differs(proxy.position()) => {
                if proxy.is_overridden() {
                    Some(Emission::Path(id, id))
                } else {
                    Some(Emission::Point(id))
                }
            }
            ChangeKind::Proxy if snapshot.state_differs(proxy.state()) => Some(Emission::Path(id, id)),
            ChangeKind::Hub if snapshot.state_differs(proxy.state()) => {
                Some(Emission::Path(self.hub_origin, id))
            }
            _ => None,
        };

        let Some(emission) = emission else {
            debug!(proxy = id, ?kind, "No change against snapshot");
            return Ok(());
        };

        let refreshed = Snapshot::of(proxy);
        let dispatched = match emission {
            Emission::Point(target) => self.dispatch_point(target),
            Emission::Path(start, end) => self.dispatch_path(start, end),
        };
        self.snapshots.insert(id, refreshed);

        if let Err(err) = dispatched {
            report("animation", &err);
        }
        Ok(())
    }

    /// Show a single point at a seated proxy's position
    pub fn dispatch_point(&self, id: ProxyId) -> RouterResult<()> {
        let position = self.ready_position(id)?;
        info!(proxy = id, %position, "Sending point animation");
        self.sink.submit(AnimationCommand::point(position));
        Ok(())
    }

    /// Show a path between two seated proxies
    pub fn dispatch_path(&self, start: ProxyId, end: ProxyId) -> RouterResult<()> {
        let from = self.ready_position(start)?;
        let to = self.ready_position(end)?;
        info!(start, end, %from, %to, "Sending path animation");
        self.sink.submit(AnimationCommand::path(from, to));
        Ok(())
    }

    pub fn proxy(&self, id: ProxyId) -> Option<&ProxyState> {
        self.proxies.get(&id)
    }

    pub fn snapshot(&self, id: ProxyId) -> Option<Snapshot> {
        self.snapshots.get(&id).copied()
    }

    pub fn proxy_ids(&self) -> impl Iterator<Item = ProxyId> + '_ {
        self.proxies.keys().copied()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn topics(&self) -> &TopicsConfig {
        &self.topics
    }

    pub fn hub_origin(&self) -> ProxyId {
        self.hub_origin
    }

    fn resolve(&self, samples: RawSamples) -> RouterResult<Option<Coordinate>> {
        Ok(self
            .resolver
            .resolve(samples, true)?
            .map(|resolution| resolution.coordinate))
    }

    fn ready_position(&self, id: ProxyId) -> RouterResult<Coordinate> {
        let proxy = self.proxy_or_err(id)?;
        let position = proxy
            .position()
            .ok_or_else(|| RouterError::Precondition(format!("position for proxy {} not set", id)))?;
        if !proxy.is_plugged_in() {
            return Err(RouterError::Precondition(format!("proxy {} not connected", id)));
        }
        Ok(position)
    }

    fn proxy_or_err(&self, id: ProxyId) -> RouterResult<&ProxyState> {
        self.proxies.get(&id).ok_or(RouterError::UnknownProxy(id))
    }

    fn proxy_mut(&mut self, id: ProxyId) -> RouterResult<&mut ProxyState> {
        self.proxies.get_mut(&id).ok_or(RouterError::UnknownProxy(id))
    }
}

fn report(context: &str, err: &RouterError) {
    if err.is_configuration_defect() {
        error!(
            calibration_defect = true,
            context,
            error = %err,
            "Calibration data does not match the board; event dropped"
        );
        return;
    }
    match err.severity() {
        Severity::Error => error!(context, error = %err, "Event dropped"),
        Severity::Warning => warn!(context, error = %err, "Event dropped"),
    }
}
