// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Topic classification and payload decoding
//!
//! Payloads are comma separated text. Each field is trimmed before parsing,
//! so `"0, 2"` and `"0,2"` decode identically.

use std::str::FromStr;

use tangible_calibration::{Coordinate, RawSamples};
use tangible_config::TopicsConfig;

use crate::{ProxyId, RouterError, RouterResult, StateValue};

pub const SENSOR_TOPIC_PREFIX: &str = "proxy_state_update_proxy_";
pub const HUB_TOPIC_PREFIX: &str = "hub_state_update_proxy_";

const SENSOR_CATEGORY: &str = "proxy";
const HUB_CATEGORY: &str = "hub";
const RESEAT_FLAG: &str = "x";

pub fn sensor_topic(id: ProxyId) -> String {
    format!("{}{}", SENSOR_TOPIC_PREFIX, id)
}

pub fn hub_topic(id: ProxyId) -> String {
    format!("{}{}", HUB_TOPIC_PREFIX, id)
}

/// What an inbound topic addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    SensorUpdate(ProxyId),
    HubState(ProxyId),
    AnimationRequest,
    Override,
}

impl TopicKind {
    /// Classify a topic
    ///
    /// The fixed hub topics match exactly. Per-proxy topics are recognised by
    /// their first `_` segment (`proxy` or `hub`) and carry the proxy id in
    /// their last segment.
    pub fn classify(topic: &str, topics: &TopicsConfig) -> RouterResult<Self> {
        if topic == topics.animation {
            return Ok(Self::AnimationRequest);
        }
        if topic == topics.override_topic {
            return Ok(Self::Override);
        }

        let category = topic.split('_').next().unwrap_or_default();
        let id = topic
            .rsplit('_')
            .next()
            .and_then(|segment| segment.parse::<ProxyId>().ok());

        match (category, id) {
            (SENSOR_CATEGORY, Some(id)) => Ok(Self::SensorUpdate(id)),
            (HUB_CATEGORY, Some(id)) => Ok(Self::HubState(id)),
            _ => Err(RouterError::UnknownTopic(topic.to_string())),
        }
    }
}

/// Fourth field of a sensor report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFlag {
    /// `"x"`: the token was just seated
    Reseat,
    State(StateValue),
}

/// `"tileRaw,rowRaw,colRaw,stateOrFlag"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorPayload {
    pub samples: RawSamples,
    pub flag: SensorFlag,
}

impl SensorPayload {
    pub fn parse(topic: &str, payload: &str) -> RouterResult<Self> {
        let fields = split_fields(topic, payload, 4)?;

        let samples = RawSamples::new(
            parse_field(topic, payload, fields[0], "tile sample")?,
            parse_field(topic, payload, fields[1], "row sample")?,
            parse_field(topic, payload, fields[2], "column sample")?,
        );

        let flag = if fields[3] == RESEAT_FLAG {
            SensorFlag::Reseat
        } else {
            SensorFlag::State(parse_state(topic, payload, fields[3])?)
        };

        Ok(Self { samples, flag })
    }
}

/// `"id,row,col"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverridePayload {
    pub id: ProxyId,
    pub position: Coordinate,
}

impl OverridePayload {
    pub fn parse(topic: &str, payload: &str) -> RouterResult<Self> {
        let fields = split_fields(topic, payload, 3)?;
        Ok(Self {
            id: parse_field(topic, payload, fields[0], "proxy id")?,
            position: Coordinate::new(
                parse_field(topic, payload, fields[1], "row")?,
                parse_field(topic, payload, fields[2], "column")?,
            ),
        })
    }
}

/// Hub state payload: a single integer in `{0, 1, 2}`
pub fn parse_hub_state(payload: &str) -> RouterResult<StateValue> {
    payload
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|value| StateValue::try_from(value).ok())
        .ok_or_else(|| RouterError::InvalidState(payload.to_string()))
}

/// Animation request payload: `"id1,id2"`
pub fn parse_animation_request(topic: &str, payload: &str) -> RouterResult<(ProxyId, ProxyId)> {
    let fields = split_fields(topic, payload, 2)?;
    Ok((
        parse_field(topic, payload, fields[0], "start proxy id")?,
        parse_field(topic, payload, fields[1], "end proxy id")?,
    ))
}

fn split_fields<'a>(topic: &str, payload: &'a str, expected: usize) -> RouterResult<Vec<&'a str>> {
    let fields: Vec<&str> = payload.split(',').map(str::trim).collect();
    if fields.len() != expected {
        return Err(RouterError::malformed(
            topic,
            payload,
            format!("expected {} fields, got {}", expected, fields.len()),
        ));
    }
    Ok(fields)
}

fn parse_field<T: FromStr>(topic: &str, payload: &str, field: &str, name: &str) -> RouterResult<T> {
    field
        .parse::<T>()
        .map_err(|_| RouterError::malformed(topic, payload, format!("{} '{}' is not an integer", name, field)))
}

fn parse_state(topic: &str, payload: &str, field: &str) -> RouterResult<StateValue> {
    let value: i64 = parse_field(topic, payload, field, "state")?;
    StateValue::try_from(value).map_err(|value| RouterError::InvalidState(value.to_string()))
}
