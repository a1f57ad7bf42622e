//! Inferred state of one physical proxy token

use std::fmt::{Display, Formatter};

use tangible_calibration::{Coordinate, RawSamples};

pub type ProxyId = u32;

/// Discrete token state reported by a proxy or the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateValue {
    Idle = 0,
    Active = 1,
    Alert = 2,
}

impl StateValue {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<i64> for StateValue {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Idle),
            1 => Ok(Self::Active),
            2 => Ok(Self::Alert),
            other => Err(other),
        }
    }
}

impl Display for StateValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Where a proxy is in its lifecycle, derived from its flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// No event has addressed this proxy yet
    Unseen,
    /// Addressed (e.g. by the hub) but never reported seated
    SeenUnplugged,
    SeenPlugged,
    /// Position pinned by an operator
    Overridden,
}

/// Live state of one proxy, mutated only by the router
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyState {
    id: ProxyId,
    position: Option<Coordinate>,
    raw: Option<RawSamples>,
    state: Option<StateValue>,
    plugged_in: bool,
    overridden: bool,
    seen: bool,
}

impl ProxyState {
    pub fn new(id: ProxyId) -> Self {
        Self {
            id,
            position: None,
            raw: None,
            state: None,
            plugged_in: false,
            overridden: false,
            seen: false,
        }
    }

    pub fn id(&self) -> ProxyId {
        self.id
    }

    pub fn position(&self) -> Option<Coordinate> {
        self.position
    }

    /// Last raw samples accepted from a sensor report
    pub fn raw(&self) -> Option<RawSamples> {
        self.raw
    }

    pub fn state(&self) -> Option<StateValue> {
        self.state
    }

    pub fn is_plugged_in(&self) -> bool {
        self.plugged_in
    }

    pub fn is_overridden(&self) -> bool {
        self.overridden
    }

    pub fn lifecycle(&self) -> Lifecycle {
        if self.overridden {
            Lifecycle::Overridden
        } else if self.plugged_in {
            Lifecycle::SeenPlugged
        } else if self.seen {
            Lifecycle::SeenUnplugged
        } else {
            Lifecycle::Unseen
        }
    }

    /// Seated sensor report. `state` is left alone when `None`.
    pub(crate) fn apply_sensor_report(
        &mut self,
        samples: RawSamples,
        position: Option<Coordinate>,
        state: Option<StateValue>,
    ) {
        self.seen = true;
        self.raw = Some(samples);
        self.plugged_in = true;
        if let Some(position) = position {
            self.position = Some(position);
        }
        if let Some(state) = state {
            self.state = Some(state);
        }
    }

    pub(crate) fn set_state(&mut self, state: StateValue) {
        self.seen = true;
        self.state = Some(state);
    }

    /// Operator pin; the override flag is raised separately
    pub(crate) fn pin(&mut self, position: Coordinate) {
        self.seen = true;
        self.position = Some(position);
        self.plugged_in = true;
    }

    pub(crate) fn set_override(&mut self, overridden: bool) {
        self.overridden = overridden;
    }
}
