//! Last-emitted proxy state, used only for change detection

use tangible_calibration::Coordinate;

use crate::{ProxyState, StateValue};

/// `(position, state)` of the proxy as of the last emission decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Snapshot {
    /// Nothing emitted yet; differs from every observation
    #[default]
    Sentinel,
    Emitted {
        position: Option<Coordinate>,
        state: Option<StateValue>,
    },
}

impl Snapshot {
    pub fn of(proxy: &ProxyState) -> Self {
        Self::Emitted {
            position: proxy.position(),
            state: proxy.state(),
        }
    }

    pub fn position_differs(&self, position: Option<Coordinate>) -> bool {
        match self {
            Self::Sentinel => true,
            Self::Emitted { position: last, .. } => *last != position,
        }
    }

    pub fn state_differs(&self, state: Option<StateValue>) -> bool {
        match self {
            Self::Sentinel => true,
            Self::Emitted { state: last, .. } => *last != state,
        }
    }

    pub fn position(&self) -> Option<Coordinate> {
        match self {
            Self::Sentinel => None,
            Self::Emitted { position, .. } => *position,
        }
    }

    pub fn state(&self) -> Option<StateValue> {
        match self {
            Self::Sentinel => None,
            Self::Emitted { state, .. } => *state,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Sentinel)
    }
}
