// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Router error types

use std::str::Utf8Error;

use tangible_calibration::CalibrationError;

use crate::ProxyId;

pub type RouterResult<T> = Result<T, RouterError>;

/// Log severity an error is reported at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Reasons an inbound event or animation request was dropped
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouterError {
    /// Payload bytes are not text
    #[error("Failed to decode payload on topic '{topic}': {source}")]
    PayloadDecode {
        topic: String,
        #[source]
        source: Utf8Error,
    },

    #[error("Unknown topic '{0}'")]
    UnknownTopic(String),

    #[error("Invalid payload '{payload}' on topic '{topic}': {reason}")]
    MalformedPayload {
        topic: String,
        payload: String,
        reason: String,
    },

    #[error("Proxy with ID {0} not found")]
    UnknownProxy(ProxyId),

    #[error("Invalid state '{0}'")]
    InvalidState(String),

    #[error("Precondition not met: {0}")]
    Precondition(String),

    /// Deployed calibration data does not match the hardware
    #[error("Calibration defect: {0}")]
    Calibration(#[from] CalibrationError),

    #[error("Proxy ID {0} configured more than once")]
    DuplicateProxy(ProxyId),
}

impl RouterError {
    pub fn malformed(topic: &str, payload: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            topic: topic.to_string(),
            payload: payload.to_string(),
            reason: reason.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::PayloadDecode { .. } | Self::Calibration(_) | Self::DuplicateProxy(_) => {
                Severity::Error
            }
            Self::UnknownTopic(_)
            | Self::MalformedPayload { .. }
            | Self::UnknownProxy(_)
            | Self::InvalidState(_)
            | Self::Precondition(_) => Severity::Warning,
        }
    }

    /// True for calibration data inconsistent with the board wiring
    pub fn is_configuration_defect(&self) -> bool {
        matches!(self, Self::Calibration(_))
    }
}
