//! Envelope posted by the sandbox console shim to the host window.
//!
//! The shim is JavaScript composed by `lca::sandbox`; it builds plain objects
//! with the field names below, so the constants here are the single source of
//! truth for both sides of the boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of the `channel` field. Messages with any other tag are not ours.
pub const CHANNEL: &str = "lca-playground";

pub const CHANNEL_FIELD: &str = "channel";
pub const RUN_FIELD: &str = "run";
pub const TYPE_FIELD: &str = "type";
pub const DATA_FIELD: &str = "data";

/// Generation counter of one sandbox run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl RunId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Log,
    Error,
}

impl Severity {
    /// Name of the console method and of the `type` field value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Error => "error",
        }
    }

    pub fn from_type(value: &str) -> Option<Self> {
        match value {
            "log" => Some(Self::Log),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// One shimmed console call, as it crosses the frame boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayMessage {
    pub channel: String,
    pub run: RunId,
    #[serde(rename = "type")]
    pub severity: Severity,
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

impl RelayMessage {
    pub fn new(run: RunId, severity: Severity, data: Vec<serde_json::Value>) -> Self {
        Self {
            channel: CHANNEL.to_owned(),
            run,
            severity,
            data,
        }
    }

    pub fn is_ours(&self) -> bool {
        self.channel == CHANNEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_shim_envelope() {
        let raw = json!({
            "channel": "lca-playground",
            "run": 3,
            "type": "error",
            "data": ["Execution Error:", "boom"],
        });
        let message: RelayMessage = serde_json::from_value(raw).unwrap();
        assert_eq!(message.run, RunId(3));
        assert_eq!(message.severity, Severity::Error);
        assert_eq!(message.data.len(), 2);
        assert!(message.is_ours());
    }

    #[test]
    fn missing_data_means_no_arguments() {
        let raw = json!({ "channel": "lca-playground", "run": 1, "type": "log" });
        let message: RelayMessage = serde_json::from_value(raw).unwrap();
        assert!(message.data.is_empty());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let raw = json!({ "channel": "lca-playground", "run": 1, "type": "warn", "data": [] });
        assert!(serde_json::from_value::<RelayMessage>(raw).is_err());
        assert_eq!(Severity::from_type("warn"), None);
    }

    #[test]
    fn foreign_channel_is_not_ours() {
        let message = RelayMessage {
            channel: "devtools".to_owned(),
            ..RelayMessage::new(RunId(1), Severity::Log, vec![])
        };
        assert!(!message.is_ours());
    }
}
