// MIT License - Copyright (c) 2026 Peter Wright
// SCSGate switch platform
//
// Messages delivered by the gateway dispatcher and tasks handed to the
// gateway task queue. Framing and parsing belong to the gateway client;
// these are the shapes the switch shims consume and produce.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, ScsGateError};

/// Numeric address of a device on the SCS bus, kept as configured.
///
/// The host schema coerces the configured value to a string, so both
/// `scs_id = "12"` and `scs_id = 12` deserialize to the same id. Surrounding
/// whitespace is dropped on construction, so `" 12 "` is also `12`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ScsId(String);

impl ScsId {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        match id.trim() {
            trimmed if trimmed.len() == id.len() => Self(id),
            trimmed => Self(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the id as a decimal integer.
    pub fn as_number(&self) -> Result<u32> {
        self.0
            .parse()
            .map_err(|_| ScsGateError::InvalidScsId {
                scs_id: self.0.clone(),
            })
    }
}

impl fmt::Display for ScsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScsId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ScsId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for ScsId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => ScsId::new(s),
            Raw::Number(n) => ScsId(n.to_string()),
        })
    }
}

/// A message received from the bus, as classified by the gateway client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// A device reported its on/off status.
    State {
        entity: ScsId,
        toggled: bool,
        #[serde(default)]
        bytes: Vec<u8>,
    },
    /// A scenario was activated; `scenario` is the hex id as sent on the bus.
    ScenarioTriggered { entity: ScsId, scenario: String },
    /// Another bus participant commanded a device.
    Command {
        entity: ScsId,
        toggled: bool,
        #[serde(default)]
        bytes: Vec<u8>,
    },
    /// Another bus participant asked a device for its status.
    RequestStatus {
        entity: ScsId,
        #[serde(default)]
        bytes: Vec<u8>,
    },
    /// A frame the gateway client could not classify.
    Unknown {
        #[serde(default)]
        bytes: Vec<u8>,
    },
}

impl Message {
    /// Device the message is addressed to, if any.
    pub fn entity(&self) -> Option<&ScsId> {
        match self {
            Self::State { entity, .. }
            | Self::ScenarioTriggered { entity, .. }
            | Self::Command { entity, .. }
            | Self::RequestStatus { entity, .. } => Some(entity),
            Self::Unknown { .. } => None,
        }
    }

    /// On/off flag carried by state and command messages.
    pub fn toggled(&self) -> Option<bool> {
        match self {
            Self::State { toggled, .. } | Self::Command { toggled, .. } => Some(*toggled),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::State { .. } => "StateMessage",
            Self::ScenarioTriggered { .. } => "ScenarioTriggeredMessage",
            Self::Command { .. } => "CommandMessage",
            Self::RequestStatus { .. } => "RequestStatusMessage",
            Self::Unknown { .. } => "UnknownMessage",
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State { entity, toggled, .. } | Self::Command { entity, toggled, .. } => {
                write!(f, "{}(entity={entity}, toggled={toggled})", self.kind())
            }
            Self::ScenarioTriggered { entity, scenario } => {
                write!(f, "{}(entity={entity}, scenario={scenario})", self.kind())
            }
            Self::RequestStatus { entity, .. } => write!(f, "{}(entity={entity})", self.kind()),
            Self::Unknown { bytes } => {
                write!(f, "{}(", self.kind())?;
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{b:02x}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A unit of work appended to the gateway task queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Task {
    /// Switch `target` on or off.
    ToggleStatus { target: ScsId, toggled: bool },
    /// Ask `target` to report its current status.
    RequestStatus { target: ScsId },
}

impl Task {
    pub fn toggle(target: ScsId, toggled: bool) -> Self {
        Self::ToggleStatus { target, toggled }
    }

    pub fn target(&self) -> &ScsId {
        match self {
            Self::ToggleStatus { target, .. } | Self::RequestStatus { target } => target,
        }
    }
}
