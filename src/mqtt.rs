// MIT License - Copyright (c) 2026 Peter Wright
// MQTT wire format
//
// Published messages all share a flat {now, op, ...} structure.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::HostEvent;
use crate::host::EntityState;
use crate::message::{Message, Task};

pub fn now_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

#[derive(Debug, Serialize)]
pub struct MqttEvent {
    pub now: u64,
    pub op: &'static str,
    pub event_type: &'static str,
    pub data: Value,
}

impl MqttEvent {
    pub fn new(event: &HostEvent) -> Self {
        Self {
            now: now_epoch_ms(),
            op: "EVENT",
            event_type: event.event_type(),
            data: event.payload(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MqttState {
    pub now: u64,
    pub op: &'static str,
    #[serde(flatten)]
    pub state: EntityState,
}

impl MqttState {
    pub fn new(state: EntityState) -> Self {
        Self {
            now: now_epoch_ms(),
            op: "STATE",
            state,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MqttTask {
    pub now: u64,
    pub op: &'static str,
    pub task: Task,
}

impl MqttTask {
    pub fn new(task: Task) -> Self {
        Self {
            now: now_epoch_ms(),
            op: "TASK",
            task,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MqttSnapshot {
    pub now: u64,
    pub op: &'static str,
    pub switches: Vec<EntityState>,
}

impl MqttSnapshot {
    pub fn new(mut switches: Vec<EntityState>) -> Self {
        switches.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        Self {
            now: now_epoch_ms(),
            op: "SNAPSHOT",
            switches,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MqttCmdAck {
    pub now: u64,
    pub op: &'static str,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MqttCmdAck {
    pub fn ok(src: Option<Value>) -> Self {
        Self {
            now: now_epoch_ms(),
            op: "CMD_ACK",
            success: true,
            src,
            error: None,
        }
    }

    pub fn failed(src: Option<Value>, error: impl Into<String>) -> Self {
        Self {
            now: now_epoch_ms(),
            op: "CMD_ACK",
            success: false,
            src,
            error: Some(error.into()),
        }
    }
}

/// Commands accepted on the subscribe topic.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MqttCommand {
    TurnOn { entity_id: String },
    TurnOff { entity_id: String },
    Toggle { entity_id: String },
    /// Republish the state of every switch.
    Snapshot,
    /// A frame read from the bus by an external reader, delivered through
    /// the gateway dispatcher.
    BusMessage { message: Message },
}

impl MqttCommand {
    pub fn parse(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }

    /// Entity targeted by a switch command.
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            Self::TurnOn { entity_id } | Self::TurnOff { entity_id } | Self::Toggle { entity_id } => {
                Some(entity_id)
            }
            Self::Snapshot | Self::BusMessage { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SwitchState;

    #[test]
    fn test_parse_switch_commands() {
        let cmd = MqttCommand::parse(r#"{"op":"TURN_ON","entity_id":"switch.hall"}"#).unwrap();
        assert_eq!(
            cmd,
            MqttCommand::TurnOn {
                entity_id: "switch.hall".into()
            }
        );
        assert_eq!(cmd.entity_id(), Some("switch.hall"));

        let cmd = MqttCommand::parse(r#"{"op":"SNAPSHOT"}"#).unwrap();
        assert_eq!(cmd, MqttCommand::Snapshot);
        assert_eq!(cmd.entity_id(), None);
    }

    #[test]
    fn test_parse_bus_message() {
        let cmd = MqttCommand::parse(
            r#"{"op":"BUS_MESSAGE","message":{"type":"scenario_triggered","entity":"40","scenario":"1a"}}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            MqttCommand::BusMessage {
                message: Message::ScenarioTriggered {
                    entity: "40".into(),
                    scenario: "1a".into(),
                }
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_op() {
        assert!(MqttCommand::parse(r#"{"op":"DIM","entity_id":"switch.hall"}"#).is_err());
        assert!(MqttCommand::parse(r#"{"op":"TURN_ON"}"#).is_err());
    }

    #[test]
    fn test_state_is_flattened() {
        let msg = MqttState::new(EntityState {
            entity_id: "switch.hall".into(),
            scs_id: "1".into(),
            name: "Hall".into(),
            state: SwitchState::On,
        });
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["op"], "STATE");
        assert_eq!(value["entity_id"], "switch.hall");
        assert_eq!(value["state"], "on");
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let state = |id: &str| EntityState {
            entity_id: id.into(),
            scs_id: "1".into(),
            name: id.into(),
            state: SwitchState::Off,
        };
        let snap = MqttSnapshot::new(vec![state("switch.b"), state("switch.a")]);
        assert_eq!(snap.switches[0].entity_id, "switch.a");
    }
}
