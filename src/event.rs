// MIT License - Copyright (c) 2026 Peter Wright
// SCSGate switch platform

use serde_json::{json, Value};
use tracing::debug;

use crate::host::{EntityState, Host, SwitchState};
use crate::message::ScsId;

pub const EVENT_BUTTON_PRESSED: &str = "button_pressed";
pub const EVENT_SCENARIO_SWITCH_TRIGGERED: &str = "scenario_switch_triggered";

/// Events the shims publish on the host event bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A traditional switch changed state on the bus.
    ButtonPressed { entity_id: ScsId, state: SwitchState },
    /// A scenario switch relayed a scenario activation.
    ScenarioSwitchTriggered { entity_id: u32, scenario_id: u32 },
}

impl HostEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ButtonPressed { .. } => EVENT_BUTTON_PRESSED,
            Self::ScenarioSwitchTriggered { .. } => EVENT_SCENARIO_SWITCH_TRIGGERED,
        }
    }

    /// Event data as the host bus carries it.
    pub fn payload(&self) -> Value {
        match self {
            Self::ButtonPressed { entity_id, state } => json!({
                "entity_id": entity_id,
                "state": state,
            }),
            Self::ScenarioSwitchTriggered {
                entity_id,
                scenario_id,
            } => json!({
                "entity_id": entity_id,
                "scenario_id": scenario_id,
            }),
        }
    }
}

/// Everything a [`ChannelHost`] broadcasts to its subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMessage {
    Event(HostEvent),
    StateChanged(EntityState),
}

/// Type alias for the broadcast sender.
pub type HostSender = tokio::sync::broadcast::Sender<HostMessage>;

/// Type alias for the broadcast receiver.
pub type HostReceiver = tokio::sync::broadcast::Receiver<HostMessage>;

/// A [`Host`] that broadcasts fired events and state updates on a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelHost {
    tx: HostSender,
}

impl ChannelHost {
    pub fn subscribe(&self) -> HostReceiver {
        self.tx.subscribe()
    }

    fn send(&self, msg: HostMessage) {
        if self.tx.send(msg).is_err() {
            debug!("No host subscribers, dropping message");
        }
    }
}

impl Host for ChannelHost {
    fn fire(&self, event: HostEvent) {
        debug!("Firing {} {}", event.event_type(), event.payload());
        self.send(HostMessage::Event(event));
    }

    fn schedule_update(&self, state: EntityState) {
        self.send(HostMessage::StateChanged(state));
    }
}

/// Create a new host channel with the given capacity.
pub fn host_channel(capacity: usize) -> (ChannelHost, HostReceiver) {
    let (tx, rx) = tokio::sync::broadcast::channel(capacity);
    (ChannelHost { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_pressed_payload() {
        let event = HostEvent::ButtonPressed {
            entity_id: "12".into(),
            state: SwitchState::Off,
        };
        assert_eq!(event.event_type(), "button_pressed");
        assert_eq!(event.payload(), json!({"entity_id": "12", "state": "off"}));
    }

    #[test]
    fn test_scenario_payload_uses_integers() {
        let event = HostEvent::ScenarioSwitchTriggered {
            entity_id: 40,
            scenario_id: 26,
        };
        assert_eq!(event.event_type(), "scenario_switch_triggered");
        assert_eq!(event.payload(), json!({"entity_id": 40, "scenario_id": 26}));
    }

    #[test]
    fn test_channel_host_broadcasts() {
        let (host, mut rx) = host_channel(8);
        let mut second = host.subscribe();

        host.fire(HostEvent::ScenarioSwitchTriggered {
            entity_id: 1,
            scenario_id: 2,
        });

        for rx in [&mut rx, &mut second] {
            match rx.try_recv().unwrap() {
                HostMessage::Event(event) => {
                    assert_eq!(event.event_type(), EVENT_SCENARIO_SWITCH_TRIGGERED);
                    assert_eq!(event.payload()["scenario_id"], 2);
                }
                other => panic!("unexpected message: {other:?}"),
            }
        }
    }

    #[test]
    fn test_channel_host_without_subscribers() {
        let (host, rx) = host_channel(4);
        drop(rx);
        // Must not panic with nobody listening.
        host.schedule_update(EntityState {
            entity_id: "switch.hall".into(),
            scs_id: "5".into(),
            name: "Hall".into(),
            state: SwitchState::On,
        });
    }
}
