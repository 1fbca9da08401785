// MIT License - Copyright (c) 2026 Peter Wright
// SCSGate switch platform

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::HostEvent;
use crate::message::ScsId;

/// On/off state as shown by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchState {
    On,
    Off,
}

impl SwitchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl From<bool> for SwitchState {
    fn from(on: bool) -> Self {
        if on {
            Self::On
        } else {
            Self::Off
        }
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a switch entity written to the host state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    pub scs_id: ScsId,
    pub name: String,
    pub state: SwitchState,
}

/// The host's switch capability contract.
///
/// Implementors are shared between the host and the gateway dispatcher,
/// so every method takes `&self`.
pub trait SwitchEntity: Send + Sync {
    /// Host-visible id, e.g. `switch.living_room`.
    fn entity_id(&self) -> &str;

    fn scs_id(&self) -> &ScsId;

    fn name(&self) -> &str;

    fn is_on(&self) -> bool;

    /// Whether the host must poll for state. Push-driven entities return false.
    fn should_poll(&self) -> bool {
        true
    }

    fn turn_on(&self);

    fn turn_off(&self);

    fn toggle(&self) {
        if self.is_on() {
            self.turn_off();
        } else {
            self.turn_on();
        }
    }

    fn state(&self) -> EntityState {
        EntityState {
            entity_id: self.entity_id().to_string(),
            scs_id: self.scs_id().clone(),
            name: self.name().to_string(),
            state: SwitchState::from(self.is_on()),
        }
    }
}

/// Side effects the shims perform on the host.
pub trait Host: Send + Sync {
    /// Publish an event on the host event bus.
    fn fire(&self, event: HostEvent);

    /// Ask the host to record a new entity state.
    fn schedule_update(&self, state: EntityState);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Lamp {
        scs_id: ScsId,
        on: AtomicBool,
    }

    impl SwitchEntity for Lamp {
        fn entity_id(&self) -> &str {
            "switch.lamp"
        }
        fn scs_id(&self) -> &ScsId {
            &self.scs_id
        }
        fn name(&self) -> &str {
            "Lamp"
        }
        fn is_on(&self) -> bool {
            self.on.load(Ordering::SeqCst)
        }
        fn turn_on(&self) {
            self.on.store(true, Ordering::SeqCst);
        }
        fn turn_off(&self) {
            self.on.store(false, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_switch_state_labels() {
        assert_eq!(SwitchState::from(true).as_str(), "on");
        assert_eq!(SwitchState::from(false).to_string(), "off");
        assert_eq!(serde_json::to_value(SwitchState::On).unwrap(), "on");
    }

    #[test]
    fn test_default_toggle_and_state() {
        let lamp = Lamp {
            scs_id: "3".into(),
            on: AtomicBool::new(false),
        };
        assert!(lamp.should_poll());

        lamp.toggle();
        assert!(lamp.is_on());
        let state = lamp.state();
        assert_eq!(state.entity_id, "switch.lamp");
        assert_eq!(state.state, SwitchState::On);

        lamp.toggle();
        assert!(!lamp.is_on());
    }
}
