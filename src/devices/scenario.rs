// MIT License - Copyright (c) 2026 Peter Wright
// SCSGate switch platform

use std::sync::Arc;

use tracing::warn;

use crate::error::{Result, ScsGateError};
use crate::event::HostEvent;
use crate::gateway::GatewayDevice;
use crate::host::Host;
use crate::message::{Message, ScsId};

/// Offset of the scenario id within a raw state frame.
pub const SCENARIO_BYTE_OFFSET: usize = 4;

/// A trigger-only switch that relays scenario activations to the host.
///
/// It is always off and is never added to the host as an entity.
pub struct ScenarioSwitch {
    scs_id: ScsId,
    entity_number: u32,
    name: String,
    host: Arc<dyn Host>,
}

impl ScenarioSwitch {
    /// Fails when the scs id is not a decimal number, since events carry
    /// it as an integer.
    pub fn new(scs_id: ScsId, name: impl Into<String>, host: Arc<dyn Host>) -> Result<Self> {
        let entity_number = scs_id.as_number()?;
        Ok(Self {
            scs_id,
            entity_number,
            name: name.into(),
            host,
        })
    }

    pub fn is_on(&self) -> bool {
        false
    }

    pub fn should_poll(&self) -> bool {
        false
    }

    /// Extract the scenario id from a message, if it carries one.
    ///
    /// The hex id of a scenario-triggered message may carry a `0x` prefix.
    pub fn scenario_id(message: &Message) -> Option<Result<u32>> {
        match message {
            Message::State { bytes, .. } => Some(
                bytes
                    .get(SCENARIO_BYTE_OFFSET)
                    .map(|b| u32::from(*b))
                    .ok_or(ScsGateError::MissingScenarioByte {
                        offset: SCENARIO_BYTE_OFFSET,
                        len: bytes.len(),
                    }),
            ),
            Message::ScenarioTriggered { scenario, .. } => {
                let hex = scenario.trim();
                let hex = hex
                    .strip_prefix("0x")
                    .or_else(|| hex.strip_prefix("0X"))
                    .unwrap_or(hex);
                Some(
                    u32::from_str_radix(hex, 16).map_err(|_| ScsGateError::InvalidScenarioId {
                        value: scenario.clone(),
                    }),
                )
            }
            _ => None,
        }
    }
}

impl GatewayDevice for ScenarioSwitch {
    fn scs_id(&self) -> &ScsId {
        &self.scs_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn process_event(&self, message: &Message) -> bool {
        let scenario_id = match Self::scenario_id(message) {
            Some(Ok(id)) => id,
            Some(Err(e)) => {
                warn!("Scenario switch {}: dropping {message}: {e}", self.scs_id);
                return false;
            }
            None => {
                warn!("Scenario switch: received unknown message {message}");
                return false;
            }
        };

        self.host.fire(HostEvent::ScenarioSwitchTriggered {
            entity_id: self.entity_number,
            scenario_id,
        });
        true
    }
}
