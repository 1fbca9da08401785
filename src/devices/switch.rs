// MIT License - Copyright (c) 2026 Peter Wright
// SCSGate switch platform

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::event::HostEvent;
use crate::gateway::{Gateway, GatewayDevice};
use crate::host::{Host, SwitchEntity, SwitchState};
use crate::message::{Message, ScsId, Task};

/// A traditional on/off wall switch.
///
/// State is pushed by the gateway dispatcher; commands are fire-and-forget
/// and update the local state before the bus confirms them.
pub struct Switch {
    scs_id: ScsId,
    entity_id: String,
    name: String,
    toggled: AtomicBool,
    gateway: Arc<dyn Gateway>,
    host: Arc<dyn Host>,
}

impl Switch {
    pub fn new(
        scs_id: ScsId,
        entity_id: impl Into<String>,
        name: impl Into<String>,
        gateway: Arc<dyn Gateway>,
        host: Arc<dyn Host>,
    ) -> Self {
        Self {
            scs_id,
            entity_id: entity_id.into(),
            name: name.into(),
            toggled: AtomicBool::new(false),
            gateway,
            host,
        }
    }

    fn command(&self, toggled: bool) {
        self.gateway
            .append_task(Task::toggle(self.scs_id.clone(), toggled));
        self.toggled.store(toggled, Ordering::SeqCst);
        self.host.schedule_update(self.state());
    }
}

impl SwitchEntity for Switch {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn scs_id(&self) -> &ScsId {
        &self.scs_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_on(&self) -> bool {
        self.toggled.load(Ordering::SeqCst)
    }

    fn should_poll(&self) -> bool {
        false
    }

    fn turn_on(&self) {
        self.command(true);
    }

    fn turn_off(&self) {
        self.command(false);
    }
}

impl GatewayDevice for Switch {
    fn scs_id(&self) -> &ScsId {
        &self.scs_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn process_event(&self, message: &Message) -> bool {
        let Some(toggled) = message.toggled() else {
            debug!("Switch {}, ignoring {message} without state", self.scs_id);
            return false;
        };

        if self
            .toggled
            .compare_exchange(!toggled, toggled, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!(
                "Switch {}, ignoring message {message} because state already active",
                self.scs_id
            );
            return true;
        }

        self.host.schedule_update(self.state());
        self.host.fire(HostEvent::ButtonPressed {
            entity_id: self.scs_id.clone(),
            state: SwitchState::from(toggled),
        });
        true
    }
}
