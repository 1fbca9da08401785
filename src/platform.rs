// MIT License - Copyright (c) 2026 Peter Wright
// SCSGate switch platform

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{PlatformConfig, SwitchKind};
use crate::devices::{ScenarioSwitch, Switch};
use crate::error::ScsGateError;
use crate::gateway::{Gateway, GatewayDevice};
use crate::host::{Host, SwitchEntity};
use crate::message::ScsId;

/// Why a configured device was not set up.
#[derive(Debug)]
pub enum SkipReason {
    /// The gateway client already tracks this scs id.
    AlreadyRegistered,
    /// An earlier entry in the same pass was set up with this scs id.
    Duplicate,
    /// The `type` field names no known switch type.
    UnknownType(String),
    /// The device could not be built from its configuration.
    Invalid(ScsGateError),
}

/// Outcome of one setup pass.
#[derive(Debug, Default)]
pub struct SetupReport {
    /// Traditional switches handed to the host and the gateway
    pub traditional: Vec<ScsId>,
    /// Scenario switches registered with the gateway only
    pub scenarios: Vec<ScsId>,
    /// Skipped entries as (slug, reason)
    pub skipped: Vec<(String, SkipReason)>,
}

impl SetupReport {
    pub fn is_empty(&self) -> bool {
        self.traditional.is_empty() && self.scenarios.is_empty()
    }
}

/// Create the switches described by `config`.
///
/// Traditional switches are passed to `add_entities` and registered with
/// the gateway in one batch. Scenario switches are registered with the
/// gateway directly and never reach the host.
pub fn setup_platform<F>(
    config: &PlatformConfig,
    gateway: Arc<dyn Gateway>,
    host: Arc<dyn Host>,
    add_entities: F,
) -> SetupReport
where
    F: FnOnce(Vec<Arc<dyn SwitchEntity>>),
{
    let mut report = SetupReport::default();
    let mut seen: HashSet<&ScsId> = HashSet::new();
    let mut switches: Vec<Arc<Switch>> = Vec::new();

    for (slug, device) in &config.devices {
        if gateway.has_device(&device.scs_id) {
            debug!("Device {} already registered, skipping {slug}", device.scs_id);
            report.skipped.push((slug.clone(), SkipReason::AlreadyRegistered));
            continue;
        }
        if seen.contains(&device.scs_id) {
            warn!("Ignoring scsgate switch {slug}: scs_id {} used twice", device.scs_id);
            report.skipped.push((slug.clone(), SkipReason::Duplicate));
            continue;
        }

        let name = device.display_name(slug);
        match device.kind() {
            SwitchKind::Scenario => {
                info!("Adding {name} scsgate.scenario_switch");
                match ScenarioSwitch::new(device.scs_id.clone(), name, Arc::clone(&host)) {
                    Ok(switch) => {
                        seen.insert(&device.scs_id);
                        gateway.add_device(Arc::new(switch));
                        report.scenarios.push(device.scs_id.clone());
                    }
                    Err(e) => {
                        warn!("Ignoring scsgate scenario switch {slug}: {e}");
                        report.skipped.push((slug.clone(), SkipReason::Invalid(e)));
                    }
                }
            }
            SwitchKind::Unknown(switch_type) => {
                warn!("Ignoring scsgate switch of unknown type: {switch_type}");
                report
                    .skipped
                    .push((slug.clone(), SkipReason::UnknownType(switch_type.to_string())));
            }
            SwitchKind::Traditional => {
                info!("Adding {name} scsgate.traditional_switch");
                seen.insert(&device.scs_id);
                switches.push(Arc::new(Switch::new(
                    device.scs_id.clone(),
                    format!("switch.{slug}"),
                    name,
                    Arc::clone(&gateway),
                    Arc::clone(&host),
                )));
                report.traditional.push(device.scs_id.clone());
            }
        }
    }

    if !switches.is_empty() {
        let entities: Vec<Arc<dyn SwitchEntity>> = switches
            .iter()
            .map(|s| Arc::clone(s) as Arc<dyn SwitchEntity>)
            .collect();
        let devices: Vec<Arc<dyn GatewayDevice>> = switches
            .into_iter()
            .map(|s| s as Arc<dyn GatewayDevice>)
            .collect();
        add_entities(entities);
        gateway.add_devices_to_register(devices);
    }

    report
}
