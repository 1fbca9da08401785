// MIT License - Copyright (c) 2026 Peter Wright
// SCSGate switch platform
//
//! # scsgate-switch
//!
//! SCSGate wall switches and scenario triggers for a home-automation host.
//!
//! The gateway client (bus I/O, task queue, message parsing) and the host
//! (entity registry, state machine, event bus) are collaborators reached
//! through the [`Gateway`] and [`Host`] traits. This crate provides the two
//! device shims and the setup pass that creates them from configuration.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use scsgate_switch::{
//!     host_channel, setup_platform, task_channel, MemoryGateway, Message, PlatformConfig,
//! };
//!
//! let config = PlatformConfig::from_toml_str(
//!     r#"
//!     [devices.living_room]
//!     scs_id = "12"
//!     name = "Living room"
//!
//!     [devices.good_night]
//!     scs_id = "40"
//!     type = "scenario"
//!     "#,
//! )
//! .unwrap();
//!
//! let (tasks_tx, _tasks) = task_channel();
//! let gateway = Arc::new(MemoryGateway::new(tasks_tx));
//! let (host, mut events) = host_channel(64);
//!
//! let mut entities = Vec::new();
//! setup_platform(&config, gateway.clone(), Arc::new(host), |added| entities = added);
//! assert_eq!(entities.len(), 1);
//!
//! gateway.dispatch(&Message::ScenarioTriggered {
//!     entity: "40".into(),
//!     scenario: "1a".into(),
//! });
//! assert!(events.try_recv().is_ok());
//! ```

pub mod config;
pub mod devices;
pub mod error;
pub mod event;
pub mod gateway;
pub mod host;
pub mod message;
pub mod mqtt;
pub mod platform;

// Re-exports for convenience
pub use config::{DeviceConfig, PlatformConfig, PlatformConfigBuilder, SwitchKind};
pub use devices::{ScenarioSwitch, Switch};
pub use error::{Result, ScsGateError};
pub use event::{host_channel, ChannelHost, HostEvent, HostMessage, HostReceiver};
pub use gateway::{task_channel, Gateway, GatewayDevice, MemoryGateway, TaskReceiver, TaskSender};
pub use host::{EntityState, Host, SwitchEntity, SwitchState};
pub use message::{Message, ScsId, Task};
pub use platform::{setup_platform, SetupReport, SkipReason};
