// MIT License - Copyright (c) 2026 Peter Wright
// MQTT bridge

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use serde::{Deserialize, Serialize};
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

use scsgate_switch::mqtt::{MqttCmdAck, MqttCommand, MqttEvent, MqttSnapshot, MqttState, MqttTask};
use scsgate_switch::{
    host_channel, setup_platform, task_channel, DeviceConfig, Gateway, HostMessage,
    MemoryGateway, PlatformConfig, SwitchEntity,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "scsgate2mqtt")]
#[command(about = "Bridge SCSGate switches and scenarios to MQTT")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Config {
    mqtt: MqttToml,
    #[serde(default)]
    devices: BTreeMap<String, DeviceConfig>,
}

#[derive(Debug, Deserialize)]
struct MqttToml {
    url: String,
    #[serde(default = "default_client_id")]
    client_id: String,
    #[serde(default = "default_subscribe_topic")]
    subscribe_topic: String,
    #[serde(default = "default_publish_topic")]
    publish_topic: String,
}

fn default_client_id() -> String {
    "scsgate-bridge".to_string()
}
fn default_subscribe_topic() -> String {
    "scsgate/cmd".to_string()
}
fn default_publish_topic() -> String {
    "scsgate".to_string()
}

type Entities = HashMap<String, Arc<dyn SwitchEntity>>;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn publish_json(client: &AsyncClient, topic: &str, payload: &impl Serialize, retain: bool) {
    match serde_json::to_string(payload) {
        Ok(json) => {
            if let Err(e) = client.publish(topic, QoS::AtLeastOnce, retain, json).await {
                error!("Failed to publish to {topic}: {e}");
            }
        }
        Err(e) => error!("Failed to serialize MQTT payload: {e}"),
    }
}

async fn publish_snapshot(client: &AsyncClient, topic: &str, entities: &Entities) {
    let states = entities.values().map(|e| e.state()).collect();
    publish_json(client, topic, &MqttSnapshot::new(states), true).await;
}

// ---------------------------------------------------------------------------
// MQTT command → switches / gateway
// ---------------------------------------------------------------------------

async fn handle_command(
    payload: &str,
    cmd: MqttCommand,
    client: &AsyncClient,
    topic: &str,
    entities: &Entities,
    gateway: &MemoryGateway,
) {
    let src = serde_json::from_str::<serde_json::Value>(payload).ok();

    let ack = match cmd {
        MqttCommand::Snapshot => {
            publish_snapshot(client, topic, entities).await;
            return;
        }
        MqttCommand::BusMessage { message } => {
            let registered = message.entity().is_some_and(|id| gateway.has_device(id));
            if gateway.dispatch(&message) {
                MqttCmdAck::ok(src)
            } else if registered {
                MqttCmdAck::failed(src, format!("Message not handled: {message}"))
            } else {
                MqttCmdAck::failed(src, format!("No device registered for {message}"))
            }
        }
        cmd => {
            let entity_id = cmd.entity_id().unwrap_or_default();
            match entities.get(entity_id) {
                Some(entity) => {
                    match &cmd {
                        MqttCommand::TurnOn { .. } => entity.turn_on(),
                        MqttCommand::TurnOff { .. } => entity.turn_off(),
                        MqttCommand::Toggle { .. } => entity.toggle(),
                        MqttCommand::Snapshot | MqttCommand::BusMessage { .. } => {}
                    }
                    MqttCmdAck::ok(src)
                }
                None => MqttCmdAck::failed(src, format!("Unknown entity: {entity_id}")),
            }
        }
    };

    publish_json(client, topic, &ack, false).await;
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=debug or RUST_LOG=scsgate_switch=trace).
    // Default: info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // systemd journal already adds timestamps, so omit them when running under systemd
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_subscriber::fmt().without_time().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let cli = Cli::parse();

    // Load config
    let config_text =
        std::fs::read_to_string(&cli.config).context("Failed to read config file")?;
    let config: Config = toml::from_str(&config_text).context("Failed to parse config file")?;
    let platform = PlatformConfig {
        devices: config.devices,
    };
    platform.validate().context("Invalid device configuration")?;

    // Set up switches
    let (task_tx, mut task_rx) = task_channel();
    let gateway = Arc::new(MemoryGateway::new(task_tx));
    let (host, mut host_rx) = host_channel(256);

    let mut entities = Entities::new();
    let report = setup_platform(&platform, gateway.clone(), Arc::new(host), |added| {
        entities = added
            .into_iter()
            .map(|e| (e.entity_id().to_string(), e))
            .collect();
    });
    for (slug, reason) in &report.skipped {
        info!("Skipped device {slug}: {reason:?}");
    }
    info!(
        "Set up {} switches and {} scenario switches",
        report.traditional.len(),
        report.scenarios.len()
    );
    let entities = Arc::new(entities);

    // Set up MQTT
    let (mqtt_host, mqtt_port) = parse_mqtt_url(&config.mqtt.url)?;
    let mut mqtt_opts = MqttOptions::new(&config.mqtt.client_id, &mqtt_host, mqtt_port);
    mqtt_opts.set_keep_alive(Duration::from_secs(30));
    let (client, mut eventloop) = AsyncClient::new(mqtt_opts, 256);

    let publish_topic = config.mqtt.publish_topic;
    let subscribe_topic = config.mqtt.subscribe_topic;

    // Task 1: host events and state updates → MQTT
    let client_host = client.clone();
    let topic_host = publish_topic.clone();
    let host_handle = tokio::spawn(async move {
        loop {
            match host_rx.recv().await {
                Ok(HostMessage::Event(event)) => {
                    info!("Host event {}: {}", event.event_type(), event.payload());
                    publish_json(&client_host, &topic_host, &MqttEvent::new(&event), false).await;
                }
                Ok(HostMessage::StateChanged(state)) => {
                    debug!("State of {} is now {}", state.entity_id, state.state);
                    publish_json(&client_host, &topic_host, &MqttState::new(state), false).await;
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Host receiver lagged, missed {n} messages");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    info!("Host channel closed");
                    break;
                }
            }
        }
    });

    // Task 2: gateway tasks → MQTT, for the process driving the bus
    let client_tasks = client.clone();
    let topic_tasks = publish_topic.clone();
    let task_handle = tokio::spawn(async move {
        while let Some(task) = task_rx.recv().await {
            debug!("Publishing task {task:?}");
            publish_json(&client_tasks, &topic_tasks, &MqttTask::new(task), false).await;
        }
        info!("Task queue closed");
    });

    // Task 3: MQTT event loop (receives messages, handles commands)
    let client_cmds = client.clone();
    let topic_cmds = publish_topic.clone();
    let entities_cmds = Arc::clone(&entities);
    let gateway_cmds = Arc::clone(&gateway);
    let sub_topic = subscribe_topic.clone();
    let mqtt_handle = tokio::spawn(async move {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    // rumqttc does not resubscribe after a broker reconnect.
                    info!("MQTT: connected, subscribing to {sub_topic}");
                    if let Err(e) = client_cmds.subscribe(&sub_topic, QoS::AtLeastOnce).await {
                        error!("Failed to subscribe to {sub_topic}: {e}");
                    }
                    publish_snapshot(&client_cmds, &topic_cmds, &entities_cmds).await;
                }
                Ok(Event::Incoming(Packet::Publish(msg))) => {
                    if msg.topic == sub_topic {
                        let payload = String::from_utf8_lossy(&msg.payload);
                        match MqttCommand::parse(&payload) {
                            Ok(cmd) => {
                                info!("MQTT command received: {payload}");
                                handle_command(
                                    &payload,
                                    cmd,
                                    &client_cmds,
                                    &topic_cmds,
                                    &entities_cmds,
                                    &gateway_cmds,
                                )
                                .await;
                            }
                            Err(e) => {
                                warn!("Failed to parse MQTT command: {e}");
                            }
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!("MQTT event loop error: {e}");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    });

    let mut sigterm = signal(SignalKind::terminate())?;

    info!("MQTT bridge running. Send SIGINT/SIGTERM to stop.");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Received SIGINT, shutting down..."),
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
    }

    mqtt_handle.abort();
    host_handle.abort();
    task_handle.abort();

    if let Err(e) = client.disconnect().await {
        warn!("Error disconnecting from MQTT: {e}");
    }

    info!("Shutdown complete");
    Ok(())
}

/// Parse an MQTT URL like "mqtt://host:port" into (host, port).
fn parse_mqtt_url(url: &str) -> Result<(String, u16)> {
    let stripped = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    let (host, port_str) = stripped
        .rsplit_once(':')
        .context("MQTT URL must be in format mqtt://host:port")?;

    let port: u16 = port_str.parse().context("Invalid MQTT port number")?;

    Ok((host.to_string(), port))
}
