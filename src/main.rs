// MIT License - Copyright (c) 2026 garnet-bridge contributors
// MQTT bridge

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::signal::unix::{Signal, SignalKind, signal};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{Duration, Instant, interval_at};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use garnet_bridge::constants::{DEFAULT_API_BASE_URL, DEFAULT_UDP_PORT, ZONE_BASE_ID};
use garnet_bridge::devices::partition_id;
use garnet_bridge::{
    ArmMode, Device, DeviceId, DeviceKind, DeviceState, EventReceiver, GarnetPanel,
    ListenerRegistry, OutputState, PanelConfig, PanelEvent, ZoneFlags,
};

#[derive(Parser)]
#[command(name = "garnet2mqtt")]
#[command(about = "Bridge between a Garnet alarm panel and MQTT")]
struct Cli {
    /// TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Config {
    garnet: GarnetToml,
    mqtt: MqttToml,
    #[serde(default, deserialize_with = "deserialize_zone_names")]
    zone_names: HashMap<u32, String>,
}

/// TOML keys are strings, so zone numbers arrive as `"3" = "Kitchen"`.
fn deserialize_zone_names<'de, D>(deserializer: D) -> Result<HashMap<u32, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = HashMap::<String, String>::deserialize(deserializer)?;
    let mut names = HashMap::with_capacity(raw.len());
    for (key, name) in raw {
        let number = key
            .parse::<u32>()
            .map_err(|_| serde::de::Error::custom(format!("invalid zone number: {key}")))?;
        names.insert(number, name);
    }
    Ok(names)
}

#[derive(Debug, Deserialize)]
struct GarnetToml {
    email: String,
    password: String,
    system_id: String,
    /// SIA account the communicator reports with
    account: String,
    #[serde(default = "default_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_api_timeout")]
    api_timeout_ms: u64,
    #[serde(default = "default_udp_port")]
    udp_port: u16,
    #[serde(default = "default_keepalive_interval")]
    keepalive_interval_secs: u64,
    #[serde(default = "default_refresh_interval")]
    refresh_interval_secs: u64,
    #[serde(default = "default_connect_retries")]
    connect_retries: u32,
    #[serde(default = "default_connect_retry_delay")]
    connect_retry_delay_ms: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}
fn default_api_timeout() -> u64 {
    8500
}
fn default_udp_port() -> u16 {
    DEFAULT_UDP_PORT
}
fn default_keepalive_interval() -> u64 {
    60
}
fn default_refresh_interval() -> u64 {
    60
}
fn default_connect_retries() -> u32 {
    5
}
fn default_connect_retry_delay() -> u64 {
    3000
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
    #[serde(default = "default_snapshot_interval")]
    snapshot_interval_secs: u64,
}

fn default_client_id() -> String {
    "garnet-bridge".to_string()
}
fn default_subscribe_topic() -> String {
    "garnet/cmd".to_string()
}
fn default_publish_topic() -> String {
    "garnet".to_string()
}
fn default_snapshot_interval() -> u64 {
    60
}

fn build_panel_config(toml: &GarnetToml) -> PanelConfig {
    PanelConfig::builder()
        .email(&toml.email)
        .password(&toml.password)
        .system_id(&toml.system_id)
        .account(&toml.account)
        .api_base_url(&toml.api_base_url)
        .api_timeout_ms(toml.api_timeout_ms)
        .udp_port(toml.udp_port)
        .keepalive_interval(Duration::from_secs(toml.keepalive_interval_secs))
        .refresh_interval(Duration::from_secs(toml.refresh_interval_secs))
        .connect_retries(toml.connect_retries)
        .connect_retry_delay(Duration::from_millis(toml.connect_retry_delay_ms))
        .build()
}

// ---------------------------------------------------------------------------
// Wire messages, all flat {now, op, ...} objects
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct MqttSnapshot {
    now: u64,
    op: String,
    state: MqttSnapshotState,
}

#[derive(Serialize)]
struct MqttSnapshotState {
    parts: Vec<MqttPartitionState>,
    zones: Vec<MqttZoneState>,
    siren: Option<String>,
    link: Option<String>,
    buttons: Vec<MqttButton>,
}

#[derive(Serialize)]
struct MqttPartitionState {
    id: DeviceId,
    key: String,
    name: String,
    state: String,
    alarm: bool,
}

#[derive(Serialize)]
struct MqttZoneState {
    id: DeviceId,
    key: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    open: bool,
    bypass: bool,
    locked: bool,
    alarm: bool,
}

#[derive(Serialize)]
struct MqttButton {
    id: DeviceId,
    key: String,
    name: String,
}

// Device events: {now, op, device, eventStr?}
#[derive(Debug, Serialize, PartialEq)]
struct MqttDeviceEvent {
    now: u64,
    op: String,
    device: DeviceId,
    #[serde(skip_serializing_if = "Option::is_none", rename = "eventStr")]
    event_str: Option<String>,
}

// Connectivity: {now, op, state}
#[derive(Serialize)]
struct MqttConnectivity {
    now: u64,
    op: String,
    state: String,
}

#[derive(Serialize)]
struct MqttCmdAck {
    now: u64,
    op: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    src: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Command read from the subscribe topic.
#[derive(Deserialize)]
struct MqttCommand {
    op: String,
    /// Partition number, 1-based
    #[serde(default)]
    partition: Option<u32>,
    /// Device id, for PRESS_BUTTON
    #[serde(default)]
    device: Option<DeviceId>,
}


type CommandOutcome = std::result::Result<Option<Value>, String>;

fn now_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

fn load_config(path: &str) -> Result<Config> {
    let text = std::fs::read_to_string(path).with_context(|| format!("cannot read {path}"))?;
    let config: Config = toml::from_str(&text).with_context(|| format!("cannot parse {path}"))?;
    parse_mqtt_url(&config.mqtt.url)?;
    Ok(config)
}

fn zone_label(device: &Device, overrides: &HashMap<u32, String>) -> String {
    overrides
        .get(&(device.id - ZONE_BASE_ID))
        .cloned()
        .unwrap_or_else(|| device.name.clone())
}

fn build_snapshot(devices: &[Device], zone_names: &HashMap<u32, String>) -> MqttSnapshot {
    let mut state = MqttSnapshotState {
        parts: Vec::new(),
        zones: Vec::new(),
        siren: None,
        link: None,
        buttons: Vec::new(),
    };

    for device in devices {
        match device.state {
            DeviceState::Partition(p) => state.parts.push(MqttPartitionState {
                id: device.id,
                key: device.unique_key.clone(),
                name: device.name.clone(),
                state: p.as_str().to_string(),
                alarm: device.alarmed,
            }),
            DeviceState::Zone(z) => state.zones.push(MqttZoneState {
                id: device.id,
                key: device.unique_key.clone(),
                name: zone_label(device, zone_names),
                icon: device.icon.clone(),
                open: z.is_open(),
                bypass: z.is_bypassed(),
                locked: z.is_locked(),
                alarm: device.alarmed,
            }),
            DeviceState::Output(o) => state.siren = Some(o.as_str().to_string()),
            DeviceState::Link(l) => state.link = Some(l.as_str().to_string()),
            DeviceState::Button(_) => state.buttons.push(MqttButton {
                id: device.id,
                key: device.unique_key.clone(),
                name: device.name.clone(),
            }),
        }
    }

    MqttSnapshot {
        now: now_epoch_ms(),
        op: "SNAPSHOT".to_string(),
        state,
    }
}

/// Per-device change events between two device lists.
fn device_events(previous: &HashMap<DeviceId, Device>, current: &[Device]) -> Vec<MqttDeviceEvent> {
    let now = now_epoch_ms();
    let event = |op: &str, device: DeviceId, event_str: Option<String>| MqttDeviceEvent {
        now,
        op: op.to_string(),
        device,
        event_str,
    };

    let mut events = Vec::new();
    for device in current {
        let Some(old) = previous.get(&device.id) else {
            continue;
        };

        match (old.state, device.state) {
            (DeviceState::Partition(before), DeviceState::Partition(after)) if before != after => {
                let event_str = format!("{}->{}", before.as_str(), after.as_str());
                events.push(event("PART_STATUS_CHANGE", device.id, Some(event_str)));
            }
            (DeviceState::Zone(before), DeviceState::Zone(after)) if before != after => {
                let changed = ZoneFlags::changed(before, after);
                let set_names = ZoneFlags::set_event_names(changed, after);
                let unset_names = ZoneFlags::unset_event_names(changed, after);
                let event_str = format!(
                    "set=[{}] unset=[{}]",
                    set_names.join(","),
                    unset_names.join(",")
                );
                events.push(event("ZONE_STATUS_CHANGE", device.id, Some(event_str)));
            }
            (DeviceState::Output(before), DeviceState::Output(after)) if before != after => {
                let op = if after.is_on() { "SIREN_ON" } else { "SIREN_OFF" };
                events.push(event(op, device.id, None));
            }
            _ => {}
        }

        if old.alarmed != device.alarmed {
            let op = match (device.kind(), device.alarmed) {
                (DeviceKind::Partition, true) => "PART_ALARM",
                (DeviceKind::Partition, false) => "PART_ALARM_STANDBY",
                (_, true) => "ZONE_ALARM",
                (_, false) => "ZONE_STANDBY",
            };
            events.push(event(op, device.id, None));
        }
    }
    events
}

fn index_devices(devices: &[Device]) -> HashMap<DeviceId, Device> {
    devices.iter().map(|d| (d.id, d.clone())).collect()
}

// ---------------------------------------------------------------------------
// Bridge
// ---------------------------------------------------------------------------

/// Publishing half of the bridge. Cloned into every task.
#[derive(Clone)]
struct Bridge {
    client: AsyncClient,
    topic: Arc<str>,
    zone_names: Arc<HashMap<u32, String>>,
}

impl Bridge {
    fn new(client: AsyncClient, config: &Config) -> Self {
        Self {
            client,
            topic: Arc::from(config.mqtt.publish_topic.as_str()),
            zone_names: Arc::new(config.zone_names.clone()),
        }
    }

    async fn publish(&self, payload: &impl Serialize, retain: bool) {
        let bytes = match serde_json::to_vec(payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Cannot encode MQTT payload: {e}");
                return;
            }
        };
        let topic = self.topic.as_ref();
        if let Err(e) = self.client.publish(topic, QoS::AtLeastOnce, retain, bytes).await {
            error!("Publish to {topic} failed: {e}");
        }
    }

    fn snapshot(&self, devices: &[Device]) -> MqttSnapshot {
        build_snapshot(devices, &self.zone_names)
    }

    async fn publish_snapshot(&self, devices: &[Device]) {
        self.publish(&self.snapshot(devices), true).await;
    }

    async fn ack(&self, src: Option<Value>, outcome: CommandOutcome) {
        let (success, data, error) = match outcome {
            Ok(data) => (true, data, None),
            Err(e) => (false, None, Some(e)),
        };
        let ack = MqttCmdAck {
            now: now_epoch_ms(),
            op: "CMD_ACK".to_string(),
            success,
            src,
            data,
            error,
        };
        self.publish(&ack, false).await;
    }
}

/// Execute one command against the panel. `Ok` may carry data for the acknowledgement.
async fn run_command(cmd: &MqttCommand, bridge: &Bridge, panel: &GarnetPanel) -> CommandOutcome {
    let partition = partition_id(cmd.partition.unwrap_or(1));
    let result = match cmd.op.as_str() {
        "SNAPSHOT" => {
            let snapshot = bridge.snapshot(&panel.devices().await);
            bridge.publish(&snapshot, true).await;
            return Ok(serde_json::to_value(&snapshot).ok());
        }
        "PING" => Ok(()),
        "ARM_AWAY" => panel.arm_partition(partition, ArmMode::Away).await,
        "ARM_HOME" => panel.arm_partition(partition, ArmMode::Home).await,
        "DISARM" => panel.disarm_partition(partition).await,
        "SIREN_ON" | "SIREN_OFF" => {
            let state = OutputState::from_bool(cmd.op == "SIREN_ON");
            panel.set_siren(state).await
        }
        "PRESS_BUTTON" => match cmd.device {
            Some(id) => panel.press_button(id).await,
            None => return Err("missing device".to_string()),
        },
        other => return Err(format!("unknown command {other}")),
    };
    result.map(|()| None).map_err(|e| e.to_string())
}

async fn handle_command(payload: &str, bridge: &Bridge, panel: &GarnetPanel) {
    let cmd: MqttCommand = match serde_json::from_str(payload) {
        Ok(cmd) => cmd,
        Err(e) => {
            warn!("Ignoring malformed command {payload}: {e}");
            return;
        }
    };
    if cmd.op == "SNAPSHOT" {
        debug!("Command {payload}");
    } else {
        info!("Command {payload}");
    }

    let outcome = run_command(&cmd, bridge, panel).await;
    match &outcome {
        Ok(_) => debug!("{} done", cmd.op),
        Err(e) => warn!("{} failed: {e}", cmd.op),
    }
    // src echoes the raw payload, op_id included
    bridge.ack(serde_json::from_str(payload).ok(), outcome).await;
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Turn panel events into device events, snapshots and connectivity messages.
async fn forward_events(bridge: Bridge, mut rx: EventReceiver, initial: Vec<Device>) {
    let mut previous = index_devices(&initial);
    loop {
        match rx.recv().await {
            Ok(PanelEvent::DevicesUpdated { devices }) => {
                for event in device_events(&previous, &devices) {
                    info!(
                        device = event.device,
                        detail = event.event_str.as_deref().unwrap_or(""),
                        "{}",
                        event.op
                    );
                    bridge.publish(&event, false).await;
                }
                bridge.publish_snapshot(&devices).await;
                previous = index_devices(&devices);
            }
            Ok(PanelEvent::ConnectivityChanged { state }) => {
                let msg = MqttConnectivity {
                    now: now_epoch_ms(),
                    op: "CONNECTIVITY".to_string(),
                    state: state.as_str().to_string(),
                };
                bridge.publish(&msg, true).await;
            }
            Ok(PanelEvent::Ready) => debug!("Panel ready"),
            Ok(PanelEvent::Disconnected) => warn!("Panel disconnected"),
            Err(RecvError::Lagged(n)) => warn!("Dropped {n} panel events"),
            Err(RecvError::Closed) => break,
        }
    }
}

/// Poll the MQTT connection and serve commands arriving on `command_topic`.
async fn serve_commands(
    bridge: Bridge,
    panel: Arc<GarnetPanel>,
    mut eventloop: EventLoop,
    command_topic: String,
) {
    loop {
        match eventloop.poll().await {
            // Sessions are clean, so every (re)connect needs a fresh subscription
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                match bridge.client.subscribe(&command_topic, QoS::AtLeastOnce).await {
                    Ok(()) => info!("Listening for commands on {command_topic}"),
                    Err(e) => error!("Subscribe to {command_topic} failed: {e}"),
                }
            }
            Ok(Event::Incoming(Packet::Publish(msg))) if msg.topic == command_topic => {
                let payload = String::from_utf8_lossy(&msg.payload);
                handle_command(&payload, &bridge, &panel).await;
            }
            Ok(_) => {}
            Err(e) => {
                error!("MQTT connection error: {e}");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

/// Republish the full state every `period`, starting one period from now.
async fn republish_snapshots(bridge: Bridge, panel: Arc<GarnetPanel>, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    loop {
        ticker.tick().await;
        bridge.publish_snapshot(&panel.devices().await).await;
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt = tracing_subscriber::fmt().with_env_filter(filter);
    // journald stamps each line itself
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        fmt.without_time().init();
    } else {
        fmt.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;

    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let registry = ListenerRegistry::new();

    while run_bridge(&config, &registry, &mut sighup, &mut sigterm).await? {
        match load_config(&cli.config) {
            Ok(reloaded) => {
                info!("Configuration reloaded from {}", cli.config);
                config = reloaded;
            }
            Err(e) => warn!("Keeping previous configuration: {e:#}"),
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Run one bridge session until a signal arrives. Returns true when SIGHUP asked for a restart.
async fn run_bridge(
    config: &Config,
    registry: &ListenerRegistry,
    sighup: &mut Signal,
    sigterm: &mut Signal,
) -> Result<bool> {
    let (host, port) = parse_mqtt_url(&config.mqtt.url)?;
    let panel_config = build_panel_config(&config.garnet);
    info!(
        system = %panel_config.system_id,
        account = %panel_config.account,
        "Connecting to Garnet cloud"
    );
    let panel = Arc::new(
        GarnetPanel::connect(panel_config, registry)
            .await
            .context("panel connection failed")?,
    );

    let mut options = MqttOptions::new(&config.mqtt.client_id, host, port);
    options.set_keep_alive(Duration::from_secs(30));
    let (client, eventloop) = AsyncClient::new(options, 256);
    let bridge = Bridge::new(client, config);

    let initial = panel.devices().await;
    bridge.publish_snapshot(&initial).await;

    let period = Duration::from_secs(config.mqtt.snapshot_interval_secs.max(1));
    let tasks = [
        tokio::spawn(forward_events(bridge.clone(), panel.subscribe(), initial)),
        tokio::spawn(serve_commands(
            bridge.clone(),
            Arc::clone(&panel),
            eventloop,
            config.mqtt.subscribe_topic.clone(),
        )),
        tokio::spawn(republish_snapshots(bridge, Arc::clone(&panel), period)),
    ];
    info!("Bridge up; SIGHUP reloads, SIGINT or SIGTERM stops");

    let restart = tokio::select! {
        _ = tokio::signal::ctrl_c() => false,
        _ = sigterm.recv() => false,
        _ = sighup.recv() => true,
    };
    info!(restart, "Stopping bridge session");

    // Tasks hold panel clones until they are joined
    for task in tasks {
        task.abort();
        let _ = task.await;
    }
    match Arc::try_unwrap(panel) {
        Ok(mut panel) => panel.disconnect(),
        Err(_) => warn!("Panel still shared, leaving teardown to drop"),
    }
    Ok(restart)
}

/// Split `mqtt://host:port` (or `tcp://`, or a bare `host:port`) into its parts.
fn parse_mqtt_url(url: &str) -> Result<(String, u16)> {
    let authority = ["mqtt://", "tcp://"]
        .iter()
        .find_map(|scheme| url.strip_prefix(*scheme))
        .unwrap_or(url);
    let Some((host, port)) = authority.rsplit_once(':') else {
        anyhow::bail!("MQTT URL {url} has no port");
    };
    let port = port
        .parse::<u16>()
        .with_context(|| format!("bad MQTT port in {url}"))?;
    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use garnet_bridge::{LinkState, PartitionState};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_mqtt_url() {
        assert_eq!(
            parse_mqtt_url("mqtt://broker.local:1883").unwrap(),
            ("broker.local".to_string(), 1883)
        );
        assert_eq!(
            parse_mqtt_url("tcp://10.0.0.2:8883").unwrap(),
            ("10.0.0.2".to_string(), 8883)
        );
        assert!(parse_mqtt_url("mqtt://broker.local").is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config: Config = toml::from_str(
            r#"
            [garnet]
            email = "user@example.com"
            password = "secret"
            system_id = "a10050008d96"
            account = "1234"

            [mqtt]
            url = "mqtt://localhost:1883"

            [zone_names]
            3 = "Kitchen window"
            "#,
        )
        .unwrap();
        assert_eq!(config.garnet.udp_port, 2123);
        assert_eq!(config.mqtt.publish_topic, "garnet");
        assert_eq!(config.zone_names.get(&3).map(String::as_str), Some("Kitchen window"));

        let panel = build_panel_config(&config.garnet);
        assert_eq!(panel.keepalive_interval, Duration::from_secs(60));
        assert_eq!(panel.connect_retry_delay, Duration::from_secs(3));
        assert_eq!(panel.controller_name(), "1234");
    }

    #[test]
    fn test_invalid_zone_name_key() {
        let parsed = toml::from_str::<Config>(
            r#"
            [garnet]
            email = "e"
            password = "p"
            system_id = "s"
            account = "a"
            [mqtt]
            url = "mqtt://localhost:1883"
            [zone_names]
            kitchen = "Kitchen"
            "#,
        );
        assert!(parsed.is_err());
    }

    fn devices() -> Vec<Device> {
        let mut zone = Device::zone("c", 3, "Ventana", Some("mdi:door"));
        zone.state = DeviceState::Zone(ZoneFlags::OPEN);
        vec![
            Device::partition("c", 1, "Casa"),
            zone,
            Device::siren("c"),
            Device::communicator("c"),
        ]
    }

    #[test]
    fn test_snapshot_groups_devices() {
        let mut names = HashMap::new();
        names.insert(3, "Kitchen window".to_string());
        let snapshot = build_snapshot(&devices(), &names);
        let value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(value["op"], "SNAPSHOT");
        assert_eq!(value["state"]["parts"][0]["state"], "unknown");
        assert_eq!(value["state"]["zones"][0]["name"], "Kitchen window");
        assert_eq!(value["state"]["zones"][0]["open"], true);
        assert_eq!(value["state"]["siren"], "off");
        assert_eq!(value["state"]["link"], LinkState::Unknown.as_str());
    }

    #[test]
    fn test_device_events_report_changes() {
        let before = devices();
        let previous = index_devices(&before);

        let mut after = before.clone();
        after[0].state = DeviceState::Partition(PartitionState::ArmedAway);
        after[0].alarmed = true;
        after[1].state = DeviceState::Zone(ZoneFlags::LOCKED);
        after[2].state = DeviceState::Output(OutputState::On);

        let ops: Vec<(String, Option<String>)> = device_events(&previous, &after)
            .into_iter()
            .map(|e| (e.op, e.event_str))
            .collect();
        assert_eq!(
            ops,
            vec![
                ("PART_STATUS_CHANGE".to_string(), Some("unknown->away".to_string())),
                ("PART_ALARM".to_string(), None),
                (
                    "ZONE_STATUS_CHANGE".to_string(),
                    Some("set=[Armed] unset=[Closed]".to_string())
                ),
                ("SIREN_ON".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_device_events_quiet_without_changes() {
        let before = devices();
        assert!(device_events(&index_devices(&before), &before).is_empty());
    }
}
