// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Connected panel: push/pull reconciliation and commands

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::comm::GarnetComm;
use crate::config::{ArmMode, PanelConfig};
use crate::constants::{HOWLER_BASE_ID, PARTITION_BASE_ID};
use crate::devices::{
    ButtonAction, Device, DeviceId, DeviceKind, OutputState, PanelInfo, Permissions, SystemInfo,
    partition_id,
};
use crate::error::{GarnetError, Result};
use crate::event::{EventReceiver, EventSender, PanelEvent, event_channel};
use crate::liveness::{shutdown_signal, spawn_liveness};
use crate::protocol::SiaMessage;
use crate::status::PanelStatus;
use crate::store::DeviceStore;
use crate::transport::{ListenerRegistry, SiaListener};

/// A connected Garnet panel.
///
/// Keeps one device store in sync from two sources: push reports arriving
/// on the shared UDP listener, and status snapshots read from the cloud
/// (at connect, on every poll tick and after every command).
///
/// # Example
///
/// ```no_run
/// use garnet_bridge::{ArmMode, GarnetPanel, ListenerRegistry, PanelConfig};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = PanelConfig::builder()
///         .email("user@example.com")
///         .password("secret")
///         .system_id("a10050008d96")
///         .account("1234")
///         .build();
///
///     let registry = ListenerRegistry::new();
///     let mut panel = GarnetPanel::connect(config, &registry).await?;
///
///     let mut events = panel.subscribe();
///     tokio::spawn(async move {
///         while let Ok(event) = events.recv().await {
///             println!("Event: {:?}", event);
///         }
///     });
///
///     for device in panel.devices().await {
///         println!("{} {}: {}", device.id, device.name, device.native_state());
///     }
///
///     panel.arm_partition(1, ArmMode::Away).await?;
///
///     tokio::signal::ctrl_c().await?;
///     panel.disconnect();
///     Ok(())
/// }
/// ```
pub struct GarnetPanel {
    comm: Arc<GarnetComm>,
    account: String,
    listener: Option<Arc<SiaListener>>,
    store: Arc<RwLock<DeviceStore>>,
    event_tx: EventSender,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
    info: SystemInfo,
}

impl GarnetPanel {
    /// Subscribe to the shared listener, connect to the cloud, build the
    /// device store and start the background tasks.
    pub async fn connect(config: PanelConfig, registry: &ListenerRegistry) -> Result<Self> {
        let listener = registry.acquire(config.udp_port).await?;
        let (push_tx, push_rx) = mpsc::channel(config.push_queue_capacity);
        listener.add(&config.account, push_tx);

        let account = config.account.clone();
        match Self::start(config, listener.clone(), push_rx).await {
            Ok(panel) => Ok(panel),
            Err(e) => {
                listener.remove(&account);
                Err(e)
            }
        }
    }

    async fn start(
        config: PanelConfig,
        listener: Arc<SiaListener>,
        push_rx: mpsc::Receiver<SiaMessage>,
    ) -> Result<Self> {
        let comm = Arc::new(GarnetComm::new(config.clone())?);
        let (info, status) = comm.connect().await?;

        let mut store = DeviceStore::from_system(&config.controller_name(), &info);
        store.apply_status(&status, Instant::now());
        debug!("Device store holds {} devices", store.len());
        let store = Arc::new(RwLock::new(store));

        let (event_tx, _event_rx) = event_channel(256);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut tasks = vec![spawn_push_consumer(
            push_rx,
            store.clone(),
            event_tx.clone(),
            shutdown_rx.clone(),
        )];
        if !config.refresh_interval.is_zero() {
            tasks.push(spawn_poller(
                comm.clone(),
                store.clone(),
                event_tx.clone(),
                config.refresh_interval,
                shutdown_rx.clone(),
            ));
        }
        tasks.push(spawn_liveness(
            store.clone(),
            event_tx.clone(),
            config.keepalive_interval,
            shutdown_rx,
        ));

        let _ = event_tx.send(PanelEvent::Ready);
        info!("Panel {} ready", info.panel.id);

        Ok(Self {
            comm,
            account: config.account,
            listener: Some(listener),
            store,
            event_tx,
            shutdown_tx,
            tasks,
            info,
        })
    }

    /// Subscribe to panel events.
    pub fn subscribe(&self) -> EventReceiver {
        self.event_tx.subscribe()
    }

    pub async fn devices(&self) -> Vec<Device> {
        self.store.read().await.snapshot()
    }

    pub async fn device(&self, id: DeviceId) -> Option<Device> {
        self.store.read().await.get(id).cloned()
    }

    pub fn system_info(&self) -> &SystemInfo {
        &self.info
    }

    pub fn panel_info(&self) -> &PanelInfo {
        &self.info.panel
    }

    pub fn permissions(&self) -> Permissions {
        self.info.permissions
    }

    pub async fn user_name(&self) -> Option<String> {
        self.comm.user_name().await
    }

    /// Address of the shared listener while connected.
    pub fn listener_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().map(|l| l.local_addr())
    }

    /// Arm the partition device `id`.
    pub async fn arm_partition(&self, id: DeviceId, mode: ArmMode) -> Result<()> {
        let number = self.partition_number(id).await?;
        let comm = self.comm.clone();
        self.run_command(async move { comm.arm_system(number, mode).await }, None)
            .await
    }

    /// Disarm the partition device `id`.
    pub async fn disarm_partition(&self, id: DeviceId) -> Result<()> {
        let number = self.partition_number(id).await?;
        let comm = self.comm.clone();
        self.run_command(async move { comm.disarm_system(number).await }, None)
            .await
    }

    /// Switch the siren. On success the siren device takes the requested
    /// state even if the returned status lags behind.
    pub async fn set_siren(&self, state: OutputState) -> Result<()> {
        self.require_kind(HOWLER_BASE_ID, DeviceKind::Output).await?;
        let comm = self.comm.clone();
        self.run_command(async move { comm.horn_control(state).await }, Some(state))
            .await
    }

    /// Press a button device: the refresh button reads the status, an
    /// emergency button reports against the first partition. Collaborators
    /// are notified either way.
    pub async fn press_button(&self, id: DeviceId) -> Result<()> {
        let action = self
            .store
            .read()
            .await
            .get(id)
            .and_then(Device::button_action)
            .ok_or(GarnetError::UnknownDevice { id })?;

        let result = match action {
            ButtonAction::Refresh => self.apply_poll().await.map(|_| ()),
            ButtonAction::Emergency(kind) => {
                let first = self.store.read().await.first_partition();
                match first {
                    Some((number, name)) => self.comm.report_emergency(kind, number, &name).await,
                    None => Err(GarnetError::UnknownDevice {
                        id: partition_id(1),
                    }),
                }
            }
        };
        if let Err(e) = &result {
            warn!("Button {} failed: {}", id, e);
        }
        self.notify().await;
        result
    }

    /// Read the status now and apply it. Returns whether anything changed;
    /// collaborators are notified only then.
    pub async fn refresh_status(&self) -> Result<bool> {
        let changed = self.apply_poll().await?;
        if changed {
            self.notify().await;
        }
        Ok(changed)
    }

    /// Stop background tasks and leave the shared listener.
    pub fn disconnect(&mut self) {
        info!("Disconnecting panel {}", self.info.panel.id);
        self.shutdown();
        let _ = self.event_tx.send(PanelEvent::Disconnected);
    }

    fn shutdown(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(listener) = self.listener.take() {
            listener.remove(&self.account);
        }
        for h in self.tasks.drain(..) {
            h.abort();
        }
    }

    async fn apply_poll(&self) -> Result<bool> {
        let status = self.comm.get_state().await?;
        Ok(self.store.write().await.apply_status(&status, Instant::now()))
    }

    async fn notify(&self) {
        let devices = self.store.read().await.snapshot();
        let _ = self.event_tx.send(PanelEvent::DevicesUpdated { devices });
    }

    async fn require_kind(&self, id: DeviceId, kind: DeviceKind) -> Result<()> {
        match self.store.read().await.get(id) {
            Some(device) if device.kind() == kind => Ok(()),
            _ => Err(GarnetError::UnknownDevice { id }),
        }
    }

    async fn partition_number(&self, id: DeviceId) -> Result<u32> {
        self.require_kind(id, DeviceKind::Partition).await?;
        Ok(id - PARTITION_BASE_ID)
    }

    /// Run a cloud command off the caller's task, apply the status it
    /// returns and notify collaborators whether it succeeded or not.
    async fn run_command<F>(&self, command: F, siren: Option<OutputState>) -> Result<()>
    where
        F: Future<Output = Result<PanelStatus>> + Send + 'static,
    {
        let store = self.store.clone();
        let events = self.event_tx.clone();
        let handle = tokio::spawn(async move {
            let result = command.await;
            let devices = {
                let mut store = store.write().await;
                match &result {
                    Ok(status) => {
                        let now = Instant::now();
                        store.apply_status(status, now);
                        if let Some(state) = siren {
                            store.set_siren(state, now);
                        }
                    }
                    Err(e) => warn!("Command failed: {}", e),
                }
                store.snapshot()
            };
            let _ = events.send(PanelEvent::DevicesUpdated { devices });
            result.map(|_| ())
        });
        handle.await?
    }
}

impl Drop for GarnetPanel {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Drain one account's push queue into the store.
fn spawn_push_consumer(
    mut push_rx: mpsc::Receiver<SiaMessage>,
    store: Arc<RwLock<DeviceStore>>,
    events: EventSender,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                message = push_rx.recv() => match message {
                    Some(message) => message,
                    None => break,
                },
                _ = shutdown_signal(&mut shutdown_rx) => break,
            };
            debug!(
                "Report {} partition {} zone {} user {}",
                message.action, message.partition, message.zone, message.user
            );

            let devices = {
                let mut store = store.write().await;
                store
                    .apply_message(&message, Instant::now())
                    .then(|| store.snapshot())
            };
            if let Some(devices) = devices {
                let _ = events.send(PanelEvent::DevicesUpdated { devices });
            }
        }
        debug!("Push consumer shutting down");
    })
}

/// Periodically overwrite the store with the cloud status. A failed poll
/// is logged and leaves the devices untouched.
fn spawn_poller(
    comm: Arc<GarnetComm>,
    store: Arc<RwLock<DeviceStore>>,
    events: EventSender,
    period: std::time::Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown_signal(&mut shutdown_rx) => break,
            }
            let status = match comm.get_state().await {
                Ok(status) => status,
                Err(e) => {
                    warn!("Status poll failed: {}", e);
                    continue;
                }
            };
            let devices = {
                let mut store = store.write().await;
                store
                    .apply_status(&status, Instant::now())
                    .then(|| store.snapshot())
            };
            if let Some(devices) = devices {
                debug!("Poll changed device state");
                let _ = events.send(PanelEvent::DevicesUpdated { devices });
            }
        }
        debug!("Status poller shutting down");
    })
}
