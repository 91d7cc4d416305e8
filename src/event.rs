// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Collaborator notifications

use crate::devices::{Device, LinkState};

/// Events emitted by a connected panel.
///
/// Subscribe via `panel.subscribe()` to receive a
/// `tokio::sync::broadcast::Receiver<PanelEvent>`.
#[derive(Debug, Clone)]
pub enum PanelEvent {
    /// Devices built and the first status applied
    Ready,
    /// Full device list after a push report, poll or command changed state
    DevicesUpdated { devices: Vec<Device> },
    /// Communicator link went Connected/Disconnected
    ConnectivityChanged { state: LinkState },
    /// Background tasks stopped
    Disconnected,
}

/// Type alias for the broadcast sender.
pub type EventSender = tokio::sync::broadcast::Sender<PanelEvent>;

/// Type alias for the broadcast receiver.
pub type EventReceiver = tokio::sync::broadcast::Receiver<PanelEvent>;

/// Create a new event channel with the given capacity.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    tokio::sync::broadcast::channel(capacity)
}
