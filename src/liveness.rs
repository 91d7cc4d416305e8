// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Communicator liveness monitor

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::event::{EventSender, PanelEvent};
use crate::store::DeviceStore;

/// Resolve once shutdown is signalled or the signalling side is gone.
pub(crate) async fn shutdown_signal(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Watch the communicator link of one panel.
///
/// After a warm-up of one keepalive interval, re-evaluates the link every
/// interval. Only a transition notifies collaborators, first with
/// `ConnectivityChanged` and then with the full device list.
pub fn spawn_liveness(
    store: Arc<RwLock<DeviceStore>>,
    events: EventSender,
    keepalive: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = sleep(keepalive) => {}
            _ = shutdown_signal(&mut shutdown_rx) => return,
        }
        loop {
            tokio::select! {
                _ = sleep(keepalive) => {}
                _ = shutdown_signal(&mut shutdown_rx) => break,
            }

            let (state, devices) = {
                let mut store = store.write().await;
                let Some(state) = store.update_link(Instant::now(), keepalive) else {
                    continue;
                };
                (state, store.snapshot())
            };
            info!("Communicator {}", state.as_str());
            let _ = events.send(PanelEvent::ConnectivityChanged { state });
            let _ = events.send(PanelEvent::DevicesUpdated { devices });
        }
        debug!("Liveness monitor shutting down");
    })
}
