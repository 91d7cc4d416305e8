// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Shared SIA/DC-09 UDP listener

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::net::UdpSocket;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::constants::{LISTENER_STARTUP_TIMEOUT, SIA_BUFFER_SIZE};
use crate::error::{GarnetError, Result};
use crate::frame::SiaFrame;
use crate::protocol::{SiaMessage, translate};

type SubscriberMap = HashMap<String, mpsc::Sender<SiaMessage>>;
type Subscribers = Arc<Mutex<SubscriberMap>>;

fn lock(subscribers: &Mutex<SubscriberMap>) -> MutexGuard<'_, SubscriberMap> {
    subscribers.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One UDP socket receiving reports for every configured account.
///
/// Valid frames are translated and pushed onto the owning account's bounded
/// queue, then acknowledged to the sender. The receive loop never runs
/// subscriber logic; a full queue leaves the frame unacknowledged so the
/// communicator retransmits it.
pub struct SiaListener {
    port: u16,
    local_addr: SocketAddr,
    subscribers: Subscribers,
    shutdown_tx: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SiaListener {
    /// Bind `0.0.0.0:port` and start the receive loop.
    pub async fn start(port: u16) -> Result<Arc<Self>> {
        let socket = timeout(LISTENER_STARTUP_TIMEOUT, UdpSocket::bind(("0.0.0.0", port)))
            .await
            .map_err(|_| GarnetError::ListenerStartup {
                reason: format!("binding UDP port {port} timed out"),
            })?
            .map_err(|e| GarnetError::ListenerStartup {
                reason: format!("cannot bind UDP port {port}: {e}"),
            })?;
        let local_addr = socket.local_addr()?;
        info!("SIA listener bound to {}", local_addr);

        let subscribers: Subscribers = Arc::default();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(receive_loop(socket, subscribers.clone(), shutdown_rx));

        Ok(Arc::new(Self {
            port,
            local_addr,
            subscribers,
            shutdown_tx,
            handle: Mutex::new(Some(handle)),
        }))
    }

    /// Port requested at start (0 when an ephemeral port was asked for).
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        if *self.shutdown_tx.borrow() {
            return false;
        }
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Register the queue of `account`. The last registration wins.
    pub fn add(&self, account: &str, queue: mpsc::Sender<SiaMessage>) {
        if lock(&self.subscribers)
            .insert(account.to_string(), queue)
            .is_some()
        {
            warn!("Replacing existing subscriber for account {}", account);
        } else {
            debug!("Subscriber added for account {}", account);
        }
    }

    /// Unregister `account`. Removing the last subscriber stops the listener.
    pub fn remove(&self, account: &str) {
        let remaining = {
            let mut subscribers = lock(&self.subscribers);
            if subscribers.remove(account).is_none() {
                warn!("No subscriber registered for account {}", account);
            }
            subscribers.len()
        };
        if remaining == 0 {
            info!("Last subscriber removed, stopping SIA listener");
            self.stop();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).len()
    }

    fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Stop the receive loop and wait for it to exit, releasing the socket.
    pub async fn shutdown(&self) {
        self.stop();
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
            && !e.is_cancelled()
        {
            error!("SIA receive loop failed: {}", e);
        }
    }
}

impl Drop for SiaListener {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(h) = self
            .handle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            h.abort();
        }
    }
}

async fn receive_loop(
    socket: UdpSocket,
    subscribers: Subscribers,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut buf = vec![0u8; SIA_BUFFER_SIZE];
    loop {
        tokio::select! {
            received = socket.recv_from(&mut buf) => match received {
                Ok((len, peer)) => handle_datagram(&socket, &subscribers, &buf[..len], peer).await,
                Err(e) => warn!("UDP receive failed: {}", e),
            },
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    debug!("SIA receive loop shutting down");
                    break;
                }
            }
        }
    }
}

async fn handle_datagram(socket: &UdpSocket, subscribers: &Subscribers, data: &[u8], peer: SocketAddr) {
    debug!("{} bytes from {}: {:?}", data.len(), peer, String::from_utf8_lossy(data));

    let frame = match SiaFrame::decode(data) {
        Ok(frame) => frame,
        Err(e) => {
            error!("Invalid frame from {}: {}", peer, e);
            return;
        }
    };

    if !dispatch(subscribers, translate(&frame)) {
        return;
    }

    if let Err(e) = socket.send_to(&frame.ack(), peer).await {
        warn!("Failed to send ACK to {}: {}", peer, e);
    }
}

/// Queue a report for its account. Returns whether the frame may be ACKed.
fn dispatch(subscribers: &Subscribers, message: SiaMessage) -> bool {
    let queue = lock(subscribers).get(&message.account).cloned();
    let Some(queue) = queue else {
        warn!("Report {} for unknown account {}", message.action, message.account);
        return true;
    };
    match queue.try_send(message) {
        Ok(()) => true,
        Err(TrySendError::Full(message)) => {
            warn!(
                "Queue for account {} is full, leaving {} unacknowledged",
                message.account, message.action
            );
            false
        }
        Err(TrySendError::Closed(message)) => {
            warn!("Subscriber for account {} has gone away", message.account);
            true
        }
    }
}

/// Owner of the process-wide listener.
///
/// The first `acquire` binds the socket; later ones share it while it runs.
/// Once the last subscriber leaves, the next `acquire` binds again.
#[derive(Default)]
pub struct ListenerRegistry {
    current: tokio::sync::Mutex<Option<Arc<SiaListener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, port: u16) -> Result<Arc<SiaListener>> {
        let mut current = self.current.lock().await;
        if let Some(listener) = current.as_ref()
            && listener.is_running()
        {
            if listener.port() != port {
                warn!(
                    "SIA listener already bound to port {}, ignoring port {}",
                    listener.port(),
                    port
                );
            }
            return Ok(listener.clone());
        }
        // A stopped loop may still own the socket
        if let Some(stale) = current.take() {
            stale.shutdown().await;
        }
        let listener = SiaListener::start(port).await?;
        *current = Some(listener.clone());
        Ok(listener)
    }
}
