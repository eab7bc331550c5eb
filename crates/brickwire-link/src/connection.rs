//! Hub connection management and gated transmission
//!
//! The manager owns the link's [`ConnectionState`]. Only the event handlers
//! in this module write it; `send` and the dispatcher only read it.
//!
//! ```text
//! Disconnected --scan ok--> Scanning --first discovery--> Connecting
//!      ^                                                     |
//!      +------------------- connect failed -----------------+
//!                                                           |
//!                              Connected <-- connect ok ----+
//! ```
//!
//! There is no automatic rescan: once the link falls back to
//! `Disconnected` it stays there for the rest of the session.

use std::sync::Arc;

use brickwire_core::to_wire_text;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::LinkConfig;
use crate::error::LinkResult;
use crate::state::ConnectionState;
use crate::transport::{EventReceiver, HubTransport, PeerId, PeerMetadata, TransportEvent, WireMessage};

// ----------------------------------------------------------------------------
// Send Outcome
// ----------------------------------------------------------------------------

/// What happened to a message handed to [`ConnectionManager::send`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The transport acknowledged the message
    Sent,
    /// The link was not connected; nothing was transmitted
    Dropped,
    /// The transport rejected the message (logged)
    Failed,
}

// ----------------------------------------------------------------------------
// Connection Management
// ----------------------------------------------------------------------------

#[derive(Debug, Default)]
struct LinkStatus {
    state: ConnectionState,
    peer: Option<PeerId>,
}

/// Owns the scan/connect state machine for a single hub
pub struct ConnectionManager {
    transport: Arc<dyn HubTransport>,
    config: LinkConfig,
    status: RwLock<LinkStatus>,
    state_tx: watch::Sender<ConnectionState>,
}

impl ConnectionManager {
    /// Create a manager in `Disconnected`. Nothing is started.
    pub fn new(transport: Arc<dyn HubTransport>, config: LinkConfig) -> Arc<Self> {
        let (state_tx, _) = watch::channel(ConnectionState::default());
        Arc::new(Self {
            transport,
            config,
            status: RwLock::new(LinkStatus::default()),
            state_tx,
        })
    }

    /// Create a manager and start its event task.
    ///
    /// The task waits for the configured settling delay, requests a scan,
    /// then handles transport events until the sender side is dropped.
    pub fn spawn(
        transport: Arc<dyn HubTransport>,
        events: EventReceiver,
        config: LinkConfig,
    ) -> (Arc<Self>, JoinHandle<()>) {
        let manager = Self::new(transport, config);
        let task = tokio::spawn(Arc::clone(&manager).run(events));
        (manager, task)
    }

    /// Main task loop: initial scan, then events in delivery order
    pub async fn run(self: Arc<Self>, mut events: EventReceiver) {
        tokio::time::sleep(self.config.scan_settle_delay()).await;
        self.start_scan().await;

        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }

        info!("Transport event channel closed, link task ending");
    }

    /// Dispatch one transport event to its handler
    pub async fn handle_event(self: &Arc<Self>, event: TransportEvent) {
        match event {
            TransportEvent::PeerDiscovered { peer_id, metadata } => {
                self.on_peer_discovered(peer_id, metadata).await;
            }
            TransportEvent::MessageReceived { message } => {
                debug!("Message from hub ({}): {}", message.encoding.as_str(), message.message);
            }
            TransportEvent::LinkLost { reason } => {
                self.on_link_lost(&reason).await;
            }
        }
    }

    /// Request a scan. Only valid from `Disconnected`.
    ///
    /// Returns whether the link is now scanning. A rejected scan is logged
    /// and leaves the link `Disconnected`; it is not retried.
    pub async fn start_scan(&self) -> bool {
        {
            let status = self.status.read().await;
            if status.state != ConnectionState::Disconnected {
                debug!("Scan requested while {}, ignoring", status.state);
                return false;
            }
        }

        match self.transport.start_scan(&self.config.scan_filter).await {
            Ok(()) => {
                let mut status = self.status.write().await;
                if status.state != ConnectionState::Disconnected {
                    return false;
                }
                self.set_state(&mut status, ConnectionState::Scanning);
                info!("Scanning for hubs");
                true
            }
            Err(e) => {
                error!("Scan request failed: {}", e);
                false
            }
        }
    }

    /// Handle a discovered peer.
    ///
    /// Only the first discovery while `Scanning` starts a connect attempt;
    /// every other discovery is dropped. Returns whether an attempt started.
    pub async fn on_peer_discovered(self: &Arc<Self>, peer_id: PeerId, metadata: PeerMetadata) -> bool {
        {
            let mut status = self.status.write().await;
            if status.state != ConnectionState::Scanning {
                debug!("Ignoring discovery of {} while {}", peer_id, status.state);
                return false;
            }
            self.set_state(&mut status, ConnectionState::Connecting);
            status.peer = Some(peer_id.clone());
        }

        info!("Discovered hub {} {:?}, connecting", peer_id, metadata);

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let result = manager.transport.connect(&peer_id).await;
            manager.on_connect_result(&peer_id, result).await;
        });
        true
    }

    /// Apply the outcome of a connect attempt.
    ///
    /// Outcomes for a peer that is no longer the pending one are ignored.
    pub async fn on_connect_result(&self, peer_id: &PeerId, result: LinkResult<()>) {
        let mut status = self.status.write().await;
        if status.state != ConnectionState::Connecting || status.peer.as_ref() != Some(peer_id) {
            debug!("Stale connect result for {} while {}", peer_id, status.state);
            return;
        }

        match result {
            Ok(()) => {
                self.set_state(&mut status, ConnectionState::Connected);
                info!("Connected to hub {}", peer_id);
            }
            Err(e) => {
                self.set_state(&mut status, ConnectionState::Disconnected);
                status.peer = None;
                error!("Connection to hub {} failed: {}", peer_id, e);
            }
        }
    }

    /// The transport lost the link; fall back to `Disconnected`.
    pub async fn on_link_lost(&self, reason: &str) {
        let mut status = self.status.write().await;
        match status.state {
            ConnectionState::Connecting | ConnectionState::Connected => {
                warn!(
                    "Link to hub {} lost while {}: {}",
                    status.peer.as_ref().map(PeerId::as_str).unwrap_or("?"),
                    status.state,
                    reason
                );
                self.set_state(&mut status, ConnectionState::Disconnected);
                status.peer = None;
            }
            _ => debug!("Link lost reported while {}: {}", status.state, reason),
        }
    }

    /// Send raw frame bytes.
    ///
    /// Outside `Connected` this is a no-op that never touches the transport.
    pub async fn send(&self, bytes: &[u8]) -> SendOutcome {
        if !self.is_connected().await {
            debug!("Not connected, dropping {} byte frame", bytes.len());
            return SendOutcome::Dropped;
        }
        self.transmit(WireMessage::base64(to_wire_text(bytes))).await
    }

    /// Send already-encoded wire text, with the same gating as [`send`](Self::send)
    pub async fn send_message(&self, message: WireMessage) -> SendOutcome {
        if !self.is_connected().await {
            debug!("Not connected, dropping message");
            return SendOutcome::Dropped;
        }
        self.transmit(message).await
    }

    async fn transmit(&self, message: WireMessage) -> SendOutcome {
        match self.transport.send_message(message).await {
            Ok(()) => SendOutcome::Sent,
            Err(e) => {
                warn!("Send to hub failed: {}", e);
                SendOutcome::Failed
            }
        }
    }

    /// Record a transition and publish it to subscribers
    fn set_state(&self, status: &mut LinkStatus, state: ConnectionState) {
        status.state = state;
        self.state_tx.send_replace(state);
    }

    /// Watch state transitions.
    ///
    /// Fast transitions may coalesce: a receiver only sees the latest state.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Current connection state
    pub async fn state(&self) -> ConnectionState {
        self.status.read().await.state
    }

    pub async fn is_connected(&self) -> bool {
        self.state().await.is_connected()
    }

    /// Peer being connected to, or connected
    pub async fn peer(&self) -> Option<PeerId> {
        self.status.read().await.peer.clone()
    }
}
