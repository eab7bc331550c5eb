//! In-memory transport for tests and simulation
//!
//! Records every capability call, can be scripted to reject scans or
//! connects, and injects transport events on demand. With a simulated hub
//! configured, a successful scan immediately reports that hub as
//! discovered.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;
use tracing::debug;

use crate::config::ScanFilter;
use crate::error::{LinkError, LinkResult};
use crate::transport::{EventSender, HubTransport, PeerId, TransportEvent, WireMessage};

/// How the loopback answers connect requests
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectBehavior {
    #[default]
    Accept,
    Reject(String),
    /// Stay pending until [`LoopbackTransport::release_connect`]
    Hold,
}

/// Scriptable in-memory [`HubTransport`]
pub struct LoopbackTransport {
    events: EventSender,
    simulated_hub: Option<PeerId>,
    scan_error: Option<String>,
    connect_behavior: Mutex<ConnectBehavior>,
    send_fails: AtomicBool,
    release: Notify,
    scan_calls: AtomicUsize,
    connect_calls: AtomicUsize,
    send_calls: AtomicUsize,
    sent: Mutex<Vec<WireMessage>>,
}

impl LoopbackTransport {
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            simulated_hub: None,
            scan_error: None,
            connect_behavior: Mutex::new(ConnectBehavior::Accept),
            send_fails: AtomicBool::new(false),
            release: Notify::new(),
            scan_calls: AtomicUsize::new(0),
            connect_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Announce `peer_id` as discovered whenever a scan starts
    pub fn with_simulated_hub(mut self, peer_id: impl Into<PeerId>) -> Self {
        self.simulated_hub = Some(peer_id.into());
        self
    }

    /// Reject every scan request with `reason`
    pub fn with_scan_error(mut self, reason: impl Into<String>) -> Self {
        self.scan_error = Some(reason.into());
        self
    }

    pub fn with_connect_behavior(self, behavior: ConnectBehavior) -> Self {
        self.set_connect_behavior(behavior);
        self
    }

    pub fn set_connect_behavior(&self, behavior: ConnectBehavior) {
        if let Ok(mut current) = self.connect_behavior.lock() {
            *current = behavior;
        }
    }

    /// Make subsequent sends fail
    pub fn set_send_fails(&self, fails: bool) {
        self.send_fails.store(fails, Ordering::SeqCst);
    }

    /// Let one held connect complete successfully
    pub fn release_connect(&self) {
        self.release.notify_one();
    }

    /// Inject a discovery event
    pub fn discover(&self, peer_id: impl Into<PeerId>) -> LinkResult<()> {
        self.emit(TransportEvent::PeerDiscovered {
            peer_id: peer_id.into(),
            metadata: HashMap::new(),
        })
    }

    /// Inject an arbitrary event
    pub fn emit(&self, event: TransportEvent) -> LinkResult<()> {
        self.events.send(event).map_err(|_| LinkError::ChannelClosed)
    }

    pub fn scan_calls(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    /// Every invocation of the send capability, accepted or not
    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    /// Messages accepted so far, in order
    pub fn sent_messages(&self) -> Vec<WireMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    fn connect_behavior(&self) -> ConnectBehavior {
        self.connect_behavior
            .lock()
            .map(|behavior| behavior.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl HubTransport for LoopbackTransport {
    async fn start_scan(&self, filter: &ScanFilter) -> LinkResult<()> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        debug!(
            "Loopback scan (major {}, minor {})",
            filter.major_device_class, filter.minor_device_class
        );

        if let Some(reason) = &self.scan_error {
            return Err(LinkError::ScanFailed(reason.clone()));
        }
        if let Some(hub) = &self.simulated_hub {
            self.discover(hub.clone())?;
        }
        Ok(())
    }

    async fn connect(&self, peer_id: &PeerId) -> LinkResult<()> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);

        match self.connect_behavior() {
            ConnectBehavior::Accept => Ok(()),
            ConnectBehavior::Reject(reason) => Err(LinkError::ConnectFailed {
                peer_id: peer_id.to_string(),
                reason,
            }),
            ConnectBehavior::Hold => {
                self.release.notified().await;
                Ok(())
            }
        }
    }

    async fn send_message(&self, message: WireMessage) -> LinkResult<()> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        if self.send_fails.load(Ordering::SeqCst) {
            return Err(LinkError::SendFailed("loopback configured to fail".into()));
        }
        debug!("Loopback send: {}", message.message);
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message);
        }
        Ok(())
    }
}
