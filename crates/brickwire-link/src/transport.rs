//! Transport capabilities consumed by the hub link
//!
//! The radio layer (discovery, pairing, raw socket send) lives outside this
//! crate. It is reached through [`HubTransport`] and reports back through
//! [`TransportEvent`]s on an unbounded channel, which the connection manager
//! drains in delivery order.

use core::fmt;
use std::collections::HashMap;

use async_trait::async_trait;
use brickwire_core::WireEncoding;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::config::ScanFilter;
use crate::error::LinkResult;

// ----------------------------------------------------------------------------
// Peer Identity
// ----------------------------------------------------------------------------

/// Transport-assigned identifier of a discovered hub
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Extra discovery details reported by the transport (name, RSSI, ...)
pub type PeerMetadata = HashMap<String, String>;

// ----------------------------------------------------------------------------
// Wire Message
// ----------------------------------------------------------------------------

/// Text payload handed to the send capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub message: String,
    pub encoding: WireEncoding,
}

impl WireMessage {
    /// Wrap base64 wire text
    pub fn base64(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            encoding: WireEncoding::Base64,
        }
    }
}

// ----------------------------------------------------------------------------
// Transport Trait
// ----------------------------------------------------------------------------

/// Capabilities the hub link needs from the radio layer
#[async_trait]
pub trait HubTransport: Send + Sync {
    /// Begin scanning for devices matching `filter`
    async fn start_scan(&self, filter: &ScanFilter) -> LinkResult<()>;

    /// Connect to a discovered peer; resolves on acknowledgment
    async fn connect(&self, peer_id: &PeerId) -> LinkResult<()>;

    /// Transmit one text message to the connected peer
    async fn send_message(&self, message: WireMessage) -> LinkResult<()>;
}

// ----------------------------------------------------------------------------
// Transport Events
// ----------------------------------------------------------------------------

/// Inbound notifications from the radio layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A candidate hub was observed while scanning
    PeerDiscovered {
        peer_id: PeerId,
        metadata: PeerMetadata,
    },
    /// The hub sent data back
    MessageReceived { message: WireMessage },
    /// The established link went away
    LinkLost { reason: String },
}

pub type EventSender = mpsc::UnboundedSender<TransportEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<TransportEvent>;

/// Create the channel a transport uses to report events to the link
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
