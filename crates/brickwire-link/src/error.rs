//! Error types for the hub link

use thiserror::Error;

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Failures reported by the transport capabilities.
///
/// These are observed and logged by the connection manager; none of them
/// reaches a dispatcher caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("Failed to start scan: {0}")]
    ScanFailed(String),

    #[error("Failed to connect to peer {peer_id}: {reason}")]
    ConnectFailed { peer_id: String, reason: String },

    #[error("Failed to send message: {0}")]
    SendFailed(String),

    #[error("Event channel closed")]
    ChannelClosed,
}

/// Result type for link operations
pub type LinkResult<T> = std::result::Result<T, LinkError>;
