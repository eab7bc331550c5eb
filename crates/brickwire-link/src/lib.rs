//! Hub link lifecycle and command dispatch
//!
//! This crate drives an EV3 hub over an injected wireless transport. It owns
//! the scan → connect → send state machine and exposes the motor commands
//! that a visual-programming front end calls.
//!
//! ## Architecture
//!
//! - [`config`] - Link configuration and defaults
//! - [`error`] - Error types for transport capabilities
//! - [`transport`] - The injected transport capabilities and inbound events
//! - [`state`] - Connection state
//! - [`connection`] - Connection manager (state machine and gated send)
//! - [`dispatcher`] - Public motor and beep commands
//! - [`loopback`] - In-memory transport for tests and simulation
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use brickwire_core::MotorPort;
//! use brickwire_link::{event_channel, ConnectionManager, HubDispatcher, LinkConfig, LoopbackTransport};
//!
//! # async fn example() {
//! let (event_tx, event_rx) = event_channel();
//! let transport = Arc::new(LoopbackTransport::new(event_tx).with_simulated_hub("hub-1"));
//! let config = LinkConfig::default();
//!
//! let (link, _task) = ConnectionManager::spawn(transport, event_rx, config.clone());
//! let dispatcher = HubDispatcher::new(link, &config);
//!
//! // No-op until the link reports connected
//! dispatcher.turn_clockwise(MotorPort::A, 1.0).await;
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod loopback;
pub mod state;
pub mod transport;

// Public API exports
pub use config::{LinkConfig, ScanFilter};
pub use connection::{ConnectionManager, SendOutcome};
pub use dispatcher::{HubDispatcher, TurnDirection};
pub use error::{LinkError, LinkResult};
pub use loopback::{ConnectBehavior, LoopbackTransport};
pub use state::ConnectionState;
pub use transport::{
    event_channel, EventReceiver, EventSender, HubTransport, PeerId, PeerMetadata,
    TransportEvent, WireMessage,
};
