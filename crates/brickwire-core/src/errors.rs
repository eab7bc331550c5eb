//! Error types for the hub protocol
//!
//! The encoder itself never fails: out-of-domain arguments are a caller
//! precondition. Errors here come from parsing caller-supplied text (ports)
//! and from decoding frames that arrive back over the wire.

use thiserror::Error;

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Core error type for the hub protocol
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    #[error("Unknown motor port: {0}")]
    UnknownPort(String),

    #[error("Frame too short: {len} bytes (need at least {min})")]
    FrameTooShort { len: usize, min: usize },

    #[error("Frame length mismatch: header says {declared}, body has {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("Instruction too large for a frame: {size} bytes")]
    InstructionTooLarge { size: usize },

    #[error("Invalid wire text: {0}")]
    Decode(#[from] base64::DecodeError),
}

impl HubError {
    /// Create an unknown-port error from any displayable input
    pub fn unknown_port(port: impl core::fmt::Display) -> Self {
        Self::UnknownPort(port.to_string())
    }
}
