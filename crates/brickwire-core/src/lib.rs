//! Brickwire Core Protocol Implementation
//!
//! This crate provides the byte-level pieces of the EV3 hub command protocol:
//! motor-run instruction encoding, length-prefixed framing, and the base64
//! text codec used by the link's message-send capability. Everything here is
//! pure and synchronous; connection handling lives in `brickwire-link`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod errors;
pub mod protocol;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use errors::HubError;
pub use protocol::command::{encode_motor_run, encode_run_length, Instruction};
pub use protocol::frame::{build_frame, Frame, FRAME_HEADER_SIZE};
pub use protocol::wire::{from_wire_text, to_wire_text, WireEncoding};
pub use protocol::{BEEP_FRAME_BASE64, OP_OUTPUT_TIME_SPEED};
pub use types::{MotionRequest, MotorPort, RampProfile};

/// Result type for hub protocol operations
pub type Result<T> = core::result::Result<T, HubError>;
