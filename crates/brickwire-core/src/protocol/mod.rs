//! Hub wire protocol
//!
//! Byte layout of a motor-run frame, little-endian throughout:
//!
//! ```text
//! Frame       := lenLo lenHi 0x01 0x00 0x00 addr 0x00 Instruction
//! Instruction := opcode 0x00 port 0x81 dir 0x81 rampUp runLen 0x81 rampDown 0x01
//! runLen      := 0x82 lo hi            (run < 0x7FFF)
//!              | 0x83 b0 b1 b2 b3
//! ```

pub mod command;
pub mod frame;
pub mod wire;

// ----------------------------------------------------------------------------
// Opcodes and Operand Markers
// ----------------------------------------------------------------------------

/// Timed single-motor speed command
pub const OP_OUTPUT_TIME_SPEED: u8 = 0xAF;

/// Device layer operand; this crate only addresses the local brick
pub const LAYER_LOCAL: u8 = 0x00;

/// Marker: one-byte operand follows
pub const PARAM_BYTE: u8 = 0x81;

/// Marker: two-byte little-endian operand follows
pub const PARAM_SHORT: u8 = 0x82;

/// Marker: four-byte little-endian operand follows
pub const PARAM_LONG: u8 = 0x83;

/// Stop the motor with the brake applied once the run completes
pub const BRAKE: u8 = 0x01;

/// Runs at or above this length need the four-byte operand form
pub const SHORT_RUN_LIMIT: u64 = 0x7FFF;

// ----------------------------------------------------------------------------
// Fixed Frames
// ----------------------------------------------------------------------------

/// Pre-built beep frame: a 1000 Hz tone for 1000 ms at volume 2.
///
/// Sent verbatim; it is not produced by the instruction encoder.
pub const BEEP_FRAME_BASE64: &str = "DwAAAIAAAJQBgQKC6AOC6AM=";
