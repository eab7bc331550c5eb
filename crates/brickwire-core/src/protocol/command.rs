//! Motor-run instruction encoding

use core::fmt;

use smallvec::SmallVec;

use super::{BRAKE, LAYER_LOCAL, PARAM_BYTE, PARAM_LONG, PARAM_SHORT, SHORT_RUN_LIMIT};
use crate::types::{MotionRequest, MotorPort, RampProfile};

// ----------------------------------------------------------------------------
// Instruction
// ----------------------------------------------------------------------------

/// Encoded hub instruction (unframed)
///
/// A motor run is at most 15 bytes, so the inline buffer never spills.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Instruction(SmallVec<[u8; 16]>);

impl Instruction {
    /// Wrap raw instruction bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(SmallVec::from_slice(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Leading opcode byte, if any
    pub fn opcode(&self) -> Option<u8> {
        self.0.first().copied()
    }
}

impl AsRef<[u8]> for Instruction {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

// ----------------------------------------------------------------------------
// Encoding
// ----------------------------------------------------------------------------

/// Encode a run length with the narrowest operand that holds it.
///
/// Values wider than 32 bits are truncated to their low four bytes.
pub fn encode_run_length(run: u64) -> SmallVec<[u8; 5]> {
    let mut out = SmallVec::new();
    if run < SHORT_RUN_LIMIT {
        out.push(PARAM_SHORT);
        out.extend_from_slice(&(run as u16).to_le_bytes());
    } else {
        out.push(PARAM_LONG);
        out.extend_from_slice(&(run as u32).to_le_bytes());
    }
    out
}

/// Encode a timed motor run.
///
/// Speed and duration signs are folded into one direction byte; the
/// absolute duration is split into a [`RampProfile`] around `ramp_ms`.
/// Arguments are not range-checked: speeds outside -100..=100 or ramps
/// over 255 ms produce a frame the hub will misread.
pub fn encode_motor_run(
    opcode: u8,
    port: MotorPort,
    duration_ms: i64,
    signed_speed: i32,
    ramp_ms: u32,
) -> Instruction {
    let request = MotionRequest::new(port, signed_speed, duration_ms);
    encode_request(opcode, &request, ramp_ms)
}

/// Encode a [`MotionRequest`]
pub fn encode_request(opcode: u8, request: &MotionRequest, ramp_ms: u32) -> Instruction {
    let (_, _, magnitude) = request.normalized();
    let profile = RampProfile::split(magnitude, u64::from(ramp_ms));

    let mut bytes = SmallVec::<[u8; 16]>::new();
    bytes.extend_from_slice(&[
        opcode,
        LAYER_LOCAL,
        request.port.flag(),
        PARAM_BYTE,
        request.direction_byte(),
        PARAM_BYTE,
        profile.ramp_up as u8,
    ]);
    bytes.extend_from_slice(&encode_run_length(profile.steady_run));
    bytes.extend_from_slice(&[PARAM_BYTE, profile.ramp_down as u8, BRAKE]);

    Instruction(bytes)
}
