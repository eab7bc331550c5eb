//! Length-prefixed transport frames

use core::fmt;

use super::command::Instruction;
use crate::{HubError, Result};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Bytes preceding the instruction: length (2) plus the five header bytes
pub const FRAME_HEADER_SIZE: usize = 7;

/// Header bytes counted by the length field, before the instruction
const COUNTED_HEADER_SIZE: usize = 5;

/// Fixed sequence marker
const SEQUENCE_MARKER: u8 = 0x01;

// ----------------------------------------------------------------------------
// Frame
// ----------------------------------------------------------------------------

/// A framed instruction ready for the wire codec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(Vec<u8>);

impl Frame {
    /// Frame raw bytes that were produced elsewhere (e.g. a decoded literal).
    ///
    /// The length field must agree with the body.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FRAME_HEADER_SIZE {
            return Err(HubError::FrameTooShort {
                len: bytes.len(),
                min: FRAME_HEADER_SIZE,
            });
        }

        let declared = u16::from_le_bytes([bytes[0], bytes[1]]) as usize;
        let actual = bytes.len() - 2;
        if declared != actual {
            return Err(HubError::LengthMismatch { declared, actual });
        }

        Ok(Self(bytes.to_vec()))
    }

    /// Value of the little-endian length field
    pub fn declared_len(&self) -> u16 {
        u16::from_le_bytes([self.0[0], self.0[1]])
    }

    /// Addressing byte of the header
    pub fn address(&self) -> u8 {
        self.0[5]
    }

    /// The five header bytes after the length field
    pub fn header(&self) -> &[u8] {
        &self.0[2..FRAME_HEADER_SIZE]
    }

    /// Instruction bytes carried by the frame
    pub fn instruction(&self) -> &[u8] {
        &self.0[FRAME_HEADER_SIZE..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

// ----------------------------------------------------------------------------
// Frame Builder
// ----------------------------------------------------------------------------

/// Wrap an instruction in a transport frame.
///
/// `session_counter` fills the addressing byte. Callers that do not
/// correlate replies pass 0.
pub fn build_frame(session_counter: u8, instruction: &Instruction) -> Result<Frame> {
    let len = instruction.len() + COUNTED_HEADER_SIZE;
    let len = u16::try_from(len).map_err(|_| HubError::InstructionTooLarge {
        size: instruction.len(),
    })?;
    let [len_lo, len_hi] = len.to_le_bytes();

    let mut bytes = Vec::with_capacity(FRAME_HEADER_SIZE + instruction.len());
    bytes.extend_from_slice(&[
        len_lo,
        len_hi,
        SEQUENCE_MARKER,
        0x00,
        0x00,
        session_counter,
        0x00,
    ]);
    bytes.extend_from_slice(instruction.as_bytes());

    Ok(Frame(bytes))
}
