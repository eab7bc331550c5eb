//! Core types for hub motion commands

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::HubError;

// ----------------------------------------------------------------------------
// Motor Ports
// ----------------------------------------------------------------------------

/// Output port on the hub
///
/// The discriminant is the bit-flag the hub expects in the port operand.
/// Ports are never combined by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MotorPort {
    A = 0x01,
    B = 0x02,
    C = 0x04,
    D = 0x08,
}

impl MotorPort {
    /// All ports in menu order
    pub const ALL: [MotorPort; 4] = [MotorPort::A, MotorPort::B, MotorPort::C, MotorPort::D];

    /// Bit-flag used on the wire
    pub const fn flag(self) -> u8 {
        self as u8
    }

    /// Port letter
    pub const fn letter(self) -> char {
        match self {
            MotorPort::A => 'A',
            MotorPort::B => 'B',
            MotorPort::C => 'C',
            MotorPort::D => 'D',
        }
    }
}

impl fmt::Display for MotorPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for MotorPort {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(MotorPort::A),
            "B" => Ok(MotorPort::B),
            "C" => Ok(MotorPort::C),
            "D" => Ok(MotorPort::D),
            _ => Err(HubError::unknown_port(s)),
        }
    }
}

// ----------------------------------------------------------------------------
// Motion Request
// ----------------------------------------------------------------------------

/// A timed motor rotation on a single port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionRequest {
    pub port: MotorPort,
    /// Speed in percent, typically -100..=100
    pub signed_speed: i32,
    /// Run length in milliseconds; a negative value reverses direction
    pub duration_ms: i64,
}

impl MotionRequest {
    pub fn new(port: MotorPort, signed_speed: i32, duration_ms: i64) -> Self {
        Self {
            port,
            signed_speed,
            duration_ms,
        }
    }

    /// Normalize into `(speed magnitude, net direction is reverse, |duration|)`.
    ///
    /// A negative speed is folded into the duration so that a single
    /// direction flag captures both signs.
    pub fn normalized(&self) -> (u32, bool, u64) {
        let (speed, duration) = if self.signed_speed < 0 {
            (-(self.signed_speed as i64), self.duration_ms.saturating_neg())
        } else {
            (self.signed_speed as i64, self.duration_ms)
        };
        (speed as u32, duration < 0, duration.unsigned_abs())
    }

    /// Signed-magnitude direction byte: `256 - speed` in reverse, else `speed`
    pub fn direction_byte(&self) -> u8 {
        let (speed, reverse, _) = self.normalized();
        if reverse {
            (0x100u32.wrapping_sub(speed)) as u8
        } else {
            speed as u8
        }
    }
}

// ----------------------------------------------------------------------------
// Ramp Profile
// ----------------------------------------------------------------------------

/// Split of a motor run into ramp-up, steady plateau and ramp-down (ms)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RampProfile {
    pub ramp_up: u64,
    pub steady_run: u64,
    pub ramp_down: u64,
}

impl RampProfile {
    /// Split `total` ms of running around a configured `ramp` length.
    ///
    /// Runs shorter than two ramps have no plateau: the run is split
    /// between ramp-up and ramp-down, with the odd millisecond going down.
    pub fn split(total: u64, ramp: u64) -> Self {
        match ramp.checked_mul(2) {
            Some(both) if total >= both => Self {
                ramp_up: ramp,
                steady_run: total - both,
                ramp_down: ramp,
            },
            _ => {
                let ramp_up = total / 2;
                Self {
                    ramp_up,
                    steady_run: 0,
                    ramp_down: total - ramp_up,
                }
            }
        }
    }

    /// Total run length covered by the profile
    pub fn total(&self) -> u64 {
        self.ramp_up + self.steady_run + self.ramp_down
    }
}
