//! Motor and sound commands exposed to the programming front end
//!
//! Every command is safe to issue at any time: while the link is not
//! connected it completes immediately and transmits nothing.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use brickwire_core::{build_frame, encode_motor_run, MotorPort, BEEP_FRAME_BASE64, OP_OUTPUT_TIME_SPEED};
use tokio::time::Instant;
use tracing::{debug, error};

use crate::config::LinkConfig;
use crate::connection::{ConnectionManager, SendOutcome};
use crate::transport::WireMessage;

/// Frames carry no reply correlation
const SESSION_COUNTER: u8 = 0;

/// Rotation sense of a turn command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Clockwise,
    CounterClockwise,
}

impl TurnDirection {
    fn apply(self, speed: i32) -> i32 {
        match self {
            TurnDirection::Clockwise => speed,
            TurnDirection::CounterClockwise => -speed,
        }
    }
}

// ----------------------------------------------------------------------------
// Dispatcher
// ----------------------------------------------------------------------------

/// Issues hub commands through a shared [`ConnectionManager`]
pub struct HubDispatcher {
    link: Arc<ConnectionManager>,
    speed: AtomicI32,
    ramp_ms: u32,
}

impl HubDispatcher {
    pub fn new(link: Arc<ConnectionManager>, config: &LinkConfig) -> Self {
        Self {
            link,
            speed: AtomicI32::new(config.default_speed),
            ramp_ms: config.ramp_ms,
        }
    }

    /// Speed used by subsequent turns, clamped to 0..=100
    pub fn set_speed(&self, speed: i32) {
        self.speed.store(speed.clamp(0, 100), Ordering::Relaxed);
    }

    pub fn speed(&self) -> i32 {
        self.speed.load(Ordering::Relaxed)
    }

    /// Run the motor on `port` clockwise for `seconds`
    pub async fn turn_clockwise(&self, port: MotorPort, seconds: f64) -> SendOutcome {
        self.turn(port, seconds, TurnDirection::Clockwise).await
    }

    /// Run the motor on `port` counter-clockwise for `seconds`
    pub async fn turn_counter_clockwise(&self, port: MotorPort, seconds: f64) -> SendOutcome {
        self.turn(port, seconds, TurnDirection::CounterClockwise).await
    }

    /// Send a timed motor run and complete once its duration has elapsed.
    ///
    /// The wait is not cut short if the link drops mid-run.
    pub async fn turn(&self, port: MotorPort, seconds: f64, direction: TurnDirection) -> SendOutcome {
        if !self.link.is_connected().await {
            return SendOutcome::Dropped;
        }

        let duration_ms = (seconds * 1000.0) as i64;
        let deadline = Instant::now() + Duration::from_millis(duration_ms.max(0) as u64);

        let speed = direction.apply(self.speed());
        let instruction = encode_motor_run(OP_OUTPUT_TIME_SPEED, port, duration_ms, speed, self.ramp_ms);
        let frame = match build_frame(SESSION_COUNTER, &instruction) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to frame motor command: {}", e);
                return SendOutcome::Failed;
            }
        };

        debug!("Turning {} {:?} for {}ms: {}", port, direction, duration_ms, frame);
        let outcome = self.link.send(frame.as_bytes()).await;

        tokio::time::sleep_until(deadline).await;
        outcome
    }

    /// Play the fixed beep tone; completes once the send is acknowledged
    pub async fn beep(&self) -> SendOutcome {
        if !self.link.is_connected().await {
            return SendOutcome::Dropped;
        }
        self.link
            .send_message(WireMessage::base64(BEEP_FRAME_BASE64))
            .await
    }
}
