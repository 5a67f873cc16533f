use log::warn;

use super::Bridge;
use crate::cadence::TickTimer;
use crate::led::LedActuator;
use crate::radio::Radio;
use crate::sensors::{EnvironmentSensor, MotionSensor};
use crate::telemetry::encode_environment;

impl<M, E, L, R, T> Bridge<M, E, L, R, T>
where
    M: MotionSensor,
    E: EnvironmentSensor,
    L: LedActuator,
    R: Radio,
    T: TickTimer,
{
    /// Sample the IMU into the telemetry buffer.
    ///
    /// Returns whether the quantized acceleration changed. A failed read
    /// leaves the buffer alone and counts as no change.
    pub async fn update_motion(&mut self) -> bool {
        match self.hw.motion.read().await {
            Ok(sample) => self.state.motion.apply(&sample, &mut self.state.telemetry),
            Err(e) => {
                warn!("Motion sample skipped: {}", e);
                false
            }
        }
    }

    /// Sample humidity and temperature into the telemetry buffer.
    pub async fn update_environment(&mut self) {
        match self.hw.environment.read().await {
            Ok(sample) => encode_environment(&sample, &mut self.state.telemetry),
            Err(e) => warn!("Environment sample skipped: {}", e),
        }
    }
}
