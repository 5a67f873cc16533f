//! Notification dispatcher

use log::{debug, trace};

use super::{Bridge, BridgeError, check};
use crate::cadence::TickTimer;
use crate::events::Characteristic;
use crate::led::LedActuator;
use crate::radio::{ConnectionHandle, Radio};
use crate::sensors::{EnvironmentSensor, MotionSensor};

impl<M, E, L, R, T> Bridge<M, E, L, R, T>
where
    M: MotionSensor,
    E: EnvironmentSensor,
    L: LedActuator,
    R: Radio,
    T: TickTimer,
{
    /// Push the full telemetry buffer to the subscribed peer.
    ///
    /// Without a subscriber this is a no-op and returns `Ok(false)`.
    pub fn notify(&mut self) -> Result<bool, BridgeError> {
        let Some(connection) = self.state.connection.subscriber else {
            debug!("No subscriber, notification dropped");
            return Ok(false);
        };

        let bytes = self.state.telemetry.as_bytes();
        trace!("Notify {:?} {:02x?}", connection, bytes);
        check(
            self.hw
                .radio
                .send_notification(connection, Characteristic::Rx, bytes),
            "send characteristic notification",
        )?;
        Ok(true)
    }

    /// Answer a read of the telemetry characteristic.
    ///
    /// The motion fields are refreshed first whether or not they moved, so a
    /// polling client always gets the current acceleration.
    pub async fn respond_to_read(&mut self, connection: ConnectionHandle) -> Result<(), BridgeError> {
        self.update_motion().await;

        check(
            self.hw.radio.send_read_response(
                connection,
                Characteristic::Rx,
                self.state.telemetry.as_bytes(),
            ),
            "send user read response",
        )
    }
}
