//! Event dispatch
//!
//! [`Bridge`] owns the device state and the collaborators that touch the
//! outside world. Every radio event, timer tick and button change goes through
//! [`Bridge::handle`], one at a time, so the telemetry buffer, LED state and
//! cadence counters have exactly one writer and need no locking.
//!
//! Errors from the radio stack or timer are lower-layer contract violations:
//! they are logged and returned as [`BridgeError::Stack`] so the host can halt.
//! Malformed control writes are not errors here; they are answered with an
//! ATT status and otherwise ignored.

mod dispatch;
mod sampling;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, error, info, warn};
use thiserror_no_std::Error;

use crate::cadence::{CadenceController, TickAction, TickTimer};
use crate::command;
use crate::config::BridgeConfig;
use crate::events::{
    BridgeEvent, ButtonId, ButtonState, Characteristic, CharacteristicStatus, ClientConfig,
};
use crate::led::{LedActuator, LedState};
use crate::radio::{
    AdvertisingHandle, AdvertisingTiming, Connectability, ConnectionHandle, Discoverability,
    Radio, StackError, system_id,
};
use crate::sensors::{EnvironmentSensor, MotionSensor};
use crate::telemetry::{MotionTracker, TelemetryBuffer};

/// Events that can be queued before the dispatcher has to catch up.
pub const EVENT_QUEUE_CAPACITY: usize = 8;

/// Queue that radio callbacks, the tick timer and button interrupts post into.
pub type EventQueue = Channel<CriticalSectionRawMutex, BridgeEvent, EVENT_QUEUE_CAPACITY>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError {
    #[error("[E: 0x{code:04x}] Failed to {operation}")]
    Stack { operation: &'static str, code: u16 },
}

/// Map a stack status into a [`BridgeError`], logging it on the way.
fn check<T>(result: Result<T, StackError>, operation: &'static str) -> Result<T, BridgeError> {
    result.map_err(|StackError(code)| {
        error!("[E: 0x{:04x}] Failed to {}", code, operation);
        BridgeError::Stack { operation, code }
    })
}

/// Who is connected and who wants telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionContext {
    /// Connection most recently opened, if it is still up.
    pub open: Option<ConnectionHandle>,
    /// Connection with notifications enabled on RX.
    pub subscriber: Option<ConnectionHandle>,
}

impl ConnectionContext {
    pub fn notifications_enabled(&self) -> bool {
        self.subscriber.is_some()
    }
}

/// All mutable application state, owned by the dispatcher.
#[derive(Debug, Clone)]
pub struct DeviceState {
    pub telemetry: TelemetryBuffer,
    pub motion: MotionTracker,
    pub led: LedState,
    pub cadence: CadenceController,
    pub connection: ConnectionContext,
    pub advertising: Option<AdvertisingHandle>,
}

impl DeviceState {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            telemetry: TelemetryBuffer::new(),
            motion: MotionTracker::new(),
            led: LedState::with_color(config.default_color),
            cadence: CadenceController::new(config),
            connection: ConnectionContext::default(),
            advertising: None,
        }
    }
}

/// The collaborators the bridge drives.
pub struct Peripherals<M, E, L, R, T> {
    pub motion: M,
    pub environment: E,
    pub led: L,
    pub radio: R,
    pub timer: T,
}

pub struct Bridge<M, E, L, R, T> {
    config: BridgeConfig,
    hw: Peripherals<M, E, L, R, T>,
    state: DeviceState,
}

impl<M, E, L, R, T> Bridge<M, E, L, R, T>
where
    M: MotionSensor,
    E: EnvironmentSensor,
    L: LedActuator,
    R: Radio,
    T: TickTimer,
{
    pub fn new(config: BridgeConfig, hw: Peripherals<M, E, L, R, T>) -> Self {
        let state = DeviceState::new(&config);
        Self { config, hw, state }
    }

    /// Put the hardware into its start-up state. Call once before dispatching.
    pub fn init(&mut self) {
        info!(
            "Bridge starting: tick {}ms, refresh after {}/{} idle ticks",
            self.config.tick_interval_ms,
            self.config.motion_refresh_ticks,
            self.config.environment_refresh_ticks
        );
        self.hw.led.apply(&LedState::OFF);
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn peripherals(&self) -> &Peripherals<M, E, L, R, T> {
        &self.hw
    }

    pub fn peripherals_mut(&mut self) -> &mut Peripherals<M, E, L, R, T> {
        &mut self.hw
    }

    /// Dispatch events from `queue` until a stack error occurs.
    pub async fn run(&mut self, queue: &EventQueue) -> BridgeError {
        loop {
            let event = queue.receive().await;
            if let Err(e) = self.handle(event).await {
                return e;
            }
        }
    }

    /// Dispatch everything currently queued, returning how many events ran.
    pub async fn drain(&mut self, queue: &EventQueue) -> Result<usize, BridgeError> {
        let mut handled = 0;
        while let Ok(event) = queue.try_receive() {
            self.handle(event).await?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Handle one event to completion.
    pub async fn handle(&mut self, event: BridgeEvent) -> Result<(), BridgeError> {
        match event {
            BridgeEvent::Boot => self.on_boot(),
            BridgeEvent::ConnectionOpened { connection } => {
                info!("Connection {:?} opened", connection);
                self.state.connection.open = Some(connection);
                Ok(())
            }
            BridgeEvent::ConnectionClosed { connection } => self.on_connection_closed(connection),
            BridgeEvent::CharacteristicStatus {
                connection,
                characteristic,
                status,
            } => self.on_characteristic_status(connection, characteristic, status),
            BridgeEvent::ReadRequest {
                connection,
                characteristic,
            } => {
                if characteristic != Characteristic::Rx {
                    debug!("Read of {:?} not handled", characteristic);
                    return Ok(());
                }
                self.respond_to_read(connection).await
            }
            BridgeEvent::WriteRequest {
                connection,
                characteristic,
                value,
            } => self.on_write_request(connection, characteristic, &value),
            BridgeEvent::Button { button, state } => self.on_button(button, state),
            BridgeEvent::Tick => self.on_tick().await,
        }
    }

    fn on_boot(&mut self) -> Result<(), BridgeError> {
        let address = check(self.hw.radio.identity_address(), "get Bluetooth address")?;
        let id = system_id(&address);
        check(
            self.hw.radio.write_attribute(Characteristic::SystemId, &id),
            "write attribute",
        )?;

        let handle = check(
            self.hw.radio.create_advertising_set(),
            "create advertising set",
        )?;
        self.state.advertising = Some(handle);

        let timing = AdvertisingTiming::fixed_interval_ms(self.config.advertising_interval_ms);
        check(
            self.hw.radio.set_advertising_timing(handle, timing),
            "set advertising timing",
        )?;

        self.start_advertising()?;
        info!("Boot complete, advertising with System ID {:02x?}", id);
        Ok(())
    }

    fn start_advertising(&mut self) -> Result<(), BridgeError> {
        let Some(handle) = self.state.advertising else {
            warn!("No advertising set yet, not advertising");
            return Ok(());
        };
        check(
            self.hw.radio.start_advertising(
                handle,
                Discoverability::General,
                Connectability::ConnectableScannable,
            ),
            "start advertising",
        )
    }

    fn on_connection_closed(&mut self, connection: ConnectionHandle) -> Result<(), BridgeError> {
        info!("Connection {:?} closed, streaming stopped", connection);
        self.state.cadence.stop();
        self.state.connection = ConnectionContext::default();
        check(self.hw.timer.stop(), "stop periodic timer")?;

        // Restart advertising after the client has disconnected.
        self.start_advertising()
    }

    fn on_characteristic_status(
        &mut self,
        connection: ConnectionHandle,
        characteristic: Characteristic,
        status: CharacteristicStatus,
    ) -> Result<(), BridgeError> {
        let CharacteristicStatus::ClientConfig(config) = status else {
            return Ok(());
        };
        if characteristic != Characteristic::Rx {
            debug!("Client config {:?} on {:?} ignored", config, characteristic);
            return Ok(());
        }

        if config.is_enabled() {
            self.enable_streaming(connection, config)
        } else {
            self.disable_streaming(connection)
        }
    }

    fn enable_streaming(
        &mut self,
        connection: ConnectionHandle,
        config: ClientConfig,
    ) -> Result<(), BridgeError> {
        info!("RX {:?} enabled by {:?}", config, connection);
        self.state.connection.subscriber = Some(connection);
        self.notify()?;

        self.state.cadence.start();
        check(
            self.hw.timer.start(self.config.tick_interval()),
            "start periodic timer",
        )
    }

    fn disable_streaming(&mut self, connection: ConnectionHandle) -> Result<(), BridgeError> {
        info!("RX notifications disabled by {:?}", connection);
        self.state.connection.subscriber = None;
        self.state.cadence.stop();
        check(self.hw.timer.stop(), "stop periodic timer")
    }

    fn on_write_request(
        &mut self,
        connection: ConnectionHandle,
        characteristic: Characteristic,
        value: &[u8],
    ) -> Result<(), BridgeError> {
        if characteristic != Characteristic::Tx {
            debug!("Write to {:?} not handled", characteristic);
            return Ok(());
        }

        debug!("Write, {} {:02x?}", value.len(), value);
        let att_error = command::handle_write(value, &mut self.state.led);
        if att_error != 0 {
            warn!("Rejected control write of {} bytes: 0x{:02x}", value.len(), att_error);
        }

        check(
            self.hw.radio.send_write_response(connection, characteristic, att_error),
            "send user write response",
        )?;

        if att_error == 0 {
            self.hw.led.apply(&self.state.led);
        }
        Ok(())
    }

    fn on_button(&mut self, button: ButtonId, state: ButtonState) -> Result<(), BridgeError> {
        debug!("{:?} {:?}", button, state);
        self.state.telemetry.write_button(button, state.is_pressed());
        self.notify()?;
        Ok(())
    }

    async fn on_tick(&mut self) -> Result<(), BridgeError> {
        if !self.state.cadence.is_streaming() {
            debug!("Tick while idle dropped");
            return Ok(());
        }

        let changed = self.update_motion().await;
        match self.state.cadence.on_tick(changed) {
            TickAction::Notify => {
                self.update_environment().await;
                self.notify()?;
                Ok(())
            }
            TickAction::Skip | TickAction::Ignore => Ok(()),
        }
    }
}
