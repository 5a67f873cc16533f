//! Recording collaborators for bridge tests

use alloc::vec::Vec;

use embassy_time::Duration;

use crate::bridge::{Bridge, Peripherals};
use crate::cadence::TickTimer;
use crate::config::BridgeConfig;
use crate::events::Characteristic;
use crate::led::{LedActuator, LedState};
use crate::radio::{
    AdvertisingHandle, AdvertisingTiming, BdAddr, Connectability, ConnectionHandle,
    Discoverability, Radio, StackError,
};
use crate::sensors::{
    EnvironmentSample, EnvironmentSensor, MotionSample, MotionSensor, SensorError,
};

pub type TestBridge = Bridge<MockMotion, MockEnvironment, MockLed, MockRadio, MockTimer>;

pub fn test_bridge() -> TestBridge {
    Bridge::new(
        BridgeConfig::default(),
        Peripherals {
            motion: MockMotion::default(),
            environment: MockEnvironment::default(),
            led: MockLed::default(),
            radio: MockRadio::default(),
            timer: MockTimer::default(),
        },
    )
}

/// IMU returning `sample` on every read; `None` simulates a failed read.
pub struct MockMotion {
    pub sample: Option<MotionSample>,
    pub reads: usize,
}

impl Default for MockMotion {
    fn default() -> Self {
        Self {
            sample: Some(MotionSample::default()),
            reads: 0,
        }
    }
}

impl MockMotion {
    pub fn set_accel(&mut self, x: i16, y: i16) {
        self.sample = Some(MotionSample {
            orientation: [0; 3],
            acceleration: [x, y, 1000],
        });
    }
}

impl MotionSensor for MockMotion {
    async fn read(&mut self) -> Result<MotionSample, SensorError> {
        self.reads += 1;
        self.sample.ok_or(SensorError::Unavailable { sensor: "IMU" })
    }
}

#[derive(Default)]
pub struct MockEnvironment {
    pub sample: Option<EnvironmentSample>,
    pub reads: usize,
}

impl EnvironmentSensor for MockEnvironment {
    async fn read(&mut self) -> Result<EnvironmentSample, SensorError> {
        self.reads += 1;
        self.sample.ok_or(SensorError::Unavailable { sensor: "RHT" })
    }
}

#[derive(Default)]
pub struct MockLed {
    pub applied: Vec<LedState>,
}

impl LedActuator for MockLed {
    fn apply(&mut self, state: &LedState) {
        self.applied.push(*state);
    }
}

/// Radio that records every command. `fail_with` makes every call fail.
pub struct MockRadio {
    pub address: BdAddr,
    pub fail_with: Option<u16>,
    pub attributes: Vec<(Characteristic, Vec<u8>)>,
    pub timing: Option<AdvertisingTiming>,
    pub advertising_starts: usize,
    pub notifications: Vec<(ConnectionHandle, Vec<u8>)>,
    pub read_responses: Vec<(ConnectionHandle, Vec<u8>)>,
    pub write_responses: Vec<(ConnectionHandle, Characteristic, u8)>,
}

impl Default for MockRadio {
    fn default() -> Self {
        Self {
            address: BdAddr([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]),
            fail_with: None,
            attributes: Vec::new(),
            timing: None,
            advertising_starts: 0,
            notifications: Vec::new(),
            read_responses: Vec::new(),
            write_responses: Vec::new(),
        }
    }
}

impl MockRadio {
    fn status(&self) -> Result<(), StackError> {
        match self.fail_with {
            Some(code) => Err(StackError(code)),
            None => Ok(()),
        }
    }
}

impl Radio for MockRadio {
    fn identity_address(&mut self) -> Result<BdAddr, StackError> {
        self.status()?;
        Ok(self.address)
    }

    fn write_attribute(
        &mut self,
        characteristic: Characteristic,
        value: &[u8],
    ) -> Result<(), StackError> {
        self.status()?;
        self.attributes.push((characteristic, value.to_vec()));
        Ok(())
    }

    fn create_advertising_set(&mut self) -> Result<AdvertisingHandle, StackError> {
        self.status()?;
        Ok(AdvertisingHandle(0))
    }

    fn set_advertising_timing(
        &mut self,
        _handle: AdvertisingHandle,
        timing: AdvertisingTiming,
    ) -> Result<(), StackError> {
        self.status()?;
        self.timing = Some(timing);
        Ok(())
    }

    fn start_advertising(
        &mut self,
        _handle: AdvertisingHandle,
        discoverability: Discoverability,
        connectability: Connectability,
    ) -> Result<(), StackError> {
        self.status()?;
        assert_eq!(discoverability, Discoverability::General);
        assert_eq!(connectability, Connectability::ConnectableScannable);
        self.advertising_starts += 1;
        Ok(())
    }

    fn send_notification(
        &mut self,
        connection: ConnectionHandle,
        characteristic: Characteristic,
        value: &[u8],
    ) -> Result<(), StackError> {
        self.status()?;
        assert_eq!(characteristic, Characteristic::Rx);
        self.notifications.push((connection, value.to_vec()));
        Ok(())
    }

    fn send_read_response(
        &mut self,
        connection: ConnectionHandle,
        characteristic: Characteristic,
        value: &[u8],
    ) -> Result<(), StackError> {
        self.status()?;
        assert_eq!(characteristic, Characteristic::Rx);
        self.read_responses.push((connection, value.to_vec()));
        Ok(())
    }

    fn send_write_response(
        &mut self,
        connection: ConnectionHandle,
        characteristic: Characteristic,
        att_error: u8,
    ) -> Result<(), StackError> {
        self.status()?;
        self.write_responses
            .push((connection, characteristic, att_error));
        Ok(())
    }
}

/// Timer that records whether it is running. `fail_with` makes every call fail.
#[derive(Default)]
pub struct MockTimer {
    pub running: Option<Duration>,
    pub fail_with: Option<u16>,
}

impl TickTimer for MockTimer {
    fn start(&mut self, period: Duration) -> Result<(), StackError> {
        if let Some(code) = self.fail_with {
            return Err(StackError(code));
        }
        self.running = Some(period);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), StackError> {
        if let Some(code) = self.fail_with {
            return Err(StackError(code));
        }
        self.running = None;
        Ok(())
    }
}
