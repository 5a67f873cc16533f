#[cfg(feature = "sensor-sht40")]
mod sht40;

use thiserror_no_std::Error;

#[cfg(feature = "sensor-sht40")]
pub use sht40::SHT40Sensor;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("{sensor} is not available")]
    Unavailable { sensor: &'static str },
    #[error("{sensor} failed to {operation}: {details}")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        details: &'static str,
    },
}

/// One IMU sample in the driver's raw integer units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionSample {
    /// Roll, pitch, yaw.
    pub orientation: [i16; 3],
    /// X, Y, Z acceleration.
    pub acceleration: [i16; 3],
}

impl MotionSample {
    pub const fn accel_x(&self) -> i16 {
        self.acceleration[0]
    }

    pub const fn accel_y(&self) -> i16 {
        self.acceleration[1]
    }
}

/// Typed readings from a relative-humidity/temperature sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvironmentSample {
    pub humidity_milli_percent: u32,
    pub temperature_milli_celsius: i32,
}

/// Source of orientation/acceleration samples.
pub trait MotionSensor {
    fn read(&mut self) -> impl Future<Output = Result<MotionSample, SensorError>>;
}

/// Source of relative-humidity/temperature samples.
pub trait EnvironmentSensor {
    fn read(&mut self) -> impl Future<Output = Result<EnvironmentSample, SensorError>>;
}
