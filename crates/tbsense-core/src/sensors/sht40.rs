use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use sht4x::Sht4xAsync;

use super::{EnvironmentSample, EnvironmentSensor, SensorError};

/// Relative-humidity/temperature source backed by a Sensirion SHT4x.
pub struct SHT40Sensor<I, D> {
    sensor: Sht4xAsync<I, D>,
    delay: D,
}

impl<I: I2c, D: DelayNs> SHT40Sensor<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self {
            sensor: Sht4xAsync::<I, D>::new(i2c),
            delay,
        }
    }
}

impl<I: I2c, D: DelayNs> EnvironmentSensor for SHT40Sensor<I, D> {
    async fn read(&mut self) -> Result<EnvironmentSample, SensorError> {
        let measurement = self
            .sensor
            .measure(sht4x::Precision::High, &mut self.delay)
            .await
            .map_err(|e| {
                log::error!("SHT40 measurement failed: {:?}", e);
                SensorError::ReadFailed {
                    sensor: "SHT40",
                    operation: "measure temperature/humidity",
                    details: "I2C communication error or sensor not responding",
                }
            })?;

        let temperature_milli_celsius =
            (measurement.temperature_celsius().to_num::<f32>() * 1000.0) as i32;
        // The SHT4x can report slightly below 0 %RH; the wire field is unsigned.
        let humidity_milli_percent =
            (measurement.humidity_percent().to_num::<f32>() * 1000.0).max(0.0) as u32;

        Ok(EnvironmentSample {
            humidity_milli_percent,
            temperature_milli_celsius,
        })
    }
}
