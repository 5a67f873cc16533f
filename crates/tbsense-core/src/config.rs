//! Bridge configuration
//!
//! Wire-format constants live next to the code that uses them; everything a
//! board integrator may want to tune lives in [`BridgeConfig`].

use alloc::vec::Vec;

use embassy_time::Duration;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

/// Period of the telemetry tick while a peer is subscribed.
pub const DEFAULT_TICK_INTERVAL_MS: u32 = 50;

/// Idle ticks tolerated before a refresh is forced. A notification goes out on
/// the tick where the idle counter exceeds this value, so the longest silence
/// is `(DEFAULT_REFRESH_TICKS + 1) * DEFAULT_TICK_INTERVAL_MS`.
pub const DEFAULT_REFRESH_TICKS: u8 = 20;

pub const DEFAULT_ADVERTISING_INTERVAL_MS: u16 = 100;

/// Dim white, the colour an LED_CONTROL command shows before any LED_COLOR.
pub const DEFAULT_LED_LEVEL: u8 = 0x10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Config encoding failed")]
    Encode,
    #[error("Config decoding failed")]
    Decode,
    #[error("Invalid config value for {field}: {details}")]
    Invalid {
        field: &'static str,
        details: &'static str,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    pub tick_interval_ms: u32,
    /// Idle ticks before the IMU fields are force-refreshed.
    pub motion_refresh_ticks: u8,
    /// Idle ticks before the humidity/temperature fields are force-refreshed.
    pub environment_refresh_ticks: u8,
    pub advertising_interval_ms: u16,
    /// Colour held by the LED state until the peer sends LED_COLOR.
    pub default_color: [u8; 3],
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            motion_refresh_ticks: DEFAULT_REFRESH_TICKS,
            environment_refresh_ticks: DEFAULT_REFRESH_TICKS,
            advertising_interval_ms: DEFAULT_ADVERTISING_INTERVAL_MS,
            default_color: [DEFAULT_LED_LEVEL; 3],
        }
    }
}

impl BridgeConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms as u64)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_interval_ms",
                details: "must be nonzero",
            });
        }
        if self.advertising_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "advertising_interval_ms",
                details: "must be nonzero",
            });
        }
        Ok(())
    }

    /// Decode a postcard-encoded config blob and validate it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|e| {
            log::error!("Config decode failed: {:?}", e);
            ConfigError::Decode
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(|e| {
            log::error!("Config encode failed: {:?}", e);
            ConfigError::Encode
        })
    }
}
