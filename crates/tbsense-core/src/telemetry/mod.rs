//! Telemetry wire format
//!
//! The RX characteristic carries a fixed 21-byte frame. Multi-byte fields are
//! big-endian (MSB first), which is the layout micro:bit-style clients expect.
//!
//! | Bytes    | Field                                  |
//! |----------|----------------------------------------|
//! | `0..=1`  | acceleration Y, quantized `i16`        |
//! | `2..=3`  | acceleration X, quantized `i16`        |
//! | `4`      | button 0 (0 released / 1 pressed)      |
//! | `5`      | button 1                               |
//! | `6..=7`  | temperature, low 16 bits of milli-°C   |
//! | `8..=9`  | humidity, low 16 bits of milli-%RH     |
//! | `10..21` | reserved                               |

mod environment;
mod motion;

pub use environment::encode_environment;
pub use motion::{ACCEL_QUANT_BIAS, ACCEL_QUANT_MASK, MotionTracker, quantize_axis};

use crate::events::ButtonId;

/// Size of the RX characteristic value.
pub const TELEMETRY_LEN: usize = 21;

/// Byte offsets of each field within the frame.
pub mod offsets {
    pub const ACCEL_Y: usize = 0;
    pub const ACCEL_X: usize = 2;
    pub const BUTTON_0: usize = 4;
    pub const BUTTON_1: usize = 5;
    pub const TEMPERATURE: usize = 6;
    pub const HUMIDITY: usize = 8;
    pub const RESERVED: usize = 10;
}

/// The live telemetry buffer.
///
/// Each writer touches only its own byte range, so the reserved tail and any
/// field not being updated keep their last-written value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryBuffer {
    bytes: [u8; TELEMETRY_LEN],
}

impl Default for TelemetryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryBuffer {
    pub const fn new() -> Self {
        Self {
            bytes: [0; TELEMETRY_LEN],
        }
    }

    pub fn as_bytes(&self) -> &[u8; TELEMETRY_LEN] {
        &self.bytes
    }

    fn write_u16(&mut self, offset: usize, value: u16) {
        self.bytes[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    }

    fn read_u16(&self, offset: usize) -> u16 {
        u16::from_be_bytes([self.bytes[offset], self.bytes[offset + 1]])
    }

    /// Write already-quantized acceleration into bytes `0..4`.
    pub fn write_acceleration(&mut self, x: i16, y: i16) {
        self.write_u16(offsets::ACCEL_Y, y as u16);
        self.write_u16(offsets::ACCEL_X, x as u16);
    }

    pub fn write_button(&mut self, button: ButtonId, pressed: bool) {
        self.bytes[button_offset(button)] = pressed as u8;
    }

    /// Write the raw 16-bit environment fields into bytes `6..10`.
    pub fn write_environment(&mut self, temperature: u16, humidity: u16) {
        self.write_u16(offsets::TEMPERATURE, temperature);
        self.write_u16(offsets::HUMIDITY, humidity);
    }

    /// Current temperature field as the peer will decode it.
    pub fn temperature(&self) -> i16 {
        self.read_u16(offsets::TEMPERATURE) as i16
    }

    pub fn humidity(&self) -> u16 {
        self.read_u16(offsets::HUMIDITY)
    }

    pub fn frame(&self) -> TelemetryFrame {
        TelemetryFrame::from_bytes(&self.bytes)
    }
}

const fn button_offset(button: ButtonId) -> usize {
    match button {
        ButtonId::Button0 => offsets::BUTTON_0,
        ButtonId::Button1 => offsets::BUTTON_1,
    }
}

/// Decoded view of a telemetry frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetryFrame {
    pub accel_x: i16,
    pub accel_y: i16,
    pub buttons: [bool; 2],
    pub temperature: i16,
    pub humidity: u16,
    pub reserved: [u8; TELEMETRY_LEN - offsets::RESERVED],
}

impl TelemetryFrame {
    pub fn from_bytes(bytes: &[u8; TELEMETRY_LEN]) -> Self {
        let be = |offset: usize| u16::from_be_bytes([bytes[offset], bytes[offset + 1]]);
        let mut reserved = [0u8; TELEMETRY_LEN - offsets::RESERVED];
        reserved.copy_from_slice(&bytes[offsets::RESERVED..]);

        Self {
            accel_x: be(offsets::ACCEL_X) as i16,
            accel_y: be(offsets::ACCEL_Y) as i16,
            buttons: [
                bytes[offsets::BUTTON_0] != 0,
                bytes[offsets::BUTTON_1] != 0,
            ],
            temperature: be(offsets::TEMPERATURE) as i16,
            humidity: be(offsets::HUMIDITY),
            reserved,
        }
    }

    pub fn to_bytes(&self) -> [u8; TELEMETRY_LEN] {
        let mut buffer = TelemetryBuffer::new();
        buffer.write_acceleration(self.accel_x, self.accel_y);
        buffer.write_button(ButtonId::Button0, self.buttons[0]);
        buffer.write_button(ButtonId::Button1, self.buttons[1]);
        buffer.write_environment(self.temperature as u16, self.humidity);
        buffer.bytes[offsets::RESERVED..].copy_from_slice(&self.reserved);
        buffer.bytes
    }
}
