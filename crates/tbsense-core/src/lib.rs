//! Hardware-independent core of the tbsense radio bridge
//!
//! This crate contains all platform-agnostic logic that connects a wearable
//! sensor board (IMU, humidity/temperature sensor, RGB LED, two buttons) to a
//! radio link: the telemetry wire format, the notification cadence, the LED
//! command decoder and the event dispatch that ties them together.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod bridge;
pub mod cadence;
pub mod command;
pub mod config;
pub mod events;
pub mod led;
pub mod radio;
pub mod sensors;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::{Bridge, BridgeError, DeviceState, EventQueue, Peripherals};
pub use config::BridgeConfig;
pub use events::BridgeEvent;
