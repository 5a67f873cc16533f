//! Radio stack interface
//!
//! The bridge never talks to a BLE controller directly. Everything it needs
//! from the stack goes through [`Radio`], and every call reports the stack's
//! numeric status on failure.

use thiserror_no_std::Error;

use crate::events::Characteristic;

/// Stack-assigned connection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionHandle(pub u8);

/// Stack-assigned advertising set handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvertisingHandle(pub u8);

/// Public or static random device address, least-significant byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BdAddr(pub [u8; 6]);

/// Non-zero status returned by a failed stack call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("stack status 0x{0:04x}")]
pub struct StackError(pub u16);

/// Advertising interval unit used by the controller.
const ADVERTISING_UNIT_US: u32 = 625;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvertisingTiming {
    /// Minimum interval in 0.625 ms units.
    pub min_interval: u32,
    /// Maximum interval in 0.625 ms units.
    pub max_interval: u32,
    /// Advertising duration in 10 ms units; 0 advertises until stopped.
    pub duration: u16,
    /// Maximum advertising events; 0 means no limit.
    pub max_events: u8,
}

impl AdvertisingTiming {
    /// Fixed-interval advertising with no duration or event limit.
    pub const fn fixed_interval_ms(interval_ms: u16) -> Self {
        let units = interval_ms as u32 * 1000 / ADVERTISING_UNIT_US;
        Self {
            min_interval: units,
            max_interval: units,
            duration: 0,
            max_events: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discoverability {
    NonDiscoverable,
    Limited,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectability {
    NonConnectable,
    ConnectableScannable,
}

/// Derive the 8-byte System ID from the identity address.
///
/// The address is reversed into MSB-first order and padded in the middle with
/// `FF FE`, the usual EUI-48 to EUI-64 expansion.
pub const fn system_id(address: &BdAddr) -> [u8; 8] {
    let a = &address.0;
    [a[5], a[4], a[3], 0xFF, 0xFE, a[2], a[1], a[0]]
}

/// Commands the bridge issues to the radio stack.
pub trait Radio {
    fn identity_address(&mut self) -> Result<BdAddr, StackError>;

    fn write_attribute(
        &mut self,
        characteristic: Characteristic,
        value: &[u8],
    ) -> Result<(), StackError>;

    fn create_advertising_set(&mut self) -> Result<AdvertisingHandle, StackError>;

    fn set_advertising_timing(
        &mut self,
        handle: AdvertisingHandle,
        timing: AdvertisingTiming,
    ) -> Result<(), StackError>;

    fn start_advertising(
        &mut self,
        handle: AdvertisingHandle,
        discoverability: Discoverability,
        connectability: Connectability,
    ) -> Result<(), StackError>;

    fn send_notification(
        &mut self,
        connection: ConnectionHandle,
        characteristic: Characteristic,
        value: &[u8],
    ) -> Result<(), StackError>;

    fn send_read_response(
        &mut self,
        connection: ConnectionHandle,
        characteristic: Characteristic,
        value: &[u8],
    ) -> Result<(), StackError>;

    /// Answer a write request; `att_error` 0 means success.
    fn send_write_response(
        &mut self,
        connection: ConnectionHandle,
        characteristic: Characteristic,
        att_error: u8,
    ) -> Result<(), StackError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_id_reverses_and_pads_address() {
        let address = BdAddr([0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        assert_eq!(
            system_id(&address),
            [0x06, 0x05, 0x04, 0xFF, 0xFE, 0x03, 0x02, 0x01]
        );
    }

    #[test]
    fn test_100ms_advertising_is_160_units() {
        let timing = AdvertisingTiming::fixed_interval_ms(100);
        assert_eq!(timing.min_interval, 160);
        assert_eq!(timing.max_interval, 160);
        assert_eq!(timing.duration, 0);
        assert_eq!(timing.max_events, 0);
    }
}
