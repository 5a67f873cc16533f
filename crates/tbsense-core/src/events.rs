//! Events delivered to the bridge
//!
//! Radio-stack callbacks, timer expiries and button interrupts are all folded
//! into [`BridgeEvent`] so a single dispatcher handles them one at a time.

use heapless::Vec;

use crate::radio::ConnectionHandle;

/// Longest attribute value ATT allows in a single write. After an MTU
/// exchange a peer may send anything up to this, and the decoder still has
/// to see it to answer with the right status.
pub const MAX_WRITE_LEN: usize = 512;

pub type WriteValue = Vec<u8, MAX_WRITE_LEN>;

/// GATT characteristics the bridge knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Characteristic {
    /// Telemetry, read + notify.
    Rx,
    /// Control, write.
    Tx,
    /// Device-information System ID, written once at boot.
    SystemId,
    /// Any other handle in the GATT database.
    Other(u16),
}

/// Client characteristic configuration written by the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientConfig {
    Disabled,
    Notification,
    Indication,
}

impl ClientConfig {
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

/// What changed in a characteristic status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacteristicStatus {
    /// The peer rewrote the client configuration descriptor.
    ClientConfig(ClientConfig),
    /// The peer confirmed an indication.
    Confirmation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonId {
    Button0,
    Button1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

impl ButtonState {
    pub const fn is_pressed(self) -> bool {
        matches!(self, Self::Pressed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// The radio is up; no stack command may be issued before this.
    Boot,
    ConnectionOpened {
        connection: ConnectionHandle,
    },
    ConnectionClosed {
        connection: ConnectionHandle,
    },
    CharacteristicStatus {
        connection: ConnectionHandle,
        characteristic: Characteristic,
        status: CharacteristicStatus,
    },
    ReadRequest {
        connection: ConnectionHandle,
        characteristic: Characteristic,
    },
    WriteRequest {
        connection: ConnectionHandle,
        characteristic: Characteristic,
        value: WriteValue,
    },
    Button {
        button: ButtonId,
        state: ButtonState,
    },
    /// The periodic telemetry timer expired.
    Tick,
}

impl BridgeEvent {
    /// Build a write request. `None` only when `bytes` is longer than ATT
    /// permits ([`MAX_WRITE_LEN`]), which no conforming stack delivers.
    pub fn write(
        connection: ConnectionHandle,
        characteristic: Characteristic,
        bytes: &[u8],
    ) -> Option<Self> {
        let mut value = WriteValue::new();
        value.extend_from_slice(bytes).ok()?;
        Some(Self::WriteRequest {
            connection,
            characteristic,
            value,
        })
    }
}
