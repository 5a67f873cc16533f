//! Control-characteristic command decoder
//!
//! Every command is an opcode byte followed by a fixed number of argument
//! bytes. A known opcode with the wrong length is rejected; an unknown opcode
//! is accepted and ignored so newer clients can probe older boards.

use thiserror_no_std::Error;

use crate::led::LedState;

pub const CMD_LED_CONTROL: u8 = 0x01;
pub const CMD_LED_CONTROL_LEN: usize = 3;
pub const CMD_LED_COLOR: u8 = 0x02;
pub const CMD_LED_COLOR_LEN: usize = 4;

/// ATT "Invalid Attribute Value Length".
pub const ATT_INVALID_LENGTH: u8 = 0x01;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid length {len} for opcode {opcode:?}")]
    InvalidLength { opcode: Option<u8>, len: usize },
}

impl CommandError {
    /// ATT error code reported back in the write response.
    pub const fn att_code(&self) -> u8 {
        match self {
            Self::InvalidLength { .. } => ATT_INVALID_LENGTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch one LED channel (0-3), or all of them for any larger index.
    LedControl { channel: u8, on: bool },
    LedColor { red: u8, green: u8, blue: u8 },
    /// Accepted without effect.
    Unknown { opcode: u8 },
}

impl Command {
    pub fn parse(bytes: &[u8]) -> Result<Self, CommandError> {
        let Some(&opcode) = bytes.first() else {
            return Err(CommandError::InvalidLength {
                opcode: None,
                len: 0,
            });
        };

        let require_len = |len: usize| {
            if bytes.len() == len {
                Ok(())
            } else {
                Err(CommandError::InvalidLength {
                    opcode: Some(opcode),
                    len: bytes.len(),
                })
            }
        };

        match opcode {
            CMD_LED_CONTROL => {
                require_len(CMD_LED_CONTROL_LEN)?;
                Ok(Self::LedControl {
                    channel: bytes[1],
                    on: bytes[2] != 0,
                })
            }
            CMD_LED_COLOR => {
                require_len(CMD_LED_COLOR_LEN)?;
                Ok(Self::LedColor {
                    red: bytes[1],
                    green: bytes[2],
                    blue: bytes[3],
                })
            }
            opcode => Ok(Self::Unknown { opcode }),
        }
    }

    /// Apply the command to `led`. Returns whether the state was touched.
    pub fn apply(&self, led: &mut LedState) -> bool {
        match *self {
            Self::LedControl { channel, on } => {
                led.set_channel(channel, on);
                true
            }
            Self::LedColor { red, green, blue } => {
                led.set_color(red, green, blue);
                true
            }
            Self::Unknown { .. } => false,
        }
    }
}

/// Decode `bytes` and apply it to `led`, returning the ATT status code.
///
/// On error `led` is left untouched.
pub fn handle_write(bytes: &[u8], led: &mut LedState) -> u8 {
    match Command::parse(bytes) {
        Ok(command) => {
            command.apply(led);
            0
        }
        Err(e) => e.att_code(),
    }
}
