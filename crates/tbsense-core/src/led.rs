//! RGB LED state and actuator interface

/// Number of independently switchable LED channels.
pub const LED_CHANNELS: u8 = 4;

const ALL_CHANNELS_MASK: u8 = (1 << LED_CHANNELS) - 1;

/// Desired LED output: which channels are lit and the shared colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedState {
    enabled_mask: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl LedState {
    /// Every channel off, colour black.
    pub const OFF: Self = Self {
        enabled_mask: 0,
        red: 0,
        green: 0,
        blue: 0,
    };

    /// All channels off with `color` held for when they are switched on.
    pub const fn with_color(color: [u8; 3]) -> Self {
        Self {
            enabled_mask: 0,
            red: color[0],
            green: color[1],
            blue: color[2],
        }
    }

    /// 4-bit channel-enable mask.
    pub const fn enabled_mask(&self) -> u8 {
        self.enabled_mask
    }

    pub const fn is_enabled(&self, channel: u8) -> bool {
        channel < LED_CHANNELS && self.enabled_mask & (1 << channel) != 0
    }

    /// Switch one channel, or all channels when `channel` is out of range.
    pub fn set_channel(&mut self, channel: u8, on: bool) {
        let bits = if channel >= LED_CHANNELS {
            ALL_CHANNELS_MASK
        } else {
            1 << channel
        };

        if on {
            self.enabled_mask |= bits;
        } else {
            self.enabled_mask &= !bits;
        }
    }

    pub fn set_color(&mut self, red: u8, green: u8, blue: u8) {
        self.red = red;
        self.green = green;
        self.blue = blue;
    }
}

/// Drives the physical LED.
pub trait LedActuator {
    fn apply(&mut self, state: &LedState);
}
