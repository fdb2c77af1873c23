//! Configuration type definitions
//!
//! Defaults come from the constants in the parent module. The firmware
//! overrides them from its build-time validated `device.toml`.

use core::fmt;

use crate::event::{ButtonId, BUTTON_COUNT};
use crate::ui::Easing;

use super::{
    DEBOUNCE_MS, KERNEL_TICK_MS, LONG_PRESS_MS, MAX_EVENTS_PER_TICK, REPEAT_DELAY_MS,
    REPEAT_RATE_MS, TRANSITION_DURATION_MS,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Tick interval must be non-zero
    ZeroTickInterval,
    /// Debounce interval must be shorter than the long-press threshold
    DebounceNotBelowLongPress,
    /// Key-repeat rate must be non-zero
    ZeroRepeatRate,
    /// At least one event must be dispatched per tick
    ZeroEventBudget,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroTickInterval => write!(f, "tick interval must be non-zero"),
            ConfigError::DebounceNotBelowLongPress => {
                write!(f, "debounce interval must be below long-press threshold")
            }
            ConfigError::ZeroRepeatRate => write!(f, "repeat rate must be non-zero"),
            ConfigError::ZeroEventBudget => write!(f, "per-tick event budget must be non-zero"),
        }
    }
}

/// Button timing thresholds (all in ms)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ButtonTiming {
    /// Time a raw level must stay stable before it is accepted
    pub debounce_ms: u32,
    /// Hold time before a press is reported as a long press
    pub long_press_ms: u32,
    /// Delay after the long press before the first repeat
    pub repeat_delay_ms: u32,
    /// Interval between repeats
    pub repeat_rate_ms: u32,
}

impl Default for ButtonTiming {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_MS,
            long_press_ms: LONG_PRESS_MS,
            repeat_delay_ms: REPEAT_DELAY_MS,
            repeat_rate_ms: REPEAT_RATE_MS,
        }
    }
}

/// Set of buttons that generate key-repeat events while held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RepeatMask(u8);

impl RepeatMask {
    /// No button repeats
    pub const NONE: RepeatMask = RepeatMask(0);

    /// Directional buttons repeat, Select and Back do not
    pub const DIRECTIONS: RepeatMask = RepeatMask(
        (1 << ButtonId::Up as u8)
            | (1 << ButtonId::Down as u8)
            | (1 << ButtonId::Left as u8)
            | (1 << ButtonId::Right as u8),
    );

    /// Every button repeats
    pub const ALL: RepeatMask = RepeatMask((1 << BUTTON_COUNT) - 1);

    /// Check whether a button repeats
    pub const fn contains(self, button: ButtonId) -> bool {
        self.0 & (1 << button as u8) != 0
    }

    /// Return a copy with a button enabled or disabled
    pub const fn with(self, button: ButtonId, enabled: bool) -> Self {
        if enabled {
            RepeatMask(self.0 | (1 << button as u8))
        } else {
            RepeatMask(self.0 & !(1 << button as u8))
        }
    }

    /// Raw bit representation (bit index = button id)
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Build from raw bits, ignoring bits past the last button
    pub const fn from_bits(bits: u8) -> Self {
        RepeatMask(bits & Self::ALL.0)
    }
}

impl Default for RepeatMask {
    fn default() -> Self {
        Self::DIRECTIONS
    }
}

/// Kernel configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KernelConfig {
    /// Interval between kernel ticks (ms)
    pub tick_interval_ms: u32,
    /// Button debounce and hold thresholds
    pub buttons: ButtonTiming,
    /// Buttons with key-repeat enabled
    pub repeat_mask: RepeatMask,
    /// Duration of screen transitions (ms)
    pub transition_duration_ms: u32,
    /// Easing curve applied to transition progress
    pub default_easing: Easing,
    /// Maximum events dispatched per tick; the rest wait for the next tick
    pub max_events_per_tick: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: KERNEL_TICK_MS,
            buttons: ButtonTiming::default(),
            repeat_mask: RepeatMask::default(),
            transition_duration_ms: TRANSITION_DURATION_MS,
            default_easing: Easing::InOutQuad,
            max_events_per_tick: MAX_EVENTS_PER_TICK,
        }
    }
}

impl KernelConfig {
    /// Check the configuration for values the kernel cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.buttons.debounce_ms >= self.buttons.long_press_ms {
            return Err(ConfigError::DebounceNotBelowLongPress);
        }
        if self.buttons.repeat_rate_ms == 0 {
            return Err(ConfigError::ZeroRepeatRate);
        }
        if self.max_events_per_tick == 0 {
            return Err(ConfigError::ZeroEventBudget);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = KernelConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.tick_interval_ms, 10);
        assert_eq!(config.buttons.debounce_ms, 20);
        assert_eq!(config.buttons.long_press_ms, 800);
    }

    #[test]
    fn test_debounce_must_be_below_long_press() {
        let config = KernelConfig {
            buttons: ButtonTiming {
                debounce_ms: 800,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::DebounceNotBelowLongPress)
        );
    }

    #[test]
    fn test_zero_values_rejected() {
        let zero_tick = KernelConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(zero_tick.validate(), Err(ConfigError::ZeroTickInterval));

        let zero_budget = KernelConfig {
            max_events_per_tick: 0,
            ..Default::default()
        };
        assert_eq!(zero_budget.validate(), Err(ConfigError::ZeroEventBudget));
    }

    #[test]
    fn test_repeat_mask() {
        let mask = RepeatMask::default();
        assert!(mask.contains(ButtonId::Up));
        assert!(mask.contains(ButtonId::Right));
        assert!(!mask.contains(ButtonId::Select));
        assert!(!mask.contains(ButtonId::Back));

        let mask = mask.with(ButtonId::Select, true).with(ButtonId::Up, false);
        assert!(mask.contains(ButtonId::Select));
        assert!(!mask.contains(ButtonId::Up));

        assert_eq!(RepeatMask::from_bits(0xFF), RepeatMask::ALL);
    }
}
