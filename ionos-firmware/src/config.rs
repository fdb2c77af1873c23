//! Device configuration
//!
//! Values come from `device.toml`, validated and turned into constants by
//! the build script.

use ionos_core::config::{ButtonTiming, KernelConfig, RepeatMask};
use ionos_core::ui::Easing;
use ionos_hal::Polarity;

include!(concat!(env!("OUT_DIR"), "/device_config.rs"));

/// Kernel configuration for this device
pub fn kernel_config() -> KernelConfig {
    KernelConfig {
        tick_interval_ms: TICK_MS,
        buttons: ButtonTiming {
            debounce_ms: DEBOUNCE_MS,
            long_press_ms: LONG_PRESS_MS,
            repeat_delay_ms: REPEAT_DELAY_MS,
            repeat_rate_ms: REPEAT_RATE_MS,
        },
        repeat_mask: RepeatMask::from_bits(REPEAT_MASK_BITS),
        transition_duration_ms: TRANSITION_MS,
        default_easing: EASING,
        max_events_per_tick: MAX_EVENTS_PER_TICK,
    }
}

/// Electrical polarity of the button inputs
pub const fn button_polarity() -> Polarity {
    if BUTTONS_ACTIVE_LOW {
        Polarity::ActiveLow
    } else {
        Polarity::ActiveHigh
    }
}
