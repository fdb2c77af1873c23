//! Button bank sampling
//!
//! Turns raw pin levels into logical "pressed" samples. No filtering happens
//! here; debouncing belongs to the kernel input layer.

use crate::gpio::InputPin;

/// Electrical polarity of a button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Pressed pulls the pin to ground (internal pull-up)
    #[default]
    ActiveLow,
    /// Pressed drives the pin high (pull-down)
    ActiveHigh,
}

impl Polarity {
    /// Convert a pin level into a pressed flag
    pub const fn is_pressed(self, level_high: bool) -> bool {
        match self {
            Polarity::ActiveLow => !level_high,
            Polarity::ActiveHigh => level_high,
        }
    }
}

/// Fixed set of button pins sampled together
pub struct ButtonBank<P, const N: usize> {
    pins: [P; N],
    polarity: Polarity,
}

impl<P: InputPin, const N: usize> ButtonBank<P, N> {
    /// Create a bank from pins in button-id order
    pub fn new(pins: [P; N], polarity: Polarity) -> Self {
        Self { pins, polarity }
    }

    /// Sample every pin once
    ///
    /// Index `i` of the result is `true` when button `i` is physically held.
    pub fn sample(&self) -> [bool; N] {
        core::array::from_fn(|i| self.polarity.is_pressed(self.pins[i].is_high()))
    }

    /// Sample a single button
    pub fn is_pressed(&self, index: usize) -> Option<bool> {
        self.pins
            .get(index)
            .map(|pin| self.polarity.is_pressed(pin.is_high()))
    }

    /// Number of buttons in the bank
    pub const fn len(&self) -> usize {
        N
    }

    /// Check if the bank has no buttons
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Electrical polarity used for sampling
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }
}
