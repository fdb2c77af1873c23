//! Button wiring
//!
//! Up, Down, Left, Right, Select and Back sit on GPIO 2-7 in button-id
//! order.

use embassy_rp::gpio::Input;
use ionos_core::event::BUTTON_COUNT;
use ionos_hal::{ButtonBank, InputPin};

/// GPIO input used as a button
pub struct ButtonPin(Input<'static>);

impl ButtonPin {
    pub fn new(input: Input<'static>) -> Self {
        Self(input)
    }
}

impl InputPin for ButtonPin {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}

/// The six buttons, sampled together once per kernel tick
pub type Buttons = ButtonBank<ButtonPin, BUTTON_COUNT>;
