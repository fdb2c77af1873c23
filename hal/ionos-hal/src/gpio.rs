//! GPIO input
//!
//! The only pin capability the button path needs. Board crates wrap their
//! chip's input type in a newtype implementing [`InputPin`].

/// A pin whose electrical level can be read without side effects
pub trait InputPin {
    /// Level is logic 1
    fn is_high(&self) -> bool;

    /// Level is logic 0
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

// Lets a bank borrow pins it does not own (host tests, shared wiring)
impl<T: InputPin + ?Sized> InputPin for &T {
    fn is_high(&self) -> bool {
        (**self).is_high()
    }
}
