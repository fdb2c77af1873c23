//! Screen stack and transition engine

use core::fmt;

pub mod easing;
pub mod navigator;
pub mod screen_stack;
pub mod transition;

pub use easing::Easing;
pub use navigator::{NavError, Navigator};
pub use screen_stack::{ScreenStack, StackEntry};
pub use transition::{TransitionFrame, TransitionKind, TransitionState};

/// Identifier of a UI screen
///
/// Applications assign their own ids; `ROOT` is the screen every
/// application starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScreenId(u8);

impl ScreenId {
    pub const ROOT: ScreenId = ScreenId(0);

    pub const fn new(id: u8) -> Self {
        ScreenId(id)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screen#{}", self.0)
    }
}
