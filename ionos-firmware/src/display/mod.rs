//! OLED display support
//!
//! The kernel renders into [`OledBackend`] on its own tick; the display
//! task owns the I2C bus and flushes each presented frame with the
//! [`Sh1106`] driver.

pub mod framebuffer;
pub mod oled;
pub mod sh1106;

pub use framebuffer::FrameBuffer;
pub use oled::OledBackend;
pub use sh1106::Sh1106;
