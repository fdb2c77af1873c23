//! Display abstraction for ionOS
//!
//! This crate provides:
//! - `DisplayBackend` trait, the only path by which the kernel and the
//!   active application reach the panel
//! - `Viewport` describing how the current frame is shifted, faded or
//!   scaled while a screen transition is in flight
//! - `Screen`, an in-memory double-buffered text display used on the host
//!   and in tests
//!
//! # Frame model
//!
//! Drawing calls only touch a back buffer. The kernel calls
//! [`DisplayBackend::present`] exactly once per tick after the active
//! application has rendered, so a half-drawn frame never reaches the panel.
//!
//! ## Backends
//!
//! - **OLED panels** (SH1106/SSD1306 128x64 over I2C): implemented in the
//!   firmware crate on top of embassy-rp.
//! - **Host screen**: [`Screen`] keeps committed text so tests can assert on
//!   what was actually presented.

#![no_std]
#![deny(unsafe_code)]

pub mod backend;
pub mod screen;

// Re-export key types
pub use backend::{DisplayBackend, DisplayError, DisplayExt, Viewport};
pub use screen::{Screen, SCREEN_COLS, SCREEN_ROWS};
