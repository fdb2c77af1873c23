//! ionOS Hardware Abstraction Layer
//!
//! This crate defines the small set of hardware traits the kernel input
//! path needs, so that the debouncer and kernel can be exercised on the
//! host with simulated pins and on the device with real GPIO.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  ionos-firmware (embassy-rp pins)       │
//! └─────────────────────────────────────────┘
//!                     │ InputPin
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ionos-hal (this crate - ButtonBank)    │
//! └─────────────────────────────────────────┘
//!                     │ [bool; N] logical levels
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ionos-core (Debouncer -> EventQueue)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::InputPin`] - Digital input
//! - [`buttons::ButtonBank`] - Samples a fixed set of button pins

#![no_std]
#![deny(unsafe_code)]

pub mod buttons;
pub mod gpio;

// Re-export key types at crate root for convenience
pub use buttons::{ButtonBank, Polarity};
pub use gpio::InputPin;
