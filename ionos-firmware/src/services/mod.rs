//! Kernel services
//!
//! Polled once per kernel tick; hardware access stays in the tasks.

pub mod battery;

pub use battery::BatteryService;
