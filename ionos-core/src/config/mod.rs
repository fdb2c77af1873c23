//! Configuration
//!
//! Compile-time limits sizing the fixed-capacity containers, plus the
//! runtime-tunable timing configuration consumed by the kernel.

pub mod types;

pub use types::*;

/// Kernel tick interval (ms)
pub const KERNEL_TICK_MS: u32 = 10;

/// Button debounce interval (ms)
pub const DEBOUNCE_MS: u32 = 20;

/// Hold time before a press becomes a long press (ms)
pub const LONG_PRESS_MS: u32 = 800;

/// Delay between long press and the first key-repeat (ms)
pub const REPEAT_DELAY_MS: u32 = 500;

/// Interval between key-repeat events (ms)
pub const REPEAT_RATE_MS: u32 = 100;

/// Event queue capacity
pub const EVENT_QUEUE_CAPACITY: usize = 32;

/// Maximum events dispatched in one tick
pub const MAX_EVENTS_PER_TICK: usize = 16;

/// Maximum registered applications
pub const MAX_APPS: usize = 10;

/// Maximum screen history depth
pub const SCREEN_STACK_DEPTH: usize = 5;

/// Default screen transition duration (ms)
pub const TRANSITION_DURATION_MS: u32 = 300;

/// Maximum kernel requests an application can queue per tick
pub const MAX_APP_REQUESTS: usize = 4;

/// Maximum collaborator services attached to the kernel
pub const MAX_SERVICES: usize = 4;

/// Panel width in pixels
pub const DISPLAY_WIDTH: u16 = 128;

/// Panel height in pixels
pub const DISPLAY_HEIGHT: u16 = 64;
