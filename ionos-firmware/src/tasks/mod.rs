//! Embassy async tasks
//!
//! Each task runs independently and communicates via the statics in
//! [`crate::channels`].

pub mod battery;
pub mod display;
pub mod kernel;

pub use battery::battery_task;
pub use display::display_task;
pub use kernel::{kernel_task, DeviceKernel};
