//! Inter-task communication
//!
//! The kernel task owns the event queue consumer side; everything else
//! reaches it through these statics.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use ionos_core::config::EVENT_QUEUE_CAPACITY;
use ionos_core::event::EventQueue;
use portable_atomic::{AtomicBool, AtomicU32};

use crate::display::FrameBuffer;

/// Kernel event queue, shared with producers outside the kernel task
pub static EVENT_QUEUE: EventQueue<EVENT_QUEUE_CAPACITY> = EventQueue::new();

/// Latest composed frame waiting to be flushed to the panel
pub static FRAME: Signal<CriticalSectionRawMutex, FrameBuffer> = Signal::new();

/// Set by the display task once the panel is initialised
pub static PANEL_READY: AtomicBool = AtomicBool::new(false);

/// Most recent battery voltage in millivolts, 0 before the first sample
pub static BATTERY_MV: AtomicU32 = AtomicU32::new(0);
