//! Events and the queue that carries them to the kernel

pub mod queue;
pub mod types;

pub use queue::{EventQueue, EventSink, QueueError, QueueStats};
pub use types::{
    ButtonAction, ButtonId, Event, EventCategory, EventPriority, EventType, Payload, BUTTON_COUNT,
};
