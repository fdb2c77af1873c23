//! Bounded FIFO event queue
//!
//! One producer context (button sampling, timers, services) and one consumer
//! (the kernel tick). Every mutation runs inside a critical section so the
//! consumer never observes a half-written event, even when the producer runs
//! from an interrupt.

use core::cell::RefCell;
use core::fmt;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;

use super::types::{Event, EventType};

/// Reason an event was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueError {
    /// Queue at capacity; the event was dropped
    Full,
    /// Event type disabled by the queue filter
    Filtered,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Full => write!(f, "event queue full"),
            QueueError::Filtered => write!(f, "event type filtered"),
        }
    }
}

/// Snapshot of queue diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueStats {
    /// Events currently queued
    pub len: usize,
    /// Fixed capacity
    pub capacity: usize,
    /// Events rejected because the queue was full
    pub dropped: u32,
    /// Events rejected by the type filter
    pub filtered: u32,
    /// Largest length observed since the last reset
    pub high_water: usize,
}

/// Anything events can be posted to
///
/// Producers that should not see the rest of the queue API (services,
/// interrupt handlers) take `&dyn EventSink`.
pub trait EventSink {
    /// Post an event, failing without side effects on the queued events
    fn post(&self, event: Event) -> Result<(), QueueError>;
}

/// Per-type enable bits over the raw event code space
#[derive(Clone, Copy)]
struct EventFilter([u32; 8]);

impl EventFilter {
    const ALLOW_ALL: EventFilter = EventFilter([u32::MAX; 8]);

    fn allows(&self, event_type: EventType) -> bool {
        let code = event_type.raw() as usize;
        self.0[code / 32] & (1 << (code % 32)) != 0
    }

    fn set(&mut self, event_type: EventType, enabled: bool) {
        let code = event_type.raw() as usize;
        if enabled {
            self.0[code / 32] |= 1 << (code % 32);
        } else {
            self.0[code / 32] &= !(1 << (code % 32));
        }
    }
}

struct QueueState<const N: usize> {
    events: Deque<Event, N>,
    dropped: u32,
    filtered: u32,
    high_water: usize,
    filter: EventFilter,
}

/// Fixed-capacity FIFO of [`Event`]s
///
/// `const`-constructible so it can live in a `static` shared between the
/// producer and the kernel.
pub struct EventQueue<const N: usize> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<QueueState<N>>>,
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventQueue<N> {
    /// Create an empty queue accepting every event type
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(QueueState {
                events: Deque::new(),
                dropped: 0,
                filtered: 0,
                high_water: 0,
                filter: EventFilter::ALLOW_ALL,
            })),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut QueueState<N>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Append an event at the tail
    ///
    /// A full queue rejects the new event and leaves the queued ones untouched.
    pub fn post(&self, event: Event) -> Result<(), QueueError> {
        let result = self.with_state(|state| {
            if !state.filter.allows(event.event_type) {
                state.filtered = state.filtered.wrapping_add(1);
                return Err(QueueError::Filtered);
            }
            if state.events.push_back(event).is_err() {
                state.dropped = state.dropped.wrapping_add(1);
                return Err(QueueError::Full);
            }
            state.high_water = state.high_water.max(state.events.len());
            Ok(())
        });

        if result == Err(QueueError::Full) {
            warn!("event queue full, dropped {}", event.event_type);
        }
        result
    }

    /// Remove and return the oldest event
    pub fn dequeue(&self) -> Option<Event> {
        self.with_state(|state| state.events.pop_front())
    }

    /// Copy of the oldest event without removing it
    pub fn peek(&self) -> Option<Event> {
        self.with_state(|state| state.events.front().copied())
    }

    /// Discard every queued event
    ///
    /// Counters and the filter are kept.
    pub fn clear(&self) {
        self.with_state(|state| state.events.clear());
    }

    pub fn len(&self) -> usize {
        self.with_state(|state| state.events.len())
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        self.with_state(|state| state.events.is_empty())
    }

    pub fn is_full(&self) -> bool {
        self.with_state(|state| state.events.is_full())
    }

    /// Events dropped because the queue was full
    pub fn dropped_count(&self) -> u32 {
        self.with_state(|state| state.dropped)
    }

    /// Enable or disable delivery of one event type
    pub fn set_filter(&self, event_type: EventType, enabled: bool) {
        self.with_state(|state| state.filter.set(event_type, enabled));
        debug!("event filter {}: {}", event_type, enabled);
    }

    /// Check whether an event type is currently accepted
    pub fn is_enabled(&self, event_type: EventType) -> bool {
        self.with_state(|state| state.filter.allows(event_type))
    }

    /// Snapshot of the diagnostics counters
    pub fn stats(&self) -> QueueStats {
        self.with_state(|state| QueueStats {
            len: state.events.len(),
            capacity: N,
            dropped: state.dropped,
            filtered: state.filtered,
            high_water: state.high_water,
        })
    }

    /// Zero the counters; the high-water mark restarts at the current length
    pub fn reset_stats(&self) {
        self.with_state(|state| {
            state.dropped = 0;
            state.filtered = 0;
            state.high_water = state.events.len();
        });
    }
}

impl<const N: usize> EventSink for EventQueue<N> {
    fn post(&self, event: Event) -> Result<(), QueueError> {
        EventQueue::post(self, event)
    }
}
