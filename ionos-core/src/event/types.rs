//! Event record and identifiers

use core::any::Any;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of physical buttons
pub const BUTTON_COUNT: usize = 6;

/// Out-of-band payload attached to an event
///
/// The referent must outlive the event's stay in the queue; a `'static`
/// borrow makes that hold by construction.
pub type Payload = &'static (dyn Any + Send + Sync);

/// Broad grouping of event types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventCategory {
    System,
    Button,
    Power,
    Display,
    App,
    Input,
    Network,
    Storage,
    Audio,
    Custom,
    None,
}

/// What happened
///
/// Discriminants are stable raw codes, grouped by decade per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum EventType {
    // System events
    SystemInit = 0,
    SystemShutdown = 1,
    SystemTick = 2,
    SystemError = 3,
    SystemWarning = 4,

    // Button events (data1 = button id)
    /// Press released before the long-press threshold
    ButtonPress = 10,
    /// Button released (data2 = hold time in ms)
    ButtonRelease = 11,
    /// Press held past the long-press threshold
    ButtonLongPress = 12,
    /// Synthetic repeat while held
    ButtonRepeat = 13,

    // Power events
    PowerLowBattery = 20,
    PowerChargingStart = 21,
    PowerChargingStop = 22,
    PowerSleep = 23,
    PowerWake = 24,

    // Display events
    DisplayUpdate = 30,
    DisplayError = 31,

    // App events (data1 = app slot for launch/close)
    AppLaunch = 40,
    AppClose = 41,
    AppSuspend = 42,
    AppResume = 43,
    AppBack = 44,

    // Input events (general)
    InputGesture = 50,

    // Network events
    NetworkConnected = 60,
    NetworkDisconnected = 61,
    NetworkError = 62,

    // Storage events
    StorageError = 70,
    StorageComplete = 71,

    // Audio events
    AudioPlay = 80,
    AudioPause = 81,
    AudioStop = 82,
    AudioError = 83,

    // Custom/user events
    Custom = 100,

    /// Sentinel for "no event"
    None = 255,
}

impl EventType {
    /// Raw event code
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Category this type belongs to
    pub const fn category(self) -> EventCategory {
        match self as u8 {
            0..=9 => EventCategory::System,
            10..=19 => EventCategory::Button,
            20..=29 => EventCategory::Power,
            30..=39 => EventCategory::Display,
            40..=49 => EventCategory::App,
            50..=59 => EventCategory::Input,
            60..=69 => EventCategory::Network,
            70..=79 => EventCategory::Storage,
            80..=89 => EventCategory::Audio,
            255 => EventCategory::None,
            _ => EventCategory::Custom,
        }
    }
}

impl TryFrom<u8> for EventType {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        use EventType::*;

        let event_type = match raw {
            0 => SystemInit,
            1 => SystemShutdown,
            2 => SystemTick,
            3 => SystemError,
            4 => SystemWarning,
            10 => ButtonPress,
            11 => ButtonRelease,
            12 => ButtonLongPress,
            13 => ButtonRepeat,
            20 => PowerLowBattery,
            21 => PowerChargingStart,
            22 => PowerChargingStop,
            23 => PowerSleep,
            24 => PowerWake,
            30 => DisplayUpdate,
            31 => DisplayError,
            40 => AppLaunch,
            41 => AppClose,
            42 => AppSuspend,
            43 => AppResume,
            44 => AppBack,
            50 => InputGesture,
            60 => NetworkConnected,
            61 => NetworkDisconnected,
            62 => NetworkError,
            70 => StorageError,
            71 => StorageComplete,
            80 => AudioPlay,
            81 => AudioPause,
            82 => AudioStop,
            83 => AudioError,
            100 => Custom,
            255 => None,
            other => return Err(other),
        };
        Ok(event_type)
    }
}

/// Advisory urgency
///
/// Carried through to consumers; the queue never reorders on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum EventPriority {
    Low = 0,
    #[default]
    Normal = 1,
    High = 2,
    Critical = 3,
}

/// Physical button identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ButtonId {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
    Select = 4,
    Back = 5,
}

impl ButtonId {
    /// All buttons in id order
    pub const ALL: [ButtonId; BUTTON_COUNT] = [
        ButtonId::Up,
        ButtonId::Down,
        ButtonId::Left,
        ButtonId::Right,
        ButtonId::Select,
        ButtonId::Back,
    ];

    /// Index into per-button arrays
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a button by index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl TryFrom<u32> for ButtonId {
    type Error = u32;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::from_index(raw as usize).ok_or(raw)
    }
}

/// Discrete output of the debouncer for one button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonAction {
    ShortPress,
    LongPress,
    Release,
    Repeat,
}

impl ButtonAction {
    /// Event type carrying this action
    pub const fn event_type(self) -> EventType {
        match self {
            ButtonAction::ShortPress => EventType::ButtonPress,
            ButtonAction::LongPress => EventType::ButtonLongPress,
            ButtonAction::Release => EventType::ButtonRelease,
            ButtonAction::Repeat => EventType::ButtonRepeat,
        }
    }

    /// Action carried by an event type, if it is a button event
    pub const fn from_event_type(event_type: EventType) -> Option<Self> {
        match event_type {
            EventType::ButtonPress => Some(ButtonAction::ShortPress),
            EventType::ButtonLongPress => Some(ButtonAction::LongPress),
            EventType::ButtonRelease => Some(ButtonAction::Release),
            EventType::ButtonRepeat => Some(ButtonAction::Repeat),
            _ => None,
        }
    }
}

/// Immutable event record, posted once and consumed once
#[derive(Debug, Clone, Copy)]
pub struct Event {
    /// What happened
    pub event_type: EventType,
    /// How urgent (informational)
    pub priority: EventPriority,
    /// Producer-side time in ms
    pub timestamp: u32,
    /// Generic payload word 1 (button id, app slot, ...)
    pub data1: u32,
    /// Generic payload word 2
    pub data2: u32,
    /// Optional out-of-band payload
    pub ptr: Option<Payload>,
}

impl Event {
    /// Create an event with normal priority and no payload
    pub const fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            priority: EventPriority::Normal,
            timestamp: 0,
            data1: 0,
            data2: 0,
            ptr: None,
        }
    }

    /// Create a button event
    pub const fn button(action: ButtonAction, button: ButtonId, timestamp: u32) -> Self {
        Self::new(action.event_type())
            .with_data(button as u32, 0)
            .with_timestamp(timestamp)
    }

    /// Set the priority
    pub const fn with_priority(mut self, priority: EventPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the timestamp
    pub const fn with_timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set both data words
    pub const fn with_data(mut self, data1: u32, data2: u32) -> Self {
        self.data1 = data1;
        self.data2 = data2;
        self
    }

    /// Attach an out-of-band payload
    pub const fn with_payload(mut self, payload: Payload) -> Self {
        self.ptr = Some(payload);
        self
    }

    /// Event category
    pub const fn category(&self) -> EventCategory {
        self.event_type.category()
    }

    /// Button action, if this is a button event
    pub const fn button_action(&self) -> Option<ButtonAction> {
        ButtonAction::from_event_type(self.event_type)
    }

    /// Button identifier, if this is a button event
    pub fn button_id(&self) -> Option<ButtonId> {
        self.button_action()?;
        ButtonId::try_from(self.data1).ok()
    }

    /// Check for a specific button action on a specific button
    pub fn is_button(&self, action: ButtonAction, button: ButtonId) -> bool {
        self.button_action() == Some(action) && self.button_id() == Some(button)
    }

    /// Borrow the payload as a concrete type
    pub fn payload<T: Any>(&self) -> Option<&'static T> {
        self.ptr.and_then(|payload| payload.downcast_ref::<T>())
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        let same_payload = match (self.ptr, other.ptr) {
            (None, None) => true,
            (Some(a), Some(b)) => core::ptr::addr_eq(a, b),
            _ => false,
        };
        self.event_type == other.event_type
            && self.priority == other.priority
            && self.timestamp == other.timestamp
            && self.data1 == other.data1
            && self.data2 == other.data2
            && same_payload
    }
}

impl Eq for Event {}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}({}, {}) @{}ms",
            self.event_type, self.data1, self.data2, self.timestamp
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Event {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "{}({}, {}) @{}ms",
            self.event_type,
            self.data1,
            self.data2,
            self.timestamp
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_code_conversion() {
        for raw in 0..=255u8 {
            if let Ok(event_type) = EventType::try_from(raw) {
                assert_eq!(event_type.raw(), raw);
            }
        }
        assert_eq!(EventType::try_from(12), Ok(EventType::ButtonLongPress));
        assert_eq!(EventType::try_from(99), Err(99));
        assert_eq!(EventType::try_from(70), Ok(EventType::StorageError));
        assert_eq!(EventType::StorageComplete.raw(), 71);
    }

    #[test]
    fn test_categories() {
        assert_eq!(EventType::SystemTick.category(), EventCategory::System);
        assert_eq!(EventType::ButtonRepeat.category(), EventCategory::Button);
        assert_eq!(EventType::PowerWake.category(), EventCategory::Power);
        assert_eq!(EventType::AppBack.category(), EventCategory::App);
        assert_eq!(EventType::StorageError.category(), EventCategory::Storage);
        assert_eq!(EventType::Custom.category(), EventCategory::Custom);
        assert_eq!(EventType::None.category(), EventCategory::None);
    }

    #[test]
    fn test_button_event_accessors() {
        let event = Event::button(ButtonAction::LongPress, ButtonId::Select, 1234);
        assert_eq!(event.event_type, EventType::ButtonLongPress);
        assert_eq!(event.button_id(), Some(ButtonId::Select));
        assert!(event.is_button(ButtonAction::LongPress, ButtonId::Select));
        assert!(!event.is_button(ButtonAction::ShortPress, ButtonId::Select));

        let not_button = Event::new(EventType::AppLaunch).with_data(4, 0);
        assert_eq!(not_button.button_id(), None);
    }

    #[test]
    fn test_payload_downcast() {
        static TRACK: &str = "track01.mp3";
        let event = Event::new(EventType::AudioPlay).with_payload(&TRACK);

        assert_eq!(event.payload::<&str>(), Some(&TRACK));
        assert_eq!(event.payload::<u32>(), None);
        assert_eq!(Event::new(EventType::AudioPlay).payload::<&str>(), None);
    }

    #[test]
    fn test_priority_is_ordered() {
        assert!(EventPriority::Critical > EventPriority::High);
        assert!(EventPriority::Low < EventPriority::Normal);
        assert_eq!(EventPriority::default(), EventPriority::Normal);
    }
}
