//! Six-button debouncer producing button events

use crate::config::{ButtonTiming, RepeatMask};
use crate::event::{ButtonId, Event, EventSink, BUTTON_COUNT};

use super::button::{Button, ButtonState};

/// Turns raw button samples into discrete button events
///
/// Raw samples are logical levels (`true` = pressed), indexed by
/// [`ButtonId`]. Pin polarity is resolved before this point.
#[derive(Debug, Clone)]
pub struct Debouncer {
    buttons: [Button; BUTTON_COUNT],
    timing: ButtonTiming,
    repeat_mask: RepeatMask,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(ButtonTiming::default(), RepeatMask::default())
    }
}

impl Debouncer {
    pub fn new(timing: ButtonTiming, repeat_mask: RepeatMask) -> Self {
        Self {
            buttons: ButtonId::ALL.map(Button::new),
            timing,
            repeat_mask,
        }
    }

    pub fn timing(&self) -> &ButtonTiming {
        &self.timing
    }

    pub fn set_timing(&mut self, timing: ButtonTiming) {
        self.timing = timing;
    }

    /// Enable or disable key-repeat for one button
    pub fn set_repeat_enabled(&mut self, button: ButtonId, enabled: bool) {
        self.repeat_mask = self.repeat_mask.with(button, enabled);
    }

    pub fn repeat_mask(&self) -> RepeatMask {
        self.repeat_mask
    }

    /// Sample every button once
    ///
    /// Events are emitted in button-id order. Each carries the button id
    /// in `data1` and the hold time (ms) in `data2`.
    pub fn poll(&mut self, raw: [bool; BUTTON_COUNT], now: u32, mut emit: impl FnMut(Event)) {
        let timing = self.timing;
        for (button, level) in self.buttons.iter_mut().zip(raw) {
            let id = button.id();
            let repeat = self.repeat_mask.contains(id);
            button.sample(level, now, &timing, repeat, |action, held| {
                trace!("button {}: {}", id, action);
                emit(Event::button(action, id, now).with_data(id as u32, held));
            });
        }
    }

    /// Sample every button and post the resulting events
    ///
    /// Returns the number of events the sink rejected.
    pub fn poll_into(&mut self, raw: [bool; BUTTON_COUNT], now: u32, sink: &dyn EventSink) -> u32 {
        let mut rejected = 0;
        self.poll(raw, now, |event| {
            if sink.post(event).is_err() {
                rejected += 1;
            }
        });
        rejected
    }

    pub fn state(&self, button: ButtonId) -> ButtonState {
        self.buttons[button.index()].state()
    }

    /// Whether the button is currently (debounced) down
    pub fn is_pressed(&self, button: ButtonId) -> bool {
        self.buttons[button.index()].is_pressed()
    }

    /// How long the button has been down, `None` if released
    pub fn press_duration(&self, button: ButtonId, now: u32) -> Option<u32> {
        self.buttons[button.index()].press_duration(now)
    }

    /// Forget every press in progress
    pub fn reset(&mut self) {
        for button in &mut self.buttons {
            button.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ButtonAction, EventQueue, EventType};

    type Events = heapless::Vec<Event, 32>;

    fn pressed(button: ButtonId) -> [bool; BUTTON_COUNT] {
        let mut raw = [false; BUTTON_COUNT];
        raw[button.index()] = true;
        raw
    }

    /// Poll every `step` ms over `[from, to)`
    fn drive(
        debouncer: &mut Debouncer,
        raw: [bool; BUTTON_COUNT],
        from: u32,
        to: u32,
        step: u32,
        out: &mut Events,
    ) {
        let mut now = from;
        while now < to {
            debouncer.poll(raw, now, |event| {
                let _ = out.push(event);
            });
            now += step;
        }
    }

    fn count(events: &Events, event_type: EventType) -> usize {
        events.iter().filter(|e| e.event_type == event_type).count()
    }

    #[test]
    fn test_quick_select_press_is_short_press() {
        let mut debouncer = Debouncer::default();
        let mut out = Events::new();

        drive(&mut debouncer, pressed(ButtonId::Select), 0, 60, 10, &mut out);
        drive(&mut debouncer, [false; BUTTON_COUNT], 60, 200, 10, &mut out);

        assert_eq!(count(&out, EventType::ButtonPress), 1);
        assert_eq!(count(&out, EventType::ButtonLongPress), 0);
        assert_eq!(count(&out, EventType::ButtonRelease), 1);
        assert!(out[0].is_button(ButtonAction::ShortPress, ButtonId::Select));
        assert!(out[1].is_button(ButtonAction::Release, ButtonId::Select));
    }

    #[test]
    fn test_hold_just_past_debounce() {
        let timing = ButtonTiming::default();
        let mut debouncer = Debouncer::default();
        let mut out = Events::new();

        drive(&mut debouncer, pressed(ButtonId::Up), 0, timing.debounce_ms + 1, 1, &mut out);
        drive(&mut debouncer, [false; BUTTON_COUNT], timing.debounce_ms + 1, 200, 1, &mut out);

        let types: heapless::Vec<EventType, 8> = out.iter().map(|e| e.event_type).collect();
        assert_eq!(
            types.as_slice(),
            &[EventType::ButtonPress, EventType::ButtonRelease]
        );
    }

    #[test]
    fn test_dropout_while_held_keeps_press() {
        let timing = ButtonTiming::default();
        let mut debouncer = Debouncer::default();
        let mut out = Events::new();
        let idle = [false; BUTTON_COUNT];
        let select = pressed(ButtonId::Select);
        let dropout = timing.debounce_ms / 2;

        // Short press with a contact bounce in the middle
        drive(&mut debouncer, select, 0, 100, 1, &mut out);
        drive(&mut debouncer, idle, 100, 100 + dropout, 1, &mut out);
        assert!(debouncer.is_pressed(ButtonId::Select));
        drive(&mut debouncer, select, 100 + dropout, 300, 1, &mut out);
        drive(&mut debouncer, idle, 300, 400, 1, &mut out);

        let types: heapless::Vec<EventType, 8> = out.iter().map(|e| e.event_type).collect();
        assert_eq!(
            types.as_slice(),
            &[EventType::ButtonPress, EventType::ButtonRelease]
        );

        // Same bounce after the long-press threshold
        out.clear();
        let start = 1000;
        let bounce = start + timing.long_press_ms + 50;
        drive(&mut debouncer, select, start, bounce, 1, &mut out);
        drive(&mut debouncer, idle, bounce, bounce + dropout, 1, &mut out);
        drive(&mut debouncer, select, bounce + dropout, bounce + 200, 1, &mut out);
        drive(&mut debouncer, idle, bounce + 200, bounce + 300, 1, &mut out);

        let types: heapless::Vec<EventType, 8> = out.iter().map(|e| e.event_type).collect();
        assert_eq!(
            types.as_slice(),
            &[EventType::ButtonLongPress, EventType::ButtonRelease]
        );
    }

    #[test]
    fn test_hold_past_long_press_threshold() {
        let timing = ButtonTiming::default();
        let mut debouncer = Debouncer::default();
        let mut out = Events::new();

        drive(&mut debouncer, pressed(ButtonId::Select), 0, timing.long_press_ms + 1, 1, &mut out);
        assert!(debouncer.is_pressed(ButtonId::Select));
        assert_eq!(debouncer.state(ButtonId::Select), ButtonState::Held);

        drive(&mut debouncer, [false; BUTTON_COUNT], timing.long_press_ms + 1, 900, 1, &mut out);

        assert_eq!(count(&out, EventType::ButtonLongPress), 1);
        assert_eq!(count(&out, EventType::ButtonPress), 0);
        let long = out.iter().position(|e| e.event_type == EventType::ButtonLongPress);
        let release = out.iter().position(|e| e.event_type == EventType::ButtonRelease);
        assert!(long < release);
        assert!(release.is_some());
    }

    #[test]
    fn test_repeat_mask_applies_per_button() {
        let mut debouncer = Debouncer::default();
        let mut out = Events::new();

        let mut raw = [false; BUTTON_COUNT];
        raw[ButtonId::Down.index()] = true;
        raw[ButtonId::Back.index()] = true;
        drive(&mut debouncer, raw, 0, 1550, 10, &mut out);

        let repeats = |button| {
            out.iter()
                .filter(|e| e.is_button(ButtonAction::Repeat, button))
                .count()
        };
        assert_eq!(repeats(ButtonId::Down), 3);
        assert_eq!(repeats(ButtonId::Back), 0);

        debouncer.set_repeat_enabled(ButtonId::Down, false);
        assert!(!debouncer.repeat_mask().contains(ButtonId::Down));
    }

    #[test]
    fn test_events_carry_id_and_hold_time() {
        let mut debouncer = Debouncer::default();
        let mut out = Events::new();

        drive(&mut debouncer, pressed(ButtonId::Left), 0, 150, 10, &mut out);
        drive(&mut debouncer, [false; BUTTON_COUNT], 150, 300, 10, &mut out);

        let release = out
            .iter()
            .find(|e| e.event_type == EventType::ButtonRelease)
            .copied()
            .unwrap();
        assert_eq!(release.data1, ButtonId::Left as u32);
        assert_eq!(release.data2, 150);
        assert_eq!(release.timestamp, 170);
        assert_eq!(debouncer.press_duration(ButtonId::Left, 300), None);
    }

    #[test]
    fn test_poll_into_counts_rejections() {
        let queue: EventQueue<1> = EventQueue::new();
        let mut debouncer = Debouncer::default();

        let mut rejected = 0;
        for now in (0..60).step_by(10) {
            rejected += debouncer.poll_into(pressed(ButtonId::Right), now, &queue);
        }
        for now in (60..200).step_by(10) {
            rejected += debouncer.poll_into([false; BUTTON_COUNT], now, &queue);
        }

        // ShortPress fits, Release does not
        assert_eq!(rejected, 1);
        assert_eq!(queue.dropped_count(), 1);
        assert_eq!(queue.dequeue().map(|e| e.event_type), Some(EventType::ButtonPress));
    }
}
