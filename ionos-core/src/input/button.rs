//! Per-button debounce and hold state machine

use crate::config::ButtonTiming;
use crate::event::{ButtonAction, ButtonId};

/// Debounced button state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonState {
    #[default]
    Released,
    /// Accepted press, not yet past the long-press threshold
    Pressed,
    /// Past the long-press threshold
    Held,
}

/// One physical button
///
/// Times are milliseconds from a free-running counter; every comparison
/// uses wrapping arithmetic so the counter may overflow.
#[derive(Debug, Clone, Copy)]
pub struct Button {
    id: ButtonId,
    /// Last raw sample
    raw: bool,
    /// When the raw sample last changed
    raw_changed_at: u32,
    /// Accepted (debounced) level
    stable: bool,
    state: ButtonState,
    /// Raw edge that started the current press
    press_start: u32,
    /// When the accepted level last changed
    last_stable: u32,
    next_repeat_at: u32,
}

impl Button {
    pub const fn new(id: ButtonId) -> Self {
        Self {
            id,
            raw: false,
            raw_changed_at: 0,
            stable: false,
            state: ButtonState::Released,
            press_start: 0,
            last_stable: 0,
            next_repeat_at: 0,
        }
    }

    pub fn id(&self) -> ButtonId {
        self.id
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    pub fn is_pressed(&self) -> bool {
        self.state != ButtonState::Released
    }

    /// Time the accepted level last changed
    pub fn last_stable_time(&self) -> u32 {
        self.last_stable
    }

    /// How long the current press has lasted
    pub fn press_duration(&self, now: u32) -> Option<u32> {
        self.is_pressed()
            .then(|| now.wrapping_sub(self.press_start))
    }

    /// Feed one raw sample
    ///
    /// `emit` receives each resulting action with the hold time in ms.
    /// A release from `Pressed` yields `ShortPress` then `Release`; a
    /// release from `Held` yields only `Release`.
    pub fn sample(
        &mut self,
        raw: bool,
        now: u32,
        timing: &ButtonTiming,
        repeat: bool,
        mut emit: impl FnMut(ButtonAction, u32),
    ) {
        if raw != self.raw {
            self.raw = raw;
            self.raw_changed_at = now;
        }

        if self.raw != self.stable && now.wrapping_sub(self.raw_changed_at) >= timing.debounce_ms {
            self.stable = self.raw;
            self.last_stable = now;

            if self.stable {
                self.state = ButtonState::Pressed;
                self.press_start = self.raw_changed_at;
            } else {
                let held = self.raw_changed_at.wrapping_sub(self.press_start);
                match self.state {
                    ButtonState::Pressed => {
                        emit(ButtonAction::ShortPress, held);
                        emit(ButtonAction::Release, held);
                    }
                    ButtonState::Held => emit(ButtonAction::Release, held),
                    ButtonState::Released => {}
                }
                self.state = ButtonState::Released;
            }
        }

        match self.state {
            ButtonState::Pressed => {
                let held = now.wrapping_sub(self.press_start);
                if held >= timing.long_press_ms {
                    self.state = ButtonState::Held;
                    self.next_repeat_at = now.wrapping_add(timing.repeat_delay_ms);
                    emit(ButtonAction::LongPress, held);
                }
            }
            ButtonState::Held if repeat && reached(now, self.next_repeat_at) => {
                self.next_repeat_at = self.next_repeat_at.wrapping_add(timing.repeat_rate_ms);
                // Resync after a stall instead of bursting
                if reached(now, self.next_repeat_at) {
                    self.next_repeat_at = now.wrapping_add(timing.repeat_rate_ms);
                }
                emit(ButtonAction::Repeat, now.wrapping_sub(self.press_start));
            }
            _ => {}
        }
    }

    /// Forget any press in progress
    pub fn reset(&mut self) {
        *self = Self::new(self.id);
    }
}

fn reached(now: u32, deadline: u32) -> bool {
    (now.wrapping_sub(deadline) as i32) >= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(
        button: &mut Button,
        raw: bool,
        from: u32,
        to: u32,
        out: &mut heapless::Vec<ButtonAction, 64>,
    ) {
        let timing = ButtonTiming::default();
        for now in from..to {
            button.sample(raw, now, &timing, true, |action, _| {
                let _ = out.push(action);
            });
        }
    }

    #[test]
    fn test_glitch_shorter_than_debounce_ignored() {
        let mut button = Button::new(ButtonId::Up);
        let mut out = heapless::Vec::new();

        run(&mut button, true, 0, 10, &mut out);
        run(&mut button, false, 10, 100, &mut out);

        assert!(out.is_empty());
        assert_eq!(button.state(), ButtonState::Released);
    }

    #[test]
    fn test_bounce_restarts_debounce_timer() {
        let mut button = Button::new(ButtonId::Up);
        let mut out = heapless::Vec::new();

        run(&mut button, true, 0, 15, &mut out);
        run(&mut button, false, 15, 16, &mut out);
        run(&mut button, true, 16, 35, &mut out);
        assert!(!button.is_pressed());

        run(&mut button, true, 35, 37, &mut out);
        assert!(button.is_pressed());
        assert_eq!(button.press_duration(40), Some(24));
    }

    #[test]
    fn test_long_press_then_repeat() {
        let mut button = Button::new(ButtonId::Down);
        let mut out = heapless::Vec::new();

        // Long press at 800, first repeat 500 later, then every 100
        run(&mut button, true, 0, 1450, &mut out);
        assert_eq!(
            out.as_slice(),
            &[
                ButtonAction::LongPress,
                ButtonAction::Repeat,
                ButtonAction::Repeat
            ]
        );
        assert_eq!(button.state(), ButtonState::Held);

        out.clear();
        run(&mut button, false, 1450, 1550, &mut out);
        assert_eq!(out.as_slice(), &[ButtonAction::Release]);
    }

    #[test]
    fn test_repeat_suppressed_when_disabled() {
        let timing = ButtonTiming::default();
        let mut button = Button::new(ButtonId::Select);
        let mut count = 0;

        for now in 0..3000 {
            button.sample(true, now, &timing, false, |_, _| count += 1);
        }
        assert_eq!(count, 1);
    }

    #[test]
    fn test_counter_wrap() {
        let timing = ButtonTiming::default();
        let mut button = Button::new(ButtonId::Back);
        let mut actions: heapless::Vec<(ButtonAction, u32), 4> = heapless::Vec::new();
        let start = u32::MAX - 30;

        for step in 0..60u32 {
            button.sample(true, start.wrapping_add(step), &timing, false, |a, held| {
                let _ = actions.push((a, held));
            });
        }
        assert!(button.is_pressed());
        for step in 60..100u32 {
            button.sample(false, start.wrapping_add(step), &timing, false, |a, held| {
                let _ = actions.push((a, held));
            });
        }

        assert_eq!(
            actions.as_slice(),
            &[(ButtonAction::ShortPress, 60), (ButtonAction::Release, 60)]
        );
    }
}
