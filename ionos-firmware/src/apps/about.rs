//! About
//!
//! Device summary with a second screen of timing settings. Select or
//! Right slides to the details; Back returns through the kernel's default
//! back handling.

use core::fmt::Write;

use heapless::String;
use ionos_core::app::{App, AppContext};
use ionos_core::event::{ButtonAction, ButtonId, Event};
use ionos_core::traits::{DisplayBackend, DisplayError, DisplayExt};
use ionos_core::ui::{ScreenId, TransitionKind};
use portable_atomic::Ordering;

use crate::channels::BATTERY_MV;
use crate::config;

const SUMMARY: ScreenId = ScreenId::ROOT;
const DETAILS: ScreenId = ScreenId::new(1);

#[derive(Default)]
pub struct About {
    uptime_ms: u32,
    battery_mv: u32,
}

impl About {
    pub const fn new() -> Self {
        Self {
            uptime_ms: 0,
            battery_mv: 0,
        }
    }

    fn render_summary(&self, display: &mut dyn DisplayBackend) -> Result<(), DisplayError> {
        let mut value: String<16> = String::new();

        let (cols, _) = display.dimensions();
        display.draw_centered(0, "About")?;
        display.draw_hline(0, 0, cols)?;
        display.draw_text(1, 0, config::DEVICE_NAME)?;
        display.draw_field(2, "Version", env!("CARGO_PKG_VERSION"))?;

        let secs = self.uptime_ms / 1000;
        write!(value, "{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
            .map_err(|_| DisplayError::BufferOverflow)?;
        display.draw_field(3, "Uptime", &value)?;

        value.clear();
        if self.battery_mv == 0 {
            let _ = value.push_str("--");
        } else {
            write!(value, "{} mV", self.battery_mv).map_err(|_| DisplayError::BufferOverflow)?;
        }
        display.draw_field(4, "Battery", &value)?;

        display.draw_text(7, 0, "Select: details")
    }

    fn render_details(&self, display: &mut dyn DisplayBackend) -> Result<(), DisplayError> {
        let rows: [(&str, u32); 5] = [
            ("Tick", config::TICK_MS),
            ("Debounce", config::DEBOUNCE_MS),
            ("Long press", config::LONG_PRESS_MS),
            ("Repeat", config::REPEAT_RATE_MS),
            ("Transition", config::TRANSITION_MS),
        ];

        let (cols, _) = display.dimensions();
        display.draw_centered(0, "Timing (ms)")?;
        display.draw_hline(0, 0, cols)?;

        let mut value: String<12> = String::new();
        for (row, (label, ms)) in (1u8..).zip(rows) {
            value.clear();
            write!(value, "{}", ms).map_err(|_| DisplayError::BufferOverflow)?;
            display.draw_field(row, label, &value)?;
        }
        Ok(())
    }
}

impl App for About {
    fn name(&self) -> &str {
        "About"
    }

    fn on_launch(&mut self) {}

    fn on_close(&mut self) {}

    fn on_event(&mut self, event: &Event, ctx: &mut AppContext<'_>) {
        if ctx.screen() != SUMMARY {
            return;
        }
        if event.is_button(ButtonAction::ShortPress, ButtonId::Select)
            || event.is_button(ButtonAction::ShortPress, ButtonId::Right)
        {
            ctx.navigate_to(DETAILS, TransitionKind::SlideLeft);
        }
    }

    fn update(&mut self, ctx: &mut AppContext<'_>) {
        self.uptime_ms = ctx.now_ms();
        self.battery_mv = BATTERY_MV.load(Ordering::Relaxed);
    }

    fn render(
        &mut self,
        display: &mut dyn DisplayBackend,
        screen: ScreenId,
    ) -> Result<(), DisplayError> {
        if screen == DETAILS {
            self.render_details(display)
        } else {
            self.render_summary(display)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ionos_core::app::{AppId, AppRequest, RequestQueue};
    use ionos_display::Screen;

    #[test]
    fn test_select_opens_details() {
        let mut about = About::new();
        let mut requests = RequestQueue::new();
        let mut ctx = AppContext::new(AppId::new(1), 0, SUMMARY, false, &mut requests);

        about.on_event(&Event::button(ButtonAction::ShortPress, ButtonId::Select, 0), &mut ctx);

        assert_eq!(
            requests.as_slice(),
            &[(AppId::new(1), AppRequest::Navigate(DETAILS, TransitionKind::SlideLeft))]
        );
    }

    #[test]
    fn test_no_navigation_from_details() {
        let mut about = About::new();
        let mut requests = RequestQueue::new();
        let mut ctx = AppContext::new(AppId::new(1), 0, DETAILS, true, &mut requests);

        about.on_event(&Event::button(ButtonAction::ShortPress, ButtonId::Select, 0), &mut ctx);
        assert!(requests.is_empty());
    }

    #[test]
    fn test_summary_shows_uptime() {
        let mut about = About::new();
        about.uptime_ms = 3_723_000;

        let mut screen = Screen::new();
        about.render(&mut screen, SUMMARY).unwrap();
        screen.present().unwrap();

        assert!(screen.contains("1:02:03"));
        assert!(screen.contains("--"));
    }
}
