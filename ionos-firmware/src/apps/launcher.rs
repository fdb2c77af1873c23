//! Launcher
//!
//! Root application: a scrolling list of the other applications. Select
//! launches the highlighted entry.

use heapless::Vec;
use ionos_core::app::{App, AppContext, AppId};
use ionos_core::config::MAX_APPS;
use ionos_core::event::{ButtonAction, ButtonId, Event};
use ionos_core::traits::{DisplayBackend, DisplayError, DisplayExt};
use ionos_core::ui::ScreenId;

const TITLE: &str = "ionOS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LauncherEntry {
    pub id: AppId,
    pub name: &'static str,
}

pub struct Launcher {
    entries: Vec<LauncherEntry, MAX_APPS>,
    selected: usize,
    /// First entry shown on screen
    top: usize,
    low_battery: bool,
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            selected: 0,
            top: 0,
            low_battery: false,
        }
    }

    /// Add a menu entry; fails when the menu is full
    pub fn add(&mut self, id: AppId, name: &'static str) -> Result<(), LauncherEntry> {
        self.entries.push(LauncherEntry { id, name })
    }

    pub fn selected(&self) -> Option<&LauncherEntry> {
        self.entries.get(self.selected)
    }

    fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn select_next(&mut self) {
        if self.selected + 1 < self.entries.len() {
            self.selected += 1;
        }
    }

    /// Keep the selection inside a window of `visible` rows
    fn scroll_to_selection(&mut self, visible: usize) {
        if visible == 0 {
            return;
        }
        if self.selected < self.top {
            self.top = self.selected;
        } else if self.selected >= self.top + visible {
            self.top = self.selected + 1 - visible;
        }
    }
}

impl App for Launcher {
    fn name(&self) -> &str {
        "Launcher"
    }

    fn on_launch(&mut self) {
        self.selected = 0;
        self.top = 0;
    }

    fn on_close(&mut self) {}

    fn on_event(&mut self, event: &Event, ctx: &mut AppContext<'_>) {
        let (Some(action), Some(button)) = (event.button_action(), event.button_id()) else {
            return;
        };
        match (action, button) {
            (ButtonAction::ShortPress | ButtonAction::Repeat, ButtonId::Up) => {
                self.select_previous()
            }
            (ButtonAction::ShortPress | ButtonAction::Repeat, ButtonId::Down) => {
                self.select_next()
            }
            (ButtonAction::ShortPress, ButtonId::Select | ButtonId::Right) => {
                if let Some(entry) = self.selected().copied() {
                    ctx.launch(entry.id);
                }
            }
            _ => {}
        }
    }

    fn update(&mut self, ctx: &mut AppContext<'_>) {
        self.low_battery = ctx.is_battery_low();
    }

    fn render(
        &mut self,
        display: &mut dyn DisplayBackend,
        _screen: ScreenId,
    ) -> Result<(), DisplayError> {
        let (cols, rows) = display.dimensions();

        display.draw_centered(0, TITLE)?;
        if self.low_battery {
            display.draw_text(0, cols - 1, "!")?;
        }
        display.draw_hline(0, 0, cols)?;

        if self.entries.is_empty() {
            return display.draw_centered(rows / 2, "No apps");
        }

        let visible = usize::from(rows.saturating_sub(1));
        self.scroll_to_selection(visible);

        for (row, (index, entry)) in (1..rows).zip(self.entries.iter().enumerate().skip(self.top)) {
            display.draw_menu_item(row, entry.name, index == self.selected)?;
        }
        Ok(())
    }

    /// Nothing to go back to from the root menu
    fn handle_back_button(&mut self, _ctx: &mut AppContext<'_>) -> bool {
        true
    }
}
