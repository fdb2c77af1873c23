//! Display backend for the OLED panel
//!
//! Text is laid out on a 21x8 grid of 6x8 pixel cells. `present` composes
//! the back buffer through the current viewport and hands the result to
//! the display task, so the kernel tick never waits on I2C.

use embedded_graphics::mono_font::ascii::FONT_5X8;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::{Baseline, Text};
use ionos_display::{DisplayBackend, DisplayError, Viewport};
use portable_atomic::Ordering;

use super::framebuffer::{FrameBuffer, HEIGHT, WIDTH};
use crate::channels::{FRAME, PANEL_READY};

/// Character cell size in pixels
const CELL_W: i32 = 6;
const CELL_H: i32 = 8;

/// Text grid size
pub const COLS: u8 = (WIDTH as i32 / CELL_W) as u8;
pub const ROWS: u8 = (HEIGHT as i32 / CELL_H) as u8;

pub struct OledBackend {
    back: FrameBuffer,
    composed: FrameBuffer,
    viewport: Viewport,
}

impl Default for OledBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OledBackend {
    pub const fn new() -> Self {
        Self {
            back: FrameBuffer::new(),
            composed: FrameBuffer::new(),
            viewport: Viewport::IDENTITY,
        }
    }

    fn check(row: u8, col: u8) -> Result<(), DisplayError> {
        if row >= ROWS || col >= COLS {
            return Err(DisplayError::InvalidCoordinates);
        }
        Ok(())
    }
}

impl DisplayBackend for OledBackend {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.back.clear();
        Ok(())
    }

    fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        Self::check(row, col)?;

        let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
        let y = i32::from(row) * CELL_H;
        let mut utf8 = [0u8; 4];

        // One glyph per cell keeps the 6-pixel pitch the grid expects
        for (i, ch) in text.chars().take(usize::from(COLS - col)).enumerate() {
            let x = (i32::from(col) + i as i32) * CELL_W;
            let glyph = ch.encode_utf8(&mut utf8);
            let _ = Text::with_baseline(glyph, Point::new(x, y), style, Baseline::Top)
                .draw(&mut self.back);
        }
        Ok(())
    }

    fn invert_region(&mut self, row: u8, start_col: u8, end_col: u8) -> Result<(), DisplayError> {
        Self::check(row, start_col)?;

        let y = i32::from(row) * CELL_H;
        let end = end_col.min(COLS);
        self.back.invert_rect(
            i32::from(start_col) * CELL_W,
            y,
            i32::from(end) * CELL_W,
            y + CELL_H,
        );
        Ok(())
    }

    fn draw_hline(&mut self, row: u8, start_col: u8, end_col: u8) -> Result<(), DisplayError> {
        Self::check(row, start_col)?;

        let y = i32::from(row) * CELL_H + CELL_H - 1;
        let end = i32::from(end_col.min(COLS)) * CELL_W - 1;
        let _ = Line::new(Point::new(i32::from(start_col) * CELL_W, y), Point::new(end, y))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut self.back);
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        self.composed.compose(&self.back, self.viewport);
        self.viewport = Viewport::IDENTITY;
        FRAME.signal(self.composed.clone());
        Ok(())
    }

    fn dimensions(&self) -> (u8, u8) {
        (COLS, ROWS)
    }

    fn is_ready(&self) -> bool {
        PANEL_READY.load(Ordering::Acquire)
    }
}
