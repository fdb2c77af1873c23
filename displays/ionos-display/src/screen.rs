//! Screen buffer types
//!
//! Provides a double-buffered character display. Drawing goes to the back
//! buffer; `present` copies it to the front buffer, which is what a viewer
//! (or a test) sees.

use heapless::String;

use crate::backend::{DisplayBackend, DisplayError, Viewport};

/// Number of character rows (128x64 panel, 6x8 font)
pub const SCREEN_ROWS: usize = 8;

/// Number of character columns (128x64 panel, 6x8 font)
pub const SCREEN_COLS: usize = 21;

/// Bytes per line: a full row of four-byte UTF-8 characters
pub const LINE_LEN: usize = SCREEN_COLS * 4;

type Lines = [String<LINE_LEN>; SCREEN_ROWS];
type Highlights = [Option<(u8, u8)>; SCREEN_ROWS];

/// Text-mode screen buffer
///
/// Implements [`DisplayBackend`] entirely in memory.
#[derive(Clone)]
pub struct Screen {
    /// Content being drawn this frame
    back: Lines,
    /// Selection/highlight state per row being drawn (start_col, end_col)
    back_highlights: Highlights,
    /// Content last committed by `present`
    front: Lines,
    /// Highlights last committed by `present`
    front_highlights: Highlights,
    /// Viewport applied to the last committed frame
    viewport: Viewport,
    pending_viewport: Viewport,
    /// Whether the back buffer differs from what was last presented
    dirty: bool,
    /// Number of frames committed so far
    frames: u32,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    /// Create a new empty screen
    pub fn new() -> Self {
        Self {
            back: core::array::from_fn(|_| String::new()),
            back_highlights: [None; SCREEN_ROWS],
            front: core::array::from_fn(|_| String::new()),
            front_highlights: [None; SCREEN_ROWS],
            viewport: Viewport::IDENTITY,
            pending_viewport: Viewport::IDENTITY,
            dirty: true,
            frames: 0,
        }
    }

    /// Write text into a back-buffer row starting at `col`
    ///
    /// Characters already on the row before `col` are kept, gaps are padded
    /// with spaces and anything past the last column is dropped.
    pub fn set_text(&mut self, row: usize, col: usize, text: &str) -> Result<(), DisplayError> {
        if row >= SCREEN_ROWS || col >= SCREEN_COLS {
            return Err(DisplayError::InvalidCoordinates);
        }

        let existing = &self.back[row];
        let room = SCREEN_COLS - col;
        let prefix = existing.chars().take(col);
        let padding = core::iter::repeat(' ').take(col.saturating_sub(existing.chars().count()));
        let written = text.chars().take(room);
        let suffix = existing.chars().skip(col + text.chars().count().min(room));

        let mut merged: String<LINE_LEN> = String::new();
        for ch in prefix.chain(padding).chain(written).chain(suffix) {
            merged.push(ch).map_err(|_| DisplayError::BufferOverflow)?;
        }

        self.back[row] = merged;
        self.dirty = true;
        Ok(())
    }

    /// Get the committed content of a specific row
    pub fn get_line(&self, row: usize) -> Option<&str> {
        self.front.get(row).map(|s| s.as_str())
    }

    /// Get the in-progress (not yet presented) content of a row
    pub fn pending_line(&self, row: usize) -> Option<&str> {
        self.back.get(row).map(|s| s.as_str())
    }

    /// Get the committed highlight region for a row
    pub fn get_highlight(&self, row: usize) -> Option<(u8, u8)> {
        self.front_highlights.get(row).copied().flatten()
    }

    /// Check if the back buffer has changes not yet presented
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of frames committed via `present`
    pub fn frames_presented(&self) -> u32 {
        self.frames
    }

    /// Viewport that was applied to the last committed frame
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Get all committed lines as an iterator
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.front.iter().map(|s| s.as_str())
    }

    /// Check if any committed row contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().any(|line| line.contains(needle))
    }

    /// Get the current selection/highlight (first highlighted committed row)
    ///
    /// Returns (row, start_col, end_col) if any row is highlighted.
    pub fn selection(&self) -> Option<(u8, u8, u8)> {
        for (row, highlight) in self.front_highlights.iter().enumerate() {
            if let Some((start, end)) = highlight {
                return Some((row as u8, *start, *end));
            }
        }
        None
    }
}

impl DisplayBackend for Screen {
    fn clear(&mut self) -> Result<(), DisplayError> {
        for line in &mut self.back {
            line.clear();
        }
        for highlight in &mut self.back_highlights {
            *highlight = None;
        }
        self.dirty = true;
        Ok(())
    }

    fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        self.set_text(row as usize, col as usize, text)
    }

    fn invert_region(&mut self, row: u8, start_col: u8, end_col: u8) -> Result<(), DisplayError> {
        let row = row as usize;
        if row >= SCREEN_ROWS || start_col > end_col || end_col as usize > SCREEN_COLS {
            return Err(DisplayError::InvalidCoordinates);
        }
        self.back_highlights[row] = Some((start_col, end_col));
        self.dirty = true;
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.pending_viewport = viewport;
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        self.front.clone_from(&self.back);
        self.front_highlights = self.back_highlights;
        self.viewport = self.pending_viewport;
        self.dirty = false;
        self.frames = self.frames.wrapping_add(1);
        Ok(())
    }

    fn dimensions(&self) -> (u8, u8) {
        (SCREEN_COLS as u8, SCREEN_ROWS as u8)
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Screen {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Screen[");
        for (i, line) in self.front.iter().enumerate() {
            if i > 0 {
                defmt::write!(f, ", ");
            }
            defmt::write!(f, "{}", line.as_str());
        }
        defmt::write!(f, "]");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DisplayExt;

    #[test]
    fn test_draw_is_invisible_until_present() {
        let mut screen = Screen::new();
        screen.draw_text(0, 0, "Hello").unwrap();

        assert_eq!(screen.get_line(0), Some(""));
        assert_eq!(screen.pending_line(0), Some("Hello"));
        assert!(screen.is_dirty());

        screen.present().unwrap();
        assert_eq!(screen.get_line(0), Some("Hello"));
        assert_eq!(screen.frames_presented(), 1);
        assert!(!screen.is_dirty());
    }

    #[test]
    fn test_text_at_column_keeps_prefix() {
        let mut screen = Screen::new();
        screen.draw_text(1, 0, "abcdef").unwrap();
        screen.draw_text(1, 2, "XY").unwrap();
        screen.draw_text(2, 3, "pad").unwrap();
        screen.present().unwrap();

        assert_eq!(screen.get_line(1), Some("abXYef"));
        assert_eq!(screen.get_line(2), Some("   pad"));
    }

    #[test]
    fn test_text_clipped_at_right_edge() {
        let mut screen = Screen::new();
        screen.draw_text(0, 18, "123456").unwrap();
        screen.present().unwrap();

        assert_eq!(screen.get_line(0).map(|l| l.len()), Some(SCREEN_COLS));
        assert!(screen.get_line(0).unwrap().ends_with("123"));
    }

    #[test]
    fn test_accented_text_fills_the_row() {
        let mut screen = Screen::new();
        screen.draw_text(3, 0, "ééééééééééééééééééééééééé").unwrap();
        screen.draw_text(3, 1, "ok").unwrap();
        screen.present().unwrap();

        let line = screen.get_line(3).unwrap();
        assert_eq!(line.chars().count(), SCREEN_COLS);
        assert!(line.starts_with("éoké"));
        assert!(line.ends_with("éé"));
    }

    #[test]
    fn test_out_of_range_row_rejected() {
        let mut screen = Screen::new();
        assert_eq!(
            screen.draw_text(SCREEN_ROWS as u8, 0, "x"),
            Err(DisplayError::InvalidCoordinates)
        );
        assert_eq!(
            screen.invert_region(0, 5, 2),
            Err(DisplayError::InvalidCoordinates)
        );
    }

    #[test]
    fn test_clear_only_affects_back_buffer() {
        let mut screen = Screen::new();
        screen.draw_text(0, 0, "kept").unwrap();
        screen.present().unwrap();

        screen.clear().unwrap();
        assert!(screen.contains("kept"));

        screen.present().unwrap();
        assert!(!screen.contains("kept"));
    }

    #[test]
    fn test_menu_item_highlight() {
        let mut screen = Screen::new();
        screen.draw_menu_item(2, "Clock", true).unwrap();
        screen.draw_menu_item(3, "Music", false).unwrap();
        screen.present().unwrap();

        assert_eq!(screen.get_line(2), Some("> Clock"));
        assert_eq!(screen.get_line(3), Some("  Music"));
        assert_eq!(screen.selection(), Some((2, 0, SCREEN_COLS as u8)));
    }

    #[test]
    fn test_viewport_committed_with_frame() {
        let mut screen = Screen::new();
        let shifted = Viewport {
            offset_x: -40,
            ..Viewport::IDENTITY
        };
        screen.set_viewport(shifted);
        assert!(screen.viewport().is_identity());

        screen.present().unwrap();
        assert_eq!(screen.viewport(), shifted);
    }

    #[test]
    fn test_centered_text() {
        let mut screen = Screen::new();
        screen.draw_centered(0, "abc").unwrap();
        screen.present().unwrap();
        assert_eq!(screen.get_line(0), Some("         abc"));
    }
}
