//! Display backend trait
//!
//! Defines the interface between the kernel/applications and the panel.

use core::fmt::{self, Write};

use heapless::String;

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Invalid coordinates or dimensions
    InvalidCoordinates,
    /// Display not initialized
    NotInitialized,
    /// Buffer overflow
    BufferOverflow,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::Communication => write!(f, "display communication error"),
            DisplayError::InvalidCoordinates => write!(f, "invalid display coordinates"),
            DisplayError::NotInitialized => write!(f, "display not initialized"),
            DisplayError::BufferOverflow => write!(f, "display buffer overflow"),
        }
    }
}

/// Placement of the current frame while a screen transition is animating
///
/// The identity viewport (no offset, fully opaque, 100% scale) is used
/// whenever no transition is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Viewport {
    /// Horizontal shift in pixels (negative = left)
    pub offset_x: i16,
    /// Vertical shift in pixels (negative = up)
    pub offset_y: i16,
    /// Opacity, 0 = blank, 255 = fully visible
    pub opacity: u8,
    /// Zoom factor in percent
    pub scale_pct: u8,
}

impl Viewport {
    /// Viewport with no transformation applied
    pub const IDENTITY: Viewport = Viewport {
        offset_x: 0,
        offset_y: 0,
        opacity: 255,
        scale_pct: 100,
    };

    /// Check if this viewport leaves the frame untouched
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Display backend trait
///
/// Provides a hardware-agnostic, object-safe interface for rendering.
/// Applications receive `&mut dyn DisplayBackend` in their render pass.
pub trait DisplayBackend {
    /// Clear the back buffer
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Draw text at the specified row and column
    ///
    /// - `row`: Row number (0-based)
    /// - `col`: Column number in characters (0-based)
    /// - `text`: Text to display, clipped at the right edge
    fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError>;

    /// Invert a region on the specified row (for selection highlighting)
    ///
    /// - `row`: Row number
    /// - `start_col`: Starting column
    /// - `end_col`: Ending column (exclusive)
    fn invert_region(&mut self, row: u8, start_col: u8, end_col: u8) -> Result<(), DisplayError>;

    /// Draw a horizontal rule under the given text row
    ///
    /// Text-only backends may ignore this.
    fn draw_hline(&mut self, _row: u8, _start_col: u8, _end_col: u8) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Set the transition viewport used for the next `present`
    fn set_viewport(&mut self, _viewport: Viewport) {}

    /// Commit the back buffer to the panel
    ///
    /// Called once per tick by the kernel, never by applications.
    fn present(&mut self) -> Result<(), DisplayError>;

    /// Get the display dimensions
    ///
    /// Returns (columns, rows) in character units
    fn dimensions(&self) -> (u8, u8);

    /// Check if the display is ready
    fn is_ready(&self) -> bool;
}

/// Helper trait for drawing common UI elements
pub trait DisplayExt: DisplayBackend {
    /// Draw a menu item, highlighted when selected
    fn draw_menu_item(&mut self, row: u8, text: &str, selected: bool) -> Result<(), DisplayError> {
        let (cols, _) = self.dimensions();
        let marker = if selected { "> " } else { "  " };
        self.draw_text(row, 0, marker)?;
        self.draw_text(row, 2, text)?;
        if selected {
            self.invert_region(row, 0, cols)?;
        }
        Ok(())
    }

    /// Draw text horizontally centered on a row
    fn draw_centered(&mut self, row: u8, text: &str) -> Result<(), DisplayError> {
        let (cols, _) = self.dimensions();
        let len = text.chars().count().min(cols as usize) as u8;
        self.draw_text(row, (cols - len) / 2, text)
    }

    /// Draw a label-value pair, value right-aligned
    fn draw_field(&mut self, row: u8, label: &str, value: &str) -> Result<(), DisplayError> {
        let (cols, _) = self.dimensions();
        let mut line: String<64> = String::new();
        write!(line, "{}:", label).map_err(|_| DisplayError::BufferOverflow)?;
        self.draw_text(row, 0, &line)?;

        let value_len = value.chars().count().min(cols as usize) as u8;
        self.draw_text(row, cols - value_len, value)
    }
}

// Blanket implementation, including trait objects
impl<T: DisplayBackend + ?Sized> DisplayExt for T {}
