//! Monochrome frame buffer
//!
//! Pixels are stored the way the SH1106 expects them: eight pages of
//! 128 columns, one byte per column holding eight vertical pixels (LSB on
//! top). `embedded-graphics` draws into it through [`DrawTarget`].

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use ionos_display::Viewport;

/// Panel width in pixels
pub const WIDTH: usize = 128;
/// Panel height in pixels
pub const HEIGHT: usize = 64;
/// Number of 8-pixel pages
pub const PAGES: usize = HEIGHT / 8;

/// 4x4 ordered-dither thresholds used to fade frames
const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pages: [[u8; WIDTH]; PAGES],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            pages: [[0; WIDTH]; PAGES],
        }
    }

    pub fn clear(&mut self) {
        for page in self.pages.iter_mut() {
            page.fill(0);
        }
    }

    /// Raw bytes of one page
    pub fn page(&self, page: usize) -> &[u8; WIDTH] {
        &self.pages[page]
    }

    /// Read a pixel; anything off-panel reads as unlit
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        if !Self::in_bounds(x, y) {
            return false;
        }
        self.pages[y as usize / 8][x as usize] & (1 << (y % 8)) != 0
    }

    /// Write a pixel; anything off-panel is clipped
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if !Self::in_bounds(x, y) {
            return;
        }
        let byte = &mut self.pages[y as usize / 8][x as usize];
        let mask = 1 << (y % 8);
        if on {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }

    /// Invert every pixel of the rectangle `[x0, x1) x [y0, y1)`
    pub fn invert_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        for y in y0.max(0)..y1.min(HEIGHT as i32) {
            for x in x0.max(0)..x1.min(WIDTH as i32) {
                let on = self.pixel(x, y);
                self.set_pixel(x, y, !on);
            }
        }
    }

    /// Render `src` into `self` as seen through `viewport`
    ///
    /// Scaling is nearest-neighbour about the panel centre, offset is
    /// applied after scaling, and opacity is an ordered dither.
    pub fn compose(&mut self, src: &FrameBuffer, viewport: Viewport) {
        if viewport.is_identity() {
            self.pages = src.pages;
            return;
        }

        let scale = i32::from(viewport.scale_pct.max(1));
        let cx = WIDTH as i32 / 2;
        let cy = HEIGHT as i32 / 2;

        for y in 0..HEIGHT as i32 {
            for x in 0..WIDTH as i32 {
                let dx = x - i32::from(viewport.offset_x) - cx;
                let dy = y - i32::from(viewport.offset_y) - cy;
                let sx = cx + dx * 100 / scale;
                let sy = cy + dy * 100 / scale;

                let threshold = BAYER_4X4[(y % 4) as usize][(x % 4) as usize] * 16 + 8;
                let on = src.pixel(sx, sy) && viewport.opacity > threshold;
                self.set_pixel(x, y, on);
            }
        }
    }

    fn in_bounds(x: i32, y: i32) -> bool {
        (0..WIDTH as i32).contains(&x) && (0..HEIGHT as i32).contains(&y)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.is_on());
        }
        Ok(())
    }
}
