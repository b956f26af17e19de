//! Monochrome canvas and rasterization seam
//!
//! `MonoCanvas` is the 1-bit frame the panel scheduler composes into: white
//! background, black ink, packed row-major MSB-first for the panel driver.
//! Text drawing goes through the `Rasterizer` trait so the font pipeline is
//! swappable; the built-in `BlockRasterizer` marks occupied cells, which is
//! enough for the demo backend and for tests.

use serde::Deserialize;

use crate::core::ScreenSnapshot;

/// Pixel rectangle, origin top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

/// Clockwise display-mount rotation applied to the finished frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    None,
    Cw90,
    Cw180,
    #[default]
    Cw270,
}

/// 1-bit frame buffer. Pixels default to white (off); ink is black (on).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonoCanvas {
    width: usize,
    height: usize,
    ink: Vec<bool>,
}

impl MonoCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ink: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Set a single pixel; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        if x < self.width && y < self.height {
            self.ink[y * self.width + x] = on;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.ink[y * self.width + x]
    }

    /// Fill a rectangle with ink.
    pub fn fill_rect(&mut self, rect: Rect) {
        for y in rect.y..rect.y + rect.h {
            for x in rect.x..rect.x + rect.w {
                self.set(x, y, true);
            }
        }
    }

    /// Draw a 1-pixel rectangle outline (the cursor marker).
    pub fn outline_rect(&mut self, rect: Rect) {
        if rect.w == 0 || rect.h == 0 {
            return;
        }
        for x in rect.x..rect.x + rect.w {
            self.set(x, rect.y, true);
            self.set(x, rect.y + rect.h - 1, true);
        }
        for y in rect.y..rect.y + rect.h {
            self.set(rect.x, y, true);
            self.set(rect.x + rect.w - 1, y, true);
        }
    }

    /// Return a copy rotated clockwise by the mount rotation.
    pub fn rotated(&self, rotation: Rotation) -> MonoCanvas {
        match rotation {
            Rotation::None => self.clone(),
            Rotation::Cw90 => {
                let mut out = MonoCanvas::new(self.height, self.width);
                for y in 0..self.height {
                    for x in 0..self.width {
                        out.set(self.height - 1 - y, x, self.get(x, y));
                    }
                }
                out
            }
            Rotation::Cw180 => {
                let mut out = MonoCanvas::new(self.width, self.height);
                for y in 0..self.height {
                    for x in 0..self.width {
                        out.set(self.width - 1 - x, self.height - 1 - y, self.get(x, y));
                    }
                }
                out
            }
            Rotation::Cw270 => {
                let mut out = MonoCanvas::new(self.height, self.width);
                for y in 0..self.height {
                    for x in 0..self.width {
                        out.set(y, self.width - 1 - x, self.get(x, y));
                    }
                }
                out
            }
        }
    }

    /// Pack into panel wire format: row-major, 8 pixels per byte, MSB first,
    /// 1 = white, 0 = black, rows padded to a whole byte.
    pub fn packed(&self) -> Vec<u8> {
        let stride = (self.width + 7) / 8;
        let mut out = vec![0xFFu8; stride * self.height];
        for y in 0..self.height {
            for x in 0..self.width {
                if self.ink[y * self.width + x] {
                    out[y * stride + x / 8] &= !(0x80 >> (x % 8));
                }
            }
        }
        out
    }
}

/// Draws snapshot text onto a canvas and locates character cells in pixels.
pub trait Rasterizer: Send {
    /// Draw every line of the snapshot onto the canvas.
    fn render(&self, snapshot: &ScreenSnapshot, canvas: &mut MonoCanvas);

    /// Pixel rectangle covering the character cell at `(row, col)`, used for
    /// the cursor outline.
    fn cell_rect(&self, row: u16, col: u16) -> Rect;
}

/// Coarse rasterizer that inks the cell block of every non-blank character.
///
/// A stand-in for a proper glyph rasterizer: cell geometry and the cursor
/// marker are real, glyph shapes are not.
pub struct BlockRasterizer {
    cell_width: usize,
    cell_height: usize,
    origin_x: usize,
}

impl BlockRasterizer {
    pub fn new(cell_width: usize, cell_height: usize, origin_x: usize) -> Self {
        Self {
            cell_width,
            cell_height,
            origin_x,
        }
    }
}

impl Rasterizer for BlockRasterizer {
    fn render(&self, snapshot: &ScreenSnapshot, canvas: &mut MonoCanvas) {
        for (row, line) in snapshot.lines.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch != ' ' {
                    let rect = self.cell_rect(row as u16, col as u16);
                    // Leave a 1px gap so adjacent cells stay distinguishable.
                    canvas.fill_rect(Rect {
                        x: rect.x,
                        y: rect.y + 1,
                        w: rect.w.saturating_sub(1),
                        h: rect.h.saturating_sub(2),
                    });
                }
            }
        }
    }

    fn cell_rect(&self, row: u16, col: u16) -> Rect {
        Rect {
            x: self.origin_x + col as usize * self.cell_width,
            y: row as usize * self.cell_height,
            w: self.cell_width,
            h: self.cell_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut canvas = MonoCanvas::new(10, 5);
        assert!(!canvas.get(3, 2));
        canvas.set(3, 2, true);
        assert!(canvas.get(3, 2));
        // Out of bounds is a no-op.
        canvas.set(100, 100, true);
        assert!(!canvas.get(100, 100));
    }

    #[test]
    fn test_outline_rect() {
        let mut canvas = MonoCanvas::new(10, 10);
        canvas.outline_rect(Rect { x: 2, y: 2, w: 4, h: 3 });
        assert!(canvas.get(2, 2));
        assert!(canvas.get(5, 2));
        assert!(canvas.get(2, 4));
        assert!(canvas.get(5, 4));
        // Interior stays white.
        assert!(!canvas.get(3, 3));
    }

    #[test]
    fn test_rotation_dimensions() {
        let canvas = MonoCanvas::new(8, 4);
        assert_eq!(canvas.rotated(Rotation::None).width(), 8);
        let r = canvas.rotated(Rotation::Cw270);
        assert_eq!((r.width(), r.height()), (4, 8));
    }

    #[test]
    fn test_rotation_cw270_moves_pixels() {
        let mut canvas = MonoCanvas::new(4, 2);
        canvas.set(3, 0, true);
        let r = canvas.rotated(Rotation::Cw270);
        // (x, y) -> (y, w - 1 - x)
        assert!(r.get(0, 0));
    }

    #[test]
    fn test_packed_is_white_by_default() {
        let canvas = MonoCanvas::new(8, 2);
        assert_eq!(canvas.packed(), vec![0xFF, 0xFF]);
    }

    #[test]
    fn test_packed_ink_clears_bit() {
        let mut canvas = MonoCanvas::new(8, 1);
        canvas.set(0, 0, true);
        assert_eq!(canvas.packed(), vec![0x7F]);
    }

    #[test]
    fn test_packed_row_padding() {
        let canvas = MonoCanvas::new(10, 2);
        // 10 pixels pack into 2 bytes per row.
        assert_eq!(canvas.packed().len(), 4);
    }

    #[test]
    fn test_block_rasterizer_cell_rect() {
        let raster = BlockRasterizer::new(9, 18, 14);
        let rect = raster.cell_rect(2, 3);
        assert_eq!(rect, Rect { x: 14 + 27, y: 36, w: 9, h: 18 });
    }
}
