// Copyright (c) 2026 rezky_nightky

use crate::canvas::Canvas;
use crate::cell::Cell;
use crate::palette::{Rgb, Rgba};
use crate::runtime::CellSize;

/// Ink within this distance of a fill color is treated as fully faded.
/// Rounding in 8-bit blending would otherwise leave permanent ghosts.
const GHOST_THRESHOLD: u8 = 12;

/// A channel stops moving once it is within `0.5 / alpha` of the fill, so the
/// blanking distance has to grow as the fill gets more transparent.
fn ghost_threshold(alpha: f32) -> u8 {
    let stall = (0.5 / alpha).ceil() + 1.0;
    if stall >= 255.0 {
        return u8::MAX;
    }
    GHOST_THRESHOLD.max(stall as u8)
}

/// A terminal cell raster that behaves like a pixel canvas.
#[derive(Clone, Debug)]
pub struct Frame {
    pub cols: u16,
    pub rows: u16,
    cell: CellSize,
    width_px: u32,
    height_px: u32,
    cells: Vec<Cell>,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width_px: u32, height_px: u32, cell: CellSize) -> Self {
        let mut f = Self {
            cols: 0,
            rows: 0,
            cell,
            width_px: 0,
            height_px: 0,
            cells: Vec::new(),
            dirty_all: true,
            dirty_map: Vec::new(),
            dirty: Vec::new(),
        };
        f.reallocate(width_px, height_px);
        f
    }

    fn reallocate(&mut self, width_px: u32, height_px: u32) {
        let cw = u32::from(self.cell.width.max(1));
        let ch = u32::from(self.cell.height.max(1));
        self.width_px = width_px;
        self.height_px = height_px;
        self.cols = (width_px / cw).min(u32::from(u16::MAX)) as u16;
        self.rows = (height_px / ch).min(u32::from(u16::MAX)) as u16;
        let len = self.cols as usize * self.rows as usize;
        self.cells = vec![Cell::BLANK; len];
        self.dirty_map = vec![false; len];
        self.dirty.clear();
        self.dirty_all = true;
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn has_changes(&self) -> bool {
        self.dirty_all || !self.dirty.is_empty()
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
            self.dirty.clear();
            return;
        }

        for &i in &self.dirty {
            if let Some(v) = self.dirty_map.get_mut(i) {
                *v = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.cols || y >= self.rows {
            return None;
        }
        Some(y as usize * self.cols as usize + x as usize)
    }

    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells.get(i).copied().unwrap_or(Cell::BLANK)
    }

    fn store(&mut self, i: usize, cell: Cell) {
        if self.cells[i] == cell {
            return;
        }
        self.cells[i] = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.store(i, cell);
        }
    }

    /// Cell span covering the pixel interval `[start, start + len)`, clipped.
    fn span(start: f64, len: f64, cell_px: u16, limit: u16) -> (u16, u16) {
        let px = f64::from(cell_px.max(1));
        let lo = (start / px).floor().max(0.0);
        let hi = ((start + len) / px).ceil().min(f64::from(limit));
        if lo >= hi {
            return (0, 0);
        }
        (lo as u16, hi as u16)
    }
}

impl Canvas for Frame {
    fn size(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.reallocate(width, height);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba) {
        if color.alpha.is_nan() || color.alpha <= 0.0 {
            return;
        }
        let threshold = ghost_threshold(color.alpha.min(1.0));
        let (x0, x1) = Self::span(x, width, self.cell.width, self.cols);
        let (y0, y1) = Self::span(y, height, self.cell.height, self.rows);
        for row in y0..y1 {
            for col in x0..x1 {
                let i = row as usize * self.cols as usize + col as usize;
                let cur = self.cells[i];
                if cur.is_blank() {
                    continue;
                }
                let ink = cur.ink.blend(color.rgb, color.alpha);
                let next = if ink.max_channel_diff(color.rgb) <= threshold {
                    Cell::BLANK
                } else {
                    Cell::glyph(cur.ch, ink)
                };
                self.store(i, next);
            }
        }
    }

    fn fill_text(&mut self, glyph: char, x: f64, y: f64, color: Rgb) {
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y <= 0.0 {
            return;
        }
        let col = (x / f64::from(self.cell.width.max(1))).floor();
        let row = (y / f64::from(self.cell.height.max(1))).ceil() - 1.0;
        if col >= f64::from(self.cols) || row < 0.0 || row >= f64::from(self.rows) {
            return;
        }
        self.set(col as u16, row as u16, Cell::glyph(glyph, color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: Rgb = Rgb::new(0, 255, 0);

    fn cells() -> CellSize {
        CellSize {
            width: 8,
            height: 16,
        }
    }

    #[test]
    fn grid_is_derived_from_pixel_size() {
        let f = Frame::new(300, 100, cells());
        assert_eq!((f.cols, f.rows), (37, 6));
        assert_eq!(f.size(), (300, 100));
    }

    #[test]
    fn text_lands_on_the_cell_above_its_baseline() {
        let mut f = Frame::new(80, 64, cells());
        f.fill_text('A', 15.0, 16.0, GREEN);
        f.fill_text('B', 30.0, 17.0, GREEN);
        assert_eq!(f.get(1, 0).unwrap().ch, 'A');
        assert_eq!(f.get(3, 1).unwrap().ch, 'B');
    }

    #[test]
    fn text_outside_the_surface_is_dropped() {
        let mut f = Frame::new(80, 64, cells());
        f.clear_dirty();
        f.fill_text('x', 0.0, 0.0, GREEN);
        f.fill_text('x', 0.0, -40.0, GREEN);
        f.fill_text('x', 0.0, 65.0 + 16.0, GREEN);
        f.fill_text('x', 80.0, 10.0, GREEN);
        assert!(!f.has_changes());
    }

    #[test]
    fn fade_dims_ink_and_eventually_clears() {
        let mut f = Frame::new(16, 16, cells());
        f.fill_text('z', 0.0, 16.0, GREEN);
        let fade = Rgba::new(10, 10, 10, 0.05);

        f.fill_rect(0.0, 0.0, 16.0, 16.0, fade);
        let dimmed = *f.get(0, 0).unwrap();
        assert_eq!(dimmed.ch, 'z');
        assert!(dimmed.ink.g < 255);

        for _ in 0..200 {
            f.fill_rect(0.0, 0.0, 16.0, 16.0, fade);
        }
        assert!(f.get(0, 0).unwrap().is_blank());
    }

    #[test]
    fn faint_fade_still_clears_glyphs() {
        let mut f = Frame::new(16, 16, cells());
        f.fill_text('z', 0.0, 16.0, GREEN);
        let fade = Rgba::new(10, 10, 10, 0.01);

        f.fill_rect(0.0, 0.0, 16.0, 16.0, fade);
        assert_eq!(f.get(0, 0).unwrap().ch, 'z');

        for _ in 0..5000 {
            f.fill_rect(0.0, 0.0, 16.0, 16.0, fade);
        }
        assert!(f.get(0, 0).unwrap().is_blank());
    }

    #[test]
    fn transparent_fill_leaves_ink_alone() {
        let mut f = Frame::new(16, 16, cells());
        f.fill_text('z', 0.0, 16.0, GREEN);
        f.clear_dirty();
        f.fill_rect(0.0, 0.0, 16.0, 16.0, Rgba::new(10, 10, 10, 0.0));
        assert_eq!(*f.get(0, 0).unwrap(), Cell::glyph('z', GREEN));
        assert!(!f.has_changes());
    }

    #[test]
    fn ghost_threshold_tracks_fade_alpha() {
        assert_eq!(ghost_threshold(0.05), 12);
        assert_eq!(ghost_threshold(1.0), 12);
        assert!((50..=52).contains(&ghost_threshold(0.01)));
        assert_eq!(ghost_threshold(0.001), u8::MAX);
    }

    #[test]
    fn set_size_discards_content() {
        let mut f = Frame::new(16, 16, cells());
        f.fill_text('z', 0.0, 16.0, GREEN);
        f.set_size(32, 32);
        assert_eq!((f.cols, f.rows), (4, 2));
        assert!(f.get(0, 0).unwrap().is_blank());
        assert!(f.is_dirty_all());
    }

    #[test]
    fn unchanged_writes_are_not_marked_dirty() {
        let mut f = Frame::new(16, 16, cells());
        f.fill_text('z', 0.0, 16.0, GREEN);
        f.clear_dirty();
        f.fill_text('z', 0.0, 16.0, GREEN);
        assert!(f.dirty_indices().is_empty());
        f.fill_text('y', 0.0, 16.0, GREEN);
        assert_eq!(f.dirty_indices(), &[0]);
    }
}
