// Copyright (c) 2026 rezky_nightky

use crate::palette::{Rgb, Rgba};

/// A 2D drawing context addressed in pixels.
///
/// Text is positioned by its baseline: a glyph drawn at `y` occupies the
/// band just above `y`, so anything at `y <= 0` is off the surface.
pub trait Canvas {
    fn size(&self) -> (u32, u32);

    /// Reallocates the backing store. Existing content is discarded.
    fn set_size(&mut self, width: u32, height: u32);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba);

    fn fill_text(&mut self, glyph: char, x: f64, y: f64, color: Rgb);
}

#[cfg(test)]
pub mod mock {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub struct DrawnGlyph {
        pub glyph: char,
        pub x: f64,
        pub y: f64,
    }

    /// Records every call. The call counter is shared so it can still be read
    /// after the canvas has been moved into an engine.
    #[derive(Debug, Default)]
    pub struct MockCanvas {
        pub width: u32,
        pub height: u32,
        pub calls: Rc<Cell<usize>>,
        pub set_size_calls: usize,
        pub fills: Vec<Rgba>,
        pub glyphs: Vec<DrawnGlyph>,
    }

    impl MockCanvas {
        pub fn new() -> Self {
            Self::default()
        }

        fn bump(&self) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    impl Canvas for MockCanvas {
        fn size(&self) -> (u32, u32) {
            (self.width, self.height)
        }

        fn set_size(&mut self, width: u32, height: u32) {
            self.width = width;
            self.height = height;
            self.set_size_calls += 1;
        }

        fn fill_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64, color: Rgba) {
            self.bump();
            self.fills.push(color);
        }

        fn fill_text(&mut self, glyph: char, x: f64, y: f64, _color: Rgb) {
            self.bump();
            self.glyphs.push(DrawnGlyph { glyph, x, y });
        }
    }
}
