// Copyright (c) 2026 rezky_nightky

use crate::palette::Rgb;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub ink: Rgb,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        ink: Rgb::BLACK,
    };

    pub fn glyph(ch: char, ink: Rgb) -> Self {
        Self { ch, ink }
    }

    pub fn is_blank(&self) -> bool {
        self.ch == ' '
    }
}
