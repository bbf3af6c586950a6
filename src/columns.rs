// Copyright (c) 2026 rezky_nightky

use crate::selector::Selector;
use crate::surface::Surface;

/// How fresh columns pick their first drop position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Seeding {
    /// Somewhere in `(-span, 0]`, so columns enter the surface at staggered times.
    Above { span: f64 },
    /// Somewhere on the visible surface, in drop units.
    WithinHeight,
}

impl Seeding {
    fn seed<S: Selector>(self, surface: Surface, row_scale: f64, selector: &mut S) -> f64 {
        let u = selector.chance();
        match self {
            Seeding::Above { span } => -(u * span),
            Seeding::WithinHeight => u * f64::from(surface.height) / row_scale.max(f64::MIN_POSITIVE),
        }
    }
}

pub fn column_count(width: u32, glyph_width: u32) -> usize {
    if glyph_width == 0 {
        return 0;
    }
    (width / glyph_width) as usize
}

/// One drop position per glyph column.
#[derive(Clone, Debug, PartialEq)]
pub struct Drops(Vec<f64>);

impl Drops {
    pub fn initialize<S: Selector>(
        columns: usize,
        seeding: Seeding,
        surface: Surface,
        row_scale: f64,
        selector: &mut S,
    ) -> Self {
        let values = (0..columns)
            .map(|_| seeding.seed(surface, row_scale, selector))
            .collect();
        Self(values)
    }

    /// Truncates or extends to `columns`. Surviving columns keep their drop.
    pub fn reconcile<S: Selector>(
        &mut self,
        columns: usize,
        seeding: Seeding,
        surface: Surface,
        row_scale: f64,
        selector: &mut S,
    ) {
        if columns <= self.0.len() {
            self.0.truncate(columns);
            return;
        }
        let missing = columns - self.0.len();
        self.0.reserve(missing);
        for _ in 0..missing {
            self.0.push(seeding.seed(surface, row_scale, selector));
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, f64> {
        self.0.iter_mut()
    }

    #[cfg(test)]
    pub fn from_values(values: Vec<f64>) -> Self {
        Self(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::ScriptedSelector;

    fn surface(width: u32, height: u32) -> Surface {
        Surface { width, height }
    }

    #[test]
    fn column_count_floors_width_over_glyph() {
        assert_eq!(column_count(300, 15), 20);
        assert_eq!(column_count(299, 15), 19);
        assert_eq!(column_count(10, 15), 0);
        assert_eq!(column_count(300, 0), 0);
    }

    #[test]
    fn above_seeding_is_never_below_the_top() {
        let mut sel = ScriptedSelector::new(&[], &[0.0, 0.5, 0.75]);
        let d = Drops::initialize(3, Seeding::Above { span: 100.0 }, surface(45, 90), 1.0, &mut sel);
        assert_eq!(d.as_slice(), &[-0.0, -50.0, -75.0]);
        assert!(d.as_slice().iter().all(|&v| v <= 0.0));
    }

    #[test]
    fn within_height_seeding_is_in_rows() {
        let mut sel = ScriptedSelector::new(&[], &[0.5, 0.25]);
        let d = Drops::initialize(2, Seeding::WithinHeight, surface(24, 120), 12.0, &mut sel);
        assert_eq!(d.as_slice(), &[5.0, 2.5]);
    }

    #[test]
    fn reconcile_keeps_surviving_columns() {
        let mut sel = ScriptedSelector::constant(0.5);
        let mut d = Drops::from_values(vec![3.0, 4.0, 5.0]);
        d.reconcile(2, Seeding::Above { span: 10.0 }, surface(30, 30), 1.0, &mut sel);
        assert_eq!(d.as_slice(), &[3.0, 4.0]);
        d.reconcile(4, Seeding::Above { span: 10.0 }, surface(60, 30), 1.0, &mut sel);
        assert_eq!(d.as_slice(), &[3.0, 4.0, -5.0, -5.0]);
    }
}
