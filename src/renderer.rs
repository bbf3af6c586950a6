// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use crate::canvas::Canvas;
use crate::charset::{build_glyphs, Charset, Glyphs};
use crate::columns::{Drops, Seeding};
use crate::palette::{Rgb, Rgba};
use crate::runtime::EngineKind;
use crate::selector::Selector;
use crate::surface::Surface;

/// Where the reset check sits relative to the per-tick advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOrder {
    /// Advance, then maybe reset. A reset column holds 0 after the tick.
    AdvanceThenReset,
    /// Maybe reset, then advance. A reset column holds one step after the tick.
    ResetThenAdvance,
}

/// What one unit of drop position means on the vertical axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropUnit {
    Pixel,
    /// One glyph row, as tall as the glyph is wide.
    Row,
}

/// When a column is allowed to draw for a reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetGate {
    /// Only once the drop has passed the bottom edge.
    PastBottom,
    /// Every tick, wherever the drop is.
    Always,
}

/// Everything that shapes one rain variant.
#[derive(Clone, Debug, PartialEq)]
pub struct RainParams {
    pub glyphs: Glyphs,
    pub glyph_width: u32,
    pub unit: DropUnit,
    pub step: f64,
    pub ink: Rgb,
    pub fade: Rgba,
    /// Per-tick probability that a column the gate lets through restarts.
    pub reset_chance: f64,
    pub order: StepOrder,
    pub gate: ResetGate,
    pub seeding: Seeding,
    pub interval: Duration,
}

pub const DEFAULT_INK: Rgb = Rgb::new(0, 255, 0);
pub const DEFAULT_FADE: Rgba = Rgba::new(10, 10, 10, 0.05);
pub const DEFAULT_RESET_CHANCE: f64 = 0.025;

impl RainParams {
    /// Pixel-stepped alphanumeric rain that starts above the surface.
    pub fn code() -> Self {
        Self {
            glyphs: build_glyphs(Charset::Code),
            glyph_width: 15,
            unit: DropUnit::Pixel,
            step: 1.0,
            ink: DEFAULT_INK,
            fade: DEFAULT_FADE,
            reset_chance: DEFAULT_RESET_CHANCE,
            order: StepOrder::AdvanceThenReset,
            gate: ResetGate::PastBottom,
            seeding: Seeding::Above { span: 100.0 },
            interval: Duration::from_millis(40),
        }
    }

    /// Row-stepped `0`/`1` rain seeded across the visible height.
    pub fn binary() -> Self {
        Self {
            glyphs: build_glyphs(Charset::Binary),
            glyph_width: 12,
            unit: DropUnit::Row,
            step: 1.0,
            ink: DEFAULT_INK,
            fade: DEFAULT_FADE,
            reset_chance: DEFAULT_RESET_CHANCE,
            order: StepOrder::ResetThenAdvance,
            gate: ResetGate::Always,
            seeding: Seeding::WithinHeight,
            interval: Duration::from_millis(33),
        }
    }

    pub fn for_kind(kind: EngineKind) -> Self {
        match kind {
            EngineKind::Code => Self::code(),
            EngineKind::Binary => Self::binary(),
        }
    }

    /// Pixels per drop unit.
    pub fn row_scale(&self) -> f64 {
        match self.unit {
            DropUnit::Pixel => 1.0,
            DropUnit::Row => f64::from(self.glyph_width),
        }
    }
}

fn should_reset<S: Selector>(params: &RainParams, drop: f64, height: f64, selector: &mut S) -> bool {
    let eligible = match params.gate {
        ResetGate::PastBottom => drop * params.row_scale() > height,
        ResetGate::Always => true,
    };
    eligible && selector.chance() > 1.0 - params.reset_chance
}

/// Draws one frame: fade the previous one, put a glyph at the head of every
/// column, then move each column down.
pub fn render_frame<C: Canvas, S: Selector>(
    params: &RainParams,
    surface: Surface,
    drops: &mut Drops,
    canvas: &mut C,
    selector: &mut S,
) {
    let width = f64::from(surface.width);
    let height = f64::from(surface.height);
    canvas.fill_rect(0.0, 0.0, width, height, params.fade);

    let glyph_width = f64::from(params.glyph_width);
    let row_scale = params.row_scale();
    for (i, drop) in drops.iter_mut().enumerate() {
        let glyph = params.glyphs.get(selector.pick(params.glyphs.len()));
        canvas.fill_text(glyph, i as f64 * glyph_width, *drop * row_scale, params.ink);

        match params.order {
            StepOrder::AdvanceThenReset => {
                *drop += params.step;
                if should_reset(params, *drop, height, selector) {
                    *drop = 0.0;
                }
            }
            StepOrder::ResetThenAdvance => {
                if should_reset(params, *drop, height, selector) {
                    *drop = 0.0;
                }
                *drop += params.step;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::mock::{DrawnGlyph, MockCanvas};
    use crate::selector::ScriptedSelector;

    fn surface(width: u32, height: u32) -> Surface {
        Surface { width, height }
    }

    #[test]
    fn frame_fades_then_draws_one_glyph_per_column() {
        let params = RainParams::code();
        let mut drops = Drops::from_values(vec![5.0, 10.0, -3.0]);
        let mut canvas = MockCanvas::new();
        let mut sel = ScriptedSelector::new(&[0, 1, 26], &[]);

        render_frame(&params, surface(45, 100), &mut drops, &mut canvas, &mut sel);

        assert_eq!(canvas.fills, vec![DEFAULT_FADE]);
        assert_eq!(
            canvas.glyphs,
            vec![
                DrawnGlyph { glyph: 'A', x: 0.0, y: 5.0 },
                DrawnGlyph { glyph: 'B', x: 15.0, y: 10.0 },
                DrawnGlyph { glyph: 'a', x: 30.0, y: -3.0 },
            ]
        );
        assert_eq!(drops.as_slice(), &[6.0, 11.0, -2.0]);
    }

    #[test]
    fn binary_draws_at_row_offsets() {
        let params = RainParams::binary();
        let mut drops = Drops::from_values(vec![0.0, 2.0]);
        let mut canvas = MockCanvas::new();
        let mut sel = ScriptedSelector::new(&[1, 0], &[]);

        render_frame(&params, surface(24, 120), &mut drops, &mut canvas, &mut sel);

        assert_eq!(canvas.glyphs[0], DrawnGlyph { glyph: '1', x: 0.0, y: 0.0 });
        assert_eq!(canvas.glyphs[1], DrawnGlyph { glyph: '0', x: 12.0, y: 24.0 });
        assert_eq!(drops.as_slice(), &[1.0, 3.0]);
    }

    #[test]
    fn reset_draw_is_only_consumed_past_the_bottom() {
        let params = RainParams::code();
        let mut drops = Drops::from_values(vec![10.0, 99.0]);
        let mut canvas = MockCanvas::new();
        let mut sel = ScriptedSelector::constant(0.99);

        render_frame(&params, surface(30, 100), &mut drops, &mut canvas, &mut sel);
        assert_eq!(sel.chance_calls, 0);
        assert_eq!(drops.as_slice(), &[11.0, 100.0]);

        render_frame(&params, surface(30, 100), &mut drops, &mut canvas, &mut sel);
        assert_eq!(sel.chance_calls, 1);
        assert_eq!(drops.as_slice(), &[12.0, 0.0]);
    }

    #[test]
    fn failed_reset_draw_keeps_falling_past_the_bottom() {
        let params = RainParams::code();
        let mut drops = Drops::from_values(vec![150.0]);
        let mut canvas = MockCanvas::new();
        let mut sel = ScriptedSelector::constant(0.5);

        for _ in 0..10 {
            render_frame(&params, surface(15, 100), &mut drops, &mut canvas, &mut sel);
        }
        assert_eq!(drops.as_slice(), &[160.0]);
        assert_eq!(canvas.glyphs.last().map(|g| g.y), Some(159.0));
    }

    #[test]
    fn reset_then_advance_leaves_one_step() {
        let params = RainParams::binary();
        let mut drops = Drops::from_values(vec![11.0]);
        let mut canvas = MockCanvas::new();
        let mut sel = ScriptedSelector::new(&[], &[0.99]);

        render_frame(&params, surface(12, 120), &mut drops, &mut canvas, &mut sel);
        assert_eq!(drops.as_slice(), &[1.0]);
    }

    #[test]
    fn binary_resets_mid_screen_on_a_winning_draw() {
        let params = RainParams::binary();
        let mut drops = Drops::from_values(vec![3.0, 4.0]);
        let mut canvas = MockCanvas::new();
        let mut sel = ScriptedSelector::new(&[], &[0.99, 0.5]);

        render_frame(&params, surface(24, 120), &mut drops, &mut canvas, &mut sel);
        assert_eq!(sel.chance_calls, 2);
        assert_eq!(drops.as_slice(), &[1.0, 5.0]);
    }

    #[test]
    fn binary_rows_follow_glyph_width() {
        let mut p = RainParams::binary();
        p.glyph_width = 16;
        assert_eq!(p.row_scale(), 16.0);

        let mut c = RainParams::code();
        c.glyph_width = 10;
        assert_eq!(c.row_scale(), 1.0);
    }
}
