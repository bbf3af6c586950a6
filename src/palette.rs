// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::error::ConfigError;
use crate::runtime::ColorMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Source-over compositing of `over` at `alpha` on top of `self`.
    pub fn blend(self, over: Rgb, alpha: f32) -> Rgb {
        let a = alpha.clamp(0.0, 1.0);
        Rgb {
            r: lerp_u8(self.r, over.r, a),
            g: lerp_u8(self.g, over.g, a),
            b: lerp_u8(self.b, over.b, a),
        }
    }

    /// Largest per-channel distance to `other`.
    pub fn max_channel_diff(self, other: Rgb) -> u8 {
        self.r
            .abs_diff(other.r)
            .max(self.g.abs_diff(other.g))
            .max(self.b.abs_diff(other.b))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub alpha: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self {
            rgb: Rgb::new(r, g, b),
            alpha,
        }
    }

    pub fn opaque(rgb: Rgb) -> Self {
        Self { rgb, alpha: 1.0 }
    }
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

fn parse_hex_digit_pair(s: &str) -> Option<u8> {
    u8::from_str_radix(s, 16).ok()
}

fn parse_hex(input: &str) -> Option<Rgb> {
    let hex = input.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let mut it = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            let r = it.next()??;
            let g = it.next()??;
            let b = it.next()??;
            Some(Rgb::new(r, g, b))
        }
        6 => Some(Rgb::new(
            parse_hex_digit_pair(&hex[0..2])?,
            parse_hex_digit_pair(&hex[2..4])?,
            parse_hex_digit_pair(&hex[4..6])?,
        )),
        _ => None,
    }
}

fn parse_channel(s: &str) -> Option<u8> {
    let v: f32 = s.trim().parse().ok()?;
    if !v.is_finite() || !(0.0..=255.0).contains(&v) {
        return None;
    }
    Some(v.round() as u8)
}

fn parse_functional(input: &str) -> Option<Rgba> {
    let (name, rest) = input.split_once('(')?;
    let body = rest.strip_suffix(')')?;
    let parts: Vec<&str> = body.split(',').collect();
    match (name.trim(), parts.as_slice()) {
        ("rgb", [r, g, b]) => Some(Rgba::opaque(Rgb::new(
            parse_channel(r)?,
            parse_channel(g)?,
            parse_channel(b)?,
        ))),
        ("rgba", [r, g, b, a]) => {
            let alpha: f32 = a.trim().parse().ok()?;
            if !alpha.is_finite() || !(0.0..=1.0).contains(&alpha) {
                return None;
            }
            Some(Rgba {
                rgb: Rgb::new(parse_channel(r)?, parse_channel(g)?, parse_channel(b)?),
                alpha,
            })
        }
        _ => None,
    }
}

fn named(input: &str) -> Option<Rgb> {
    Some(match input {
        "black" => Rgb::new(0, 0, 0),
        "white" => Rgb::new(255, 255, 255),
        "green" | "lime" => Rgb::new(0, 255, 0),
        "red" => Rgb::new(255, 0, 0),
        "blue" => Rgb::new(0, 0, 255),
        "cyan" => Rgb::new(0, 255, 255),
        "magenta" => Rgb::new(255, 0, 255),
        "yellow" => Rgb::new(255, 255, 0),
        "orange" => Rgb::new(255, 165, 0),
        "purple" => Rgb::new(128, 0, 128),
        "gray" | "grey" => Rgb::new(128, 128, 128),
        _ => return None,
    })
}

/// Parses the subset of CSS color syntax the rain uses: `#rgb`, `#rrggbb`,
/// `rgb(r, g, b)`, `rgba(r, g, b, a)` and a handful of names.
pub fn parse_css_color(input: &str) -> Result<Rgba, ConfigError> {
    let s = input.trim().to_ascii_lowercase();
    let parsed = if s.starts_with('#') {
        parse_hex(&s).map(Rgba::opaque)
    } else if s.contains('(') {
        parse_functional(&s)
    } else {
        named(&s).map(Rgba::opaque)
    };
    parsed.ok_or_else(|| ConfigError::InvalidColor {
        value: input.to_string(),
    })
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(c: Rgb) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((c.r as u16 * 5) + 127) / 255;
    let g6 = ((c.g as u16 * 5) + 127) / 255;
    let b6 = ((c.b as u16 * 5) + 127) / 255;

    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(
        c.r,
        c.g,
        c.b,
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );

    let avg = ((c.r as u16 + c.g as u16 + c.b as u16) / 3) as u8;
    let (gray_idx, level) = if avg < 8 {
        (16, 0)
    } else if avg > 238 {
        (231, 255)
    } else {
        let step = (avg - 8) / 10;
        (232 + step, 8 + 10 * step)
    };
    let gray_dist = dist2(c.r, c.g, c.b, level, level, level);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(c: Rgb) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    let mut best = Color::White;
    let mut best_d = i32::MAX;
    for (color, (r, g, b)) in TABLE {
        let d = dist2(c.r, c.g, c.b, r, g, b);
        if d < best_d {
            best_d = d;
            best = color;
        }
    }
    best
}

/// Maps a blended ink color onto what the terminal can show.
/// Mono terminals get the default foreground.
pub fn terminal_color(c: Rgb, mode: ColorMode) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(c))),
        ColorMode::Color16 => Some(rgb_to_color16(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_hex_ink() {
        let c = parse_css_color("#0f0").unwrap();
        assert_eq!(c.rgb, Rgb::new(0, 255, 0));
        assert_eq!(c.alpha, 1.0);
    }

    #[test]
    fn parses_rgba_fade() {
        let c = parse_css_color("rgba(10, 10, 10, 0.05)").unwrap();
        assert_eq!(c.rgb, Rgb::new(10, 10, 10));
        assert!((c.alpha - 0.05).abs() < f32::EPSILON);
    }

    #[test]
    fn rejects_out_of_range_alpha_and_garbage() {
        assert!(parse_css_color("rgba(0,0,0,1.5)").is_err());
        assert!(parse_css_color("#12345").is_err());
        assert!(parse_css_color("chartreuse-ish").is_err());
    }

    #[test]
    fn blend_moves_toward_overlay() {
        let ink = Rgb::new(0, 255, 0);
        let out = ink.blend(Rgb::new(10, 10, 10), 0.05);
        assert_eq!(out, Rgb::new(1, 243, 1));
        assert_eq!(ink.blend(Rgb::BLACK, 1.0), Rgb::BLACK);
    }

    #[test]
    fn quantizes_pure_green() {
        let g = Rgb::new(0, 255, 0);
        assert_eq!(terminal_color(g, ColorMode::Color256), Some(Color::AnsiValue(46)));
        assert_eq!(terminal_color(g, ColorMode::Color16), Some(Color::Green));
        assert_eq!(terminal_color(g, ColorMode::Mono), None);
    }
}
