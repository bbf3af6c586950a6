// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;

use crate::charset::{build_glyphs, charset_from_str, parse_hex_ranges, Charset, Glyphs};
use crate::error::{ConfigError, Result};
use crate::palette::{parse_css_color, Rgb};
use crate::renderer::RainParams;
use crate::runtime::{CellSize, ColorMode, EngineKind, ResizePolicy};

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn heading(text: &str) {
    if color_enabled_stdout() {
        println!("\x1b[1;36m{}\x1b[0m", text);
    } else {
        println!("{}", text);
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
}

impl FromStr for CellSize {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| "expected: WIDTHxHEIGHT".to_string())?;
        let width: u16 = a
            .trim()
            .parse()
            .map_err(|_| "invalid cell width".to_string())?;
        let height: u16 = b
            .trim()
            .parse()
            .map_err(|_| "invalid cell height".to_string())?;
        if width == 0 || height == 0 || width > 256 || height > 256 {
            return Err("cell sides must be within 1..=256".to_string());
        }
        Ok(Self { width, height })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "glyphrain", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'e',
        long = "engine",
        default_value_t = EngineKind::Code,
        value_enum,
        help_heading = "GENERAL",
        help = "Rain variant: code (alphanumeric, pixel steps) or binary (0/1, row steps)"
    )]
    pub engine: EngineKind,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed the random source for a reproducible rain"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "reflow",
        help_heading = "GENERAL",
        help = "Recompute columns when the terminal is resized"
    )]
    pub reflow: bool,

    #[arg(
        short = 'c',
        long = "color",
        default_value = "#0f0",
        help_heading = "APPEARANCE",
        help = "Glyph color (#rgb, #rrggbb, rgb(), or a name)"
    )]
    pub color: String,

    #[arg(
        long = "fade",
        default_value = "rgba(10, 10, 10, 0.05)",
        help_heading = "APPEARANCE",
        help = "Per-tick fade overlay; alpha sets the trail length"
    )]
    pub fade: String,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: auto-detected from COLORTERM/TERM"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "cell",
        default_value = "8x16",
        help_heading = "APPEARANCE",
        help = "Pixel size of one terminal cell: WIDTHxHEIGHT"
    )]
    pub cell: CellSize,

    #[arg(
        short = 'i',
        long = "interval-ms",
        help_heading = "MOTION",
        help = "Milliseconds between ticks (min 1 max 1000; default 40 code, 33 binary)"
    )]
    pub interval_ms: Option<u64>,

    #[arg(
        short = 'w',
        long = "glyph-width",
        help_heading = "MOTION",
        help = "Column width in pixels (min 1 max 512; default 15 code, 12 binary)"
    )]
    pub glyph_width: Option<u32>,

    #[arg(
        long = "step",
        default_value_t = 1.0,
        help_heading = "MOTION",
        help = "Drop advance per tick (min 0.01 max 100)"
    )]
    pub step: f64,

    #[arg(
        short = 'r',
        long = "reset-pct",
        default_value_t = 2.5,
        help_heading = "MOTION",
        help = "Chance per tick that a column past the bottom restarts, in percent (min 0 max 100)"
    )]
    pub reset_pct: f64,

    #[arg(
        long = "charset",
        help_heading = "CHARSET",
        help = "Charset preset (see --list-charsets; default follows --engine)"
    )]
    pub charset: Option<String>,

    #[arg(
        long = "chars",
        help_heading = "CHARSET",
        conflicts_with = "chars_hex",
        help = "Custom alphabet, taken literally"
    )]
    pub chars: Option<String>,

    #[arg(
        long = "chars-hex",
        help_heading = "CHARSET",
        help = "Custom alphabet as hex code point ranges: LOW,HIGH[,LOW,HIGH...]"
    )]
    pub chars_hex: Option<String>,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List available charset presets and exit"
    )]
    pub list_charsets: bool,

    #[arg(
        long = "list-engines",
        help_heading = "HELP",
        help = "List rain variants and their defaults and exit"
    )]
    pub list_engines: bool,

    #[arg(
        long = "info",
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

/// Validated settings for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct RainConfig {
    pub kind: EngineKind,
    pub params: RainParams,
    pub policy: ResizePolicy,
    pub cell: CellSize,
    pub background: Option<Rgb>,
    pub seed: Option<u64>,
    pub duration: Option<Duration>,
    pub screensaver: bool,
}

fn require_f64_range(name: &'static str, v: f64, min: f64, max: f64) -> Result<f64> {
    if !v.is_finite() {
        return Err(ConfigError::NotFinite { name, value: v });
    }
    if v < min || v > max {
        return Err(ConfigError::out_of_range(name, v, min, max));
    }
    Ok(v)
}

fn require_u64_range(name: &'static str, v: u64, min: u64, max: u64) -> Result<u64> {
    if v < min || v > max {
        return Err(ConfigError::out_of_range(name, v, min, max));
    }
    Ok(v)
}

fn glyphs_for(args: &Args) -> Result<Glyphs> {
    if let Some(chars) = &args.chars {
        return Ok(Glyphs::new(chars.chars()));
    }
    if let Some(ranges) = &args.chars_hex {
        return parse_hex_ranges(ranges);
    }
    let charset = match &args.charset {
        Some(name) => charset_from_str(name)?,
        None => Charset::default_for(args.engine),
    };
    Ok(build_glyphs(charset))
}

impl Args {
    pub fn to_config(&self) -> Result<RainConfig> {
        let mut params = RainParams::for_kind(self.engine);
        params.glyphs = glyphs_for(self)?;
        params.ink = parse_css_color(&self.color)?.rgb;
        params.fade = parse_css_color(&self.fade)?;
        params.step = require_f64_range("--step", self.step, 0.01, 100.0)?;
        params.reset_chance = require_f64_range("--reset-pct", self.reset_pct, 0.0, 100.0)? / 100.0;
        if let Some(ms) = self.interval_ms {
            let ms = require_u64_range("--interval-ms", ms, 1, 1000)?;
            params.interval = Duration::from_millis(ms);
        }
        if let Some(px) = self.glyph_width {
            params.glyph_width = require_u64_range("--glyph-width", u64::from(px), 1, 512)? as u32;
        }

        let duration = match self.duration {
            Some(s) if !s.is_finite() => {
                return Err(ConfigError::NotFinite {
                    name: "--duration",
                    value: s,
                })
            }
            Some(s) if s > 0.0 => Some(Duration::from_secs_f64(require_f64_range(
                "--duration",
                s,
                0.1,
                86400.0,
            )?)),
            _ => None,
        };

        let background = match self.color_bg {
            ColorBg::Black => Some(params.fade.rgb),
            ColorBg::DefaultBackground => None,
        };

        Ok(RainConfig {
            kind: self.engine,
            params,
            policy: if self.reflow {
                ResizePolicy::Reflow
            } else {
                ResizePolicy::Keep
            },
            cell: self.cell,
            background,
            seed: self.seed,
            duration,
            screensaver: self.screensaver,
        })
    }

    pub fn color_mode(&self) -> Result<ColorMode> {
        match self.colormode {
            Some(0) => Ok(ColorMode::Mono),
            Some(16) => Ok(ColorMode::Color16),
            Some(8) | Some(256) => Ok(ColorMode::Color256),
            Some(24) | Some(32) => Ok(ColorMode::TrueColor),
            Some(other) => Err(ConfigError::OutOfRange {
                name: "--colormode",
                value: other.to_string(),
                min: "0".to_string(),
                max: "32 (allowed: 0,16,8,256,24,32)".to_string(),
            }),
            None => Ok(detect_color_mode_auto()),
        }
    }
}

pub fn detect_color_mode_auto() -> ColorMode {
    let colorterm = std::env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = std::env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }

    ColorMode::Color256
}

pub fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Color16 => "16-color",
        ColorMode::Mono => "mono",
    }
}

pub fn print_list_charsets() {
    heading("AVAILABLE CHARSET PRESETS:");
    println!();
    println!("VALUE        DESCRIPTION");
    println!("code         Letters + digits + <>/{{}}[]()=+-*&^%$#@!~ (alias: matrix)");
    println!("binary       0 and 1 (aliases: bin, 01)");
    println!("hex          0-9 and A-F (alias: hexadecimal)");
    println!("digits       Digits only (aliases: dec, decimal)");
    println!("letters      Letters only (alias: english)");
    println!("katakana     Half-width katakana");
}

pub fn print_list_engines() {
    heading("AVAILABLE ENGINES:");
    println!();
    println!("VALUE    GLYPH  INTERVAL  UNIT   SEEDING           ORDER");
    println!("code     15px   40ms      pixel  above the top     advance, then reset");
    println!("binary   12px   33ms      row    within the height reset, then advance");
}
