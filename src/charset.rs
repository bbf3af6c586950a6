// Copyright (c) 2026 rezky_nightky

use std::char;

use crate::error::{ConfigError, Result};
use crate::runtime::EngineKind;

/// Symbols the code rain mixes in after letters and digits.
const CODE_SYMBOLS: &str = "<>/{}[]()=+-*&^%$#@!~";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Charset {
    Code,
    Binary,
    Hex,
    Digits,
    Letters,
    Katakana,
}

impl Charset {
    pub fn default_for(kind: EngineKind) -> Self {
        match kind {
            EngineKind::Code => Charset::Code,
            EngineKind::Binary => Charset::Binary,
        }
    }
}

/// A non-empty alphabet the renderer samples from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Glyphs(Vec<char>);

impl Glyphs {
    /// Builds an alphabet, dropping blanks. An empty result falls back to `01`.
    pub fn new(chars: impl IntoIterator<Item = char>) -> Self {
        let mut out: Vec<char> = chars.into_iter().filter(|c| !c.is_whitespace()).collect();
        if out.is_empty() {
            out.push('0');
            out.push('1');
        }
        Self(out)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, i: usize) -> char {
        self.0[i % self.0.len()]
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[char] {
        &self.0
    }
}

pub fn charset_from_str(input: &str) -> Result<Charset> {
    match input.trim().to_ascii_lowercase().as_str() {
        "code" | "matrix" => Ok(Charset::Code),
        "bin" | "binary" | "01" => Ok(Charset::Binary),
        "hex" | "hexadecimal" => Ok(Charset::Hex),
        "digits" | "dec" | "decimal" => Ok(Charset::Digits),
        "letters" | "english" => Ok(Charset::Letters),
        "katakana" => Ok(Charset::Katakana),
        other => Err(ConfigError::UnknownCharset {
            value: other.to_string(),
        }),
    }
}

fn push_range(out: &mut Vec<char>, start: u32, end: u32) {
    for v in start..=end {
        if let Some(ch) = char::from_u32(v) {
            out.push(ch);
        }
    }
}

pub fn build_glyphs(charset: Charset) -> Glyphs {
    let mut out: Vec<char> = Vec::new();
    match charset {
        Charset::Code => {
            push_range(&mut out, 0x41, 0x5A);
            push_range(&mut out, 0x61, 0x7A);
            push_range(&mut out, 0x30, 0x39);
            out.extend(CODE_SYMBOLS.chars());
        }
        Charset::Binary => push_range(&mut out, 0x30, 0x31),
        Charset::Hex => {
            push_range(&mut out, 0x30, 0x39);
            push_range(&mut out, 0x41, 0x46);
        }
        Charset::Digits => push_range(&mut out, 0x30, 0x39),
        Charset::Letters => {
            push_range(&mut out, 0x41, 0x5A);
            push_range(&mut out, 0x61, 0x7A);
        }
        Charset::Katakana => push_range(&mut out, 0xFF66, 0xFF9D),
    }
    Glyphs::new(out)
}

/// Parses `--chars-hex`: comma separated code points taken pairwise as
/// inclusive ranges, e.g. `30,39,41,46`.
pub fn parse_hex_ranges(s: &str) -> Result<Glyphs> {
    let mut points = Vec::new();
    for (i, part) in s.split(',').enumerate() {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let v = u32::from_str_radix(part, 16).map_err(|_| ConfigError::InvalidChars {
            message: format!("invalid hex char at index {}", i + 1),
        })?;
        let ch = char::from_u32(v).ok_or_else(|| ConfigError::InvalidChars {
            message: format!("invalid unicode scalar at index {}", i + 1),
        })?;
        points.push(ch);
    }
    if points.is_empty() || points.len() % 2 != 0 {
        return Err(ConfigError::InvalidChars {
            message: "--chars-hex: expected an even, non-zero number of code points".to_string(),
        });
    }

    let mut out = Vec::new();
    for pair in points.chunks(2) {
        let (a, b) = (pair[0] as u32, pair[1] as u32);
        push_range(&mut out, a.min(b), a.max(b));
    }
    Ok(Glyphs::new(out))
}
