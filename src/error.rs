// Copyright (c) 2026 rezky_nightky

use thiserror::Error;

/// Problems turning command-line arguments into a runnable rain.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("failed to apply {name} {value} (min {min} max {max})")]
    OutOfRange {
        name: &'static str,
        value: String,
        min: String,
        max: String,
    },

    #[error("failed to apply {name} {value} (must be a finite number)")]
    NotFinite { name: &'static str, value: f64 },

    #[error("invalid color: {value} (expected #rgb, #rrggbb, rgb(), rgba() or a color name)")]
    InvalidColor { value: String },

    #[error("unsupported charset: {value} (see --list-charsets)")]
    UnknownCharset { value: String },

    #[error("{message}")]
    InvalidChars { message: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    pub fn out_of_range<T: std::fmt::Display>(name: &'static str, value: T, min: T, max: T) -> Self {
        Self::OutOfRange {
            name,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}
