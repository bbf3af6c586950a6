// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineKind {
    #[value(name = "code")]
    Code,
    #[value(name = "binary")]
    Binary,
}

impl EngineKind {
    pub fn label(self) -> &'static str {
        match self {
            EngineKind::Code => "code",
            EngineKind::Binary => "binary",
        }
    }
}

/// What happens to column state when the surface changes size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizePolicy {
    /// Column count stays fixed at whatever the surface had at start.
    Keep,
    /// Columns are recomputed from the new width on every resize.
    Reflow,
}

/// Pixel size of one terminal cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSize {
    pub width: u16,
    pub height: u16,
}

impl Default for CellSize {
    fn default() -> Self {
        Self {
            width: 8,
            height: 16,
        }
    }
}
