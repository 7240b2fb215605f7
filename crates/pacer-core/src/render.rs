//! Per-word view models consumed by a display surface.

use core::{fmt, str::FromStr};

use crate::{pivot, progress::ProgressSnapshot};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PresentationMode {
    Highlight,
    Underline,
    #[default]
    Pivot,
}

impl PresentationMode {
    pub const ALL: [Self; 3] = [Self::Highlight, Self::Underline, Self::Pivot];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Highlight => "highlight",
            Self::Underline => "underline",
            Self::Pivot => "pivot",
        }
    }
}

impl fmt::Display for PresentationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UnknownMode;

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected one of: highlight, underline, pivot")
    }
}

impl core::error::Error for UnknownMode {}

impl FromStr for PresentationMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(UnknownMode)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WordStyle {
    Highlight,
    Underline,
}

/// Presentation directive for one word. Borrows from the word it was built from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RenderUnit<'a> {
    Styled {
        style: WordStyle,
        text: &'a str,
    },
    /// `pivot` is empty when the word is too short to hold the fixation letter.
    Pivot {
        left: &'a str,
        pivot: &'a str,
        right: &'a str,
    },
}

pub fn render(word: &str, mode: PresentationMode) -> RenderUnit<'_> {
    match mode {
        PresentationMode::Highlight => RenderUnit::Styled {
            style: WordStyle::Highlight,
            text: word,
        },
        PresentationMode::Underline => RenderUnit::Styled {
            style: WordStyle::Underline,
            text: word,
        },
        PresentationMode::Pivot => {
            let (left, pivot, right) = pivot::split_at_pivot(word, pivot::pivot_offset(word));
            RenderUnit::Pivot { left, pivot, right }
        }
    }
}

/// Everything a surface needs to draw one reading step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame<'a> {
    pub unit: RenderUnit<'a>,
    pub progress: ProgressSnapshot,
    pub wpm: u32,
}

/// Display surface driven by the pacing engine.
///
/// The mode is read live on every tick, so a surface may change it at any
/// time without telling the engine.
pub trait ReaderSurface {
    fn mode(&self) -> PresentationMode;

    fn present(&mut self, frame: Frame<'_>);

    /// Playback reached the end of the sequence.
    fn finished(&mut self, progress: ProgressSnapshot);
}
