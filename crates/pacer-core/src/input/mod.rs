//! User control abstraction layer.

#[cfg(test)]
mod mock;

#[cfg(test)]
pub use mock::ScriptedControls;

use core::fmt;

use crate::{engine::ReaderConfig, render::PresentationMode};

/// Logical actions a reader can take while a session is open.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlEvent {
    TogglePause,
    Pause,
    Resume,
    /// Already coerced through [`coerce_wpm`].
    SetSpeed(u32),
    /// Handled by the surface; the engine reads the mode on its next tick.
    SetMode(PresentationMode),
    Quit,
}

/// Polled control provider.
pub trait ControlProvider {
    type Error;

    fn poll_event(&mut self) -> Result<Option<ControlEvent>, Self::Error>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpeedInputError {
    NotANumber,
    NotPositive,
}

impl fmt::Display for SpeedInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber => f.write_str("words per minute must be a number"),
            Self::NotPositive => f.write_str("words per minute must be positive"),
        }
    }
}

impl core::error::Error for SpeedInputError {}

/// Turn raw speed-field text into a usable words-per-minute value.
///
/// Leading digits are taken and the rest ignored ("250wpm" is 250, "12.7" is
/// 12). The result is clamped into the configured range.
pub fn coerce_wpm(input: &str, config: &ReaderConfig) -> Result<u32, SpeedInputError> {
    let input = input.trim();
    let end = input
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(input.len());

    if end == 0 {
        return if input.starts_with('-') {
            Err(SpeedInputError::NotPositive)
        } else {
            Err(SpeedInputError::NotANumber)
        };
    }

    let wpm = input[..end].parse::<u32>().unwrap_or(u32::MAX);
    if wpm == 0 {
        return Err(SpeedInputError::NotPositive);
    }

    Ok(wpm.clamp(config.min_wpm, config.max_wpm))
}
