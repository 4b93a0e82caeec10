//! Feedback device abstractions.
//!
//! None of these traits are object-safe (`async fn` methods return opaque
//! futures), so consumers take generic type parameters rather than
//! `Box<dyn _>`.

use crate::error::Result;
use std::time::Duration;

/// Colors the terminal's status LED can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedColor {
    Off,
    Green,
    Red,
}

/// Bi-color status LED.
pub trait StatusLed: Send {
    /// Set the LED to a steady color.
    async fn set(&mut self, color: LedColor) -> Result<()>;

    /// Hold `color` for `duration`, then return to off.
    async fn pulse(&mut self, color: LedColor, duration: Duration) -> Result<()>;
}

/// Piezo buzzer.
pub trait Buzzer: Send {
    /// Sound the buzzer for `duration`.
    async fn beep(&mut self, duration: Duration) -> Result<()>;
}

/// Two-line character display.
pub trait Display: Send {
    /// Replace both lines of the screen.
    async fn show(&mut self, line1: &str, line2: &str) -> Result<()>;

    /// Blank the screen.
    async fn clear(&mut self) -> Result<()>;
}
