//! Coordinated feedback scenarios.

use crate::error::Result;
use crate::messages::{
    DECISION_PULSE, DENIED_LINE1, DENY_BEEP, GRANTED_LINE1, GRANT_BEEP, IDLE_LINE1, IDLE_LINE2,
};
use crate::traits::{Buzzer, Display, LedColor, StatusLed};
use tracing::warn;

/// The terminal's three feedback devices, actuated as one.
///
/// Each scenario fires its LED pulse, beep, and screen update concurrently
/// and awaits all three. Individual device failures are logged and do not
/// abort the other devices or the caller.
#[derive(Debug)]
pub struct FeedbackSet<L, B, D> {
    led: L,
    buzzer: B,
    display: D,
}

impl<L: StatusLed, B: Buzzer, D: Display> FeedbackSet<L, B, D> {
    pub fn new(led: L, buzzer: B, display: D) -> Self {
        FeedbackSet { led, buzzer, display }
    }

    /// Grant feedback: green pulse, short beep, welcome screen.
    pub async fn granted(&mut self, name: &str) {
        let (led, beep, screen) = tokio::join!(
            self.led.pulse(LedColor::Green, DECISION_PULSE),
            self.buzzer.beep(GRANT_BEEP),
            self.display.show(GRANTED_LINE1, name),
        );
        report(led, beep, screen);
    }

    /// Refusal feedback: red pulse, long beep, refusal screen with the
    /// denial reason on the second line.
    pub async fn denied(&mut self, reason: &str) {
        let (led, beep, screen) = tokio::join!(
            self.led.pulse(LedColor::Red, DECISION_PULSE),
            self.buzzer.beep(DENY_BEEP),
            self.display.show(DENIED_LINE1, reason),
        );
        report(led, beep, screen);
    }

    /// Return to the idle prompt.
    pub async fn idle(&mut self) {
        let (led, screen) = tokio::join!(
            self.led.set(LedColor::Off),
            self.display.show(IDLE_LINE1, IDLE_LINE2),
        );
        report(led, Ok(()), screen);
    }

    /// Shutdown cleanup: LED off, screen blanked. Run on every exit path.
    pub async fn release(&mut self) {
        let (led, screen) = tokio::join!(self.led.set(LedColor::Off), self.display.clear());
        report(led, Ok(()), screen);
    }
}

fn report(led: Result<()>, beep: Result<()>, screen: Result<()>) {
    for outcome in [led, beep, screen] {
        if let Err(error) = outcome {
            warn!(%error, "feedback device failure ignored");
        }
    }
}
