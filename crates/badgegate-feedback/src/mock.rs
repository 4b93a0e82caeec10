//! In-memory feedback devices for tests and development.
//!
//! All three mocks record into a shared [`FeedbackProbe`], so a test can
//! assert on the combined actuation sequence of a scenario. Mocks complete
//! instantly: a pulse or beep records its requested duration instead of
//! sleeping through it.

use crate::error::{FeedbackError, Result};
use crate::traits::{Buzzer, Display, LedColor, StatusLed};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded device actuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFeedbackEvent {
    Set { color: LedColor },
    Pulse { color: LedColor, duration: Duration },
    Beep { duration: Duration },
    Show { line1: String, line2: String },
    Clear,
}

/// Shared recorder handed to each mock device.
#[derive(Debug, Clone, Default)]
pub struct FeedbackProbe {
    events: Arc<Mutex<Vec<MockFeedbackEvent>>>,
}

impl FeedbackProbe {
    #[must_use]
    pub fn new() -> Self {
        FeedbackProbe::default()
    }

    /// Snapshot of everything recorded so far, in actuation order.
    #[must_use]
    pub fn events(&self) -> Vec<MockFeedbackEvent> {
        self.events.lock().expect("probe lock poisoned").clone()
    }

    fn record(&self, event: MockFeedbackEvent) {
        self.events.lock().expect("probe lock poisoned").push(event);
    }
}

/// Mock status LED.
#[derive(Debug)]
pub struct MockLed {
    probe: FeedbackProbe,
    fail_next: bool,
}

impl MockLed {
    #[must_use]
    pub fn new(probe: FeedbackProbe) -> Self {
        MockLed { probe, fail_next: false }
    }

    /// Make the next operation fail, for error-path tests.
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }

    fn check(&mut self) -> Result<()> {
        if std::mem::take(&mut self.fail_next) {
            return Err(FeedbackError::led("injected failure"));
        }
        Ok(())
    }
}

impl StatusLed for MockLed {
    async fn set(&mut self, color: LedColor) -> Result<()> {
        self.check()?;
        self.probe.record(MockFeedbackEvent::Set { color });
        Ok(())
    }

    async fn pulse(&mut self, color: LedColor, duration: Duration) -> Result<()> {
        self.check()?;
        self.probe.record(MockFeedbackEvent::Pulse { color, duration });
        Ok(())
    }
}

/// Mock buzzer.
#[derive(Debug)]
pub struct MockBuzzer {
    probe: FeedbackProbe,
}

impl MockBuzzer {
    #[must_use]
    pub fn new(probe: FeedbackProbe) -> Self {
        MockBuzzer { probe }
    }
}

impl Buzzer for MockBuzzer {
    async fn beep(&mut self, duration: Duration) -> Result<()> {
        self.probe.record(MockFeedbackEvent::Beep { duration });
        Ok(())
    }
}

/// Mock two-line display.
#[derive(Debug)]
pub struct MockDisplay {
    probe: FeedbackProbe,
}

impl MockDisplay {
    #[must_use]
    pub fn new(probe: FeedbackProbe) -> Self {
        MockDisplay { probe }
    }
}

impl Display for MockDisplay {
    async fn show(&mut self, line1: &str, line2: &str) -> Result<()> {
        self.probe.record(MockFeedbackEvent::Show {
            line1: line1.to_string(),
            line2: line2.to_string(),
        });
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        self.probe.record(MockFeedbackEvent::Clear);
        Ok(())
    }
}
