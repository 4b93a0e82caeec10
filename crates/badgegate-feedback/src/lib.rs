//! User-facing feedback devices for the badgegate terminal.
//!
//! Three small capabilities - a status LED, a buzzer, and a two-line text
//! display - sit behind async traits so the terminal runs identically
//! against real peripherals and the in-memory mocks used by tests.
//!
//! [`FeedbackSet`] bundles the three and actuates them concurrently: a
//! grant or refusal fires the LED pulse, the beep, and the screen update
//! together and awaits them as one.
//!
//! All device traits use native `async fn` methods (Edition 2024 RPITIT),
//! so no `async_trait` macro is required.

#![allow(async_fn_in_trait)]

pub mod error;
pub mod messages;
pub mod mock;
pub mod scenario;
pub mod traits;

pub use error::{FeedbackError, Result};
pub use mock::{FeedbackProbe, MockBuzzer, MockDisplay, MockFeedbackEvent, MockLed};
pub use scenario::FeedbackSet;
pub use traits::{Buzzer, Display, LedColor, StatusLed};
