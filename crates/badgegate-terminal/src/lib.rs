//! The badgegate terminal binary's wiring.
//!
//! Everything the `badgegate` executable does lives here so it can be
//! exercised by tests: configuration loading, the console abstraction, the
//! stdin frontend, the admin menu, and the scan loop controller.
//! `main.rs` only initializes
//! logging, builds the components, and runs the loop until ctrl-c.

#![allow(async_fn_in_trait)]

pub mod admin;
pub mod config;
pub mod console;
pub mod controller;
pub mod frontend;

pub use admin::AdminConsole;
pub use config::{TelemetrySettings, TerminalConfig};
pub use console::{ChannelConsole, Console, ScriptedConsole};
pub use controller::Terminal;
