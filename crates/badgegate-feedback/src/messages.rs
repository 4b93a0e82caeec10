//! Fixed display texts and actuation timings.

use std::time::Duration;

/// Idle prompt shown between scans.
pub const IDLE_LINE1: &str = "PRESENT BADGE";
pub const IDLE_LINE2: &str = "";

/// First line of the grant screen; line two carries the badge holder name.
pub const GRANTED_LINE1: &str = "ACCESS GRANTED";

/// Refusal screen.
pub const DENIED_LINE1: &str = "ACCESS DENIED";

/// How long the LED holds its color after a decision.
pub const DECISION_PULSE: Duration = Duration::from_secs(2);

/// Short beep confirming a grant.
pub const GRANT_BEEP: Duration = Duration::from_millis(200);

/// Long beep marking a refusal.
pub const DENY_BEEP: Duration = Duration::from_millis(800);
