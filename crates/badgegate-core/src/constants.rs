//! Workspace-wide constants.
//!
//! These values describe the physical card layout, the credit-counter
//! bounds, and the terminal's timing behavior. They are centralized here so
//! the card, engine, and terminal crates cannot drift apart.

// ============================================================================
// Card Memory Layout
// ============================================================================

/// Size of one addressable card memory block in bytes.
pub const BLOCK_LEN: usize = 16;

/// Number of blocks per sector; the last block of each sector is the
/// trailer (keys and access bits) and is never used for data.
pub const SECTOR_BLOCKS: usize = 4;

/// Block holding the badge's identity text (the `internal_id` written at
/// provisioning time).
pub const IDENTITY_BLOCK: u8 = 4;

/// Block holding the badge's credit counter (big-endian u32 in the first
/// four bytes).
pub const COUNTER_BLOCK: u8 = 5;

/// Number of bytes of a counter block that carry the encoded integer.
pub const COUNTER_BYTES: usize = 4;

/// Highest block number the admin diagnostic menu will touch.
///
/// The terminal only ever provisions sector 0 (manufacturer data) and
/// sector 1 (identity + counter), so diagnostics are bounded accordingly.
pub const MAX_DIAGNOSTIC_BLOCK: u8 = 5;

// ============================================================================
// Credit Counter
// ============================================================================

/// Ceiling for a badge's credit counter. Increments clamp here.
pub const MAX_COUNTER: u16 = 999;

// ============================================================================
// Scan Timing
// ============================================================================

/// Cooldown between two processed scans of the same badge (seconds).
pub const DEFAULT_COOLDOWN_SECS: u64 = 2;

/// Extended cooldown applied when the previous scan of the badge consumed
/// a credit, so a lingering card is not billed twice (seconds).
pub const BILLED_COOLDOWN_SECS: u64 = 5;

/// Pause between reader polls while waiting for a card (milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Pause after a per-scan failure before the loop resumes (milliseconds).
pub const LOOP_RECOVERY_PAUSE_MS: u64 = 500;

// ============================================================================
// Identity
// ============================================================================

/// Display name used for badges that have never been provisioned.
pub const UNREGISTERED_NAME: &str = "Unregistered";

/// Badge name that routes a granted scan into the admin console.
///
/// Compared case-insensitively; see `Verdict::is_admin`.
pub const ADMIN_NAME: &str = "admin";

/// Attempts allowed for the admin step-up challenge.
pub const MAX_CHALLENGE_ATTEMPTS: u32 = 3;

// ============================================================================
// Timestamp Formats
// ============================================================================

/// Timestamp format used by the audit journal and telemetry payloads.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Calendar-date format used for the `Expiration` ledger column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time-of-day format used for the `Debut`/`Fin` ledger columns.
pub const TIME_FORMAT: &str = "%H:%M";
