use crate::{Result, error::Error};
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use subtle::ConstantTimeEq;

/// Maximum UID length in octets (single, double, and triple-size
/// anti-collision UIDs are 4, 7, and 10 octets).
const MAX_UID_OCTETS: usize = 10;

/// Canonical card identifier.
///
/// Wraps the raw anti-collision UID octets reported by the reader. The
/// canonical string form joins the octets as decimal numbers with dashes
/// (`"250-152-169-174-101"`), which is the form persisted in the ledger and
/// journal files.
///
/// # Security
/// Equality uses constant-time comparison so UID matching during
/// authorization does not leak where two UIDs diverge.
#[derive(Debug, Clone, Eq)]
pub struct CardUid(Vec<u8>);

impl CardUid {
    /// Create a UID from raw octets.
    ///
    /// # Errors
    /// Returns `Error::InvalidUid` if the octet slice is empty or longer
    /// than any anti-collision UID can be.
    pub fn new(octets: Vec<u8>) -> Result<Self> {
        if octets.is_empty() {
            return Err(Error::InvalidUid {
                message: "UID must contain at least one octet".to_string(),
            });
        }
        if octets.len() > MAX_UID_OCTETS {
            return Err(Error::InvalidUid {
                message: format!("UID has {} octets, maximum is {MAX_UID_OCTETS}", octets.len()),
            });
        }
        Ok(CardUid(octets))
    }

    /// Raw UID octets.
    #[must_use]
    pub fn octets(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for CardUid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for octet in &self.0 {
            if !first {
                write!(f, "-")?;
            }
            write!(f, "{octet}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::str::FromStr for CardUid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let octets = s
            .split('-')
            .map(|part| {
                part.trim().parse::<u8>().map_err(|_| Error::InvalidUid {
                    message: format!("'{part}' is not a decimal octet"),
                })
            })
            .collect::<Result<Vec<u8>>>()?;
        CardUid::new(octets)
    }
}

/// Constant-time comparison, mirroring how card numbers are matched during
/// authentication elsewhere in the terminal.
impl PartialEq for CardUid {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl std::hash::Hash for CardUid {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Serialize for CardUid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CardUid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Daily access window with overnight wraparound.
///
/// When `start > end` the window spans midnight: `22:00-06:00` admits
/// `23:30` and `05:00` but rejects `12:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    #[must_use]
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        TimeWindow { start, end }
    }

    /// Whether the window crosses midnight.
    #[must_use]
    pub fn is_overnight(&self) -> bool {
        self.start > self.end
    }

    /// Whether `t` falls inside the window (inclusive on both ends).
    #[must_use]
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.is_overnight() {
            t >= self.start || t <= self.end
        } else {
            t >= self.start && t <= self.end
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format(crate::constants::TIME_FORMAT),
            self.end.format(crate::constants::TIME_FORMAT)
        )
    }
}

/// Set of weekdays a badge is allowed on, stored as a 7-bit mask with
/// index 0 = Monday (matching `chrono::Weekday::num_days_from_monday`).
///
/// The empty set means "no restriction": every day is allowed. This mirrors
/// the ledger file convention where an empty `Jours` column opens all days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// The unrestricted (empty) set.
    #[must_use]
    pub fn all_days() -> Self {
        WeekdaySet(0)
    }

    /// Build a set from weekday indices (0=Monday..6=Sunday).
    ///
    /// # Errors
    /// Returns `Error::InvalidWeekday` for any index greater than 6.
    pub fn from_indices<I: IntoIterator<Item = u8>>(indices: I) -> Result<Self> {
        let mut mask = 0u8;
        for index in indices {
            if index > 6 {
                return Err(Error::InvalidWeekday { index });
            }
            mask |= 1 << index;
        }
        Ok(WeekdaySet(mask))
    }

    /// Whether the set carries no restriction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Whether `day` is a member of the set.
    ///
    /// Always false for the empty set; callers treat the empty set as
    /// unrestricted before consulting membership.
    #[must_use]
    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    /// Whether a badge restricted by this set may pass on `day`.
    #[must_use]
    pub fn allows(&self, day: Weekday) -> bool {
        self.is_empty() || self.contains(day)
    }

    /// Member indices in ascending order.
    #[must_use]
    pub fn indices(&self) -> Vec<u8> {
        (0u8..7).filter(|i| self.0 & (1 << i) != 0).collect()
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for index in self.indices() {
            if !first {
                write!(f, "-")?;
            }
            write!(f, "{index}")?;
            first = false;
        }
        Ok(())
    }
}
