//! Check-in session rules: statuses, duration bounds, and expiry math.
//!
//! This module lives in `core` (zero internal deps) so the service layer,
//! the Postgres store, and the HTTP layer all agree on the same values.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Shortest session a teacher may open, in minutes.
pub const MIN_DURATION_MINS: i32 = 1;

/// Longest session a teacher may open, in minutes.
pub const MAX_DURATION_MINS: i32 = 60;

/// Duration used when a client does not ask for one.
pub const DEFAULT_DURATION_MINS: i32 = 10;

/// How often the expiry sweeper runs by default (in seconds).
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

// ---------------------------------------------------------------------------
// Session status
// ---------------------------------------------------------------------------

/// Lifecycle status of a check-in session. `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Ended,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SessionStatus::Active),
            "ended" => Ok(SessionStatus::Ended),
            other => Err(format!("Unknown session status '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Attendance status
// ---------------------------------------------------------------------------

/// Outcome recorded for one student in one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Absent => "absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "late" => Ok(AttendanceStatus::Late),
            "absent" => Ok(AttendanceStatus::Absent),
            other => Err(format!(
                "Invalid attendance status '{other}'. Must be one of: present, late, absent"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// End reasons
// ---------------------------------------------------------------------------

/// Why a session moved from `Active` to `Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The duration elapsed (sweeper or read-path expiry check).
    NaturalExpiry,
    /// A teacher or admin ended the session.
    ExplicitEnd,
    /// A teacher ended the session early; the duration is rewritten to the
    /// actual elapsed minutes.
    ManualOverride,
}

impl EndReason {
    pub fn as_str(self) -> &'static str {
        match self {
            EndReason::NaturalExpiry => "natural_expiry",
            EndReason::ExplicitEnd => "explicit_end",
            EndReason::ManualOverride => "manual_override",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Validation and time math
// ---------------------------------------------------------------------------

/// Validate a requested session duration.
pub fn validate_duration(duration_mins: i32) -> Result<(), String> {
    if !(MIN_DURATION_MINS..=MAX_DURATION_MINS).contains(&duration_mins) {
        return Err(format!(
            "Duration must be between {MIN_DURATION_MINS} and {MAX_DURATION_MINS} minutes, got {duration_mins}"
        ));
    }
    Ok(())
}

/// The instant after which a session no longer accepts check-ins.
pub fn session_deadline(start_time: Timestamp, duration_mins: i32) -> Timestamp {
    start_time + Duration::minutes(i64::from(duration_mins))
}

/// A session is expired strictly after its deadline.
pub fn is_expired(start_time: Timestamp, duration_mins: i32, now: Timestamp) -> bool {
    now > session_deadline(start_time, duration_mins)
}

/// Whole minutes elapsed since `start_time`, truncated and never negative.
pub fn elapsed_minutes(start_time: Timestamp, now: Timestamp) -> i32 {
    let mins = (now - start_time).num_minutes().max(0);
    i32::try_from(mins).unwrap_or(i32::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()
    }

    #[test]
    fn duration_bounds_are_inclusive() {
        assert!(validate_duration(MIN_DURATION_MINS).is_ok());
        assert!(validate_duration(MAX_DURATION_MINS).is_ok());
        assert!(validate_duration(0).is_err());
        assert!(validate_duration(61).is_err());
        assert!(validate_duration(-5).is_err());
    }

    #[test]
    fn duration_error_names_the_range() {
        let msg = validate_duration(90).unwrap_err();
        assert!(msg.contains("between 1 and 60"));
    }

    #[test]
    fn not_expired_just_before_deadline() {
        let now = t0() + Duration::minutes(10) - Duration::milliseconds(1);
        assert!(!is_expired(t0(), 10, now));
    }

    #[test]
    fn not_expired_exactly_at_deadline() {
        assert!(!is_expired(t0(), 10, t0() + Duration::minutes(10)));
    }

    #[test]
    fn expired_just_after_deadline() {
        let now = t0() + Duration::minutes(10) + Duration::milliseconds(1);
        assert!(is_expired(t0(), 10, now));
    }

    #[test]
    fn elapsed_minutes_truncates() {
        let now = t0() + Duration::minutes(4) + Duration::seconds(59);
        assert_eq!(elapsed_minutes(t0(), now), 4);
    }

    #[test]
    fn elapsed_minutes_clamps_clock_skew() {
        assert_eq!(elapsed_minutes(t0(), t0() - Duration::minutes(3)), 0);
    }

    #[test]
    fn attendance_status_parsing() {
        assert_eq!("late".parse::<AttendanceStatus>(), Ok(AttendanceStatus::Late));
        assert!("tardy".parse::<AttendanceStatus>().is_err());
        assert!("Present".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn session_status_parsing() {
        assert_eq!("ended".parse::<SessionStatus>(), Ok(SessionStatus::Ended));
        assert!("paused".parse::<SessionStatus>().is_err());
    }
}
