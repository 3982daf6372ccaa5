//! Expiration evaluator — pure functions over `(expiration, grace, now)`.
//!
//! Every expiration-bearing record in StayOps (business unit, cluster, module
//! entitlement) is evaluated through this module, so day arithmetic and
//! threshold bands live in exactly one place.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Threshold constants for expiration and utilization displays.
pub mod thresholds {
    /// An entitlement within this many days of expiry is `ExpiringSoon`.
    pub const EXPIRING_SOON_DAYS: i64 = 30;

    /// Notification bands (days remaining) at which reminders escalate.
    pub const NOTICE_BANDS: [i64; 3] = [30, 15, 3];

    /// Seat utilization percentage at which displays show a warning.
    pub const UTILIZATION_WARNING_PCT: f64 = 80.0;

    /// Seat utilization percentage at which displays show a critical alert.
    pub const UTILIZATION_CRITICAL_PCT: f64 = 95.0;
}

/// Faults from the evaluator. These indicate bad inputs, not business-rule
/// violations, and are surfaced loudly rather than defaulted away.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("utilization is undefined for a zero-capacity pool")]
    DivisionUndefined,
    #[error("malformed expiration date `{input}`: expected RFC 3339 or YYYY-MM-DD")]
    DateParse { input: String },
}

/// Where an entitlement sits relative to its expiration and grace window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExpirationState {
    Active,
    ExpiringSoon { days_left: i64 },
    InGracePeriod { days_left: i64 },
    Expired,
}

impl ExpirationState {
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }
}

impl std::fmt::Display for ExpirationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::ExpiringSoon { days_left } => write!(f, "expiring in {days_left}d"),
            Self::InGracePeriod { days_left } => write!(f, "in grace period ({days_left}d left)"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

/// Whole days until `expiration`, rounded up. Negative once expired:
/// `-1` means the expiration passed within the last 24 hours.
pub fn days_remaining(expiration: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (expiration - now).num_seconds();
    // ceil division that is correct for negative remainders too
    (secs + 86_399).div_euclid(86_400)
}

/// Classify an expiration against the 30-day warning window and the entity's
/// grace period. Total over all inputs; `grace_period_days` below zero is
/// treated as zero.
pub fn expiration_state(
    expiration: DateTime<Utc>,
    grace_period_days: i64,
    now: DateTime<Utc>,
) -> ExpirationState {
    let days = days_remaining(expiration, now);
    let grace = grace_period_days.max(0);
    if days >= thresholds::EXPIRING_SOON_DAYS {
        ExpirationState::Active
    } else if days >= 0 {
        ExpirationState::ExpiringSoon { days_left: days }
    } else if days >= -grace {
        ExpirationState::InGracePeriod {
            days_left: grace + days,
        }
    } else {
        ExpirationState::Expired
    }
}

/// The tightest notification band (30/15/3 days) the remaining time has
/// entered, if any. Expired entitlements report the tightest band.
pub fn notification_band(days_left: i64) -> Option<i64> {
    thresholds::NOTICE_BANDS
        .iter()
        .copied()
        .filter(|band| days_left <= *band)
        .min()
}

/// Seat pool utilization classification for dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum UtilizationAlert {
    Normal,
    Warning { pct: f64 },
    Critical { pct: f64 },
}

/// Classify `used / total` against the warning and critical thresholds.
/// A zero-capacity pool has no defined utilization; callers must render
/// that case distinctly instead of dividing.
pub fn utilization_alert(used: u32, total: u32) -> Result<UtilizationAlert, EvalError> {
    if total == 0 {
        return Err(EvalError::DivisionUndefined);
    }
    let pct = f64::from(used) * 100.0 / f64::from(total);
    if pct >= thresholds::UTILIZATION_CRITICAL_PCT {
        Ok(UtilizationAlert::Critical { pct })
    } else if pct >= thresholds::UTILIZATION_WARNING_PCT {
        Ok(UtilizationAlert::Warning { pct })
    } else {
        Ok(UtilizationAlert::Normal)
    }
}

/// Parse an expiration date from operator or upstream input.
/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` (midnight UTC).
/// Malformed input is an error — never silently defaulted.
pub fn parse_expiration_date(input: &str) -> Result<DateTime<Utc>, EvalError> {
    let trimmed = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(EvalError::DateParse {
        input: trimmed.to_string(),
    })
}
