//! The usable window of a harvested organ.
//!
//! Every function takes `now` explicitly. An unset harvest time (`None`)
//! means the clock has not started: the organ counts as viable with an
//! unbounded window.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::organ::Organ;

/// Window applied to organ names outside the known table.
pub const DEFAULT_VIABLE_HOURS: u32 = 24;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Maximum viable hours for `organ`, or [`DEFAULT_VIABLE_HOURS`] if the name
/// is not recognised.
pub fn max_viable_hours(organ: &str) -> u32 {
  organ
    .parse::<Organ>()
    .map(Organ::viable_hours)
    .unwrap_or(DEFAULT_VIABLE_HOURS)
}

fn max_window(organ: &str) -> TimeDelta {
  TimeDelta::hours(i64::from(max_viable_hours(organ)))
}

/// `true` while strictly less than the organ's window has elapsed. Exactly at
/// the boundary the organ is no longer viable.
pub fn is_viable(
  organ: &str,
  harvested_at: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
) -> bool {
  match harvested_at {
    None => true,
    Some(t) => now.signed_duration_since(t) < max_window(organ),
  }
}

// ─── Remaining time ──────────────────────────────────────────────────────────

/// Time left before an organ expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingTime {
  /// No harvest time recorded.
  Unbounded,
  /// Never negative; zero once expired.
  Left(TimeDelta),
}

impl RemainingTime {
  pub fn is_expired(&self) -> bool {
    matches!(self, Self::Left(d) if *d == TimeDelta::zero())
  }

  pub fn as_delta(&self) -> Option<TimeDelta> {
    match self {
      Self::Unbounded => None,
      Self::Left(d) => Some(*d),
    }
  }
}

/// Renders `not set`, `expired`, then days and hours from 24h up, hours and
/// minutes from 1h up, and minutes and seconds below that.
impl fmt::Display for RemainingTime {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let d = match self {
      Self::Unbounded => return f.write_str("not set"),
      Self::Left(d) if *d == TimeDelta::zero() => return f.write_str("expired"),
      Self::Left(d) => *d,
    };

    let secs = d.num_seconds();
    let (days, hours, minutes, seconds) =
      (secs / 86_400, secs / 3_600 % 24, secs / 60 % 60, secs % 60);

    if d >= TimeDelta::hours(24) {
      write!(f, "{days}d {hours}h")
    } else if d >= TimeDelta::hours(1) {
      write!(f, "{hours}h {minutes}m")
    } else {
      write!(f, "{minutes}m {seconds}s")
    }
  }
}

/// `harvested_at + window - now`, floored at zero.
pub fn remaining_time(
  organ: &str,
  harvested_at: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
) -> RemainingTime {
  let Some(t) = harvested_at else {
    return RemainingTime::Unbounded;
  };
  // An expiry past the representable range never arrives.
  let Some(expiry) = t.checked_add_signed(max_window(organ)) else {
    return RemainingTime::Unbounded;
  };
  RemainingTime::Left(expiry.signed_duration_since(now).max(TimeDelta::zero()))
}

/// Share of the window still left, in percent. `None` when unbounded.
///
/// Can exceed 100 for a harvest time in the future.
pub fn percent_remaining(
  organ: &str,
  harvested_at: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
) -> Option<f64> {
  let left = remaining_time(organ, harvested_at, now).as_delta()?;
  let hours = left.num_milliseconds() as f64 / MILLIS_PER_HOUR;
  Some((hours / f64::from(max_viable_hours(organ))) * 100.0)
}

/// Display text for the remaining time; see [`RemainingTime`]'s `Display`.
pub fn format_remaining(
  organ: &str,
  harvested_at: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
) -> String {
  remaining_time(organ, harvested_at, now).to_string()
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Freshness tier shown as a colour badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViabilityStatus {
  Unset,
  Expired,
  Critical,
  Warning,
  Good,
}

impl ViabilityStatus {
  /// Badge colour as a hex RGB string.
  pub fn color(self) -> &'static str {
    match self {
      Self::Unset => "#95A5A6",
      Self::Expired | Self::Critical => "#E74C3C",
      Self::Warning => "#F39C12",
      Self::Good => "#27AE60",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Unset => "unset",
      Self::Expired => "expired",
      Self::Critical => "critical",
      Self::Warning => "warning",
      Self::Good => "good",
    }
  }
}

impl fmt::Display for ViabilityStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.label())
  }
}

/// Good above 50% remaining, Warning above 25%, Critical otherwise.
pub fn status_tier(
  organ: &str,
  harvested_at: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
) -> ViabilityStatus {
  let remaining = remaining_time(organ, harvested_at, now);
  if remaining == RemainingTime::Unbounded {
    return ViabilityStatus::Unset;
  }
  if remaining.is_expired() {
    return ViabilityStatus::Expired;
  }
  match percent_remaining(organ, harvested_at, now) {
    Some(p) if p > 50.0 => ViabilityStatus::Good,
    Some(p) if p > 25.0 => ViabilityStatus::Warning,
    _ => ViabilityStatus::Critical,
  }
}

// ─── Window ──────────────────────────────────────────────────────────────────

/// Everything derived about an organ's freshness at one instant. Never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViabilityWindow {
  pub max_hours:         u32,
  pub remaining:         RemainingTime,
  pub percent_remaining: Option<f64>,
  pub status:            ViabilityStatus,
}

impl ViabilityWindow {
  pub fn compute(
    organ: &str,
    harvested_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      max_hours:         max_viable_hours(organ),
      remaining:         remaining_time(organ, harvested_at, now),
      percent_remaining: percent_remaining(organ, harvested_at, now),
      status:            status_tier(organ, harvested_at, now),
    }
  }

  pub fn is_viable(&self) -> bool { self.status != ViabilityStatus::Expired }
}
