//! Suitability decision and 0–100 ranking score for a donor organ against a
//! recipient's blood profile.
//!
//! Nothing here fails. Missing or unreadable inputs lose the points they
//! would have earned, so every candidate still gets a score and a list of
//! candidates always has a total order.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  blood::BloodProfile,
  donor::Donor,
  organ::OrganQuality,
  viability,
};

const BLOOD_POINTS: u32 = 40;
const PERFECT_MATCH_BONUS: u32 = 10;
const VIABILITY_POINTS: u32 = 30;
const DISEASE_FREE_POINTS: u32 = 10;
const MAX_SCORE: u32 = 100;

/// Donor-to-recipient blood compatibility. `None` on either side never
/// matches.
pub fn is_blood_compatible(
  donor: Option<BloodProfile>,
  recipient: Option<BloodProfile>,
) -> bool {
  matches!((donor, recipient), (Some(d), Some(r)) if d.can_donate_to(&r))
}

/// All four gates must pass: blood compatibility, a viable organ, no
/// infectious disease, and a quality rating other than poor.
pub fn is_suitable(
  donor: &Donor,
  organ: &str,
  recipient: Option<BloodProfile>,
  now: DateTime<Utc>,
) -> bool {
  is_blood_compatible(donor.blood_profile(), recipient)
    && viability::is_viable(organ, donor.harvested_at, now)
    && donor.is_disease_free()
    && donor.quality != OrganQuality::Poor
}

/// Points contributed by the quality rating. Poor organs still earn a little
/// here even though [`is_suitable`] rules them out.
pub fn quality_points(quality: OrganQuality) -> u32 {
  match quality {
    OrganQuality::Excellent => 20,
    OrganQuality::Good => 15,
    OrganQuality::Fair => 10,
    OrganQuality::Poor => 5,
    OrganQuality::Unknown => 10,
  }
}

fn viability_points(donor: &Donor, organ: &str, now: DateTime<Utc>) -> u32 {
  if !viability::is_viable(organ, donor.harvested_at, now) {
    return 0;
  }
  match viability::percent_remaining(organ, donor.harvested_at, now) {
    // Truncated, and capped for harvest times in the future.
    Some(pct) => ((pct * 0.3) as u32).min(VIABILITY_POINTS),
    None => VIABILITY_POINTS,
  }
}

/// Additive score capped at 100:
///
/// - 40 for blood compatibility, plus 10 when type and Rh match exactly
/// - up to 30 scaled by the share of the viability window left
/// - 5 to 20 for organ quality
/// - 10 when free of infectious disease
pub fn score(
  donor: &Donor,
  organ: &str,
  recipient: Option<BloodProfile>,
  now: DateTime<Utc>,
) -> u8 {
  let donor_blood = donor.blood_profile();
  let mut total = 0;

  if is_blood_compatible(donor_blood, recipient) {
    total += BLOOD_POINTS;
    if donor_blood == recipient {
      total += PERFECT_MATCH_BONUS;
    }
  }

  total += viability_points(donor, organ, now);
  total += quality_points(donor.quality);

  if donor.is_disease_free() {
    total += DISEASE_FREE_POINTS;
  }

  total.min(MAX_SCORE) as u8
}

// ─── Tiers ───────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
  Poor,
  Fair,
  Good,
  Excellent,
}

impl MatchTier {
  /// Lower bounds are inclusive: 80, 60, 40.
  pub fn from_score(score: u8) -> Self {
    match score {
      80.. => Self::Excellent,
      60..=79 => Self::Good,
      40..=59 => Self::Fair,
      _ => Self::Poor,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Excellent => "excellent match",
      Self::Good => "good match",
      Self::Fair => "fair match",
      Self::Poor => "poor match",
    }
  }

  pub fn color(self) -> &'static str {
    match self {
      Self::Excellent => "#27AE60",
      Self::Good => "#F39C12",
      Self::Fair => "#E67E22",
      Self::Poor => "#E74C3C",
    }
  }
}

impl fmt::Display for MatchTier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.label())
  }
}

// ─── Result ──────────────────────────────────────────────────────────────────

/// Outcome of evaluating one donor organ for one recipient at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityResult {
  pub is_compatible: bool,
  pub is_suitable:   bool,
  pub score:         u8,
  pub tier:          MatchTier,
}

pub fn evaluate(
  donor: &Donor,
  organ: &str,
  recipient: Option<BloodProfile>,
  now: DateTime<Utc>,
) -> CompatibilityResult {
  let score = score(donor, organ, recipient, now);
  CompatibilityResult {
    is_compatible: is_blood_compatible(donor.blood_profile(), recipient),
    is_suitable: is_suitable(donor, organ, recipient, now),
    score,
    tier: MatchTier::from_score(score),
  }
}

#[cfg(test)]
mod tests {
  use chrono::{TimeDelta, TimeZone as _};

  use super::*;

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() }

  fn profile(label: &str) -> Option<BloodProfile> { label.parse().ok() }

  fn kidney_donor(blood: &str, hours_ago: i64, quality: OrganQuality) -> Donor {
    let mut d = Donor::new("Georgi Dimitrov", now());
    let p: BloodProfile = blood.parse().unwrap();
    d.blood_type = p.blood_type.to_string();
    d.rh_factor = p.rh.to_string();
    d.organs = vec!["Kidney".into()];
    d.harvested_at = Some(now() - TimeDelta::hours(hours_ago));
    d.quality = quality;
    d.infectious_diseases = Some("None".into());
    d
  }

  #[test]
  fn perfect_kidney_match() {
    let d = kidney_donor("A+", 10, OrganQuality::Good);
    let r = evaluate(&d, "Kidney", profile("A+"), now());
    assert!(r.is_compatible);
    assert!(r.is_suitable);
    // 40 + 10 + floor(0.3 * 72.2) + 15 + 10
    assert_eq!(r.score, 96);
    assert_eq!(r.tier, MatchTier::Excellent);
    assert_eq!(r.tier.label(), "excellent match");
  }

  #[test]
  fn compatible_but_not_identical_gets_no_bonus() {
    let d = kidney_donor("O-", 10, OrganQuality::Good);
    assert_eq!(score(&d, "Kidney", profile("A+"), now()), 86);
  }

  #[test]
  fn incompatible_blood_loses_base_points() {
    let d = kidney_donor("B+", 10, OrganQuality::Good);
    assert!(!is_suitable(&d, "Kidney", profile("A+"), now()));
    assert_eq!(score(&d, "Kidney", profile("A+"), now()), 46);
  }

  #[test]
  fn each_gate_blocks_suitability() {
    let recipient = profile("A+");

    let expired = kidney_donor("A+", 40, OrganQuality::Good);
    assert!(!is_suitable(&expired, "Kidney", recipient, now()));

    let mut infected = kidney_donor("A+", 10, OrganQuality::Good);
    infected.infectious_diseases = Some("HIV".into());
    assert!(!is_suitable(&infected, "Kidney", recipient, now()));

    let poor = kidney_donor("A+", 10, OrganQuality::Poor);
    assert!(!is_suitable(&poor, "Kidney", recipient, now()));
    // Poor still scores, just lower.
    assert_eq!(score(&poor, "Kidney", recipient, now()), 86);

    let unknown = kidney_donor("A+", 10, OrganQuality::Unknown);
    assert!(is_suitable(&unknown, "Kidney", recipient, now()));
  }

  #[test]
  fn unset_harvest_time_earns_full_viability_points() {
    let mut d = kidney_donor("A+", 0, OrganQuality::Excellent);
    d.harvested_at = None;
    // 50 + 30 + 20 + 10 capped at 100.
    assert_eq!(score(&d, "Kidney", profile("A+"), now()), 100);
  }

  #[test]
  fn expired_organ_earns_no_viability_points() {
    let d = kidney_donor("A+", 36, OrganQuality::Good);
    assert_eq!(score(&d, "Kidney", profile("A+"), now()), 75);
  }

  #[test]
  fn future_harvest_is_capped() {
    let d = kidney_donor("A+", -12, OrganQuality::Fair);
    // 50 + 30 (capped) + 10 + 10
    assert_eq!(score(&d, "Kidney", profile("A+"), now()), 100);
  }

  #[test]
  fn garbage_inputs_degrade_to_lowest_points() {
    let mut d = Donor::new("", now());
    d.blood_type = "Z".into();
    d.rh_factor = "?".into();
    d.harvested_at = Some(now() - TimeDelta::days(30));
    d.infectious_diseases = Some("unknown".into());
    let r = evaluate(&d, "", None, now());
    assert!(!r.is_compatible);
    assert!(!r.is_suitable);
    // Only the unknown-quality default remains.
    assert_eq!(r.score, 10);
    assert_eq!(r.tier, MatchTier::Poor);
  }

  #[test]
  fn tier_boundaries_are_inclusive() {
    assert_eq!(MatchTier::from_score(100), MatchTier::Excellent);
    assert_eq!(MatchTier::from_score(80), MatchTier::Excellent);
    assert_eq!(MatchTier::from_score(79), MatchTier::Good);
    assert_eq!(MatchTier::from_score(60), MatchTier::Good);
    assert_eq!(MatchTier::from_score(59), MatchTier::Fair);
    assert_eq!(MatchTier::from_score(40), MatchTier::Fair);
    assert_eq!(MatchTier::from_score(39), MatchTier::Poor);
    assert_eq!(MatchTier::from_score(0), MatchTier::Poor);
  }
}
