//! Searching the donor registry, listing the organs on offer and ranking them
//! for a recipient.
//!
//! A donor offering several organs yields one entry per organ. Every entry in
//! one call is computed against the same `now`.

use std::cmp::Ordering;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::{
  blood::BloodProfile,
  compatibility::{self, CompatibilityResult},
  donor::Donor,
  hospital::HospitalContext,
  organ::{self, OrganQuality},
  viability::{RemainingTime, ViabilityWindow},
};

// ─── Donors ──────────────────────────────────────────────────────────────────

/// Which donors [`filter_donors`] returns. Unset or blank fields match
/// everything.
#[derive(Debug, Clone, Default)]
pub struct DonorFilter {
  /// Case-insensitive part of the full name.
  pub name:     Option<String>,
  /// Registering hospital, exactly.
  pub hospital: Option<String>,
  /// Blood group and Rh factor together.
  pub blood:    Option<BloodProfile>,
  /// An offered organ, by English or local name.
  pub organ:    Option<String>,
}

fn wanted(field: &Option<String>) -> Option<&str> {
  field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl DonorFilter {
  pub fn admits(&self, donor: &Donor) -> bool {
    let name_ok = wanted(&self.name)
      .is_none_or(|part| donor.full_name.to_lowercase().contains(&part.to_lowercase()));
    let hospital_ok = wanted(&self.hospital).is_none_or(|h| h == donor.hospital.trim());
    let blood_ok = self.blood.is_none_or(|b| donor.blood_profile() == Some(b));
    let organ_ok = wanted(&self.organ).is_none_or(|o| donor.offers(o));
    name_ok && hospital_ok && blood_ok && organ_ok
  }
}

/// Donors admitted by `filter`, in registry order.
pub fn filter_donors<'a>(donors: &'a [Donor], filter: &DonorFilter) -> Vec<&'a Donor> {
  let found: Vec<_> = donors.iter().filter(|d| filter.admits(d)).collect();
  debug!(total = donors.len(), found = found.len(), "filtered donors");
  found
}

// ─── Organs ──────────────────────────────────────────────────────────────────

/// Which organs [`list_organs`] returns.
#[derive(Debug, Clone, Default)]
pub struct OrganFilter {
  /// Only this organ, by English or local name.
  pub organ:        Option<String>,
  /// Only organs registered by this hospital.
  pub hospital:     Option<String>,
  /// Include organs whose window has closed.
  pub show_expired: bool,
}

impl OrganFilter {
  fn admits_organ(&self, name: &str) -> bool {
    self
      .organ
      .as_deref()
      .is_none_or(|wanted| organ::same_organ(name, wanted))
  }

  fn admits_hospital(&self, hospital: &str) -> bool {
    self
      .hospital
      .as_deref()
      .is_none_or(|wanted| wanted.trim() == hospital.trim())
  }
}

/// One offered organ of one donor.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganListing {
  pub donor_id:    Uuid,
  pub donor_name:  String,
  pub hospital:    String,
  /// English name when recognised, otherwise as stored.
  pub organ:       String,
  pub blood:       Option<BloodProfile>,
  pub quality:     OrganQuality,
  pub window:      ViabilityWindow,
  /// `window.remaining` rendered for display.
  pub remaining:   String,
  /// Registered by the hospital in the caller's context.
  pub is_local:    bool,
  /// From the context hospital, when both hospitals are in the directory.
  pub distance_km: Option<f64>,
}

impl OrganListing {
  fn new(
    donor: &Donor,
    organ_name: &str,
    context: Option<&HospitalContext>,
    now: DateTime<Utc>,
  ) -> Self {
    let window = ViabilityWindow::compute(organ_name, donor.harvested_at, now);
    Self {
      donor_id: donor.donor_id,
      donor_name: donor.full_name.clone(),
      hospital: donor.hospital.clone(),
      organ: organ::canonical_name(organ_name),
      blood: donor.blood_profile(),
      quality: donor.quality,
      remaining: window.remaining.to_string(),
      window,
      is_local: context.is_some_and(|c| c.is(&donor.hospital)),
      distance_km: context.and_then(|c| c.distance_to(&donor.hospital)),
    }
  }
}

fn offered<'a>(donor: &'a Donor) -> impl Iterator<Item = &'a str> {
  donor
    .organs
    .iter()
    .map(|o| o.trim())
    .filter(|o| !o.is_empty())
}

/// Every offered organ admitted by `filter`, in donor order.
pub fn list_organs(
  donors: &[Donor],
  filter: &OrganFilter,
  context: Option<&HospitalContext>,
  now: DateTime<Utc>,
) -> Vec<OrganListing> {
  donors
    .iter()
    .filter(|d| filter.admits_hospital(&d.hospital))
    .flat_map(|d| {
      offered(d)
        .filter(move |name| filter.admits_organ(name))
        .map(move |name| OrganListing::new(d, name, context, now))
    })
    .filter(|listing| filter.show_expired || listing.window.is_viable())
    .collect()
}

// ─── Ranking ─────────────────────────────────────────────────────────────────

/// A listing together with its evaluation for one recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedOrgan {
  pub listing: OrganListing,
  pub result:  CompatibilityResult,
}

/// Unbounded sorts above any finite remaining time.
fn remaining_key(remaining: RemainingTime) -> (bool, TimeDelta) {
  match remaining {
    RemainingTime::Unbounded => (true, TimeDelta::zero()),
    RemainingTime::Left(d) => (false, d),
  }
}

fn rank_order(a: &RankedOrgan, b: &RankedOrgan) -> Ordering {
  b.result
    .score
    .cmp(&a.result.score)
    .then_with(|| {
      remaining_key(b.listing.window.remaining)
        .cmp(&remaining_key(a.listing.window.remaining))
    })
    .then_with(|| a.listing.donor_name.cmp(&b.listing.donor_name))
}

/// Every offered `organ` evaluated for `recipient`, best first: higher score,
/// then more viability left, then donor name. Expired and unsuitable organs
/// stay in the list with their (lower) scores.
pub fn rank_for_recipient(
  donors: &[Donor],
  organ: &str,
  recipient: Option<BloodProfile>,
  context: Option<&HospitalContext>,
  now: DateTime<Utc>,
) -> Vec<RankedOrgan> {
  let mut ranked: Vec<RankedOrgan> = donors
    .iter()
    .flat_map(|d| {
      offered(d)
        .filter(move |name| organ::same_organ(name, organ))
        .map(move |name| (d, name))
    })
    .map(|(d, name)| {
      let result = compatibility::evaluate(d, name, recipient, now);
      debug!(
        donor = %d.donor_id,
        organ = name,
        score = result.score,
        suitable = result.is_suitable,
        "evaluated candidate"
      );
      RankedOrgan { listing: OrganListing::new(d, name, context, now), result }
    })
    .collect();

  ranked.sort_by(rank_order);
  debug!(organ, candidates = ranked.len(), "ranked organs for recipient");
  ranked
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;
  use crate::viability::ViabilityStatus;

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() }

  fn donor(name: &str, hospital: &str, blood: &str, organs: &[&str], hours_ago: Option<i64>) -> Donor {
    let mut d = Donor::new(name, now());
    let p: BloodProfile = blood.parse().unwrap();
    d.hospital = hospital.into();
    d.blood_type = p.blood_type.to_string();
    d.rh_factor = p.rh.to_string();
    d.organs = organs.iter().map(|o| o.to_string()).collect();
    d.harvested_at = hours_ago.map(|h| now() - TimeDelta::hours(h));
    d.quality = OrganQuality::Good;
    d
  }

  const SOFIA: &str = "УМБАЛ Александровска - София";
  const VARNA: &str = "МБАЛ Св. Анна - Варна";

  fn registry() -> Vec<Donor> {
    vec![
      donor("Ivan Petrov Ivanov", SOFIA, "A+", &["Heart", "Бъбрек"], Some(8)),
      donor("Maria Georgieva Ivanova", VARNA, "O-", &["Kidney", " "], Some(2)),
      donor("Petar Nikolov Stoyanov", VARNA, "B+", &["Черен дроб"], None),
    ]
  }

  #[test]
  fn donor_search_by_name_is_case_insensitive() {
    let by_name = DonorFilter { name: Some("  IVANOV".into()), ..Default::default() };
    let donors = registry();
    let names: Vec<_> = filter_donors(&donors, &by_name).iter().map(|d| d.full_name.as_str()).collect();
    assert_eq!(names, ["Ivan Petrov Ivanov", "Maria Georgieva Ivanova"]);

    let blank = DonorFilter { name: Some(" ".into()), organ: Some(String::new()), ..Default::default() };
    assert_eq!(filter_donors(&registry(), &blank).len(), 3);
  }

  #[test]
  fn donor_filters_combine() {
    let varna_kidneys = DonorFilter {
      hospital: Some(VARNA.into()),
      organ: Some("Бъбрек".into()),
      ..Default::default()
    };
    let donors = registry();
    let found = filter_donors(&donors, &varna_kidneys);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].full_name, "Maria Georgieva Ivanova");

    // Group and Rh must both match: O+ does not select the O- donor.
    let o_pos = DonorFilter { blood: "O+".parse().ok(), ..Default::default() };
    assert!(filter_donors(&registry(), &o_pos).is_empty());
    let a_pos = DonorFilter { blood: "A+".parse().ok(), ..Default::default() };
    assert_eq!(filter_donors(&registry(), &a_pos)[0].full_name, "Ivan Petrov Ivanov");
  }

  #[test]
  fn donor_filter_reads_bulgarian_rh() {
    let mut d = donor("Georgi Ivanov Georgiev", SOFIA, "B-", &["Liver"], None);
    d.rh_factor = "Отрицателен".into();
    let filter = DonorFilter { blood: "B-".parse().ok(), ..Default::default() };
    assert!(filter.admits(&d));
  }

  #[test]
  fn one_listing_per_offered_organ() {
    let all = list_organs(&registry(), &OrganFilter { show_expired: true, ..Default::default() }, None, now());
    let organs: Vec<_> = all.iter().map(|l| l.organ.as_str()).collect();
    assert_eq!(organs, ["Heart", "Kidney", "Kidney", "Liver"]);
  }

  #[test]
  fn expired_organs_are_hidden_by_default() {
    // The heart was harvested 8h ago and has a 6h window.
    let shown = list_organs(&registry(), &OrganFilter::default(), None, now());
    assert_eq!(shown.len(), 3);
    assert!(shown.iter().all(|l| l.organ != "Heart"));

    let heart = OrganFilter { organ: Some("Сърце".into()), show_expired: true, ..Default::default() };
    let shown = list_organs(&registry(), &heart, None, now());
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].window.status, ViabilityStatus::Expired);
    assert_eq!(shown[0].remaining, "expired");
  }

  #[test]
  fn filters_by_organ_and_hospital() {
    let filter = OrganFilter {
      organ: Some("kidney".into()),
      hospital: Some(VARNA.into()),
      show_expired: false,
    };
    let shown = list_organs(&registry(), &filter, None, now());
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].donor_name, "Maria Georgieva Ivanova");
  }

  #[test]
  fn context_marks_local_organs() {
    let ctx = HospitalContext::new(VARNA);
    let shown = list_organs(&registry(), &OrganFilter::default(), Some(&ctx), now());
    let local: Vec<_> = shown.iter().map(|l| l.is_local).collect();
    assert_eq!(local, [false, true, true]);
    assert!(shown[0].distance_km.unwrap() > 300.0);
    assert!(shown[1].distance_km.unwrap() < 1.0);
  }

  #[test]
  fn ranks_best_candidate_first() {
    let ranked = rank_for_recipient(&registry(), "Kidney", "A+".parse().ok(), None, now());
    let names: Vec<_> = ranked.iter().map(|r| r.listing.donor_name.as_str()).collect();
    // Exact A+ match outscores the O- universal donor.
    assert_eq!(names, ["Ivan Petrov Ivanov", "Maria Georgieva Ivanova"]);
    assert!(ranked[0].result.score > ranked[1].result.score);
  }

  #[test]
  fn ties_prefer_more_remaining_time_then_name() {
    let mut donors = vec![
      donor("Boris", SOFIA, "O+", &["Liver"], Some(10)),
      donor("Anna", SOFIA, "O+", &["Liver"], Some(10)),
      donor("Chavdar", SOFIA, "O+", &["Liver"], Some(10)),
      donor("Dimitar", SOFIA, "O+", &["Liver"], None),
    ];
    donors[2].harvested_at = Some(now() - TimeDelta::minutes(620));
    // 14h and 13h40m left of 24h are both worth 17 viability points.
    let ranked = rank_for_recipient(&donors, "Liver", "O+".parse().ok(), None, now());
    let names: Vec<_> = ranked.iter().map(|r| r.listing.donor_name.as_str()).collect();
    assert_eq!(names, ["Dimitar", "Anna", "Boris", "Chavdar"]);
  }
}
