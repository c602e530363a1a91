//! One function per subcommand. Each writes plain text to `out` so the
//! rendering can be checked without a terminal.

use std::{io::Write, path::Path};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use transplant_core::{
  blood::BloodProfile,
  catalog::{self, DonorFilter, OrganFilter, OrganListing},
  donor::{self, Donor},
  hospital::HospitalContext,
  identity::IdentityCode,
  intake,
  viability::ViabilityWindow,
};

/// Read the donor registry at `path`.
pub fn load_donors(path: &Path) -> anyhow::Result<Vec<Donor>> {
  let json = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read donor registry {}", path.display()))?;
  let donors = donor::donors_from_json(&json)
    .with_context(|| format!("failed to parse donor registry {}", path.display()))?;
  tracing::info!(count = donors.len(), path = %path.display(), "loaded donor registry");
  Ok(donors)
}

fn blood_label(blood: Option<BloodProfile>) -> String {
  blood.map_or_else(|| "?".to_owned(), |b| b.to_string())
}

// ─── validate-id ─────────────────────────────────────────────────────────────

/// Report each code as valid (with its birth date) or invalid (with the
/// reason). Returns how many were invalid.
pub fn validate_ids(out: &mut impl Write, codes: &[String]) -> anyhow::Result<usize> {
  let mut invalid = 0;
  for code in codes {
    match IdentityCode::parse(code) {
      Ok(id) => writeln!(out, "{code}  valid    born {}", id.birth_date())?,
      Err(e) => {
        invalid += 1;
        writeln!(out, "{code}  invalid  {e}")?;
      }
    }
  }
  Ok(invalid)
}

// ─── viability ───────────────────────────────────────────────────────────────

pub fn viability(
  out: &mut impl Write,
  organ: &str,
  harvested_at: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
) -> anyhow::Result<()> {
  let window = ViabilityWindow::compute(organ, harvested_at, now);
  writeln!(out, "organ:      {organ}")?;
  writeln!(out, "window:     {}h", window.max_hours)?;
  writeln!(out, "remaining:  {}", window.remaining)?;
  if let Some(pct) = window.percent_remaining {
    writeln!(out, "left:       {pct:.1}%")?;
  }
  writeln!(out, "status:     {} ({})", window.status, window.status.color())?;
  Ok(())
}

// ─── donors ──────────────────────────────────────────────────────────────────

/// Print the donors admitted by `filter`, one per line, with identity codes
/// masked.
pub fn donors(
  out: &mut impl Write,
  donors: &[Donor],
  filter: &DonorFilter,
  now: DateTime<Utc>,
) -> anyhow::Result<()> {
  let found = catalog::filter_donors(donors, filter);
  if found.is_empty() {
    writeln!(out, "no donors found")?;
    return Ok(());
  }
  let today = now.date_naive();
  for d in found {
    let age = d.age_on(today).map(|a| a.to_string()).unwrap_or_else(|| "?".to_owned());
    writeln!(
      out,
      "{:<28} {:<10} {:<4} {:>3}  {:<28} {}",
      d.full_name.trim(),
      d.masked_national_id(),
      blood_label(d.blood_profile()),
      age,
      d.hospital.trim(),
      d.organs.iter().map(|o| o.trim()).filter(|o| !o.is_empty()).collect::<Vec<_>>().join(", "),
    )?;
  }
  Ok(())
}

// ─── organs ──────────────────────────────────────────────────────────────────

fn listing_line(l: &OrganListing) -> String {
  let marker = if l.is_local { "*" } else { " " };
  let distance = l
    .distance_km
    .map(|d| format!("{d:.0} km"))
    .unwrap_or_default();
  format!(
    "{marker} {:<10} {:<4} {:<9} {:<8} {:<10} {:<28} {}",
    l.organ,
    blood_label(l.blood),
    l.remaining,
    l.window.status,
    l.quality,
    l.donor_name,
    [l.hospital.as_str(), distance.as_str()]
      .iter()
      .filter(|s| !s.is_empty())
      .copied()
      .collect::<Vec<_>>()
      .join(", "),
  )
}

/// Print every listed organ. Organs of the context hospital are starred.
pub fn organs(
  out: &mut impl Write,
  donors: &[Donor],
  filter: &OrganFilter,
  context: Option<&HospitalContext>,
  now: DateTime<Utc>,
) -> anyhow::Result<()> {
  let listings = catalog::list_organs(donors, filter, context, now);
  if listings.is_empty() {
    writeln!(out, "no organs available")?;
    return Ok(());
  }
  for l in &listings {
    writeln!(out, "{}", listing_line(l))?;
  }
  Ok(())
}

// ─── rank ────────────────────────────────────────────────────────────────────

/// Print candidates for `recipient`, best first, at most `limit` of them.
pub fn rank(
  out: &mut impl Write,
  donors: &[Donor],
  organ: &str,
  recipient: BloodProfile,
  context: Option<&HospitalContext>,
  limit: Option<usize>,
  now: DateTime<Utc>,
) -> anyhow::Result<()> {
  let ranked = catalog::rank_for_recipient(donors, organ, Some(recipient), context, now);
  if ranked.is_empty() {
    writeln!(out, "no donors offer {organ}")?;
    return Ok(());
  }
  for (pos, r) in ranked.iter().take(limit.unwrap_or(usize::MAX)).enumerate() {
    let verdict = if r.result.is_suitable { "suitable" } else { "unsuitable" };
    writeln!(
      out,
      "{:>2}. {:>3}  {:<15} {:<10} {}",
      pos + 1,
      r.result.score,
      r.result.tier,
      verdict,
      listing_line(&r.listing).trim_start(),
    )?;
  }
  Ok(())
}

// ─── check ───────────────────────────────────────────────────────────────────

/// Print the intake issues of every donor record. Returns how many records
/// have at least one issue.
pub fn check(out: &mut impl Write, donors: &[Donor], now: DateTime<Utc>) -> anyhow::Result<usize> {
  let mut failing = 0;
  for d in donors {
    let issues = intake::validate_donor(d, now);
    let name = if d.full_name.trim().is_empty() { "<unnamed>" } else { d.full_name.trim() };
    if issues.is_empty() {
      writeln!(out, "ok    {name}")?;
      continue;
    }
    failing += 1;
    writeln!(out, "FAIL  {name} ({})", d.donor_id)?;
    for issue in &issues {
      writeln!(out, "      - {issue}")?;
    }
  }
  Ok(failing)
}

#[cfg(test)]
mod tests {
  use chrono::{TimeDelta, TimeZone as _};
  use transplant_core::organ::OrganQuality;

  use super::*;

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() }

  fn render(f: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>) -> String {
    let mut buf = Vec::new();
    f(&mut buf).unwrap();
    String::from_utf8(buf).unwrap()
  }

  fn kidney_donor(name: &str, blood: &str, hospital: &str) -> Donor {
    let mut d = Donor::new(name, now());
    let p: BloodProfile = blood.parse().unwrap();
    d.blood_type = p.blood_type.to_string();
    d.rh_factor = p.rh.to_string();
    d.hospital = hospital.into();
    d.organs = vec!["Kidney".into()];
    d.harvested_at = Some(now() - TimeDelta::hours(10));
    d.quality = OrganQuality::Good;
    d
  }

  #[test]
  fn validate_ids_counts_failures() {
    let mut buf = Vec::new();
    let codes = vec!["8503154419".to_owned(), "8503154412".to_owned(), "12345".to_owned()];
    let invalid = validate_ids(&mut buf, &codes).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(invalid, 2);
    assert!(text.contains("8503154419  valid    born 1985-03-15"));
    assert!(text.contains("8503154412  invalid  checksum digit is 2, expected 9"));
    assert!(text.contains("12345  invalid"));
  }

  #[test]
  fn viability_report() {
    let text = render(|out| viability(out, "Kidney", Some(now() - TimeDelta::hours(10)), now()));
    assert!(text.contains("window:     36h"));
    assert!(text.contains("remaining:  1d 2h"));
    assert!(text.contains("left:       72.2%"));
    assert!(text.contains("status:     good (#27AE60)"));

    let unset = render(|out| viability(out, "Heart", None, now()));
    assert!(unset.contains("remaining:  not set"));
    assert!(!unset.contains("left:"));
  }

  #[test]
  fn donors_masks_identity_codes() {
    let mut ivan = kidney_donor("Ivan Petrov Ivanov", "A+", "УМБАЛ Александровска - София");
    ivan.national_id = "8503154419".into();
    ivan.date_of_birth = chrono::NaiveDate::from_ymd_opt(1985, 3, 15);
    ivan.rh_factor = "Положителен".into();
    let maria = kidney_donor("Maria Georgieva Ivanova", "O-", "МБАЛ Св. Анна - Варна");

    let filter = DonorFilter { blood: "A+".parse().ok(), ..Default::default() };
    let text = render(|out| donors(out, &[ivan.clone(), maria.clone()], &filter, now()));
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Ivan Petrov Ivanov"));
    assert!(lines[0].contains("8503****** A+    39"), "{}", lines[0]);
    assert!(!text.contains("8503154419"));

    let nobody = DonorFilter { name: Some("Stoyanov".into()), ..Default::default() };
    let none = render(|out| donors(out, &[ivan, maria], &nobody, now()));
    assert_eq!(none.trim(), "no donors found");
  }

  #[test]
  fn organs_marks_local_entries() {
    let donors = vec![
      kidney_donor("Ivan Petrov Ivanov", "A+", "УМБАЛ Александровска - София"),
      kidney_donor("Maria Georgieva Ivanova", "O-", "МБАЛ Св. Анна - Варна"),
    ];
    let ctx = HospitalContext::new("МБАЛ Св. Анна - Варна");
    let text = render(|out| organs(out, &donors, &OrganFilter::default(), Some(&ctx), now()));
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("  Kidney"));
    assert!(lines[1].starts_with("* Kidney"));
    assert!(lines[1].contains("0 km"));

    let none = render(|out| organs(out, &[], &OrganFilter::default(), None, now()));
    assert_eq!(none.trim(), "no organs available");
  }

  #[test]
  fn rank_orders_and_limits() {
    let donors = vec![
      kidney_donor("Maria Georgieva Ivanova", "O-", ""),
      kidney_donor("Ivan Petrov Ivanov", "A+", ""),
      kidney_donor("Petar Nikolov Stoyanov", "B+", ""),
    ];
    let recipient: BloodProfile = "A+".parse().unwrap();
    let text = render(|out| rank(out, &donors, "Kidney", recipient, None, Some(2), now()));
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(" 1.  96  excellent match suitable"), "{}", lines[0]);
    assert!(lines[0].contains("Ivan Petrov Ivanov"));
    assert!(lines[1].contains("Maria Georgieva Ivanova"));

    let none = render(|out| rank(out, &donors, "Heart", recipient, None, None, now()));
    assert_eq!(none.trim(), "no donors offer Heart");
  }

  #[test]
  fn check_lists_issues_per_donor() {
    let mut good = kidney_donor("Ivan Petrov Ivanov", "A+", "УМБАЛ Александровска - София");
    good.national_id = "8503154419".into();
    good.date_of_birth = chrono::NaiveDate::from_ymd_opt(1985, 3, 15);
    let bad = Donor::new("", now());

    let mut buf = Vec::new();
    let failing = check(&mut buf, &[good, bad], now()).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(failing, 1);
    assert!(text.starts_with("ok    Ivan Petrov Ivanov\n"));
    assert!(text.contains("FAIL  <unnamed>"));
    assert!(text.contains("      - full name is required"));
  }
}
