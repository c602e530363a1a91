//! Field validators for donor registration and a whole-record check that
//! collects every problem at once.
//!
//! The validators are total boolean predicates. Time-relative rules take
//! `today` or `now` from the caller.

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeDelta, Utc};
use thiserror::Error;

use crate::{
  donor::{Donor, DonorKind},
  identity::{self, IdentityCode, IdentityError},
};

/// Longest accepted full name or e-mail address.
pub const MAX_FIELD_LEN: usize = 100;
/// Accepted address length, in characters.
pub const ADDRESS_LEN: (usize, usize) = (10, 200);
/// Oldest plausible donor age, in years.
pub const MAX_AGE: i32 = 120;

// ─── Field validators ────────────────────────────────────────────────────────

/// `local@domain.tld`: a local part of letters, digits and `._%+-`, a domain
/// of letters, digits, dots and dashes, and an alphabetic top-level domain
/// of at least two letters.
pub fn is_valid_email(email: &str) -> bool {
  let email = email.trim();
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  let Some((host, tld)) = domain.rsplit_once('.') else {
    return false;
  };

  let local_ok = !local.is_empty()
    && local
      .bytes()
      .all(|b| b.is_ascii_alphanumeric() || b"._%+-".contains(&b));
  let host_ok = !host.is_empty()
    && host
      .bytes()
      .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-');
  let tld_ok = tld.len() >= 2 && tld.bytes().all(|b| b.is_ascii_alphabetic());

  local_ok && host_ok && tld_ok
}

/// Bulgarian phone numbers: after dropping spaces, dashes and parentheses,
/// and rewriting a leading `+359` as `0`, a `0` followed by 8 or 9 digits.
pub fn is_valid_phone(phone: &str) -> bool {
  let cleaned: String = phone
    .chars()
    .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
    .collect();
  let national = match cleaned.strip_prefix("+359") {
    Some(rest) => format!("0{rest}"),
    None => cleaned,
  };

  let Some(rest) = national.strip_prefix('0') else {
    return false;
  };
  (8..=9).contains(&rest.len()) && rest.bytes().all(|b| b.is_ascii_digit())
}

fn is_name_char(c: char) -> bool {
  c.is_ascii_alphabetic()
    || ('а'..='я').contains(&c)
    || ('А'..='Я').contains(&c)
    || matches!(c, 'ё' | 'Ё' | '-' | '\'')
    || c.is_whitespace()
}

/// Latin or Cyrillic letters, spaces, hyphens and apostrophes; at least two
/// characters after trimming.
pub fn is_valid_name(name: &str) -> bool {
  let name = name.trim();
  name.chars().count() >= 2 && name.chars().all(is_name_char)
}

/// Non-blank and between `min` and `max` characters after trimming.
pub fn is_valid_required_text(text: &str, min: usize, max: usize) -> bool {
  let len = text.trim().chars().count();
  len > 0 && (min..=max).contains(&len)
}

/// Whole years between `dob` and `today`.
pub(crate) fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
  let years = today.year() - dob.year();
  if (today.month(), today.day()) < (dob.month(), dob.day()) {
    years - 1
  } else {
    years
  }
}

/// Not after `today`, and an age between 0 and [`MAX_AGE`].
pub fn is_valid_date_of_birth(dob: NaiveDate, today: NaiveDate) -> bool {
  dob <= today && (0..=MAX_AGE).contains(&age_on(dob, today))
}

/// No more than an hour ahead of `now` (clock skew) and no more than a year
/// behind it.
pub fn is_valid_harvest_time(harvested_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
  let not_future = harvested_at <= now + TimeDelta::hours(1);
  let not_stale = now
    .checked_sub_months(Months::new(12))
    .is_some_and(|earliest| harvested_at >= earliest);
  not_future && not_stale
}

// ─── Whole-record check ──────────────────────────────────────────────────────

/// One problem found in a donor record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeIssue {
  #[error("full name is required")]
  MissingName,

  #[error("full name needs given, middle and family names")]
  IncompleteName,

  #[error("full name contains invalid characters or is too long")]
  InvalidName,

  #[error("registering hospital is required")]
  MissingHospital,

  #[error("identity code is required")]
  MissingIdentityCode,

  #[error("identity code is invalid: {0}")]
  InvalidIdentityCode(IdentityError),

  #[error("date of birth is required")]
  MissingBirthDate,

  #[error("date of birth {0} is not plausible")]
  ImplausibleBirthDate(NaiveDate),

  #[error("date of birth {declared} does not match identity code ({encoded})")]
  BirthDateMismatch { declared: NaiveDate, encoded: NaiveDate },

  #[error("phone number is invalid")]
  InvalidPhone,

  #[error("e-mail address is invalid")]
  InvalidEmail,

  #[error("address must be between {} and {} characters", ADDRESS_LEN.0, ADDRESS_LEN.1)]
  InvalidAddress,

  #[error("blood type and rh factor are required")]
  MissingBloodProfile,

  #[error("at least one organ must be offered")]
  NoOrgans,

  #[error("harvest time must be within the last year and at most an hour ahead")]
  HarvestTimeOutOfRange,

  #[error("date and time of death are required")]
  MissingDeathTime,

  #[error("date of death is in the future")]
  DeathInFuture,

  #[error("cause of death is required")]
  MissingCauseOfDeath,

  #[error("family consent is required")]
  MissingFamilyConsent,

  #[error("name of the consenting relative is invalid")]
  InvalidConsentName,
}

fn present(field: &Option<String>) -> Option<&str> {
  field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn check_name(name: &str, issues: &mut Vec<IntakeIssue>) {
  let name = name.trim();
  if name.is_empty() {
    issues.push(IntakeIssue::MissingName);
  } else if name.split_whitespace().count() < 3 {
    issues.push(IntakeIssue::IncompleteName);
  } else if name.chars().count() > MAX_FIELD_LEN || !is_valid_name(name) {
    issues.push(IntakeIssue::InvalidName);
  }
}

fn check_identity(donor: &Donor, today: NaiveDate, issues: &mut Vec<IntakeIssue>) {
  let code = donor.national_id.trim();
  if code.is_empty() {
    issues.push(IntakeIssue::MissingIdentityCode);
  } else if let Err(e) = IdentityCode::parse(code) {
    issues.push(IntakeIssue::InvalidIdentityCode(e));
  }

  let Some(dob) = donor.date_of_birth else {
    issues.push(IntakeIssue::MissingBirthDate);
    return;
  };
  if !is_valid_date_of_birth(dob, today) {
    issues.push(IntakeIssue::ImplausibleBirthDate(dob));
  }
  // The encoded date is compared even when the checksum is wrong.
  if let Some(encoded) = identity::extract_birth_date(code).filter(|&e| e != dob) {
    issues.push(IntakeIssue::BirthDateMismatch { declared: dob, encoded });
  }
}

fn check_contact(donor: &Donor, issues: &mut Vec<IntakeIssue>) {
  if present(&donor.phone).is_some_and(|p| !is_valid_phone(p)) {
    issues.push(IntakeIssue::InvalidPhone);
  }
  if present(&donor.email)
    .is_some_and(|e| e.chars().count() > MAX_FIELD_LEN || !is_valid_email(e))
  {
    issues.push(IntakeIssue::InvalidEmail);
  }
  if present(&donor.address)
    .is_some_and(|a| !is_valid_required_text(a, ADDRESS_LEN.0, ADDRESS_LEN.1))
  {
    issues.push(IntakeIssue::InvalidAddress);
  }
}

fn check_deceased(donor: &Donor, now: DateTime<Utc>, issues: &mut Vec<IntakeIssue>) {
  let DonorKind::Deceased { died_at, cause_of_death, family_consent } = &donor.donor_type
  else {
    return;
  };

  match died_at {
    None => issues.push(IntakeIssue::MissingDeathTime),
    Some(t) if *t > now => issues.push(IntakeIssue::DeathInFuture),
    Some(_) => {}
  }
  if present(cause_of_death).is_none() {
    issues.push(IntakeIssue::MissingCauseOfDeath);
  }
  match family_consent {
    None => issues.push(IntakeIssue::MissingFamilyConsent),
    Some(c) if c.given_by.trim().is_empty() || c.relationship.trim().is_empty() => {
      issues.push(IntakeIssue::MissingFamilyConsent)
    }
    Some(c) if !is_valid_name(&c.given_by) => issues.push(IntakeIssue::InvalidConsentName),
    Some(_) => {}
  }
}

/// Every problem with `donor`, in form order. Empty means the record can be
/// registered.
pub fn validate_donor(donor: &Donor, now: DateTime<Utc>) -> Vec<IntakeIssue> {
  let mut issues = Vec::new();

  check_name(&donor.full_name, &mut issues);
  check_identity(donor, now.date_naive(), &mut issues);
  check_contact(donor, &mut issues);

  if donor.hospital.trim().is_empty() {
    issues.push(IntakeIssue::MissingHospital);
  }
  if donor.blood_profile().is_none() {
    issues.push(IntakeIssue::MissingBloodProfile);
  }
  if donor.organs.iter().all(|o| o.trim().is_empty()) {
    issues.push(IntakeIssue::NoOrgans);
  }
  if donor
    .harvested_at
    .is_some_and(|t| !is_valid_harvest_time(t, now))
  {
    issues.push(IntakeIssue::HarvestTimeOutOfRange);
  }

  check_deceased(donor, now, &mut issues);
  issues
}
