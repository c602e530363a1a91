//! ABO blood groups, Rh factors and donor-acceptance tables.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator as _};

use crate::{Error, Result};

// ─── Blood type ──────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter,
)]
pub enum BloodType {
  A,
  B,
  AB,
  O,
}

impl BloodType {
  /// Donor blood types a recipient of this type can receive.
  pub fn accepts(self) -> &'static [BloodType] {
    use BloodType::*;
    match self {
      A => &[A, O],
      B => &[B, O],
      AB => &[A, B, AB, O],
      O => &[O],
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::A => "A",
      Self::B => "B",
      Self::AB => "AB",
      Self::O => "O",
    }
  }
}

impl fmt::Display for BloodType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.as_str())
  }
}

impl FromStr for BloodType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_uppercase().as_str() {
      "A" => Ok(Self::A),
      "B" => Ok(Self::B),
      "AB" => Ok(Self::AB),
      "O" => Ok(Self::O),
      _ => Err(Error::UnknownBloodType(s.to_owned())),
    }
  }
}

// ─── Rh factor ───────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter,
)]
pub enum RhFactor {
  #[serde(rename = "+")]
  Positive,
  #[serde(rename = "-")]
  Negative,
}

impl RhFactor {
  /// Donor Rh factors a recipient with this factor can receive.
  pub fn accepts(self) -> &'static [RhFactor] {
    match self {
      Self::Positive => &[Self::Positive, Self::Negative],
      Self::Negative => &[Self::Negative],
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Positive => "+",
      Self::Negative => "-",
    }
  }
}

impl fmt::Display for RhFactor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.as_str())
  }
}

impl FromStr for RhFactor {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_lowercase().as_str() {
      "+" | "pos" | "positive" | "положителен" => Ok(Self::Positive),
      "-" | "neg" | "negative" | "отрицателен" => Ok(Self::Negative),
      _ => Err(Error::UnknownRhFactor(s.to_owned())),
    }
  }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// Blood group and Rh factor of a donor or recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BloodProfile {
  pub blood_type: BloodType,
  pub rh:         RhFactor,
}

impl BloodProfile {
  pub fn new(blood_type: BloodType, rh: RhFactor) -> Self {
    Self { blood_type, rh }
  }

  /// Parse separately stored type and Rh fields. `None` if either is empty
  /// or unrecognised.
  pub fn parse(blood_type: &str, rh: &str) -> Option<Self> {
    Some(Self::new(blood_type.parse().ok()?, rh.parse().ok()?))
  }

  /// Whether an organ from a donor with this profile may go to `recipient`.
  /// Both the ABO and the Rh tables must accept the donor.
  pub fn can_donate_to(&self, recipient: &BloodProfile) -> bool {
    recipient.blood_type.accepts().contains(&self.blood_type)
      && recipient.rh.accepts().contains(&self.rh)
  }
}

impl fmt::Display for BloodProfile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}", self.blood_type, self.rh)
  }
}

/// Parses combined labels such as `"AB-"` or `"O+"`.
impl FromStr for BloodProfile {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let trimmed = s.trim();
    let Some(sign) = trimmed.chars().last().filter(|c| matches!(c, '+' | '-'))
    else {
      return Err(Error::UnknownRhFactor(s.to_owned()));
    };
    let group = &trimmed[..trimmed.len() - sign.len_utf8()];
    Ok(Self::new(group.parse()?, sign.to_string().parse()?))
  }
}

// ─── Operations ──────────────────────────────────────────────────────────────

/// String-level compatibility check over the four stored fields.
///
/// Any empty or unrecognised field makes the pair incompatible.
pub fn is_blood_compatible(
  donor_type: &str,
  donor_rh: &str,
  recipient_type: &str,
  recipient_rh: &str,
) -> bool {
  match (
    BloodProfile::parse(donor_type, donor_rh),
    BloodProfile::parse(recipient_type, recipient_rh),
  ) {
    (Some(donor), Some(recipient)) => donor.can_donate_to(&recipient),
    _ => false,
  }
}

/// Every donor profile acceptable to `recipient`, in table order.
pub fn compatible_donor_profiles(recipient: BloodProfile) -> Vec<BloodProfile> {
  recipient
    .blood_type
    .accepts()
    .iter()
    .flat_map(|&t| recipient.rh.accepts().iter().map(move |&rh| BloodProfile::new(t, rh)))
    .collect()
}

/// Every recipient profile that can receive from `donor`.
pub fn compatible_recipient_profiles(donor: BloodProfile) -> Vec<BloodProfile> {
  BloodType::iter()
    .flat_map(|t| RhFactor::iter().map(move |rh| BloodProfile::new(t, rh)))
    .filter(|recipient| donor.can_donate_to(recipient))
    .collect()
}

/// Why a donor/recipient pair is incompatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Incompatibility {
  /// The recipient's ABO group does not accept the donor's.
  BloodType,
  /// ABO groups match but the Rh factor does not.
  RhFactor,
  /// One of the profiles is missing or unreadable.
  Unknown,
}

impl fmt::Display for Incompatibility {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(match self {
      Self::BloodType => "incompatible blood groups",
      Self::RhFactor => "incompatible Rh factor",
      Self::Unknown => "blood profile unknown",
    })
  }
}

/// `None` when compatible, otherwise the first failing check.
pub fn explain_incompatibility(
  donor: Option<BloodProfile>,
  recipient: Option<BloodProfile>,
) -> Option<Incompatibility> {
  let (Some(donor), Some(recipient)) = (donor, recipient) else {
    return Some(Incompatibility::Unknown);
  };
  if !recipient.blood_type.accepts().contains(&donor.blood_type) {
    Some(Incompatibility::BloodType)
  } else if !recipient.rh.accepts().contains(&donor.rh) {
    Some(Incompatibility::RhFactor)
  } else {
    None
  }
}
