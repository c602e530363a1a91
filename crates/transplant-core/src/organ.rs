//! Organ kinds and qualitative organ ratings.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

// ─── Organ ───────────────────────────────────────────────────────────────────

/// The organs the registry tracks.
///
/// Parsing accepts the English name (any ASCII case) and the Bulgarian label
/// used on the registration form. Display always yields the English name.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Organ {
  #[strum(to_string = "Heart", serialize = "Сърце")]
  Heart,
  #[strum(to_string = "Lung", serialize = "Бял дроб")]
  Lung,
  #[strum(to_string = "Liver", serialize = "Черен дроб")]
  Liver,
  #[strum(to_string = "Kidney", serialize = "Бъбрек")]
  Kidney,
  #[strum(to_string = "Pancreas", serialize = "Панкреас")]
  Pancreas,
  #[strum(to_string = "Intestine", serialize = "Черва")]
  Intestine,
  #[strum(to_string = "Stomach", serialize = "Стомах")]
  Stomach,
  #[strum(to_string = "Artery", serialize = "Артерия")]
  Artery,
  #[strum(to_string = "Thymus", serialize = "Тимус")]
  Thymus,
}

/// Where an organ sits; used to group organs in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BodyRegion {
  Chest,
  Abdomen,
}

impl Organ {
  /// Maximum number of hours the organ stays usable after harvest.
  pub fn viable_hours(self) -> u32 {
    match self {
      Self::Heart | Self::Lung | Self::Artery | Self::Thymus => 6,
      Self::Intestine | Self::Stomach => 12,
      Self::Liver | Self::Pancreas => 24,
      Self::Kidney => 36,
    }
  }

  pub fn body_region(self) -> BodyRegion {
    match self {
      Self::Heart | Self::Lung | Self::Artery | Self::Thymus => BodyRegion::Chest,
      _ => BodyRegion::Abdomen,
    }
  }

  /// The Bulgarian label stored by the registration form.
  pub fn local_name(self) -> &'static str {
    match self {
      Self::Heart => "Сърце",
      Self::Lung => "Бял дроб",
      Self::Liver => "Черен дроб",
      Self::Kidney => "Бъбрек",
      Self::Pancreas => "Панкреас",
      Self::Intestine => "Черва",
      Self::Stomach => "Стомах",
      Self::Artery => "Артерия",
      Self::Thymus => "Тимус",
    }
  }
}

/// Whether two stored organ names refer to the same organ. Recognised names
/// match across languages and case; anything else must match exactly.
pub fn same_organ(a: &str, b: &str) -> bool {
  let (a, b) = (a.trim(), b.trim());
  if a == b {
    return true;
  }
  match (a.parse::<Organ>(), b.parse::<Organ>()) {
    (Ok(x), Ok(y)) => x == y,
    _ => false,
  }
}

/// The English name for a recognised organ, otherwise the trimmed input.
pub fn canonical_name(name: &str) -> String {
  name
    .trim()
    .parse::<Organ>()
    .map_or_else(|_| name.trim().to_owned(), |o| o.to_string())
}

// ─── Quality ─────────────────────────────────────────────────────────────────

/// Clinical rating of a harvested organ.
///
/// Reading is total: any label that is not one of the four ratings (including
/// an empty one) is [`OrganQuality::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrganQuality {
  Excellent,
  Good,
  Fair,
  Poor,
  #[default]
  Unknown,
}

impl OrganQuality {
  pub fn from_label(label: &str) -> Self {
    match label.trim().to_ascii_lowercase().as_str() {
      "excellent" => Self::Excellent,
      "good" => Self::Good,
      "fair" => Self::Fair,
      "poor" => Self::Poor,
      _ => Self::Unknown,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Excellent => "Excellent",
      Self::Good => "Good",
      Self::Fair => "Fair",
      Self::Poor => "Poor",
      Self::Unknown => "Unknown",
    }
  }

  /// One-line description shown next to the rating.
  pub fn describe(self) -> &'static str {
    match self {
      Self::Excellent => "Excellent - perfect condition",
      Self::Good => "Good - acceptable condition",
      Self::Fair => "Fair - risk factors present",
      Self::Poor => "Poor - high risk",
      Self::Unknown => "Not rated",
    }
  }
}

impl fmt::Display for OrganQuality {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.as_str())
  }
}

impl From<String> for OrganQuality {
  fn from(label: String) -> Self { Self::from_label(&label) }
}

impl From<OrganQuality> for String {
  fn from(q: OrganQuality) -> Self { q.as_str().to_owned() }
}
