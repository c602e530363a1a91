//! The donor record as captured by the registration form.
//!
//! Fields arrive as the persistence layer stored them, so blood group, Rh
//! factor and organ names are kept as raw text and interpreted on read. An
//! unreadable field never fails a record; it just makes the donor a worse
//! (or ineligible) candidate.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  blood::BloodProfile,
  identity, intake,
  organ::{self, OrganQuality},
};

/// Infectious-disease entries that mean "no known disease".
pub const DISEASE_FREE_SENTINELS: &[&str] = &["None", "Няма"];

// ─── Donor kind ──────────────────────────────────────────────────────────────

/// A family member's consent for a deceased donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyConsent {
  pub given_by:      String,
  /// e.g. "spouse", "daughter".
  pub relationship:  String,
  pub contact_phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DonorKind {
  #[default]
  Living,
  Deceased {
    died_at:        Option<DateTime<Utc>>,
    cause_of_death: Option<String>,
    family_consent: Option<FamilyConsent>,
  },
}

// ─── Donor ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donor {
  #[serde(default = "Uuid::new_v4")]
  pub donor_id:            Uuid,
  pub full_name:           String,
  /// Name of the hospital that registered the donor.
  #[serde(default)]
  pub hospital:            String,
  pub date_of_birth:       Option<NaiveDate>,
  pub gender:              Option<String>,
  /// Personal identity code (EGN) as typed.
  #[serde(default)]
  pub national_id:         String,
  pub phone:               Option<String>,
  pub email:               Option<String>,
  pub address:             Option<String>,
  /// `A`, `B`, `AB` or `O`.
  #[serde(default)]
  pub blood_type:          String,
  /// `+` or `-`.
  #[serde(default)]
  pub rh_factor:           String,
  /// Free text; empty or one of [`DISEASE_FREE_SENTINELS`] means none.
  pub infectious_diseases: Option<String>,
  /// Organ names offered for donation.
  #[serde(default)]
  pub organs:              Vec<String>,
  #[serde(default)]
  pub donor_type:          DonorKind,
  /// When the organs were harvested. `None` until harvest.
  pub harvested_at:        Option<DateTime<Utc>>,
  #[serde(default)]
  pub quality:             OrganQuality,
  pub notes:               Option<String>,
  /// Staff member who registered the donor.
  pub registered_by:       Option<String>,
  pub created_at:          Option<DateTime<Utc>>,
  pub updated_at:          Option<DateTime<Utc>>,
}

impl Donor {
  /// A living donor with only a name; everything else empty.
  pub fn new(full_name: impl Into<String>, now: DateTime<Utc>) -> Self {
    Self {
      donor_id:            Uuid::new_v4(),
      full_name:           full_name.into(),
      hospital:            String::new(),
      date_of_birth:       None,
      gender:              None,
      national_id:         String::new(),
      phone:               None,
      email:               None,
      address:             None,
      blood_type:          String::new(),
      rh_factor:           String::new(),
      infectious_diseases: None,
      organs:              Vec::new(),
      donor_type:          DonorKind::Living,
      harvested_at:        None,
      quality:             OrganQuality::Unknown,
      notes:               None,
      registered_by:       None,
      created_at:          Some(now),
      updated_at:          None,
    }
  }

  /// The donor's blood profile, if both fields are readable.
  pub fn blood_profile(&self) -> Option<BloodProfile> {
    BloodProfile::parse(&self.blood_type, &self.rh_factor)
  }

  pub fn is_disease_free(&self) -> bool {
    match self.infectious_diseases.as_deref().map(str::trim) {
      None | Some("") => true,
      Some(text) => DISEASE_FREE_SENTINELS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(text)),
    }
  }

  /// Whether `name` is among the offered organs. English and local names of
  /// the same organ match each other.
  pub fn offers(&self, name: &str) -> bool {
    self.organs.iter().any(|o| organ::same_organ(o, name))
  }

  pub fn is_deceased(&self) -> bool {
    matches!(self.donor_type, DonorKind::Deceased { .. })
  }

  /// The identity code for display, with the day and serial hidden.
  pub fn masked_national_id(&self) -> String {
    identity::mask(self.national_id.trim())
  }

  /// Age in whole years on `today`, if the birth date is known.
  pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
    self.date_of_birth.map(|dob| intake::age_on(dob, today))
  }
}

/// Read a JSON array of donor records.
pub fn donors_from_json(json: &str) -> Result<Vec<Donor>> {
  Ok(serde_json::from_str(json)?)
}
