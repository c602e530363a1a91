//! Organ requests exchanged between hospitals.
//!
//! A request is sent once, answered at most once, and never edited after
//! that. [`Mailbox`] holds every request in memory and enforces those rules.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, donor::Donor, hospital::HospitalContext};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
  #[default]
  Pending,
  Accepted,
  Rejected,
}

impl fmt::Display for RequestStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(match self {
      Self::Pending => "pending",
      Self::Accepted => "accepted",
      Self::Rejected => "rejected",
    })
  }
}

/// How an accepted organ reaches the requesting hospital.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOption {
  #[default]
  NotSpecified,
  /// The sending hospital provides a car and driver.
  WithDriver,
  /// Emergency air transport.
  WithHelicopter,
  /// The requesting hospital collects the organ itself.
  PickupRequired,
}

impl fmt::Display for DeliveryOption {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(match self {
      Self::NotSpecified => "not specified",
      Self::WithDriver => "with driver",
      Self::WithHelicopter => "by helicopter",
      Self::PickupRequired => "pickup required",
    })
  }
}

// ─── Request ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganRequest {
  pub id:            Uuid,
  pub from_hospital: String,
  pub to_hospital:   String,
  pub organ:         String,
  pub donor_id:      Option<Uuid>,
  pub donor_name:    Option<String>,
  pub text:          Option<String>,
  pub delivery:      DeliveryOption,
  pub status:        RequestStatus,
  pub created_at:    DateTime<Utc>,
  pub responded_at:  Option<DateTime<Utc>>,
  pub response_text: Option<String>,
  /// Whether the receiving hospital has opened the request.
  #[serde(default)]
  pub is_read:       bool,
}

impl OrganRequest {
  pub fn is_pending(&self) -> bool { self.status == RequestStatus::Pending }
}

/// The parts of a request the sender chooses.
#[derive(Debug, Clone, Default)]
pub struct NewRequest {
  pub to_hospital: String,
  pub organ:       String,
  pub donor_id:    Option<Uuid>,
  pub donor_name:  Option<String>,
  pub text:        Option<String>,
}

impl NewRequest {
  /// A request for `organ` from a specific donor, addressed to the donor's
  /// hospital.
  pub fn for_donor(donor: &Donor, organ: impl Into<String>) -> Self {
    Self {
      to_hospital: donor.hospital.clone(),
      organ:       organ.into(),
      donor_id:    Some(donor.donor_id),
      donor_name:  Some(donor.full_name.clone()),
      text:        None,
    }
  }
}

// ─── Mailbox ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mailbox {
  requests: Vec<OrganRequest>,
}

impl Mailbox {
  pub fn new() -> Self { Self::default() }

  /// Send `request` on behalf of `from`. The new request is pending and
  /// unread.
  pub fn send(
    &mut self,
    from: &HospitalContext,
    request: NewRequest,
    now: DateTime<Utc>,
  ) -> Result<&OrganRequest> {
    if request.to_hospital.trim().is_empty() {
      return Err(Error::MissingRecipient);
    }
    if from.is(&request.to_hospital) {
      return Err(Error::SelfAddressed);
    }
    if request.organ.trim().is_empty() {
      return Err(Error::UnknownOrgan(request.organ));
    }

    let index = self.requests.len();
    self.requests.push(OrganRequest {
      id:            Uuid::new_v4(),
      from_hospital: from.name().to_owned(),
      to_hospital:   request.to_hospital.trim().to_owned(),
      organ:         request.organ.trim().to_owned(),
      donor_id:      request.donor_id,
      donor_name:    request.donor_name,
      text:          request.text,
      delivery:      DeliveryOption::NotSpecified,
      status:        RequestStatus::Pending,
      created_at:    now,
      responded_at:  None,
      response_text: None,
      is_read:       false,
    });
    Ok(&self.requests[index])
  }

  fn find_mut(&mut self, id: Uuid) -> Result<&mut OrganRequest> {
    self
      .requests
      .iter_mut()
      .find(|r| r.id == id)
      .ok_or(Error::RequestNotFound(id))
  }

  pub fn get(&self, id: Uuid) -> Option<&OrganRequest> {
    self.requests.iter().find(|r| r.id == id)
  }

  /// Answer a pending request. `status` must be accepted or rejected, and a
  /// request can only be answered once.
  pub fn respond(
    &mut self,
    id: Uuid,
    status: RequestStatus,
    delivery: DeliveryOption,
    text: Option<String>,
    now: DateTime<Utc>,
  ) -> Result<&OrganRequest> {
    if status == RequestStatus::Pending {
      return Err(Error::InvalidResponse);
    }
    let request = self.find_mut(id)?;
    if !request.is_pending() {
      return Err(Error::AlreadyResolved(id));
    }

    request.status = status;
    request.delivery = delivery;
    request.response_text = text;
    request.responded_at = Some(now);
    request.is_read = true;
    Ok(&*request)
  }

  pub fn mark_read(&mut self, id: Uuid) -> Result<()> {
    self.find_mut(id)?.is_read = true;
    Ok(())
  }

  pub fn delete(&mut self, id: Uuid) -> Result<OrganRequest> {
    let index = self
      .requests
      .iter()
      .position(|r| r.id == id)
      .ok_or(Error::RequestNotFound(id))?;
    Ok(self.requests.remove(index))
  }

  fn newest_first<'a>(
    &'a self,
    keep: impl Fn(&OrganRequest) -> bool,
  ) -> Vec<&'a OrganRequest> {
    let mut out: Vec<_> = self.requests.iter().rev().filter(|r| keep(r)).collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
  }

  /// Requests addressed to `ctx`, newest first.
  pub fn inbox(&self, ctx: &HospitalContext) -> Vec<&OrganRequest> {
    self.newest_first(|r| ctx.is(&r.to_hospital))
  }

  /// Requests sent by `ctx`, newest first.
  pub fn outbox(&self, ctx: &HospitalContext) -> Vec<&OrganRequest> {
    self.newest_first(|r| ctx.is(&r.from_hospital))
  }

  /// Requests addressed to `ctx` still waiting for an answer.
  pub fn pending_count(&self, ctx: &HospitalContext) -> usize {
    self
      .requests
      .iter()
      .filter(|r| r.is_pending() && ctx.is(&r.to_hospital))
      .count()
  }

  pub fn unread_count(&self, ctx: &HospitalContext) -> usize {
    self
      .requests
      .iter()
      .filter(|r| !r.is_read && ctx.is(&r.to_hospital))
      .count()
  }

  pub fn len(&self) -> usize { self.requests.len() }

  pub fn is_empty(&self) -> bool { self.requests.is_empty() }
}
