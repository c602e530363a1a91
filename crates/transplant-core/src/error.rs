//! Error types for `transplant-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::identity::IdentityError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid identity code: {0}")]
  Identity(#[from] IdentityError),

  #[error("unknown blood type: {0:?}")]
  UnknownBloodType(String),

  #[error("unknown rh factor: {0:?}")]
  UnknownRhFactor(String),

  #[error("unknown organ: {0:?}")]
  UnknownOrgan(String),

  #[error("request not found: {0}")]
  RequestNotFound(Uuid),

  #[error("request {0} has already been answered")]
  AlreadyResolved(Uuid),

  #[error("a request can only be answered with accepted or rejected")]
  InvalidResponse,

  #[error("a hospital cannot send a request to itself")]
  SelfAddressed,

  #[error("a request needs a receiving hospital")]
  MissingRecipient,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
