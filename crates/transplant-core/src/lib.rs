//! Core types and rules for donor intake and organ matching.
//!
//! Every operation here is a pure function of its inputs. Anything that
//! depends on the current time takes `now` as an explicit argument, so a batch
//! of related computations can share one instant.
//!
//! The crate is free of I/O; the `transplant-cli` crate supplies records and
//! renders the results.

pub mod blood;
pub mod catalog;
pub mod compatibility;
pub mod donor;
pub mod error;
pub mod hospital;
pub mod identity;
pub mod intake;
pub mod organ;
pub mod request;
pub mod viability;

pub use error::{Error, Result};
