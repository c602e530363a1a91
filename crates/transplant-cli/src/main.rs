//! `transplant`: donor registry checks and organ matching from the shell.
//!
//! # Usage
//!
//! ```
//! transplant validate-id 8503154419
//! transplant donors --donors donors.json --name petrov --blood A+
//! transplant viability Heart --harvested 2024-06-01T08:00:00Z
//! transplant --hospital "МБАЛ Св. Анна - Варна" organs --donors donors.json
//! transplant rank Kidney --recipient A+ --donors donors.json --limit 5
//! transplant check --donors donors.json
//! ```
//!
//! Settings come from `transplant.toml` (or `--config`) and `TRANSPLANT_*`
//! environment variables; flags override both.

mod commands;
mod config;

use std::{io, path::PathBuf};

use anyhow::bail;
use chrono::{DateTime, TimeDelta, Utc};
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use transplant_core::{
  blood::BloodProfile,
  catalog::{DonorFilter, OrganFilter},
  hospital::HospitalContext,
};

use crate::config::Settings;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "transplant", author, version, about = "Donor registry checks and organ matching")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "transplant.toml")]
  config: PathBuf,

  /// Hospital the operator works at.
  #[arg(long, env = "TRANSPLANT_HOSPITAL")]
  hospital: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Check personal identity codes and show the encoded birth date.
  ValidateId {
    #[arg(required = true)]
    codes: Vec<String>,
  },

  /// Show the viability window of an organ.
  Viability {
    /// Organ name, in English or Bulgarian.
    organ: String,

    /// Harvest time (RFC 3339). Omit for an organ not yet harvested.
    #[arg(long, conflicts_with = "hours_ago")]
    harvested: Option<DateTime<Utc>>,

    /// Harvest time as hours before now.
    #[arg(long)]
    hours_ago: Option<i64>,
  },

  /// Search the donor registry. Identity codes are shown masked.
  Donors {
    #[arg(long, value_name = "FILE")]
    donors: Option<PathBuf>,

    /// Part of the donor's name, any case.
    #[arg(long)]
    name: Option<String>,

    /// Only donors registered by this hospital.
    #[arg(long, value_name = "HOSPITAL", conflicts_with = "local")]
    at: Option<String>,

    /// Only donors registered by the current hospital.
    #[arg(long)]
    local: bool,

    /// Blood profile, e.g. `A+` or `O-`.
    #[arg(long)]
    blood: Option<BloodProfile>,

    /// Only donors offering this organ.
    #[arg(long)]
    organ: Option<String>,
  },

  /// List organs on offer.
  Organs {
    /// Donor registry (JSON).
    #[arg(long, value_name = "FILE")]
    donors: Option<PathBuf>,

    /// Only this organ.
    #[arg(long)]
    organ: Option<String>,

    /// Only organs registered by the current hospital.
    #[arg(long)]
    local: bool,

    /// Include expired organs.
    #[arg(long)]
    all: bool,
  },

  /// Rank offered organs for a recipient.
  Rank {
    organ: String,

    /// Recipient blood profile, e.g. `A+` or `O-`.
    #[arg(short, long)]
    recipient: BloodProfile,

    #[arg(long, value_name = "FILE")]
    donors: Option<PathBuf>,

    /// Show at most this many candidates.
    #[arg(short = 'n', long)]
    limit: Option<usize>,
  },

  /// Validate every donor record in the registry.
  Check {
    #[arg(long, value_name = "FILE")]
    donors: Option<PathBuf>,
  },
}

// ─── Entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;
  let context = cli
    .hospital
    .or_else(|| settings.hospital.clone())
    .map(HospitalContext::new);
  if let Some(ctx) = context.as_ref().filter(|c| c.location().is_none()) {
    tracing::warn!(hospital = ctx.name(), "hospital is not in the directory");
  }

  // One instant for the whole run.
  let now = Utc::now();
  let mut out = io::stdout().lock();

  match cli.command {
    Command::ValidateId { codes } => {
      let invalid = commands::validate_ids(&mut out, &codes)?;
      if invalid > 0 {
        bail!("{invalid} of {} identity codes are invalid", codes.len());
      }
    }

    Command::Viability { organ, harvested, hours_ago } => {
      let harvested = match (harvested, hours_ago) {
        (None, Some(h)) => Some(hours_before(now, h)?),
        (harvested, _) => harvested,
      };
      commands::viability(&mut out, &organ, harvested, now)?;
    }

    Command::Donors { donors, name, at, local, blood, organ } => {
      let donors = commands::load_donors(&settings.donors_path(donors)?)?;
      let hospital = match (&context, local) {
        (Some(ctx), true) => Some(ctx.name().to_owned()),
        (None, true) => bail!("--local needs a hospital; pass --hospital or set it in the config"),
        (_, false) => at,
      };
      let filter = DonorFilter { name, hospital, blood, organ };
      commands::donors(&mut out, &donors, &filter, now)?;
    }

    Command::Organs { donors, organ, local, all } => {
      let donors = commands::load_donors(&settings.donors_path(donors)?)?;
      let hospital = match (&context, local) {
        (Some(ctx), true) => Some(ctx.name().to_owned()),
        (None, true) => bail!("--local needs a hospital; pass --hospital or set it in the config"),
        (_, false) => None,
      };
      let filter = OrganFilter {
        organ,
        hospital,
        show_expired: all || settings.show_expired,
      };
      commands::organs(&mut out, &donors, &filter, context.as_ref(), now)?;
    }

    Command::Rank { organ, recipient, donors, limit } => {
      let donors = commands::load_donors(&settings.donors_path(donors)?)?;
      commands::rank(&mut out, &donors, &organ, recipient, context.as_ref(), limit, now)?;
    }

    Command::Check { donors } => {
      let donors = commands::load_donors(&settings.donors_path(donors)?)?;
      let failing = commands::check(&mut out, &donors, now)?;
      if failing > 0 {
        bail!("{failing} of {} donor records need attention", donors.len());
      }
    }
  }

  Ok(())
}

/// The instant `hours` hours before `now`.
fn hours_before(now: DateTime<Utc>, hours: i64) -> anyhow::Result<DateTime<Utc>> {
  match TimeDelta::try_hours(hours).and_then(|d| now.checked_sub_signed(d)) {
    Some(at) => Ok(at),
    None => bail!("--hours-ago {hours} is out of range"),
  }
}
