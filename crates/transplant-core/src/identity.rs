//! Bulgarian personal identity codes (EGN).
//!
//! A code is ten ASCII digits: a `YYMMDD` birth date, a three-digit serial and
//! a checksum digit. The month field also carries the century: births in the
//! 1800s add 20 to the month, births in the 2000s add 40.
//!
//! [`validate`] and [`extract_birth_date`] are total over arbitrary strings;
//! they back the interactive intake form, which feeds them partial input on
//! every keystroke. No trimming or normalisation happens here.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of digits in an identity code.
pub const CODE_LEN: usize = 10;

/// Per-position weights applied to the first nine digits.
pub const CHECKSUM_WEIGHTS: [u32; 9] = [2, 4, 8, 5, 10, 9, 7, 3, 6];

/// Why a string was rejected as an identity code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdentityError {
  #[error("expected {CODE_LEN} digits, got {0} characters")]
  WrongLength(usize),

  #[error("code contains a non-digit character")]
  NonDigit,

  #[error("encoded birth date does not exist")]
  ImpossibleDate,

  #[error("checksum digit is {found}, expected {expected}")]
  ChecksumMismatch { expected: u8, found: u8 },
}

// ─── Free functions ──────────────────────────────────────────────────────────

/// `true` iff `code` is ten digits encoding a real date with a correct
/// checksum.
pub fn validate(code: &str) -> bool { IdentityCode::parse(code).is_ok() }

/// Decode the birth date embedded in `code`.
///
/// Only the shape and the date are checked; the checksum is ignored so the
/// intake form can auto-fill the birth date before the last digit is typed
/// correctly.
pub fn extract_birth_date(code: &str) -> Option<NaiveDate> {
  digits(code).ok().and_then(|d| decode_date(&d))
}

/// Cross-check a declared birth date against the one encoded in `code`.
pub fn matches_birth_date(code: &str, date: NaiveDate) -> bool {
  extract_birth_date(code) == Some(date)
}

/// Leading digits left readable by [`mask`].
pub const MASK_VISIBLE: usize = 4;

/// Hide everything after the year and month: `8503154419` becomes
/// `8503******`. Anything shorter than a full code comes back unchanged.
pub fn mask(code: &str) -> String {
  if code.chars().count() < CODE_LEN {
    return code.to_owned();
  }
  let mut masked: String = code.chars().take(MASK_VISIBLE).collect();
  masked.push_str(&"*".repeat(CODE_LEN - MASK_VISIBLE));
  masked
}

/// Checksum digit for the first nine digits of a code.
///
/// Weighted sum modulo 11; a remainder of 10 maps to 0. Digits past the ninth
/// are ignored.
pub fn checksum_digit(digits: &[u8]) -> u8 {
  let sum: u32 = digits
    .iter()
    .zip(CHECKSUM_WEIGHTS)
    .map(|(&d, w)| u32::from(d) * w)
    .sum();
  match sum % 11 {
    10 => 0,
    r => r as u8,
  }
}

fn digits(code: &str) -> Result<[u8; CODE_LEN], IdentityError> {
  let len = code.chars().count();
  if len != CODE_LEN {
    return Err(IdentityError::WrongLength(len));
  }

  let mut out = [0u8; CODE_LEN];
  for (slot, b) in out.iter_mut().zip(code.bytes()) {
    if !b.is_ascii_digit() {
      return Err(IdentityError::NonDigit);
    }
    *slot = b - b'0';
  }
  Ok(out)
}

fn decode_date(d: &[u8; CODE_LEN]) -> Option<NaiveDate> {
  let yy = i32::from(d[0] * 10 + d[1]);
  let mm = u32::from(d[2] * 10 + d[3]);
  let dd = u32::from(d[4] * 10 + d[5]);

  let (year, month) = if mm > 40 {
    (2000 + yy, mm - 40)
  } else if mm > 20 {
    (1800 + yy, mm - 20)
  } else {
    (1900 + yy, mm)
  };

  NaiveDate::from_ymd_opt(year, month, dd)
}

// ─── IdentityCode ────────────────────────────────────────────────────────────

/// A validated identity code. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityCode {
  digits:     [u8; CODE_LEN],
  birth_date: NaiveDate,
}

impl IdentityCode {
  /// Parse and fully validate `code`, reporting the first failed check.
  pub fn parse(code: &str) -> Result<Self, IdentityError> {
    let digits = digits(code)?;
    let birth_date = decode_date(&digits).ok_or(IdentityError::ImpossibleDate)?;

    let expected = checksum_digit(&digits[..9]);
    let found = digits[9];
    if expected != found {
      return Err(IdentityError::ChecksumMismatch { expected, found });
    }

    Ok(Self { digits, birth_date })
  }

  /// Build the code for `birth_date` and a serial in `0..=999`.
  ///
  /// Returns `None` for serials above 999 or years outside 1800–2099, which
  /// the month offset cannot express.
  pub fn encode(birth_date: NaiveDate, serial: u16) -> Option<Self> {
    if serial > 999 {
      return None;
    }
    let offset = match birth_date.year() {
      1800..=1899 => 20,
      1900..=1999 => 0,
      2000..=2099 => 40,
      _ => return None,
    };

    let yy = birth_date.year().rem_euclid(100) as u32;
    let mm = birth_date.month() + offset;
    let dd = birth_date.day();
    let serial = u32::from(serial);
    let fields = [
      yy / 10,
      yy % 10,
      mm / 10,
      mm % 10,
      dd / 10,
      dd % 10,
      serial / 100,
      serial / 10 % 10,
      serial % 10,
    ];

    let mut digits = [0u8; CODE_LEN];
    for (slot, value) in digits.iter_mut().zip(fields) {
      *slot = value as u8;
    }
    digits[9] = checksum_digit(&digits[..9]);

    Some(Self { digits, birth_date })
  }

  pub fn birth_date(&self) -> NaiveDate { self.birth_date }

  /// The three-digit serial between the date and the checksum.
  pub fn serial(&self) -> u16 {
    u16::from(self.digits[6]) * 100
      + u16::from(self.digits[7]) * 10
      + u16::from(self.digits[8])
  }

  pub fn checksum(&self) -> u8 { self.digits[9] }

  /// The code with the day and serial hidden, see [`mask`].
  pub fn masked(&self) -> String { mask(&self.to_string()) }
}

impl fmt::Display for IdentityCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for d in self.digits {
      write!(f, "{d}")?;
    }
    Ok(())
  }
}

impl FromStr for IdentityCode {
  type Err = IdentityError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl TryFrom<String> for IdentityCode {
  type Error = IdentityError;

  fn try_from(s: String) -> Result<Self, Self::Error> { Self::parse(&s) }
}

impl From<IdentityCode> for String {
  fn from(code: IdentityCode) -> Self { code.to_string() }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn decodes_twentieth_century_date() {
    assert_eq!(extract_birth_date("8503154412"), Some(date(1985, 3, 15)));
  }

  #[test]
  fn checksum_is_checked_independently_of_date() {
    // 8*2 + 5*4 + 0*8 + 3*5 + 1*10 + 5*9 + 4*7 + 4*3 + 1*6 = 152, 152 % 11 = 9
    assert_eq!(checksum_digit(&[8, 5, 0, 3, 1, 5, 4, 4, 1]), 9);
    assert!(!validate("8503154412"));
    assert!(validate("8503154419"));
    assert_eq!(
      IdentityCode::parse("8503154412"),
      Err(IdentityError::ChecksumMismatch { expected: 9, found: 2 }),
    );
  }

  #[test]
  fn month_over_forty_is_two_thousands() {
    assert_eq!(extract_birth_date("0543150001"), Some(date(2005, 3, 15)));
    assert!(validate("0543150001"));
  }

  #[test]
  fn month_over_twenty_is_eighteen_hundreds() {
    assert_eq!(extract_birth_date("8523150001"), Some(date(1885, 3, 15)));
    assert!(validate("8523150001"));
  }

  #[test]
  fn century_boundaries_are_exclusive() {
    // Month field 20 stays in the 1900s (month 20 does not exist); month
    // field 40 is the 1800s with month 20, also impossible.
    assert_eq!(extract_birth_date("8520150000"), None);
    assert_eq!(extract_birth_date("8540070000"), None);
    assert_eq!(extract_birth_date("8521150000"), Some(date(1885, 1, 15)));
    assert_eq!(extract_birth_date("8541150000"), Some(date(2085, 1, 15)));
  }

  #[test]
  fn masking_keeps_year_and_month() {
    assert_eq!(mask("8503154419"), "8503******");
    assert_eq!(mask("8503154412"), "8503******");
    assert_eq!(mask("850315"), "850315");
    assert_eq!(mask(""), "");
    assert_eq!(mask("абвгдежзий"), "абвг******");
    assert_eq!(IdentityCode::parse("8503154419").unwrap().masked(), "8503******");
  }

  #[test]
  fn remainder_ten_maps_to_zero() {
    // 7*2 + 5*4 + 1*5 + 1*9 + 1*6 = 54, 54 % 11 = 10
    assert_eq!(checksum_digit(&[7, 5, 0, 1, 0, 1, 0, 0, 1]), 0);
    assert!(validate("7501010010"));
  }

  #[test]
  fn rejects_impossible_dates() {
    assert_eq!(IdentityCode::parse("8503324410"), Err(IdentityError::ImpossibleDate));
    assert_eq!(extract_birth_date("8500150000"), None);
    // 2001 is not a leap year; 2000 is.
    assert_eq!(extract_birth_date("0142290000"), None);
    assert_eq!(extract_birth_date("0042290000"), Some(date(2000, 2, 29)));
    assert!(validate("0042290000"));
  }

  #[test]
  fn rejects_malformed_strings() {
    assert_eq!(IdentityCode::parse(""), Err(IdentityError::WrongLength(0)));
    assert_eq!(IdentityCode::parse("850315441"), Err(IdentityError::WrongLength(9)));
    assert_eq!(IdentityCode::parse("85031544190"), Err(IdentityError::WrongLength(11)));
    assert_eq!(IdentityCode::parse("85O3154419"), Err(IdentityError::NonDigit));
    assert_eq!(IdentityCode::parse(" 503154419"), Err(IdentityError::NonDigit));
    assert!(!validate("８５０３１５４４１９"));
    assert_eq!(extract_birth_date("абвгдежзий"), None);
  }

  #[test]
  fn encode_round_trips_through_parse() {
    for (d, serial) in [
      (date(1985, 3, 15), 441),
      (date(1885, 12, 31), 0),
      (date(2005, 3, 15), 999),
      (date(2000, 2, 29), 17),
    ] {
      let code = IdentityCode::encode(d, serial).unwrap();
      let parsed = IdentityCode::parse(&code.to_string()).unwrap();
      assert_eq!(parsed, code);
      assert_eq!(parsed.birth_date(), d);
      assert_eq!(parsed.serial(), serial);
    }
    assert_eq!(IdentityCode::encode(date(1985, 3, 15), 441).unwrap().to_string(), "8503154419");
  }

  #[test]
  fn encode_rejects_unrepresentable_input() {
    assert!(IdentityCode::encode(date(1799, 1, 1), 0).is_none());
    assert!(IdentityCode::encode(date(2100, 1, 1), 0).is_none());
    assert!(IdentityCode::encode(date(1985, 1, 1), 1000).is_none());
  }

  #[test]
  fn birth_date_cross_check() {
    assert!(matches_birth_date("8503154419", date(1985, 3, 15)));
    assert!(!matches_birth_date("8503154419", date(1985, 3, 16)));
    assert!(!matches_birth_date("garbage", date(1985, 3, 15)));
  }

  #[test]
  fn serde_uses_the_digit_string() {
    let code: IdentityCode = serde_json::from_str("\"8503154419\"").unwrap();
    assert_eq!(serde_json::to_string(&code).unwrap(), "\"8503154419\"");
    assert!(serde_json::from_str::<IdentityCode>("\"8503154412\"").is_err());
  }
}
