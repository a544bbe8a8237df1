//! Input checks shared by the `New*` records.

use chrono::{DateTime, Datelike as _, Utc};

use crate::{Error, Result};

/// Reject empty required fields and values longer than `max` characters.
pub(crate) fn check_text(
  field: &str,
  value: &str,
  max: Option<usize>,
  required: bool,
) -> Result<()> {
  if required && value.trim().is_empty() {
    return Err(Error::InvalidInput(format!("{field} must not be empty")));
  }
  if let Some(max) = max
    && value.chars().count() > max
  {
    return Err(Error::InvalidInput(format!(
      "{field} exceeds {max} characters"
    )));
  }
  Ok(())
}

/// [`check_text`] for a field that may be absent.
pub(crate) fn check_optional_text(
  field: &str,
  value: Option<&str>,
  max: Option<usize>,
) -> Result<()> {
  match value {
    Some(value) => check_text(field, value, max, false),
    None => Ok(()),
  }
}

/// Timestamps are stored as fixed-width text, which only orders correctly
/// for four-digit years.
pub(crate) fn check_timestamp(field: &str, value: Option<DateTime<Utc>>) -> Result<()> {
  match value {
    Some(at) if !(0..=9999).contains(&at.year()) => Err(Error::InvalidInput(
      format!("{field} must fall within years 0000-9999"),
    )),
    _ => Ok(()),
  }
}
