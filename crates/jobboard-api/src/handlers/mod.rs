//! Route handlers, split by the side of the board they serve.

pub mod applicant;
pub mod poster;

use std::str::FromStr;

use serde::Deserialize;
use validator::ValidationError;

use crate::error::ApiError;

/// `?page=` on the GET listings.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
  pub page: Option<i64>,
}

/// Status filters arrive as strings where `null` and `""` both mean "any".
fn optional_status<T: FromStr>(field: &str, raw: Option<String>) -> Result<Option<T>, ApiError> {
  raw
    .filter(|s| !s.is_empty())
    .map(|s| {
      s.parse::<T>()
        .map_err(|_| ApiError::Validation(format!("\"{field}\" has an unknown value '{s}'")))
    })
    .transpose()
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    return Err(ValidationError::new("blank"));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use jobboard_core::application::ApplicationStatus;

  use super::*;

  #[test]
  fn empty_status_means_any() {
    let s: Option<ApplicationStatus> = optional_status("status", Some(String::new())).unwrap();
    assert_eq!(s, None);
    let s: Option<ApplicationStatus> = optional_status("status", None).unwrap();
    assert_eq!(s, None);
  }

  #[test]
  fn known_status_parses() {
    let s: Option<ApplicationStatus> =
      optional_status("status", Some("shortlisted".into())).unwrap();
    assert_eq!(s, Some(ApplicationStatus::Shortlisted));
  }

  #[test]
  fn unknown_status_is_a_validation_error() {
    let err = optional_status::<ApplicationStatus>("status", Some("maybe".into())).unwrap_err();
    assert!(matches!(err, ApiError::Validation(m) if m.contains("maybe")));
  }
}
