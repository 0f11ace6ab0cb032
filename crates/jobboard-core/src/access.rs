//! Who may use the applicant side of the job board.
//!
//! Only Writers are gated: they must be `active` and at the `normal` creator
//! level. PMs browse and apply without restriction. Saved-job routes skip the
//! guard entirely.

use crate::{
  Error, Result,
  account::{Account, AccountStatus, CreatorLevel, Role},
};

pub fn check_job_board_access(account: &Account) -> Result<()> {
  if account.role != Role::Writer {
    return Ok(());
  }
  if account.status != AccountStatus::Active {
    return Err(Error::InvalidAccountStatus);
  }
  if account.level != CreatorLevel::Normal {
    return Err(Error::JobBoardAccessDenied);
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::account::{ApplicantRole, tests::applicant};

  #[test]
  fn active_normal_writer_passes() {
    let a = applicant(ApplicantRole::Writer);
    assert!(check_job_board_access(&a.account).is_ok());
  }

  #[test]
  fn status_is_checked_before_level() {
    let mut a = applicant(ApplicantRole::Writer).account;
    a.status = AccountStatus::New;
    a.level = CreatorLevel::Limited;
    assert!(matches!(check_job_board_access(&a), Err(Error::InvalidAccountStatus)));
  }

  #[test]
  fn limited_and_classified_writers_are_denied() {
    for level in [CreatorLevel::Limited, CreatorLevel::Classified] {
      let mut a = applicant(ApplicantRole::Writer).account;
      a.level = level;
      let err = check_job_board_access(&a).unwrap_err();
      assert_eq!(err.code(), "CRPL112");
    }
  }

  #[test]
  fn pms_are_not_gated() {
    let mut a = applicant(ApplicantRole::Pm).account;
    a.status = AccountStatus::New;
    a.level = CreatorLevel::Limited;
    assert!(check_job_board_access(&a).is_ok());
  }
}
