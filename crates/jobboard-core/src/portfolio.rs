//! Portfolio records referenced by applications: pages and projects.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// A portfolio page; creators attach pages when applying to client jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
  pub page_id:  Uuid,
  pub owner_id: Uuid,
  pub name:     String,
  pub slug:     String,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum ProjectKind {
  LongForm,
  ShortForm,
  Design,
  #[serde(rename = "PDF")]
  #[strum(serialize = "PDF")]
  Pdf,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LongFormState {
  Init,
  Saved,
}

/// A portfolio project; PMs attach projects as content samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  pub project_id:      Uuid,
  pub owner_id:        Uuid,
  pub title:           String,
  pub kind:            ProjectKind,
  /// Only set for long-form projects.
  pub long_form_state: Option<LongFormState>,
  pub public:          bool,
  pub cover_image:     Option<String>,
}

impl Project {
  /// Whether this project may be shown to a client as a content sample:
  /// anything but a long form, or a saved public long form.
  pub fn is_shareable(&self) -> bool {
    match self.kind {
      ProjectKind::LongForm => {
        self.long_form_state == Some(LongFormState::Saved) && self.public
      }
      _ => true,
    }
  }
}

#[derive(Debug, Clone)]
pub struct NewPage {
  pub owner_id: Uuid,
  pub name:     String,
  pub slug:     String,
}

/// Input to [`crate::store::JobBoardStore::create_project`].
#[derive(Debug, Clone)]
pub struct NewProject {
  pub owner_id:        Uuid,
  pub title:           String,
  pub kind:            ProjectKind,
  pub long_form_state: Option<LongFormState>,
  pub public:          bool,
  pub cover_image:     Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn project(kind: ProjectKind, state: Option<LongFormState>, public: bool) -> Project {
    Project {
      project_id: Uuid::new_v4(),
      owner_id: Uuid::new_v4(),
      title: "Sample".into(),
      kind,
      long_form_state: state,
      public,
      cover_image: None,
    }
  }

  #[test]
  fn private_long_forms_are_not_shareable() {
    assert!(!project(ProjectKind::LongForm, Some(LongFormState::Saved), false).is_shareable());
    assert!(!project(ProjectKind::LongForm, Some(LongFormState::Init), true).is_shareable());
    assert!(project(ProjectKind::LongForm, Some(LongFormState::Saved), true).is_shareable());
  }

  #[test]
  fn other_kinds_are_shareable() {
    assert!(project(ProjectKind::Design, None, false).is_shareable());
    assert!(project(ProjectKind::Pdf, None, false).is_shareable());
  }
}
