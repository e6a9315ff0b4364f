//! Submission — a single contact-form record.
//!
//! Submissions are created from visitor input and afterwards only touched by
//! operator triage (status, notes, tags). Identity, submitter-supplied text
//! and the derived priority never change once written.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::IgnoredAny};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{
  ValidationError,
  validate::{is_valid_email, normalize_tags, required},
};

/// Subject line stored when the submitter leaves it empty.
pub const DEFAULT_SUBJECT: &str = "No subject";

// ─── Category ────────────────────────────────────────────────────────────────

/// What the inquiry is about, as picked on the contact form.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
  Job,
  Consulting,
  Freelance,
  #[default]
  General,
  Other,
}

impl Category {
  /// Parse free-form input. Anything unrecognised (or absent) becomes
  /// [`Category::General`]; the raw value is never kept.
  pub fn coerce(input: Option<&str>) -> Self {
    input
      .and_then(|s| s.trim().parse().ok())
      .unwrap_or_default()
  }

  /// Triage rank: `job` 3, `consulting`/`freelance` 2, everything else 1.
  pub fn priority(self) -> u8 {
    match self {
      Self::Job => 3,
      Self::Consulting | Self::Freelance => 2,
      Self::General | Self::Other => 1,
    }
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Operator triage state. Any status may move to any other.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Status {
  #[default]
  New,
  Read,
  Replied,
  Archived,
}

// ─── Submission ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
  pub id:         Uuid,
  pub name:       String,
  pub email:      String,
  pub subject:    String,
  pub message:    String,
  pub category:   Category,
  /// Derived from `category` at creation; not recomputed afterwards.
  pub priority:   u8,
  pub status:     Status,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(default)]
  pub tags:       Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes:      Option<String>,
}

impl Submission {
  /// Build a fresh record from validated input. `status` starts at `new` and
  /// both timestamps are `now`.
  pub fn new(input: ValidSubmission, id: Uuid, now: DateTime<Utc>) -> Self {
    Self {
      id,
      name: input.name,
      email: input.email,
      subject: input.subject,
      message: input.message,
      priority: input.category.priority(),
      category: input.category,
      status: Status::New,
      created_at: now,
      updated_at: now,
      tags: input.tags,
      notes: None,
    }
  }

  /// Merge an operator patch and advance `updated_at`.
  ///
  /// `updated_at` always moves strictly forward, even when the clock reads
  /// the same instant as the previous write (or has stepped backwards).
  pub fn apply(&mut self, patch: SubmissionPatch, now: DateTime<Utc>) {
    if let Some(status) = patch.status {
      self.status = status;
    }
    if let Some(notes) = patch.notes {
      let notes = notes.trim();
      self.notes = (!notes.is_empty()).then(|| notes.to_owned());
    }
    if let Some(tags) = patch.tags {
      self.tags = normalize_tags(tags);
    }

    self.updated_at = if now > self.updated_at {
      now
    } else {
      self.updated_at + TimeDelta::nanoseconds(1)
    };
  }
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Raw create input, exactly as posted by the contact form.
///
/// Every field is optional at this level so that missing values surface as
/// a [`ValidationError`] naming the field rather than a generic decode error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
  pub name:     Option<String>,
  pub email:    Option<String>,
  pub subject:  Option<String>,
  pub message:  Option<String>,
  /// Non-string values are treated like unrecognised names.
  #[serde(default, deserialize_with = "lenient_category")]
  pub category: Option<String>,
  #[serde(default)]
  pub tags:     Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCategory {
  Text(String),
  Other(IgnoredAny),
}

fn lenient_category<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Option::<RawCategory>::deserialize(de)? {
    Some(RawCategory::Text(s)) => Some(s),
    Some(RawCategory::Other(_)) | None => None,
  })
}

impl NewSubmission {
  /// Convenience constructor for the three mandatory fields.
  pub fn new(
    name: impl Into<String>,
    email: impl Into<String>,
    message: impl Into<String>,
  ) -> Self {
    Self {
      name: Some(name.into()),
      email: Some(email.into()),
      message: Some(message.into()),
      ..Self::default()
    }
  }

  pub fn with_category(mut self, category: impl Into<String>) -> Self {
    self.category = Some(category.into());
    self
  }

  pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
    self.subject = Some(subject.into());
    self
  }

  /// Check mandatory fields and the email shape, trim text, coerce the
  /// category and fill in the default subject.
  pub fn validate(self) -> Result<ValidSubmission, ValidationError> {
    let name = required("name", self.name)?;
    let email = required("email", self.email)?;
    let message = required("message", self.message)?;
    if !is_valid_email(&email) {
      return Err(ValidationError::InvalidEmail);
    }

    let subject = self
      .subject
      .map(|s| s.trim().to_owned())
      .filter(|s| !s.is_empty())
      .unwrap_or_else(|| DEFAULT_SUBJECT.to_owned());

    Ok(ValidSubmission {
      name,
      email,
      subject,
      message,
      category: Category::coerce(self.category.as_deref()),
      tags: normalize_tags(self.tags),
    })
  }
}

/// Create input that has passed [`NewSubmission::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
  pub name:     String,
  pub email:    String,
  pub subject:  String,
  pub message:  String,
  pub category: Category,
  pub tags:     Vec<String>,
}

/// Operator-editable fields. Absent fields are left untouched; anything else
/// in the request body (`id`, `createdAt`, ...) is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPatch {
  pub status: Option<Status>,
  /// A blank string clears the notes.
  pub notes:  Option<String>,
  pub tags:   Option<Vec<String>>,
}

impl SubmissionPatch {
  pub fn status(status: Status) -> Self {
    Self {
      status: Some(status),
      ..Self::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn valid() -> NewSubmission {
    NewSubmission::new("Ada", "ada@example.com", "Hello there")
  }

  #[test]
  fn priority_follows_category() {
    assert_eq!(Category::Job.priority(), 3);
    assert_eq!(Category::Consulting.priority(), 2);
    assert_eq!(Category::Freelance.priority(), 2);
    assert_eq!(Category::General.priority(), 1);
    assert_eq!(Category::Other.priority(), 1);
  }

  #[test]
  fn unknown_categories_become_general() {
    assert_eq!(Category::coerce(None), Category::General);
    assert_eq!(Category::coerce(Some("")), Category::General);
    assert_eq!(Category::coerce(Some("partnership")), Category::General);
    assert_eq!(Category::coerce(Some("JOB")), Category::Job);
    assert_eq!(Category::coerce(Some(" freelance ")), Category::Freelance);
  }

  #[test]
  fn validate_fills_defaults() {
    let v = valid().validate().unwrap();
    assert_eq!(v.subject, DEFAULT_SUBJECT);
    assert_eq!(v.category, Category::General);
    assert!(v.tags.is_empty());
  }

  #[test]
  fn validate_trims_subject() {
    let v = valid().with_subject("  Quick question ").validate().unwrap();
    assert_eq!(v.subject, "Quick question");
    let v = valid().with_subject("   ").validate().unwrap();
    assert_eq!(v.subject, DEFAULT_SUBJECT);
  }

  #[test]
  fn validate_reports_first_missing_field() {
    let mut input = valid();
    input.email = None;
    assert_eq!(input.validate(), Err(ValidationError::Missing("email")));

    let mut input = valid();
    input.message = Some("  ".into());
    assert_eq!(input.validate(), Err(ValidationError::Missing("message")));
  }

  #[test]
  fn validate_rejects_bad_email() {
    let mut input = valid();
    input.email = Some("not-an-email".into());
    assert_eq!(input.validate(), Err(ValidationError::InvalidEmail));
  }

  #[test]
  fn new_submission_starts_as_new() {
    let now = Utc::now();
    let id = Uuid::new_v4();
    let s = Submission::new(valid().with_category("job").validate().unwrap(), id, now);
    assert_eq!(s.id, id);
    assert_eq!(s.status, Status::New);
    assert_eq!(s.priority, 3);
    assert_eq!(s.created_at, s.updated_at);
    assert_eq!(s.notes, None);
  }

  #[test]
  fn apply_advances_updated_at_even_with_same_clock() {
    let now = Utc::now();
    let mut s = Submission::new(valid().validate().unwrap(), Uuid::new_v4(), now);
    s.apply(SubmissionPatch::status(Status::Read), now);
    assert!(s.updated_at > s.created_at);
    assert_eq!(s.created_at, now);

    let before = s.updated_at;
    s.apply(SubmissionPatch::default(), now - TimeDelta::seconds(5));
    assert!(s.updated_at > before);
  }

  #[test]
  fn apply_merges_only_present_fields() {
    let now = Utc::now();
    let mut s = Submission::new(valid().validate().unwrap(), Uuid::new_v4(), now);
    s.apply(
      SubmissionPatch {
        status: None,
        notes:  Some("call back Monday".into()),
        tags:   Some(vec!["lead".into(), " ".into()]),
      },
      now,
    );
    assert_eq!(s.status, Status::New);
    assert_eq!(s.notes.as_deref(), Some("call back Monday"));
    assert_eq!(s.tags, vec!["lead".to_string()]);

    s.apply(
      SubmissionPatch {
        notes: Some("".into()),
        ..SubmissionPatch::default()
      },
      now,
    );
    assert_eq!(s.notes, None);
    assert_eq!(s.tags, vec!["lead".to_string()]);
  }

  #[test]
  fn non_string_category_is_unrecognised() {
    for raw in [
      r#"{"name":"A","email":"a@b.co","message":"hi","category":5}"#,
      r#"{"name":"A","email":"a@b.co","message":"hi","category":{"x":1}}"#,
      r#"{"name":"A","email":"a@b.co","message":"hi","category":null}"#,
      r#"{"name":"A","email":"a@b.co","message":"hi"}"#,
    ] {
      let input: NewSubmission = serde_json::from_str(raw).unwrap();
      assert_eq!(input.category, None, "{raw}");
      assert_eq!(input.validate().unwrap().category, Category::General);
    }

    let input: NewSubmission =
      serde_json::from_str(r#"{"category":"Consulting"}"#).unwrap();
    assert_eq!(input.category.as_deref(), Some("Consulting"));
  }

  #[test]
  fn patch_ignores_identity_fields() {
    let patch: SubmissionPatch = serde_json::from_str(
      r#"{"id":"x","createdAt":"2000-01-01T00:00:00Z","status":"archived"}"#,
    )
    .unwrap();
    assert_eq!(patch.status, Some(Status::Archived));
    assert!(patch.notes.is_none());
    assert!(patch.tags.is_none());
  }

  #[test]
  fn serialises_with_camel_case_fields() {
    let s = Submission::new(valid().validate().unwrap(), Uuid::new_v4(), Utc::now());
    let json = serde_json::to_value(&s).unwrap();
    assert!(json.get("createdAt").is_some());
    assert!(json.get("updatedAt").is_some());
    assert_eq!(json["status"], "new");
    assert_eq!(json["category"], "general");
  }
}
