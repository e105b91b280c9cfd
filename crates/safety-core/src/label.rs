//! Key/label handling shared by every enumerated classification.
//!
//! Each enum has a stable snake_case `key` (stored in the database and used on
//! the wire) and a human-readable `label` (the wording printed on the
//! regulatory forms). Free-text input, such as a CSV cell, is matched against
//! both.

use strum::IntoEnumIterator;

use crate::{Error, Result};

/// Lower-case `s` and strip underscores and whitespace.
///
/// `"Incident Date"`, `"incident_date"` and `"INCIDENTDATE"` all normalize to
/// `"incidentdate"`.
pub fn normalize(s: &str) -> String {
  s.chars()
    .filter(|c| *c != '_' && !c.is_whitespace())
    .flat_map(char::to_lowercase)
    .collect()
}

/// An enumerated classification with a storage key and a display label.
pub trait Labeled: Copy + IntoEnumIterator + 'static {
  /// Name of the classification, used in error messages.
  const KIND: &'static str;

  fn key(self) -> &'static str;

  fn label(self) -> &'static str;

  /// Exact lookup by storage key.
  fn from_key(key: &str) -> Option<Self> {
    Self::iter().find(|v| v.key() == key)
  }

  /// Lenient lookup for user input: the key or the label, compared
  /// case-insensitively, falling back to the normalized key.
  fn parse_label(value: &str) -> Result<Self> {
    let value = value.trim();
    Self::iter()
      .find(|v| {
        v.key().eq_ignore_ascii_case(value)
          || v.label().eq_ignore_ascii_case(value)
      })
      .or_else(|| {
        let wanted = normalize(value);
        Self::iter().find(|v| normalize(v.key()) == wanted)
      })
      .ok_or_else(|| Error::UnknownLabel {
        kind:  Self::KIND,
        value: value.to_owned(),
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_strips_separators_and_case() {
    assert_eq!(normalize("Incident Date"), "incidentdate");
    assert_eq!(normalize("incident_date"), "incidentdate");
    assert_eq!(normalize(" EMPLOYEE_NAME "), "employeename");
  }
}
