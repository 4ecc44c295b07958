//! # Failure Reports
//!
//! Alternative views over a [`ValidationError`]: a flattened form/field
//! grouping suitable for form UIs, and a multi-line human summary.
//! Both consume rendered messages, so they reflect whichever locale was
//! active when the parse finished.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::path::PathSegment;

/// Messages grouped by the first path segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenedError {
    /// Messages of issues reported at the root.
    pub form_errors: Vec<String>,
    /// Messages keyed by top-level field (or index), in issue order.
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    /// Group messages into root-level and top-level-field buckets.
    pub fn flatten(&self) -> FlattenedError {
        let mut flat = FlattenedError::default();
        for issue in self.issues() {
            let message = issue.message().to_string();
            match issue.path.first() {
                None => flat.form_errors.push(message),
                Some(PathSegment::Key(key)) => {
                    flat.field_errors.entry(key.clone()).or_default().push(message)
                }
                Some(PathSegment::Index(index)) => flat
                    .field_errors
                    .entry(index.to_string())
                    .or_default()
                    .push(message),
            }
        }
        flat
    }

    /// Human-readable multi-line summary, one block per issue:
    ///
    /// ```text
    /// ✖ Invalid input
    ///   → at user.email
    /// ```
    pub fn prettify(&self) -> String {
        let mut lines = Vec::with_capacity(self.len() * 2);
        for issue in self.issues() {
            lines.push(format!("✖ {}", issue.message()));
            if !issue.path.is_root() {
                lines.push(format!("  → at {}", issue.path));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{Issue, IssueDetail};
    use crate::path::IssuePath;

    fn rendered(path: IssuePath, message: &str) -> Issue {
        let mut issue = Issue::new(path, IssueDetail::Custom { params: None });
        issue.message = Some(message.to_string());
        issue
    }

    #[test]
    fn test_flatten_splits_form_and_field_errors() {
        let err = ValidationError::new(vec![
            rendered(IssuePath::root(), "passwords differ"),
            rendered(["email"].into_iter().collect(), "bad email"),
            rendered(["email"].into_iter().collect(), "too long"),
            rendered(
                [PathSegment::from("tags"), PathSegment::Index(1)].into_iter().collect(),
                "bad tag",
            ),
        ]);
        let flat = err.flatten();
        assert_eq!(flat.form_errors, vec!["passwords differ"]);
        assert_eq!(flat.field_errors["email"], vec!["bad email", "too long"]);
        assert_eq!(flat.field_errors["tags"], vec!["bad tag"]);
    }

    #[test]
    fn test_prettify_omits_root_location() {
        let err = ValidationError::new(vec![
            rendered(IssuePath::root(), "Invalid input"),
            rendered(
                [PathSegment::from("user"), PathSegment::from("email")].into_iter().collect(),
                "Invalid email",
            ),
        ]);
        assert_eq!(
            err.prettify(),
            "✖ Invalid input\n✖ Invalid email\n  → at user.email"
        );
    }
}
