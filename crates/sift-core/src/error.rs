//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types surfaced by the engine. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Validation failures are data: [`ValidationError`] carries the full,
//!   ordered issue list of one parse invocation.
//! - Configuration errors are misuse by the schema author. They are raised
//!   immediately and never collected as issues, because no input path can
//!   be blamed for them.
//! - Execution errors (configuration, cancellation, timeout) are distinct
//!   from validation failures; `safe_parse*` only ever raises these.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::issue::{Issue, IssueCode};
use crate::path::IssuePath;

/// A string that does not name any [`IssueCode`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown issue code: {0:?}")]
pub struct UnknownIssueCode(pub String);

/// The schema definition is invalid, or was evaluated in a mode it cannot
/// support. Always carries the `invalid_configuration` meta-code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A check was attached to a kind it does not apply to.
    #[error("check '{check}' cannot be attached to a {kind} schema")]
    IncompatibleCheck {
        /// Name of the rejected check.
        check: String,
        /// Name of the schema kind.
        kind: String,
    },

    /// An asynchronous check was reached during a synchronous parse.
    #[error("asynchronous check '{check}' encountered during synchronous parse at '{path}'; use an async entry point")]
    AsyncCheckInSyncParse {
        /// Name of the asynchronous check.
        check: String,
        /// Path of the node that owns the check.
        path: IssuePath,
    },

    /// A regular expression failed to compile.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The source pattern.
        pattern: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// The schema definition is structurally unsound.
    #[error("invalid schema definition: {0}")]
    InvalidDefinition(String),
}

impl ConfigurationError {
    pub fn code(&self) -> IssueCode {
        IssueCode::InvalidConfiguration
    }
}

/// A parse invocation that could not run to completion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The schema is misconfigured for this invocation.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The caller cancelled an asynchronous parse.
    #[error("parse cancelled")]
    Cancelled,

    /// An asynchronous parse exceeded its deadline.
    #[error("parse timed out after {after:?}")]
    TimedOut {
        /// The configured timeout.
        after: Duration,
    },
}

/// Aggregated validation failure: every issue collected in one parse,
/// in depth-first declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    issues: Vec<Issue>,
}

impl ValidationError {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// Returns the number of top-level issues.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns true if there are no issues.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns a slice of all issues.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed with {} issue(s)", self.issues.len())?;
        for issue in &self.issues {
            writeln!(f)?;
            if issue.path.is_root() {
                write!(f, "  (root): [{}] {}", issue.code(), issue.message())?;
            } else {
                write!(f, "  {}: [{}] {}", issue.path, issue.code(), issue.message())?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Failure of a raising entry point (`parse`, `parse_async`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The input did not conform to the schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The parse could not run to completion.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl ParseError {
    /// The collected issues, if this is a validation failure.
    pub fn issues(&self) -> Option<&[Issue]> {
        match self {
            Self::Validation(err) => Some(err.issues()),
            Self::Execution(_) => None,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Execution(ExecutionError::Configuration(_)))
    }
}

impl From<ConfigurationError> for ParseError {
    fn from(err: ConfigurationError) -> Self {
        Self::Execution(ExecutionError::Configuration(err))
    }
}
