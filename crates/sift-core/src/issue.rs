//! # Issue Taxonomy & Collector
//!
//! Defines the closed [`IssueCode`] taxonomy, the structured [`Issue`]
//! record produced for every validation failure, and the append-only
//! [`IssueCollector`] threaded through one parse invocation.
//!
//! ## Taxonomy Invariant
//!
//! Codes are extend-only. A code is never repurposed; new failure classes
//! get new codes. Every `match` on [`IssueCode`] is exhaustive, so adding a
//! code is a compile error until every renderer handles it.
//!
//! ## Ordering
//!
//! The collector is keyed by insertion order only. It never deduplicates or
//! merges issues reported at the same path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::UnknownIssueCode;
use crate::path::IssuePath;

// ─── Issue Code ──────────────────────────────────────────────────────

/// Every failure class the engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// The value's runtime kind does not match the schema kind.
    InvalidType,
    /// No member of a union accepted the value.
    InvalidUnion,
    /// A numeric or size lower bound was violated.
    TooSmall,
    /// A numeric or size upper bound was violated.
    TooBig,
    /// A number is not a multiple of the required divisor.
    NotMultipleOf,
    /// A string failed a pattern, affix, case, MIME or named-format check.
    InvalidFormat,
    /// A user refinement or custom check failed.
    Custom,
    /// The value is not one of an allowed set.
    InvalidValue,
    /// A strict object received keys outside its shape.
    UnrecognizedKeys,
    /// Meta-code: the schema itself is misconfigured or used in the wrong
    /// execution mode. Raised, never collected.
    InvalidConfiguration,
}

/// Total number of issue codes. Used for exhaustiveness assertions.
pub const ISSUE_CODE_COUNT: usize = 10;

impl IssueCode {
    pub fn all_codes() -> &'static [IssueCode] {
        &[
            Self::InvalidType,
            Self::InvalidUnion,
            Self::TooSmall,
            Self::TooBig,
            Self::NotMultipleOf,
            Self::InvalidFormat,
            Self::Custom,
            Self::InvalidValue,
            Self::UnrecognizedKeys,
            Self::InvalidConfiguration,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidType => "invalid_type",
            Self::InvalidUnion => "invalid_union",
            Self::TooSmall => "too_small",
            Self::TooBig => "too_big",
            Self::NotMultipleOf => "not_multiple_of",
            Self::InvalidFormat => "invalid_format",
            Self::Custom => "custom",
            Self::InvalidValue => "invalid_value",
            Self::UnrecognizedKeys => "unrecognized_keys",
            Self::InvalidConfiguration => "invalid_configuration",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueCode {
    type Err = UnknownIssueCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all_codes()
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownIssueCode(s.to_string()))
    }
}

// ─── Severity ────────────────────────────────────────────────────────

/// Issue severity. A single level exists today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Error,
}

// ─── Value Types ─────────────────────────────────────────────────────

/// Runtime type names used for `expected` / `received` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Number,
    /// A number with no fractional part within the safe integer range.
    Int,
    Boolean,
    Null,
    Object,
    Array,
    /// No value at all (an absent object field).
    Missing,
    /// The type nothing satisfies.
    Never,
}

impl ValueType {
    /// The runtime type of a present JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Like [`ValueType::of`] but maps an absent value to `Missing`.
    pub fn of_input(value: Option<&Value>) -> Self {
        value.map_or(Self::Missing, Self::of)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Int => "int",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Object => "object",
            Self::Array => "array",
            Self::Missing => "missing",
            Self::Never => "never",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a size or numeric bound was measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeOrigin {
    /// Character count of a string.
    String,
    /// Numeric value.
    Number,
    /// Element count of an array or tuple.
    Array,
    /// Entry count of a record.
    Record,
}

impl SizeOrigin {
    /// Unit noun used by message renderers, `None` for plain numbers.
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            Self::String => Some("characters"),
            Self::Array => Some("items"),
            Self::Record => Some("entries"),
            Self::Number => None,
        }
    }
}

// ─── Issue ───────────────────────────────────────────────────────────

/// Code-specific parameters needed to render a message.
///
/// The variant determines the issue code; see [`IssueDetail::code`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum IssueDetail {
    InvalidType {
        expected: ValueType,
        received: ValueType,
    },
    InvalidUnion {
        /// Issues of every attempted member, in member order.
        errors: Vec<Vec<Issue>>,
    },
    TooSmall {
        origin: SizeOrigin,
        minimum: f64,
        inclusive: bool,
        /// Set when the bound came from an exact-size check.
        exact: bool,
    },
    TooBig {
        origin: SizeOrigin,
        maximum: f64,
        inclusive: bool,
        exact: bool,
    },
    NotMultipleOf {
        divisor: f64,
    },
    InvalidFormat {
        /// Format name, e.g. `regex`, `starts_with`, `email`, `mime`.
        format: String,
        /// Pattern, affix or allowed list that was checked against.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },
    Custom {
        /// Arbitrary parameters supplied by the refinement.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        params: Option<Value>,
    },
    InvalidValue {
        /// The allowed values.
        values: Vec<Value>,
    },
    UnrecognizedKeys {
        keys: Vec<String>,
    },
}

impl IssueDetail {
    pub fn code(&self) -> IssueCode {
        match self {
            Self::InvalidType { .. } => IssueCode::InvalidType,
            Self::InvalidUnion { .. } => IssueCode::InvalidUnion,
            Self::TooSmall { .. } => IssueCode::TooSmall,
            Self::TooBig { .. } => IssueCode::TooBig,
            Self::NotMultipleOf { .. } => IssueCode::NotMultipleOf,
            Self::InvalidFormat { .. } => IssueCode::InvalidFormat,
            Self::Custom { .. } => IssueCode::Custom,
            Self::InvalidValue { .. } => IssueCode::InvalidValue,
            Self::UnrecognizedKeys { .. } => IssueCode::UnrecognizedKeys,
        }
    }
}

/// One structured validation failure.
///
/// Issues are created by the executor, rendered once by the locale
/// formatter when the walk exits, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Where in the input the failure occurred.
    pub path: IssuePath,
    /// Code and rendering parameters.
    #[serde(flatten)]
    pub detail: IssueDetail,
    #[serde(default)]
    pub severity: Severity,
    /// Rendered message. `None` until the formatter has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Message supplied by the schema author; takes precedence over the locale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
    /// The offending input, present only when input reporting was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
}

impl Issue {
    pub fn new(path: IssuePath, detail: IssueDetail) -> Self {
        Self {
            path,
            detail,
            severity: Severity::Error,
            message: None,
            custom_message: None,
            input: None,
        }
    }

    pub fn code(&self) -> IssueCode {
        self.detail.code()
    }

    pub fn with_custom_message(mut self, message: Option<String>) -> Self {
        self.custom_message = message;
        self
    }

    pub fn with_input(mut self, input: Option<Value>) -> Self {
        self.input = input;
        self
    }

    /// Sub-issues of an `invalid_union` issue, empty for every other code.
    pub fn union_errors(&self) -> &[Vec<Issue>] {
        match &self.detail {
            IssueDetail::InvalidUnion { errors } => errors,
            _ => &[],
        }
    }

    /// The rendered message, or an empty string before rendering.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }
}

// ─── Collector ───────────────────────────────────────────────────────

/// Ordered, append-only issue log for one parse invocation.
#[derive(Debug, Default)]
pub struct IssueCollector {
    issues: Vec<Issue>,
}

impl IssueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = Issue>) {
        self.issues.extend(issues);
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Position marker for [`IssueCollector::has_issues_since`].
    pub fn mark(&self) -> usize {
        self.issues.len()
    }

    /// Whether any issue was appended after `mark` was taken.
    pub fn has_issues_since(&self, mark: usize) -> bool {
        self.issues.len() > mark
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}
