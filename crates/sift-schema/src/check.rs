//! # Composable Checks
//!
//! A [`CheckEntry`] is one step of a node's check pipeline. Entries fall
//! into two classes:
//!
//! - **Validations** inspect the running value and may report issues. They
//!   never replace the value and never stop the pipeline.
//! - **Rewrites** (`trim`, `to_lower_case`, `normalize`, `overwrite`, ...)
//!   replace the running value and cannot fail.
//!
//! Custom multi-issue checks may additionally abort the remaining checks of
//! their node.
//!
//! ## Applicability
//!
//! Every entry declares the schema kinds it can be attached to
//! ([`CheckEntry::applies_to`]). Attaching a string check to a boolean
//! schema is rejected when the node is built, not when data is parsed.
//!
//! ## Suspension
//!
//! Only `refine_async` and `custom_async` entries can suspend. Reaching one
//! during a synchronous parse is a configuration error.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use regex::Regex;
use serde_json::Value;
use sift_core::{ConfigurationError, Issue, IssueCollector, IssueDetail, IssuePath};
use unicode_normalization::UnicodeNormalization;

use crate::kind::{SchemaKind, TransformFn, TypeFamily};
use crate::node::Schema;

// ─── Numeric ─────────────────────────────────────────────────────────

/// A bound on a numeric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericBound {
    LessThan(f64),
    LessOrEqual(f64),
    GreaterThan(f64),
    GreaterOrEqual(f64),
    MultipleOf(f64),
}

impl NumericBound {
    pub fn holds(&self, n: f64) -> bool {
        match *self {
            Self::LessThan(max) => n < max,
            Self::LessOrEqual(max) => n <= max,
            Self::GreaterThan(min) => n > min,
            Self::GreaterOrEqual(min) => n >= min,
            Self::MultipleOf(divisor) => is_multiple_of(n, divisor),
        }
    }
}

/// Tolerant of binary rounding (`0.3` is a multiple of `0.1`).
fn is_multiple_of(n: f64, divisor: f64) -> bool {
    if divisor == 0.0 || !divisor.is_finite() {
        return false;
    }
    let quotient = n / divisor;
    (quotient - quotient.round()).abs() <= 1e-9 * quotient.abs().max(1.0)
}

// ─── Size ────────────────────────────────────────────────────────────

/// A bound on string length, element count, or entry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeBound {
    Min(usize),
    Max(usize),
    Exact(usize),
}

// ─── String Formats ──────────────────────────────────────────────────

/// A format a string value must satisfy.
#[derive(Debug, Clone)]
pub enum StringFormat {
    Regex(Regex),
    StartsWith(String),
    EndsWith(String),
    Includes(String),
    Lowercase,
    Uppercase,
    /// Allowed MIME types. `type/*` matches any subtype.
    Mime(Vec<String>),
    Email,
    Uuid,
    Url,
    /// RFC 3339 timestamp with offset.
    Datetime,
}

impl StringFormat {
    /// Format name reported in `invalid_format` issues.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Regex(_) => "regex",
            Self::StartsWith(_) => "starts_with",
            Self::EndsWith(_) => "ends_with",
            Self::Includes(_) => "includes",
            Self::Lowercase => "lowercase",
            Self::Uppercase => "uppercase",
            Self::Mime(_) => "mime",
            Self::Email => "email",
            Self::Uuid => "uuid",
            Self::Url => "url",
            Self::Datetime => "datetime",
        }
    }

    fn pattern(&self) -> Option<String> {
        match self {
            Self::Regex(re) => Some(re.as_str().to_string()),
            Self::StartsWith(s) | Self::EndsWith(s) | Self::Includes(s) => Some(s.clone()),
            Self::Mime(allowed) => Some(allowed.join(", ")),
            Self::Lowercase
            | Self::Uppercase
            | Self::Email
            | Self::Uuid
            | Self::Url
            | Self::Datetime => None,
        }
    }

    pub fn matches(&self, s: &str) -> bool {
        match self {
            Self::Regex(re) => re.is_match(s),
            Self::StartsWith(prefix) => s.starts_with(prefix.as_str()),
            Self::EndsWith(suffix) => s.ends_with(suffix.as_str()),
            Self::Includes(needle) => s.contains(needle.as_str()),
            Self::Lowercase => s == s.to_lowercase(),
            Self::Uppercase => s == s.to_uppercase(),
            Self::Mime(allowed) => mime_matches(s, allowed),
            Self::Email => email_pattern().map(|re| re.is_match(s)).unwrap_or(false),
            Self::Uuid => s.len() == 36 && uuid::Uuid::parse_str(s).is_ok(),
            Self::Url => url::Url::parse(s).is_ok(),
            Self::Datetime => chrono::DateTime::parse_from_rfc3339(s).is_ok(),
        }
    }

    fn issue_detail(&self) -> IssueDetail {
        IssueDetail::InvalidFormat {
            format: self.name().to_string(),
            pattern: self.pattern(),
        }
    }
}

fn email_pattern() -> Option<&'static Regex> {
    static EMAIL: std::sync::OnceLock<Result<Regex, regex::Error>> = std::sync::OnceLock::new();
    EMAIL
        .get_or_init(|| {
            Regex::new(
                r"^[A-Za-z0-9_'+\-]+(\.[A-Za-z0-9_'+\-]+)*@([A-Za-z0-9]([A-Za-z0-9\-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$",
            )
        })
        .as_ref()
        .ok()
}

/// Parameters after `;` and case are ignored.
fn mime_matches(s: &str, allowed: &[String]) -> bool {
    let essence = s.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    let Some((top, sub)) = essence.split_once('/') else {
        return false;
    };
    if top.is_empty() || sub.is_empty() {
        return false;
    }
    allowed.iter().any(|candidate| {
        let candidate = candidate.trim().to_ascii_lowercase();
        match candidate.split_once('/') {
            Some((ctop, "*")) => ctop == top,
            Some(_) => candidate == essence,
            None => false,
        }
    })
}

// ─── Refinements & Custom Checks ─────────────────────────────────────

type SyncPredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
type AsyncPredicate = Arc<dyn Fn(Value) -> BoxFuture<'static, bool> + Send + Sync>;

/// A refinement's predicate.
#[derive(Clone)]
pub enum Predicate {
    Sync(SyncPredicate),
    Async(AsyncPredicate),
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Sync(..)"),
            Self::Async(_) => f.write_str("Async(..)"),
        }
    }
}

/// A boolean predicate that reports one `custom` issue when it fails.
///
/// Build with [`refine`] or [`refine_async`], then optionally attach a
/// message, a path suffix, and issue parameters before converting into a
/// [`CheckEntry`].
#[derive(Debug, Clone)]
pub struct Refinement {
    pub predicate: Predicate,
    /// Appended to the node path for the reported issue.
    pub path: IssuePath,
    pub params: Option<Value>,
    message: Option<String>,
}

impl Refinement {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Report the issue at `path` below the checked value.
    pub fn at<S: Into<sift_core::PathSegment>>(mut self, path: impl IntoIterator<Item = S>) -> Self {
        self.path = path.into_iter().collect();
        self
    }

    pub fn params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }
}

impl From<Refinement> for CheckEntry {
    fn from(mut refinement: Refinement) -> Self {
        let message = refinement.message.take();
        CheckEntry {
            kind: CheckKind::Refine(refinement),
            message,
        }
    }
}

/// One issue raised by a custom check.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomIssue {
    pub detail: IssueDetail,
    /// Relative to the checked value.
    pub path: IssuePath,
    pub message: Option<String>,
}

impl CustomIssue {
    pub fn new(detail: IssueDetail) -> Self {
        Self {
            detail,
            path: IssuePath::root(),
            message: None,
        }
    }

    /// A `custom` issue with `message`.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(IssueDetail::Custom { params: None }).with_message(message)
    }

    pub fn at<S: Into<sift_core::PathSegment>>(mut self, path: impl IntoIterator<Item = S>) -> Self {
        self.path = path.into_iter().collect();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Outcome of an asynchronous custom check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckReport {
    pub issues: Vec<CustomIssue>,
    /// Skip the remaining checks of the node.
    pub abort: bool,
}

impl CheckReport {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn issue(mut self, issue: CustomIssue) -> Self {
        self.issues.push(issue);
        self
    }

    pub fn aborting(mut self) -> Self {
        self.abort = true;
        self
    }
}

/// Handle passed to a synchronous custom check.
pub struct CheckContext<'a> {
    collector: &'a mut IssueCollector,
    path: &'a IssuePath,
    input: Option<&'a Value>,
    fallback_message: Option<&'a str>,
    aborted: bool,
}

impl<'a> CheckContext<'a> {
    pub(crate) fn new(
        collector: &'a mut IssueCollector,
        path: &'a IssuePath,
        input: Option<&'a Value>,
        fallback_message: Option<&'a str>,
    ) -> Self {
        Self {
            collector,
            path,
            input,
            fallback_message,
            aborted: false,
        }
    }

    /// Path of the node being checked.
    pub fn path(&self) -> &IssuePath {
        self.path
    }

    pub fn add_issue(&mut self, issue: CustomIssue) {
        let issue = materialize(issue, self.path, self.fallback_message, self.input);
        self.collector.push(issue);
    }

    /// Skip the remaining checks of this node. Sibling nodes are unaffected.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

pub(crate) fn materialize(
    issue: CustomIssue,
    base: &IssuePath,
    fallback_message: Option<&str>,
    input: Option<&Value>,
) -> Issue {
    let message = issue.message.or_else(|| fallback_message.map(str::to_string));
    Issue::new(base.join(&issue.path), issue.detail)
        .with_custom_message(message)
        .with_input(input.cloned())
}

type SyncCustom = Arc<dyn Fn(&Value, &mut CheckContext<'_>) + Send + Sync>;
type AsyncCustom = Arc<dyn Fn(Value) -> BoxFuture<'static, CheckReport> + Send + Sync>;

/// A check that can report any number of issues.
#[derive(Clone)]
pub enum CustomCheck {
    Sync(SyncCustom),
    Async(AsyncCustom),
}

impl fmt::Debug for CustomCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Sync(..)"),
            Self::Async(_) => f.write_str("Async(..)"),
        }
    }
}

// ─── Rewrites ────────────────────────────────────────────────────────

/// Unicode normalization forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NormalizationForm {
    #[default]
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
}

/// A value replacement step.
#[derive(Debug, Clone)]
pub enum Rewrite {
    Trim,
    Lowercase,
    Uppercase,
    Normalize(NormalizationForm),
    Overwrite(TransformFn),
}

impl Rewrite {
    /// Apply to `value`. String rewrites leave non-string values alone.
    pub fn apply(&self, value: Value) -> Value {
        match (self, value) {
            (Self::Overwrite(func), value) => func.apply(value),
            (Self::Trim, Value::String(s)) => Value::String(s.trim().to_string()),
            (Self::Lowercase, Value::String(s)) => Value::String(s.to_lowercase()),
            (Self::Uppercase, Value::String(s)) => Value::String(s.to_uppercase()),
            (Self::Normalize(form), Value::String(s)) => Value::String(match form {
                NormalizationForm::Nfc => s.nfc().collect(),
                NormalizationForm::Nfd => s.nfd().collect(),
                NormalizationForm::Nfkc => s.nfkc().collect(),
                NormalizationForm::Nfkd => s.nfkd().collect(),
            }),
            (_, value) => value,
        }
    }
}

// ─── Check Entry ─────────────────────────────────────────────────────

/// What a check does.
#[derive(Debug, Clone)]
pub enum CheckKind {
    Numeric(NumericBound),
    Size(SizeBound),
    Format(StringFormat),
    /// Validate the value under `key` with `schema`.
    Property { key: String, schema: Schema },
    Refine(Refinement),
    Custom(CustomCheck),
    Rewrite(Rewrite),
}

/// One step of a node's check pipeline.
#[derive(Debug, Clone)]
pub struct CheckEntry {
    pub kind: CheckKind,
    /// Author-supplied message, used instead of the locale for every issue
    /// this check reports.
    pub message: Option<String>,
}

impl CheckEntry {
    pub fn new(kind: CheckKind) -> Self {
        Self { kind, message: None }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn name(&self) -> &'static str {
        match &self.kind {
            CheckKind::Numeric(bound) => match bound {
                NumericBound::LessThan(_) => "lt",
                NumericBound::LessOrEqual(_) => "lte",
                NumericBound::GreaterThan(_) => "gt",
                NumericBound::GreaterOrEqual(_) => "gte",
                NumericBound::MultipleOf(_) => "multiple_of",
            },
            CheckKind::Size(bound) => match bound {
                SizeBound::Min(_) => "min_length",
                SizeBound::Max(_) => "max_length",
                SizeBound::Exact(_) => "length",
            },
            CheckKind::Format(format) => format.name(),
            CheckKind::Property { .. } => "property",
            CheckKind::Refine(_) => "refine",
            CheckKind::Custom(_) => "custom",
            CheckKind::Rewrite(rewrite) => match rewrite {
                Rewrite::Trim => "trim",
                Rewrite::Lowercase => "to_lower_case",
                Rewrite::Uppercase => "to_upper_case",
                Rewrite::Normalize(_) => "normalize",
                Rewrite::Overwrite(_) => "overwrite",
            },
        }
    }

    /// Whether running this check can suspend.
    pub fn is_async(&self) -> bool {
        matches!(
            &self.kind,
            CheckKind::Refine(Refinement {
                predicate: Predicate::Async(_),
                ..
            }) | CheckKind::Custom(CustomCheck::Async(_))
        )
    }

    /// Whether this check may be attached to a node of `kind`.
    pub fn applies_to(&self, kind: &SchemaKind) -> bool {
        let family = kind.family();
        match &self.kind {
            CheckKind::Refine(_)
            | CheckKind::Custom(_)
            | CheckKind::Rewrite(Rewrite::Overwrite(_)) => true,
            CheckKind::Numeric(_) => family == Some(TypeFamily::Number),
            CheckKind::Size(_) => matches!(
                family,
                Some(TypeFamily::String | TypeFamily::Array | TypeFamily::Record)
            ),
            CheckKind::Format(_) | CheckKind::Rewrite(_) => family == Some(TypeFamily::String),
            CheckKind::Property { .. } => {
                matches!(family, Some(TypeFamily::Object | TypeFamily::Record))
            }
        }
    }
}

// ─── Constructors ────────────────────────────────────────────────────

fn numeric(bound: NumericBound) -> CheckEntry {
    CheckEntry::new(CheckKind::Numeric(bound))
}

pub fn lt(value: f64) -> CheckEntry {
    numeric(NumericBound::LessThan(value))
}

pub fn lte(value: f64) -> CheckEntry {
    numeric(NumericBound::LessOrEqual(value))
}

pub fn gt(value: f64) -> CheckEntry {
    numeric(NumericBound::GreaterThan(value))
}

pub fn gte(value: f64) -> CheckEntry {
    numeric(NumericBound::GreaterOrEqual(value))
}

pub fn positive() -> CheckEntry {
    gt(0.0)
}

pub fn negative() -> CheckEntry {
    lt(0.0)
}

pub fn nonnegative() -> CheckEntry {
    gte(0.0)
}

pub fn nonpositive() -> CheckEntry {
    lte(0.0)
}

pub fn multiple_of(divisor: f64) -> CheckEntry {
    numeric(NumericBound::MultipleOf(divisor))
}

pub fn min_length(min: usize) -> CheckEntry {
    CheckEntry::new(CheckKind::Size(SizeBound::Min(min)))
}

pub fn max_length(max: usize) -> CheckEntry {
    CheckEntry::new(CheckKind::Size(SizeBound::Max(max)))
}

pub fn length(exact: usize) -> CheckEntry {
    CheckEntry::new(CheckKind::Size(SizeBound::Exact(exact)))
}

fn format_check(format: StringFormat) -> CheckEntry {
    CheckEntry::new(CheckKind::Format(format))
}

/// # Errors
///
/// Returns [`ConfigurationError::InvalidPattern`] if `pattern` does not compile.
pub fn regex(pattern: &str) -> Result<CheckEntry, ConfigurationError> {
    let compiled = Regex::new(pattern).map_err(|e| ConfigurationError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    Ok(format_check(StringFormat::Regex(compiled)))
}

/// Use an already-compiled expression.
pub fn regex_from(re: Regex) -> CheckEntry {
    format_check(StringFormat::Regex(re))
}

pub fn starts_with(prefix: impl Into<String>) -> CheckEntry {
    format_check(StringFormat::StartsWith(prefix.into()))
}

pub fn ends_with(suffix: impl Into<String>) -> CheckEntry {
    format_check(StringFormat::EndsWith(suffix.into()))
}

pub fn includes(needle: impl Into<String>) -> CheckEntry {
    format_check(StringFormat::Includes(needle.into()))
}

pub fn lowercase() -> CheckEntry {
    format_check(StringFormat::Lowercase)
}

pub fn uppercase() -> CheckEntry {
    format_check(StringFormat::Uppercase)
}

pub fn mime<S: Into<String>>(allowed: impl IntoIterator<Item = S>) -> CheckEntry {
    format_check(StringFormat::Mime(allowed.into_iter().map(Into::into).collect()))
}

pub fn email() -> CheckEntry {
    format_check(StringFormat::Email)
}

pub fn uuid() -> CheckEntry {
    format_check(StringFormat::Uuid)
}

pub fn url() -> CheckEntry {
    format_check(StringFormat::Url)
}

pub fn datetime() -> CheckEntry {
    format_check(StringFormat::Datetime)
}

pub fn property(key: impl Into<String>, schema: Schema) -> CheckEntry {
    CheckEntry::new(CheckKind::Property {
        key: key.into(),
        schema,
    })
}

pub fn refine<F>(predicate: F) -> Refinement
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Refinement {
        predicate: Predicate::Sync(Arc::new(predicate)),
        path: IssuePath::root(),
        params: None,
        message: None,
    }
}

pub fn refine_async<F, Fut>(predicate: F) -> Refinement
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    Refinement {
        predicate: Predicate::Async(Arc::new(move |value| predicate(value).boxed())),
        path: IssuePath::root(),
        params: None,
        message: None,
    }
}

pub fn custom<F>(check: F) -> CheckEntry
where
    F: Fn(&Value, &mut CheckContext<'_>) + Send + Sync + 'static,
{
    CheckEntry::new(CheckKind::Custom(CustomCheck::Sync(Arc::new(check))))
}

pub fn custom_async<F, Fut>(check: F) -> CheckEntry
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CheckReport> + Send + 'static,
{
    CheckEntry::new(CheckKind::Custom(CustomCheck::Async(Arc::new(
        move |value| check(value).boxed(),
    ))))
}

pub fn trim() -> CheckEntry {
    CheckEntry::new(CheckKind::Rewrite(Rewrite::Trim))
}

pub fn to_lower_case() -> CheckEntry {
    CheckEntry::new(CheckKind::Rewrite(Rewrite::Lowercase))
}

pub fn to_upper_case() -> CheckEntry {
    CheckEntry::new(CheckKind::Rewrite(Rewrite::Uppercase))
}

pub fn normalize(form: NormalizationForm) -> CheckEntry {
    CheckEntry::new(CheckKind::Rewrite(Rewrite::Normalize(form)))
}

pub fn overwrite<F>(func: F) -> CheckEntry
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    CheckEntry::new(CheckKind::Rewrite(Rewrite::Overwrite(TransformFn::new(func))))
}

/// Issue detail for a violated format, exposed to the pipeline.
pub(crate) fn format_issue(format: &StringFormat) -> IssueDetail {
    format.issue_detail()
}
