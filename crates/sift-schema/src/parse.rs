//! # Parse Entry Points
//!
//! `parse` returns the output value or raises every collected issue as one
//! [`ValidationError`]. `safe_parse` never raises for validation failures;
//! it returns a [`ParseResult`] and errors only for configuration problems.
//! Each has an `_async` counterpart that may suspend at async checks, plus
//! `_with` variants taking explicit [`ParseOptions`].
//!
//! ## Cancellation
//!
//! Async entry points honor [`ParseOptions::timeout`] and
//! [`Schema::safe_parse_async_cancellable`] races the parse against a
//! caller-supplied future. Either way the call resolves to an
//! [`ExecutionError`], never a partial result. Timeouts use the Tokio timer
//! and must run inside a Tokio runtime.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value;
use sift_core::{
    render_issues, ConfigurationError, ExecutionError, Issue, IssuePath, LocaleTable, ParseError,
    ValidationError,
};

use crate::executor::{walk, Mode, ParseContext};
use crate::node::Schema;

// ─── Options ─────────────────────────────────────────────────────────

/// Per-call parse configuration.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Locale used instead of the process-wide one for this call.
    pub locale: Option<Arc<LocaleTable>>,
    /// Attach the offending input to every issue.
    pub report_input: bool,
    /// Deadline for async entry points. Ignored by synchronous parses.
    pub timeout: Option<Duration>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale(mut self, locale: impl Into<Arc<LocaleTable>>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_report_input(mut self, report_input: bool) -> Self {
        self.report_input = report_input;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ─── Result ──────────────────────────────────────────────────────────

/// Outcome of a `safe_parse*` call.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
    Success(Value),
    Failure(ValidationError),
}

impl ParseResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Collected issues; empty on success.
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Success(_) => &[],
            Self::Failure(error) => error.issues(),
        }
    }

    pub fn into_result(self) -> Result<Value, ValidationError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(error) => Err(error),
        }
    }
}

// ─── Execution ───────────────────────────────────────────────────────

async fn execute(
    schema: &Schema,
    input: Value,
    mode: Mode,
    options: &ParseOptions,
) -> Result<ParseResult, ConfigurationError> {
    if mode == Mode::Sync
        && tracing::enabled!(tracing::Level::DEBUG)
        && schema.contains_async_checks()
    {
        tracing::debug!("synchronous parse of a schema with async checks");
    }
    let mut ctx = ParseContext::new(mode, options.report_input);
    let output = walk(schema, Some(input), &mut ctx).await?;
    let mut issues = ctx.into_issues();
    tracing::debug!(mode = mode.as_str(), issues = issues.len(), "parse finished");
    if issues.is_empty() {
        return Ok(ParseResult::Success(output.unwrap_or(Value::Null)));
    }
    render_issues(&mut issues, options.locale.as_deref());
    Ok(ParseResult::Failure(ValidationError::new(issues)))
}

impl Schema {
    pub fn safe_parse(&self, input: Value) -> Result<ParseResult, ExecutionError> {
        self.safe_parse_with(input, &ParseOptions::default())
    }

    /// # Errors
    ///
    /// Returns [`ExecutionError::Configuration`] when the schema is
    /// misconfigured, including when an async check is reached.
    pub fn safe_parse_with(
        &self,
        input: Value,
        options: &ParseOptions,
    ) -> Result<ParseResult, ExecutionError> {
        match execute(self, input, Mode::Sync, options).now_or_never() {
            Some(result) => result.map_err(ExecutionError::from),
            // Sync mode rejects async checks before awaiting them, so the
            // walk cannot be pending here.
            None => Err(ConfigurationError::AsyncCheckInSyncParse {
                check: "<suspended>".to_string(),
                path: IssuePath::root(),
            }
            .into()),
        }
    }

    pub fn parse(&self, input: Value) -> Result<Value, ParseError> {
        self.parse_with(input, &ParseOptions::default())
    }

    pub fn parse_with(&self, input: Value, options: &ParseOptions) -> Result<Value, ParseError> {
        Ok(self.safe_parse_with(input, options)?.into_result()?)
    }

    pub async fn safe_parse_async(&self, input: Value) -> Result<ParseResult, ExecutionError> {
        self.safe_parse_async_with(input, &ParseOptions::default()).await
    }

    pub async fn safe_parse_async_with(
        &self,
        input: Value,
        options: &ParseOptions,
    ) -> Result<ParseResult, ExecutionError> {
        let run = execute(self, input, Mode::Async, options);
        match options.timeout {
            Some(after) => match tokio::time::timeout(after, run).await {
                Ok(result) => Ok(result?),
                Err(_) => {
                    tracing::debug!(?after, "async parse timed out");
                    Err(ExecutionError::TimedOut { after })
                }
            },
            None => Ok(run.await?),
        }
    }

    /// Like [`Schema::safe_parse_async_with`], resolving to
    /// [`ExecutionError::Cancelled`] as soon as `cancel` completes.
    pub async fn safe_parse_async_cancellable<C>(
        &self,
        input: Value,
        options: &ParseOptions,
        cancel: C,
    ) -> Result<ParseResult, ExecutionError>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                tracing::debug!("async parse cancelled");
                Err(ExecutionError::Cancelled)
            }
            result = self.safe_parse_async_with(input, options) => result,
        }
    }

    pub async fn parse_async(&self, input: Value) -> Result<Value, ParseError> {
        self.parse_async_with(input, &ParseOptions::default()).await
    }

    pub async fn parse_async_with(
        &self,
        input: Value,
        options: &ParseOptions,
    ) -> Result<Value, ParseError> {
        Ok(self
            .safe_parse_async_with(input, options)
            .await?
            .into_result()?)
    }
}
