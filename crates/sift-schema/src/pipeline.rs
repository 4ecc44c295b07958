//! # Check Pipeline
//!
//! Runs one node's checks, in declaration order, against a value whose
//! kind has already been validated.
//!
//! Rewrites replace the running value. Validations append issues and keep
//! going, so one pass reports every violated check. A check whose value
//! shape no longer matches (e.g. after an `overwrite`) is skipped. A custom
//! check that aborts stops the remaining checks of this node and marks the
//! node aborted, so the executor skips its descent. Siblings are unaffected.

use serde_json::Value;
use sift_core::{ConfigurationError, Issue, IssueDetail, SizeOrigin};

use crate::check::{
    format_issue, materialize, CheckContext, CheckEntry, CheckKind, CustomCheck, NumericBound,
    Predicate, SizeBound,
};
use crate::executor::{walk, ParseContext};

/// Run `checks` against `value`, returning the (possibly rewritten) value.
///
/// # Errors
///
/// Returns [`ConfigurationError::AsyncCheckInSyncParse`] when an async
/// check is reached during a synchronous parse. Nothing after that check
/// runs.
pub(crate) async fn run_checks(
    checks: &[CheckEntry],
    mut value: Value,
    ctx: &mut ParseContext,
) -> Result<Value, ConfigurationError> {
    for entry in checks {
        let message = entry.message.as_deref();
        match &entry.kind {
            CheckKind::Rewrite(rewrite) => {
                value = rewrite.apply(value);
            }
            CheckKind::Numeric(bound) => {
                if let Some(n) = value.as_f64() {
                    if !bound.holds(n) {
                        ctx.report(numeric_issue(*bound), message, &value);
                    }
                }
            }
            CheckKind::Size(bound) => {
                if let Some((size, origin)) = measure(&value) {
                    if let Some(detail) = size_issue(*bound, size, origin) {
                        ctx.report(detail, message, &value);
                    }
                }
            }
            CheckKind::Format(format) => {
                if let Value::String(s) = &value {
                    if !format.matches(s) {
                        ctx.report(format_issue(format), message, &value);
                    }
                }
            }
            CheckKind::Property { key, schema } => {
                if let Value::Object(map) = &value {
                    let child = map.get(key).cloned();
                    ctx.path.push(key.as_str());
                    let outcome = walk(schema, child, ctx).await;
                    ctx.path.pop();
                    outcome?;
                }
            }
            CheckKind::Refine(refinement) => {
                let passed = match &refinement.predicate {
                    Predicate::Sync(predicate) => predicate(&value),
                    Predicate::Async(predicate) => {
                        ctx.require_async(entry)?;
                        tracing::trace!(check = entry.name(), path = %ctx.path, "awaiting async check");
                        predicate(value.clone()).await
                    }
                };
                if !passed {
                    let issue = Issue::new(
                        ctx.path.join(&refinement.path),
                        IssueDetail::Custom {
                            params: refinement.params.clone(),
                        },
                    )
                    .with_custom_message(message.map(str::to_string))
                    .with_input(ctx.reported_input(&value));
                    ctx.collector.push(issue);
                }
            }
            CheckKind::Custom(CustomCheck::Sync(check)) => {
                let input = ctx.report_input.then_some(&value);
                let mut check_ctx =
                    CheckContext::new(&mut ctx.collector, &ctx.path, input, message);
                check(&value, &mut check_ctx);
                if check_ctx.is_aborted() {
                    tracing::trace!(path = %ctx.path, "custom check aborted the node");
                    ctx.aborted = true;
                    break;
                }
            }
            CheckKind::Custom(CustomCheck::Async(check)) => {
                ctx.require_async(entry)?;
                tracing::trace!(check = entry.name(), path = %ctx.path, "awaiting async check");
                let report = check(value.clone()).await;
                let input = ctx.report_input.then_some(&value);
                for issue in report.issues {
                    let issue = materialize(issue, &ctx.path, message, input);
                    ctx.collector.push(issue);
                }
                if report.abort {
                    tracing::trace!(path = %ctx.path, "custom check aborted the node");
                    ctx.aborted = true;
                    break;
                }
            }
        }
    }
    Ok(value)
}

fn numeric_issue(bound: NumericBound) -> IssueDetail {
    let origin = SizeOrigin::Number;
    match bound {
        NumericBound::LessThan(maximum) | NumericBound::LessOrEqual(maximum) => {
            IssueDetail::TooBig {
                origin,
                maximum,
                inclusive: matches!(bound, NumericBound::LessOrEqual(_)),
                exact: false,
            }
        }
        NumericBound::GreaterThan(minimum) | NumericBound::GreaterOrEqual(minimum) => {
            IssueDetail::TooSmall {
                origin,
                minimum,
                inclusive: matches!(bound, NumericBound::GreaterOrEqual(_)),
                exact: false,
            }
        }
        NumericBound::MultipleOf(divisor) => IssueDetail::NotMultipleOf { divisor },
    }
}

/// Length of a string (in characters), array, or record.
fn measure(value: &Value) -> Option<(usize, SizeOrigin)> {
    match value {
        Value::String(s) => Some((s.chars().count(), SizeOrigin::String)),
        Value::Array(items) => Some((items.len(), SizeOrigin::Array)),
        Value::Object(map) => Some((map.len(), SizeOrigin::Record)),
        _ => None,
    }
}

fn size_issue(bound: SizeBound, size: usize, origin: SizeOrigin) -> Option<IssueDetail> {
    let too_small = |minimum: usize, exact: bool| IssueDetail::TooSmall {
        origin,
        minimum: minimum as f64,
        inclusive: true,
        exact,
    };
    let too_big = |maximum: usize, exact: bool| IssueDetail::TooBig {
        origin,
        maximum: maximum as f64,
        inclusive: true,
        exact,
    };
    match bound {
        SizeBound::Min(min) if size < min => Some(too_small(min, false)),
        SizeBound::Max(max) if size > max => Some(too_big(max, false)),
        SizeBound::Exact(n) if size < n => Some(too_small(n, true)),
        SizeBound::Exact(n) if size > n => Some(too_big(n, true)),
        _ => None,
    }
}
