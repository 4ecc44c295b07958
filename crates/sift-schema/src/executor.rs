//! # Parse Executor
//!
//! Walks a schema tree against an input value, threading one
//! [`ParseContext`] through the whole walk.
//!
//! ## Node Lifecycle
//!
//! Each node moves through `Enter → KindCheck → Checks → Descend → Exit`:
//!
//! 1. **KindCheck**: a runtime-type mismatch records one issue at the
//!    current path and skips the rest of this node. Siblings still run.
//! 2. **Checks**: the node's pipeline runs on the kind-validated value,
//!    before descent, so rewrites shape what children see. A custom check
//!    that aborts skips the rest of this node the same way a kind mismatch
//!    does.
//! 3. **Descend**: children run in declaration order with extended paths.
//!
//! Wrapper kinds (union, optional, nullable, default, transform, pipe,
//! lazy) have no shape of their own. They descend first and run their
//! checks on the produced output, only when descent added no issues.
//!
//! ## Execution Modes
//!
//! The walk is a single asynchronous routine. A synchronous parse drives
//! it to completion without a runtime; the only suspension points are
//! async checks, and those raise a configuration error in sync mode before
//! anything is awaited. Siblings are always visited one after another, so
//! issue order is depth-first declaration order in both modes.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{Map, Value};
use sift_core::{
    ConfigurationError, Issue, IssueCollector, IssueDetail, IssuePath, ValueType,
};

use crate::check::CheckEntry;
use crate::kind::{is_safe_integer, ObjectShape, SchemaKind, UnknownKeys};
use crate::node::Schema;
use crate::pipeline::run_checks;

/// Whether async checks may suspend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Sync,
    Async,
}

impl Mode {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Async => "async",
        }
    }
}

/// State of one parse invocation.
#[derive(Debug)]
pub(crate) struct ParseContext {
    pub(crate) path: IssuePath,
    pub(crate) collector: IssueCollector,
    pub(crate) mode: Mode,
    pub(crate) report_input: bool,
    /// Set by the check pipeline when a custom check aborts the node.
    pub(crate) aborted: bool,
    /// Recursive references currently being resolved, keyed by the path
    /// depth they were entered at.
    lazy_entries: Vec<(usize, usize)>,
}

impl ParseContext {
    pub(crate) fn new(mode: Mode, report_input: bool) -> Self {
        Self {
            path: IssuePath::root(),
            collector: IssueCollector::new(),
            mode,
            report_input,
            aborted: false,
            lazy_entries: Vec::new(),
        }
    }

    /// A context with an empty collector at the current path, used to try
    /// one union member in isolation.
    fn fork(&self) -> Self {
        Self {
            path: self.path.clone(),
            collector: IssueCollector::new(),
            mode: self.mode,
            report_input: self.report_input,
            aborted: false,
            lazy_entries: self.lazy_entries.clone(),
        }
    }

    pub(crate) fn reported_input(&self, value: &Value) -> Option<Value> {
        self.report_input.then(|| value.clone())
    }

    /// Record an issue at the current path.
    pub(crate) fn report(&mut self, detail: IssueDetail, message: Option<&str>, value: &Value) {
        let issue = Issue::new(self.path.clone(), detail)
            .with_custom_message(message.map(str::to_string))
            .with_input(self.reported_input(value));
        self.collector.push(issue);
    }

    fn report_rejected(&mut self, detail: IssueDetail, input: Option<&Value>) {
        let issue = Issue::new(self.path.clone(), detail)
            .with_input(input.filter(|_| self.report_input).cloned());
        self.collector.push(issue);
    }

    pub(crate) fn require_async(&self, entry: &CheckEntry) -> Result<(), ConfigurationError> {
        match self.mode {
            Mode::Async => Ok(()),
            Mode::Sync => Err(ConfigurationError::AsyncCheckInSyncParse {
                check: entry.name().to_string(),
                path: self.path.clone(),
            }),
        }
    }

    pub(crate) fn into_issues(self) -> Vec<Issue> {
        self.collector.into_issues()
    }
}

/// Evaluate `schema` against `input`. `None` is an absent value.
///
/// Returns the parsed output. When issues were recorded the output is
/// meaningless and callers must not use it.
pub(crate) fn walk<'a>(
    schema: &'a Schema,
    input: Option<Value>,
    ctx: &'a mut ParseContext,
) -> BoxFuture<'a, Result<Option<Value>, ConfigurationError>> {
    async move {
        let def = schema.def();
        if def.kind.is_wrapper() {
            let mark = ctx.collector.mark();
            let output = descend_wrapper(&def.kind, input, ctx).await?;
            if def.checks.is_empty() || ctx.collector.has_issues_since(mark) {
                return Ok(output);
            }
            return match output {
                Some(value) => {
                    let value = run_checks(&def.checks, value, ctx).await?;
                    ctx.aborted = false;
                    Ok(Some(value))
                }
                None => Ok(None),
            };
        }

        let Some(value) = check_kind(&def.kind, input, ctx) else {
            return Ok(None);
        };
        let value = match value {
            Some(value) => run_checks(&def.checks, value, ctx).await?,
            // `any` accepted an absent value; there is nothing to check.
            None => return Ok(None),
        };
        if std::mem::take(&mut ctx.aborted) {
            return Ok(Some(value));
        }
        descend(&def.kind, value, ctx).await.map(Some)
    }
    .boxed()
}

/// KindCheck for non-wrapper kinds.
///
/// Returns `None` when the kind rejected the input (an issue was recorded),
/// otherwise the accepted input.
fn check_kind(
    kind: &SchemaKind,
    input: Option<Value>,
    ctx: &mut ParseContext,
) -> Option<Option<Value>> {
    let accepted = match (kind, &input) {
        (SchemaKind::Any, _) => true,
        (SchemaKind::Never, _) => false,
        (SchemaKind::String, Some(Value::String(_))) => true,
        (SchemaKind::Number, Some(Value::Number(_))) => true,
        (SchemaKind::Integer, Some(Value::Number(n))) => is_safe_integer(n),
        (SchemaKind::Boolean, Some(Value::Bool(_))) => true,
        (SchemaKind::Null, Some(Value::Null)) => true,
        (SchemaKind::Object(_) | SchemaKind::Record(_), Some(Value::Object(_))) => true,
        (SchemaKind::Array(_) | SchemaKind::Tuple { .. }, Some(Value::Array(_))) => true,
        (SchemaKind::Literal(values), Some(value)) => values.contains(value),
        (SchemaKind::Enum(options), Some(Value::String(s))) => options.iter().any(|o| o == s),
        _ => false,
    };
    if accepted {
        return Some(input);
    }
    let detail = match kind {
        SchemaKind::Literal(values) => IssueDetail::InvalidValue {
            values: values.clone(),
        },
        SchemaKind::Enum(options) => IssueDetail::InvalidValue {
            values: options.iter().cloned().map(Value::String).collect(),
        },
        _ => IssueDetail::InvalidType {
            expected: kind.expected_type(),
            received: ValueType::of_input(input.as_ref()),
        },
    };
    ctx.report_rejected(detail, input.as_ref());
    None
}

/// Descend into the children of a kind-validated container.
async fn descend(
    kind: &SchemaKind,
    value: Value,
    ctx: &mut ParseContext,
) -> Result<Value, ConfigurationError> {
    match (kind, value) {
        (SchemaKind::Object(shape), Value::Object(map)) => parse_object(shape, map, ctx).await,
        (SchemaKind::Array(element), Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                ctx.path.push(index);
                let parsed = walk(element, Some(item), ctx).await;
                ctx.path.pop();
                out.push(parsed?.unwrap_or(Value::Null));
            }
            Ok(Value::Array(out))
        }
        (SchemaKind::Tuple { items, rest }, Value::Array(elements)) => {
            parse_tuple(items, rest.as_ref(), elements, ctx).await
        }
        (SchemaKind::Record(value_schema), Value::Object(map)) => {
            let mut out = Map::with_capacity(map.len());
            for (key, entry) in map {
                ctx.path.push(key.as_str());
                let parsed = walk(value_schema, Some(entry), ctx).await;
                ctx.path.pop();
                if let Some(parsed) = parsed? {
                    out.insert(key, parsed);
                }
            }
            Ok(Value::Object(out))
        }
        // Leaf kinds, or a container whose value an `overwrite` replaced
        // with a different shape.
        (_, value) => Ok(value),
    }
}

async fn parse_object(
    shape: &ObjectShape,
    input: Map<String, Value>,
    ctx: &mut ParseContext,
) -> Result<Value, ConfigurationError> {
    let mut out = Map::with_capacity(shape.fields.len());
    for (key, field) in &shape.fields {
        let child = input.get(key.as_str()).cloned();
        ctx.path.push(key.as_str());
        let parsed = walk(field, child, ctx).await;
        ctx.path.pop();
        if let Some(parsed) = parsed? {
            out.insert(key.clone(), parsed);
        }
    }
    if shape.unknown_keys == UnknownKeys::Strip {
        return Ok(Value::Object(out));
    }
    let unknown: Map<String, Value> = input
        .into_iter()
        .filter(|(key, _)| !shape.contains(key))
        .collect();
    match shape.unknown_keys {
        UnknownKeys::Passthrough => out.extend(unknown),
        UnknownKeys::Strict if !unknown.is_empty() => {
            let keys: Vec<String> = unknown.keys().cloned().collect();
            let received = ctx.report_input.then(|| Value::Object(unknown));
            let issue = Issue::new(ctx.path.clone(), IssueDetail::UnrecognizedKeys { keys })
                .with_input(received);
            ctx.collector.push(issue);
        }
        UnknownKeys::Strict | UnknownKeys::Strip => {}
    }
    Ok(Value::Object(out))
}

async fn parse_tuple(
    items: &[Schema],
    rest: Option<&Schema>,
    elements: Vec<Value>,
    ctx: &mut ParseContext,
) -> Result<Value, ConfigurationError> {
    let total = elements.len();
    let mut elements = elements.into_iter();
    let mut out: Vec<Option<Value>> = Vec::with_capacity(items.len().max(total));
    for (index, item) in items.iter().enumerate() {
        ctx.path.push(index);
        let parsed = walk(item, elements.next(), ctx).await;
        ctx.path.pop();
        out.push(parsed?);
    }
    match rest {
        Some(rest) => {
            for (offset, element) in elements.enumerate() {
                ctx.path.push(items.len() + offset);
                let parsed = walk(rest, Some(element), ctx).await;
                ctx.path.pop();
                out.push(parsed?);
            }
        }
        None if total > items.len() => {
            let issue = Issue::new(
                ctx.path.clone(),
                IssueDetail::TooBig {
                    origin: sift_core::SizeOrigin::Array,
                    maximum: items.len() as f64,
                    inclusive: true,
                    exact: false,
                },
            );
            ctx.collector.push(issue);
        }
        None => {}
    }
    // Trailing absent optionals are dropped; interior ones become null.
    while matches!(out.last(), Some(None)) {
        out.pop();
    }
    Ok(Value::Array(
        out.into_iter().map(|v| v.unwrap_or(Value::Null)).collect(),
    ))
}

/// Descent for wrapper kinds. Wrappers never reject by runtime type
/// themselves; their members do.
async fn descend_wrapper(
    kind: &SchemaKind,
    input: Option<Value>,
    ctx: &mut ParseContext,
) -> Result<Option<Value>, ConfigurationError> {
    match kind {
        SchemaKind::Union(options) => parse_union(options, input, ctx).await,
        SchemaKind::Optional(inner) => match input {
            None => Ok(None),
            Some(value) => walk(inner, Some(value), ctx).await,
        },
        SchemaKind::Nullable(inner) => match input {
            Some(Value::Null) => Ok(Some(Value::Null)),
            other => walk(inner, other, ctx).await,
        },
        SchemaKind::Default { inner, value } => {
            let input = input.or_else(|| Some(value.clone()));
            walk(inner, input, ctx).await
        }
        SchemaKind::Transform { inner, func } => {
            let mark = ctx.collector.mark();
            let output = walk(inner, input, ctx).await?;
            if ctx.collector.has_issues_since(mark) {
                return Ok(output);
            }
            Ok(output.map(|value| func.apply(value)))
        }
        SchemaKind::Pipe { input: first, output: second } => {
            let mark = ctx.collector.mark();
            let intermediate = walk(first, input, ctx).await?;
            if ctx.collector.has_issues_since(mark) {
                return Ok(intermediate);
            }
            walk(second, intermediate, ctx).await
        }
        SchemaKind::Lazy(lazy) => {
            let target = lazy.resolve().ok_or_else(|| {
                ConfigurationError::InvalidDefinition(format!(
                    "recursive reference at '{}' was never bound",
                    ctx.path
                ))
            })?;
            // Re-entering the same reference without descending into a
            // child would never terminate.
            let entry = (ctx.path.len(), lazy.id());
            if ctx.lazy_entries.contains(&entry) {
                return Err(ConfigurationError::InvalidDefinition(format!(
                    "recursive reference at '{}' re-enters itself without consuming input",
                    ctx.path
                )));
            }
            ctx.lazy_entries.push(entry);
            let output = walk(&target, input, ctx).await;
            ctx.lazy_entries.pop();
            output
        }
        other => Err(ConfigurationError::InvalidDefinition(format!(
            "{other} is not a wrapper kind"
        ))),
    }
}

/// Try members in order; the first one that records no issues wins.
async fn parse_union(
    options: &[Schema],
    input: Option<Value>,
    ctx: &mut ParseContext,
) -> Result<Option<Value>, ConfigurationError> {
    let mut errors = Vec::with_capacity(options.len());
    for option in options {
        let mut branch = ctx.fork();
        let output = walk(option, input.clone(), &mut branch).await?;
        if branch.collector.is_empty() {
            return Ok(output);
        }
        errors.push(branch.into_issues());
    }
    let issue = Issue::new(ctx.path.clone(), IssueDetail::InvalidUnion { errors })
        .with_input(input.filter(|_| ctx.report_input));
    ctx.collector.push(issue);
    Ok(None)
}
