//! # Functional Surface
//!
//! Free functions that build schema nodes: `string()`, `object([...])`,
//! `union([...])`, `lazy(|| ...)`, plus `check(schema, entries)` to attach
//! checks built with the constructors in [`crate::check`].
//!
//! Builders hold no validation logic. They assemble [`SchemaKind`] values
//! and delegate to [`Schema`]; the chained surface in `methods.rs` reaches
//! the same constructors.

use serde_json::Value;
use sift_core::{ConfigurationError, ExecutionError, ParseError};

use crate::check::CheckEntry;
use crate::kind::{ObjectShape, SchemaKind, TransformFn, UnknownKeys};
use crate::lazy::LazySchema;
use crate::node::{Schema, SchemaDef};
use crate::parse::ParseResult;

// ─── Primitives ──────────────────────────────────────────────────────

pub fn any() -> Schema {
    Schema::new(SchemaKind::Any)
}

pub fn never() -> Schema {
    Schema::new(SchemaKind::Never)
}

pub fn string() -> Schema {
    Schema::new(SchemaKind::String)
}

pub fn number() -> Schema {
    Schema::new(SchemaKind::Number)
}

pub fn int() -> Schema {
    Schema::new(SchemaKind::Integer)
}

pub fn boolean() -> Schema {
    Schema::new(SchemaKind::Boolean)
}

pub fn null() -> Schema {
    Schema::new(SchemaKind::Null)
}

pub fn literal(value: impl Into<Value>) -> Schema {
    Schema::new(SchemaKind::Literal(vec![value.into()]))
}

pub fn literals<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Schema {
    Schema::new(SchemaKind::Literal(
        values.into_iter().map(Into::into).collect(),
    ))
}

pub fn enum_of<S: Into<String>>(options: impl IntoIterator<Item = S>) -> Schema {
    Schema::new(SchemaKind::Enum(options.into_iter().map(Into::into).collect()))
}

// ─── Containers ──────────────────────────────────────────────────────

fn shaped<K: Into<String>>(
    fields: impl IntoIterator<Item = (K, Schema)>,
    unknown_keys: UnknownKeys,
) -> Schema {
    Schema::new(SchemaKind::Object(ObjectShape {
        fields: fields.into_iter().map(|(k, s)| (k.into(), s)).collect(),
        unknown_keys,
    }))
}

/// An object that strips unknown keys.
pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Schema)>) -> Schema {
    shaped(fields, UnknownKeys::Strip)
}

/// An object that reports unknown keys.
pub fn strict_object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Schema)>) -> Schema {
    shaped(fields, UnknownKeys::Strict)
}

/// An object that passes unknown keys through.
pub fn loose_object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Schema)>) -> Schema {
    shaped(fields, UnknownKeys::Passthrough)
}

pub fn array(element: Schema) -> Schema {
    Schema::new(SchemaKind::Array(element))
}

pub fn tuple(items: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::new(SchemaKind::Tuple {
        items: items.into_iter().collect(),
        rest: None,
    })
}

pub fn tuple_with_rest(items: impl IntoIterator<Item = Schema>, rest: Schema) -> Schema {
    Schema::new(SchemaKind::Tuple {
        items: items.into_iter().collect(),
        rest: Some(rest),
    })
}

pub fn record(value: Schema) -> Schema {
    Schema::new(SchemaKind::Record(value))
}

// ─── Wrappers ────────────────────────────────────────────────────────

pub fn union(options: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::new(SchemaKind::Union(options.into_iter().collect()))
}

pub fn optional(inner: Schema) -> Schema {
    Schema::new(SchemaKind::Optional(inner))
}

pub fn nullable(inner: Schema) -> Schema {
    Schema::new(SchemaKind::Nullable(inner))
}

pub fn with_default(inner: Schema, value: impl Into<Value>) -> Schema {
    Schema::new(SchemaKind::Default {
        inner,
        value: value.into(),
    })
}

pub fn transform<F>(inner: Schema, func: F) -> Schema
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    Schema::new(SchemaKind::Transform {
        inner,
        func: TransformFn::new(func),
    })
}

pub fn pipe(input: Schema, output: Schema) -> Schema {
    Schema::new(SchemaKind::Pipe { input, output })
}

/// Defer to the schema returned by `thunk`, resolved on first parse.
pub fn lazy<F>(thunk: F) -> Schema
where
    F: Fn() -> Schema + Send + Sync + 'static,
{
    Schema::new(SchemaKind::Lazy(LazySchema::new(thunk)))
}

/// Build a self-referential schema. `body` receives a reference to the
/// schema being defined.
///
/// ```
/// use sift_schema::{array, object, recursive, string};
///
/// let category = recursive(|this| {
///     object([("name", string()), ("children", array(this))])
/// });
/// let value = serde_json::json!({"name": "a", "children": [{"name": "b", "children": []}]});
/// assert!(category.safe_parse(value).unwrap().is_success());
/// ```
///
/// The result lives until process exit; see [`crate::lazy`].
pub fn recursive<F>(body: F) -> Schema
where
    F: FnOnce(Schema) -> Schema,
{
    let reference = LazySchema::self_ref();
    let schema = body(Schema::new(SchemaKind::Lazy(reference.clone())));
    reference.bind(&schema);
    schema
}

// ─── Checks, Branding, Cloning ───────────────────────────────────────

/// Attach `entries` to `schema` in order.
///
/// # Errors
///
/// Returns [`ConfigurationError::IncompatibleCheck`] for the first entry
/// that does not apply to the schema's kind.
pub fn check(
    schema: &Schema,
    entries: impl IntoIterator<Item = impl Into<CheckEntry>>,
) -> Result<Schema, ConfigurationError> {
    schema.with_checks(entries)
}

pub fn brand(schema: &Schema, tag: impl AsRef<str>) -> Schema {
    schema.brand(tag)
}

pub fn clone_with_def(schema: &Schema, def: SchemaDef) -> Schema {
    schema.clone_with_def(def)
}

// ─── Parsing ─────────────────────────────────────────────────────────

pub fn parse(schema: &Schema, input: Value) -> Result<Value, ParseError> {
    schema.parse(input)
}

pub fn safe_parse(schema: &Schema, input: Value) -> Result<ParseResult, ExecutionError> {
    schema.safe_parse(input)
}

pub async fn parse_async(schema: &Schema, input: Value) -> Result<Value, ParseError> {
    schema.parse_async(input).await
}

pub async fn safe_parse_async(
    schema: &Schema,
    input: Value,
) -> Result<ParseResult, ExecutionError> {
    schema.safe_parse_async(input).await
}
