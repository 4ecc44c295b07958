//! # Schema Kinds
//!
//! The closed set of schema kinds. The executor dispatches over
//! [`SchemaKind`] with one exhaustive `match`, so adding a kind is a
//! compile error until evaluation handles it.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use sift_core::ValueType;

use crate::lazy::LazySchema;
use crate::node::Schema;

/// What an object does with input keys that are not in its shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UnknownKeys {
    /// Drop unknown keys from the output.
    #[default]
    Strip,
    /// Copy unknown keys to the output unvalidated.
    Passthrough,
    /// Report unknown keys as one `unrecognized_keys` issue.
    Strict,
}

/// Declared fields of an object schema, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ObjectShape {
    pub fields: Vec<(String, Schema)>,
    pub unknown_keys: UnknownKeys,
}

impl ObjectShape {
    pub fn field(&self, key: &str) -> Option<&Schema> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.field(key).is_some()
    }
}

/// Total function applied by a transform wrapper.
#[derive(Clone)]
pub struct TransformFn(Arc<dyn Fn(Value) -> Value + Send + Sync>);

impl TransformFn {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(func))
    }

    pub fn apply(&self, value: Value) -> Value {
        (self.0)(value)
    }
}

impl fmt::Debug for TransformFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TransformFn(..)")
    }
}

/// The type constraint a schema node describes.
#[derive(Debug, Clone)]
pub enum SchemaKind {
    /// Accepts every value, including an absent one.
    Any,
    /// Accepts nothing.
    Never,
    String,
    Number,
    /// A number with no fractional part inside the safe integer range.
    Integer,
    Boolean,
    Null,
    /// One of a fixed set of JSON values.
    Literal(Vec<Value>),
    /// One of a fixed set of strings.
    Enum(Vec<String>),
    Object(ObjectShape),
    Array(Schema),
    /// Positional items, with an optional schema for trailing elements.
    Tuple {
        items: Vec<Schema>,
        rest: Option<Schema>,
    },
    /// String-keyed map with uniform values.
    Record(Schema),
    /// First member that accepts the value wins.
    Union(Vec<Schema>),
    /// Accepts an absent value.
    Optional(Schema),
    /// Accepts `null`.
    Nullable(Schema),
    /// Substitutes `value` for an absent input.
    Default { inner: Schema, value: Value },
    /// Applies `func` to the inner schema's output.
    Transform { inner: Schema, func: TransformFn },
    /// Feeds `input`'s output into `output`.
    Pipe { input: Schema, output: Schema },
    /// Deferred reference, resolved on first traversal.
    Lazy(LazySchema),
}

/// Families of values that checks can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    String,
    Number,
    /// Arrays and tuples.
    Array,
    /// Records (size is the entry count).
    Record,
    Object,
}

impl SchemaKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Never => "never",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "int",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Literal(_) => "literal",
            Self::Enum(_) => "enum",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
            Self::Tuple { .. } => "tuple",
            Self::Record(_) => "record",
            Self::Union(_) => "union",
            Self::Optional(_) => "optional",
            Self::Nullable(_) => "nullable",
            Self::Default { .. } => "default",
            Self::Transform { .. } => "transform",
            Self::Pipe { .. } => "pipe",
            Self::Lazy(_) => "lazy",
        }
    }

    /// The value family this kind validates, if it has exactly one.
    ///
    /// Wrapper kinds have none: their accepted values are defined by the
    /// schemas they wrap.
    pub fn family(&self) -> Option<TypeFamily> {
        match self {
            Self::String => Some(TypeFamily::String),
            Self::Number | Self::Integer => Some(TypeFamily::Number),
            Self::Array(_) | Self::Tuple { .. } => Some(TypeFamily::Array),
            Self::Record(_) => Some(TypeFamily::Record),
            Self::Object(_) => Some(TypeFamily::Object),
            Self::Any
            | Self::Never
            | Self::Boolean
            | Self::Null
            | Self::Literal(_)
            | Self::Enum(_)
            | Self::Union(_)
            | Self::Optional(_)
            | Self::Nullable(_)
            | Self::Default { .. }
            | Self::Transform { .. }
            | Self::Pipe { .. }
            | Self::Lazy(_) => None,
        }
    }

    /// Wrappers have no shape of their own; their checks run on the
    /// output of the schema they wrap.
    pub fn is_wrapper(&self) -> bool {
        matches!(
            self,
            Self::Union(_)
                | Self::Optional(_)
                | Self::Nullable(_)
                | Self::Default { .. }
                | Self::Transform { .. }
                | Self::Pipe { .. }
                | Self::Lazy(_)
        )
    }

    /// Runtime type reported as `expected` on a kind mismatch.
    pub(crate) fn expected_type(&self) -> ValueType {
        match self {
            Self::String | Self::Enum(_) => ValueType::String,
            Self::Number => ValueType::Number,
            Self::Integer => ValueType::Int,
            Self::Boolean => ValueType::Boolean,
            Self::Null => ValueType::Null,
            Self::Object(_) | Self::Record(_) => ValueType::Object,
            Self::Array(_) | Self::Tuple { .. } => ValueType::Array,
            _ => ValueType::Never,
        }
    }

    /// Child schemas, in declaration order.
    pub fn children(&self) -> Vec<&Schema> {
        match self {
            Self::Any
            | Self::Never
            | Self::String
            | Self::Number
            | Self::Integer
            | Self::Boolean
            | Self::Null
            | Self::Literal(_)
            | Self::Enum(_)
            | Self::Lazy(_) => Vec::new(),
            Self::Object(shape) => shape.fields.iter().map(|(_, s)| s).collect(),
            Self::Array(element) | Self::Record(element) => vec![element],
            Self::Tuple { items, rest } => items.iter().chain(rest.iter()).collect(),
            Self::Union(options) => options.iter().collect(),
            Self::Optional(inner)
            | Self::Nullable(inner)
            | Self::Default { inner, .. }
            | Self::Transform { inner, .. } => vec![inner],
            Self::Pipe { input, output } => vec![input, output],
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Largest integer exactly representable as an `f64`.
pub(crate) const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Whether `n` satisfies the `int` kind.
pub(crate) fn is_safe_integer(n: &serde_json::Number) -> bool {
    if let Some(i) = n.as_i64() {
        return (i as f64).abs() <= MAX_SAFE_INTEGER;
    }
    if let Some(u) = n.as_u64() {
        return (u as f64) <= MAX_SAFE_INTEGER;
    }
    n.as_f64()
        .map(|f| f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER)
        .unwrap_or(false)
}
