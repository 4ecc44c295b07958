//! # Chained Surface
//!
//! Inherent methods on [`Schema`] mirroring the functional builders:
//! `string().trim()?.min_length(5)?.optional()`. Every method delegates to
//! the same check constructors and [`Schema::with_check`], so a chain and
//! the equivalent `check(schema, [...])` call produce identical check
//! sequences.
//!
//! Check methods return `Result` because attaching a check to an
//! incompatible kind is a configuration error.

use std::future::Future;

use serde_json::Value;
use sift_core::ConfigurationError;

use crate::builders;
use crate::check::{self, CheckContext, CheckEntry, CheckReport, NormalizationForm};
use crate::kind::{ObjectShape, SchemaKind, UnknownKeys};
use crate::node::{Schema, SchemaDef};

type Chained = Result<Schema, ConfigurationError>;

impl Schema {
    /// Attach any check entry.
    pub fn check(&self, entry: impl Into<CheckEntry>) -> Chained {
        self.with_check(entry)
    }

    // ─── Numeric ─────────────────────────────────────────────────────

    pub fn lt(&self, value: f64) -> Chained {
        self.with_check(check::lt(value))
    }

    pub fn lte(&self, value: f64) -> Chained {
        self.with_check(check::lte(value))
    }

    pub fn gt(&self, value: f64) -> Chained {
        self.with_check(check::gt(value))
    }

    pub fn gte(&self, value: f64) -> Chained {
        self.with_check(check::gte(value))
    }

    pub fn positive(&self) -> Chained {
        self.with_check(check::positive())
    }

    pub fn negative(&self) -> Chained {
        self.with_check(check::negative())
    }

    pub fn nonnegative(&self) -> Chained {
        self.with_check(check::nonnegative())
    }

    pub fn nonpositive(&self) -> Chained {
        self.with_check(check::nonpositive())
    }

    pub fn multiple_of(&self, divisor: f64) -> Chained {
        self.with_check(check::multiple_of(divisor))
    }

    // ─── Size ────────────────────────────────────────────────────────

    pub fn min_length(&self, min: usize) -> Chained {
        self.with_check(check::min_length(min))
    }

    pub fn max_length(&self, max: usize) -> Chained {
        self.with_check(check::max_length(max))
    }

    pub fn length(&self, exact: usize) -> Chained {
        self.with_check(check::length(exact))
    }

    // ─── Formats ─────────────────────────────────────────────────────

    pub fn regex(&self, pattern: &str) -> Chained {
        self.with_check(check::regex(pattern)?)
    }

    pub fn starts_with(&self, prefix: impl Into<String>) -> Chained {
        self.with_check(check::starts_with(prefix))
    }

    pub fn ends_with(&self, suffix: impl Into<String>) -> Chained {
        self.with_check(check::ends_with(suffix))
    }

    pub fn includes(&self, needle: impl Into<String>) -> Chained {
        self.with_check(check::includes(needle))
    }

    pub fn lowercase(&self) -> Chained {
        self.with_check(check::lowercase())
    }

    pub fn uppercase(&self) -> Chained {
        self.with_check(check::uppercase())
    }

    pub fn mime<S: Into<String>>(&self, allowed: impl IntoIterator<Item = S>) -> Chained {
        self.with_check(check::mime(allowed))
    }

    pub fn email(&self) -> Chained {
        self.with_check(check::email())
    }

    pub fn uuid(&self) -> Chained {
        self.with_check(check::uuid())
    }

    pub fn url(&self) -> Chained {
        self.with_check(check::url())
    }

    pub fn datetime(&self) -> Chained {
        self.with_check(check::datetime())
    }

    // ─── Structure & Refinements ─────────────────────────────────────

    pub fn property(&self, key: impl Into<String>, schema: Schema) -> Chained {
        self.with_check(check::property(key, schema))
    }

    pub fn refine<F>(&self, predicate: F) -> Chained
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.with_check(check::refine(predicate))
    }

    pub fn refine_async<F, Fut>(&self, predicate: F) -> Chained
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.with_check(check::refine_async(predicate))
    }

    pub fn custom<F>(&self, func: F) -> Chained
    where
        F: Fn(&Value, &mut CheckContext<'_>) + Send + Sync + 'static,
    {
        self.with_check(check::custom(func))
    }

    pub fn custom_async<F, Fut>(&self, func: F) -> Chained
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CheckReport> + Send + 'static,
    {
        self.with_check(check::custom_async(func))
    }

    // ─── Rewrites ────────────────────────────────────────────────────

    pub fn trim(&self) -> Chained {
        self.with_check(check::trim())
    }

    pub fn to_lower_case(&self) -> Chained {
        self.with_check(check::to_lower_case())
    }

    pub fn to_upper_case(&self) -> Chained {
        self.with_check(check::to_upper_case())
    }

    pub fn normalize(&self, form: NormalizationForm) -> Chained {
        self.with_check(check::normalize(form))
    }

    pub fn overwrite<F>(&self, func: F) -> Chained
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.with_check(check::overwrite(func))
    }

    // ─── Wrappers ────────────────────────────────────────────────────

    pub fn optional(&self) -> Schema {
        builders::optional(self.clone())
    }

    pub fn nullable(&self) -> Schema {
        builders::nullable(self.clone())
    }

    pub fn default_value(&self, value: impl Into<Value>) -> Schema {
        builders::with_default(self.clone(), value)
    }

    pub fn transform<F>(&self, func: F) -> Schema
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        builders::transform(self.clone(), func)
    }

    pub fn pipe(&self, output: Schema) -> Schema {
        builders::pipe(self.clone(), output)
    }

    pub fn or(&self, other: Schema) -> Schema {
        builders::union([self.clone(), other])
    }

    pub fn array(&self) -> Schema {
        builders::array(self.clone())
    }

    // ─── Object Policies ─────────────────────────────────────────────

    /// Report unknown keys as an `unrecognized_keys` issue.
    pub fn strict(&self) -> Chained {
        self.with_unknown_keys(UnknownKeys::Strict)
    }

    /// Copy unknown keys to the output.
    pub fn passthrough(&self) -> Chained {
        self.with_unknown_keys(UnknownKeys::Passthrough)
    }

    /// Drop unknown keys from the output.
    pub fn strip(&self) -> Chained {
        self.with_unknown_keys(UnknownKeys::Strip)
    }

    fn with_unknown_keys(&self, unknown_keys: UnknownKeys) -> Chained {
        let SchemaKind::Object(shape) = self.kind() else {
            return Err(ConfigurationError::InvalidDefinition(format!(
                "unknown-key policy requires an object schema, got {}",
                self.kind()
            )));
        };
        let def = SchemaDef {
            kind: SchemaKind::Object(ObjectShape {
                fields: shape.fields.clone(),
                unknown_keys,
            }),
            ..self.def().clone()
        };
        Ok(self.clone_with_def(def))
    }
}
