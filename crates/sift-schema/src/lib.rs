//! # sift-schema — Schema Nodes, Checks and the Parse Executor
//!
//! Builds on `sift-core` to define what a schema is and how it evaluates
//! an input. Two construction surfaces share one engine:
//!
//! ```
//! use sift_schema::{check, min_length, object, string, trim};
//! use serde_json::json;
//!
//! // Functional
//! let name = check(&string(), [trim(), min_length(2)]).unwrap();
//! // Chained
//! let same = string().trim().and_then(|s| s.min_length(2)).unwrap();
//!
//! let user = object([("name", name), ("nick", same.optional())]);
//! let result = user.safe_parse(json!({"name": " x "})).unwrap();
//! assert_eq!(result.issues().len(), 1);
//! ```
//!
//! ## Module Map
//!
//! - `kind.rs`, `node.rs`, `lazy.rs`: the closed kind set, immutable
//!   shared nodes, deferred references for recursion.
//! - `check.rs`, `pipeline.rs`: check entries and the per-node pipeline.
//! - `executor.rs`, `parse.rs`: the tree walk and its sync/async entry
//!   points, timeouts and cancellation.
//! - `builders.rs`, `methods.rs`: functional and chained surfaces.
//! - `registry.rs`: the metadata registry boundary.
//!
//! ## Crate Policy
//!
//! - Schemas are immutable and `Send + Sync`; share them freely.
//! - Validation failures are data; only misconfiguration is an error.
//! - No `unsafe` code.

pub mod builders;
pub mod check;
mod executor;
pub mod kind;
pub mod lazy;
mod methods;
pub mod node;
pub mod parse;
mod pipeline;
pub mod registry;

pub use builders::{
    any, array, boolean, brand, clone_with_def, enum_of, int, lazy, literal, literals,
    loose_object, never, null, nullable, number, object, optional, parse, parse_async, pipe,
    record, recursive, safe_parse, safe_parse_async, strict_object, string, transform, tuple,
    tuple_with_rest, union, with_default,
};
pub use builders::check;
pub use check::{
    custom, custom_async, datetime, email, ends_with, gt, gte, includes, length, lowercase, lt,
    lte, max_length, mime, min_length, multiple_of, negative, nonnegative, nonpositive,
    normalize, overwrite, positive, property, refine, refine_async, regex, regex_from,
    starts_with, to_lower_case, to_upper_case, trim, uppercase, url, uuid, CheckContext,
    CheckEntry, CheckKind, CheckReport, CustomIssue, NormalizationForm, Refinement,
};
pub use kind::{ObjectShape, SchemaKind, UnknownKeys};
pub use lazy::LazySchema;
pub use node::{Brand, MetadataHandle, Schema, SchemaDef};
pub use parse::{ParseOptions, ParseResult};
pub use registry::{register, MetadataRegistry};

pub use sift_core::{
    ConfigurationError, ExecutionError, Issue, IssueCode, IssueDetail, IssuePath, LocaleTable,
    ParseError, ValidationError,
};
