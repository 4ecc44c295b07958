//! # sift-core — Foundational Types for the sift Validation Engine
//!
//! Defines everything a parse produces and everything needed to explain a
//! failure, independent of how schemas are represented or evaluated.
//! `sift-schema` builds the schema tree and executor on top of this crate.
//!
//! ## Contents
//!
//! - **Issue taxonomy** (`issue.rs`): the closed, extend-only [`IssueCode`]
//!   set, the structured [`Issue`] record and the append-only
//!   [`IssueCollector`].
//!
//! - **Paths** (`path.rs`): [`IssuePath`], the key/index trail from the
//!   root to a failing value.
//!
//! - **Locale formatting** (`locale.rs`, `locales/`): [`LocaleTable`], the
//!   process-wide install/reset slot, and the built-in English table.
//!   With no locale installed every message is [`FALLBACK_MESSAGE`].
//!
//! - **Errors** (`error.rs`, `report.rs`): configuration, execution and
//!   aggregated validation errors, plus flattened and prettified reports.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sift-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod issue;
pub mod locale;
pub mod locales;
pub mod path;
pub mod report;

// Re-export primary types for ergonomic imports.
pub use error::{
    ConfigurationError, ExecutionError, ParseError, UnknownIssueCode, ValidationError,
};
pub use issue::{
    Issue, IssueCode, IssueCollector, IssueDetail, Severity, SizeOrigin, ValueType,
    ISSUE_CODE_COUNT,
};
pub use locale::{
    configure_locale, configure_locale_from_env, current_locale, render_issues, render_message,
    reset_locale, LocaleTable, MessageRenderer, FALLBACK_MESSAGE, LOCALE_ENV_VAR,
};
pub use path::{IssuePath, PathSegment};
pub use report::FlattenedError;
