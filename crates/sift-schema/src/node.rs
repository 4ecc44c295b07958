//! # Schema Nodes
//!
//! A [`Schema`] is a cheap handle to an immutable [`SchemaDef`]: a kind,
//! its kind-specific parameters, an ordered check sequence, an optional
//! brand and an optional metadata handle.
//!
//! ## Immutability Invariant
//!
//! Nodes are never mutated after construction. Adding a check, branding,
//! or re-defining returns a new node. Nested schemas are shared by
//! reference, so a derived node costs one shallow copy of its own
//! definition. Any number of parses may read one schema concurrently.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use sift_core::ConfigurationError;

use crate::check::{CheckEntry, CheckKind};
use crate::kind::SchemaKind;

/// Opaque nominal-typing tag. Has no effect on parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Brand(Arc<str>);

impl Brand {
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(Arc::from(tag.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference into an external metadata registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetadataHandle(u64);

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

impl MetadataHandle {
    /// Allocate a process-unique handle.
    pub fn allocate() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// The full definition of one schema node.
#[derive(Debug, Clone)]
pub struct SchemaDef {
    pub kind: SchemaKind,
    /// Checks in declaration order.
    pub checks: Vec<CheckEntry>,
    pub brand: Option<Brand>,
    pub meta: Option<MetadataHandle>,
}

impl SchemaDef {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            checks: Vec::new(),
            brand: None,
            meta: None,
        }
    }
}

/// Shared, immutable schema node.
#[derive(Clone)]
pub struct Schema {
    def: Arc<SchemaDef>,
}

impl Schema {
    /// A node of `kind` with no checks.
    pub fn new(kind: SchemaKind) -> Self {
        Self::from_parts(SchemaDef::new(kind))
    }

    /// Build a node from a full definition, validating every check against
    /// the kind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::IncompatibleCheck`] for the first check
    /// that does not apply to `def.kind`.
    pub fn from_def(def: SchemaDef) -> Result<Self, ConfigurationError> {
        for check in &def.checks {
            ensure_applicable(check, &def.kind)?;
        }
        Ok(Self::from_parts(def))
    }

    fn from_parts(def: SchemaDef) -> Self {
        Self { def: Arc::new(def) }
    }

    pub fn def(&self) -> &SchemaDef {
        &self.def
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.def.kind
    }

    pub fn checks(&self) -> &[CheckEntry] {
        &self.def.checks
    }

    pub fn brand_tag(&self) -> Option<&Brand> {
        self.def.brand.as_ref()
    }

    pub fn metadata(&self) -> Option<MetadataHandle> {
        self.def.meta
    }

    /// Whether both handles point at the same node.
    pub fn same_node(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.def, &other.def)
    }

    /// A new node with `check` appended. Order is preserved; nothing is
    /// reordered or deduplicated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::IncompatibleCheck`] when the check does
    /// not apply to this node's kind.
    pub fn with_check(&self, check: impl Into<CheckEntry>) -> Result<Schema, ConfigurationError> {
        let check = check.into();
        ensure_applicable(&check, &self.def.kind)?;
        let mut def = (*self.def).clone();
        def.checks.push(check);
        Ok(Self::from_parts(def))
    }

    /// Append several checks, stopping at the first incompatible one.
    pub fn with_checks(
        &self,
        checks: impl IntoIterator<Item = impl Into<CheckEntry>>,
    ) -> Result<Schema, ConfigurationError> {
        let mut def = (*self.def).clone();
        for check in checks {
            let check = check.into();
            ensure_applicable(&check, &def.kind)?;
            def.checks.push(check);
        }
        Ok(Self::from_parts(def))
    }

    /// A new node with identical validation behavior carrying `tag`.
    pub fn brand(&self, tag: impl AsRef<str>) -> Schema {
        let mut def = (*self.def).clone();
        def.brand = Some(Brand::new(tag));
        Self::from_parts(def)
    }

    /// A new node using `def` verbatim.
    ///
    /// Nothing about `def` is validated and it need not share this node's
    /// kind. Compatibility is the caller's responsibility.
    pub fn clone_with_def(&self, def: SchemaDef) -> Schema {
        Self::from_parts(def)
    }

    /// A new node pointing at `handle` in an external registry.
    pub fn with_metadata(&self, handle: MetadataHandle) -> Schema {
        let mut def = (*self.def).clone();
        def.meta = Some(handle);
        Self::from_parts(def)
    }

    /// Whether any check reachable without resolving lazy references can
    /// suspend. Such a schema may still parse synchronously when no async
    /// check is reached, e.g. when an earlier union member wins.
    pub fn contains_async_checks(&self) -> bool {
        let in_checks = self.def.checks.iter().any(|entry| match &entry.kind {
            CheckKind::Property { schema, .. } => schema.contains_async_checks(),
            _ => entry.is_async(),
        });
        in_checks
            || self
                .def
                .kind
                .children()
                .into_iter()
                .any(Schema::contains_async_checks)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Schema");
        s.field("kind", &self.def.kind);
        if !self.def.checks.is_empty() {
            s.field("checks", &self.def.checks);
        }
        if let Some(brand) = &self.def.brand {
            s.field("brand", brand);
        }
        if let Some(meta) = &self.def.meta {
            s.field("meta", meta);
        }
        s.finish()
    }
}

fn ensure_applicable(check: &CheckEntry, kind: &SchemaKind) -> Result<(), ConfigurationError> {
    if check.applies_to(kind) {
        Ok(())
    } else {
        Err(ConfigurationError::IncompatibleCheck {
            check: check.name().to_string(),
            kind: kind.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{min_length, refine, refine_async, trim};

    #[test]
    fn test_with_check_appends_without_touching_original() {
        let base = Schema::new(SchemaKind::String);
        let derived = base.with_check(min_length(3)).unwrap();
        assert!(base.checks().is_empty());
        assert_eq!(derived.checks().len(), 1);
        assert!(!base.same_node(&derived));
    }

    #[test]
    fn test_check_order_is_preserved() {
        let schema = Schema::new(SchemaKind::String)
            .with_checks([trim(), min_length(1), trim()])
            .unwrap();
        let names: Vec<&str> = schema.checks().iter().map(CheckEntry::name).collect();
        assert_eq!(names, vec!["trim", "min_length", "trim"]);
    }

    #[test]
    fn test_incompatible_check_is_rejected() {
        let err = Schema::new(SchemaKind::Boolean)
            .with_check(min_length(1))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::IncompatibleCheck {
                check: "min_length".into(),
                kind: "boolean".into(),
            }
        );
    }

    #[test]
    fn test_refinements_apply_to_every_kind() {
        let schema = Schema::new(SchemaKind::Boolean)
            .with_check(refine(|v| v.as_bool() == Some(true)))
            .unwrap();
        assert_eq!(schema.checks().len(), 1);
    }

    #[test]
    fn test_derived_nodes_share_children() {
        let child = Schema::new(SchemaKind::String);
        let array = Schema::new(SchemaKind::Array(child.clone()));
        let checked = array.with_check(min_length(1)).unwrap();
        match checked.kind() {
            SchemaKind::Array(element) => assert!(element.same_node(&child)),
            other => panic!("unexpected kind {other}"),
        }
    }

    #[test]
    fn test_brand_attaches_tag_and_keeps_checks() {
        let base = Schema::new(SchemaKind::String).with_check(trim()).unwrap();
        let branded = base.brand("UserId");
        assert_eq!(branded.brand_tag().map(Brand::as_str), Some("UserId"));
        assert_eq!(branded.checks().len(), 1);
        assert!(base.brand_tag().is_none());
    }

    #[test]
    fn test_clone_with_def_accepts_any_definition() {
        let base = Schema::new(SchemaKind::String);
        let mut def = SchemaDef::new(SchemaKind::Boolean);
        def.checks.push(min_length(2));
        let cloned = base.clone_with_def(def);
        assert_eq!(cloned.kind().name(), "boolean");
        assert!(!cloned.same_node(&base));
    }

    #[test]
    fn test_from_def_validates() {
        let mut def = SchemaDef::new(SchemaKind::Null);
        def.checks.push(trim());
        assert!(Schema::from_def(def).is_err());
    }

    #[test]
    fn test_metadata_handles_are_unique() {
        let a = MetadataHandle::allocate();
        let b = MetadataHandle::allocate();
        assert_ne!(a, b);
        let schema = Schema::new(SchemaKind::Any).with_metadata(a);
        assert_eq!(schema.metadata(), Some(a));
    }

    #[test]
    fn test_async_checks_are_found_in_children() {
        let leaf = Schema::new(SchemaKind::String)
            .with_check(refine_async(|_| async { true }))
            .unwrap();
        let parent = Schema::new(SchemaKind::Array(leaf));
        assert!(parent.contains_async_checks());
        assert!(!Schema::new(SchemaKind::Array(Schema::new(SchemaKind::String))).contains_async_checks());
    }

    #[test]
    fn test_async_checks_are_found_in_property_schemas() {
        let id = Schema::new(SchemaKind::String)
            .with_check(refine_async(|_| async { true }))
            .unwrap();
        let record = Schema::new(SchemaKind::Record(Schema::new(SchemaKind::Any)))
            .with_check(crate::check::property("id", id))
            .unwrap();
        assert!(record.contains_async_checks());
    }
}
