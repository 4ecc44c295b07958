//! # Lazy & Recursive References
//!
//! A recursive schema cannot be built as an eager immutable tree. A
//! [`LazySchema`] stores an indirection that the executor resolves on first
//! traversal and caches, so recursion re-enters the same resolved node
//! instead of rebuilding it.
//!
//! Two sources are supported:
//!
//! - a thunk (`lazy(|| ...)`), resolved once into an owned [`Schema`];
//! - a self-reference created by [`crate::recursive`], which points back at
//!   the enclosing schema.
//!
//! A self-reference is a reference cycle: the schema and its reference keep
//! each other alive for the rest of the process. Build recursive schemas
//! once and share them.
//!
//! A reference must sit below some container before it recurs. A
//! left-recursive body such as `recursive(|this| union([this, string()]))`
//! would re-enter itself forever; the executor rejects it with
//! `ConfigurationError::InvalidDefinition` instead.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::node::Schema;

type Thunk = Box<dyn Fn() -> Schema + Send + Sync>;

enum Target {
    Thunk { thunk: Thunk, resolved: OnceLock<Schema> },
    SelfRef(OnceLock<Schema>),
}

/// Deferred schema reference.
#[derive(Clone)]
pub struct LazySchema {
    target: Arc<Target>,
}

impl LazySchema {
    /// Defer to the schema returned by `thunk`. The thunk runs at most once.
    pub fn new<F>(thunk: F) -> Self
    where
        F: Fn() -> Schema + Send + Sync + 'static,
    {
        Self {
            target: Arc::new(Target::Thunk {
                thunk: Box::new(thunk),
                resolved: OnceLock::new(),
            }),
        }
    }

    /// An unbound self-reference, bound later with [`LazySchema::bind`].
    pub(crate) fn self_ref() -> Self {
        Self {
            target: Arc::new(Target::SelfRef(OnceLock::new())),
        }
    }

    /// Point an unbound self-reference at `schema`. Returns `false` if this
    /// is not a self-reference or it was already bound.
    pub(crate) fn bind(&self, schema: &Schema) -> bool {
        match &*self.target {
            Target::SelfRef(slot) => slot.set(schema.clone()).is_ok(),
            Target::Thunk { .. } => false,
        }
    }

    /// The referenced schema, or `None` if a self-reference was never bound.
    pub fn resolve(&self) -> Option<Schema> {
        match &*self.target {
            Target::Thunk { thunk, resolved } => Some(resolved.get_or_init(|| thunk()).clone()),
            Target::SelfRef(slot) => slot.get().cloned(),
        }
    }

    /// Identity of the shared target; clones of one reference compare equal.
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.target) as usize
    }

    pub fn is_resolved(&self) -> bool {
        match &*self.target {
            Target::Thunk { resolved, .. } => resolved.get().is_some(),
            Target::SelfRef(slot) => slot.get().is_some(),
        }
    }
}

impl fmt::Debug for LazySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &*self.target {
            Target::Thunk { .. } => "thunk",
            Target::SelfRef(_) => "self",
        };
        f.debug_struct("LazySchema")
            .field("source", &source)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::SchemaKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_thunk_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let lazy = LazySchema::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Schema::new(SchemaKind::String)
        });
        assert!(!lazy.is_resolved());
        let first = lazy.resolve().unwrap();
        let second = lazy.resolve().unwrap();
        assert!(first.same_node(&second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unbound_self_ref_resolves_to_none() {
        assert!(LazySchema::self_ref().resolve().is_none());
    }

    #[test]
    fn test_self_ref_binds_once() {
        let reference = LazySchema::self_ref();
        let target = Schema::new(SchemaKind::Number);
        assert!(reference.bind(&target));
        assert!(!reference.bind(&Schema::new(SchemaKind::Null)));
        assert!(reference.resolve().unwrap().same_node(&target));
    }

    #[test]
    fn test_thunk_cannot_be_bound() {
        let lazy = LazySchema::new(|| Schema::new(SchemaKind::Null));
        assert!(!lazy.bind(&Schema::new(SchemaKind::Null)));
    }
}
