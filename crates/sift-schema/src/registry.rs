//! # Metadata Registry Boundary
//!
//! The engine stores only an opaque [`MetadataHandle`] on each node. What
//! metadata means, and where it lives, belongs to a [`MetadataRegistry`]
//! implementation outside the engine.

use crate::node::{MetadataHandle, Schema};

/// External store of per-schema metadata.
pub trait MetadataRegistry {
    type Metadata;

    /// Associate `metadata` with `handle`, replacing any previous entry.
    fn insert(&self, handle: MetadataHandle, metadata: Self::Metadata);
}

/// Record `metadata` for `schema` in `registry`.
///
/// A schema that already carries a handle keeps it and is returned as-is
/// (same node); otherwise a new node with a fresh handle is returned.
pub fn register<R: MetadataRegistry + ?Sized>(
    schema: &Schema,
    registry: &R,
    metadata: R::Metadata,
) -> Schema {
    match schema.metadata() {
        Some(handle) => {
            registry.insert(handle, metadata);
            schema.clone()
        }
        None => {
            let handle = MetadataHandle::allocate();
            registry.insert(handle, metadata);
            tracing::trace!(handle = handle.as_u64(), "schema registered");
            schema.with_metadata(handle)
        }
    }
}
