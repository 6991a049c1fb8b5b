//! Cascade expansion for deletes.
//!
//! Composite objects reference points only, never other composites, so the
//! dependency graph has depth one and a single pass over the store yields the
//! full closure.

#[cfg(test)]
#[path = "deps_test.rs"]
mod deps_test;

use std::collections::HashSet;

use tracing::debug;

use crate::store::{GeometryStore, ObjectId};

/// Expand `ids` with every object that references a point in `ids`.
///
/// Ids not present in the store are kept as given; `GeometryStore::remove`
/// ignores them.
#[must_use]
pub fn cascade(store: &GeometryStore, ids: &HashSet<ObjectId>) -> HashSet<ObjectId> {
    let mut expanded = ids.clone();
    for obj in store.iter() {
        if !ids.contains(&obj.id) && obj.shape.references_any(ids) {
            expanded.insert(obj.id);
        }
    }
    debug!(requested = ids.len(), expanded = expanded.len(), "cascade expanded");
    expanded
}
