//! Identity-keyed table of originals already copied.

use rustc_hash::FxHashMap;

use twin_heap::ObjId;

/// Maps each original object to its clone.
///
/// A clone is registered as soon as it is allocated, before any of its
/// contents are copied, so a reference back to the original from inside
/// its own contents resolves to the clone under construction.
#[derive(Debug, Default)]
pub(crate) struct VisitedRegistry {
    clones: FxHashMap<ObjId, ObjId>,
}

impl VisitedRegistry {
    /// The clone registered for `original`.
    #[inline]
    pub(crate) fn lookup(&self, original: ObjId) -> Option<ObjId> {
        self.clones.get(&original).copied()
    }

    /// Record `clone` as the copy of `original`.
    pub(crate) fn register(&mut self, original: ObjId, clone: ObjId) {
        let previous = self.clones.insert(original, clone);
        debug_assert!(previous.is_none(), "{original:?} copied twice");
    }

    /// Number of originals copied.
    pub(crate) fn len(&self) -> usize {
        self.clones.len()
    }

    /// Drop every entry whose clone was allocated at or after `mark`.
    pub(crate) fn forget_from(&mut self, mark: usize) {
        self.clones.retain(|_, clone| clone.index() < mark);
    }
}
