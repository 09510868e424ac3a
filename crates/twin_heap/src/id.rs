//! Object identities.
//!
//! Heap objects are addressed by `ObjId(u32)` indices into the arena rather
//! than by pointers. Two references denote the same object exactly when their
//! ids are equal, which is what identity-keyed tables (visited maps, identity
//! hash maps) rely on.

use std::fmt;

/// Index of an object in a [`Heap`](crate::Heap) arena.
///
/// Ids are only minted by the heap that owns the object; using an id with a
/// different heap yields [`HostError::DanglingRef`](crate::HostError) or an
/// unrelated object.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ObjId(u32);

impl ObjId {
    /// Create an id from a raw arena index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        ObjId(raw)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ObjId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjId({})", self.0)
    }
}

impl fmt::Display for ObjId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}
