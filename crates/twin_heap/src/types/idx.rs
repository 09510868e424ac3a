//! Type indices with pre-interned builtins.
//!
//! Builtin types occupy fixed indices so hot paths (exemption checks,
//! container reconstruction) can match on constants instead of looking up
//! names. User-registered types start at [`TypeIdx::FIRST_USER`].

use std::fmt;

/// Index into a [`TypeRegistry`](super::TypeRegistry).
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeIdx(u32);

impl TypeIdx {
    /// Root of every class hierarchy. Declares no fields.
    pub const OBJECT: TypeIdx = TypeIdx(0);

    // Primitive and text types
    pub const BOOL: TypeIdx = TypeIdx(1);
    pub const CHAR: TypeIdx = TypeIdx(2);
    pub const BYTE: TypeIdx = TypeIdx(3);
    pub const INT: TypeIdx = TypeIdx(4);
    pub const FLOAT: TypeIdx = TypeIdx(5);
    pub const STR: TypeIdx = TypeIdx(6);

    // Sequence containers
    pub const ARRAY_LIST: TypeIdx = TypeIdx(7);
    pub const LINKED_LIST: TypeIdx = TypeIdx(8);
    pub const HASH_SET: TypeIdx = TypeIdx(9);
    pub const LINKED_HASH_SET: TypeIdx = TypeIdx(10);
    pub const TREE_SET: TypeIdx = TypeIdx(11);

    // Associative containers
    pub const HASH_MAP: TypeIdx = TypeIdx(12);
    pub const LINKED_HASH_MAP: TypeIdx = TypeIdx(13);
    pub const TREE_MAP: TypeIdx = TypeIdx(14);
    pub const IDENTITY_HASH_MAP: TypeIdx = TypeIdx(15);
    pub const CONCURRENT_HASH_MAP: TypeIdx = TypeIdx(16);

    // Live system resources
    pub const THREAD: TypeIdx = TypeIdx(17);
    pub const SOCKET: TypeIdx = TypeIdx(18);
    pub const FILE_INPUT_STREAM: TypeIdx = TypeIdx(19);

    /// First index handed out to user-registered types.
    pub const FIRST_USER: u32 = 20;

    /// Create an index from its raw value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        TypeIdx(raw)
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Get the index into the registry's entry table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this is one of the pre-interned builtin types.
    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    /// Whether values of this type are inline scalars (`bool`, `char`,
    /// `byte`, `int`, `float`).
    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 >= Self::BOOL.0 && self.0 <= Self::FLOAT.0
    }
}

impl fmt::Debug for TypeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeIdx({})", self.0)
    }
}
