//! Type and field markers consulted by reflection.
//!
//! `TypeFlags` describe what kind of construct a type is (closure, synthetic,
//! live resource) and what the host allows for it. `FieldFlags` carry the
//! per-field markers that decide whether a field is part of an individual
//! object's state.

use bitflags::bitflags;

bitflags! {
    /// Properties of a registered type.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeFlags: u16 {
        // === Construct flags (bits 0-7) ===

        /// Generated by a compiler or code generator, not written by hand.
        const SYNTHETIC = 1 << 0;
        /// Has no declared name (anonymous class body).
        const ANONYMOUS = 1 << 1;
        /// Closure or lambda; its fields are a captured environment.
        const CLOSURE = 1 << 2;
        /// Wraps a live system resource (thread, socket, file handle).
        const RESOURCE = 1 << 3;

        // === Host capability flags (bits 8-15) ===

        /// The host refuses to allocate this type without running its
        /// initializer.
        const NO_RAW_ALLOC = 1 << 8;
    }
}

impl TypeFlags {
    /// Constructs whose values are never meaningful to copy field by field.
    pub const OPAQUE: Self = Self::from_bits_truncate(
        Self::SYNTHETIC.bits() | Self::ANONYMOUS.bits() | Self::CLOSURE.bits() | Self::RESOURCE.bits(),
    );
}

bitflags! {
    /// Markers on a declared field.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FieldFlags: u8 {
        /// Assigned once at construction (final / constant).
        const CONSTANT = 1 << 0;
        /// Type-level storage shared by every instance.
        const STATIC = 1 << 1;
        /// Reflective access is denied by the host.
        const SEALED = 1 << 2;
    }
}

impl FieldFlags {
    /// Whether the field holds per-instance, copyable state.
    #[inline]
    pub fn is_copyable(self) -> bool {
        !self.intersects(Self::CONSTANT | Self::STATIC)
    }

    /// Whether the field lives in each instance rather than on the type.
    #[inline]
    pub fn is_instance(self) -> bool {
        !self.contains(Self::STATIC)
    }
}
