//! Fresh empty containers compatible with an original's concrete kind.
//!
//! The concrete kind decides observable behavior: ordering, uniqueness,
//! identity keys, concurrency safety. A copy reconstructs the nearest
//! builtin kind on the original's superclass chain, so a user type that
//! extends `TreeMap` comes back as a `TreeMap`. Types with no builtin
//! ancestor fall back to the general-purpose kind (`ArrayList` for
//! sequences, `HashMap` for maps).

use twin_heap::heap::{MapData, SequenceData};
use twin_heap::{MapKind, MapStore, SeqKind, SeqStore, TypeIdx, TypeRegistry};

/// Nearest builtin sequence kind on `ty`'s superclass chain.
pub fn sequence_kind_of(types: &TypeRegistry, ty: TypeIdx) -> SeqKind {
    types
        .ancestry(ty)
        .find_map(SeqKind::from_builtin)
        .unwrap_or(SeqKind::List)
}

/// Nearest builtin map kind on `ty`'s superclass chain.
pub fn map_kind_of(types: &TypeRegistry, ty: TypeIdx) -> MapKind {
    types
        .ancestry(ty)
        .find_map(MapKind::from_builtin)
        .unwrap_or(MapKind::Hash)
}

/// An empty sequence container that behaves like one of type `ty`.
pub fn empty_sequence_like(types: &TypeRegistry, ty: TypeIdx) -> SequenceData {
    let kind = sequence_kind_of(types, ty);
    SequenceData {
        ty: kind.builtin_type(),
        store: SeqStore::new(kind),
    }
}

/// An empty associative container that behaves like one of type `ty`.
pub fn empty_map_like(types: &TypeRegistry, ty: TypeIdx) -> MapData {
    let kind = map_kind_of(types, ty);
    MapData {
        ty: kind.builtin_type(),
        store: MapStore::new(kind),
    }
}
