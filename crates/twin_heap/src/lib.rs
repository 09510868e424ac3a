//! Object model for the Twin deep-copy engine.
//!
//! Rust has no runtime reflection, so this crate provides the host
//! capabilities a generic copier needs as an explicit object model:
//!
//! - **Values** ([`Value`]): inline scalars, enum constants, shared
//!   immutable text, null, and references to heap objects.
//! - **Types** ([`TypeRegistry`]): per-type reflection tables registered up
//!   front. Classes declare fields with [`FieldFlags`] and inherit from a
//!   single superclass; containers declare which concrete kind
//!   ([`SeqKind`], [`MapKind`]) their storage behaves like; [`TypeFlags`]
//!   mark closures, synthetic and anonymous types, and live resources.
//! - **Heap** ([`Heap`]): an arena of objects addressed by [`ObjId`], so
//!   object identity is an index. Provides allocation without
//!   initialization and reflective field access.
//!
//! # Identity
//!
//! `ObjId` equality is object identity. [`Value::same`] extends it to text
//! (pointer identity) and inline scalars (bitwise equality).
//!
//! # Thread Safety
//!
//! A `Heap` is a plain owned value. Operations that mutate it take
//! `&mut Heap`, so independent heaps can be used from independent threads
//! with no shared state.

mod compare;
mod error;
pub mod heap;
mod id;
pub mod store;
pub mod types;
mod value;

pub use compare::structurally_equal;
pub use error::HostError;
pub use heap::{Heap, HeapData};
pub use id::ObjId;
pub use store::{ElementOrder, MapKind, MapStore, SeqKind, SeqStore};
pub use types::{
    ClassDef, FieldDef, FieldFlags, FieldRef, Initializer, TypeEntry, TypeFlags, TypeIdx, TypeKind,
    TypeRegistry,
};
pub use value::{EnumConst, Text, Value};
