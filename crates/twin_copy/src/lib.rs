//! Deep copy of arbitrary object graphs.
//!
//! [`deep_copy`] produces an independent structural clone of any value on a
//! [`twin_heap::Heap`]: mutating the clone never affects the original.
//!
//! - **Cycles** terminate, and a cycle in the original is the same cycle in
//!   the clone.
//! - **Shared references** stay shared: an object reachable along two paths
//!   is cloned once.
//! - **Exempt values** come back unchanged: scalars, text, enum constants,
//!   and opaque types (closures, synthetic and anonymous types, live
//!   resources like threads and sockets). See [`ExemptionPolicy`].
//! - **Concrete container kinds** survive: a `TreeMap` copies to a
//!   `TreeMap`, an `IdentityHashMap` keeps identity keys.
//!
//! Structured objects are cloned without running their initializers, by
//! allocating a blank instance and copying each instance field reflectively.
//!
//! ```ignore
//! let copy = twin_copy::deep_copy(&mut heap, &Value::Ref(root))?;
//! ```
//!
//! # Debugging
//!
//! Call [`init_tracing`] and run with `RUST_LOG=twin_copy=trace` to see
//! every dispatch decision.

mod classify;
mod copier;
mod error;
mod policy;
mod reconstruct;
mod stack;
mod tracing_setup;
mod visited;

pub use classify::{classify, Strategy};
pub use copier::{CopyOptions, Copier};
pub use error::CopyFailure;
pub use policy::{Exemption, ExemptionPolicy, LAMBDA_MARKER};
pub use reconstruct::{empty_map_like, empty_sequence_like, map_kind_of, sequence_kind_of};
pub use tracing_setup::init_tracing;

use twin_heap::{Heap, Value};

/// Deep copy `value` with the default exemption policy.
///
/// Clones are allocated in `heap`, alongside the originals. On failure
/// nothing new stays allocated.
pub fn deep_copy(heap: &mut Heap, value: &Value) -> Result<Value, CopyFailure> {
    deep_copy_with(heap, value, &CopyOptions::default())
}

/// Deep copy `value` with explicit options.
pub fn deep_copy_with(heap: &mut Heap, value: &Value, options: &CopyOptions) -> Result<Value, CopyFailure> {
    let _span = tracing::debug_span!("deep_copy", root = value.kind_name()).entered();
    let mut copier = Copier::new(heap, options);
    let copy = copier.copy(value)?;
    tracing::debug!(copied = copier.copied(), "deep copy finished");
    Ok(copy)
}
