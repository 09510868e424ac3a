//! Stack growth for copying deep object graphs.
//!
//! Copy recursion is as deep as the longest reference chain in the graph, so
//! a long linked list overflows a thread's native stack. When stack growth is
//! enabled, each level checks the remaining stack and switches to a freshly
//! allocated segment when it runs low.
//!
//! On `wasm32` the guard is a passthrough; the runtime manages its own stack.

/// Grow when less than this much stack remains (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2MB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first moving to a new stack segment if the current one is
/// nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
