//! The recursive copy resolver.
//!
//! [`Copier::copy`] resolves one value at a time. Each value goes through a
//! fixed priority order and the first match wins:
//!
//! 1. Null stays null.
//! 2. A reference already in the visited registry resolves to its clone.
//! 3. An exempt value (immutable, shared or opaque) is returned unchanged.
//! 4. Arrays, sequences and maps are rebuilt with the same concrete kind.
//! 5. Anything else is a structured object, cloned field by field.
//!
//! Every new clone is registered before its contents are resolved, which is
//! what makes cycles terminate and shared references stay shared.
//!
//! # Failure
//!
//! A copy that fails rolls back: every object allocated since the call
//! started is discarded, and so are their visited entries. Clones produced
//! by earlier successful calls on the same `Copier` are kept.

mod object;

use twin_heap::{Heap, HeapData, HostError, ObjId, Value};

use crate::classify::{classify, Strategy};
use crate::policy::ExemptionPolicy;
use crate::visited::VisitedRegistry;
use crate::{reconstruct, stack, CopyFailure};

/// Settings for one deep copy.
#[derive(Clone, Debug)]
pub struct CopyOptions {
    /// Which values are passed through unchanged.
    pub policy: ExemptionPolicy,
    /// Move recursion onto a fresh stack segment when the current one runs
    /// low. Without it the depth of a copyable graph is bounded by the
    /// native stack.
    pub grow_stack: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        CopyOptions {
            policy: ExemptionPolicy::default(),
            grow_stack: true,
        }
    }
}

impl CopyOptions {
    /// Use `policy` to decide exemptions.
    #[must_use]
    pub fn with_policy(mut self, policy: ExemptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enable or disable stack growth.
    #[must_use]
    pub fn grow_stack(mut self, enabled: bool) -> Self {
        self.grow_stack = enabled;
        self
    }
}

/// Deep copier over one heap.
///
/// All roots copied through the same `Copier` share one visited registry:
/// an object reachable from two roots is cloned once and both copies point
/// at that clone.
pub struct Copier<'h, 'o> {
    heap: &'h mut Heap,
    options: &'o CopyOptions,
    visited: VisitedRegistry,
}

impl<'h, 'o> Copier<'h, 'o> {
    pub fn new(heap: &'h mut Heap, options: &'o CopyOptions) -> Self {
        Copier {
            heap,
            options,
            visited: VisitedRegistry::default(),
        }
    }

    /// Deep copy `value`. Clones are allocated in the copier's heap.
    pub fn copy(&mut self, value: &Value) -> Result<Value, CopyFailure> {
        let mark = self.heap.len();
        self.resolve(value).inspect_err(|err| {
            tracing::debug!(error = %err, "deep copy failed, rolling back");
            self.visited.forget_from(mark);
            self.heap.discard_from(mark);
        })
    }

    /// Number of objects cloned so far.
    pub fn copied(&self) -> usize {
        self.visited.len()
    }

    /// The heap being copied within.
    pub fn heap(&self) -> &Heap {
        self.heap
    }

    fn resolve(&mut self, value: &Value) -> Result<Value, CopyFailure> {
        if self.options.grow_stack {
            stack::ensure_sufficient_stack(|| self.resolve_inner(value))
        } else {
            self.resolve_inner(value)
        }
    }

    fn resolve_inner(&mut self, value: &Value) -> Result<Value, CopyFailure> {
        if let Value::Ref(id) = value {
            if let Some(clone) = self.visited.lookup(*id) {
                return Ok(Value::Ref(clone));
            }
        }

        let strategy = classify(self.heap, &self.options.policy, value).map_err(|cause| match value {
            Value::Ref(id) => self.failure(*id, cause),
            other => CopyFailure::new(other.kind_name(), cause),
        })?;
        tracing::trace!(?strategy, "dispatch");

        match strategy {
            Strategy::Null | Strategy::Share(_) => Ok(value.clone()),
            Strategy::Array(id) => self.copy_array(id),
            Strategy::Sequence(id) => self.copy_sequence(id),
            Strategy::Map(id) => self.copy_map(id),
            Strategy::Object(id) => self.copy_object(id),
        }
    }

    fn copy_array(&mut self, id: ObjId) -> Result<Value, CopyFailure> {
        let ty = self.heap.type_of(id).map_err(|cause| self.failure(id, cause))?;
        let elems = self
            .heap
            .array(id)
            .map_err(|cause| self.failure(id, cause))?
            .to_vec();

        let clone = self
            .heap
            .alloc_array_zeroed(ty, elems.len())
            .map_err(|cause| self.failure(id, cause))?;
        self.visited.register(id, clone);

        for (index, elem) in elems.iter().enumerate() {
            let copied = self.resolve(elem)?;
            self.heap
                .array_set(clone, index, copied)
                .map_err(|cause| self.failure(id, cause))?;
        }
        Ok(Value::Ref(clone))
    }

    fn copy_sequence(&mut self, id: ObjId) -> Result<Value, CopyFailure> {
        let (ty, items) = {
            let seq = self.heap.sequence(id).map_err(|cause| self.failure(id, cause))?;
            (seq.ty, seq.store.to_vec())
        };

        let empty = reconstruct::empty_sequence_like(self.heap.types(), ty);
        let clone = self.heap.alloc(HeapData::Sequence(empty));
        self.visited.register(id, clone);

        for item in &items {
            let copied = self.resolve(item)?;
            self.heap
                .sequence_push(clone, copied)
                .map_err(|cause| self.failure(id, cause))?;
        }
        Ok(Value::Ref(clone))
    }

    fn copy_map(&mut self, id: ObjId) -> Result<Value, CopyFailure> {
        let (ty, entries) = {
            let map = self.heap.map(id).map_err(|cause| self.failure(id, cause))?;
            (map.ty, map.store.entries())
        };

        let empty = reconstruct::empty_map_like(self.heap.types(), ty);
        let clone = self.heap.alloc(HeapData::Map(empty));
        self.visited.register(id, clone);

        for (key, value) in &entries {
            let key = self.resolve(key)?;
            let value = self.resolve(value)?;
            self.heap
                .map_insert(clone, key, value)
                .map_err(|cause| self.failure(id, cause))?;
        }
        Ok(Value::Ref(clone))
    }

    fn failure(&self, id: ObjId, cause: HostError) -> CopyFailure {
        let types = self.heap.types();
        let type_name = self
            .heap
            .type_of(id)
            .map_or("<unknown>", |ty| types.name(ty));
        CopyFailure::new(type_name, cause)
    }
}

#[cfg(test)]
mod tests;
