//! Structural equality across object graphs.
//!
//! Two values are structurally equal when they have the same shape and the
//! same scalar content, regardless of object identity. Comparison is
//! coinductive: a pair of objects already under comparison is assumed equal,
//! so cyclic graphs terminate.
//!
//! Containers compare by category rather than exact type: a sequence is
//! compared positionally when both sides keep insertion order, and as a
//! multiset otherwise. Maps compare entry by entry, matching keys
//! structurally. Instances and arrays must have the same exact type.

use rustc_hash::FxHashSet;

use crate::heap::HeapData;
use crate::store::ElementOrder;
use crate::{Heap, ObjId, Value};

/// Whether `a` and `b` are deep-equal on `heap`.
pub fn structurally_equal(heap: &Heap, a: &Value, b: &Value) -> bool {
    Comparer {
        heap,
        assumed: FxHashSet::default(),
        trail: Vec::new(),
    }
    .values(a, b)
}

struct Comparer<'h> {
    heap: &'h Heap,
    assumed: FxHashSet<(ObjId, ObjId)>,
    /// Pairs in insertion order, so a failed trial can retract its own.
    trail: Vec<(ObjId, ObjId)>,
}

impl Comparer<'_> {
    fn values(&mut self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Ref(x), Value::Ref(y)) => self.objects(*x, *y),
            (Value::Ref(_), _) | (_, Value::Ref(_)) => false,
            _ => a == b,
        }
    }

    fn objects(&mut self, a: ObjId, b: ObjId) -> bool {
        if a == b || !self.assumed.insert((a, b)) {
            return true;
        }
        self.trail.push((a, b));
        let heap = self.heap;
        let (Ok(x), Ok(y)) = (heap.get(a), heap.get(b)) else {
            return false;
        };
        match (x, y) {
            (HeapData::Instance(x), HeapData::Instance(y)) => {
                x.ty == y.ty && self.positional(&x.slots, &y.slots)
            }
            (HeapData::Array(x), HeapData::Array(y)) => {
                x.ty == y.ty && self.positional(&x.elems, &y.elems)
            }
            (HeapData::Sequence(x), HeapData::Sequence(y)) => {
                let xs = x.store.to_vec();
                let ys = y.store.to_vec();
                let ordered = x.store.kind().order() == ElementOrder::Insertion
                    && y.store.kind().order() == ElementOrder::Insertion;
                if ordered {
                    self.positional(&xs, &ys)
                } else {
                    self.unordered(&xs, &ys)
                }
            }
            (HeapData::Map(x), HeapData::Map(y)) => {
                let xs = x.store.entries();
                let ys = y.store.entries();
                xs.len() == ys.len()
                    && xs.iter().all(|(k, v)| {
                        ys.iter().any(|(k2, v2)| self.tentative(|c| c.values(k, k2) && c.values(v, v2)))
                    })
            }
            _ => false,
        }
    }

    fn positional(&mut self, xs: &[Value], ys: &[Value]) -> bool {
        xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| self.values(x, y))
    }

    /// Multiset comparison: every element of `xs` pairs with a distinct,
    /// structurally equal element of `ys`.
    fn unordered(&mut self, xs: &[Value], ys: &[Value]) -> bool {
        if xs.len() != ys.len() {
            return false;
        }
        let mut used = vec![false; ys.len()];
        'outer: for x in xs {
            for (i, y) in ys.iter().enumerate() {
                if !used[i] && self.tentative(|c| c.values(x, y)) {
                    used[i] = true;
                    continue 'outer;
                }
            }
            return false;
        }
        true
    }

    /// Run a comparison whose assumptions are retracted if it fails.
    fn tentative(&mut self, f: impl FnOnce(&mut Self) -> bool) -> bool {
        let mark = self.trail.len();
        let equal = f(self);
        if !equal {
            for pair in self.trail.drain(mark..) {
                self.assumed.remove(&pair);
            }
        }
        equal
    }
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashSet;

    use super::{structurally_equal, Comparer};
    use crate::{Heap, TypeIdx, TypeRegistry, Value};

    #[test]
    fn scalars_compare_by_value() {
        let heap = Heap::new(TypeRegistry::new());
        assert!(structurally_equal(&heap, &Value::Int(3), &Value::Int(3)));
        assert!(structurally_equal(&heap, &Value::string("a"), &Value::string("a")));
        assert!(!structurally_equal(&heap, &Value::Int(3), &Value::Float(3.0)));
    }

    #[test]
    fn lists_compare_positionally() {
        let mut heap = Heap::new(TypeRegistry::new());
        let a = heap.alloc_list([Value::Int(1), Value::Int(2)]);
        let b = heap.alloc_list([Value::Int(1), Value::Int(2)]);
        let c = heap.alloc_list([Value::Int(2), Value::Int(1)]);
        assert!(structurally_equal(&heap, &a.into(), &b.into()));
        assert!(!structurally_equal(&heap, &a.into(), &c.into()));
    }

    #[test]
    fn hash_sets_compare_as_multisets() {
        let mut heap = Heap::new(TypeRegistry::new());
        let a = heap
            .alloc_sequence(TypeIdx::HASH_SET, [Value::Int(1), Value::Int(2)])
            .unwrap();
        let b = heap
            .alloc_sequence(TypeIdx::HASH_SET, [Value::Int(2), Value::Int(1)])
            .unwrap();
        assert!(structurally_equal(&heap, &a.into(), &b.into()));
    }

    #[test]
    fn cyclic_graphs_terminate() {
        let mut registry = TypeRegistry::new();
        let node = registry.class("Node").field("next", TypeIdx::OBJECT).finish().unwrap();
        let mut heap = Heap::new(registry);
        let a = heap.construct(node).unwrap();
        let b = heap.construct(node).unwrap();
        heap.set_field(a, "next", a).unwrap();
        heap.set_field(b, "next", b).unwrap();
        assert!(structurally_equal(&heap, &a.into(), &b.into()));
    }

    #[test]
    fn failed_trial_retracts_only_its_assumptions() {
        let mut registry = TypeRegistry::new();
        let node = registry
            .class("Node")
            .field("next", TypeIdx::OBJECT)
            .field("value", TypeIdx::INT)
            .finish()
            .unwrap();
        let mut heap = Heap::new(registry);
        let mut nodes = Vec::new();
        for value in [1_i64, 2, 1] {
            let id = heap.construct(node).unwrap();
            heap.set_field(id, "next", id).unwrap();
            heap.set_field(id, "value", value).unwrap();
            nodes.push(id);
        }
        let (one, two, other_one) = (nodes[0], nodes[1], nodes[2]);

        let mut comparer = Comparer {
            heap: &heap,
            assumed: FxHashSet::default(),
            trail: Vec::new(),
        };
        assert!(comparer.tentative(|c| c.objects(one, other_one)));
        assert!(!comparer.tentative(|c| c.objects(one, two)));
        assert!(comparer.assumed.contains(&(one, other_one)));
        assert!(!comparer.assumed.contains(&(one, two)));
        assert_eq!(comparer.trail, vec![(one, other_one)]);
    }

    #[test]
    fn sets_of_objects_match_by_content() {
        let mut registry = TypeRegistry::new();
        let node = registry.class("Leaf").field("value", TypeIdx::INT).finish().unwrap();
        let mut heap = Heap::new(registry);
        let leaves = |heap: &mut Heap, values: &[i64]| -> Vec<Value> {
            values
                .iter()
                .map(|v| {
                    let id = heap.construct(node).unwrap();
                    heap.set_field(id, "value", *v).unwrap();
                    Value::Ref(id)
                })
                .collect()
        };
        let xs = leaves(&mut heap, &[1, 2, 3]);
        let ys = leaves(&mut heap, &[3, 1, 2]);
        let zs = leaves(&mut heap, &[3, 1, 1]);
        let x = heap.alloc_sequence(TypeIdx::HASH_SET, xs).unwrap();
        let y = heap.alloc_sequence(TypeIdx::HASH_SET, ys).unwrap();
        let z = heap.alloc_sequence(TypeIdx::HASH_SET, zs).unwrap();
        assert!(structurally_equal(&heap, &x.into(), &y.into()));
        assert!(!structurally_equal(&heap, &x.into(), &z.into()));
    }
}
