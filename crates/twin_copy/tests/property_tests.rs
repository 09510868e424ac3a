//! Property-based tests for deep copy.
//!
//! Random acyclic object graphs (with shared sub-objects) are built on a
//! heap and copied. Every copy must:
//! 1. be structurally equal to the original,
//! 2. reach only freshly allocated objects,
//! 3. clone each reachable original exactly once.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use proptest::prelude::*;
use proptest::sample::Index;
use rustc_hash::FxHashSet;
use twin_copy::deep_copy;
use twin_heap::{structurally_equal, Heap, HeapData, ObjId, TypeIdx, TypeRegistry, Value};

// -- Graph Generation --

/// One node: a shape selector, a payload, and picks among earlier nodes.
type NodeSpec = (u8, i64, Vec<Index>);

fn graph_strategy() -> impl Strategy<Value = Vec<NodeSpec>> {
    prop::collection::vec(
        (0u8..5, any::<i64>(), prop::collection::vec(any::<Index>(), 0..4)),
        1..32,
    )
}

/// Build the graph; the last node is the root. Children always point at
/// earlier nodes, so the graph is acyclic but freely shared.
fn build(spec: &[NodeSpec]) -> (Heap, Value) {
    let mut types = TypeRegistry::new();
    let node = types
        .class("Node")
        .field("value", TypeIdx::INT)
        .field("a", TypeIdx::OBJECT)
        .field("b", TypeIdx::OBJECT)
        .field("label", TypeIdx::STR)
        .finish()
        .unwrap();
    let mut heap = Heap::new(types);

    let mut ids: Vec<ObjId> = Vec::with_capacity(spec.len());
    for (shape, payload, picks) in spec {
        let children: Vec<Value> = picks
            .iter()
            .map(|pick| {
                if ids.is_empty() {
                    Value::Int(*payload)
                } else {
                    Value::Ref(ids[pick.index(ids.len())])
                }
            })
            .collect();

        let id = match shape {
            0 => {
                let id = heap.construct(node).unwrap();
                heap.set_field(id, "value", *payload).unwrap();
                heap.set_field(id, "label", format!("n{payload}").as_str()).unwrap();
                for (name, child) in ["a", "b"].into_iter().zip(&children) {
                    heap.set_field(id, name, child.clone()).unwrap();
                }
                id
            }
            1 => heap.alloc_list(children),
            2 => heap
                .alloc_sequence(TypeIdx::LINKED_HASH_SET, children)
                .unwrap(),
            3 => {
                let entries = children
                    .into_iter()
                    .zip(0..)
                    .map(|(child, offset)| (Value::Int(payload.wrapping_add(offset)), child));
                heap.alloc_map(TypeIdx::TREE_MAP, entries).unwrap()
            }
            _ => heap.alloc_array(TypeIdx::OBJECT, children),
        };
        ids.push(id);
    }
    let root = ids.last().copied().map_or(Value::Null, Value::Ref);
    (heap, root)
}

/// Every object reachable from `root`.
fn reachable(heap: &Heap, root: &Value) -> FxHashSet<ObjId> {
    let mut seen = FxHashSet::default();
    let mut stack: Vec<ObjId> = root.as_obj().into_iter().collect();
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        let values: Vec<Value> = match heap.get(id).unwrap() {
            HeapData::Instance(o) => o.slots.clone(),
            HeapData::Array(o) => o.elems.clone(),
            HeapData::Sequence(o) => o.store.to_vec(),
            HeapData::Map(o) => o
                .store
                .entries()
                .into_iter()
                .flat_map(|(k, v)| [k, v])
                .collect(),
        };
        stack.extend(values.iter().filter_map(Value::as_obj));
    }
    seen
}

// -- Properties --

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 500,
        ..ProptestConfig::default()
    })]

    /// The copy has the same content as the original.
    #[test]
    fn copy_is_structurally_equal(spec in graph_strategy()) {
        let (mut heap, root) = build(&spec);
        let copy = deep_copy(&mut heap, &root).unwrap();
        prop_assert!(structurally_equal(&heap, &root, &copy));
    }

    /// The copy shares no object with the original, and each reachable
    /// original is cloned exactly once.
    #[test]
    fn copy_is_independent(spec in graph_strategy()) {
        let (mut heap, root) = build(&spec);
        let originals = reachable(&heap, &root);
        let mark = heap.len();

        let copy = deep_copy(&mut heap, &root).unwrap();
        let clones = reachable(&heap, &copy);

        prop_assert_eq!(clones.len(), originals.len());
        prop_assert_eq!(heap.len() - mark, originals.len());
        prop_assert!(clones.iter().all(|id| id.index() >= mark));
    }
}
