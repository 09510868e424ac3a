use pretty_assertions::assert_eq;
use twin_heap::{FieldFlags, Heap, TypeIdx, TypeRegistry, Value};

use super::*;

fn node_heap() -> (Heap, TypeIdx) {
    let mut types = TypeRegistry::new();
    let node = types
        .class("Node")
        .field("value", TypeIdx::INT)
        .field("next", TypeIdx::OBJECT)
        .finish()
        .unwrap();
    (Heap::new(types), node)
}

fn node(heap: &mut Heap, ty: TypeIdx, value: i64, next: Value) -> ObjId {
    let id = heap.construct(ty).unwrap();
    heap.set_field(id, "value", value).unwrap();
    heap.set_field(id, "next", next).unwrap();
    id
}

// ── Options ─────────────────────────────────────────────────────────

#[test]
fn default_options_grow_the_stack() {
    let options = CopyOptions::default();
    assert!(options.grow_stack);
    assert!(!CopyOptions::default().grow_stack(false).grow_stack);
}

// ── Copier ──────────────────────────────────────────────────────────

#[test]
fn roots_copied_together_share_clones() {
    let (mut heap, ty) = node_heap();
    let tail = node(&mut heap, ty, 3, Value::Null);
    let a = node(&mut heap, ty, 1, tail.into());
    let b = node(&mut heap, ty, 2, tail.into());

    let options = CopyOptions::default();
    let mut copier = Copier::new(&mut heap, &options);
    let a2 = copier.copy(&a.into()).unwrap().as_obj().unwrap();
    let b2 = copier.copy(&b.into()).unwrap().as_obj().unwrap();
    assert_eq!(copier.copied(), 3);

    let heap = copier.heap();
    let tail_a = heap.field(a2, "next").unwrap();
    let tail_b = heap.field(b2, "next").unwrap();
    assert!(tail_a.same(&tail_b));
    assert!(!tail_a.same(&tail.into()));
}

#[test]
fn failed_copy_keeps_earlier_roots() {
    let mut types = TypeRegistry::new();
    let guarded = types
        .class("Guarded")
        .field_with("secret", TypeIdx::INT, FieldFlags::SEALED)
        .finish()
        .unwrap();
    let holder = types.class("Holder").field("inner", TypeIdx::OBJECT).finish().unwrap();
    let mut heap = Heap::new(types);

    let plain = heap.construct(holder).unwrap();
    let bad_inner = heap.construct(guarded).unwrap();
    let bad = heap.construct(holder).unwrap();
    heap.set_field(bad, "inner", bad_inner).unwrap();

    let options = CopyOptions::default();
    let mut copier = Copier::new(&mut heap, &options);
    let first = copier.copy(&plain.into()).unwrap();
    let after_first = copier.heap().len();

    let err = copier.copy(&bad.into()).unwrap_err();
    assert_eq!(err.type_name, "Guarded");
    assert_eq!(copier.heap().len(), after_first);
    assert_eq!(copier.copied(), 1);

    // The earlier clone is still registered and still alive.
    assert!(copier.copy(&plain.into()).unwrap().same(&first));
}

#[test]
fn copies_without_stack_growth() {
    let (mut heap, ty) = node_heap();
    let mut next = Value::Null;
    for value in 0..50 {
        next = node(&mut heap, ty, value, next).into();
    }

    let options = CopyOptions::default().grow_stack(false);
    let mut copier = Copier::new(&mut heap, &options);
    let copy = copier.copy(&next).unwrap();
    assert_eq!(copier.copied(), 50);
    assert!(twin_heap::structurally_equal(copier.heap(), &next, &copy));
}

#[test]
fn dangling_reference_fails() {
    let mut heap = Heap::default();
    let options = CopyOptions::default();
    let mut copier = Copier::new(&mut heap, &options);
    let ghost = ObjId::from_raw(9);
    let err = copier.copy(&Value::Ref(ghost)).unwrap_err();
    assert_eq!(err.type_name, "<unknown>");
    assert_eq!(err.cause, HostError::DanglingRef(ghost));
}
