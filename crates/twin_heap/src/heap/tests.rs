use pretty_assertions::assert_eq;

use super::*;
use crate::{SeqKind, TypeFlags};

fn person_heap() -> (Heap, TypeIdx) {
    let mut reg = TypeRegistry::new();
    let person = reg
        .class("Person")
        .field("name", TypeIdx::STR)
        .field("age", TypeIdx::INT)
        .constant("id", TypeIdx::INT)
        .static_field("population", TypeIdx::INT)
        .field_with("secret", TypeIdx::STR, FieldFlags::SEALED)
        .initializer(|heap, id| {
            heap.set_field(id, "age", 18_i64)?;
            let ty = heap.type_of(id)?;
            if let Some(population) = heap.types().find_field(ty, "population") {
                if let Value::Int(n) = heap.static_value(population) {
                    heap.set_static(population, n + 1);
                }
            }
            Ok(())
        })
        .finish()
        .unwrap();
    (Heap::new(reg), person)
}

#[test]
fn construct_runs_initializer() {
    let (mut heap, person) = person_heap();
    let p = heap.construct(person).unwrap();
    assert_eq!(heap.field(p, "age").unwrap(), Value::Int(18));
    let population = heap.types().find_field(person, "population").unwrap();
    assert_eq!(heap.static_value(population), Value::Int(1));
}

#[test]
fn allocate_blank_skips_initializer() {
    let (mut heap, person) = person_heap();
    let p = heap.allocate_blank(person).unwrap();
    assert_eq!(heap.field(p, "age").unwrap(), Value::Int(0));
    assert_eq!(heap.field(p, "name").unwrap(), Value::Null);
    let population = heap.types().find_field(person, "population").unwrap();
    assert_eq!(heap.static_value(population), Value::Int(0));
}

#[test]
fn allocate_blank_refuses_flagged_and_non_class_types() {
    let mut reg = TypeRegistry::new();
    let guarded = reg.class("Guarded").flags(TypeFlags::NO_RAW_ALLOC).finish().unwrap();
    let mut heap = Heap::new(reg);

    assert!(matches!(
        heap.allocate_blank(guarded),
        Err(HostError::NotInstantiable { .. })
    ));
    assert!(matches!(
        heap.allocate_blank(TypeIdx::ARRAY_LIST),
        Err(HostError::NotInstantiable { .. })
    ));
    // The normal construction path is still available.
    assert!(heap.construct(guarded).is_ok());
}

#[test]
fn reflective_access_honors_seal() {
    let (mut heap, person) = person_heap();
    let p = heap.construct(person).unwrap();
    let secret = heap.types().find_field(person, "secret").unwrap();

    assert!(matches!(
        heap.read_field(p, secret),
        Err(HostError::AccessDenied { .. })
    ));
    assert!(heap.write_field(p, secret, Value::string("x")).is_err());
    // By-name access is the type's own code and ignores the seal.
    heap.set_field(p, "secret", "x").unwrap();
    assert_eq!(heap.field(p, "secret").unwrap().as_str(), Some("x"));
}

#[test]
fn reflective_field_round_trip() {
    let (mut heap, person) = person_heap();
    let p = heap.construct(person).unwrap();
    let name = heap.types().find_field(person, "name").unwrap();
    heap.write_field(p, name, Value::string("Dima")).unwrap();
    assert_eq!(heap.read_field(p, name).unwrap().as_str(), Some("Dima"));
}

#[test]
fn foreign_field_is_rejected() {
    let (mut heap, person) = person_heap();
    let other = heap
        .types_mut()
        .class("Other")
        .field("z", TypeIdx::INT)
        .finish()
        .unwrap();
    let z = heap.types().find_field(other, "z").unwrap();
    let p = heap.construct(person).unwrap();
    assert!(matches!(heap.read_field(p, z), Err(HostError::NoSuchField { .. })));
    assert!(matches!(heap.field(p, "missing"), Err(HostError::NoSuchField { .. })));
}

#[test]
fn arrays() {
    let mut heap = Heap::new(TypeRegistry::new());
    let arr = heap.alloc_array(TypeIdx::STR, vec![Value::string("a"), Value::string("b")]);
    assert_eq!(heap.array(arr).unwrap().len(), 2);
    heap.array_set(arr, 1, "c").unwrap();
    assert_eq!(heap.array(arr).unwrap()[1].as_str(), Some("c"));
    assert!(matches!(
        heap.array_set(arr, 5, Value::Null),
        Err(HostError::IndexOutOfBounds { index: 5, len: 2 })
    ));

    let ty = heap.type_of(arr).unwrap();
    let ints = heap.types_mut().array_of(TypeIdx::INT);
    let zeroed = heap.alloc_array_zeroed(ints, 3).unwrap();
    assert_eq!(heap.array(zeroed).unwrap(), &[Value::Int(0), Value::Int(0), Value::Int(0)]);
    assert!(heap.alloc_array_zeroed(TypeIdx::STR, 1).is_err());
    assert_eq!(heap.types().name(ty), "str[]");
}

#[test]
fn containers() {
    let mut heap = Heap::new(TypeRegistry::new());
    let set = heap
        .alloc_sequence(TypeIdx::HASH_SET, [Value::Int(1), Value::Int(1)])
        .unwrap();
    assert_eq!(heap.sequence(set).unwrap().store.len(), 1);
    assert_eq!(heap.sequence(set).unwrap().store.kind(), SeqKind::HashSet);
    assert!(!heap.sequence_push(set, 1_i64).unwrap());

    let map = heap.alloc_map(TypeIdx::TREE_MAP, []).unwrap();
    heap.map_insert(map, "b", 2_i64).unwrap();
    heap.map_insert(map, "a", 1_i64).unwrap();
    assert_eq!(heap.map_get(map, &Value::string("a")).unwrap(), Some(Value::Int(1)));

    assert!(heap.alloc_sequence(TypeIdx::HASH_MAP, []).is_err());
    assert!(heap.alloc_map(TypeIdx::ARRAY_LIST, []).is_err());
    assert!(matches!(heap.map(set), Err(HostError::KindMismatch { .. })));
}

#[test]
fn dangling_reference() {
    let heap = Heap::new(TypeRegistry::new());
    let id = ObjId::from_raw(99);
    assert_eq!(heap.get(id).unwrap_err(), HostError::DanglingRef(id));
}

#[test]
fn discard_from_drops_newer_objects() {
    let mut heap = Heap::new(TypeRegistry::new());
    let kept = heap.alloc_list([]);
    let mark = heap.len();
    let dropped = heap.alloc_list([Value::Int(1)]);
    heap.discard_from(mark);
    assert_eq!(heap.len(), 1);
    assert!(heap.get(kept).is_ok());
    assert!(heap.get(dropped).is_err());
}
