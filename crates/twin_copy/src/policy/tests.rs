use pretty_assertions::assert_eq;
use twin_heap::{SeqKind, TypeFlags, TypeIdx, TypeRegistry};

use super::*;

fn registry() -> (TypeRegistry, TypeIdx, TypeIdx, TypeIdx) {
    let mut reg = TypeRegistry::new();
    let plain = reg.class("Man").field("name", TypeIdx::STR).finish().unwrap();
    let closure = reg
        .class("Main$Handler")
        .flags(TypeFlags::CLOSURE)
        .finish()
        .unwrap();
    let lambda = reg.class("Main$$Lambda$14/0x0001").finish().unwrap();
    (reg, plain, closure, lambda)
}

// ── Defaults ────────────────────────────────────────────────────────

#[test]
fn builtin_scalars_and_text_are_immutable() {
    let reg = TypeRegistry::new();
    let policy = ExemptionPolicy::default();
    for ty in [TypeIdx::BOOL, TypeIdx::CHAR, TypeIdx::BYTE, TypeIdx::INT, TypeIdx::FLOAT, TypeIdx::STR] {
        assert_eq!(policy.type_exemption(&reg, ty), Some(Exemption::Immutable));
    }
}

#[test]
fn enums_are_immutable() {
    let mut reg = TypeRegistry::new();
    let color = reg.register_enum("Color", ["RED", "GREEN"]);
    assert_eq!(
        ExemptionPolicy::default().type_exemption(&reg, color),
        Some(Exemption::Immutable)
    );
}

#[test]
fn plain_classes_and_containers_are_copied() {
    let (reg, plain, _, _) = registry();
    let policy = ExemptionPolicy::default();
    assert_eq!(policy.type_exemption(&reg, plain), None);
    assert_eq!(policy.type_exemption(&reg, TypeIdx::ARRAY_LIST), None);
    assert_eq!(policy.type_exemption(&reg, TypeIdx::HASH_MAP), None);
}

#[test]
fn resources_closures_and_lambdas_are_opaque() {
    let (reg, _, closure, lambda) = registry();
    let policy = ExemptionPolicy::default();
    for ty in [TypeIdx::THREAD, TypeIdx::SOCKET, TypeIdx::FILE_INPUT_STREAM, closure, lambda] {
        assert_eq!(policy.type_exemption(&reg, ty), Some(Exemption::Opaque), "{}", reg.name(ty));
    }
}

#[test]
fn opaque_flags_are_inherited() {
    let mut reg = TypeRegistry::new();
    let worker = reg.class("Worker").extends(TypeIdx::THREAD).finish().unwrap();
    assert_eq!(
        ExemptionPolicy::default().type_exemption(&reg, worker),
        Some(Exemption::Opaque)
    );
}

// ── Overrides ───────────────────────────────────────────────────────

#[test]
fn shared_types_cover_subtypes() {
    let mut reg = TypeRegistry::new();
    let config = reg.class("Config").finish().unwrap();
    let local = reg.class("LocalConfig").extends(config).finish().unwrap();
    let policy = ExemptionPolicy::default().share_type(config);
    assert_eq!(policy.type_exemption(&reg, config), Some(Exemption::Shared));
    assert_eq!(policy.type_exemption(&reg, local), Some(Exemption::Shared));
}

#[test]
fn copy_type_overrides_flags_and_patterns() {
    let (reg, _, closure, lambda) = registry();
    let policy = ExemptionPolicy::default().copy_type(closure).copy_type(lambda);
    assert_eq!(policy.type_exemption(&reg, closure), None);
    assert_eq!(policy.type_exemption(&reg, lambda), None);
    assert_eq!(policy.type_exemption(&reg, TypeIdx::THREAD), Some(Exemption::Opaque));
}

#[test]
fn extra_patterns_and_flag_sets() {
    let mut reg = TypeRegistry::new();
    let proxy = reg.class("com.sun.Proxy$12").finish().unwrap();
    let queue = reg
        .register_sequence("WorkQueue", SeqKind::Linked, TypeIdx::OBJECT)
        .unwrap();

    let policy = ExemptionPolicy::default().share_matching("Proxy$");
    assert_eq!(policy.type_exemption(&reg, proxy), Some(Exemption::Opaque));
    assert_eq!(policy.type_exemption(&reg, queue), None);

    let only_closures = ExemptionPolicy::default().exempt_flags(TypeFlags::CLOSURE);
    assert_eq!(only_closures.type_exemption(&reg, TypeIdx::SOCKET), None);
}
