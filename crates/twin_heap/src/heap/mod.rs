//! Arena heap of objects.
//!
//! Objects live in a `Vec<HeapData>` and are addressed by [`ObjId`]. The heap
//! owns the [`TypeRegistry`] that describes them and the type-level storage
//! of static fields.
//!
//! # Capabilities
//!
//! Besides the ordinary program-facing API (construct, get and set fields by
//! name, build arrays and containers), the heap provides the reflective
//! capabilities a generic copier needs:
//!
//! - [`allocate_blank`](Heap::allocate_blank): a zero-filled instance of a
//!   class, without running any initializer.
//! - [`read_field`](Heap::read_field) / [`write_field`](Heap::write_field):
//!   field access by [`FieldRef`], which the host denies for sealed fields.
//! - [`type_of`](Heap::type_of): exact runtime type of an object.
//!
//! By-name accessors ([`field`](Heap::field), [`set_field`](Heap::set_field))
//! stand for the type's own code and are not subject to sealing.

use rustc_hash::FxHashMap;

use crate::store::{MapStore, SeqStore};
use crate::types::{FieldFlags, FieldRef, TypeKind, TypeRegistry};
use crate::{HostError, ObjId, TypeIdx, Value};

/// Instance of a class.
#[derive(Debug)]
pub struct Instance {
    /// Exact runtime type.
    pub ty: TypeIdx,
    /// Instance fields in layout order (ancestors first).
    pub slots: Vec<Value>,
}

/// Fixed-length array.
#[derive(Debug)]
pub struct ArrayData {
    /// Array type (`T[]`).
    pub ty: TypeIdx,
    /// Elements.
    pub elems: Vec<Value>,
}

/// Sequence container.
#[derive(Debug)]
pub struct SequenceData {
    /// Concrete container type.
    pub ty: TypeIdx,
    /// Elements.
    pub store: SeqStore,
}

/// Associative container.
#[derive(Debug)]
pub struct MapData {
    /// Concrete container type.
    pub ty: TypeIdx,
    /// Entries.
    pub store: MapStore,
}

/// An object on the heap.
#[derive(Debug)]
pub enum HeapData {
    Instance(Instance),
    Array(ArrayData),
    Sequence(SequenceData),
    Map(MapData),
}

impl HeapData {
    /// Exact runtime type of the object.
    pub fn ty(&self) -> TypeIdx {
        match self {
            HeapData::Instance(o) => o.ty,
            HeapData::Array(o) => o.ty,
            HeapData::Sequence(o) => o.ty,
            HeapData::Map(o) => o.ty,
        }
    }

    /// Name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            HeapData::Instance(_) => "instance",
            HeapData::Array(_) => "array",
            HeapData::Sequence(_) => "sequence",
            HeapData::Map(_) => "map",
        }
    }
}

/// Arena of objects plus the types that describe them.
#[derive(Debug, Default)]
pub struct Heap {
    types: TypeRegistry,
    objects: Vec<HeapData>,
    statics: FxHashMap<FieldRef, Value>,
}

impl Heap {
    /// Create an empty heap over a type registry.
    pub fn new(types: TypeRegistry) -> Self {
        Heap {
            types,
            objects: Vec::new(),
            statics: FxHashMap::default(),
        }
    }

    /// The type registry.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// The type registry, for registering more types.
    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    /// Number of objects ever allocated.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether nothing has been allocated.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Place an object in the arena.
    pub fn alloc(&mut self, data: HeapData) -> ObjId {
        let id = ObjId::from_raw(u32::try_from(self.objects.len()).unwrap_or(u32::MAX));
        self.objects.push(data);
        id
    }

    /// Drop every object allocated at or after `mark` (a previous
    /// [`len`](Heap::len)).
    ///
    /// Only sound when no object below `mark`, no static and no value held
    /// by the caller still references the discarded objects.
    pub fn discard_from(&mut self, mark: usize) {
        if mark < self.objects.len() {
            tracing::trace!(discarded = self.objects.len() - mark, "discarding objects");
            self.objects.truncate(mark);
        }
    }

    /// Look up an object.
    pub fn get(&self, id: ObjId) -> Result<&HeapData, HostError> {
        self.objects.get(id.index()).ok_or(HostError::DanglingRef(id))
    }

    fn get_mut(&mut self, id: ObjId) -> Result<&mut HeapData, HostError> {
        self.objects
            .get_mut(id.index())
            .ok_or(HostError::DanglingRef(id))
    }

    /// Exact runtime type of an object.
    pub fn type_of(&self, id: ObjId) -> Result<TypeIdx, HostError> {
        self.get(id).map(HeapData::ty)
    }

    // Instances

    /// Allocate an instance through its normal construction path: zero-fill
    /// the slots, then run each initializer from the root ancestor down.
    pub fn construct(&mut self, ty: TypeIdx) -> Result<ObjId, HostError> {
        let id = self.zeroed_instance(ty)?;
        let mut initializers: Vec<_> = self
            .types
            .ancestry(ty)
            .filter_map(|t| self.types.class_def(t).and_then(|def| def.initializer()))
            .collect();
        initializers.reverse();
        for init in initializers {
            init(self, id)?;
        }
        Ok(id)
    }

    /// Allocate a zero-filled instance without running any initializer.
    ///
    /// Fails with [`HostError::NotInstantiable`] if `ty` is not a class or
    /// is flagged [`NO_RAW_ALLOC`](crate::TypeFlags::NO_RAW_ALLOC).
    pub fn allocate_blank(&mut self, ty: TypeIdx) -> Result<ObjId, HostError> {
        if self
            .types
            .flags(ty)
            .contains(crate::TypeFlags::NO_RAW_ALLOC)
        {
            return Err(HostError::NotInstantiable {
                type_name: self.types.name(ty).to_owned(),
            });
        }
        self.zeroed_instance(ty)
    }

    fn zeroed_instance(&mut self, ty: TypeIdx) -> Result<ObjId, HostError> {
        let Some(def) = self.types.class_def(ty) else {
            return Err(HostError::NotInstantiable {
                type_name: self.types.name(ty).to_owned(),
            });
        };
        let mut slots = vec![Value::Null; def.instance_size()];
        for (field, decl) in self.types.fields_of(ty) {
            if let Some(slot) = self.types.slot_of(field) {
                slots[slot] = self.types.zero_value(decl.ty);
            }
        }
        Ok(self.alloc(HeapData::Instance(Instance { ty, slots })))
    }

    fn instance(&self, id: ObjId) -> Result<&Instance, HostError> {
        match self.get(id)? {
            HeapData::Instance(o) => Ok(o),
            other => Err(HostError::KindMismatch {
                expected: "instance",
                found: other.kind_name().to_owned(),
            }),
        }
    }

    /// Reflectively read a field. Static fields read type-level storage.
    pub fn read_field(&self, id: ObjId, field: FieldRef) -> Result<Value, HostError> {
        let ty = self.instance(id)?.ty;
        self.check_reflective_access(ty, field)?;
        self.read_unchecked(id, field)
    }

    /// Reflectively write a field. Static fields write type-level storage.
    pub fn write_field(&mut self, id: ObjId, field: FieldRef, value: Value) -> Result<(), HostError> {
        let ty = self.instance(id)?.ty;
        self.check_reflective_access(ty, field)?;
        self.write_unchecked(id, field, value)
    }

    fn check_reflective_access(&self, ty: TypeIdx, field: FieldRef) -> Result<(), HostError> {
        let decl = self.declared(ty, field)?;
        if decl.flags.contains(FieldFlags::SEALED) {
            return Err(HostError::AccessDenied {
                type_name: self.types.name(field.owner).to_owned(),
                field: decl.name.clone(),
            });
        }
        Ok(())
    }

    fn declared(&self, ty: TypeIdx, field: FieldRef) -> Result<&crate::FieldDef, HostError> {
        let decl = self.types.field_def(field);
        match decl {
            Some(decl) if self.types.is_subtype(ty, field.owner) => Ok(decl),
            _ => Err(HostError::NoSuchField {
                type_name: self.types.name(ty).to_owned(),
                field: format!("#{}", field.index),
            }),
        }
    }

    fn read_unchecked(&self, id: ObjId, field: FieldRef) -> Result<Value, HostError> {
        match self.types.slot_of(field) {
            Some(slot) => Ok(self.instance(id)?.slots[slot].clone()),
            None => Ok(self.static_value(field)),
        }
    }

    fn write_unchecked(&mut self, id: ObjId, field: FieldRef, value: Value) -> Result<(), HostError> {
        match self.types.slot_of(field) {
            Some(slot) => match self.get_mut(id)? {
                HeapData::Instance(o) => {
                    o.slots[slot] = value;
                    Ok(())
                }
                other => Err(HostError::KindMismatch {
                    expected: "instance",
                    found: other.kind_name().to_owned(),
                }),
            },
            None => {
                self.statics.insert(field, value);
                Ok(())
            }
        }
    }

    fn resolve(&self, id: ObjId, name: &str) -> Result<FieldRef, HostError> {
        let ty = self.instance(id)?.ty;
        self.types
            .find_field(ty, name)
            .ok_or_else(|| HostError::NoSuchField {
                type_name: self.types.name(ty).to_owned(),
                field: name.to_owned(),
            })
    }

    /// Read a field by name.
    pub fn field(&self, id: ObjId, name: &str) -> Result<Value, HostError> {
        let field = self.resolve(id, name)?;
        self.read_unchecked(id, field)
    }

    /// Write a field by name.
    pub fn set_field(&mut self, id: ObjId, name: &str, value: impl Into<Value>) -> Result<(), HostError> {
        let field = self.resolve(id, name)?;
        self.write_unchecked(id, field, value.into())
    }

    /// Current value of a static field (its zero value until assigned).
    pub fn static_value(&self, field: FieldRef) -> Value {
        match self.statics.get(&field) {
            Some(value) => value.clone(),
            None => self
                .types
                .field_def(field)
                .map_or(Value::Null, |decl| self.types.zero_value(decl.ty)),
        }
    }

    /// Assign a static field.
    pub fn set_static(&mut self, field: FieldRef, value: impl Into<Value>) {
        self.statics.insert(field, value.into());
    }

    // Arrays

    /// Allocate an array of `component` holding `elems`.
    pub fn alloc_array(&mut self, component: TypeIdx, elems: Vec<Value>) -> ObjId {
        let ty = self.types.array_of(component);
        self.alloc(HeapData::Array(ArrayData { ty, elems }))
    }

    /// Allocate a zero-filled array of an existing array type.
    pub fn alloc_array_zeroed(&mut self, ty: TypeIdx, len: usize) -> Result<ObjId, HostError> {
        let component = match self.types.entry(ty).map(|e| &e.kind) {
            Some(TypeKind::Array { component }) => *component,
            _ => {
                return Err(HostError::KindMismatch {
                    expected: "array type",
                    found: self.types.name(ty).to_owned(),
                })
            }
        };
        let elems = vec![self.types.zero_value(component); len];
        Ok(self.alloc(HeapData::Array(ArrayData { ty, elems })))
    }

    /// The elements of an array.
    pub fn array(&self, id: ObjId) -> Result<&[Value], HostError> {
        match self.get(id)? {
            HeapData::Array(o) => Ok(&o.elems),
            other => Err(HostError::KindMismatch {
                expected: "array",
                found: other.kind_name().to_owned(),
            }),
        }
    }

    /// Overwrite one array slot.
    pub fn array_set(&mut self, id: ObjId, index: usize, value: impl Into<Value>) -> Result<(), HostError> {
        match self.get_mut(id)? {
            HeapData::Array(o) => {
                let len = o.elems.len();
                let slot = o
                    .elems
                    .get_mut(index)
                    .ok_or(HostError::IndexOutOfBounds { index, len })?;
                *slot = value.into();
                Ok(())
            }
            other => Err(HostError::KindMismatch {
                expected: "array",
                found: other.kind_name().to_owned(),
            }),
        }
    }

    // Sequences

    /// Allocate a sequence container of type `ty` holding `items`.
    pub fn alloc_sequence(
        &mut self,
        ty: TypeIdx,
        items: impl IntoIterator<Item = Value>,
    ) -> Result<ObjId, HostError> {
        let kind = match self.types.entry(ty).map(|e| &e.kind) {
            Some(TypeKind::Sequence(kind)) => *kind,
            _ => {
                return Err(HostError::KindMismatch {
                    expected: "sequence type",
                    found: self.types.name(ty).to_owned(),
                })
            }
        };
        let mut store = SeqStore::new(kind);
        for item in items {
            store.push(item);
        }
        Ok(self.alloc(HeapData::Sequence(SequenceData { ty, store })))
    }

    /// Allocate an `ArrayList` holding `items`.
    pub fn alloc_list(&mut self, items: impl IntoIterator<Item = Value>) -> ObjId {
        let mut store = SeqStore::new(crate::SeqKind::List);
        for item in items {
            store.push(item);
        }
        self.alloc(HeapData::Sequence(SequenceData {
            ty: TypeIdx::ARRAY_LIST,
            store,
        }))
    }

    /// A sequence container.
    pub fn sequence(&self, id: ObjId) -> Result<&SequenceData, HostError> {
        match self.get(id)? {
            HeapData::Sequence(o) => Ok(o),
            other => Err(HostError::KindMismatch {
                expected: "sequence",
                found: other.kind_name().to_owned(),
            }),
        }
    }

    /// Append to a sequence container. Returns `false` if a unique kind
    /// already held the element.
    pub fn sequence_push(&mut self, id: ObjId, value: impl Into<Value>) -> Result<bool, HostError> {
        match self.get_mut(id)? {
            HeapData::Sequence(o) => Ok(o.store.push(value.into())),
            other => Err(HostError::KindMismatch {
                expected: "sequence",
                found: other.kind_name().to_owned(),
            }),
        }
    }

    // Maps

    /// Allocate an associative container of type `ty` holding `entries`.
    pub fn alloc_map(
        &mut self,
        ty: TypeIdx,
        entries: impl IntoIterator<Item = (Value, Value)>,
    ) -> Result<ObjId, HostError> {
        let kind = match self.types.entry(ty).map(|e| &e.kind) {
            Some(TypeKind::Map(kind)) => *kind,
            _ => {
                return Err(HostError::KindMismatch {
                    expected: "map type",
                    found: self.types.name(ty).to_owned(),
                })
            }
        };
        let mut store = MapStore::new(kind);
        for (key, value) in entries {
            store.insert(key, value);
        }
        Ok(self.alloc(HeapData::Map(MapData { ty, store })))
    }

    /// An associative container.
    pub fn map(&self, id: ObjId) -> Result<&MapData, HostError> {
        match self.get(id)? {
            HeapData::Map(o) => Ok(o),
            other => Err(HostError::KindMismatch {
                expected: "map",
                found: other.kind_name().to_owned(),
            }),
        }
    }

    /// Insert into an associative container.
    pub fn map_insert(
        &mut self,
        id: ObjId,
        key: impl Into<Value>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, HostError> {
        match self.get_mut(id)? {
            HeapData::Map(o) => Ok(o.store.insert(key.into(), value.into())),
            other => Err(HostError::KindMismatch {
                expected: "map",
                found: other.kind_name().to_owned(),
            }),
        }
    }

    /// Look up a key in an associative container.
    pub fn map_get(&self, id: ObjId, key: &Value) -> Result<Option<Value>, HostError> {
        Ok(self.map(id)?.store.get(key))
    }
}

#[cfg(test)]
mod tests;
