//! Type registry: the reflection tables of the object model.
//!
//! Every value's runtime type is a [`TypeIdx`] into a [`TypeRegistry`]. The
//! registry stores, per type, its kind (class, enum, array, container), its
//! [`TypeFlags`], its superclass and, for classes, the declared fields with
//! their [`FieldFlags`]. It is the stand-in for runtime reflection:
//! [`fields_of`](TypeRegistry::fields_of) enumerates storage fields across the
//! inheritance chain, and the heap uses the precomputed slot layout to read
//! and write them.
//!
//! # Layout
//!
//! Classes use single inheritance. Instance fields of ancestors occupy the
//! leading slots of an instance, so a field's slot is the same in every
//! subclass. Static fields get no slot; their storage lives on the heap,
//! keyed by [`FieldRef`].

mod flags;
mod idx;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::store::{MapKind, SeqKind};
use crate::{Heap, HostError, ObjId, Value};

pub use flags::{FieldFlags, TypeFlags};
pub use idx::TypeIdx;

/// Initializer run by [`Heap::construct`] on a freshly allocated instance.
///
/// Initializers are the type's normal construction path. Deep copying never
/// runs them.
pub type Initializer = fn(&mut Heap, ObjId) -> Result<(), HostError>;

/// A registered type.
#[derive(Clone, Debug)]
pub struct TypeEntry {
    /// Fully qualified type name.
    pub name: String,
    /// What kind of type this is.
    pub kind: TypeKind,
    /// Construct and capability markers.
    pub flags: TypeFlags,
    /// Direct ancestor. `None` only for [`TypeIdx::OBJECT`] and for
    /// primitive, text, enum and array types.
    pub superclass: Option<TypeIdx>,
}

/// The kind of a registered type.
#[derive(Clone, Debug)]
pub enum TypeKind {
    /// Inline scalar (`bool`, `char`, `byte`, `int`, `float`).
    Primitive,
    /// Immutable text.
    Text,
    /// Structured object with declared fields.
    Class(ClassDef),
    /// Enumeration with a fixed set of constants.
    Enum {
        /// Constant names, indexed by ordinal.
        variants: Vec<String>,
    },
    /// Fixed-length array of a component type.
    Array {
        /// Element type.
        component: TypeIdx,
    },
    /// Sequence container whose storage behaves like `SeqKind`.
    Sequence(SeqKind),
    /// Associative container whose storage behaves like `MapKind`.
    Map(MapKind),
}

/// Fields declared directly on a class, plus its slot layout.
#[derive(Clone, Debug)]
pub struct ClassDef {
    /// Declared fields, in declaration order.
    pub fields: Vec<FieldDef>,
    /// Instance slot of each declared field (`None` for static fields).
    slots: Vec<Option<u32>>,
    /// Total instance slots including all ancestors.
    instance_size: u32,
    /// Normal construction logic, if any.
    initializer: Option<Initializer>,
}

impl ClassDef {
    /// Total number of instance slots, ancestors included.
    pub fn instance_size(&self) -> usize {
        self.instance_size as usize
    }

    /// The class's normal construction logic.
    pub fn initializer(&self) -> Option<Initializer> {
        self.initializer
    }
}

/// A declared field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Declared type; decides the zero value of a blank instance.
    pub ty: TypeIdx,
    /// Field markers.
    pub flags: FieldFlags,
}

/// Reference to a declared field: the declaring type and the field's
/// position among that type's own declarations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// Declaring type.
    pub owner: TypeIdx,
    /// Position in the owner's declared fields.
    pub index: u16,
}

/// Registry of all types known to a heap.
#[derive(Clone, Debug)]
pub struct TypeRegistry {
    entries: Vec<TypeEntry>,
    /// Component type -> interned array type.
    arrays: FxHashMap<TypeIdx, TypeIdx>,
    /// Name -> type, for lookup by name.
    by_name: FxHashMap<String, TypeIdx>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry holding only the builtin types.
    pub fn new() -> Self {
        let mut registry = TypeRegistry {
            entries: Vec::with_capacity(64),
            arrays: FxHashMap::default(),
            by_name: FxHashMap::default(),
        };
        registry.intern_builtins();
        registry
    }

    fn intern_builtins(&mut self) {
        let object = TypeEntry {
            name: "Object".to_owned(),
            kind: TypeKind::Class(ClassDef {
                fields: Vec::new(),
                slots: Vec::new(),
                instance_size: 0,
                initializer: None,
            }),
            flags: TypeFlags::empty(),
            superclass: None,
        };
        self.push(object);

        for name in ["bool", "char", "byte", "int", "float"] {
            self.push(plain(name, TypeKind::Primitive));
        }
        self.push(plain("str", TypeKind::Text));

        for kind in SeqKind::ALL {
            self.push(container(kind.builtin_name(), TypeKind::Sequence(kind)));
        }
        for kind in MapKind::ALL {
            self.push(container(kind.builtin_name(), TypeKind::Map(kind)));
        }

        // Resources carry an opaque handle and are never copied.
        for name in ["Thread", "Socket", "FileInputStream"] {
            let fields = vec![FieldDef::new("handle", TypeIdx::INT)];
            let entry = TypeEntry {
                name: name.to_owned(),
                kind: TypeKind::Class(ClassDef {
                    slots: vec![Some(0)],
                    instance_size: 1,
                    fields,
                    initializer: None,
                }),
                flags: TypeFlags::RESOURCE,
                superclass: Some(TypeIdx::OBJECT),
            };
            self.push(entry);
        }

        debug_assert_eq!(self.entries.len(), TypeIdx::FIRST_USER as usize);
    }

    fn push(&mut self, entry: TypeEntry) -> TypeIdx {
        let idx = TypeIdx::from_raw(u32::try_from(self.entries.len()).unwrap_or(u32::MAX));
        self.by_name.insert(entry.name.clone(), idx);
        self.entries.push(entry);
        idx
    }

    /// Start declaring a class. Finish with [`ClassBuilder::finish`].
    pub fn class(&mut self, name: impl Into<String>) -> ClassBuilder<'_> {
        ClassBuilder {
            registry: self,
            name: name.into(),
            superclass: TypeIdx::OBJECT,
            fields: Vec::new(),
            flags: TypeFlags::empty(),
            initializer: None,
        }
    }

    /// Register an enumeration.
    pub fn register_enum<S: Into<String>>(
        &mut self,
        name: impl Into<String>,
        variants: impl IntoIterator<Item = S>,
    ) -> TypeIdx {
        let variants = variants.into_iter().map(Into::into).collect();
        self.push(plain(name, TypeKind::Enum { variants }))
    }

    /// Register a sequence container type.
    ///
    /// `superclass` must be [`TypeIdx::OBJECT`] or another sequence type;
    /// subclassing a builtin kind makes the new type reconstruct as that kind,
    /// so `behaves_like` must match the nearest builtin ancestor.
    pub fn register_sequence(
        &mut self,
        name: impl Into<String>,
        behaves_like: SeqKind,
        superclass: TypeIdx,
    ) -> Result<TypeIdx, HostError> {
        self.expect_container_parent(superclass, |kind| matches!(kind, TypeKind::Sequence(_)))?;
        if let Some(inherited) = self.ancestry(superclass).find_map(SeqKind::from_builtin) {
            if inherited != behaves_like {
                return Err(HostError::KindMismatch {
                    expected: inherited.builtin_name(),
                    found: behaves_like.builtin_name().to_owned(),
                });
            }
        }
        let mut entry = container(name, TypeKind::Sequence(behaves_like));
        entry.superclass = Some(superclass);
        Ok(self.push(entry))
    }

    /// Register an associative container type.
    ///
    /// `superclass` must be [`TypeIdx::OBJECT`] or another map type, and
    /// `behaves_like` must match the nearest builtin ancestor.
    pub fn register_map(
        &mut self,
        name: impl Into<String>,
        behaves_like: MapKind,
        superclass: TypeIdx,
    ) -> Result<TypeIdx, HostError> {
        self.expect_container_parent(superclass, |kind| matches!(kind, TypeKind::Map(_)))?;
        if let Some(inherited) = self.ancestry(superclass).find_map(MapKind::from_builtin) {
            if inherited != behaves_like {
                return Err(HostError::KindMismatch {
                    expected: inherited.builtin_name(),
                    found: behaves_like.builtin_name().to_owned(),
                });
            }
        }
        let mut entry = container(name, TypeKind::Map(behaves_like));
        entry.superclass = Some(superclass);
        Ok(self.push(entry))
    }

    fn expect_container_parent(
        &self,
        superclass: TypeIdx,
        accepts: impl Fn(&TypeKind) -> bool,
    ) -> Result<(), HostError> {
        if superclass == TypeIdx::OBJECT {
            return Ok(());
        }
        let entry = self.entry(superclass).ok_or(HostError::UnknownType(superclass))?;
        if accepts(&entry.kind) {
            Ok(())
        } else {
            Err(HostError::KindMismatch {
                expected: "container supertype",
                found: entry.name.clone(),
            })
        }
    }

    /// The array type with the given component type, interned on first use.
    pub fn array_of(&mut self, component: TypeIdx) -> TypeIdx {
        if let Some(&idx) = self.arrays.get(&component) {
            return idx;
        }
        let name = format!("{}[]", self.name(component));
        let idx = self.push(plain(name, TypeKind::Array { component }));
        self.arrays.insert(component, idx);
        idx
    }

    /// Look up a type entry.
    pub fn entry(&self, ty: TypeIdx) -> Option<&TypeEntry> {
        self.entries.get(ty.index())
    }

    /// Look up a type by name.
    pub fn lookup(&self, name: &str) -> Option<TypeIdx> {
        self.by_name.get(name).copied()
    }

    /// A type's name, or `"<unknown>"` for an index this registry never
    /// handed out.
    pub fn name(&self, ty: TypeIdx) -> &str {
        self.entry(ty).map_or("<unknown>", |e| e.name.as_str())
    }

    /// A type's flags (empty for unknown indices).
    pub fn flags(&self, ty: TypeIdx) -> TypeFlags {
        self.entry(ty).map_or(TypeFlags::empty(), |e| e.flags)
    }

    /// The class definition of `ty`, if it is a class.
    pub fn class_def(&self, ty: TypeIdx) -> Option<&ClassDef> {
        match &self.entry(ty)?.kind {
            TypeKind::Class(def) => Some(def),
            _ => None,
        }
    }

    /// `ty` followed by each of its ancestors, nearest first.
    pub fn ancestry(&self, ty: TypeIdx) -> Ancestry<'_> {
        Ancestry {
            registry: self,
            next: self.entry(ty).map(|_| ty),
        }
    }

    /// Whether `ty` is `ancestor` or inherits from it.
    pub fn is_subtype(&self, ty: TypeIdx, ancestor: TypeIdx) -> bool {
        self.ancestry(ty).any(|t| t == ancestor)
    }

    /// Every field declared on `ty` and on its ancestors, own fields first.
    ///
    /// Static and constant fields are included; callers filter on
    /// [`FieldFlags`].
    pub fn fields_of(&self, ty: TypeIdx) -> SmallVec<[(FieldRef, &FieldDef); 8]> {
        let mut fields = SmallVec::new();
        for owner in self.ancestry(ty) {
            let Some(def) = self.class_def(owner) else {
                continue;
            };
            for (i, field) in def.fields.iter().enumerate() {
                let index = u16::try_from(i).unwrap_or(u16::MAX);
                fields.push((FieldRef { owner, index }, field));
            }
        }
        fields
    }

    /// Resolve a field by name, searching `ty` first and then its ancestors
    /// (a subclass field shadows an inherited one of the same name).
    pub fn find_field(&self, ty: TypeIdx, name: &str) -> Option<FieldRef> {
        self.fields_of(ty)
            .into_iter()
            .find(|(_, def)| def.name == name)
            .map(|(field, _)| field)
    }

    /// The declaration behind a field reference.
    pub fn field_def(&self, field: FieldRef) -> Option<&FieldDef> {
        self.class_def(field.owner)?
            .fields
            .get(usize::from(field.index))
    }

    /// The instance slot of a field (`None` for static fields).
    pub fn slot_of(&self, field: FieldRef) -> Option<usize> {
        let def = self.class_def(field.owner)?;
        def.slots
            .get(usize::from(field.index))
            .copied()
            .flatten()
            .map(|slot| slot as usize)
    }

    /// The value a blank slot of type `ty` holds.
    pub fn zero_value(&self, ty: TypeIdx) -> Value {
        match ty {
            TypeIdx::BOOL => Value::Bool(false),
            TypeIdx::CHAR => Value::Char('\0'),
            TypeIdx::BYTE => Value::Byte(0),
            TypeIdx::INT => Value::Int(0),
            TypeIdx::FLOAT => Value::Float(0.0),
            _ => Value::Null,
        }
    }

    /// Number of registered types, builtins included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: the builtins are registered on creation.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn plain(name: impl Into<String>, kind: TypeKind) -> TypeEntry {
    TypeEntry {
        name: name.into(),
        kind,
        flags: TypeFlags::empty(),
        superclass: None,
    }
}

fn container(name: impl Into<String>, kind: TypeKind) -> TypeEntry {
    TypeEntry {
        name: name.into(),
        kind,
        flags: TypeFlags::empty(),
        superclass: Some(TypeIdx::OBJECT),
    }
}

impl FieldDef {
    /// A plain per-instance field.
    pub fn new(name: impl Into<String>, ty: TypeIdx) -> Self {
        FieldDef {
            name: name.into(),
            ty,
            flags: FieldFlags::empty(),
        }
    }

    /// A field with explicit markers.
    pub fn with_flags(name: impl Into<String>, ty: TypeIdx, flags: FieldFlags) -> Self {
        FieldDef {
            name: name.into(),
            ty,
            flags,
        }
    }
}

/// Iterator over a type and its ancestors.
pub struct Ancestry<'r> {
    registry: &'r TypeRegistry,
    next: Option<TypeIdx>,
}

impl Iterator for Ancestry<'_> {
    type Item = TypeIdx;

    fn next(&mut self) -> Option<TypeIdx> {
        let current = self.next?;
        self.next = self
            .registry
            .entry(current)
            .and_then(|entry| entry.superclass);
        Some(current)
    }
}

/// Builder for class declarations.
#[must_use = "call `finish` to register the class"]
pub struct ClassBuilder<'r> {
    registry: &'r mut TypeRegistry,
    name: String,
    superclass: TypeIdx,
    fields: Vec<FieldDef>,
    flags: TypeFlags,
    initializer: Option<Initializer>,
}

impl ClassBuilder<'_> {
    /// Inherit from `superclass` (default: [`TypeIdx::OBJECT`]).
    pub fn extends(mut self, superclass: TypeIdx) -> Self {
        self.superclass = superclass;
        self
    }

    /// Declare a per-instance field.
    pub fn field(mut self, name: impl Into<String>, ty: TypeIdx) -> Self {
        self.fields.push(FieldDef::new(name, ty));
        self
    }

    /// Declare a constant (final) field.
    pub fn constant(self, name: impl Into<String>, ty: TypeIdx) -> Self {
        self.field_with(name, ty, FieldFlags::CONSTANT)
    }

    /// Declare a type-level (static) field.
    pub fn static_field(self, name: impl Into<String>, ty: TypeIdx) -> Self {
        self.field_with(name, ty, FieldFlags::STATIC)
    }

    /// Declare a field with explicit markers.
    pub fn field_with(mut self, name: impl Into<String>, ty: TypeIdx, flags: FieldFlags) -> Self {
        self.fields.push(FieldDef::with_flags(name, ty, flags));
        self
    }

    /// Add type markers.
    pub fn flags(mut self, flags: TypeFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Set the normal construction logic.
    pub fn initializer(mut self, init: Initializer) -> Self {
        self.initializer = Some(init);
        self
    }

    /// Register the class.
    ///
    /// Fails if the superclass is unknown or not a class.
    pub fn finish(self) -> Result<TypeIdx, HostError> {
        let parent = self
            .registry
            .entry(self.superclass)
            .ok_or(HostError::UnknownType(self.superclass))?;
        let TypeKind::Class(parent_def) = &parent.kind else {
            return Err(HostError::KindMismatch {
                expected: "class supertype",
                found: parent.name.clone(),
            });
        };

        let mut next_slot = parent_def.instance_size;
        let slots: Vec<Option<u32>> = self
            .fields
            .iter()
            .map(|field| {
                field.flags.is_instance().then(|| {
                    let slot = next_slot;
                    next_slot += 1;
                    slot
                })
            })
            .collect();

        let entry = TypeEntry {
            name: self.name,
            kind: TypeKind::Class(ClassDef {
                fields: self.fields,
                slots,
                instance_size: next_slot,
                initializer: self.initializer,
            }),
            flags: self.flags,
            superclass: Some(self.superclass),
        };
        tracing::trace!(name = %entry.name, slots = next_slot, "registered class");
        Ok(self.registry.push(entry))
    }
}
