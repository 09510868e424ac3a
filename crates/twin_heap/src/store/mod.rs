//! Container storage with the semantics of each concrete kind.
//!
//! A container type's [`SeqKind`] or [`MapKind`] decides how its storage
//! behaves: whether elements keep insertion order, are kept sorted, must be
//! unique, whether map keys compare by identity, and whether the kind is
//! safe for concurrent use. The storage enums pick a backing collection per
//! kind:
//!
//! | Kind              | Backing                     |
//! |-------------------|-----------------------------|
//! | `List`            | `Vec`                       |
//! | `Linked`          | `VecDeque`                  |
//! | `HashSet`         | `FxHashSet`                 |
//! | `LinkedHashSet`   | `IndexSet`                  |
//! | `TreeSet`         | `BTreeSet`                  |
//! | `Hash`            | `FxHashMap`                 |
//! | `Linked` (map)    | `IndexMap`                  |
//! | `Tree`            | `BTreeMap`                  |
//! | `Identity`        | `FxHashMap<IdentityKey, _>` |
//! | `Concurrent`      | `DashMap`                   |

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::hash::{Hash, Hasher};

use dashmap::DashMap;
use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};

use crate::{TypeIdx, Value};

/// Iteration order a container kind guarantees.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementOrder {
    /// Elements iterate in the order they were added.
    Insertion,
    /// Elements iterate in ascending order.
    Sorted,
    /// No order is guaranteed.
    Unspecified,
}

/// Concrete sequence kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SeqKind {
    /// Growable array.
    List,
    /// Double-ended linked list.
    Linked,
    /// Unordered set.
    HashSet,
    /// Insertion-ordered set.
    LinkedHashSet,
    /// Sorted set.
    TreeSet,
}

impl SeqKind {
    /// Every kind, in builtin type order.
    pub const ALL: [SeqKind; 5] = [
        SeqKind::List,
        SeqKind::Linked,
        SeqKind::HashSet,
        SeqKind::LinkedHashSet,
        SeqKind::TreeSet,
    ];

    /// The pre-interned builtin type of this kind.
    pub const fn builtin_type(self) -> TypeIdx {
        match self {
            SeqKind::List => TypeIdx::ARRAY_LIST,
            SeqKind::Linked => TypeIdx::LINKED_LIST,
            SeqKind::HashSet => TypeIdx::HASH_SET,
            SeqKind::LinkedHashSet => TypeIdx::LINKED_HASH_SET,
            SeqKind::TreeSet => TypeIdx::TREE_SET,
        }
    }

    /// The builtin kind whose type is `ty`.
    pub fn from_builtin(ty: TypeIdx) -> Option<SeqKind> {
        Self::ALL.into_iter().find(|k| k.builtin_type() == ty)
    }

    pub(crate) const fn builtin_name(self) -> &'static str {
        match self {
            SeqKind::List => "ArrayList",
            SeqKind::Linked => "LinkedList",
            SeqKind::HashSet => "HashSet",
            SeqKind::LinkedHashSet => "LinkedHashSet",
            SeqKind::TreeSet => "TreeSet",
        }
    }

    /// Iteration order guaranteed by this kind.
    pub const fn order(self) -> ElementOrder {
        match self {
            SeqKind::List | SeqKind::Linked | SeqKind::LinkedHashSet => ElementOrder::Insertion,
            SeqKind::TreeSet => ElementOrder::Sorted,
            SeqKind::HashSet => ElementOrder::Unspecified,
        }
    }

    /// Whether this kind rejects duplicate elements.
    pub const fn is_unique(self) -> bool {
        matches!(
            self,
            SeqKind::HashSet | SeqKind::LinkedHashSet | SeqKind::TreeSet
        )
    }
}

/// Concrete associative kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MapKind {
    /// Unordered hash map.
    Hash,
    /// Insertion-ordered hash map.
    Linked,
    /// Sorted map.
    Tree,
    /// Hash map whose keys compare by identity.
    Identity,
    /// Hash map safe for concurrent use.
    Concurrent,
}

impl MapKind {
    /// Every kind, in builtin type order.
    pub const ALL: [MapKind; 5] = [
        MapKind::Hash,
        MapKind::Linked,
        MapKind::Tree,
        MapKind::Identity,
        MapKind::Concurrent,
    ];

    /// The pre-interned builtin type of this kind.
    pub const fn builtin_type(self) -> TypeIdx {
        match self {
            MapKind::Hash => TypeIdx::HASH_MAP,
            MapKind::Linked => TypeIdx::LINKED_HASH_MAP,
            MapKind::Tree => TypeIdx::TREE_MAP,
            MapKind::Identity => TypeIdx::IDENTITY_HASH_MAP,
            MapKind::Concurrent => TypeIdx::CONCURRENT_HASH_MAP,
        }
    }

    /// The builtin kind whose type is `ty`.
    pub fn from_builtin(ty: TypeIdx) -> Option<MapKind> {
        Self::ALL.into_iter().find(|k| k.builtin_type() == ty)
    }

    pub(crate) const fn builtin_name(self) -> &'static str {
        match self {
            MapKind::Hash => "HashMap",
            MapKind::Linked => "LinkedHashMap",
            MapKind::Tree => "TreeMap",
            MapKind::Identity => "IdentityHashMap",
            MapKind::Concurrent => "ConcurrentHashMap",
        }
    }

    /// Key iteration order guaranteed by this kind.
    pub const fn order(self) -> ElementOrder {
        match self {
            MapKind::Linked => ElementOrder::Insertion,
            MapKind::Tree => ElementOrder::Sorted,
            MapKind::Hash | MapKind::Identity | MapKind::Concurrent => ElementOrder::Unspecified,
        }
    }

    /// Whether keys compare by identity instead of by value.
    pub const fn has_identity_keys(self) -> bool {
        matches!(self, MapKind::Identity)
    }

    /// Whether this kind is safe for concurrent use.
    pub const fn is_concurrent(self) -> bool {
        matches!(self, MapKind::Concurrent)
    }
}

/// Map key compared by identity ([`Value::same`]) rather than by value.
#[derive(Clone, Debug)]
pub struct IdentityKey(pub Value);

impl PartialEq for IdentityKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.same(&other.0)
    }
}

impl Eq for IdentityKey {}

impl Hash for IdentityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            Value::Str(text) => text.addr().hash(state),
            other => other.hash(state),
        }
    }
}

/// Storage of a sequence container.
#[derive(Debug)]
pub enum SeqStore {
    List(Vec<Value>),
    Linked(VecDeque<Value>),
    Hashed(FxHashSet<Value>),
    LinkedSet(IndexSet<Value, FxBuildHasher>),
    Sorted(BTreeSet<Value>),
}

impl SeqStore {
    /// Empty storage behaving like `kind`.
    pub fn new(kind: SeqKind) -> Self {
        match kind {
            SeqKind::List => SeqStore::List(Vec::new()),
            SeqKind::Linked => SeqStore::Linked(VecDeque::new()),
            SeqKind::HashSet => SeqStore::Hashed(FxHashSet::default()),
            SeqKind::LinkedHashSet => SeqStore::LinkedSet(IndexSet::with_hasher(FxBuildHasher)),
            SeqKind::TreeSet => SeqStore::Sorted(BTreeSet::new()),
        }
    }

    /// The kind this storage behaves like.
    pub fn kind(&self) -> SeqKind {
        match self {
            SeqStore::List(_) => SeqKind::List,
            SeqStore::Linked(_) => SeqKind::Linked,
            SeqStore::Hashed(_) => SeqKind::HashSet,
            SeqStore::LinkedSet(_) => SeqKind::LinkedHashSet,
            SeqStore::Sorted(_) => SeqKind::TreeSet,
        }
    }

    /// Add an element. Returns `false` if a unique kind already held it.
    pub fn push(&mut self, value: Value) -> bool {
        match self {
            SeqStore::List(items) => {
                items.push(value);
                true
            }
            SeqStore::Linked(items) => {
                items.push_back(value);
                true
            }
            SeqStore::Hashed(items) => items.insert(value),
            SeqStore::LinkedSet(items) => items.insert(value),
            SeqStore::Sorted(items) => items.insert(value),
        }
    }

    /// Whether an equal element is present.
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            SeqStore::List(items) => items.contains(value),
            SeqStore::Linked(items) => items.contains(value),
            SeqStore::Hashed(items) => items.contains(value),
            SeqStore::LinkedSet(items) => items.contains(value),
            SeqStore::Sorted(items) => items.contains(value),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            SeqStore::List(items) => items.len(),
            SeqStore::Linked(items) => items.len(),
            SeqStore::Hashed(items) => items.len(),
            SeqStore::LinkedSet(items) => items.len(),
            SeqStore::Sorted(items) => items.len(),
        }
    }

    /// Whether the container is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements in iteration order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            SeqStore::List(items) => Box::new(items.iter()),
            SeqStore::Linked(items) => Box::new(items.iter()),
            SeqStore::Hashed(items) => Box::new(items.iter()),
            SeqStore::LinkedSet(items) => Box::new(items.iter()),
            SeqStore::Sorted(items) => Box::new(items.iter()),
        }
    }

    /// Snapshot of the elements in iteration order.
    pub fn to_vec(&self) -> Vec<Value> {
        self.iter().cloned().collect()
    }
}

/// Storage of an associative container.
#[derive(Debug)]
pub enum MapStore {
    Hashed(FxHashMap<Value, Value>),
    Linked(IndexMap<Value, Value, FxBuildHasher>),
    Sorted(BTreeMap<Value, Value>),
    Identity(FxHashMap<IdentityKey, Value>),
    Concurrent(DashMap<Value, Value>),
}

impl MapStore {
    /// Empty storage behaving like `kind`.
    pub fn new(kind: MapKind) -> Self {
        match kind {
            MapKind::Hash => MapStore::Hashed(FxHashMap::default()),
            MapKind::Linked => MapStore::Linked(IndexMap::with_hasher(FxBuildHasher)),
            MapKind::Tree => MapStore::Sorted(BTreeMap::new()),
            MapKind::Identity => MapStore::Identity(FxHashMap::default()),
            MapKind::Concurrent => MapStore::Concurrent(DashMap::new()),
        }
    }

    /// The kind this storage behaves like.
    pub fn kind(&self) -> MapKind {
        match self {
            MapStore::Hashed(_) => MapKind::Hash,
            MapStore::Linked(_) => MapKind::Linked,
            MapStore::Sorted(_) => MapKind::Tree,
            MapStore::Identity(_) => MapKind::Identity,
            MapStore::Concurrent(_) => MapKind::Concurrent,
        }
    }

    /// Insert an entry, returning the value previously stored for the key.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        match self {
            MapStore::Hashed(map) => map.insert(key, value),
            MapStore::Linked(map) => map.insert(key, value),
            MapStore::Sorted(map) => map.insert(key, value),
            MapStore::Identity(map) => map.insert(IdentityKey(key), value),
            MapStore::Concurrent(map) => map.insert(key, value),
        }
    }

    /// The value stored for `key`.
    pub fn get(&self, key: &Value) -> Option<Value> {
        match self {
            MapStore::Hashed(map) => map.get(key).cloned(),
            MapStore::Linked(map) => map.get(key).cloned(),
            MapStore::Sorted(map) => map.get(key).cloned(),
            MapStore::Identity(map) => map.get(&IdentityKey(key.clone())).cloned(),
            MapStore::Concurrent(map) => map.get(key).map(|entry| entry.value().clone()),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            MapStore::Hashed(map) => map.len(),
            MapStore::Linked(map) => map.len(),
            MapStore::Sorted(map) => map.len(),
            MapStore::Identity(map) => map.len(),
            MapStore::Concurrent(map) => map.len(),
        }
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the entries in iteration order.
    pub fn entries(&self) -> Vec<(Value, Value)> {
        match self {
            MapStore::Hashed(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            MapStore::Linked(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            MapStore::Sorted(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            MapStore::Identity(map) => map.iter().map(|(k, v)| (k.0.clone(), v.clone())).collect(),
            MapStore::Concurrent(map) => map
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect(),
        }
    }
}
