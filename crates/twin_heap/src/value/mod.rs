//! Values stored in fields, array slots and containers.
//!
//! A [`Value`] is either an inline immutable datum (scalars, enum constants),
//! shared immutable text, null, or a reference to a heap object. Only
//! references and text have identity beyond their content:
//!
//! - `Ref(ObjId)`: identity is the object id.
//! - `Str(Text)`: identity is the text allocation; two equal strings built
//!   separately are equal but not the same.
//!
//! # Equality and Ordering
//!
//! `Eq`, `Hash` and `Ord` are value-based so values can key hashed and sorted
//! containers: text compares by content, floats by bit pattern (and by
//! `total_cmp` for ordering), references by id. [`Value::same`] is the
//! identity comparison.

// Arc gives text cheap sharing and a stable address to compare identity by.
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::{ObjId, TypeIdx};

/// Immutable, shared text.
#[derive(Clone)]
pub struct Text(Arc<str>);

impl Text {
    /// Allocate new text.
    pub fn new(s: impl Into<Arc<str>>) -> Self {
        Text(s.into())
    }

    /// The text content.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether both handles share one allocation.
    pub fn same(&self, other: &Text) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the allocation, for identity hashing.
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<u8>() as usize
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Text {}

impl Hash for Text {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// A constant of an enumeration type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumConst {
    /// The enumeration type.
    pub ty: TypeIdx,
    /// Position of the constant in the declaration.
    pub ordinal: u32,
}

/// A value held by a field, array slot or container.
#[derive(Clone, Debug)]
pub enum Value {
    /// Absence of a value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Character.
    Char(char),
    /// Byte.
    Byte(u8),
    /// Integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// Immutable text.
    Str(Text),
    /// Enumeration constant.
    Enum(EnumConst),
    /// Reference to a heap object.
    Ref(ObjId),
}

impl Value {
    /// Create a text value.
    #[inline]
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(Text::new(s))
    }

    /// Create an enum constant value.
    #[inline]
    pub fn enum_const(ty: TypeIdx, ordinal: u32) -> Self {
        Value::Enum(EnumConst { ty, ordinal })
    }

    /// Whether this is `Null`.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The referenced object, if this is a reference.
    #[inline]
    pub fn as_obj(&self) -> Option<ObjId> {
        match self {
            Value::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// The text content, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(t) => Some(t.as_str()),
            _ => None,
        }
    }

    /// The integer, if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Identity comparison.
    ///
    /// References are the same when they point at the same object, text when
    /// it shares one allocation. Inline values have no identity beyond their
    /// bits, so they are the same when bitwise equal.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a.same(b),
            (Value::Ref(a), Value::Ref(b)) => a == b,
            _ => self == other,
        }
    }

    /// Name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Byte(_) => "byte",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Enum(_) => "enum",
            Value::Ref(_) => "ref",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Char(_) => 2,
            Value::Byte(_) => 3,
            Value::Int(_) => 4,
            Value::Float(_) => 5,
            Value::Str(_) => 6,
            Value::Enum(_) => 7,
            Value::Ref(_) => 8,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Ref(a), Value::Ref(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Char(c) => c.hash(state),
            Value::Byte(b) => b.hash(state),
            Value::Int(n) => n.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Str(t) => t.hash(state),
            Value::Enum(e) => e.hash(state),
            Value::Ref(id) => id.hash(state),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Char(a), Value::Char(b)) => a.cmp(b),
            (Value::Byte(a), Value::Byte(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Str(a), Value::Str(b)) => a.as_str().cmp(b.as_str()),
            (Value::Enum(a), Value::Enum(b)) => a.cmp(b),
            (Value::Ref(a), Value::Ref(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<ObjId> for Value {
    fn from(id: ObjId) -> Self {
        Value::Ref(id)
    }
}
