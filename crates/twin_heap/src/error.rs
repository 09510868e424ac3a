//! Failures of the host capabilities (allocation, reflective field access,
//! container and array access).

use crate::{ObjId, TypeIdx};

/// Error raised by the object model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The type cannot be allocated without running its initializer, either
    /// because the host forbids it or because the type is not a class.
    #[error("type `{type_name}` cannot be instantiated without initialization")]
    NotInstantiable { type_name: String },

    /// Reflective access to a sealed field.
    #[error("reflective access to `{type_name}.{field}` is denied")]
    AccessDenied { type_name: String, field: String },

    /// Field name not declared on the type or its ancestors.
    #[error("type `{type_name}` has no field `{field}`")]
    NoSuchField { type_name: String, field: String },

    /// The object or type is not of the expected kind.
    #[error("expected {expected}, found `{found}`")]
    KindMismatch {
        expected: &'static str,
        found: String,
    },

    /// Array index past the end.
    #[error("index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Type index not handed out by this registry.
    #[error("unknown type {0:?}")]
    UnknownType(TypeIdx),

    /// Object id not allocated by this heap.
    #[error("dangling object reference {0}")]
    DanglingRef(ObjId),
}
