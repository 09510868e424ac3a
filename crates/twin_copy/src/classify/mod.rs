//! Strategy dispatch: decide how a value is copied.

use twin_heap::{Heap, HeapData, HostError, ObjId, Value};

use crate::policy::{Exemption, ExemptionPolicy};

/// How the copier handles one value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Null stays null.
    Null,
    /// Return the original value unchanged.
    Share(Exemption),
    /// Fixed-length array.
    Array(ObjId),
    /// Sequence container.
    Sequence(ObjId),
    /// Associative container.
    Map(ObjId),
    /// Structured object, cloned field by field.
    Object(ObjId),
}

/// Classify a value that has not been copied yet.
///
/// Inline values are always immutable. For references the runtime type is
/// checked against the policy before the object's shape picks a strategy.
/// Fails only for a reference to an object the heap does not hold.
pub fn classify(heap: &Heap, policy: &ExemptionPolicy, value: &Value) -> Result<Strategy, HostError> {
    let id = match value {
        Value::Null => return Ok(Strategy::Null),
        Value::Bool(_)
        | Value::Char(_)
        | Value::Byte(_)
        | Value::Int(_)
        | Value::Float(_)
        | Value::Str(_)
        | Value::Enum(_) => return Ok(Strategy::Share(Exemption::Immutable)),
        Value::Ref(id) => *id,
    };

    let object = heap.get(id)?;
    if let Some(exemption) = policy.type_exemption(heap.types(), object.ty()) {
        return Ok(Strategy::Share(exemption));
    }
    Ok(match object {
        HeapData::Array(_) => Strategy::Array(id),
        HeapData::Sequence(_) => Strategy::Sequence(id),
        HeapData::Map(_) => Strategy::Map(id),
        HeapData::Instance(_) => Strategy::Object(id),
    })
}
