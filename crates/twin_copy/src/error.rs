//! The one failure a deep copy can report.

use twin_heap::HostError;

/// A deep copy aborted because the host refused a capability the copier
/// needed: allocating an instance without initialization, or reflective
/// access to one of its fields.
///
/// The whole top-level copy fails; nothing is retried and no partial clone
/// is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot copy an instance of `{type_name}`: {cause}")]
pub struct CopyFailure {
    /// Runtime type of the object being copied when the host refused.
    pub type_name: String,
    /// What the host refused.
    #[source]
    pub cause: HostError,
}

impl CopyFailure {
    pub(crate) fn new(type_name: impl Into<String>, cause: HostError) -> Self {
        CopyFailure {
            type_name: type_name.into(),
            cause,
        }
    }
}
