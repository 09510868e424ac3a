//! Exemption policy: which values a deep copy passes through unchanged.
//!
//! Two independent reasons exempt a value:
//!
//! - **Immutable**: scalars, text and enum constants can be shared freely
//!   because nothing can mutate them. Object types the policy lists with
//!   [`share_type`](ExemptionPolicy::share_type) are treated the same way.
//! - **Opaque**: closures, synthetic and anonymous types, and live system
//!   resources. Copying their fields would produce something meaningless
//!   (a duplicated captured environment, a second handle to one socket), so
//!   the original is returned. A type is opaque if it or any ancestor
//!   carries one of the policy's exempting [`TypeFlags`], or if its name
//!   contains one of the policy's patterns.
//!
//! [`copy_type`](ExemptionPolicy::copy_type) overrides both for a type the
//! caller knows is safe to copy.

use rustc_hash::FxHashSet;

use twin_heap::{TypeFlags, TypeIdx, TypeKind, TypeRegistry};

/// Name fragment carried by generated lambda classes.
pub const LAMBDA_MARKER: &str = "$$Lambda";

/// Why a value was passed through instead of copied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Exemption {
    /// Scalar, text or enum constant.
    Immutable,
    /// Closure, synthetic, anonymous or resource type.
    Opaque,
    /// Listed as shared by the policy.
    Shared,
}

/// Decides which object types are exempt from copying.
#[derive(Clone, Debug)]
pub struct ExemptionPolicy {
    opaque_flags: TypeFlags,
    name_patterns: Vec<String>,
    shared_types: FxHashSet<TypeIdx>,
    copied_types: FxHashSet<TypeIdx>,
}

impl Default for ExemptionPolicy {
    fn default() -> Self {
        ExemptionPolicy {
            opaque_flags: TypeFlags::OPAQUE,
            name_patterns: vec![LAMBDA_MARKER.to_owned()],
            shared_types: FxHashSet::default(),
            copied_types: FxHashSet::default(),
        }
    }
}

impl ExemptionPolicy {
    /// Pass instances of `ty` (and its subtypes) through by reference.
    #[must_use]
    pub fn share_type(mut self, ty: TypeIdx) -> Self {
        self.shared_types.insert(ty);
        self
    }

    /// Always copy instances of exactly `ty`, even if its flags or name
    /// would exempt it.
    #[must_use]
    pub fn copy_type(mut self, ty: TypeIdx) -> Self {
        self.copied_types.insert(ty);
        self
    }

    /// Treat every type whose name contains `pattern` as opaque.
    #[must_use]
    pub fn share_matching(mut self, pattern: impl Into<String>) -> Self {
        self.name_patterns.push(pattern.into());
        self
    }

    /// Replace the set of flags that make a type opaque.
    #[must_use]
    pub fn exempt_flags(mut self, flags: TypeFlags) -> Self {
        self.opaque_flags = flags;
        self
    }

    /// Whether values of runtime type `ty` are exempt, and why.
    ///
    /// Checked in order: forced copy, shared types, immutable kinds,
    /// exempting flags along the ancestry, name patterns.
    pub fn type_exemption(&self, types: &TypeRegistry, ty: TypeIdx) -> Option<Exemption> {
        if self.copied_types.contains(&ty) {
            return None;
        }
        if types.ancestry(ty).any(|t| self.shared_types.contains(&t)) {
            return Some(Exemption::Shared);
        }
        let entry = types.entry(ty)?;
        if matches!(
            entry.kind,
            TypeKind::Primitive | TypeKind::Text | TypeKind::Enum { .. }
        ) {
            return Some(Exemption::Immutable);
        }
        if types
            .ancestry(ty)
            .any(|t| types.flags(t).intersects(self.opaque_flags))
        {
            return Some(Exemption::Opaque);
        }
        if self
            .name_patterns
            .iter()
            .any(|pattern| entry.name.contains(pattern.as_str()))
        {
            return Some(Exemption::Opaque);
        }
        None
    }
}

#[cfg(test)]
mod tests;
