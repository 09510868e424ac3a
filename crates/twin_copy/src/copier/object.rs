//! Field-by-field cloning of structured objects.

use smallvec::SmallVec;

use twin_heap::{FieldRef, ObjId, Value};

use super::Copier;
use crate::CopyFailure;

impl Copier<'_, '_> {
    /// Clone an instance without running any of its type's initializers.
    ///
    /// The blank clone is registered before any field is resolved. Fields
    /// declared on the exact type come first, then each ancestor's. Constant
    /// and static fields are skipped, so constants keep their zero value in
    /// the clone.
    pub(super) fn copy_object(&mut self, id: ObjId) -> Result<Value, CopyFailure> {
        let ty = self.heap.type_of(id).map_err(|cause| self.failure(id, cause))?;
        let clone = self
            .heap
            .allocate_blank(ty)
            .map_err(|cause| self.failure(id, cause))?;
        self.visited.register(id, clone);

        let fields: SmallVec<[FieldRef; 8]> = self
            .heap
            .types()
            .fields_of(ty)
            .into_iter()
            .filter(|(_, decl)| decl.flags.is_copyable())
            .map(|(field, _)| field)
            .collect();

        for field in fields {
            let original = self
                .heap
                .read_field(id, field)
                .map_err(|cause| self.failure(id, cause))?;
            let copied = self.resolve(&original)?;
            self.heap
                .write_field(clone, field, copied)
                .map_err(|cause| self.failure(id, cause))?;
        }
        Ok(Value::Ref(clone))
    }
}
