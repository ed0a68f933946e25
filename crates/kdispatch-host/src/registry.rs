//! In-memory code-object registry.

use std::collections::HashMap;

use tracing::debug;

use kdispatch_core::backend::{CodeObject, CodeObjectRegistry, ModuleId};
use kdispatch_core::types::Backend;

/// Code objects grouped by backend.
///
/// Built up front and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    objects: HashMap<Backend, Vec<CodeObject>>,
    module_ids: HashMap<Backend, ModuleId>,
}

impl InMemoryRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a code object for `backend`.
    ///
    /// The first object registered for a backend fixes its module id.
    pub fn with_object(mut self, backend: Backend, object: CodeObject) -> Self {
        debug!(
            "Registering {} code object for {} (module={}, {} bytes)",
            object.format(),
            backend,
            object.module_id(),
            object.binary().len()
        );
        self.module_ids.entry(backend).or_insert(object.module_id());
        self.objects.entry(backend).or_default().push(object);
        self
    }
}

impl CodeObjectRegistry for InMemoryRegistry {
    fn count_objects(&self, backend: Backend) -> usize {
        self.objects.get(&backend).map_or(0, Vec::len)
    }

    fn get_object(&self, backend: Backend, format: &str) -> Option<&CodeObject> {
        self.objects
            .get(&backend)?
            .iter()
            .find(|object| object.format() == format)
    }

    fn module_id(&self, backend: Backend) -> Option<ModuleId> {
        self.module_ids.get(&backend).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_backend_and_format() {
        let registry = InMemoryRegistry::new()
            .with_object(Backend::LevelZero, CodeObject::new(3, "spirv", vec![1, 2, 3]))
            .with_object(Backend::LevelZero, CodeObject::new(4, "native", vec![4]))
            .with_object(Backend::Cuda, CodeObject::new(7, "ptx", vec![5]));

        assert_eq!(registry.count_objects(Backend::LevelZero), 2);
        assert_eq!(registry.count_objects(Backend::Hip), 0);
        assert_eq!(registry.module_id(Backend::LevelZero), Some(3));

        let object = registry.get_object(Backend::LevelZero, "native").unwrap();
        assert_eq!(object.module_id(), 4);
        assert!(registry.get_object(Backend::LevelZero, "ptx").is_none());
        assert!(registry.get_object(Backend::Hip, "spirv").is_none());
    }
}
