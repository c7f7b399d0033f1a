use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;

use super::{ComponentType, ComponentTypeId};
use crate::error::{Error, Result, Subject};

/// Issues the indices backing new component types.
///
/// Indices double as archetype bit positions,
/// so factories should issue small, dense numbers.
pub trait TypeFactory {
    /// Returns an index that was never returned before.
    fn next_index(&mut self) -> usize;
}

/// Issues indices from a process-wide counter.
///
/// Component types from different [`TypeRegistry`] instances never collide,
/// at the cost of sparser archetype bit-sets when several registries coexist.
#[derive(Debug, Default)]
pub struct GlobalFactory;

impl TypeFactory for GlobalFactory {
    fn next_index(&mut self) -> usize {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        NEXT.fetch_add(1, Ordering::Relaxed)
    }
}

/// Issues indices from a counter owned by the factory.
///
/// Indices are dense, but only unique among types defined through the same factory.
/// Types from other registries may reuse the same indices,
/// but they are still distinct types and are rejected by [`TypeRegistry::check`].
#[derive(Debug, Default)]
pub struct LocalFactory {
    next: usize,
}

impl TypeFactory for LocalFactory {
    fn next_index(&mut self) -> usize {
        let index = self.next;
        self.next += 1;
        index
    }
}

/// Issues and tracks the component types known to a core.
pub struct TypeRegistry {
    origin:  usize,
    factory: Box<dyn TypeFactory>,
    types:   IndexMap<usize, ComponentTypeId>,
}

impl Default for TypeRegistry {
    fn default() -> Self { Self::new(Box::new(GlobalFactory)) }
}

impl TypeRegistry {
    /// Creates an empty registry issuing indices from `factory`.
    pub fn new(factory: Box<dyn TypeFactory>) -> Self {
        static NEXT_ORIGIN: AtomicUsize = AtomicUsize::new(0);
        let origin = NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed);
        Self { origin, factory, types: IndexMap::new() }
    }

    /// Defines and registers a new component type with `T` as the shape of its data.
    ///
    /// `name` is only used for debugging and logging; it is never used for identity checks,
    /// so defining two types with the same name yields two distinct types.
    pub fn define<T: 'static>(&mut self, name: &str) -> Result<ComponentType<T>> {
        let id = ComponentTypeId::new(self.origin, self.factory.next_index(), name);
        if self.types.contains_key(&id.index) {
            return Err(Error::AlreadyPresent(Subject::ComponentType(id)));
        }

        log::debug!("Defined component type {id:?}");
        self.types.insert(id.index, id.clone());
        Ok(ComponentType::new(id))
    }

    /// Returns whether `id` was defined through this registry.
    pub fn has(&self, id: &ComponentTypeId) -> bool { self.types.get(&id.index) == Some(id) }

    /// Returns the type registered at `index`.
    pub fn get(&self, index: usize) -> Option<&ComponentTypeId> { self.types.get(&index) }

    /// Fails with [`Error::NotFound`] if `id` was not defined through this registry.
    pub fn check(&self, id: &ComponentTypeId) -> Result<()> {
        if self.has(id) {
            Ok(())
        } else {
            Err(Error::NotFound(Subject::ComponentType(id.clone())))
        }
    }

    /// Iterates over the defined types in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentTypeId> { self.types.values() }

    /// Returns the number of defined types.
    pub fn len(&self) -> usize { self.types.len() }

    /// Returns true if no types were defined.
    pub fn is_empty(&self) -> bool { self.types.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::{LocalFactory, TypeFactory, TypeRegistry};
    use crate::error::{Error, Subject};

    #[test]
    fn test_same_name_distinct_types() {
        let mut registry = TypeRegistry::default();
        let a = registry.define::<i32>("Health").unwrap();
        let b = registry.define::<i32>("Health").unwrap();

        assert_ne!(a.id(), b.id());
        assert_eq!(a.id().name(), b.id().name());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_local_factory_is_dense() {
        let mut registry = TypeRegistry::new(Box::new(LocalFactory::default()));
        let indices: Vec<_> = (0..4)
            .map(|i| registry.define::<u8>(&format!("T{i}")).unwrap().id().index())
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(registry.get(2).map(|id| id.name()), Some("T2"));
    }

    struct Stuck;

    impl TypeFactory for Stuck {
        fn next_index(&mut self) -> usize { 7 }
    }

    #[test]
    fn test_colliding_factory_rejected() {
        let mut registry = TypeRegistry::new(Box::new(Stuck));
        let first = registry.define::<()>("First").unwrap();
        let err = registry.define::<()>("Second").unwrap_err();

        assert!(matches!(err, Error::AlreadyPresent(Subject::ComponentType(id)) if id == *first.id()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_check_foreign_type() {
        let mut ours = TypeRegistry::new(Box::new(LocalFactory::default()));
        let mut theirs = TypeRegistry::new(Box::new(LocalFactory::default()));
        ours.define::<()>("Ours").unwrap();
        theirs.define::<()>("Skipped").unwrap();
        let foreign = theirs.define::<()>("Theirs").unwrap();

        let err = ours.check(foreign.id()).unwrap_err();
        assert!(matches!(err, Error::NotFound(Subject::ComponentType(_))));
        assert!(theirs.check(foreign.id()).is_ok());
    }

    #[test]
    fn test_colliding_indices_are_distinct_types() {
        let mut ours = TypeRegistry::new(Box::new(LocalFactory::default()));
        let mut theirs = TypeRegistry::new(Box::new(LocalFactory::default()));
        let position = ours.define::<[f32; 2]>("Position").unwrap();
        let name = theirs.define::<String>("Name").unwrap();

        assert_eq!(position.id().index(), name.id().index());
        assert_ne!(position.id(), name.id());
        assert!(!ours.has(name.id()));
        assert!(matches!(ours.check(name.id()), Err(Error::NotFound(Subject::ComponentType(_)))));
        assert_eq!(ours.get(0), Some(position.id()));
    }
}
