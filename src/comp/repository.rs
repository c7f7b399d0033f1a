use indexmap::{IndexMap, IndexSet};

use super::{downcast_box, AnyComponent, Component, ComponentType, ComponentTypeId};
use crate::entity::EntityId;
use crate::error::{Error, Result, Subject};
use crate::hook;
use crate::util::Shared;

#[cfg(test)]
mod tests;

/// Listens to component additions and removals in a [`Repository`].
///
/// Hooks run synchronously inside the mutating call.
/// A failing hook makes that call return [`Error::Hook`],
/// but the mutation itself has already been applied.
///
/// Hooks that read the repository through a [`Shared`] handle
/// must be driven through the `*_shared` operations,
/// which release the mutable borrow before notifying.
pub trait RepositoryHook {
    /// A component was added to `entity`.
    #[allow(unused_variables)]
    fn on_add_component(
        &self,
        component_type: &ComponentTypeId,
        component: &dyn AnyComponent,
        entity: EntityId,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    /// A component was removed from `entity`.
    ///
    /// `component` is the value as it was right before removal.
    #[allow(unused_variables)]
    fn on_remove_component(
        &self,
        component_type: &ComponentTypeId,
        component: &dyn AnyComponent,
        entity: EntityId,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Stores the components of all entities, at most one per component type per entity.
///
/// Components are indexed both by type and by entity.
/// Both indexes are updated together on every mutation,
/// and empty inner maps are pruned so that emptiness means absence.
#[derive(Default)]
pub struct Repository {
    /// Component type -> entity -> component.
    by_type:   IndexMap<ComponentTypeId, IndexMap<EntityId, Box<dyn AnyComponent>>>,
    /// Entity -> component types, in the order they were added.
    by_entity: IndexMap<EntityId, IndexSet<ComponentTypeId>>,
    hooks:     hook::Dispatcher<dyn RepositoryHook>,
}

impl Repository {
    /// The listeners notified on every addition and removal.
    pub fn hooks_mut(&mut self) -> &mut hook::Dispatcher<dyn RepositoryHook> { &mut self.hooks }

    /// Returns whether `entity` has a component of type `component_type`.
    pub fn has_component<T>(&self, component_type: &ComponentType<T>, entity: EntityId) -> bool {
        self.has_component_id(component_type.id(), entity)
    }

    /// Untyped variant of [`has_component`](Self::has_component).
    pub fn has_component_id(&self, component_type: &ComponentTypeId, entity: EntityId) -> bool {
        self.by_type.get(component_type).map_or(false, |slot| slot.contains_key(&entity))
    }

    /// Gets the component of type `component_type` on `entity`.
    pub fn get_component<T: 'static>(
        &self,
        component_type: &ComponentType<T>,
        entity: EntityId,
    ) -> Result<&Component<T>> {
        let component = self.get_any_component(component_type.id(), entity)?;
        component.downcast_ref().ok_or_else(|| Error::PayloadMismatch(component_type.id().clone()))
    }

    /// Gets the component of type `component_type` on `entity` for in-place updates.
    ///
    /// Mutating the payload does not fire any hooks.
    pub fn get_component_mut<T: 'static>(
        &mut self,
        component_type: &ComponentType<T>,
        entity: EntityId,
    ) -> Result<&mut Component<T>> {
        let component = self
            .by_type
            .get_mut(component_type.id())
            .and_then(|slot| slot.get_mut(&entity))
            .ok_or_else(|| not_found(component_type.id(), entity))?;
        component.downcast_mut().ok_or_else(|| Error::PayloadMismatch(component_type.id().clone()))
    }

    /// Untyped variant of [`get_component`](Self::get_component).
    pub fn get_any_component(
        &self,
        component_type: &ComponentTypeId,
        entity: EntityId,
    ) -> Result<&dyn AnyComponent> {
        self.by_type
            .get(component_type)
            .and_then(|slot| slot.get(&entity))
            .map(|component| &**component)
            .ok_or_else(|| not_found(component_type, entity))
    }

    /// Adds `component` to `entity`, then notifies the hooks.
    ///
    /// Fails with [`Error::AlreadyPresent`] if `entity` already has a component of the same type,
    /// in which case the existing component is left untouched and `component` is dropped.
    pub fn add_component<T: 'static>(
        &mut self,
        component: Component<T>,
        entity: EntityId,
    ) -> Result<()> {
        self.add_any_component(Box::new(component), entity)
    }

    /// Untyped variant of [`add_component`](Self::add_component).
    pub fn add_any_component(
        &mut self,
        component: Box<dyn AnyComponent>,
        entity: EntityId,
    ) -> Result<()> {
        let component_type = self.insert(component, entity)?;
        let component = self.get_any_component(&component_type, entity)?;
        self.hooks.invoke(hook::Event::AddComponent, |hook| {
            hook.on_add_component(&component_type, component, entity)
        })
    }

    /// Variant of [`add_any_component`](Self::add_any_component) through a shared handle.
    ///
    /// Only a shared borrow is held while the hooks run,
    /// so hooks may read the repository through their own handle.
    pub fn add_any_component_shared(
        repository: &Shared<Self>,
        component: Box<dyn AnyComponent>,
        entity: EntityId,
    ) -> Result<()> {
        let (component_type, hooks) = {
            let mut repository = repository.borrow_mut();
            (repository.insert(component, entity)?, repository.hooks.clone())
        };

        let repository = repository.borrow();
        let component = repository.get_any_component(&component_type, entity)?;
        hooks.invoke(hook::Event::AddComponent, |hook| {
            hook.on_add_component(&component_type, component, entity)
        })
    }

    /// Inserts into both indexes without notifying, returning the component type.
    fn insert(
        &mut self,
        component: Box<dyn AnyComponent>,
        entity: EntityId,
    ) -> Result<ComponentTypeId> {
        let component_type = component.component_type_id().clone();
        if self.has_component_id(&component_type, entity) {
            return Err(Error::AlreadyPresent(Subject::Component { component_type, entity }));
        }

        self.by_entity.entry(entity).or_default().insert(component_type.clone());
        self.by_type.entry(component_type.clone()).or_default().insert(entity, component);
        log::trace!("Added {component_type} to {entity}");
        Ok(component_type)
    }

    /// Removes the component of type `component_type` from `entity`,
    /// notifies the hooks and returns the removed component.
    ///
    /// If a hook fails, the component is still removed but is dropped.
    pub fn remove_component<T: 'static>(
        &mut self,
        component_type: &ComponentType<T>,
        entity: EntityId,
    ) -> Result<Component<T>> {
        self.get_component(component_type, entity)?;
        let component = self.remove_any_component(component_type.id(), entity)?;
        downcast_box(component)
    }

    /// Untyped variant of [`remove_component`](Self::remove_component).
    pub fn remove_any_component(
        &mut self,
        component_type: &ComponentTypeId,
        entity: EntityId,
    ) -> Result<Box<dyn AnyComponent>> {
        let component = self.take(component_type, entity)?;
        self.hooks.invoke(hook::Event::RemoveComponent, |hook| {
            hook.on_remove_component(component_type, &*component, entity)
        })?;
        Ok(component)
    }

    /// Variant of [`remove_any_component`](Self::remove_any_component) through a shared handle.
    ///
    /// The repository is not borrowed while the hooks run.
    pub fn remove_any_component_shared(
        repository: &Shared<Self>,
        component_type: &ComponentTypeId,
        entity: EntityId,
    ) -> Result<Box<dyn AnyComponent>> {
        let (component, hooks) = {
            let mut repository = repository.borrow_mut();
            (repository.take(component_type, entity)?, repository.hooks.clone())
        };

        hooks.invoke(hook::Event::RemoveComponent, |hook| {
            hook.on_remove_component(component_type, &*component, entity)
        })?;
        Ok(component)
    }

    /// Removes the entry from both indexes, pruning empty inner maps.
    fn take(
        &mut self,
        component_type: &ComponentTypeId,
        entity: EntityId,
    ) -> Result<Box<dyn AnyComponent>> {
        let slot = match self.by_type.get_mut(component_type) {
            Some(slot) => slot,
            None => return Err(not_found(component_type, entity)),
        };
        let component = match slot.swap_remove(&entity) {
            Some(component) => component,
            None => return Err(not_found(component_type, entity)),
        };
        if slot.is_empty() {
            self.by_type.swap_remove(component_type);
        }

        if let Some(types) = self.by_entity.get_mut(&entity) {
            types.shift_remove(component_type);
            if types.is_empty() {
                self.by_entity.swap_remove(&entity);
            }
        }

        log::trace!("Removed {component_type} from {entity}");
        Ok(component)
    }

    /// Returns whether `entity` has at least one component.
    pub fn has_entity(&self, entity: EntityId) -> bool { self.by_entity.contains_key(&entity) }

    /// Iterates over the component types of `entity` in the order they were added.
    ///
    /// Yields nothing for an entity without components.
    pub fn get_entity_component_types(
        &self,
        entity: EntityId,
    ) -> impl Iterator<Item = &ComponentTypeId> + '_ {
        self.by_entity.get(&entity).into_iter().flatten()
    }

    /// Lazily iterates over the components of `entity`,
    /// in the same order as [`get_entity_component_types`](Self::get_entity_component_types).
    pub fn get_entity_components(
        &self,
        entity: EntityId,
    ) -> impl Iterator<Item = &dyn AnyComponent> + '_ {
        self.get_entity_component_types(entity).filter_map(move |component_type| {
            let component = self.by_type.get(component_type).and_then(|slot| slot.get(&entity));
            debug_assert!(component.is_some(), "component indexes are inconsistent");
            component.map(|component| &**component)
        })
    }

    /// Removes all components of `entity`, notifying the hooks once per component.
    ///
    /// Does nothing if `entity` has no components.
    /// Hooks are only invoked after the entity is completely removed from both indexes,
    /// and every removal is broadcast even if an earlier broadcast failed.
    pub fn remove_entity_components(&mut self, entity: EntityId) -> Result<()> {
        let removed = self.detach(entity);
        notify_removed(&self.hooks, entity, &removed)
    }

    /// Variant of [`remove_entity_components`](Self::remove_entity_components)
    /// through a shared handle.
    ///
    /// The repository is not borrowed while the hooks run.
    pub fn remove_entity_components_shared(repository: &Shared<Self>, entity: EntityId) -> Result<()> {
        let (removed, hooks) = {
            let mut repository = repository.borrow_mut();
            (repository.detach(entity), repository.hooks.clone())
        };
        notify_removed(&hooks, entity, &removed)
    }

    /// Removes every component of `entity` from both indexes without notifying.
    fn detach(&mut self, entity: EntityId) -> Vec<(ComponentTypeId, Box<dyn AnyComponent>)> {
        let types = match self.by_entity.swap_remove(&entity) {
            Some(types) => types,
            None => return Vec::new(),
        };

        let mut removed = Vec::with_capacity(types.len());
        for component_type in types {
            let slot = match self.by_type.get_mut(&component_type) {
                Some(slot) => slot,
                None => continue,
            };
            if let Some(component) = slot.swap_remove(&entity) {
                removed.push((component_type.clone(), component));
            }
            if slot.is_empty() {
                self.by_type.swap_remove(&component_type);
            }
        }
        log::trace!("Removed {} components from {entity}", removed.len());
        removed
    }

    /// Iterates over the entities having a component of type `component_type`.
    pub fn entities_with(
        &self,
        component_type: &ComponentTypeId,
    ) -> impl Iterator<Item = EntityId> + '_ {
        self.by_type.get(component_type).into_iter().flat_map(|slot| slot.keys().copied())
    }

    /// Returns the total number of stored components.
    pub fn component_count(&self) -> usize { self.by_type.values().map(|slot| slot.len()).sum() }
}

fn not_found(component_type: &ComponentTypeId, entity: EntityId) -> Error {
    Error::NotFound(Subject::Component { component_type: component_type.clone(), entity })
}

fn notify_removed(
    hooks: &hook::Dispatcher<dyn RepositoryHook>,
    entity: EntityId,
    removed: &[(ComponentTypeId, Box<dyn AnyComponent>)],
) -> Result<()> {
    let mut result = Ok(());
    for (component_type, component) in removed {
        let broadcast = hooks.invoke(hook::Event::RemoveComponent, |hook| {
            hook.on_remove_component(component_type, &**component, entity)
        });
        if let Err(err) = broadcast {
            if result.is_ok() {
                result = Err(err);
            } else {
                log::error!("Removal hook failed for {component_type} on {entity}: {err}");
            }
        }
    }
    result
}
