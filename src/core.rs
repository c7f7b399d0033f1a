//! The core wires the registries, the repository and the scheduler together.
//!
//! A [`Core`] is constructed explicitly through a [`Builder`]
//! and passed to whoever needs it.
//! [`Runtime`] adds a construct-once lifecycle on top for hosts
//! that need a single long-lived instance.

use std::rc::Rc;

use crate::archetype::{self, Archetype};
use crate::comp::{self, AnyComponent, Component, ComponentType, Repository, TypeRegistry};
use crate::entity::{self, EntityId};
use crate::error::{Error, Result, Subject};
use crate::node::{self, NodeSchemaMeta, SchemaArchetypeBridge};
use crate::system::Orchestrator;
use crate::tracer::Tracer;
use crate::util::Shared;

mod builder;
pub use builder::Builder;

mod runtime;
pub use runtime::Runtime;


/// Owns every part of an ECS instance.
///
/// The repository and the archetype registry are [`Shared`],
/// so systems can keep a handle to the repository and access components
/// while the core is running a tick.
pub struct Core {
    types:        TypeRegistry,
    repository:   Shared<Repository>,
    archetypes:   Shared<archetype::Registry>,
    schemas:      node::Registry,
    bridge:       Rc<SchemaArchetypeBridge>,
    entities:     entity::Manager,
    node_index:   Rc<dyn node::Index>,
    orchestrator: Orchestrator,
}

impl Core {
    /// Starts building a core with the default collaborators.
    pub fn builder() -> Builder { Builder::default() }

    /// The component types defined in this core.
    pub fn types(&self) -> &TypeRegistry { &self.types }

    /// The component storage.
    pub fn repository(&self) -> &Shared<Repository> { &self.repository }

    /// The archetypes interned so far.
    pub fn archetypes(&self) -> &Shared<archetype::Registry> { &self.archetypes }

    /// The registered node schemas.
    pub fn schemas(&self) -> &node::Registry { &self.schemas }

    /// The bridge caching the archetype of each registered schema.
    pub fn bridge(&self) -> &Rc<SchemaArchetypeBridge> { &self.bridge }

    /// The node index queried by the phases.
    pub fn node_index(&self) -> &Rc<dyn node::Index> { &self.node_index }

    /// The live entities.
    pub fn entities(&self) -> &entity::Manager { &self.entities }

    /// The phases run on every [`update`](Self::update).
    pub fn orchestrator(&self) -> &Orchestrator { &self.orchestrator }

    /// The phases run on every [`update`](Self::update).
    pub fn orchestrator_mut(&mut self) -> &mut Orchestrator { &mut self.orchestrator }

    /// Defines a new component type with `T` as the shape of its data.
    pub fn define_component_type<T: 'static>(&mut self, name: &str) -> Result<ComponentType<T>> {
        self.types.define(name)
    }

    /// Registers a node schema and returns the archetype it resolved to.
    ///
    /// Fails with [`Error::NotFound`] if the schema requires a component type
    /// that was not defined in this core.
    pub fn register_node_schema(&mut self, meta: Rc<NodeSchemaMeta>) -> Result<Rc<Archetype>> {
        for ty in meta.schema().types() {
            self.types.check(ty)?;
        }

        self.schemas.add_schema(Rc::clone(&meta))?;
        self.bridge.get_or_create_archetype(&meta)
    }

    /// Unregisters a node schema, evicting its archetype from the bridge.
    pub fn unregister_node_schema(&mut self, meta: &NodeSchemaMeta) -> Result<()> {
        self.schemas.remove_schema(meta)?;
        Ok(())
    }

    /// Creates an entity without components.
    pub fn create_entity(&mut self) -> EntityId { self.entities.create() }

    /// Creates an entity and adds `components` to it in order.
    ///
    /// If a component fails to be added, the entity is kept with the components added so far.
    pub fn create_entity_with_components(
        &mut self,
        components: impl IntoIterator<Item = Box<dyn AnyComponent>>,
    ) -> Result<EntityId> {
        let entity = self.create_entity();
        self.add_entity_components(entity, components)?;
        Ok(entity)
    }

    /// Adds a component to a live entity.
    pub fn add_entity_component<T: 'static>(
        &mut self,
        entity: EntityId,
        component: Component<T>,
    ) -> Result<()> {
        self.add_entity_components(entity, [Box::new(component) as Box<dyn AnyComponent>])
    }

    /// Adds components to a live entity in order, stopping at the first failure.
    ///
    /// The repository is only borrowed immutably while the hooks of each addition run.
    pub fn add_entity_components(
        &mut self,
        entity: EntityId,
        components: impl IntoIterator<Item = Box<dyn AnyComponent>>,
    ) -> Result<()> {
        self.check_entity(entity)?;

        for component in components {
            self.types.check(component.component_type_id())?;
            Repository::add_any_component_shared(&self.repository, component, entity)?;
        }
        Ok(())
    }

    /// Removes a component from a live entity.
    pub fn remove_entity_component<T: 'static>(
        &mut self,
        entity: EntityId,
        component_type: &ComponentType<T>,
    ) -> Result<Component<T>> {
        self.check_entity(entity)?;
        self.repository.borrow().get_component(component_type, entity)?;
        let component =
            Repository::remove_any_component_shared(&self.repository, component_type.id(), entity)?;
        comp::downcast_box(component)
    }

    /// Removes all components of an entity, then the entity itself.
    ///
    /// The entity is removed even if a removal hook fails,
    /// in which case the hook error is returned afterwards.
    pub fn remove_entity(&mut self, entity: EntityId) -> Result<()> {
        self.check_entity(entity)?;

        let removal = Repository::remove_entity_components_shared(&self.repository, entity);
        self.entities.remove(entity)?;
        removal
    }

    /// Runs one tick of every phase.
    ///
    /// The repository is not borrowed during the tick,
    /// so systems may borrow it through their own handle.
    pub fn update(&self, tracer: &impl Tracer) {
        self.orchestrator.update(&*self.node_index, tracer);
    }

    fn check_entity(&self, entity: EntityId) -> Result<()> {
        if self.entities.has(entity) {
            Ok(())
        } else {
            Err(Error::NotFound(Subject::Entity(entity)))
        }
    }
}
