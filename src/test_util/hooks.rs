use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::archetype::{Archetype, ArchetypeBits};
use crate::comp::{AnyComponent, ComponentTypeId, RepositoryHook};
use crate::entity::EntityId;
use crate::node::{ArchetypeHook, NodeSchemaId, NodeSchemaMeta, RegistryHook};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentEvent {
    Added(ComponentTypeId, EntityId),
    Removed(ComponentTypeId, EntityId),
}

/// Records every component addition and removal.
#[derive(Default)]
pub struct ComponentRecorder {
    events: RefCell<Vec<ComponentEvent>>,
    fail:   Cell<bool>,
}

impl ComponentRecorder {
    pub fn new() -> Rc<Self> { Rc::default() }

    /// Makes subsequent callbacks fail after recording.
    pub fn set_fail(&self, fail: bool) { self.fail.set(fail) }

    pub fn take(&self) -> Vec<ComponentEvent> { self.events.take() }

    fn record(&self, event: ComponentEvent) -> anyhow::Result<()> {
        self.events.borrow_mut().push(event.clone());
        if self.fail.get() {
            anyhow::bail!("recorder rejected {event:?}");
        }
        Ok(())
    }
}

impl RepositoryHook for ComponentRecorder {
    fn on_add_component(
        &self,
        component_type: &ComponentTypeId,
        component: &dyn AnyComponent,
        entity: EntityId,
    ) -> anyhow::Result<()> {
        assert_eq!(component.component_type_id(), component_type);
        self.record(ComponentEvent::Added(component_type.clone(), entity))
    }

    fn on_remove_component(
        &self,
        component_type: &ComponentTypeId,
        component: &dyn AnyComponent,
        entity: EntityId,
    ) -> anyhow::Result<()> {
        assert_eq!(component.component_type_id(), component_type);
        self.record(ComponentEvent::Removed(component_type.clone(), entity))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaEvent {
    Registered(NodeSchemaId),
    Unregistered(NodeSchemaId),
    ArchetypeRegistered(NodeSchemaId, ArchetypeBits),
    ArchetypeRemoved(NodeSchemaId, ArchetypeBits),
}

/// Records schema registry and bridge notifications.
#[derive(Default)]
pub struct SchemaRecorder {
    events: RefCell<Vec<SchemaEvent>>,
}

impl SchemaRecorder {
    pub fn new() -> Rc<Self> { Rc::default() }

    pub fn take(&self) -> Vec<SchemaEvent> { self.events.take() }
}

impl RegistryHook for SchemaRecorder {
    fn on_register_node_schema(&self, meta: &NodeSchemaMeta) -> anyhow::Result<()> {
        self.events.borrow_mut().push(SchemaEvent::Registered(meta.id()));
        Ok(())
    }

    fn on_unregister_node_schema(&self, meta: &NodeSchemaMeta) -> anyhow::Result<()> {
        self.events.borrow_mut().push(SchemaEvent::Unregistered(meta.id()));
        Ok(())
    }
}

impl ArchetypeHook for SchemaRecorder {
    fn on_register_schema_archetype(
        &self,
        meta: &NodeSchemaMeta,
        archetype: &Rc<Archetype>,
    ) -> anyhow::Result<()> {
        let event = SchemaEvent::ArchetypeRegistered(meta.id(), archetype.bits().clone());
        self.events.borrow_mut().push(event);
        Ok(())
    }

    fn on_remove_schema_archetype(
        &self,
        meta: &NodeSchemaMeta,
        archetype: &Rc<Archetype>,
    ) -> anyhow::Result<()> {
        let event = SchemaEvent::ArchetypeRemoved(meta.id(), archetype.bits().clone());
        self.events.borrow_mut().push(event);
        Ok(())
    }
}
