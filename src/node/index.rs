use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use super::{ArchetypeHook, Index, NodeSchemaId, NodeSchemaMeta};
use crate::archetype::{Archetype, ArchetypeBits};
use crate::comp::{AnyComponent, ComponentTypeId, RepositoryHook};
use crate::entity::EntityId;

/// A straightforward [`Index`] that tracks the live component set of every entity.
///
/// Component hooks keep an `entity -> bits` table up to date,
/// and archetype hooks record which archetype each registered schema resolved to.
/// Queries scan the table in ascending entity order.
/// Schemas that are not registered match nothing.
#[derive(Debug, Default)]
pub struct ArchetypeIndex {
    entities: RefCell<BTreeMap<EntityId, ArchetypeBits>>,
    schemas:  RefCell<HashMap<NodeSchemaId, Rc<Archetype>>>,
}

impl ArchetypeIndex {
    /// Creates an empty index.
    pub fn new() -> Rc<Self> { Rc::default() }

    /// Returns the live component set of `entity`.
    ///
    /// Entities without components are not tracked.
    pub fn entity_bits(&self, entity: EntityId) -> Option<ArchetypeBits> {
        self.entities.borrow().get(&entity).cloned()
    }

    /// Returns the archetype this index knows for `meta`.
    pub fn schema_archetype(&self, meta: &NodeSchemaMeta) -> Option<Rc<Archetype>> {
        self.schemas.borrow().get(&meta.id()).cloned()
    }
}

impl Index for ArchetypeIndex {
    fn get_nodes_with_schema(&self, schema: &NodeSchemaMeta) -> Vec<EntityId> {
        let archetype = match self.schema_archetype(schema) {
            Some(archetype) => archetype,
            None => {
                log::debug!("Node schema {} is not registered", schema.name());
                return Vec::new();
            }
        };

        self.entities
            .borrow()
            .iter()
            .filter(|(_, bits)| archetype.matches(bits))
            .map(|(&entity, _)| entity)
            .collect()
    }
}

impl RepositoryHook for ArchetypeIndex {
    fn on_add_component(
        &self,
        component_type: &ComponentTypeId,
        _: &dyn AnyComponent,
        entity: EntityId,
    ) -> anyhow::Result<()> {
        self.entities.borrow_mut().entry(entity).or_default().insert(component_type.index());
        Ok(())
    }

    fn on_remove_component(
        &self,
        component_type: &ComponentTypeId,
        _: &dyn AnyComponent,
        entity: EntityId,
    ) -> anyhow::Result<()> {
        let mut entities = self.entities.borrow_mut();
        if let Some(bits) = entities.get_mut(&entity) {
            bits.remove(component_type.index());
            if bits.is_empty() {
                entities.remove(&entity);
            }
        }
        Ok(())
    }
}

impl ArchetypeHook for ArchetypeIndex {
    fn on_register_schema_archetype(
        &self,
        meta: &NodeSchemaMeta,
        archetype: &Rc<Archetype>,
    ) -> anyhow::Result<()> {
        self.schemas.borrow_mut().insert(meta.id(), Rc::clone(archetype));
        Ok(())
    }

    fn on_remove_schema_archetype(
        &self,
        meta: &NodeSchemaMeta,
        _: &Rc<Archetype>,
    ) -> anyhow::Result<()> {
        self.schemas.borrow_mut().remove(&meta.id());
        Ok(())
    }
}
