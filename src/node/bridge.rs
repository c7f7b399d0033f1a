use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use super::{NodeSchemaId, NodeSchemaMeta, RegistryHook};
use crate::archetype::{self, Archetype, ArchetypeBits};
use crate::error::Result;
use crate::hook;
use crate::util::Shared;

/// Listens to archetype resolution in a [`SchemaArchetypeBridge`].
pub trait ArchetypeHook {
    /// `archetype` was resolved and cached for `meta`.
    #[allow(unused_variables)]
    fn on_register_schema_archetype(
        &self,
        meta: &NodeSchemaMeta,
        archetype: &Rc<Archetype>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    /// The cached `archetype` of `meta` was evicted.
    #[allow(unused_variables)]
    fn on_remove_schema_archetype(
        &self,
        meta: &NodeSchemaMeta,
        archetype: &Rc<Archetype>,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Derives the archetype of each node schema and caches it per schema identity.
///
/// The bridge is registered as a [`RegistryHook`],
/// so archetypes are resolved eagerly on schema registration
/// and evicted on unregistration.
/// Schemas with equal type sets resolve to the same interned archetype,
/// but each keeps its own cache entry.
pub struct SchemaArchetypeBridge {
    archetypes: Shared<archetype::Registry>,
    cache:      RefCell<IndexMap<NodeSchemaId, Rc<Archetype>>>,
    hooks:      hook::Dispatcher<dyn ArchetypeHook>,
}

impl SchemaArchetypeBridge {
    /// Creates a bridge that interns archetypes through `archetypes`.
    pub fn new(archetypes: Shared<archetype::Registry>) -> Self {
        Self { archetypes, cache: RefCell::default(), hooks: hook::Dispatcher::default() }
    }

    /// The listeners notified when a schema archetype is cached or evicted.
    pub fn hooks_mut(&mut self) -> &mut hook::Dispatcher<dyn ArchetypeHook> { &mut self.hooks }

    /// The registry archetypes are interned in.
    pub fn archetypes(&self) -> &Shared<archetype::Registry> { &self.archetypes }

    /// Returns the cached archetype of `meta` without resolving it.
    pub fn cached_archetype(&self, meta: &NodeSchemaMeta) -> Option<Rc<Archetype>> {
        self.cache.borrow().get(&meta.id()).cloned()
    }

    /// Returns the archetype of `meta`, resolving and caching it if necessary.
    ///
    /// The hooks are only notified when the archetype was not cached yet.
    pub fn get_or_create_archetype(&self, meta: &NodeSchemaMeta) -> Result<Rc<Archetype>> {
        if let Some(archetype) = self.cached_archetype(meta) {
            return Ok(archetype);
        }

        let bits = ArchetypeBits::from_types(meta.schema().types());
        let archetype = self.archetypes.borrow_mut().get_or_create(&bits);
        self.cache.borrow_mut().insert(meta.id(), Rc::clone(&archetype));
        log::debug!("Resolved node schema {} to {archetype}", meta.name());

        self.hooks.invoke(hook::Event::RegisterSchemaArchetype, |hook| {
            hook.on_register_schema_archetype(meta, &archetype)
        })?;
        Ok(archetype)
    }

    /// Evicts the cached archetype of `meta` and notifies the hooks.
    ///
    /// Does nothing if no archetype is cached for `meta`.
    /// The archetype itself stays interned in the registry.
    pub fn remove_archetype(&self, meta: &NodeSchemaMeta) -> Result<()> {
        let archetype = match self.cache.borrow_mut().shift_remove(&meta.id()) {
            Some(archetype) => archetype,
            None => return Ok(()),
        };
        log::debug!("Evicted {archetype} of node schema {}", meta.name());

        self.hooks.invoke(hook::Event::RemoveSchemaArchetype, |hook| {
            hook.on_remove_schema_archetype(meta, &archetype)
        })
    }

    /// Returns the number of cached schemas.
    pub fn cached_len(&self) -> usize { self.cache.borrow().len() }
}

impl RegistryHook for SchemaArchetypeBridge {
    fn on_register_node_schema(&self, meta: &NodeSchemaMeta) -> anyhow::Result<()> {
        self.get_or_create_archetype(meta)?;
        Ok(())
    }

    fn on_unregister_node_schema(&self, meta: &NodeSchemaMeta) -> anyhow::Result<()> {
        self.remove_archetype(meta)?;
        Ok(())
    }
}
