use std::rc::Rc;

use super::Core;
use crate::archetype;
use crate::comp::{GlobalFactory, Repository, RepositoryHook, TypeFactory, TypeRegistry};
use crate::entity;
use crate::error::Result;
use crate::node::{self, ArchetypeHook, ArchetypeIndex, RegistryHook, SchemaArchetypeBridge};
use crate::system::{Orchestrator, Phase};
use crate::util::{self, Shared};

/// This type is used to build a [`Core`].
///
/// Hooks added here are registered after the node index,
/// so the index is always up to date when they run.
pub struct Builder {
    factory:          Box<dyn TypeFactory>,
    node_index:       Option<IndexHandles>,
    phases:           Vec<(Shared<Phase>, Option<usize>)>,
    repository_hooks: Vec<Rc<dyn RepositoryHook>>,
    archetype_hooks:  Vec<Rc<dyn ArchetypeHook>>,
    schema_hooks:     Vec<Rc<dyn RegistryHook>>,
}

/// The same node index viewed through each of its roles.
struct IndexHandles {
    index:           Rc<dyn node::Index>,
    repository_hook: Rc<dyn RepositoryHook>,
    archetype_hook:  Rc<dyn ArchetypeHook>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            factory:          Box::new(GlobalFactory),
            node_index:       None,
            phases:           Vec::new(),
            repository_hooks: Vec::new(),
            archetype_hooks:  Vec::new(),
            schema_hooks:     Vec::new(),
        }
    }
}

impl Builder {
    /// Sets the factory issuing component type indices.
    ///
    /// Defaults to [`GlobalFactory`].
    pub fn type_factory(mut self, factory: impl TypeFactory + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    /// Sets the node index.
    ///
    /// The index is notified of component and schema archetype changes.
    /// Defaults to a new [`ArchetypeIndex`].
    pub fn node_index<I>(mut self, index: Rc<I>) -> Self
    where
        I: node::Index + RepositoryHook + ArchetypeHook + 'static,
    {
        self.node_index = Some(IndexHandles {
            index:           index.clone(),
            repository_hook: index.clone(),
            archetype_hook:  index,
        });
        self
    }

    /// Appends a phase to the orchestrator.
    pub fn phase(mut self, phase: Shared<Phase>) -> Self {
        self.phases.push((phase, None));
        self
    }

    /// Adds a phase to the orchestrator with the priority key `order`.
    pub fn phase_with_order(mut self, phase: Shared<Phase>, order: usize) -> Self {
        self.phases.push((phase, Some(order)));
        self
    }

    /// Registers an additional component hook.
    pub fn repository_hook(mut self, hook: Rc<dyn RepositoryHook>) -> Self {
        self.repository_hooks.push(hook);
        self
    }

    /// Registers an additional schema archetype hook.
    pub fn archetype_hook(mut self, hook: Rc<dyn ArchetypeHook>) -> Self {
        self.archetype_hooks.push(hook);
        self
    }

    /// Registers an additional schema registration hook.
    pub fn schema_hook(mut self, hook: Rc<dyn RegistryHook>) -> Self {
        self.schema_hooks.push(hook);
        self
    }

    /// Constructs the core from the builder.
    ///
    /// Fails with [`Error::AlreadyPresent`](crate::Error::AlreadyPresent)
    /// if the same phase was added twice.
    pub fn build(self) -> Result<Core> {
        let IndexHandles { index, repository_hook, archetype_hook } =
            self.node_index.unwrap_or_else(|| {
                let index = ArchetypeIndex::new();
                IndexHandles {
                    index:           index.clone(),
                    repository_hook: index.clone(),
                    archetype_hook:  index,
                }
            });

        let mut repository = Repository::default();
        repository.hooks_mut().add(repository_hook);
        for hook in self.repository_hooks {
            repository.hooks_mut().add(hook);
        }

        let archetypes = util::shared(archetype::Registry::default());
        let mut bridge = SchemaArchetypeBridge::new(Rc::clone(&archetypes));
        bridge.hooks_mut().add(archetype_hook);
        for hook in self.archetype_hooks {
            bridge.hooks_mut().add(hook);
        }
        let bridge = Rc::new(bridge);

        let mut schemas = node::Registry::default();
        schemas.hooks_mut().add(bridge.clone());
        for hook in self.schema_hooks {
            schemas.hooks_mut().add(hook);
        }

        let mut orchestrator = Orchestrator::default();
        for (phase, order) in self.phases {
            match order {
                Some(order) => orchestrator.add_phase(phase, order)?,
                None => orchestrator.push_phase(phase)?,
            }
        }

        log::debug!("Built core with {} phases", orchestrator.phases().count());

        Ok(Core {
            types: TypeRegistry::new(self.factory),
            repository: util::shared(repository),
            archetypes,
            schemas,
            bridge,
            entities: entity::Manager::default(),
            node_index: index,
            orchestrator,
        })
    }
}
