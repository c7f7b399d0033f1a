use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;

use crate::comp::{ComponentType, ComponentTypeId};
use crate::error::{Error, Result, Subject};
use crate::hook;

/// Maps field names to the component types a node requires.
///
/// Field order is kept for display only;
/// the derived archetype does not depend on it.
#[derive(Debug, Clone, Default)]
pub struct NodeSchema {
    fields: IndexMap<String, ComponentTypeId>,
}

impl NodeSchema {
    /// Adds a required field, builder-style.
    pub fn with<T>(mut self, field: &str, component_type: &ComponentType<T>) -> Self {
        self.insert(field, component_type.id().clone());
        self
    }

    /// Adds a required field, replacing any field with the same name.
    pub fn insert(&mut self, field: &str, component_type: ComponentTypeId) {
        self.fields.insert(field.to_string(), component_type);
    }

    /// Gets the component type of a field.
    pub fn get(&self, field: &str) -> Option<&ComponentTypeId> { self.fields.get(field) }

    /// Iterates over `(field, component type)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &ComponentTypeId)> {
        self.fields.iter().map(|(field, ty)| (field.as_str(), ty))
    }

    /// Iterates over the required component types.
    pub fn types(&self) -> impl Iterator<Item = &ComponentTypeId> { self.fields.values() }

    /// Returns the number of fields.
    pub fn len(&self) -> usize { self.fields.len() }

    /// Returns true if the schema requires nothing.
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }
}

/// Identifies a [`NodeSchemaMeta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeSchemaId(usize);

impl NodeSchemaId {
    fn next() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeSchemaId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "schema#{}", self.0) }
}

/// A node schema with an identity and a debug name.
///
/// Every call to [`NodeSchemaMeta::new`] issues a new identity,
/// even for equal schemas.
#[derive(Debug)]
pub struct NodeSchemaMeta {
    id:     NodeSchemaId,
    name:   String,
    schema: NodeSchema,
}

impl NodeSchemaMeta {
    /// Creates a new schema identity.
    pub fn new(name: impl Into<String>, schema: NodeSchema) -> Self {
        Self { id: NodeSchemaId::next(), name: name.into(), schema }
    }

    /// The identity of this schema.
    pub fn id(&self) -> NodeSchemaId { self.id }

    /// The debug name of this schema.
    pub fn name(&self) -> &str { &self.name }

    /// The required fields.
    pub fn schema(&self) -> &NodeSchema { &self.schema }
}

/// A statically declared node schema.
///
/// Usually implemented through [`#[derive(NodeSchema)]`](crate::NodeSchema)
/// on a struct whose fields are [`ComponentType`]s.
pub trait Schema {
    /// The debug name of the schema.
    const NAME: &'static str;

    /// Builds the field mapping from the component types stored in `self`.
    fn node_schema(&self) -> NodeSchema;

    /// Builds a new schema identity from `self`.
    fn meta(&self) -> NodeSchemaMeta { NodeSchemaMeta::new(Self::NAME, self.node_schema()) }
}

/// Listens to schema registration in a [`Registry`].
pub trait RegistryHook {
    /// `meta` was registered.
    #[allow(unused_variables)]
    fn on_register_node_schema(&self, meta: &NodeSchemaMeta) -> anyhow::Result<()> { Ok(()) }

    /// `meta` was unregistered.
    #[allow(unused_variables)]
    fn on_unregister_node_schema(&self, meta: &NodeSchemaMeta) -> anyhow::Result<()> { Ok(()) }
}

/// Tracks the node schemas in use.
#[derive(Default)]
pub struct Registry {
    schemas: IndexMap<NodeSchemaId, Rc<NodeSchemaMeta>>,
    hooks:   hook::Dispatcher<dyn RegistryHook>,
}

impl Registry {
    /// The listeners notified on registration and unregistration.
    pub fn hooks_mut(&mut self) -> &mut hook::Dispatcher<dyn RegistryHook> { &mut self.hooks }

    /// Returns whether `meta` is registered.
    pub fn has_schema(&self, meta: &NodeSchemaMeta) -> bool { self.schemas.contains_key(&meta.id) }

    /// Gets a registered schema by identity.
    pub fn get_schema(&self, id: NodeSchemaId) -> Option<&Rc<NodeSchemaMeta>> {
        self.schemas.get(&id)
    }

    /// Registers `meta` and notifies the hooks.
    pub fn add_schema(&mut self, meta: Rc<NodeSchemaMeta>) -> Result<()> {
        if self.has_schema(&meta) {
            return Err(Error::AlreadyPresent(Subject::NodeSchema(meta.name.clone())));
        }

        self.schemas.insert(meta.id, Rc::clone(&meta));
        log::debug!("Registered node schema {} ({})", meta.name, meta.id);

        self.hooks.invoke(hook::Event::RegisterNodeSchema, |hook| hook.on_register_node_schema(&meta))
    }

    /// Unregisters `meta` and notifies the hooks.
    pub fn remove_schema(&mut self, meta: &NodeSchemaMeta) -> Result<Rc<NodeSchemaMeta>> {
        let removed = self
            .schemas
            .shift_remove(&meta.id)
            .ok_or_else(|| Error::NotFound(Subject::NodeSchema(meta.name.clone())))?;
        log::debug!("Unregistered node schema {} ({})", meta.name, meta.id);

        self.hooks.invoke(hook::Event::UnregisterNodeSchema, |hook| {
            hook.on_unregister_node_schema(&removed)
        })?;
        Ok(removed)
    }

    /// Iterates over registered schemas in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<NodeSchemaMeta>> { self.schemas.values() }

    /// Returns the number of registered schemas.
    pub fn len(&self) -> usize { self.schemas.len() }

    /// Returns true if no schemas are registered.
    pub fn is_empty(&self) -> bool { self.schemas.is_empty() }
}
