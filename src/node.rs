//! Nodes are the views of entities that systems operate on.
//!
//! A [`NodeSchema`] declares the component types a system requires.
//! Once registered in the schema [`Registry`],
//! the [`SchemaArchetypeBridge`] resolves the schema to an interned
//! [archetype](crate::archetype::Archetype) and tells its listeners about it.
//! An [`Index`] uses these notifications together with
//! [component hooks](crate::comp::RepositoryHook)
//! to answer which entities currently match a schema.

use crate::entity::EntityId;

mod schema;
pub use schema::{NodeSchema, NodeSchemaId, NodeSchemaMeta, Registry, RegistryHook, Schema};

mod bridge;
pub use bridge::{ArchetypeHook, SchemaArchetypeBridge};

mod index;
pub use index::ArchetypeIndex;


/// Resolves the entities matching a node schema.
///
/// Implementations decide how entities are laid out;
/// the core only requires this query.
pub trait Index {
    /// Returns the entities that currently have every component type required by `schema`.
    ///
    /// The result must be deterministic for the same sequence of mutations.
    fn get_nodes_with_schema(&self, schema: &NodeSchemaMeta) -> Vec<EntityId>;
}
