//! Systems are actions performed every tick on the entities matching a node schema.
//!
//! Systems are grouped into [`Phase`]s, which are in turn ordered by the [`Orchestrator`].
//! Each tick runs every phase in order;
//! each phase asks the [node index](crate::node::Index) for the entities matching
//! the schema of each of its systems and passes them to the system.
//!
//! Systems and phases are held as [`Shared`] handles.
//! Their identity is the handle allocation,
//! so two instances of the same system type with the same name are distinct.

use std::rc::Rc;

use crate::entity::EntityId;
use crate::node::NodeSchemaMeta;
use crate::util::{self, Shared};

mod phase;
pub use phase::{Callback, Phase};

mod orchestrator;
pub use orchestrator::Orchestrator;

#[cfg(test)]
mod tests;

/// Describes a system instance.
#[derive(Debug, Clone)]
pub struct SystemMeta {
    name:        String,
    node_schema: Rc<NodeSchemaMeta>,
}

impl SystemMeta {
    /// Creates a description for a system named `name` operating on `node_schema`.
    pub fn new(name: impl Into<String>, node_schema: Rc<NodeSchemaMeta>) -> Self {
        Self { name: name.into(), node_schema }
    }

    /// The debug name of the system.
    pub fn name(&self) -> &str { &self.name }

    /// The schema of the entities this system operates on.
    pub fn node_schema(&self) -> &Rc<NodeSchemaMeta> { &self.node_schema }
}

/// A system stores some states of its own and updates the entities matching its schema.
///
/// There may be multiple instances of the same implementor type.
/// This is meaningful as they may have different states.
pub trait System {
    /// Describes this instance of system.
    ///
    /// It should return a consistent value.
    fn meta(&self) -> &SystemMeta;

    /// Runs the system on the entities currently matching its node schema.
    ///
    /// An error is logged by the phase and does not prevent other systems from running.
    fn update_nodes(&mut self, nodes: &[EntityId]) -> anyhow::Result<()>;
}

/// Creates a system from a closure.
pub fn from_fn<F>(
    name: impl Into<String>,
    node_schema: Rc<NodeSchemaMeta>,
    f: F,
) -> Shared<dyn System>
where
    F: FnMut(&[EntityId]) -> anyhow::Result<()> + 'static,
{
    util::shared(FnSystem { meta: SystemMeta::new(name, node_schema), f })
}

struct FnSystem<F> {
    meta: SystemMeta,
    f:    F,
}

impl<F> System for FnSystem<F>
where
    F: FnMut(&[EntityId]) -> anyhow::Result<()>,
{
    fn meta(&self) -> &SystemMeta { &self.meta }

    fn update_nodes(&mut self, nodes: &[EntityId]) -> anyhow::Result<()> { (self.f)(nodes) }
}

/// Describes a system handle without requiring it to be unborrowed.
fn describe(system: &Shared<dyn System>) -> String {
    match system.try_borrow() {
        Ok(system) => system.meta().name().to_string(),
        Err(_) => String::from("<borrowed system>"),
    }
}
