//! Errors reported by the repository, registries, phases and the runtime.
//!
//! Every fallible operation in the core reports synchronously through [`Error`].
//! The only place where failures are swallowed is
//! [`Phase::update`](crate::system::Phase::update),
//! which logs them and continues with the rest of the tick.

use std::fmt;

use thiserror::Error;

use crate::archetype::ArchetypeBits;
use crate::comp::ComponentTypeId;
use crate::entity::EntityId;
use crate::hook;

/// The error type of this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The subject was inserted twice.
    #[error("{0} is already present")]
    AlreadyPresent(Subject),
    /// The subject does not exist.
    #[error("{0} was not found")]
    NotFound(Subject),
    /// A stored component does not hold the payload type of the requested component type.
    #[error("component type '{0}' is bound to a different payload type")]
    PayloadMismatch(ComponentTypeId),
    /// A hook listener failed while a mutation was being broadcast.
    ///
    /// The mutation that triggered the broadcast has already been applied.
    #[error("hook failed during {event}")]
    Hook {
        /// The event being broadcast.
        event:  hook::Event,
        /// The error returned by the first failing listener.
        #[source]
        source: anyhow::Error,
    },
}

/// Shorthand for results of this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Identifies the object that was duplicated or missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// A component of a type on an entity.
    Component { component_type: ComponentTypeId, entity: EntityId },
    /// A component type in the type registry.
    ComponentType(ComponentTypeId),
    /// An archetype keyed by its bits.
    Archetype(ArchetypeBits),
    /// A system in a phase.
    System { system: String, phase: String },
    /// A phase in the orchestrator.
    Phase(String),
    /// A node schema in the schema registry.
    NodeSchema(String),
    /// An entity in the entity manager.
    Entity(EntityId),
    /// The runtime-wide core instance.
    Core,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Component { component_type, entity } => {
                write!(f, "component of type '{component_type}' on entity '{entity}'")
            }
            Self::ComponentType(ty) => write!(f, "component type '{ty}'"),
            Self::Archetype(bits) => write!(f, "archetype with bitset '{bits}'"),
            Self::System { system, phase } => write!(f, "system '{system}' in phase '{phase}'"),
            Self::Phase(name) => write!(f, "phase '{name}'"),
            Self::NodeSchema(name) => write!(f, "node schema '{name}'"),
            Self::Entity(entity) => write!(f, "entity '{entity}'"),
            Self::Core => write!(f, "core instance"),
        }
    }
}
